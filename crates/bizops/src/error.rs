//! Biz-Ops 客户端错误定义

use thiserror::Error;

/// Transport-level failures: the request did not produce a usable answer
#[derive(Error, Debug)]
pub enum TransportError {
    /// Connection, timeout or body read failure
    #[error("biz-ops request failed ({0})")]
    Request(#[from] reqwest::Error),

    /// Non-200 status whose body was not a gateway error envelope
    #[error("received {status} from biz-ops: {body}")]
    UnexpectedStatus { status: u16, body: String },
}

/// Biz-Ops 客户端错误类型
#[derive(Error, Debug)]
pub enum ClientError {
    /// 基础地址无法解析
    #[error("invalid biz-ops base url '{url}' ({source})")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// HTTP 客户端构建失败
    #[error("biz-ops client creation failed ({0})")]
    Build(#[source] reqwest::Error),

    /// 网络 / 状态码错误
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// API 网关返回的应用错误
    #[error("{status} api gateway error: {message}")]
    Gateway { status: u16, message: String },

    /// 响应体 JSON 解析失败
    #[error("biz-ops response unmarshalling failed: ({0})")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(TransportError::Request(err))
    }
}

/// Biz-Ops 客户端结果类型别名
pub type ClientResult<T> = Result<T, ClientError>;
