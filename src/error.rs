//! 统一错误处理模型
//!
//! 提供 bizops-sd 进程的顶层错误类型，聚合配置、启动与运行期错误

use bizops::ClientError;
use sd_common::ConfigError;
use thiserror::Error;

/// 进程级错误枚举
///
/// Anything that ends up here terminates the process with a non-zero status.
#[derive(Debug, Error)]
pub enum Error {
    /// 配置文件加载错误
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// 配置验证失败
    #[error("Configuration validation failed: {message}")]
    Validation { message: String },

    /// Biz-Ops 客户端构建失败
    #[error("Biz-Ops client error: {0}")]
    Client(#[from] ClientError),

    /// Prometheus 指标注册失败
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// I/O 操作错误
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// 服务启动失败
    #[error("Service startup failed: {message}")]
    ServiceStartup { message: String },

    /// Anyhow 错误兼容层
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn service_startup(message: impl Into<String>) -> Self {
        Self::ServiceStartup {
            message: message.into(),
        }
    }
}
