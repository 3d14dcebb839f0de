//! Biz-Ops API 客户端
//!
//! 通过 GraphQL 查询 Biz-Ops 注册中心。调用方依赖 [`GraphQlClient`] trait，
//! 测试中可以用任意实现替换真实的网络客户端。

pub mod client;
pub mod error;
pub mod types;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

pub use client::{API_KEY_HEADER, BizOpsClient, CLIENT_ID, ClientConfig};
pub use error::{ClientError, ClientResult, TransportError};

/// Anything that can answer a GraphQL query with a JSON document
#[async_trait]
pub trait GraphQlClient: Send + Sync {
    /// Run `query` once and decode the response body into `T`
    async fn query<T>(&self, query: &str) -> ClientResult<T>
    where
        T: DeserializeOwned + Send;
}
