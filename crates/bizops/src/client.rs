//! Biz-Ops 客户端 - 简单的 GraphQL HTTP 客户端

use crate::GraphQlClient;
use crate::error::{ClientError, ClientResult, TransportError};
use crate::types::{GatewayErrorEnvelope, GraphQlRequest};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::USER_AGENT;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Value of both the `User-Agent` and `client-id` headers
pub const CLIENT_ID: &str = "prometheus-biz-ops-service-discovery";

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Biz-Ops 客户端配置
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Biz-Ops API 基础地址，例如 "https://api.ft.com/biz-ops"
    pub base_url: String,

    /// API key sent with every request
    pub api_key: String,

    /// 请求超时时间
    pub timeout: Duration,
}

/// Biz-Ops GraphQL 客户端
///
/// Stateless between calls: one POST per query, no retries.
#[derive(Debug, Clone)]
pub struct BizOpsClient {
    endpoint: Url,
    api_key: String,
    client: reqwest::Client,
}

impl BizOpsClient {
    /// 创建新的 Biz-Ops 客户端
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let endpoint = graphql_endpoint(&config.base_url)?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            endpoint,
            api_key: config.api_key.clone(),
            client,
        })
    }

    /// Resolved GraphQL endpoint
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl GraphQlClient for BizOpsClient {
    async fn query<T>(&self, query: &str) -> ClientResult<T>
    where
        T: DeserializeOwned + Send,
    {
        let payload = GraphQlRequest { query };

        debug!("Querying biz-ops at {}", self.endpoint);

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .header(USER_AGENT, CLIENT_ID)
            .header("client-id", CLIENT_ID)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if status != StatusCode::OK {
            // Not a biz-ops answer, it might come from the API gateway
            return Err(match serde_json::from_slice::<GatewayErrorEnvelope>(&body) {
                Ok(envelope) => ClientError::Gateway {
                    status: status.as_u16(),
                    message: envelope.error,
                },
                Err(_) => TransportError::UnexpectedStatus {
                    status: status.as_u16(),
                    body: String::from_utf8_lossy(&body).into_owned(),
                }
                .into(),
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

/// Append the `graphql` segment to whatever path the base URL carries
fn graphql_endpoint(base_url: &str) -> ClientResult<Url> {
    let mut url = Url::parse(base_url).map_err(|source| ClientError::InvalidBaseUrl {
        url: base_url.to_string(),
        source,
    })?;

    let path = format!("{}/graphql", url.path().trim_end_matches('/'));
    url.set_path(&path);
    Ok(url)
}
