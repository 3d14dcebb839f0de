//! 服务发现周期错误定义

use super::writer::WriteError;
use bizops::ClientError;
use thiserror::Error;

/// Why a single fetch-transform-write cycle failed
///
/// None of these are fatal to the process; the next tick retries.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// Biz-Ops query failed (transport, gateway or decode)
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Biz-Ops answered with no health checks at all
    #[error("returned healthchecks were empty")]
    EmptyUpstreamResult,

    /// Biz-Ops returned health checks but none had a valid URL
    #[error("processed healthchecks were empty")]
    EmptyValidatedResult,

    /// The writer reported success with zero bytes
    #[error("0 bytes written when updating health check targets")]
    EmptyWriteResult,

    #[error("failed to serialize discovery document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Filesystem(#[from] WriteError),
}

impl DiscoveryError {
    /// Short machine-readable kind, used as a log field
    pub fn kind(&self) -> &'static str {
        match self {
            DiscoveryError::Client(ClientError::Gateway { .. }) => "gateway",
            DiscoveryError::Client(ClientError::Decode(_)) => "decode",
            DiscoveryError::Client(_) => "transport",
            DiscoveryError::EmptyUpstreamResult => "empty_upstream",
            DiscoveryError::EmptyValidatedResult => "empty_validated",
            DiscoveryError::EmptyWriteResult => "empty_write",
            DiscoveryError::Serialize(_) => "serialize",
            DiscoveryError::Filesystem(_) => "filesystem",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_errors_are_distinct() {
        assert_ne!(
            DiscoveryError::EmptyUpstreamResult.to_string(),
            DiscoveryError::EmptyValidatedResult.to_string()
        );
        assert_eq!(DiscoveryError::EmptyUpstreamResult.kind(), "empty_upstream");
        assert_eq!(DiscoveryError::EmptyValidatedResult.kind(), "empty_validated");
    }

    #[test]
    fn test_client_error_kinds() {
        let gateway = DiscoveryError::from(ClientError::Gateway {
            status: 401,
            message: "Unauthorized".to_string(),
        });
        assert_eq!(gateway.kind(), "gateway");
        assert_eq!(gateway.to_string(), "401 api gateway error: Unauthorized");
    }
}
