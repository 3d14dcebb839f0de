//! Biz-Ops registry connection configuration
//!
//! Where the health check registry lives and how to authenticate against it.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Default Biz-Ops API base address
fn default_base_url() -> String {
    "https://api.ft.com/biz-ops".to_string()
}

/// Default request timeout in seconds
fn default_timeout_secs() -> u64 {
    10
}

/// Registry client configuration
///
/// The API key has no usable default: an empty key is reported by
/// [`RegistryConfig::validate`] and refuses startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Biz-Ops API base URL
    ///
    /// The GraphQL endpoint is resolved as `{base_url}/graphql`.
    /// Default: "https://api.ft.com/biz-ops"
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key sent as the `X-Api-Key` header
    #[serde(default)]
    pub api_key: String,

    /// Per-request timeout in seconds (connect + read)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RegistryConfig {
    /// Validate registry configuration
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        match Url::parse(&self.base_url) {
            Ok(url) if url.cannot_be_a_base() => errors.push(format!(
                "The BIZ_OPS_BASE_URL config value was not a valid url: '{}'",
                self.base_url
            )),
            Ok(_) => {}
            Err(e) => errors.push(format!(
                "The BIZ_OPS_BASE_URL config value was not a valid url: '{}' ({e})",
                self.base_url
            )),
        }

        if self.api_key.trim().is_empty() {
            errors.push("The BIZ_OPS_API_KEY environment variable must be set.".to_string());
        }

        if self.timeout_secs == 0 {
            errors.push("registry.timeout_secs must be greater than zero".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Get the request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
