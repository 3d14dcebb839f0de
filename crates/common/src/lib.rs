//! Base 基础设施库
//!
//! 为 Biz-Ops 服务发现提供基础设施组件：统一配置模型与 Prometheus 指标

pub mod config;
pub mod metrics;

// Re-export commonly used types for convenience
pub use config::{ConfigError, LogConfig, ObservabilityConfig, RegistryConfig, SdConfig};
pub use metrics::DiscoveryMetrics;
