//! # bizops-sd
//!
//! Prometheus file-based service discovery generated from the Biz-Ops
//! registry: health checks are fetched over GraphQL, grouped into target
//! groups, and written to `health-check-service-discovery.json` on a fixed
//! interval.

pub mod discovery;
pub mod scheduler;
pub mod server;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use discovery::{BizOpsDiscovery, DiscoveryDocument, DiscoveryError, FileWriter};
pub use scheduler::Scheduler;
pub use sd_common::{DiscoveryMetrics, SdConfig};
