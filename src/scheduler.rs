//! 周期调度器
//!
//! Runs one discovery cycle at startup and one per tick afterwards until a
//! shutdown signal arrives. A cycle in progress is never interrupted; the
//! shutdown signal is only observed between cycles.

use crate::discovery::{BizOpsDiscovery, DiscoveryError, DocumentWriter};
use bizops::GraphQlClient;
use sd_common::DiscoveryMetrics;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info};

pub struct Scheduler<C, W> {
    discovery: BizOpsDiscovery<C, W>,
    metrics: DiscoveryMetrics,
    tick: Duration,
}

impl<C, W> Scheduler<C, W>
where
    C: GraphQlClient,
    W: DocumentWriter,
{
    pub fn new(
        discovery: BizOpsDiscovery<C, W>,
        metrics: DiscoveryMetrics,
        tick: Duration,
    ) -> Self {
        Self {
            discovery,
            metrics,
            tick,
        }
    }

    /// Shared handle on the cycle counters
    pub fn metrics(&self) -> DiscoveryMetrics {
        self.metrics.clone()
    }

    pub fn discovery(&self) -> &BizOpsDiscovery<C, W> {
        &self.discovery
    }

    /// Run a single cycle and account for it
    ///
    /// Every attempt bumps the writes counter; failures also bump the
    /// failures counter.
    pub async fn run_once(&self) -> Result<(), DiscoveryError> {
        let result = self.discovery.write().await;

        if let Err(e) = &result {
            error!(
                event = "ERROR_CONFIGURATION_WRITE",
                kind = e.kind(),
                err = %e,
                "Failed to write the configuration."
            );
            self.metrics.record_failure();
        }
        self.metrics.record_attempt();

        result
    }

    /// Loop until `shutdown_rx` fires (or its sender is dropped)
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) {
        let mut ticker = interval(self.tick);
        // 周期超时的 tick 依次补跑，不跳过也不合并
        ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);

        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    info!("Scheduler received shutdown signal");
                    break;
                }
                _ = ticker.tick() => {
                    debug!("Starting service discovery cycle");
                    let _ = self.run_once().await;
                }
            }
        }

        info!(
            writes = self.metrics.writes_total(),
            failures = self.metrics.failures_total(),
            "Scheduler stopped"
        );
    }
}
