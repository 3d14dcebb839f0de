//! Prometheus 监控指标模块
//!
//! 服务发现循环的计数器，由调度器持有并通过共享只读访问暴露给 /metrics 端点。
//! 每个实例拥有独立的 Registry，不使用进程级全局变量。

use prometheus::{Encoder, IntCounter, Registry, TextEncoder};

/// Counters describing the discovery loop
///
/// Cloning is cheap and every clone observes the same atomic counters,
/// so the scheduler and the HTTP endpoint can each hold one.
#[derive(Clone, Debug)]
pub struct DiscoveryMetrics {
    registry: Registry,
    writes_total: IntCounter,
    failures_total: IntCounter,
}

impl DiscoveryMetrics {
    /// 创建并注册所有指标
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let writes_total = IntCounter::new(
            "service_discovery_writes_total",
            "Number of service discovery file writes",
        )?;
        let failures_total = IntCounter::new(
            "service_discovery_failures_total",
            "Number of service discovery failures",
        )?;

        registry.register(Box::new(writes_total.clone()))?;
        registry.register(Box::new(failures_total.clone()))?;

        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        Ok(Self {
            registry,
            writes_total,
            failures_total,
        })
    }

    /// Count one cycle attempt, successful or not
    pub fn record_attempt(&self) {
        self.writes_total.inc();
    }

    /// Count one failed cycle
    pub fn record_failure(&self) {
        self.failures_total.inc();
    }

    pub fn writes_total(&self) -> u64 {
        self.writes_total.get()
    }

    pub fn failures_total(&self) -> u64 {
        self.failures_total.get()
    }

    /// 导出 Prometheus 文本格式的指标
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;

        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
