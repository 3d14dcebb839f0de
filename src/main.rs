//! bizops-sd 主程序
//!
//! 加载配置，启动 metrics 端点与周期调度器，并在收到终止信号后优雅退出

mod cli;
mod error;
mod observability;

use anyhow::Context;
use bizops::{BizOpsClient, ClientConfig};
use bizops_sd::server;
use bizops_sd::{BizOpsDiscovery, DiscoveryMetrics, FileWriter, Scheduler, SdConfig};
use clap::Parser;
use std::time::{Duration, Instant};
use observability::init_observability;
use tokio::sync::broadcast;
use tracing::{error, info};

macro_rules! bootstrap_info {
    ($($arg:tt)*) => {
        println!($($arg)*);
    };
}

macro_rules! bootstrap_error {
    ($($arg:tt)*) => {
        eprintln!($($arg)*);
    };
}

use cli::{Cli, Commands};
use error::{Error, Result};

/// Application launcher utilities
struct ApplicationLauncher;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Test) => ApplicationLauncher::test_config(&cli),
        None => {
            let config = ApplicationLauncher::load_and_validate(&cli)?;
            let grace = config.shutdown_grace();

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("Failed to build the Tokio runtime")?;

            let result = runtime.block_on(ApplicationLauncher::run_application(config));
            let drained_for = result.as_ref().map_or(Duration::ZERO, |waited| *waited);
            runtime.shutdown_timeout(remaining_grace(grace, drained_for));
            result.map(|_| ())
        }
    }
}

impl ApplicationLauncher {
    /// 测试配置是否有效
    fn test_config(cli: &Cli) -> Result<()> {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .init();

        let config = match cli.load_config() {
            Ok(config) => {
                info!("✅ 配置解析成功");
                config
            }
            Err(e) => {
                error!("❌ 配置解析失败: {}", e);
                return Err(e.into());
            }
        };

        if let Err(errors) = config.validate() {
            error!("❌ 配置验证发现问题:");
            for (i, err) in errors.iter().enumerate() {
                if err.starts_with("Warning:") {
                    info!("  {}. ⚠️  {}", i + 1, err);
                } else {
                    error!(event = validation_event(err), "  {}. ❌ {}", i + 1, err);
                }
            }
            if errors.iter().any(|e| !e.starts_with("Warning:")) {
                return Err(Error::validation("配置验证失败"));
            }
        }

        info!(
            "✅ 配置验证通过: port={}, directory={:?}, tick={}, biz_ops={}",
            config.port, config.directory, config.tick, config.registry.base_url
        );
        Ok(())
    }

    /// Merge defaults, file and flags, then refuse to start on any error
    fn load_and_validate(cli: &Cli) -> Result<SdConfig> {
        let config = match cli.load_config() {
            Ok(config) => {
                if let Some(path) = &cli.config {
                    bootstrap_info!("📄 配置文件加载成功: {:?}", path);
                }
                config
            }
            Err(e) => {
                bootstrap_error!("❌ 配置加载失败: {}", e);
                return Err(e.into());
            }
        };

        if let Err(errors) = config.validate() {
            let mut has_critical_errors = false;
            for err in &errors {
                if err.starts_with("Warning:") {
                    bootstrap_info!("⚠️  {}", err);
                } else {
                    bootstrap_error!("[{}] {}", validation_event(err), err);
                    has_critical_errors = true;
                }
            }
            if has_critical_errors {
                return Err(Error::validation("配置验证失败，请修复上述错误"));
            }
        }

        Ok(config)
    }

    /// 运行应用程序的主入口
    ///
    /// Returns how long the shutdown drain took.
    async fn run_application(config: SdConfig) -> Result<Duration> {
        let _observability_guard = init_observability(&config)?;

        let tick = config.tick_interval()?;
        let metrics = DiscoveryMetrics::new()?;

        let client = BizOpsClient::new(&ClientConfig {
            base_url: config.registry.base_url.clone(),
            api_key: config.registry.api_key.clone(),
            timeout: config.registry.timeout(),
        })?;
        let writer = FileWriter::new(config.directory.clone());
        let discovery = BizOpsDiscovery::new(client, writer);
        let scheduler = Scheduler::new(discovery, metrics.clone(), tick);

        // 全局关闭通道（metrics 服务与调度器共享）
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel::<()>(10);
        setup_signal_handler(shutdown_tx.clone());

        let listener = match server::bind(config.listen_addr()).await {
            Ok(listener) => listener,
            Err(e) => {
                error!(
                    event = "ERROR_STARTING",
                    err = %e,
                    addr = %config.listen_addr(),
                    "Failed to start the metrics server."
                );
                return Err(Error::service_startup(format!(
                    "failed to bind {}: {e}",
                    config.listen_addr()
                )));
            }
        };
        let server_handle = server::spawn(listener, metrics, shutdown_tx.clone());

        info!(
            event = "STARTED",
            port = config.port,
            file = ?config.discovery_file(),
            tick = %humantime::format_duration(tick),
            biz_ops = %config.registry.base_url,
            "Service discovery started."
        );

        let scheduler_handle = tokio::spawn(scheduler.run(shutdown_tx.subscribe()));

        let _ = shutdown_rx.recv().await;
        info!("收到关闭信号，等待当前周期结束...");

        let grace = config.shutdown_grace();
        let drain_started = Instant::now();
        let drained = tokio::time::timeout(grace, async {
            if let Err(e) = scheduler_handle.await {
                error!("Scheduler task terminated unexpectedly: {}", e);
            }
            if let Err(e) = server_handle.await {
                error!("Metrics server task terminated unexpectedly: {}", e);
            }
        })
        .await;

        if drained.is_err() {
            error!(
                event = "ERROR_STOPPING",
                grace = %humantime::format_duration(grace),
                "Shutdown grace period elapsed before all tasks stopped."
            );
        }

        info!(event = "STOPPED", "Service discovery stopped.");
        Ok(drain_started.elapsed())
    }
}

/// Grace left for the runtime's own shutdown once the drain has used its share
fn remaining_grace(grace: Duration, drained_for: Duration) -> Duration {
    grace.saturating_sub(drained_for)
}

/// Event name logged for a fatal configuration problem
fn validation_event(message: &str) -> &'static str {
    if message.contains("BIZ_OPS_API_KEY") {
        "MISSING_ENV_VAR"
    } else if message.contains("BIZ_OPS_BASE_URL") {
        "INVALID_ENV_VAR"
    } else {
        "INVALID_CONFIGURATION"
    }
}

/// 监听 Ctrl-C 与 SIGTERM，并广播关闭
fn setup_signal_handler(shutdown_tx: broadcast::Sender<()>) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};

            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(sigterm) => sigterm,
                Err(e) => {
                    error!("无法监听SIGTERM信号: {}", e);
                    return;
                }
            };
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    if let Err(e) = result {
                        error!("无法监听Ctrl-C信号: {}", e);
                        return;
                    }
                    info!("收到Ctrl-C信号，开始优雅关闭...");
                }
                _ = sigterm.recv() => {
                    info!("收到SIGTERM信号，开始优雅关闭...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("无法监听Ctrl-C信号: {}", e);
                return;
            }
            info!("收到Ctrl-C信号，开始优雅关闭...");
        }

        let _ = shutdown_tx.send(());
    });
}
