use crate::error::Result;
use sd_common::{LogConfig, SdConfig};
use std::fs;
use std::io::IsTerminal;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

const LOG_FILE_NAME: &str = "bizops-sd.log";

/// Keeps the non-blocking log writer alive; drop it last to flush
#[derive(Default)]
pub struct ObservabilityGuard {
    _log_guard: Option<WorkerGuard>,
}

/// Initialize logging based on configuration
pub fn init_observability(config: &SdConfig) -> Result<ObservabilityGuard> {
    let log_config = &config.observability_config().log;
    let filter = create_env_filter(config);

    match log_config.output.as_str() {
        "file" => {
            fs::create_dir_all(&log_config.path)?;
            let (non_blocking, worker_guard) = build_file_writer(log_config)?;
            init_subscriber_with_writer(non_blocking, false, use_json(log_config, false), filter);
            Ok(ObservabilityGuard {
                _log_guard: Some(worker_guard),
            })
        }
        _ => {
            let is_terminal = std::io::stdout().is_terminal();
            init_subscriber_with_writer(
                std::io::stdout,
                is_terminal,
                use_json(log_config, is_terminal),
                filter,
            );
            Ok(ObservabilityGuard::default())
        }
    }
}

/// JSON unless asked for "pretty", or "auto" on an interactive terminal
fn use_json(log_config: &LogConfig, is_terminal: bool) -> bool {
    match log_config.format.as_str() {
        "json" => true,
        "pretty" => false,
        _ => !is_terminal,
    }
}

fn create_env_filter(config: &SdConfig) -> EnvFilter {
    let rust_log = std::env::var("RUST_LOG").ok();
    let directive = config.filter_directive(rust_log.as_deref());

    EnvFilter::try_new(&directive).unwrap_or_else(|_| {
        println!(
            "Failed to parse filter directive: {}. Falling back to default: info",
            directive
        );
        EnvFilter::new("info")
    })
}

fn init_subscriber_with_writer<W>(writer: W, use_ansi: bool, json: bool, filter: EnvFilter)
where
    W: for<'a> fmt::MakeWriter<'a> + Send + Sync + 'static,
{
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_ansi(use_ansi)
        .with_writer(writer);

    // try_init: 测试中可能已经安装过全局 subscriber
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json().flatten_event(true))
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.with_line_number(true).with_file(true))
            .try_init()
            .ok();
    }
}

fn build_file_writer(log_config: &LogConfig) -> Result<(NonBlocking, WorkerGuard)> {
    if log_config.rotate {
        let file_appender = tracing_appender::rolling::daily(&log_config.path, LOG_FILE_NAME);
        Ok(tracing_appender::non_blocking(file_appender))
    } else {
        let log_file_path = std::path::Path::new(&log_config.path).join(LOG_FILE_NAME);
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file_path)?;
        Ok(tracing_appender::non_blocking(file))
    }
}
