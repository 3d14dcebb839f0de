//! 命令行界面定义
//!
//! 每个运行参数都可以来自配置文件、环境变量或命令行标志，
//! 后者优先级更高。
use clap::{Parser, Subcommand};
use sd_common::{ConfigError, SdConfig};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "bizops-sd")]
#[command(version)]
#[command(
    about = "Writes Biz-Ops health checks as a Prometheus file_sd target list, refreshed on a fixed interval"
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Option<Commands>,

    /// Configuration file path (optional; built-in defaults apply otherwise)
    #[arg(short, long, global = true)]
    pub(crate) config: Option<PathBuf>,

    /// Port the metrics endpoint listens on
    #[arg(short, long, env = "PORT")]
    pub(crate) port: Option<u16>,

    /// Directory the discovery document is written to
    #[arg(short, long, env = "DIRECTORY")]
    pub(crate) directory: Option<PathBuf>,

    /// Interval between refreshes, e.g. "60s" or "5m"
    #[arg(short, long, env = "TICK", value_parser = humantime::parse_duration)]
    pub(crate) tick: Option<Duration>,

    /// Enable debug logging
    #[arg(short, long, env = "VERBOSE")]
    pub(crate) verbose: bool,

    /// Biz-Ops API base URL
    #[arg(long, env = "BIZ_OPS_BASE_URL")]
    pub(crate) biz_ops_base_url: Option<String>,

    /// Biz-Ops API key
    #[arg(long, env = "BIZ_OPS_API_KEY", hide_env_values = true)]
    pub(crate) biz_ops_api_key: Option<String>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Load and validate the configuration, then exit
    Test,
}

impl Cli {
    /// Build the effective configuration: defaults, then file, then flags/env
    pub(crate) fn load_config(&self) -> Result<SdConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => SdConfig::from_file(path)?,
            None => SdConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut SdConfig) {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(directory) = &self.directory {
            config.directory = directory.clone();
        }
        if let Some(tick) = self.tick {
            config.tick = humantime::format_duration(tick).to_string();
        }
        if self.verbose {
            config.verbose = true;
        }
        if let Some(base_url) = &self.biz_ops_base_url {
            config.registry.base_url = base_url.clone();
        }
        if let Some(api_key) = &self.biz_ops_api_key {
            config.registry.api_key = api_key.clone();
        }
    }
}
