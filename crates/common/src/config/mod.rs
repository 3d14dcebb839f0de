//! 统一配置管理系统
//!
//! 本模块是服务发现进程配置的"单一真理之源"。
//! 所有配置项的定义、文档、默认值都在这里统一管理。
//! 命令行参数和环境变量在二进制入口处覆盖这里加载的值。

mod error;
pub mod registry;

pub use error::ConfigError;
pub use registry::RegistryConfig;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Filename of the generated service discovery document
pub const DISCOVERY_FILENAME: &str = "health-check-service-discovery.json";

/// 服务发现进程的主配置结构体
///
/// 配置文件使用 TOML 格式；所有字段都有默认值，
/// 因此一个空文件（或没有文件）也是合法的起点。
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SdConfig {
    /// Directory the discovery document is written to
    ///
    /// Created (with parents) on first write if missing. A path that exists
    /// but is not a directory is a fatal configuration error.
    /// Default: "/etc/prometheus"
    #[serde(
        default = "default_directory",
        serialize_with = "serialize_pathbuf",
        deserialize_with = "deserialize_pathbuf"
    )]
    pub directory: PathBuf,

    /// Duration between refreshes, humantime syntax ("60s", "5m", "1h 30m")
    #[serde(default = "default_tick")]
    pub tick: String,

    /// Port for the Prometheus metrics endpoint
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable more detailed logging (debug level)
    #[serde(default)]
    pub verbose: bool,

    /// Seconds to wait for an in-flight cycle after a termination signal
    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u64,

    /// Biz-Ops registry connection
    #[serde(default)]
    pub registry: RegistryConfig,

    /// 可观测性配置（日志）
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// 可观测性配置
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ObservabilityConfig {
    /// 过滤级别
    ///
    /// 支持 EnvFilter 语法（如 "info,hyper=warn"）。默认值 "info"。
    #[serde(default = "default_filter_level")]
    pub filter_level: String,

    #[serde(default)]
    pub log: LogConfig,
}

/// 日志配置
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogConfig {
    /// 日志输出目标
    ///
    /// - "console": 仅输出到控制台（默认）
    /// - "file": 输出到文件
    #[serde(default = "default_log_output")]
    pub output: String,

    /// 日志格式
    ///
    /// - "auto": 终端使用可读格式，否则输出 JSON（默认）
    /// - "json": 始终输出 JSON
    /// - "pretty": 始终输出可读格式
    #[serde(default = "default_log_format")]
    pub format: String,

    /// 日志轮转开关，output = "file" 时有效
    #[serde(default)]
    pub rotate: bool,

    /// 日志文件目录，output = "file" 时有效
    #[serde(default = "default_log_path")]
    pub path: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            filter_level: default_filter_level(),
            log: LogConfig::default(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            output: default_log_output(),
            format: default_log_format(),
            rotate: false,
            path: default_log_path(),
        }
    }
}

fn default_directory() -> PathBuf {
    PathBuf::from("/etc/prometheus")
}

fn default_tick() -> String {
    "60s".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_shutdown_grace_secs() -> u64 {
    5
}

fn default_filter_level() -> String {
    "info".to_string()
}

fn default_log_output() -> String {
    "console".to_string()
}

fn default_log_format() -> String {
    "auto".to_string()
}

fn default_log_path() -> String {
    "logs/".to_string()
}

fn serialize_pathbuf<S>(path: &Path, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    path.display().to_string().serialize(serializer)
}

fn deserialize_pathbuf<'de, D>(deserializer: D) -> Result<PathBuf, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(PathBuf::from(s))
}

impl Default for SdConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            tick: default_tick(),
            port: default_port(),
            verbose: false,
            shutdown_grace_secs: default_shutdown_grace_secs(),
            registry: RegistryConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl SdConfig {
    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(ConfigError::FileNotFound {
                path: path_ref.to_path_buf(),
            });
        }

        if !path_ref.is_file() {
            return Err(ConfigError::NotAFile {
                path: path_ref.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
            path: path_ref.to_path_buf(),
            source,
        })?;

        Self::from_toml(&content)
    }

    /// 从 TOML 字符串加载配置
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// 将配置序列化为 TOML 字符串
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Parsed refresh interval
    pub fn tick_interval(&self) -> Result<Duration, ConfigError> {
        humantime::parse_duration(self.tick.trim()).map_err(|source| {
            ConfigError::InvalidDuration {
                value: self.tick.clone(),
                source,
            }
        })
    }

    /// Grace period granted to an in-flight cycle on shutdown
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }

    /// Listen address of the metrics endpoint (all interfaces)
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    /// Full path of the generated discovery document
    pub fn discovery_file(&self) -> PathBuf {
        self.directory.join(DISCOVERY_FILENAME)
    }

    /// 返回可观测性配置引用
    pub fn observability_config(&self) -> &ObservabilityConfig {
        &self.observability
    }

    /// 计算日志过滤指令：RUST_LOG 优先，其次 verbose，最后配置值
    pub fn filter_directive(&self, rust_log: Option<&str>) -> String {
        rust_log
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| {
                if self.verbose {
                    "debug".to_string()
                } else {
                    self.observability.filter_level.clone()
                }
            })
    }

    /// 验证配置有效性
    ///
    /// Collects every problem rather than stopping at the first one.
    /// Entries prefixed with "Warning:" are advisory and do not block startup.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Err(registry_errors) = self.registry.validate() {
            errors.extend(registry_errors);
        }

        match self.tick_interval() {
            Ok(tick) if tick.is_zero() => {
                errors.push("tick must be greater than zero".to_string());
            }
            Ok(_) => {}
            Err(e) => errors.push(e.to_string()),
        }

        if self.directory.as_os_str().is_empty() {
            errors.push("directory cannot be empty".to_string());
        } else if self.directory.exists() && !self.directory.is_dir() {
            errors.push(format!(
                "directory {:?} exists but is not a directory",
                self.directory
            ));
        }

        if self.port == 0 {
            errors.push("Warning: port 0 binds the metrics endpoint to a random port".to_string());
        }

        {
            let main_level = self
                .observability
                .filter_level
                .split(',')
                .next()
                .unwrap_or("")
                .trim();
            if !["trace", "debug", "info", "warn", "error"].contains(&main_level) {
                errors.push(format!(
                    "Invalid filter level '{}', must start with one of: trace, debug, info, warn, error",
                    self.observability.filter_level
                ));
            }
        }

        if !["console", "file"].contains(&self.observability.log.output.as_str()) {
            errors.push(format!(
                "Invalid log output '{}' (observability.log.output), must be 'console' or 'file'",
                self.observability.log.output
            ));
        }

        if !["auto", "json", "pretty"].contains(&self.observability.log.format.as_str()) {
            errors.push(format!(
                "Invalid log format '{}' (observability.log.format), must be 'auto', 'json' or 'pretty'",
                self.observability.log.format
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
