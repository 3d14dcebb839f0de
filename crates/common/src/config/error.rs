//! 配置相关错误类型
//!
//! 定义所有与配置解析、加载相关的错误

use std::path::PathBuf;
use thiserror::Error;

/// 配置相关错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file does not exist: {path:?}")]
    FileNotFound { path: PathBuf },

    #[error("Path is not a valid file: {path:?}")]
    NotAFile { path: PathBuf },

    #[error("Failed to read configuration file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid duration '{value}': {source}")]
    InvalidDuration {
        value: String,
        #[source]
        source: humantime::DurationError,
    },
}
