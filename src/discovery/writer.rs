//! Discovery document persistence

use async_trait::async_trait;
use sd_common::config::DISCOVERY_FILENAME;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("{path:?} exists but is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Destination of the serialized discovery document
#[async_trait]
pub trait DocumentWriter: Send + Sync {
    /// Replace the stored document, returning the number of bytes written
    async fn write(&self, document: &[u8]) -> Result<usize, WriteError>;
}

/// Writes `health-check-service-discovery.json` under a directory
///
/// The directory is created on demand. Content goes to a sibling temp file
/// first and is renamed over the target, so readers see either the old or
/// the new document.
#[derive(Debug, Clone)]
pub struct FileWriter {
    directory: PathBuf,
}

impl FileWriter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Path of the document this writer maintains
    pub fn path(&self) -> PathBuf {
        self.directory.join(DISCOVERY_FILENAME)
    }

    fn temp_path(&self) -> PathBuf {
        self.directory.join(format!(".{DISCOVERY_FILENAME}.tmp"))
    }

    async fn ensure_directory(&self) -> Result<(), WriteError> {
        match tokio::fs::metadata(&self.directory).await {
            Ok(metadata) if metadata.is_dir() => Ok(()),
            Ok(_) => Err(WriteError::NotADirectory {
                path: self.directory.clone(),
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Creating discovery directory {:?}", self.directory);
                tokio::fs::create_dir_all(&self.directory)
                    .await
                    .map_err(|source| WriteError::Io {
                        path: self.directory.clone(),
                        source,
                    })
            }
            Err(source) => Err(WriteError::Io {
                path: self.directory.clone(),
                source,
            }),
        }
    }
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> WriteError {
    let path = path.to_path_buf();
    move |source| WriteError::Io { path, source }
}

#[async_trait]
impl DocumentWriter for FileWriter {
    async fn write(&self, document: &[u8]) -> Result<usize, WriteError> {
        self.ensure_directory().await?;

        let temp_path = self.temp_path();

        tokio::fs::write(&temp_path, document)
            .await
            .map_err(io_err(&temp_path))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o644))
                .await
                .map_err(io_err(&temp_path))?;
        }

        let path = self.path();
        tokio::fs::rename(&temp_path, &path)
            .await
            .map_err(io_err(&path))?;

        Ok(document.len())
    }
}
