//! In-memory doubles for the registry client and document writer

use crate::discovery::{DocumentWriter, WriteError};
use async_trait::async_trait;
use bizops::{ClientError, ClientResult, GraphQlClient};
use serde::de::DeserializeOwned;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Answers every query with the same JSON document, or the same error
#[derive(Debug, Clone)]
pub(crate) struct FakeClient {
    response: Result<serde_json::Value, String>,
}

impl FakeClient {
    pub(crate) fn responding(response: serde_json::Value) -> Self {
        Self {
            response: Ok(response),
        }
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
        }
    }
}

#[async_trait]
impl GraphQlClient for FakeClient {
    async fn query<T>(&self, _query: &str) -> ClientResult<T>
    where
        T: DeserializeOwned + Send,
    {
        match &self.response {
            Ok(value) => Ok(serde_json::from_value(value.clone())?),
            Err(message) => Err(ClientError::Gateway {
                status: 500,
                message: message.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum WriterMode {
    #[default]
    Record,
    ReportZero,
    Fail,
}

/// Records every document it is asked to write
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryWriter {
    mode: WriterMode,
    delay: Duration,
    writes: Arc<Mutex<Vec<Vec<u8>>>>,
    finished_at: Arc<Mutex<Vec<Instant>>>,
}

impl MemoryWriter {
    pub(crate) fn reporting_zero() -> Self {
        Self {
            mode: WriterMode::ReportZero,
            ..Default::default()
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            mode: WriterMode::Fail,
            ..Default::default()
        }
    }

    /// Takes `delay` (on the tokio clock) before each write completes
    pub(crate) fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }

    pub(crate) fn writes(&self) -> Vec<Vec<u8>> {
        self.writes.lock().unwrap().clone()
    }

    pub(crate) fn finished_at(&self) -> Vec<Instant> {
        self.finished_at.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentWriter for MemoryWriter {
    async fn write(&self, document: &[u8]) -> Result<usize, WriteError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match self.mode {
            WriterMode::Record => {
                self.writes.lock().unwrap().push(document.to_vec());
                self.finished_at.lock().unwrap().push(Instant::now());
                Ok(document.len())
            }
            WriterMode::ReportZero => Ok(0),
            WriterMode::Fail => Err(WriteError::Io {
                path: PathBuf::from("/memory"),
                source: io::Error::other("Write failed"),
            }),
        }
    }
}
