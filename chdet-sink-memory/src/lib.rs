#![deny(missing_docs)]
//! In-memory implementation of the [`ResultSink`] trait.
//!
//! Keeps the latest participant information and result list per
//! destination behind a `RwLock`. Every `persist` call replaces what was
//! stored for that destination, matching the overwrite contract of the
//! trait. Suitable for tests and for hosts that serialize results
//! themselves.

use async_trait::async_trait;
use chdet_types::{ExperimentInfo, ResultSink, SinkError, TrialResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Stored {
    info: HashMap<PathBuf, ExperimentInfo>,
    results: HashMap<PathBuf, Vec<TrialResult>>,
    persist_calls: usize,
}

/// In-memory result sink.
#[derive(Debug, Default)]
pub struct MemorySink {
    data: RwLock<Stored>,
}

impl MemorySink {
    /// Create a new empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Participant information stored for `destination`.
    pub async fn info(&self, destination: &Path) -> Option<ExperimentInfo> {
        self.data.read().await.info.get(destination).cloned()
    }

    /// The latest result list stored for `destination`.
    pub async fn results(&self, destination: &Path) -> Option<Vec<TrialResult>> {
        self.data.read().await.results.get(destination).cloned()
    }

    /// How many times `persist` has been called, across destinations.
    pub async fn persist_count(&self) -> usize {
        self.data.read().await.persist_calls
    }

    /// The stored results for `destination` as a JSON array.
    pub async fn to_json(&self, destination: &Path) -> Result<serde_json::Value, SinkError> {
        let data = self.data.read().await;
        let results = data.results.get(destination).map(Vec::as_slice).unwrap_or(&[]);
        serde_json::to_value(results).map_err(|e| SinkError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl ResultSink for MemorySink {
    async fn persist_info(
        &self,
        info: &ExperimentInfo,
        destination: &Path,
    ) -> Result<(), SinkError> {
        let mut data = self.data.write().await;
        data.info.insert(destination.to_path_buf(), info.clone());
        Ok(())
    }

    async fn persist(&self, results: &[TrialResult], destination: &Path) -> Result<(), SinkError> {
        let mut data = self.data.write().await;
        data.results
            .insert(destination.to_path_buf(), results.to_vec());
        data.persist_calls += 1;
        Ok(())
    }
}
