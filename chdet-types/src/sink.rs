//! The persistence collaborator.

use crate::error::SinkError;
use crate::present::ExperimentInfo;
use crate::trial::TrialResult;
use async_trait::async_trait;
use std::path::Path;

/// Durable storage for a run's output.
///
/// File layout and format are the implementation's business. `persist`
/// receives the full accumulated result list every time it is called, so
/// implementations overwrite rather than append.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Store the participant information collected before the run.
    async fn persist_info(
        &self,
        info: &ExperimentInfo,
        destination: &Path,
    ) -> Result<(), SinkError>;

    /// Store every result collected so far.
    async fn persist(&self, results: &[TrialResult], destination: &Path) -> Result<(), SinkError>;
}
