//! Error types for each stage of a run.

use crate::hook::HookPoint;
use thiserror::Error;

/// A parameter failed validation or could not be parsed.
///
/// Raised before any presentation begins.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field holds a value outside its documented range.
    #[error("invalid parameter {field}: {reason}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// The parameter document could not be parsed.
    #[error("could not parse parameters: {0}")]
    Parse(String),
}

impl ConfigError {
    /// Shorthand for [`ConfigError::Invalid`].
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Trial or block generation could not satisfy its constraints.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenError {
    /// No layout satisfying distance, quadrant and region constraints was
    /// found within the attempt budget.
    #[error("no valid layout for set size {set_size} after {attempts} attempts")]
    LayoutInfeasible {
        /// The number of locations requested.
        set_size: usize,
        /// Candidate draws spent before giving up.
        attempts: usize,
    },

    /// Unique sample colours were requested but the palette is too small.
    #[error("palette of {palette_size} colours cannot fill set size {set_size} without repeats")]
    PaletteExhausted {
        /// The number of colours needed.
        set_size: usize,
        /// The number of palette entries available.
        palette_size: usize,
    },

    /// No palette colour qualifies as a foil for a change trial.
    #[error("no foil colour available for set size {set_size}")]
    FoilUnavailable {
        /// Set size of the trial being built.
        set_size: usize,
    },

    /// A trial with zero items was requested.
    #[error("set size must be at least 1")]
    EmptySetSize,
}

/// A hook failed while running. Hook failures abort the run.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum HookError {
    /// The hook execution failed.
    #[error("hook failed: {0}")]
    Failed(String),

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// The presentation collaborator failed (window lost, device error).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PresentError {
    /// Drawing or input handling failed.
    #[error("presentation failed: {0}")]
    Failed(String),

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// The persistence collaborator failed.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SinkError {
    /// Writing to the destination failed.
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// Results could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Why an experiment run stopped early.
///
/// Every variant is fatal. Results collected before the failure stay on
/// the runner for best-effort persistence by the caller.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RunError {
    /// Parameters were rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Block or trial generation failed.
    #[error("generation failed: {0}")]
    Generation(#[from] GenError),

    /// A hook returned an error.
    #[error("{point} failed: {source}")]
    HookFailed {
        /// Where the hook was running.
        point: HookPoint,
        /// The hook's error.
        #[source]
        source: HookError,
    },

    /// A hook returned an action that does not fit its hook point, or a
    /// replacement trial that is internally inconsistent.
    #[error("hook contract violation at {point}: {reason}")]
    HookContractViolation {
        /// Where the hook was running.
        point: HookPoint,
        /// What was wrong with the returned value.
        reason: String,
    },

    /// The run was stopped by a hook or by the participant.
    #[error("run aborted: {reason}")]
    Aborted {
        /// Why the run stopped.
        reason: String,
    },

    /// The participant dismissed the information dialog.
    #[error("participant dialog was cancelled")]
    DialogCancelled,

    /// `run` was called on a runner that has already run.
    #[error("experiment has already been started")]
    AlreadyStarted,

    /// The presentation collaborator failed.
    #[error(transparent)]
    Presentation(#[from] PresentError),

    /// The persistence collaborator failed.
    #[error(transparent)]
    Persistence(#[from] SinkError),
}
