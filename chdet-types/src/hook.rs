//! The Hook interface: observation and intervention at fixed points of a run.

use crate::duration::DurationMs;
use crate::error::HookError;
use crate::present::ExperimentInfo;
use crate::trial::{Trial, TrialResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Where in the run a hook fires.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookPoint {
    /// After the presentation surface is ready, before instructions.
    Setup,
    /// After the instruction screens.
    BeforeFirstTrial,
    /// After a block is generated, before its first trial.
    PreBlock,
    /// Before each trial is presented.
    PreTrial,
    /// After each trial is scored, before its result is stored.
    PostTrial,
    /// After each block's last trial, including the final block.
    PostBlock,
    /// After the last block, before results are persisted.
    EndExperiment,
}

impl HookPoint {
    /// Every hook point, in the order a run reaches them.
    pub const ALL: [HookPoint; 7] = [
        HookPoint::Setup,
        HookPoint::BeforeFirstTrial,
        HookPoint::PreBlock,
        HookPoint::PreTrial,
        HookPoint::PostTrial,
        HookPoint::PostBlock,
        HookPoint::EndExperiment,
    ];

    /// The conventional hook name, e.g. `pre_trial_hook`.
    pub fn name(&self) -> &'static str {
        match self {
            HookPoint::Setup => "setup_hook",
            HookPoint::BeforeFirstTrial => "before_first_trial_hook",
            HookPoint::PreBlock => "pre_block_hook",
            HookPoint::PreTrial => "pre_trial_hook",
            HookPoint::PostTrial => "post_trial_hook",
            HookPoint::PostBlock => "post_block_hook",
            HookPoint::EndExperiment => "end_experiment_hook",
        }
    }
}

impl std::fmt::Display for HookPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// What a hook can see at its firing point.
/// Read-only: hooks observe and decide, they don't mutate directly.
/// (Replacement happens via the `Replace*` actions.)
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookContext {
    /// Current hook point.
    pub point: HookPoint,
    /// Current block (from `PreBlock` through `PostBlock`).
    pub block_num: Option<usize>,
    /// Current trial (at `PreTrial` and `PostTrial`).
    pub trial_num: Option<usize>,
    /// The upcoming block (only at `PreBlock`).
    pub block: Option<Vec<Trial>>,
    /// The upcoming trial (only at `PreTrial`).
    pub trial: Option<Trial>,
    /// The scored result (only at `PostTrial`).
    pub result: Option<TrialResult>,
    /// Number of results stored so far.
    pub trials_completed: usize,
    /// Participant information from the dialog.
    pub info: ExperimentInfo,
    /// Time since the run started.
    pub elapsed: DurationMs,
}

impl HookContext {
    /// Create a context with only the hook point set.
    pub fn new(point: HookPoint) -> Self {
        Self {
            point,
            block_num: None,
            trial_num: None,
            block: None,
            trial: None,
            result: None,
            trials_completed: 0,
            info: ExperimentInfo::new(),
            elapsed: DurationMs::ZERO,
        }
    }
}

/// What a hook decides to do.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HookAction {
    /// Keep the in-flight data as it is.
    Continue,
    /// Stop the run. It fails with `RunError::Aborted`.
    Halt {
        /// Reason for halting.
        reason: String,
    },
    /// Substitute the upcoming block. Only valid at `PreBlock`.
    ReplaceBlock {
        /// The trials to run instead.
        trials: Vec<Trial>,
    },
    /// Substitute the upcoming trial. Only valid at `PreTrial`.
    ReplaceTrial {
        /// The trial to run instead.
        trial: Trial,
    },
    /// Substitute the stored result. Only valid at `PostTrial`.
    ReplaceResult {
        /// The result to store instead.
        result: TrialResult,
    },
}

impl HookAction {
    /// Short name of the action, for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            HookAction::Continue => "continue",
            HookAction::Halt { .. } => "halt",
            HookAction::ReplaceBlock { .. } => "replace_block",
            HookAction::ReplaceTrial { .. } => "replace_trial",
            HookAction::ReplaceResult { .. } => "replace_result",
        }
    }

    /// Whether this action may be returned at `point`.
    pub fn valid_at(&self, point: HookPoint) -> bool {
        match self {
            HookAction::Continue | HookAction::Halt { .. } => true,
            HookAction::ReplaceBlock { .. } => point == HookPoint::PreBlock,
            HookAction::ReplaceTrial { .. } => point == HookPoint::PreTrial,
            HookAction::ReplaceResult { .. } => point == HookPoint::PostTrial,
        }
    }
}

/// A hook that can observe and intervene in a run.
///
/// Hooks are registered by whoever builds the runner; the runner calls
/// them at the points they declare. Returning an error aborts the run.
/// Use [`HookAction::Halt`] for a deliberate stop.
#[async_trait]
pub trait Hook: Send + Sync {
    /// Which points this hook fires at.
    fn points(&self) -> &[HookPoint];

    /// Called at each registered hook point.
    async fn on_event(&self, ctx: &HookContext) -> Result<HookAction, HookError>;
}
