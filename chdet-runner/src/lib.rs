#![deny(missing_docs)]
//! Experiment runner: the change-detection state machine.
//!
//! Drives a run through its phases in fixed order: participant dialog,
//! setup, instructions, blocks of trials, teardown. At each named point
//! the [`HookRegistry`] is consulted; a hook may let the run continue,
//! halt it, or substitute the block, trial or result in flight.
//!
//! Everything is sequential. The runner awaits each [`Presenter`] call
//! before moving on, and all randomness comes from one seeded stream it
//! owns, so a fixed seed with no hooks reproduces a run's trials exactly.

pub mod scoring;

use chdet_gen::{BlockFactory, default_block_factory};
use chdet_hooks::HookRegistry;
use chdet_types::{
    ConfigError, DurationMs, ExperimentInfo, ExperimentParams, HookAction, HookContext, HookPoint,
    Presenter, Response, ResultSink, RunError, Trial, TrialResult,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Text shown while the first block is prepared.
const LOADING_TEXT: &str = "Loading...";

/// Where a run is.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Constructed, not yet run.
    Idle,
    /// Collecting participant information.
    Dialog,
    /// Showing the loading screen and running the setup hook.
    Setup,
    /// Showing instruction screens.
    Instructions,
    /// Running a block.
    Block {
        /// Zero-based block index.
        block_num: usize,
    },
    /// Running the end hook, persisting, showing the end screen.
    Teardown,
    /// The run completed.
    Finished,
    /// The run stopped with an error.
    Failed,
}

/// Totals for a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Results stored.
    pub trials: usize,
    /// Results with a key press.
    pub responded: usize,
    /// Correct responses.
    pub correct: usize,
    /// Results without a response.
    pub timeouts: usize,
    /// Wall time of the run.
    pub elapsed: DurationMs,
}

impl RunSummary {
    fn from_results(results: &[TrialResult], elapsed: DurationMs) -> Self {
        Self {
            trials: results.len(),
            responded: results.iter().filter(|r| !r.timed_out()).count(),
            correct: results.iter().filter(|r| r.accuracy == Some(true)).count(),
            timeouts: results.iter().filter(|r| r.timed_out()).count(),
            elapsed,
        }
    }

    /// Proportion correct among responded trials; `None` if none were.
    pub fn accuracy(&self) -> Option<f64> {
        (self.responded > 0).then(|| self.correct as f64 / self.responded as f64)
    }
}

/// Runs one change-detection experiment.
///
/// Holds the validated parameters, the generation strategy, the two
/// collaborators and the hook pipeline. A runner runs once; results
/// collected before a failure stay readable through
/// [`results`](Self::results) for best-effort persistence.
pub struct ExperimentRunner {
    params: ExperimentParams,
    blocks: Box<dyn BlockFactory>,
    presenter: Arc<dyn Presenter>,
    sink: Arc<dyn ResultSink>,
    hooks: HookRegistry,
    rng: StdRng,
    results: Vec<TrialResult>,
    info: ExperimentInfo,
    state: RunState,
    started: Option<Instant>,
}

impl ExperimentRunner {
    /// Validate `params` and build a runner with the default generation
    /// stack. The random stream is seeded from `params.seed`, or from the
    /// OS when unset.
    pub fn new(
        params: ExperimentParams,
        presenter: Arc<dyn Presenter>,
        sink: Arc<dyn ResultSink>,
        hooks: HookRegistry,
    ) -> Result<Self, ConfigError> {
        params.validate()?;
        let rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self {
            blocks: Box::new(default_block_factory(&params)),
            params,
            presenter,
            sink,
            hooks,
            rng,
            results: Vec::new(),
            info: ExperimentInfo::new(),
            state: RunState::Idle,
            started: None,
        })
    }

    /// Replace the block generation strategy.
    pub fn with_block_factory(mut self, blocks: impl BlockFactory + 'static) -> Self {
        self.blocks = Box::new(blocks);
        self
    }

    /// The validated parameters.
    pub fn params(&self) -> &ExperimentParams {
        &self.params
    }

    /// Results stored so far.
    pub fn results(&self) -> &[TrialResult] {
        &self.results
    }

    /// Consume the runner, keeping its results.
    pub fn into_results(self) -> Vec<TrialResult> {
        self.results
    }

    /// Participant information from the dialog.
    pub fn info(&self) -> &ExperimentInfo {
        &self.info
    }

    /// Current phase.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Run the experiment to completion.
    pub async fn run(&mut self) -> Result<RunSummary, RunError> {
        if self.state != RunState::Idle {
            return Err(RunError::AlreadyStarted);
        }
        let started = Instant::now();
        self.started = Some(started);
        tracing::info!(
            experiment = %self.params.experiment_name,
            blocks = self.params.number_of_blocks,
            trials_per_block = self.params.number_of_trials_per_block,
            seed = ?self.params.seed,
            "chdet.run.start"
        );

        match self.execute().await {
            Ok(()) => {
                self.state = RunState::Finished;
                let summary = RunSummary::from_results(&self.results, self.elapsed());
                tracing::info!(
                    trials = summary.trials,
                    correct = summary.correct,
                    timeouts = summary.timeouts,
                    elapsed_ms = summary.elapsed.as_millis(),
                    "chdet.run.end"
                );
                Ok(summary)
            }
            Err(e) => {
                self.state = RunState::Failed;
                tracing::warn!(error = %e, completed = self.results.len(), "chdet.run.failed");
                Err(e)
            }
        }
    }

    async fn execute(&mut self) -> Result<(), RunError> {
        // 1. Participant information
        self.state = RunState::Dialog;
        self.info = self
            .presenter
            .prompt_dialog(&self.params.questionaire_dict)
            .await?
            .ok_or(RunError::DialogCancelled)?;
        self.sink
            .persist_info(&self.info, &self.params.data_directory)
            .await?;

        // 2. Setup
        self.state = RunState::Setup;
        self.presenter.display_text(LOADING_TEXT, false).await?;
        self.dispatch(&self.context(HookPoint::Setup)).await?;

        // 3. Instructions
        self.state = RunState::Instructions;
        for screen in &self.params.instruct_text {
            self.presenter.display_text(screen, true).await?;
        }
        self.dispatch(&self.context(HookPoint::BeforeFirstTrial))
            .await?;

        // 4. Blocks
        for block_num in 0..self.params.number_of_blocks {
            self.state = RunState::Block { block_num };
            self.run_block(block_num).await?;
        }

        // 5. Teardown
        self.state = RunState::Teardown;
        self.dispatch(&self.context(HookPoint::EndExperiment))
            .await?;
        self.sink
            .persist(&self.results, &self.params.data_directory)
            .await?;
        self.presenter
            .display_text(&self.params.end_text, true)
            .await?;
        Ok(())
    }

    async fn run_block(&mut self, block_num: usize) -> Result<(), RunError> {
        let mut block = self
            .blocks
            .make_block(block_num, &self.params, &mut self.rng)?;

        let mut ctx = self.context(HookPoint::PreBlock);
        ctx.block_num = Some(block_num);
        ctx.block = Some(block.clone());
        if let HookAction::ReplaceBlock { trials } = self.dispatch(&ctx).await? {
            for (i, trial) in trials.iter().enumerate() {
                trial.check().map_err(|reason| RunError::HookContractViolation {
                    point: HookPoint::PreBlock,
                    reason: format!("replacement trial {i}: {reason}"),
                })?;
            }
            block = trials;
        }
        for (trial_num, trial) in block.iter_mut().enumerate() {
            trial.block_num = block_num;
            trial.trial_num = trial_num;
        }
        tracing::info!(block = block_num, trials = block.len(), "chdet.block.start");

        for trial in block {
            self.run_trial(trial).await?;
        }

        let mut ctx = self.context(HookPoint::PostBlock);
        ctx.block_num = Some(block_num);
        self.dispatch(&ctx).await?;

        if self.params.save_each_block {
            self.sink
                .persist(&self.results, &self.params.data_directory)
                .await?;
        }
        tracing::info!(
            block = block_num,
            completed = self.results.len(),
            "chdet.block.end"
        );

        if block_num + 1 < self.params.number_of_blocks {
            self.presenter
                .display_text(&self.params.break_text, true)
                .await?;
        }
        Ok(())
    }

    async fn run_trial(&mut self, planned: Trial) -> Result<(), RunError> {
        let (block_num, trial_num) = (planned.block_num, planned.trial_num);

        let mut ctx = self.context(HookPoint::PreTrial);
        ctx.block_num = Some(block_num);
        ctx.trial_num = Some(trial_num);
        ctx.trial = Some(planned.clone());
        let trial = match self.dispatch(&ctx).await? {
            HookAction::ReplaceTrial { mut trial } => {
                trial
                    .check()
                    .map_err(|reason| RunError::HookContractViolation {
                        point: HookPoint::PreTrial,
                        reason,
                    })?;
                trial.block_num = block_num;
                trial.trial_num = trial_num;
                trial
            }
            _ => planned,
        };

        let response = self.present(&trial).await?;
        if let Response::Key { key, .. } = &response {
            if self.params.quit_key.as_deref() == Some(key.as_str()) {
                return Err(RunError::Aborted {
                    reason: format!("quit key '{key}' pressed"),
                });
            }
        }
        if response == Response::Timeout {
            tracing::warn!(block = block_num, trial = trial_num, "chdet.trial.timeout");
        }

        let mut result = scoring::score(&trial, &self.params.keys, &response, now_ms());

        let mut ctx = self.context(HookPoint::PostTrial);
        ctx.block_num = Some(block_num);
        ctx.trial_num = Some(trial_num);
        ctx.result = Some(result.clone());
        if let HookAction::ReplaceResult { result: replacement } = self.dispatch(&ctx).await? {
            result = replacement;
        }

        tracing::debug!(
            block = block_num,
            trial = trial_num,
            set_size = result.set_size,
            is_change = result.is_change,
            response = ?result.response,
            accuracy = ?result.accuracy,
            rt_ms = ?result.rt_ms,
            "chdet.trial.scored"
        );
        self.results.push(result);

        self.presenter.display_fixation(self.params.iti_time).await?;
        Ok(())
    }

    /// Sample, retention interval, test, response.
    async fn present(&self, trial: &Trial) -> Result<Response, RunError> {
        let params = &self.params;
        self.presenter
            .display(&trial.sample, params.stim_size, Some(params.sample_time))
            .await?;
        self.presenter.display_fixation(params.delay_time).await?;
        self.presenter
            .display(&trial.test, params.stim_size, None)
            .await?;

        let mut valid_keys = params.keys.to_vec();
        if let Some(quit) = &params.quit_key {
            valid_keys.push(quit.clone());
        }
        Ok(self
            .presenter
            .await_response(&valid_keys, params.response_timeout)
            .await?)
    }

    /// Run the hooks for `ctx.point` and enforce the action contract.
    async fn dispatch(&self, ctx: &HookContext) -> Result<HookAction, RunError> {
        let point = ctx.point;
        let action = self
            .hooks
            .dispatch(ctx)
            .await
            .map_err(|source| RunError::HookFailed { point, source })?;
        if !action.valid_at(point) {
            return Err(RunError::HookContractViolation {
                point,
                reason: format!("{} is not valid here", action.name()),
            });
        }
        match action {
            HookAction::Halt { reason } => {
                tracing::warn!(hook = point.name(), %reason, "chdet.run.halted");
                Err(RunError::Aborted { reason })
            }
            action => Ok(action),
        }
    }

    fn context(&self, point: HookPoint) -> HookContext {
        let mut ctx = HookContext::new(point);
        ctx.trials_completed = self.results.len();
        ctx.info = self.info.clone();
        ctx.elapsed = self.elapsed();
        ctx
    }

    fn elapsed(&self) -> DurationMs {
        self.started
            .map(|s| DurationMs::from(s.elapsed()))
            .unwrap_or(DurationMs::ZERO)
    }
}

impl std::fmt::Debug for ExperimentRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExperimentRunner")
            .field("experiment", &self.params.experiment_name)
            .field("state", &self.state)
            .field("results", &self.results.len())
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
