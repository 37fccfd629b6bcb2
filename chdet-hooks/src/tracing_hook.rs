//! A [`Hook`] that emits structured [`tracing`] events at every point.

use async_trait::async_trait;
use chdet_types::hook::{Hook, HookAction, HookContext, HookPoint};
use chdet_types::HookError;

/// Observes every hook point and logs it. Always returns
/// [`HookAction::Continue`].
///
/// | Point | Level |
/// |-------|-------|
/// | PreTrial, PostTrial | `DEBUG` |
/// | everything else | `INFO` |
///
/// ```no_run
/// use chdet_hooks::{HookRegistry, TracingHook};
/// use std::sync::Arc;
///
/// let hooks = HookRegistry::new().with(Arc::new(TracingHook::new()));
/// # let _ = hooks;
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingHook;

impl TracingHook {
    /// Create a new `TracingHook`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Hook for TracingHook {
    fn points(&self) -> &[HookPoint] {
        &HookPoint::ALL
    }

    async fn on_event(&self, ctx: &HookContext) -> Result<HookAction, HookError> {
        match ctx.point {
            HookPoint::PreTrial => {
                if let Some(trial) = &ctx.trial {
                    tracing::debug!(
                        block = trial.block_num,
                        trial = trial.trial_num,
                        set_size = trial.set_size,
                        is_change = trial.is_change,
                        "chdet.hook.pre_trial"
                    );
                }
            }
            HookPoint::PostTrial => {
                if let Some(result) = &ctx.result {
                    tracing::debug!(
                        block = result.block_num,
                        trial = result.trial_num,
                        response = ?result.response,
                        accuracy = ?result.accuracy,
                        rt_ms = ?result.rt_ms,
                        "chdet.hook.post_trial"
                    );
                }
            }
            HookPoint::PreBlock => {
                tracing::info!(
                    block = ?ctx.block_num,
                    trials = ctx.block.as_ref().map_or(0, Vec::len),
                    "chdet.hook.pre_block"
                );
            }
            point => {
                tracing::info!(
                    hook = point.name(),
                    block = ?ctx.block_num,
                    completed = ctx.trials_completed,
                    elapsed_ms = ctx.elapsed.as_millis(),
                    "chdet.hook.point"
                );
            }
        }
        Ok(HookAction::Continue)
    }
}
