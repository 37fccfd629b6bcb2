#![deny(missing_docs)]
//! Hook registry and composition for change-detection runs.
//!
//! The [`HookRegistry`] collects multiple [`Hook`] implementations into
//! an ordered pipeline. At each hook point, hooks registered for that
//! point are dispatched in registration order. The pipeline
//! short-circuits on the first action other than `Continue`; later hooks
//! are not called. A hook error also stops the pipeline and is returned
//! to the caller, which treats it as fatal.

mod fn_hook;
mod tracing_hook;

pub use fn_hook::FnHook;
pub use tracing_hook::TracingHook;

use chdet_types::hook::{Hook, HookAction, HookContext, HookPoint};
use chdet_types::HookError;
use std::sync::Arc;

/// A registry that dispatches hook events to an ordered pipeline of hooks.
#[derive(Clone, Default)]
pub struct HookRegistry {
    hooks: Vec<Arc<dyn Hook>>,
}

impl HookRegistry {
    /// Create a new empty hook registry.
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Add a hook to the end of the pipeline.
    pub fn add(&mut self, hook: Arc<dyn Hook>) {
        self.hooks.push(hook);
    }

    /// Add a closure that fires at a single point.
    pub fn on<F>(&mut self, point: HookPoint, f: F)
    where
        F: Fn(&HookContext) -> Result<HookAction, HookError> + Send + Sync + 'static,
    {
        self.add(Arc::new(FnHook::new(point, f)));
    }

    /// Builder form of [`add`](Self::add).
    pub fn with(mut self, hook: Arc<dyn Hook>) -> Self {
        self.add(hook);
        self
    }

    /// Number of registered hooks.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Whether any registered hook fires at `point`.
    pub fn handles(&self, point: HookPoint) -> bool {
        self.hooks.iter().any(|h| h.points().contains(&point))
    }

    /// Dispatch a hook event through the pipeline.
    ///
    /// Returns `Continue` if every hook for `ctx.point` continued, the
    /// first other action otherwise. The first hook error is returned
    /// as-is and the remaining hooks are skipped.
    pub async fn dispatch(&self, ctx: &HookContext) -> Result<HookAction, HookError> {
        for hook in &self.hooks {
            if !hook.points().contains(&ctx.point) {
                continue;
            }

            match hook.on_event(ctx).await? {
                HookAction::Continue => continue,
                action => {
                    tracing::debug!(point = %ctx.point, action = action.name(), "chdet.hook.action");
                    return Ok(action);
                }
            }
        }

        Ok(HookAction::Continue)
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}
