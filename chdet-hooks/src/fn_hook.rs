//! Closure-backed hooks.

use async_trait::async_trait;
use chdet_types::hook::{Hook, HookAction, HookContext, HookPoint};
use chdet_types::HookError;

/// A [`Hook`] backed by a synchronous closure.
///
/// ```
/// use chdet_hooks::FnHook;
/// use chdet_types::{HookAction, HookPoint};
///
/// // Stop a run early once twenty trials are stored.
/// let hook = FnHook::new(HookPoint::PostTrial, |ctx| {
///     if ctx.trials_completed >= 20 {
///         return Ok(HookAction::Halt { reason: "pilot length reached".into() });
///     }
///     Ok(HookAction::Continue)
/// });
/// # let _ = hook;
/// ```
pub struct FnHook<F> {
    points: Vec<HookPoint>,
    f: F,
}

impl<F> FnHook<F>
where
    F: Fn(&HookContext) -> Result<HookAction, HookError> + Send + Sync,
{
    /// A hook firing at one point.
    pub fn new(point: HookPoint, f: F) -> Self {
        Self {
            points: vec![point],
            f,
        }
    }

    /// A hook firing at several points.
    pub fn at(points: &[HookPoint], f: F) -> Self {
        Self {
            points: points.to_vec(),
            f,
        }
    }
}

#[async_trait]
impl<F> Hook for FnHook<F>
where
    F: Fn(&HookContext) -> Result<HookAction, HookError> + Send + Sync,
{
    fn points(&self) -> &[HookPoint] {
        &self.points
    }

    async fn on_event(&self, ctx: &HookContext) -> Result<HookAction, HookError> {
        (self.f)(ctx)
    }
}
