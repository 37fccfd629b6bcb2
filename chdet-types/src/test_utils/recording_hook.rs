//! RecordingHook: records every event and always returns Continue.

use crate::error::HookError;
use crate::hook::{Hook, HookAction, HookContext, HookPoint};
use async_trait::async_trait;
use std::sync::Mutex;

/// A recorded hook event for inspection in tests.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    /// The hook point that fired.
    pub point: HookPoint,
    /// Block index at the time of the event.
    pub block_num: Option<usize>,
    /// Trial index at the time of the event.
    pub trial_num: Option<usize>,
    /// Results stored at the time of the event.
    pub trials_completed: usize,
}

/// A hook that records every event and always returns [`HookAction::Continue`].
/// Use `.events()` to inspect what was recorded.
pub struct RecordingHook {
    points: Vec<HookPoint>,
    events: Mutex<Vec<RecordedEvent>>,
}

impl RecordingHook {
    /// Create a RecordingHook that fires at every hook point.
    pub fn new() -> Self {
        Self::at(&HookPoint::ALL)
    }

    /// Create a RecordingHook that fires only at `points`.
    pub fn at(points: &[HookPoint]) -> Self {
        Self {
            points: points.to_vec(),
            events: Mutex::new(Vec::new()),
        }
    }

    /// Return a snapshot of all recorded events.
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Return the sequence of points that fired.
    pub fn points_fired(&self) -> Vec<HookPoint> {
        self.events().into_iter().map(|e| e.point).collect()
    }
}

impl Default for RecordingHook {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Hook for RecordingHook {
    fn points(&self) -> &[HookPoint] {
        &self.points
    }

    async fn on_event(&self, ctx: &HookContext) -> Result<HookAction, HookError> {
        self.events.lock().unwrap().push(RecordedEvent {
            point: ctx.point,
            block_num: ctx.block_num,
            trial_num: ctx.trial_num,
            trials_completed: ctx.trials_completed,
        });
        Ok(HookAction::Continue)
    }
}
