//! The presentation collaborator: screen, keyboard and dialogs.

use crate::duration::DurationMs;
use crate::error::PresentError;
use crate::params::Question;
use crate::stimulus::Stimulus;
use crate::trial::Response;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Participant answers from the information dialog, keyed by question label.
pub type ExperimentInfo = BTreeMap<String, String>;

/// Screen and input access for a run.
///
/// Implementations own the window, the clock and the keyboard. Every
/// method may suspend; the runner awaits each call before moving on, so
/// nothing else in the run changes while a method is pending.
#[async_trait]
pub trait Presenter: Send + Sync {
    /// Ask the participant the given questions. `Ok(None)` means the
    /// dialog was cancelled.
    async fn prompt_dialog(
        &self,
        questions: &[Question],
    ) -> Result<Option<ExperimentInfo>, PresentError>;

    /// Show a text screen. With `wait_for_input` the call returns once
    /// the participant acknowledges it; otherwise it returns immediately
    /// and the text stays up until the next frame.
    async fn display_text(&self, text: &str, wait_for_input: bool) -> Result<(), PresentError>;

    /// Show the fixation cross alone for `duration`.
    async fn display_fixation(&self, duration: DurationMs) -> Result<(), PresentError>;

    /// Show a stimulus array (with fixation). With `Some(duration)` the
    /// call returns after that long; with `None` it returns as soon as the
    /// frame is up and the array stays visible.
    async fn display(
        &self,
        stimuli: &[Stimulus],
        stim_size: f64,
        duration: Option<DurationMs>,
    ) -> Result<(), PresentError>;

    /// Wait for one of `valid_keys`, or for `timeout` to elapse. Reaction
    /// time is measured from the call.
    async fn await_response(
        &self,
        valid_keys: &[String],
        timeout: Option<DurationMs>,
    ) -> Result<Response, PresentError>;
}
