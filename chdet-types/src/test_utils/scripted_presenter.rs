//! ScriptedPresenter: records frames and answers from a response queue.

use crate::duration::DurationMs;
use crate::error::PresentError;
use crate::params::Question;
use crate::present::{ExperimentInfo, Presenter};
use crate::stimulus::Stimulus;
use crate::trial::Response;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Something the runner asked the presenter to show.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// A text screen.
    Text {
        /// The text shown.
        text: String,
        /// Whether the screen waited for acknowledgement.
        wait_for_input: bool,
    },
    /// The fixation cross alone.
    Fixation {
        /// How long it was held.
        duration: DurationMs,
    },
    /// A stimulus array.
    Array {
        /// The items drawn.
        stimuli: Vec<Stimulus>,
        /// How long it was held; `None` for the test array.
        duration: Option<DurationMs>,
    },
}

/// A presenter that never touches a screen.
///
/// Responses are taken from a queue; once it is empty, every trial is
/// answered with the first valid key after 500 ms. The dialog answers each
/// question with its default unless the presenter was told to cancel.
pub struct ScriptedPresenter {
    responses: Mutex<VecDeque<Response>>,
    frames: Mutex<Vec<Frame>>,
    response_keys: Mutex<Vec<Vec<String>>>,
    cancel_dialog: bool,
}

impl ScriptedPresenter {
    /// Create a presenter with an empty response queue.
    pub fn new() -> Self {
        Self::with_responses(Vec::new())
    }

    /// Create a presenter that answers with `responses` in order.
    pub fn with_responses(responses: Vec<Response>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            frames: Mutex::new(Vec::new()),
            response_keys: Mutex::new(Vec::new()),
            cancel_dialog: false,
        }
    }

    /// Make the participant dialog report cancellation.
    pub fn cancelling_dialog(mut self) -> Self {
        self.cancel_dialog = true;
        self
    }

    /// Every frame shown so far.
    pub fn frames(&self) -> Vec<Frame> {
        self.frames.lock().unwrap().clone()
    }

    /// Text of every text screen shown so far.
    pub fn texts(&self) -> Vec<String> {
        self.frames()
            .into_iter()
            .filter_map(|f| match f {
                Frame::Text { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Every stimulus array shown so far, sample and test alike.
    pub fn arrays(&self) -> Vec<Vec<Stimulus>> {
        self.frames()
            .into_iter()
            .filter_map(|f| match f {
                Frame::Array { stimuli, .. } => Some(stimuli),
                _ => None,
            })
            .collect()
    }

    /// The key sets passed to each `await_response` call.
    pub fn response_keys(&self) -> Vec<Vec<String>> {
        self.response_keys.lock().unwrap().clone()
    }
}

impl Default for ScriptedPresenter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Presenter for ScriptedPresenter {
    async fn prompt_dialog(
        &self,
        questions: &[Question],
    ) -> Result<Option<ExperimentInfo>, PresentError> {
        if self.cancel_dialog {
            return Ok(None);
        }
        Ok(Some(
            questions
                .iter()
                .map(|q| (q.label.clone(), q.default_answer()))
                .collect(),
        ))
    }

    async fn display_text(&self, text: &str, wait_for_input: bool) -> Result<(), PresentError> {
        self.frames.lock().unwrap().push(Frame::Text {
            text: text.to_string(),
            wait_for_input,
        });
        Ok(())
    }

    async fn display_fixation(&self, duration: DurationMs) -> Result<(), PresentError> {
        self.frames.lock().unwrap().push(Frame::Fixation { duration });
        Ok(())
    }

    async fn display(
        &self,
        stimuli: &[Stimulus],
        _stim_size: f64,
        duration: Option<DurationMs>,
    ) -> Result<(), PresentError> {
        self.frames.lock().unwrap().push(Frame::Array {
            stimuli: stimuli.to_vec(),
            duration,
        });
        Ok(())
    }

    async fn await_response(
        &self,
        valid_keys: &[String],
        _timeout: Option<DurationMs>,
    ) -> Result<Response, PresentError> {
        self.response_keys.lock().unwrap().push(valid_keys.to_vec());
        if let Some(response) = self.responses.lock().unwrap().pop_front() {
            return Ok(response);
        }
        let key = valid_keys
            .first()
            .cloned()
            .ok_or_else(|| PresentError::Failed("no valid keys".into()))?;
        Ok(Response::Key { key, rt_ms: 500.0 })
    }
}
