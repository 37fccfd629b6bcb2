//! In-memory implementations for testing.
//!
//! Available behind the `test-utils` feature flag. These are minimal
//! implementations that let a full run execute without a window or a
//! participant.

mod recording_hook;
mod scripted_presenter;

pub use recording_hook::{RecordedEvent, RecordingHook};
pub use scripted_presenter::{Frame, ScriptedPresenter};
