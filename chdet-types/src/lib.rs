//! # chdet-types: protocol types for change-detection experiments
//!
//! A change-detection task shows a sample array of coloured squares,
//! blanks the screen, then shows a test array and asks whether anything
//! changed. This crate holds everything the generator, the runner and
//! the host application have to agree on.
//!
//! ## Contents
//!
//! | Area | Types | What it covers |
//! |------|-------|----------------|
//! | Stimuli | [`Location`], [`Color`], [`Stimulus`] | One square on screen |
//! | Trials | [`Trial`], [`TrialResult`], [`Response`] | One presentation and its outcome |
//! | Configuration | [`ExperimentParams`], [`Question`] | Everything a run is parameterised by |
//! | Hooks | [`Hook`], [`HookPoint`], [`HookAction`], [`HookContext`] | Behaviour injection |
//! | Collaborators | [`Presenter`], [`ResultSink`] | Screen, keyboard, storage |
//!
//! ## Collaborators
//!
//! Drawing, input handling and file formats are not implemented here.
//! The runner talks to them through [`Presenter`] and [`ResultSink`], so
//! a graphics window and an in-memory test double plug into the same
//! state machine.

#![deny(missing_docs)]

pub mod duration;
pub mod error;
pub mod hook;
pub mod params;
pub mod present;
pub mod sink;
pub mod stimulus;
pub mod trial;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use duration::DurationMs;
pub use error::{ConfigError, GenError, HookError, PresentError, RunError, SinkError};
pub use hook::{Hook, HookAction, HookContext, HookPoint};
pub use params::{ConditionSampling, ExperimentParams, Question, QuestionKind};
pub use present::{ExperimentInfo, Presenter};
pub use sink::ResultSink;
pub use stimulus::{Color, Location, QUADRANTS, Stimulus};
pub use trial::{ChangeAttribute, Condition, Response, Trial, TrialResult};
