#![deny(missing_docs)]
//! # chdet: umbrella crate
//!
//! Single import surface for change-detection experiments. Re-exports the
//! protocol crate and the implementations behind feature flags, plus a
//! `prelude` for the common path: build parameters, register hooks, run.

#[cfg(feature = "core")]
pub use chdet_gen;
#[cfg(feature = "hooks")]
pub use chdet_hooks;
#[cfg(feature = "runner")]
pub use chdet_runner;
#[cfg(feature = "sink-memory")]
pub use chdet_sink_memory;
#[cfg(feature = "core")]
pub use chdet_types;

/// Happy-path imports for running experiments.
pub mod prelude {
    #[cfg(feature = "core")]
    pub use chdet_types::{
        ChangeAttribute, Color, Condition, ConditionSampling, DurationMs, ExperimentInfo,
        ExperimentParams, Hook, HookAction, HookContext, HookPoint, Location, Presenter, Response,
        ResultSink, RunError, Stimulus, Trial, TrialResult,
    };

    #[cfg(feature = "core")]
    pub use chdet_gen::{
        BlockBuilder, BlockFactory, GeometrySampler, LocationSampler, TrialBuilder, TrialFactory,
        default_block_factory,
    };

    #[cfg(feature = "hooks")]
    pub use chdet_hooks::{FnHook, HookRegistry, TracingHook};

    #[cfg(feature = "runner")]
    pub use chdet_runner::{ExperimentRunner, RunState, RunSummary};

    #[cfg(feature = "sink-memory")]
    pub use chdet_sink_memory::MemorySink;
}
