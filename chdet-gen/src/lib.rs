#![deny(missing_docs)]
//! Trial and block generation for change detection.
//!
//! Three layers, each behind a strategy trait so a runner can swap one
//! without touching the others:
//!
//! | Layer | Trait | Default |
//! |-------|-------|---------|
//! | Layout | [`LocationSampler`] | [`GeometrySampler`]: bounded rejection sampling |
//! | Trial | [`TrialFactory`] | [`TrialBuilder`]: colours, condition, foil |
//! | Block | [`BlockFactory`] | [`BlockBuilder`]: balanced set sizes, shuffled |
//!
//! All randomness comes from the `&mut dyn RngCore` passed in, so one
//! seeded stream threaded through every call reproduces a run exactly.

pub mod block;
pub mod sampler;
pub mod trial;

pub use block::{BlockBuilder, plan_set_sizes};
pub use sampler::GeometrySampler;
pub use trial::TrialBuilder;

use chdet_types::{Condition, ExperimentParams, GenError, Location, Trial};
use rand::RngCore;

/// Produces stimulus layouts.
pub trait LocationSampler: Send + Sync {
    /// Draw `count` locations satisfying the sampler's constraints, in
    /// presentation order.
    fn sample(&self, count: usize, rng: &mut dyn RngCore) -> Result<Vec<Location>, GenError>;

    /// Draw one new location that satisfies the constraints against
    /// `others` and lies at least the minimum distance from `previous`.
    fn relocate(
        &self,
        others: &[Location],
        previous: Location,
        rng: &mut dyn RngCore,
    ) -> Result<Location, GenError>;
}

/// Produces single trials.
pub trait TrialFactory: Send + Sync {
    /// Build one trial of `set_size` items. With `condition: None` the
    /// outcome is drawn from `params.percent_same`.
    fn make_trial(
        &self,
        set_size: usize,
        condition: Option<Condition>,
        params: &ExperimentParams,
        rng: &mut dyn RngCore,
    ) -> Result<Trial, GenError>;
}

/// Produces whole blocks.
pub trait BlockFactory: Send + Sync {
    /// Build block `block_num`: `params.number_of_trials_per_block` trials,
    /// stamped with their block and position.
    fn make_block(
        &self,
        block_num: usize,
        params: &ExperimentParams,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Trial>, GenError>;
}

/// The default generation stack for `params`: a [`BlockBuilder`] over a
/// [`TrialBuilder`] over a [`GeometrySampler`] configured from the same
/// parameters.
pub fn default_block_factory(params: &ExperimentParams) -> BlockBuilder<TrialBuilder> {
    BlockBuilder::new(TrialBuilder::new(GeometrySampler::from_params(params)))
}
