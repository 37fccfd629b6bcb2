//! Block builder: balanced set sizes, then a full shuffle.
//!
//! Trials per block are split evenly across `set_sizes`. When the split
//! leaves a remainder `r`, `r` set sizes get one extra trial, chosen by
//! walking the configured list round-robin from where the previous block
//! stopped: block 0 favours the first `r` entries, block 1 the next `r`,
//! and so on. Over the whole experiment every set size therefore appears
//! within one trial of every other, and exactly equally whenever
//! `number_of_blocks * number_of_trials_per_block` divides evenly.

use crate::{BlockFactory, TrialBuilder, TrialFactory};
use chdet_types::{Condition, ConditionSampling, ExperimentParams, GenError, Trial};
use rand::RngCore;
use rand::seq::SliceRandom;

/// Builds blocks on top of a [`TrialFactory`].
#[derive(Debug, Clone)]
pub struct BlockBuilder<T = TrialBuilder> {
    trials: T,
}

impl<T: TrialFactory> BlockBuilder<T> {
    /// Create a block builder that makes its trials with `trials`.
    pub fn new(trials: T) -> Self {
        Self { trials }
    }

    /// The trial factory in use.
    pub fn trials(&self) -> &T {
        &self.trials
    }
}

/// The set size of every trial in block `block_num`, in configured order
/// before shuffling. Deterministic; see the module docs for the remainder
/// rule.
pub fn plan_set_sizes(params: &ExperimentParams, block_num: usize) -> Vec<usize> {
    plan_counts(params, block_num)
        .into_iter()
        .flat_map(|(set_size, count)| std::iter::repeat_n(set_size, count))
        .collect()
}

/// Trial count for each configured set size, by position.
fn plan_counts(params: &ExperimentParams, block_num: usize) -> Vec<(usize, usize)> {
    let kinds = params.set_sizes.len();
    if kinds == 0 {
        return Vec::new();
    }
    let per_size = params.number_of_trials_per_block / kinds;
    let remainder = params.number_of_trials_per_block % kinds;
    let offset = (block_num % kinds) * remainder % kinds;

    params
        .set_sizes
        .iter()
        .enumerate()
        .map(|(i, &set_size)| {
            let gets_extra = (i + kinds - offset) % kinds < remainder;
            (set_size, per_size + usize::from(gets_extra))
        })
        .collect()
}

/// Conditions for `count` trials of one set size: drawn per trial, or a
/// fixed number of "same" trials followed by "change" trials.
fn plan_conditions(params: &ExperimentParams, count: usize) -> Vec<Option<Condition>> {
    match params.condition_sampling {
        ConditionSampling::Independent => vec![None; count],
        ConditionSampling::Balanced => {
            let same = ((count as f64) * params.percent_same).round() as usize;
            let same = same.min(count);
            std::iter::repeat_n(Some(Condition::Same), same)
                .chain(std::iter::repeat_n(Some(Condition::Change), count - same))
                .collect()
        }
    }
}

impl<T: TrialFactory> BlockFactory for BlockBuilder<T> {
    fn make_block(
        &self,
        block_num: usize,
        params: &ExperimentParams,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Trial>, GenError> {
        let mut block = Vec::with_capacity(params.number_of_trials_per_block);

        for (set_size, count) in plan_counts(params, block_num) {
            for condition in plan_conditions(params, count) {
                block.push(self.trials.make_trial(set_size, condition, params, rng)?);
            }
            if count > 0 {
                tracing::trace!(block_num, set_size, count, "chdet.block.planned");
            }
        }

        block.shuffle(rng);
        for (trial_num, trial) in block.iter_mut().enumerate() {
            trial.block_num = block_num;
            trial.trial_num = trial_num;
        }
        Ok(block)
    }
}
