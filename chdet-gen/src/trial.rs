//! Trial builder: layout, colours, condition and the change itself.

use crate::{GeometrySampler, LocationSampler, TrialFactory};
use chdet_types::{
    ChangeAttribute, Color, Condition, ExperimentParams, GenError, Stimulus, Trial,
};
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};

/// Builds trials on top of a [`LocationSampler`].
///
/// Random draws happen in a fixed order (layout, colours, condition,
/// probe, change) so the same stream always yields the same trial.
#[derive(Debug, Clone)]
pub struct TrialBuilder<S = GeometrySampler> {
    sampler: S,
}

impl<S: LocationSampler> TrialBuilder<S> {
    /// Create a builder that lays trials out with `sampler`.
    pub fn new(sampler: S) -> Self {
        Self { sampler }
    }

    /// The layout sampler in use.
    pub fn sampler(&self) -> &S {
        &self.sampler
    }
}

impl<S: LocationSampler> TrialFactory for TrialBuilder<S> {
    fn make_trial(
        &self,
        set_size: usize,
        condition: Option<Condition>,
        params: &ExperimentParams,
        rng: &mut dyn RngCore,
    ) -> Result<Trial, GenError> {
        if set_size == 0 {
            return Err(GenError::EmptySetSize);
        }

        let locations = self.sampler.sample(set_size, rng)?;
        let colors = sample_colors(&params.colors, set_size, params.repeat_stim_colors, rng)?;
        let sample: Vec<Stimulus> = locations
            .into_iter()
            .zip(colors)
            .map(|(location, color)| Stimulus::new(location, color))
            .collect();

        let is_change = match condition {
            Some(condition) => condition.is_change(),
            None => rng.random_bool((1.0 - params.percent_same).clamp(0.0, 1.0)),
        };
        let probe_index = rng.random_range(0..set_size);

        let mut test = sample.clone();
        let changed = if is_change {
            match params.change_attribute {
                ChangeAttribute::Color => {
                    test[probe_index].color = pick_foil(
                        &params.colors,
                        &sample,
                        probe_index,
                        params.repeat_test_colors,
                        rng,
                    )?;
                }
                ChangeAttribute::Location => {
                    let others: Vec<_> = sample
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| *i != probe_index)
                        .map(|(_, s)| s.location)
                        .collect();
                    let previous = sample[probe_index].location;
                    test[probe_index].location = self.sampler.relocate(&others, previous, rng)?;
                }
            }
            Some(params.change_attribute)
        } else {
            None
        };

        if params.single_probe {
            test = vec![test[probe_index]];
        }

        Ok(Trial {
            block_num: 0,
            trial_num: 0,
            set_size,
            sample,
            test,
            is_change,
            probe_index,
            changed,
            single_probe: params.single_probe,
        })
    }
}

/// Colours for a sample array: independent draws with `repeats`, otherwise
/// distinct palette entries.
fn sample_colors(
    palette: &[Color],
    set_size: usize,
    repeats: bool,
    rng: &mut dyn RngCore,
) -> Result<Vec<Color>, GenError> {
    let exhausted = GenError::PaletteExhausted {
        set_size,
        palette_size: palette.len(),
    };
    if repeats {
        (0..set_size)
            .map(|_| {
                palette
                    .choose(&mut *rng)
                    .copied()
                    .ok_or_else(|| exhausted.clone())
            })
            .collect()
    } else {
        if palette.len() < set_size {
            return Err(exhausted);
        }
        Ok(rand::seq::index::sample(rng, palette.len(), set_size)
            .into_iter()
            .map(|i| palette[i])
            .collect())
    }
}

/// A foil for the probed item: any palette colour other than its own, and
/// with `allow_repeats` false also none already in the sample array.
fn pick_foil(
    palette: &[Color],
    sample: &[Stimulus],
    probe_index: usize,
    allow_repeats: bool,
    rng: &mut dyn RngCore,
) -> Result<Color, GenError> {
    let current = sample[probe_index].color;
    let candidates: Vec<Color> = palette
        .iter()
        .copied()
        .filter(|c| *c != current)
        .filter(|c| allow_repeats || sample.iter().all(|s| s.color != *c))
        .collect();
    candidates
        .choose(rng)
        .copied()
        .ok_or(GenError::FoilUnavailable {
            set_size: sample.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chdet_types::params::default_palette;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn seeded_rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn builder(params: &ExperimentParams) -> TrialBuilder {
        TrialBuilder::new(GeometrySampler::from_params(params))
    }

    fn full_display() -> ExperimentParams {
        ExperimentParams {
            single_probe: false,
            ..Default::default()
        }
    }

    #[test]
    fn same_trial_test_equals_sample() {
        let params = full_display();
        let trial = builder(&params)
            .make_trial(6, Some(Condition::Same), &params, &mut seeded_rng())
            .unwrap();
        assert!(!trial.is_change);
        assert_eq!(trial.test, trial.sample);
        assert_eq!(trial.changed, None);
        assert!(trial.check().is_ok());
    }

    #[test]
    fn change_trial_alters_exactly_one_colour() {
        let params = full_display();
        let b = builder(&params);
        let mut rng = seeded_rng();
        for _ in 0..100 {
            let trial = b
                .make_trial(6, Some(Condition::Change), &params, &mut rng)
                .unwrap();
            assert_eq!(trial.attribute_changes(), 1);
            let probed = trial.probe_index;
            assert_ne!(trial.test[probed].color, trial.sample[probed].color);
            assert_eq!(trial.test[probed].location, trial.sample[probed].location);
            assert_eq!(trial.changed, Some(ChangeAttribute::Color));
        }
    }

    #[test]
    fn unique_foil_never_matches_sample_colours() {
        let params = full_display();
        let b = builder(&params);
        let mut rng = seeded_rng();
        for _ in 0..100 {
            let trial = b
                .make_trial(6, Some(Condition::Change), &params, &mut rng)
                .unwrap();
            let foil = trial.test[trial.probe_index].color;
            assert!(trial.sample.iter().all(|s| s.color != foil));
        }
    }

    #[test]
    fn sample_colours_unique_without_repeats() {
        let params = full_display();
        let trial = builder(&params)
            .make_trial(9, Some(Condition::Same), &params, &mut seeded_rng());
        // Nine colours fill set size nine exactly, but the quadrant cap of 2 cannot.
        assert!(matches!(trial, Err(GenError::LayoutInfeasible { .. })));

        let params = ExperimentParams {
            max_per_quad: Some(3),
            ..full_display()
        };
        let trial = builder(&params)
            .make_trial(9, Some(Condition::Same), &params, &mut seeded_rng())
            .unwrap();
        for (i, a) in trial.sample.iter().enumerate() {
            for b in &trial.sample[i + 1..] {
                assert_ne!(a.color, b.color);
            }
        }
    }

    #[test]
    fn palette_exhausted_without_repeats() {
        let params = ExperimentParams {
            colors: default_palette()[..3].to_vec(),
            ..full_display()
        };
        let err = builder(&params)
            .make_trial(4, None, &params, &mut seeded_rng())
            .unwrap_err();
        assert_eq!(
            err,
            GenError::PaletteExhausted {
                set_size: 4,
                palette_size: 3
            }
        );
    }

    #[test]
    fn foil_unavailable_when_sample_uses_whole_palette() {
        let params = ExperimentParams {
            colors: default_palette()[..4].to_vec(),
            ..full_display()
        };
        let err = builder(&params)
            .make_trial(4, Some(Condition::Change), &params, &mut seeded_rng())
            .unwrap_err();
        assert_eq!(err, GenError::FoilUnavailable { set_size: 4 });

        // Allowing repeated test colours makes the other three eligible.
        let params = ExperimentParams {
            repeat_test_colors: true,
            ..params
        };
        let trial = builder(&params)
            .make_trial(4, Some(Condition::Change), &params, &mut seeded_rng())
            .unwrap();
        assert_eq!(trial.attribute_changes(), 1);
    }

    #[test]
    fn repeated_stim_colours_allowed_from_tiny_palette() {
        let params = ExperimentParams {
            colors: default_palette()[..2].to_vec(),
            repeat_stim_colors: true,
            repeat_test_colors: true,
            ..full_display()
        };
        let trial = builder(&params)
            .make_trial(6, Some(Condition::Change), &params, &mut seeded_rng())
            .unwrap();
        assert_eq!(trial.sample.len(), 6);
        assert_eq!(trial.attribute_changes(), 1);
    }

    #[test]
    fn location_change_moves_probed_item_only() {
        let params = ExperimentParams {
            change_attribute: ChangeAttribute::Location,
            ..full_display()
        };
        let trial = builder(&params)
            .make_trial(4, Some(Condition::Change), &params, &mut seeded_rng())
            .unwrap();
        let probed = trial.probe_index;
        assert_eq!(trial.attribute_changes(), 1);
        assert_eq!(trial.test[probed].color, trial.sample[probed].color);
        assert!(
            trial.test[probed]
                .location
                .distance_to(&trial.sample[probed].location)
                >= params.min_distance
        );
        assert_eq!(trial.changed, Some(ChangeAttribute::Location));
    }

    #[test]
    fn single_probe_test_holds_probed_item() {
        let params = ExperimentParams::default();
        let b = builder(&params);
        let mut rng = seeded_rng();
        let same = b
            .make_trial(6, Some(Condition::Same), &params, &mut rng)
            .unwrap();
        assert_eq!(same.test, vec![same.sample[same.probe_index]]);

        let change = b
            .make_trial(6, Some(Condition::Change), &params, &mut rng)
            .unwrap();
        assert_eq!(change.test.len(), 1);
        assert_eq!(change.attribute_changes(), 1);
        assert!(change.check().is_ok());
    }

    #[test]
    fn percent_same_extremes_fix_the_condition() {
        let all_same = ExperimentParams {
            percent_same: 1.0,
            ..full_display()
        };
        let all_change = ExperimentParams {
            percent_same: 0.0,
            ..full_display()
        };
        let mut rng = seeded_rng();
        for _ in 0..20 {
            assert!(!builder(&all_same)
                .make_trial(3, None, &all_same, &mut rng)
                .unwrap()
                .is_change);
            assert!(builder(&all_change)
                .make_trial(3, None, &all_change, &mut rng)
                .unwrap()
                .is_change);
        }
    }

    #[test]
    fn zero_set_size_rejected() {
        let params = full_display();
        let err = builder(&params)
            .make_trial(0, None, &params, &mut seeded_rng())
            .unwrap_err();
        assert_eq!(err, GenError::EmptySetSize);
    }
}
