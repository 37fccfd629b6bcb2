//! Property-based tests: layout and block invariants over random configs.

use chdet_gen::{BlockFactory, GeometrySampler, TrialFactory, default_block_factory, plan_set_sizes};
use chdet_types::*;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn arb_sampler() -> impl Strategy<Value = GeometrySampler> {
    (10.0f64..20.0, 0.0f64..2.0, 0.0f64..3.0, prop_oneof![Just(None), (2usize..4).prop_map(Some)])
        .prop_map(|(radius, clearance, min_distance, cap)| {
            GeometrySampler::new(radius)
                .with_fixation_clearance(clearance)
                .with_min_distance(min_distance)
                .with_max_per_quad(cap)
        })
}

fn arb_params() -> impl Strategy<Value = ExperimentParams> {
    (
        proptest::collection::btree_set(1usize..=6, 1..4),
        1usize..25,
        1usize..4,
        0.0f64..=1.0,
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(set_sizes, per_block, blocks, percent_same, balanced, single_probe)| {
            ExperimentParams {
                set_sizes: set_sizes.into_iter().collect(),
                number_of_trials_per_block: per_block,
                number_of_blocks: blocks,
                percent_same,
                condition_sampling: if balanced {
                    ConditionSampling::Balanced
                } else {
                    ConditionSampling::Independent
                },
                single_probe,
                ..Default::default()
            }
        })
}

proptest! {
    #[test]
    fn layouts_keep_spacing_and_quadrant_cap(
        sampler in arb_sampler(),
        count in 1usize..=8,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let locs = sampler.generate_locations(count, &mut rng).unwrap();
        prop_assert_eq!(locs.len(), count);

        let mut per_quad = [0usize; QUADRANTS];
        for (i, a) in locs.iter().enumerate() {
            per_quad[usize::from(a.quadrant())] += 1;
            prop_assert!(a.eccentricity() <= sampler.allowed_deg_from_fix + 1e-9);
            for b in &locs[i + 1..] {
                prop_assert!(a.distance_to(b) >= sampler.min_distance,
                    "points {:?} and {:?} closer than {}", a, b, sampler.min_distance);
            }
        }
        if let Some(cap) = sampler.max_per_quad {
            prop_assert!(per_quad.iter().all(|&n| n <= cap), "quadrant counts {:?}", per_quad);
        }
    }

    #[test]
    fn change_trials_differ_in_exactly_one_item(
        set_size in 1usize..=6,
        single_probe in any::<bool>(),
        change_attribute in prop_oneof![Just(ChangeAttribute::Color), Just(ChangeAttribute::Location)],
        seed in any::<u64>(),
    ) {
        let params = ExperimentParams { single_probe, change_attribute, ..Default::default() };
        let factory = default_block_factory(&params);
        let mut rng = StdRng::seed_from_u64(seed);

        let change = factory.trials()
            .make_trial(set_size, Some(Condition::Change), &params, &mut rng)
            .unwrap();
        prop_assert_eq!(change.attribute_changes(), 1);
        prop_assert_eq!(change.changed, Some(change_attribute));

        let before = change.sample[change.probe_index];
        let after = *change.probed_test().unwrap();
        match change_attribute {
            ChangeAttribute::Color => {
                prop_assert_eq!(after.location, before.location);
                prop_assert!(change.sample.iter().all(|s| s.color != after.color));
            }
            ChangeAttribute::Location => {
                prop_assert_eq!(after.color, before.color);
                prop_assert!(after.location.distance_to(&before.location) >= params.min_distance);
                prop_assert!(after.location.eccentricity() >= params.fixation_clearance - 1e-9);

                // The test array as displayed: every unprobed item plus the moved one.
                let mut per_quad = [0usize; QUADRANTS];
                per_quad[usize::from(after.location.quadrant())] += 1;
                for (i, other) in change.sample.iter().enumerate() {
                    if i == change.probe_index {
                        continue;
                    }
                    per_quad[usize::from(other.location.quadrant())] += 1;
                    prop_assert!(after.location.distance_to(&other.location) >= params.min_distance,
                        "moved item {:?} too close to {:?}", after.location, other.location);
                }
                let cap = params.max_per_quad.unwrap();
                prop_assert!(per_quad.iter().all(|&n| n <= cap), "quadrant counts {:?}", per_quad);
            }
        }

        let same = factory.trials()
            .make_trial(set_size, Some(Condition::Same), &params, &mut rng)
            .unwrap();
        prop_assert_eq!(same.attribute_changes(), 0);
    }

    #[test]
    fn blocks_are_well_formed_and_reproducible(
        params in arb_params(),
        block_num in 0usize..4,
        seed in any::<u64>(),
    ) {
        let factory = default_block_factory(&params);
        let a = factory.make_block(block_num, &params, &mut StdRng::seed_from_u64(seed)).unwrap();
        let b = factory.make_block(block_num, &params, &mut StdRng::seed_from_u64(seed)).unwrap();
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a.len(), params.number_of_trials_per_block);

        for (i, trial) in a.iter().enumerate() {
            prop_assert_eq!(trial.block_num, block_num);
            prop_assert_eq!(trial.trial_num, i);
            prop_assert!(trial.check().is_ok());
            prop_assert!(params.set_sizes.contains(&trial.set_size));
        }
    }

    #[test]
    fn set_sizes_balance_across_the_experiment(params in arb_params()) {
        let mut totals = vec![0usize; params.set_sizes.len()];
        for block in 0..params.number_of_blocks {
            let plan = plan_set_sizes(&params, block);
            prop_assert_eq!(plan.len(), params.number_of_trials_per_block);
            for (i, &size) in params.set_sizes.iter().enumerate() {
                totals[i] += plan.iter().filter(|&&s| s == size).count();
            }
        }
        let max = totals.iter().copied().max().unwrap_or(0);
        let min = totals.iter().copied().min().unwrap_or(0);
        prop_assert!(max - min <= 1, "totals {:?}", totals);
        let total = params.number_of_blocks * params.number_of_trials_per_block;
        if total % params.set_sizes.len() == 0 {
            prop_assert_eq!(max, min);
        }
    }

    #[test]
    fn balanced_blocks_fix_same_count(
        set_size in 1usize..=6,
        per_block in 1usize..30,
        percent_same in 0.0f64..=1.0,
        seed in any::<u64>(),
    ) {
        let params = ExperimentParams {
            set_sizes: vec![set_size],
            number_of_trials_per_block: per_block,
            percent_same,
            condition_sampling: ConditionSampling::Balanced,
            ..Default::default()
        };
        let block = default_block_factory(&params)
            .make_block(0, &params, &mut StdRng::seed_from_u64(seed))
            .unwrap();
        let same = block.iter().filter(|t| !t.is_change).count();
        prop_assert_eq!(same, ((per_block as f64) * percent_same).round() as usize);
    }
}
