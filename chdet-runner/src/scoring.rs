//! Scoring a response against a trial.

use chdet_types::{Response, Trial, TrialResult};

/// The key that is correct for `trial`: `keys[0]` ("same") on same
/// trials, `keys[1]` ("different") on change trials.
pub fn correct_key<'a>(trial: &Trial, keys: &'a [String; 2]) -> &'a str {
    &keys[usize::from(trial.is_change)]
}

/// Score `response` for `trial`.
///
/// A key press is correct when it is the key for the trial's actual
/// condition; any other key, including one outside `keys`, is incorrect.
/// A timeout leaves response, accuracy and reaction time empty.
pub fn score(
    trial: &Trial,
    keys: &[String; 2],
    response: &Response,
    timestamp_ms: u64,
) -> TrialResult {
    let correct = correct_key(trial, keys);
    let (response, accuracy, rt_ms) = match response {
        Response::Key { key, rt_ms } => (Some(key.clone()), Some(key == correct), Some(*rt_ms)),
        Response::Timeout => (None, None, None),
    };
    TrialResult {
        block_num: trial.block_num,
        trial_num: trial.trial_num,
        timestamp_ms,
        condition: trial.condition(),
        set_size: trial.set_size,
        is_change: trial.is_change,
        correct_key: correct.to_string(),
        response,
        accuracy,
        rt_ms,
        probe_index: trial.probe_index,
        changed: trial.changed,
        sample: trial.sample.clone(),
        test: trial.test.clone(),
        extra: serde_json::Map::new(),
    }
}
