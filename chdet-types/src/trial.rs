//! Trials, responses and scored results.

use crate::stimulus::Stimulus;
use serde::{Deserialize, Serialize};

/// Whether the test array matches the sample array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Test array equals sample array.
    Same,
    /// Exactly one attribute of one item differs at test.
    Change,
}

impl Condition {
    /// Map an `is_change` flag to a condition.
    pub fn from_is_change(is_change: bool) -> Self {
        if is_change { Self::Change } else { Self::Same }
    }

    /// True for [`Condition::Change`].
    pub fn is_change(self) -> bool {
        matches!(self, Self::Change)
    }
}

/// Which attribute of the probed item a change trial alters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAttribute {
    /// Recolour the item with a foil colour.
    #[default]
    Color,
    /// Move the item to a fresh location.
    Location,
}

/// One generated trial: what is shown at sample and at test.
///
/// Created by the trial builder with zero `block_num` and `trial_num`;
/// the block builder and the runner stamp its position. A `PreTrial` hook
/// may replace it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    /// Zero-based block index.
    pub block_num: usize,
    /// Zero-based position within the block.
    pub trial_num: usize,
    /// Number of items in the sample array.
    pub set_size: usize,
    /// Sample array in presentation order.
    pub sample: Vec<Stimulus>,
    /// Test array: the whole array, or only the probed item in
    /// single-probe mode.
    pub test: Vec<Stimulus>,
    /// Whether the test differs from the sample.
    pub is_change: bool,
    /// Index into `sample` of the item probed at test (the changed item
    /// on change trials).
    pub probe_index: usize,
    /// The attribute altered on a change trial; `None` on same trials.
    pub changed: Option<ChangeAttribute>,
    /// Whether `test` holds only the probed item.
    pub single_probe: bool,
}

impl Trial {
    /// The trial's condition.
    pub fn condition(&self) -> Condition {
        Condition::from_is_change(self.is_change)
    }

    /// The probed item as it appeared in the sample array.
    pub fn probed_sample(&self) -> Option<&Stimulus> {
        self.sample.get(self.probe_index)
    }

    /// The probed item as it appears in the test array.
    pub fn probed_test(&self) -> Option<&Stimulus> {
        if self.single_probe {
            self.test.first()
        } else {
            self.test.get(self.probe_index)
        }
    }

    /// Number of stimulus attributes that differ between the sample and
    /// test arrays. Zero for a well-formed same trial, one for a
    /// well-formed change trial.
    pub fn attribute_changes(&self) -> usize {
        if self.single_probe {
            match (self.probed_sample(), self.test.first()) {
                (Some(sample), Some(test)) => sample.attribute_changes(test),
                _ => 0,
            }
        } else {
            self.sample
                .iter()
                .zip(&self.test)
                .map(|(sample, test)| sample.attribute_changes(test))
                .sum()
        }
    }

    /// Check that the arrays, set size and probe index agree with each
    /// other. Returns a description of the first inconsistency.
    pub fn check(&self) -> Result<(), String> {
        if self.set_size == 0 {
            return Err("set_size is zero".into());
        }
        if self.sample.len() != self.set_size {
            return Err(format!(
                "sample has {} items but set_size is {}",
                self.sample.len(),
                self.set_size
            ));
        }
        if self.probe_index >= self.set_size {
            return Err(format!(
                "probe_index {} out of range for set_size {}",
                self.probe_index, self.set_size
            ));
        }
        let expected_test = if self.single_probe { 1 } else { self.set_size };
        if self.test.len() != expected_test {
            return Err(format!(
                "test has {} items, expected {expected_test}",
                self.test.len()
            ));
        }
        Ok(())
    }
}

/// What the participant did at test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Response {
    /// A key was pressed.
    Key {
        /// The key that was pressed.
        key: String,
        /// Reaction time from test onset, in milliseconds.
        rt_ms: f64,
    },
    /// The response window elapsed without a valid key.
    Timeout,
}

/// A scored trial.
///
/// Carries the trial's reference fields, the response, and any fields a
/// `PostTrial` hook adds under `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    /// Zero-based block index.
    pub block_num: usize,
    /// Zero-based trial index within the block.
    pub trial_num: usize,
    /// Wall-clock time the response was scored, in ms since the Unix epoch.
    pub timestamp_ms: u64,
    /// Same or change.
    pub condition: Condition,
    /// Number of items in the sample array.
    pub set_size: usize,
    /// Whether the test differed from the sample.
    pub is_change: bool,
    /// The key that would have been correct.
    pub correct_key: String,
    /// The key pressed, or `None` on timeout.
    pub response: Option<String>,
    /// Whether the response was correct, or `None` on timeout.
    pub accuracy: Option<bool>,
    /// Reaction time in ms, or `None` on timeout.
    pub rt_ms: Option<f64>,
    /// Index of the probed item in `sample`.
    pub probe_index: usize,
    /// Attribute altered on a change trial.
    pub changed: Option<ChangeAttribute>,
    /// The sample array.
    pub sample: Vec<Stimulus>,
    /// The test array.
    pub test: Vec<Stimulus>,
    /// Additional fields attached by hooks.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TrialResult {
    /// True when the trial ended without a valid response.
    pub fn timed_out(&self) -> bool {
        self.response.is_none()
    }
}
