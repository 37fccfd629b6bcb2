//! Experiment parameters, their defaults, and validation.
//!
//! Every field has a documented default, so a parameter file only needs
//! to list what it changes:
//!
//! ```
//! use chdet_types::ExperimentParams;
//!
//! let params = ExperimentParams::from_json(r#"{ "set_sizes": [2, 4, 6], "seed": 7 }"#).unwrap();
//! assert_eq!(params.set_sizes, vec![2, 4, 6]);
//! assert_eq!(params.number_of_blocks, 2);
//! ```

use crate::duration::DurationMs;
use crate::error::ConfigError;
use crate::stimulus::{Color, QUADRANTS};
use crate::trial::ChangeAttribute;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How same/change outcomes are assigned within a block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionSampling {
    /// Each trial independently is "same" with probability `percent_same`.
    #[default]
    Independent,
    /// Within each set size's trials in a block, exactly
    /// `round(count * percent_same)` are "same".
    Balanced,
}

/// One question in the participant information dialog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Label shown next to the field; also the key of the answer.
    pub label: String,
    /// Kind of answer expected.
    #[serde(flatten)]
    pub kind: QuestionKind,
}

/// Answer shape of a [`Question`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestionKind {
    /// Free text with a pre-filled default.
    Text {
        /// Initial field value.
        default: String,
    },
    /// One of a fixed list of options.
    Choice {
        /// The options, in display order.
        options: Vec<String>,
    },
}

impl Question {
    /// A free-text question.
    pub fn text(label: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: QuestionKind::Text {
                default: default.into(),
            },
        }
    }

    /// A multiple-choice question.
    pub fn choice(label: impl Into<String>, options: &[&str]) -> Self {
        Self {
            label: label.into(),
            kind: QuestionKind::Choice {
                options: options.iter().map(|o| o.to_string()).collect(),
            },
        }
    }

    /// The value a dialog shows before the participant edits it.
    pub fn default_answer(&self) -> String {
        match &self.kind {
            QuestionKind::Text { default } => default.clone(),
            QuestionKind::Choice { options } => options.first().cloned().unwrap_or_default(),
        }
    }
}

/// Everything a run is parameterised by.
///
/// Construct with [`Default`] and struct update syntax, or load from JSON
/// with [`ExperimentParams::from_json`]. The runner calls
/// [`validate`](ExperimentParams::validate) before presenting anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentParams {
    /// Name recorded with the data.
    pub experiment_name: String,
    /// Radius, in degrees, of the region stimuli may occupy.
    pub allowed_deg_from_fix: f64,
    /// Radius, in degrees, around fixation kept free of stimuli.
    pub fixation_clearance: f64,
    /// The colour palette.
    pub colors: Vec<Color>,
    /// Where results are persisted.
    pub data_directory: PathBuf,
    /// Blank interval between sample and test.
    pub delay_time: DurationMs,
    /// Instruction screens shown before the first block.
    pub instruct_text: Vec<String>,
    /// Screen shown between blocks.
    pub break_text: String,
    /// Screen shown after the last block.
    pub end_text: String,
    /// Fixation interval after each trial.
    pub iti_time: DurationMs,
    /// Response keys: `[same, different]`.
    pub keys: [String; 2],
    /// Key that aborts the run when pressed at test.
    pub quit_key: Option<String>,
    /// Most stimuli allowed in one quadrant; `None` for unconstrained.
    pub max_per_quad: Option<usize>,
    /// Minimum distance, in degrees, between any two stimuli.
    pub min_distance: f64,
    /// Number of blocks.
    pub number_of_blocks: usize,
    /// Number of trials in each block.
    pub number_of_trials_per_block: usize,
    /// Probability that a trial is "same", in `[0, 1]`.
    pub percent_same: f64,
    /// How same/change outcomes are assigned.
    pub condition_sampling: ConditionSampling,
    /// Which attribute change trials alter.
    pub change_attribute: ChangeAttribute,
    /// Questions for the participant dialog.
    pub questionaire_dict: Vec<Question>,
    /// Whether sample arrays may contain repeated colours.
    pub repeat_stim_colors: bool,
    /// Whether a foil colour may be one already present in the sample.
    pub repeat_test_colors: bool,
    /// How long the sample array is shown.
    pub sample_time: DurationMs,
    /// How long to wait for a response; `None` waits indefinitely.
    pub response_timeout: Option<DurationMs>,
    /// Set sizes; each gets an equal share of trials.
    pub set_sizes: Vec<usize>,
    /// Whether only the probed item is shown at test.
    pub single_probe: bool,
    /// Side length of each square, in degrees.
    pub stim_size: f64,
    /// Candidate draws the geometry sampler may spend on one layout.
    pub max_layout_attempts: usize,
    /// Persist accumulated results after every block as well as at the end.
    pub save_each_block: bool,
    /// Seed for the run's random stream; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for ExperimentParams {
    fn default() -> Self {
        Self {
            experiment_name: "ChangeDetection".into(),
            allowed_deg_from_fix: 15.0,
            fixation_clearance: 1.5,
            colors: default_palette(),
            data_directory: default_data_directory(),
            delay_time: DurationMs::from_millis(1000),
            instruct_text: vec![
                "Welcome to the experiment. Press space to begin.".into(),
                "In this experiment you will be remembering colors.\n\n\
                 Each trial will start with a fixation cross. \
                 Do your best to keep your eyes on it.\n\n\
                 Then, 6 squares with different colors will appear. \
                 Remember as many colors as you can.\n\n\
                 After a short delay, the squares will reappear.\n\n\
                 If they all have the SAME color, press the \"S\" key. \
                 If any of the colors are DIFFERENT, press the \"D\" key.\n\
                 If you are not sure, just take your best guess.\n\n\
                 You will get breaks in between blocks.\n\n\
                 Press space to start."
                    .into(),
            ],
            break_text: "Please take a short break. Press space to continue.".into(),
            end_text: "The experiment is now over, please get your experimenter.".into(),
            iti_time: DurationMs::from_millis(1000),
            keys: ["s".into(), "d".into()],
            quit_key: Some("q".into()),
            max_per_quad: Some(2),
            min_distance: 3.0,
            number_of_blocks: 2,
            number_of_trials_per_block: 10,
            percent_same: 0.5,
            condition_sampling: ConditionSampling::Independent,
            change_attribute: ChangeAttribute::Color,
            questionaire_dict: default_questionaire(),
            repeat_stim_colors: false,
            repeat_test_colors: false,
            sample_time: DurationMs::from_millis(250),
            response_timeout: None,
            set_sizes: vec![6],
            single_probe: true,
            stim_size: 1.5,
            max_layout_attempts: 10_000,
            save_each_block: false,
            seed: None,
        }
    }
}

impl ExperimentParams {
    /// Parse parameters from JSON, filling omitted fields with defaults,
    /// and validate the result.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let params: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    /// The largest configured set size.
    pub fn max_set_size(&self) -> usize {
        self.set_sizes.iter().copied().max().unwrap_or(0)
    }

    /// The key that answers "same".
    pub fn same_key(&self) -> &str {
        &self.keys[0]
    }

    /// The key that answers "different".
    pub fn different_key(&self) -> &str {
        &self.keys[1]
    }

    /// Total number of trials across all blocks, saturating at `usize::MAX`.
    pub fn total_trials(&self) -> usize {
        self.number_of_blocks.saturating_mul(self.number_of_trials_per_block)
    }

    /// Check every field against its documented range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.set_sizes.is_empty() {
            return Err(ConfigError::invalid("set_sizes", "must not be empty"));
        }
        if self.set_sizes.contains(&0) {
            return Err(ConfigError::invalid("set_sizes", "every set size must be at least 1"));
        }
        if self.number_of_blocks == 0 {
            return Err(ConfigError::invalid("number_of_blocks", "must be at least 1"));
        }
        if self.number_of_trials_per_block == 0 {
            return Err(ConfigError::invalid(
                "number_of_trials_per_block",
                "must be at least 1",
            ));
        }
        if !(0.0..=1.0).contains(&self.percent_same) {
            return Err(ConfigError::invalid(
                "percent_same",
                format!("{} is outside [0, 1]", self.percent_same),
            ));
        }

        let [same, different] = &self.keys;
        if same.is_empty() || different.is_empty() {
            return Err(ConfigError::invalid("keys", "keys must not be empty"));
        }
        if same == different {
            return Err(ConfigError::invalid("keys", "same and different keys must differ"));
        }
        if let Some(quit) = &self.quit_key {
            if quit.is_empty() || self.keys.contains(quit) {
                return Err(ConfigError::invalid(
                    "quit_key",
                    "must be non-empty and distinct from the response keys",
                ));
            }
        }

        if self.colors.is_empty() {
            return Err(ConfigError::invalid("colors", "palette must not be empty"));
        }
        if let Some(color) = self.colors.iter().find(|c| !c.in_gamut()) {
            return Err(ConfigError::invalid(
                "colors",
                format!("{:?} has a channel outside [-1, 1]", color.channels()),
            ));
        }
        for (i, color) in self.colors.iter().enumerate() {
            if self.colors[..i].contains(color) {
                return Err(ConfigError::invalid(
                    "colors",
                    format!("{:?} appears more than once", color.channels()),
                ));
            }
        }

        if !(self.allowed_deg_from_fix.is_finite() && self.allowed_deg_from_fix > 0.0) {
            return Err(ConfigError::invalid(
                "allowed_deg_from_fix",
                "must be a positive finite number",
            ));
        }
        if !(self.fixation_clearance >= 0.0 && self.fixation_clearance < self.allowed_deg_from_fix)
        {
            return Err(ConfigError::invalid(
                "fixation_clearance",
                "must lie in [0, allowed_deg_from_fix)",
            ));
        }
        if !(self.min_distance.is_finite() && self.min_distance >= 0.0) {
            return Err(ConfigError::invalid(
                "min_distance",
                "must be a non-negative finite number",
            ));
        }
        if !(self.stim_size.is_finite() && self.stim_size > 0.0) {
            return Err(ConfigError::invalid("stim_size", "must be a positive finite number"));
        }

        let largest = self.max_set_size();
        if let Some(cap) = self.max_per_quad {
            if cap == 0 {
                return Err(ConfigError::invalid("max_per_quad", "must be at least 1"));
            }
            if cap.saturating_mul(QUADRANTS) < largest {
                return Err(ConfigError::invalid(
                    "max_per_quad",
                    format!("{cap} per quadrant cannot hold set size {largest}"),
                ));
            }
        }
        if !self.repeat_stim_colors && self.colors.len() < largest {
            return Err(ConfigError::invalid(
                "colors",
                format!(
                    "{} colours cannot fill set size {largest} without repeats",
                    self.colors.len()
                ),
            ));
        }
        if self.max_layout_attempts == 0 {
            return Err(ConfigError::invalid("max_layout_attempts", "must be at least 1"));
        }
        Ok(())
    }
}

/// The nine-colour palette: the corners of the rgb cube plus orange.
pub fn default_palette() -> Vec<Color> {
    vec![
        Color::rgb(1.0, -1.0, -1.0),
        Color::rgb(-1.0, 1.0, -1.0),
        Color::rgb(-1.0, -1.0, 1.0),
        Color::rgb(1.0, 1.0, -1.0),
        Color::rgb(1.0, -1.0, 1.0),
        Color::rgb(-1.0, 1.0, 1.0),
        Color::rgb(1.0, 1.0, 1.0),
        Color::rgb(-1.0, -1.0, -1.0),
        Color::rgb(1.0, 0.0, -1.0),
    ]
}

fn default_questionaire() -> Vec<Question> {
    vec![
        Question::text("Age", "0"),
        Question::choice("Gender", &["Male", "Female", "Other/Choose Not To Respond"]),
        Question::choice(
            "Hispanic:",
            &[
                "Yes, Hispanic or Latino/a",
                "No, not Hispanic or Latino/a",
                "Choose Not To Respond",
            ],
        ),
        Question::choice(
            "Race",
            &[
                "American Indian or Alaskan Native",
                "Asian",
                "Pacific Islander",
                "Black or African American",
                "White / Caucasian",
                "More Than One Race",
                "Choose Not To Respond",
            ],
        ),
    ]
}

fn default_data_directory() -> PathBuf {
    let base = std::env::var_os("HOME").map(PathBuf::from).unwrap_or_default();
    base.join("Desktop").join("ChangeDetection").join("Data")
}
