//! A simulated observer with a fixed working-memory capacity.
//!
//! On each trial the observer holds `min(capacity, N)` of the `N` sample
//! items. If the probed item is among them the answer is correct;
//! otherwise the observer guesses "different" with `guess_rate`. This is
//! the generative model behind Cowan's K, so the estimate printed at the
//! end should land near `capacity`.

use async_trait::async_trait;
use chdet::prelude::*;
use chdet::chdet_types::{PresentError, Question};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

pub struct SimulatedParticipant {
    capacity: f64,
    guess_rate: f64,
    keys: [String; 2],
    rng: Mutex<StdRng>,
    last_sample: Mutex<Vec<Stimulus>>,
    last_test: Mutex<Vec<Stimulus>>,
}

impl SimulatedParticipant {
    pub fn new(capacity: f64, keys: [String; 2], seed: u64) -> Self {
        Self {
            capacity,
            guess_rate: 0.5,
            keys,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            last_sample: Mutex::new(Vec::new()),
            last_test: Mutex::new(Vec::new()),
        }
    }

    /// Whether the test item differs from every sample item. Works for both
    /// single-probe and whole-array tests.
    fn test_differs(sample: &[Stimulus], test: &[Stimulus]) -> bool {
        test.iter().any(|t| !sample.contains(t))
    }

    fn fail(e: impl std::fmt::Display) -> PresentError {
        PresentError::Failed(e.to_string())
    }
}

#[async_trait]
impl Presenter for SimulatedParticipant {
    async fn prompt_dialog(
        &self,
        questions: &[Question],
    ) -> Result<Option<ExperimentInfo>, PresentError> {
        let mut info: ExperimentInfo = questions
            .iter()
            .map(|q| (q.label.clone(), q.default_answer()))
            .collect();
        info.insert("Participant".into(), format!("sim-k{}", self.capacity));
        Ok(Some(info))
    }

    async fn display_text(&self, text: &str, _wait_for_input: bool) -> Result<(), PresentError> {
        println!("{text}\n");
        Ok(())
    }

    async fn display_fixation(&self, duration: DurationMs) -> Result<(), PresentError> {
        tracing::trace!(%duration, "fixation");
        Ok(())
    }

    async fn display(
        &self,
        stimuli: &[Stimulus],
        _stim_size: f64,
        duration: Option<DurationMs>,
    ) -> Result<(), PresentError> {
        let slot = if duration.is_some() {
            &self.last_sample
        } else {
            &self.last_test
        };
        *slot.lock().map_err(Self::fail)? = stimuli.to_vec();
        Ok(())
    }

    async fn await_response(
        &self,
        _valid_keys: &[String],
        _timeout: Option<DurationMs>,
    ) -> Result<Response, PresentError> {
        let sample = self.last_sample.lock().map_err(Self::fail)?.clone();
        let test = self.last_test.lock().map_err(Self::fail)?.clone();
        let mut rng = self.rng.lock().map_err(Self::fail)?;

        let held = (self.capacity / sample.len().max(1) as f64).min(1.0);
        let says_different = if rng.random_bool(held) {
            Self::test_differs(&sample, &test)
        } else {
            rng.random_bool(self.guess_rate)
        };
        let key = self.keys[usize::from(says_different)].clone();
        Ok(Response::Key {
            key,
            rt_ms: rng.random_range(350.0..900.0),
        })
    }
}
