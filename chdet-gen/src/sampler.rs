//! Geometry sampler: non-overlapping layouts by bounded rejection sampling.
//!
//! Candidates are drawn uniformly over the annulus between
//! `fixation_clearance` and `allowed_deg_from_fix`. A candidate is kept if
//! it is at least `min_distance` from every kept point and its quadrant is
//! below `max_per_quad`. Quadrants fill first-come, first-served: no
//! quadrant is preferred, a full one just rejects further candidates.
//!
//! Greedy placement can paint itself into a corner, so after
//! [`RESTART_AFTER`] consecutive rejections the partial layout is thrown
//! away and started again. Every draw, kept or not, counts against
//! `max_attempts`; running out is [`GenError::LayoutInfeasible`].

use crate::LocationSampler;
use chdet_types::{ExperimentParams, GenError, Location, QUADRANTS};
use rand::{Rng, RngCore};
use std::f64::consts::TAU;

/// Consecutive rejections after which a partial layout is restarted.
pub const RESTART_AFTER: usize = 250;

/// Layout constraints and the attempt budget.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometrySampler {
    /// Outer radius of the stimulus region, in degrees.
    pub allowed_deg_from_fix: f64,
    /// Inner radius kept free around fixation, in degrees.
    pub fixation_clearance: f64,
    /// Minimum pairwise distance, in degrees. Zero disables the check.
    pub min_distance: f64,
    /// Per-quadrant cap; `None` for unconstrained.
    pub max_per_quad: Option<usize>,
    /// Candidate draws allowed per layout.
    pub max_attempts: usize,
}

impl GeometrySampler {
    /// A sampler over a disk of the given radius with no other constraints.
    pub fn new(allowed_deg_from_fix: f64) -> Self {
        Self {
            allowed_deg_from_fix,
            fixation_clearance: 0.0,
            min_distance: 0.0,
            max_per_quad: None,
            max_attempts: 10_000,
        }
    }

    /// A sampler configured from experiment parameters.
    pub fn from_params(params: &ExperimentParams) -> Self {
        Self {
            allowed_deg_from_fix: params.allowed_deg_from_fix,
            fixation_clearance: params.fixation_clearance,
            min_distance: params.min_distance,
            max_per_quad: params.max_per_quad,
            max_attempts: params.max_layout_attempts,
        }
    }

    /// Set the minimum pairwise distance.
    pub fn with_min_distance(mut self, min_distance: f64) -> Self {
        self.min_distance = min_distance;
        self
    }

    /// Set the per-quadrant cap.
    pub fn with_max_per_quad(mut self, max_per_quad: Option<usize>) -> Self {
        self.max_per_quad = max_per_quad;
        self
    }

    /// Set the radius kept clear around fixation.
    pub fn with_fixation_clearance(mut self, clearance: f64) -> Self {
        self.fixation_clearance = clearance;
        self
    }

    /// Set the attempt budget.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Draw `count` locations. See the module docs for the algorithm.
    pub fn generate_locations<R: Rng + ?Sized>(
        &self,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<Location>, GenError> {
        if count == 0 {
            return Ok(Vec::new());
        }
        if let Some(cap) = self.max_per_quad {
            if count > cap.saturating_mul(QUADRANTS) {
                return Err(GenError::LayoutInfeasible {
                    set_size: count,
                    attempts: 0,
                });
            }
        }

        let mut accepted: Vec<Location> = Vec::with_capacity(count);
        let mut quad_counts = [0usize; QUADRANTS];
        let mut rejected_in_a_row = 0;

        for _ in 0..self.max_attempts {
            let candidate = self.draw(rng);
            if self.admissible(&candidate, &accepted, &quad_counts) {
                quad_counts[usize::from(candidate.quadrant())] += 1;
                accepted.push(candidate);
                rejected_in_a_row = 0;
                if accepted.len() == count {
                    return Ok(accepted);
                }
            } else {
                rejected_in_a_row += 1;
                if rejected_in_a_row >= RESTART_AFTER {
                    tracing::trace!(placed = accepted.len(), count, "chdet.layout.restart");
                    accepted.clear();
                    quad_counts = [0; QUADRANTS];
                    rejected_in_a_row = 0;
                }
            }
        }

        Err(GenError::LayoutInfeasible {
            set_size: count,
            attempts: self.max_attempts,
        })
    }

    /// Draw one location admissible against `others` and at least
    /// `min_distance` (or any positive distance, if that is zero) from
    /// `previous`.
    pub fn relocate_one<R: Rng + ?Sized>(
        &self,
        others: &[Location],
        previous: Location,
        rng: &mut R,
    ) -> Result<Location, GenError> {
        let mut quad_counts = [0usize; QUADRANTS];
        for loc in others {
            quad_counts[usize::from(loc.quadrant())] += 1;
        }
        for _ in 0..self.max_attempts {
            let candidate = self.draw(rng);
            let moved = candidate.distance_to(&previous);
            let far_enough = if self.min_distance > 0.0 {
                moved >= self.min_distance
            } else {
                moved > 0.0
            };
            if far_enough && self.admissible(&candidate, others, &quad_counts) {
                return Ok(candidate);
            }
        }
        Err(GenError::LayoutInfeasible {
            set_size: others.len() + 1,
            attempts: self.max_attempts,
        })
    }

    /// A point uniform over the annulus `[fixation_clearance, allowed_deg_from_fix]`.
    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Location {
        let inner_sq = self.fixation_clearance * self.fixation_clearance;
        let outer_sq = self.allowed_deg_from_fix * self.allowed_deg_from_fix;
        let radius = (inner_sq + rng.random::<f64>() * (outer_sq - inner_sq)).sqrt();
        let angle = rng.random_range(0.0..TAU);
        Location::from_polar(radius, angle)
    }

    fn admissible(
        &self,
        candidate: &Location,
        accepted: &[Location],
        quad_counts: &[usize; QUADRANTS],
    ) -> bool {
        if let Some(cap) = self.max_per_quad {
            if quad_counts[usize::from(candidate.quadrant())] >= cap {
                return false;
            }
        }
        accepted
            .iter()
            .all(|other| candidate.distance_to(other) >= self.min_distance)
    }
}

impl LocationSampler for GeometrySampler {
    fn sample(&self, count: usize, rng: &mut dyn RngCore) -> Result<Vec<Location>, GenError> {
        self.generate_locations(count, rng)
    }

    fn relocate(
        &self,
        others: &[Location],
        previous: Location,
        rng: &mut dyn RngCore,
    ) -> Result<Location, GenError> {
        self.relocate_one(others, previous, rng)
    }
}
