//! Stimulus geometry and colour.

use serde::{Deserialize, Serialize};

/// Number of quadrants around fixation.
pub const QUADRANTS: usize = 4;

/// A point in degrees of visual angle relative to fixation.
///
/// The quadrant tag is derived from the coordinates when the location is
/// created and cannot drift from them afterwards. Quadrants are numbered
/// counter-clockwise from the upper right: `0` is `x >= 0, y >= 0`, `1` is
/// `x < 0, y >= 0`, `2` is `x < 0, y < 0`, `3` is `x >= 0, y < 0`. A point
/// on an axis belongs to the non-negative side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawLocation")]
pub struct Location {
    x: f64,
    y: f64,
    quadrant: u8,
}

/// Wire form of a location. A serialized quadrant is ignored and recomputed.
#[derive(Deserialize)]
struct RawLocation {
    x: f64,
    y: f64,
}

impl From<RawLocation> for Location {
    fn from(raw: RawLocation) -> Self {
        Self::new(raw.x, raw.y)
    }
}

impl Location {
    /// Create a location from cartesian coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            quadrant: quadrant_of(x, y),
        }
    }

    /// Create a location from an eccentricity and an angle in radians.
    pub fn from_polar(radius: f64, angle: f64) -> Self {
        Self::new(radius * angle.cos(), radius * angle.sin())
    }

    /// Horizontal offset from fixation.
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Vertical offset from fixation.
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Quadrant index in `0..QUADRANTS`.
    pub fn quadrant(&self) -> u8 {
        self.quadrant
    }

    /// Euclidean distance to another location.
    pub fn distance_to(&self, other: &Location) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Distance from fixation.
    pub fn eccentricity(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

fn quadrant_of(x: f64, y: f64) -> u8 {
    match (x >= 0.0, y >= 0.0) {
        (true, true) => 0,
        (false, true) => 1,
        (false, false) => 2,
        (true, false) => 3,
    }
}

/// A palette colour as three channels in `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub [f64; 3]);

impl Color {
    /// Create a colour from its three channels.
    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self([r, g, b])
    }

    /// The raw channel values.
    pub fn channels(&self) -> [f64; 3] {
        self.0
    }

    /// True when every channel lies in `[-1, 1]`.
    pub fn in_gamut(&self) -> bool {
        self.0.iter().all(|c| (-1.0..=1.0).contains(c))
    }
}

/// One square: where it is and what colour it has.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stimulus {
    /// Position relative to fixation.
    pub location: Location,
    /// Fill colour.
    pub color: Color,
}

impl Stimulus {
    /// Pair a location with a colour.
    pub fn new(location: Location, color: Color) -> Self {
        Self { location, color }
    }

    /// How many of the two attributes (location, colour) differ from `other`.
    pub fn attribute_changes(&self, other: &Stimulus) -> usize {
        usize::from(self.location != other.location) + usize::from(self.color != other.color)
    }
}
