//! Core tracking logic for the die testing rig.
//!
//! Pure per-frame logic: no camera, motor, or database handles live here.
//! The driving loop feeds one normalized detection result per frame and
//! receives at most one roll event per physical roll.

pub mod arbiter;
pub mod event;
pub mod pacer;
pub mod stats;
pub mod tracker;

pub use arbiter::{ArbiterConfig, ArbiterState, RollArbiter};
pub use event::{MotorPosition, RollEvent, RollRecord};
pub use pacer::{FramePacer, PaceDecision};
pub use stats::RollStats;
pub use tracker::{DiceState, PositionTracker, TrackerConfig};

use serde::{Deserialize, Serialize};

/// A center position in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}
