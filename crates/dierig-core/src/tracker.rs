//! Die position tracking over a bounded window of frames.
//!
//! The tracker keeps the last `buffer_size` center positions reported by the
//! detector (or absence markers where no single die was found) and classifies
//! the die as unknown, moving, or stable from the window contents alone.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::Point;

/// Per-frame classification of the die.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiceState {
    /// Window not yet full, or the die was not found at the window edges.
    Unknown,
    /// Displacement across the window exceeds the movement threshold.
    Moving,
    /// Die settled: displacement across the window is below the threshold.
    Stable,
}

/// Configuration for [`PositionTracker`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Number of positions retained. 1 enables single-frame analysis, where
    /// any present sample reads as stable.
    pub buffer_size: usize,
    /// Displacement in pixels below which the die counts as stable. The
    /// bounding box jitters a few pixels even on a resting die.
    pub movement_threshold: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            buffer_size: 10,
            movement_threshold: 5.0,
        }
    }
}

/// Tracks the die center across frames and the roll history across a session.
#[derive(Debug, Clone)]
pub struct PositionTracker {
    buffer_size: usize,
    movement_threshold: f64,
    center_positions: VecDeque<Option<Point>>,
    previous_rolls: Vec<u32>,
}

impl PositionTracker {
    /// Create a tracker. A zero buffer size is clamped to 1.
    pub fn new(config: TrackerConfig) -> Self {
        let buffer_size = config.buffer_size.max(1);
        Self {
            buffer_size,
            movement_threshold: config.movement_threshold,
            center_positions: VecDeque::with_capacity(buffer_size),
            previous_rolls: Vec::new(),
        }
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Record one frame's center observation (`None` when no single die was
    /// found) and return the resulting state.
    pub fn observe(&mut self, center: Option<Point>) -> DiceState {
        self.center_positions.push_back(center);
        if self.center_positions.len() > self.buffer_size {
            self.center_positions.pop_front();
        }
        self.state()
    }

    /// True while the window gives no usable answer: not yet full, or the
    /// die was absent in the newest or oldest retained sample.
    pub fn is_unknown(&self) -> bool {
        if self.center_positions.len() < self.buffer_size {
            return true;
        }
        match (self.center_positions.back(), self.center_positions.front()) {
            (Some(Some(_)), Some(Some(_))) => false,
            _ => true,
        }
    }

    /// Displacement between the oldest and newest retained centers, in
    /// pixels. Intentionally not a path integral: a die that wobbles and
    /// returns near its starting point reads as stable.
    pub fn movement_magnitude(&self) -> f64 {
        if self.is_unknown() {
            return 0.0;
        }
        match (self.center_positions.front(), self.center_positions.back()) {
            (Some(Some(first)), Some(Some(last))) => first.distance_to(last),
            _ => 0.0,
        }
    }

    /// Whether the die has settled. With a single-sample buffer every present
    /// observation is stable by definition.
    pub fn is_stable(&self) -> bool {
        if self.buffer_size == 1 {
            return true;
        }
        !self.is_unknown() && self.movement_magnitude() < self.movement_threshold
    }

    /// Classify the current window. Unknown takes priority over stable.
    pub fn state(&self) -> DiceState {
        if self.is_unknown() {
            DiceState::Unknown
        } else if self.is_stable() {
            DiceState::Stable
        } else {
            DiceState::Moving
        }
    }

    /// Append a completed roll to the session history. Values are raw pip
    /// counts and deliberately not clamped to 1..=6.
    pub fn record_roll(&mut self, value: u32) {
        self.previous_rolls.push(value);
    }

    /// Full-session roll history, oldest first.
    pub fn previous_rolls(&self) -> &[u32] {
        &self.previous_rolls
    }

    /// Clear the position window for the next roll cycle. The roll history
    /// survives across resets.
    pub fn reset(&mut self) {
        self.center_positions.clear();
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.center_positions.len()
    }
}
