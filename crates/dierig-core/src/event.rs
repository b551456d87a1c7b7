//! Roll events and the records handed to the persistence collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Point;

/// Emitted by the arbiter exactly once per completed roll.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollEvent {
    /// Surviving pip detections in the stable frame; used as the face value
    /// without clamping.
    pub pip_count: u32,
    /// Die center in the frame that completed the roll.
    pub die_center: Point,
    /// Supplied by the caller; the core holds no clock.
    pub timestamp: DateTime<Utc>,
}

/// The two servo endpoints the motor flips between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotorPosition {
    Plus90,
    Minus90,
}

impl MotorPosition {
    /// The opposite endpoint; each flip rotates the tower 180 degrees.
    pub fn flipped(self) -> Self {
        match self {
            MotorPosition::Plus90 => MotorPosition::Minus90,
            MotorPosition::Minus90 => MotorPosition::Plus90,
        }
    }

    /// Angle in degrees, as stored in the result log.
    pub fn degrees(self) -> f64 {
        match self {
            MotorPosition::Plus90 => 90.0,
            MotorPosition::Minus90 => -90.0,
        }
    }
}

/// One row for the persistence collaborator. The core composes this; the
/// collaborator owns the write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollRecord {
    pub die_id: u32,
    pub timestamp: DateTime<Utc>,
    pub motor_position: f64,
    pub pip_count: u32,
    pub image_reference: String,
}

impl RollRecord {
    pub fn new(
        die_id: u32,
        event: &RollEvent,
        motor_position: MotorPosition,
        image_reference: String,
    ) -> Self {
        Self {
            die_id,
            timestamp: event.timestamp,
            motor_position: motor_position.degrees(),
            pip_count: event.pip_count,
            image_reference,
        }
    }
}
