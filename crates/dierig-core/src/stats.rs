//! Rolling statistics over the session's roll history, for the display
//! collaborator's side panel.

use serde::{Deserialize, Serialize};

/// Counts and percentages per face over a roll history. Pip counts above 6
/// land in the invalid bucket; they occur because the pip count is used as a
/// proxy for the face value and is never clamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollStats {
    pub total: usize,
    /// Counts for faces 1 through 6, indexed by `face - 1`.
    pub face_counts: [usize; 6],
    pub invalid_count: usize,
}

impl RollStats {
    pub fn from_rolls(rolls: &[u32]) -> Self {
        let mut face_counts = [0usize; 6];
        let mut invalid_count = 0;
        for &roll in rolls {
            match roll {
                1..=6 => face_counts[(roll - 1) as usize] += 1,
                r if r > 6 => invalid_count += 1,
                _ => {} // a logged 0 is neither a face nor invalid
            }
        }
        Self {
            total: rolls.len(),
            face_counts,
            invalid_count,
        }
    }

    /// Percentage of rolls showing `face` (1-6). Zero for an empty history
    /// or an out-of-range face.
    pub fn face_percentage(&self, face: u32) -> f64 {
        if self.total == 0 || !(1..=6).contains(&face) {
            return 0.0;
        }
        self.face_counts[(face - 1) as usize] as f64 / self.total as f64 * 100.0
    }

    /// Percentage of rolls with a pip count above 6.
    pub fn invalid_percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.invalid_count as f64 / self.total as f64 * 100.0
    }
}
