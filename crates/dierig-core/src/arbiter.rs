//! Roll lifecycle state machine.
//!
//! Sits on top of [`PositionTracker`] and decides when a physical roll has
//! completed: Idle → Observing → Stable → Logged, back to Idle on the next
//! flip. The arbiter alone owns the "already logged" latch, so a caller that
//! keeps polling after the roll completes cannot produce duplicate events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::event::RollEvent;
use crate::tracker::{DiceState, PositionTracker, TrackerConfig};
use crate::Point;

/// Configuration for [`RollArbiter`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbiterConfig {
    pub tracker: TrackerConfig,
    /// Consecutive stable observations required before a further stable
    /// frame completes the roll. 1 logs on the first confirmation; raise it
    /// to ride out transient stillness mid-tumble.
    pub min_dwell: u32,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            tracker: TrackerConfig::default(),
            min_dwell: 1,
        }
    }
}

/// Lifecycle position of the current roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArbiterState {
    /// Waiting for the motor to start a new roll. Frames are ignored.
    Idle,
    /// Motor has flipped; the tracker window is filling.
    Observing,
    /// Tracker reported stable on the current frame.
    Stable {
        /// Consecutive stable observations seen so far.
        dwell: u32,
    },
    /// Roll event emitted. Terminal until the next flip.
    Logged,
}

/// Watches tracker state per frame and emits one roll event per cycle.
#[derive(Debug)]
pub struct RollArbiter {
    state: ArbiterState,
    min_dwell: u32,
    tracker: PositionTracker,
}

impl RollArbiter {
    pub fn new(config: ArbiterConfig) -> Self {
        Self {
            state: ArbiterState::Idle,
            min_dwell: config.min_dwell.max(1),
            tracker: PositionTracker::new(config.tracker),
        }
    }

    pub fn state(&self) -> ArbiterState {
        self.state
    }

    pub fn tracker(&self) -> &PositionTracker {
        &self.tracker
    }

    /// The motor has flipped: clear the position window and start observing.
    /// Valid from any state, including Logged at the end of the previous
    /// cycle.
    pub fn begin_roll(&mut self) {
        self.tracker.reset();
        self.state = ArbiterState::Observing;
        debug!(state = ?self.state, "roll cycle started");
    }

    /// Return to Idle without starting a new observation window.
    pub fn reset(&mut self) {
        self.tracker.reset();
        self.state = ArbiterState::Idle;
    }

    /// Feed one frame's die center and pip count. Returns the roll event on
    /// the frame that completes the roll, `None` otherwise.
    ///
    /// The timestamp is supplied by the caller so the arbiter stays clock-free.
    pub fn on_frame(
        &mut self,
        center: Option<Point>,
        pip_count: u32,
        timestamp: DateTime<Utc>,
    ) -> Option<RollEvent> {
        match self.state {
            // No roll in progress, or already logged: the latch holds.
            ArbiterState::Idle | ArbiterState::Logged => None,
            ArbiterState::Observing => {
                if self.tracker.observe(center) == DiceState::Stable {
                    self.state = ArbiterState::Stable { dwell: 1 };
                    debug!(dwell = 1, "die stable, dwell started");
                }
                None
            }
            ArbiterState::Stable { dwell } => {
                if self.tracker.observe(center) != DiceState::Stable {
                    self.state = ArbiterState::Observing;
                    debug!("stability broken before logging");
                    return None;
                }
                if dwell < self.min_dwell {
                    self.state = ArbiterState::Stable { dwell: dwell + 1 };
                    return None;
                }
                let die_center = center?;
                self.state = ArbiterState::Logged;
                self.tracker.record_roll(pip_count);
                debug!(pip_count, "roll complete");
                Some(RollEvent {
                    pip_count,
                    die_center,
                    timestamp,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arbiter(buffer_size: usize, min_dwell: u32) -> RollArbiter {
        RollArbiter::new(ArbiterConfig {
            tracker: TrackerConfig {
                buffer_size,
                movement_threshold: 5.0,
            },
            min_dwell,
        })
    }

    fn settled(a: &mut RollArbiter, n: usize) -> Vec<RollEvent> {
        (0..n)
            .filter_map(|_| a.on_frame(Some(Point::new(100.0, 100.0)), 4, Utc::now()))
            .collect()
    }

    #[test]
    fn test_idle_ignores_frames() {
        let mut a = arbiter(2, 1);
        assert!(settled(&mut a, 5).is_empty());
        assert_eq!(a.state(), ArbiterState::Idle);
    }

    #[test]
    fn test_full_cycle_emits_one_event() {
        let mut a = arbiter(2, 1);
        a.begin_roll();
        // Frame 1 fills the window; frame 2 turns stable; frame 3 logs.
        let events = settled(&mut a, 3);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].pip_count, 4);
        assert_eq!(a.state(), ArbiterState::Logged);
        assert_eq!(a.tracker().previous_rolls(), &[4]);
    }

    #[test]
    fn test_at_most_one_event_per_cycle() {
        let mut a = arbiter(2, 1);
        a.begin_roll();
        // Many further stable frames after logging produce nothing.
        let events = settled(&mut a, 30);
        assert_eq!(events.len(), 1);
        assert_eq!(a.tracker().previous_rolls().len(), 1);
    }

    #[test]
    fn test_next_cycle_after_flip() {
        let mut a = arbiter(2, 1);
        a.begin_roll();
        assert_eq!(settled(&mut a, 10).len(), 1);
        a.begin_roll();
        assert_eq!(a.state(), ArbiterState::Observing);
        assert_eq!(settled(&mut a, 10).len(), 1);
        // Roll history is preserved across cycles.
        assert_eq!(a.tracker().previous_rolls(), &[4, 4]);
    }

    #[test]
    fn test_moving_frames_keep_observing() {
        let mut a = arbiter(2, 1);
        a.begin_roll();
        let mut x = 0.0;
        for _ in 0..10 {
            x += 50.0;
            assert!(a.on_frame(Some(Point::new(x, 0.0)), 0, Utc::now()).is_none());
        }
        assert_eq!(a.state(), ArbiterState::Observing);
    }

    #[test]
    fn test_ambiguous_frames_keep_observing() {
        // Scenario D: ingest collapsed an ambiguous frame to None.
        let mut a = arbiter(2, 1);
        a.begin_roll();
        for _ in 0..10 {
            assert!(a.on_frame(None, 0, Utc::now()).is_none());
        }
        assert_eq!(a.state(), ArbiterState::Observing);
    }

    #[test]
    fn test_stability_break_resets_dwell() {
        // Scenario E: stable, broken by movement, then stable again.
        let mut a = arbiter(2, 1);
        a.begin_roll();
        a.on_frame(Some(Point::new(100.0, 100.0)), 3, Utc::now());
        a.on_frame(Some(Point::new(100.0, 100.0)), 3, Utc::now());
        assert_eq!(a.state(), ArbiterState::Stable { dwell: 1 });

        // Movement breaks stability before the logging frame.
        let event = a.on_frame(Some(Point::new(400.0, 100.0)), 3, Utc::now());
        assert!(event.is_none());
        assert_eq!(a.state(), ArbiterState::Observing);

        // One stable frame re-enters Stable, the next one logs.
        assert!(a.on_frame(Some(Point::new(400.0, 100.0)), 3, Utc::now()).is_none());
        assert_eq!(a.state(), ArbiterState::Stable { dwell: 1 });
        let event = a.on_frame(Some(Point::new(400.0, 100.0)), 3, Utc::now());
        assert!(event.is_some());
    }

    #[test]
    fn test_min_dwell_delays_logging() {
        let mut a = arbiter(2, 3);
        a.begin_roll();
        // Window fill + first stable frame.
        assert!(settled(&mut a, 2).is_empty());
        assert_eq!(a.state(), ArbiterState::Stable { dwell: 1 });
        // Two more stable frames accumulate dwell without logging.
        assert!(settled(&mut a, 2).is_empty());
        assert_eq!(a.state(), ArbiterState::Stable { dwell: 3 });
        // Dwell satisfied: the next stable frame logs.
        assert_eq!(settled(&mut a, 1).len(), 1);
    }
}
