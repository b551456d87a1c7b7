//! Frame pacing against a target capture rate.
//!
//! The pacer never sleeps or reads a clock itself: the caller threads its own
//! reference instants through and decides what to do with the slack window.
//! That window is the pipeline's only designed suspension point, and the one
//! place a quit signal is meant to be checked.

use std::time::{Duration, Instant};

use tracing::warn;

/// Outcome of one pacing check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaceDecision {
    /// The frame interval has elapsed (or overrun): capture immediately.
    CaptureNow,
    /// Budget left before the next capture; the caller may block on input
    /// or cancellation for at most this long.
    Wait(Duration),
}

/// Enforces a frames-per-second cadence on the capture loop.
#[derive(Debug)]
pub struct FramePacer {
    frame_interval: Duration,
    overruns: u64,
}

impl FramePacer {
    /// Target rate must be positive; it is clamped to a sane floor so a
    /// misconfigured zero does not divide away the interval.
    pub fn new(target_fps: f64) -> Self {
        let fps = if target_fps > 0.0 { target_fps } else { 1.0 };
        Self {
            frame_interval: Duration::from_secs_f64(1.0 / fps),
            overruns: 0,
        }
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Decide whether to capture at `now`, given when the last capture
    /// happened. Overruns are counted and logged, never fatal: a dropped
    /// frame degrades tracking fidelity but does not stop the pipeline.
    pub fn decide(&mut self, last_capture: Instant, now: Instant) -> PaceDecision {
        let elapsed = now.duration_since(last_capture);
        if elapsed >= self.frame_interval {
            if elapsed > self.frame_interval {
                self.overruns += 1;
                warn!(
                    overrun_ms = (elapsed - self.frame_interval).as_millis() as u64,
                    total_overruns = self.overruns,
                    "frame pacing overrun"
                );
            }
            PaceDecision::CaptureNow
        } else {
            PaceDecision::Wait(self.frame_interval - elapsed)
        }
    }

    /// Number of pacing overruns observed so far. Diagnostic only.
    pub fn overruns(&self) -> u64 {
        self.overruns
    }
}
