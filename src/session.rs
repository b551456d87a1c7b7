//! Per-frame loop driver for a die testing session.
//!
//! Owns the cycle capture → detect → ingest → track → arbitrate → pace, with
//! the hardware collaborators behind narrow traits. Hardware handles are
//! explicit values passed in, never process-wide singletons; the tracking
//! core itself holds none of them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use dierig_core::{
    ArbiterConfig, FramePacer, MotorPosition, PaceDecision, RollArbiter, RollRecord, RollStats,
};
use dierig_cv::{ingest, ClassBindings, IngestConfig, RawDetection};

/// A frame delivered by the capture collaborator.
pub struct CapturedFrame {
    pub image: image::RgbImage,
    /// Stable reference to this frame for the persistence record.
    pub reference: String,
}

/// Capture source: live camera, recorded video, or static image. The driver
/// is agnostic as long as "get next frame" holds.
pub trait FrameSource {
    /// Grab the next frame. `Ok(None)` is an explicit no-frame result, not
    /// an error; the driver decides whether to retry or abort.
    fn grab(&mut self) -> Result<Option<CapturedFrame>>;
}

/// Object detection collaborator. The driver never loads or configures the
/// model; it only consumes raw boxes and the class name map.
pub trait Detector {
    fn infer(&mut self, frame: &CapturedFrame) -> Result<Vec<RawDetection>>;
    fn class_names(&self) -> &HashMap<u32, String>;
}

/// Motor collaborator. Opaque flip: the driver only needs to know a flip
/// happened and where the tower ended up.
pub trait Motor {
    fn flip(&mut self) -> Result<MotorPosition>;
}

/// Persistence collaborator; consumes one record per completed roll.
pub trait RollSink {
    fn log_roll(&mut self, record: &RollRecord) -> Result<()>;
}

/// Session-level configuration.
#[derive(Debug, Clone, Serialize)]
pub struct SessionConfig {
    pub die_id: u32,
    /// Rolls to collect before the session ends.
    pub max_samples: u32,
    pub target_fps: f64,
    pub arbiter: ArbiterConfig,
    pub ingest: IngestConfig,
    /// Consecutive no-frame results tolerated before aborting the session.
    pub max_capture_failures: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            die_id: 1,
            max_samples: 100,
            target_fps: 30.0,
            arbiter: ArbiterConfig::default(),
            ingest: IngestConfig::default(),
            max_capture_failures: 30,
        }
    }
}

/// Drives one die through `max_samples` rolls.
pub struct Session<S, D, M, K> {
    config: SessionConfig,
    source: S,
    detector: D,
    motor: M,
    sink: K,
    arbiter: RollArbiter,
    pacer: FramePacer,
    classes: ClassBindings,
}

impl<S, D, M, K> Session<S, D, M, K>
where
    S: FrameSource,
    D: Detector,
    M: Motor,
    K: RollSink,
{
    /// Wire up a session. Class names are resolved to ids once here, so the
    /// per-frame path never searches the name map.
    pub fn new(config: SessionConfig, source: S, detector: D, motor: M, sink: K) -> Result<Self> {
        let classes = ClassBindings::resolve(detector.class_names())
            .context("Detector model is missing a required class")?;
        let arbiter = RollArbiter::new(config.arbiter.clone());
        let pacer = FramePacer::new(config.target_fps);
        Ok(Self {
            config,
            source,
            detector,
            motor,
            sink,
            arbiter,
            pacer,
            classes,
        })
    }

    /// Run the full session. Returns the roll statistics for display. The
    /// cancel flag is polled at least once per frame, inside the pacer's
    /// slack window, and takes effect before the next capture.
    pub fn run(&mut self, cancel: &AtomicBool) -> Result<RollStats> {
        info!(
            die_id = self.config.die_id,
            samples = self.config.max_samples,
            "beginning test session"
        );

        let mut samples_taken = 0;
        while samples_taken < self.config.max_samples {
            if cancel.load(Ordering::Relaxed) {
                info!(samples_taken, "session cancelled");
                break;
            }

            let position = self.motor.flip().context("Motor flip failed")?;
            self.arbiter.begin_roll();
            debug!(sample = samples_taken + 1, ?position, "tower flipped");

            if self.observe_until_logged(position, cancel)? {
                samples_taken += 1;
            } else {
                // Cancelled mid-roll; no record was emitted.
                break;
            }
        }

        let stats = RollStats::from_rolls(self.arbiter.tracker().previous_rolls());
        info!(total = stats.total, "session finished");
        Ok(stats)
    }

    /// Paced inner loop for one roll. Returns false if cancelled before the
    /// roll completed.
    fn observe_until_logged(
        &mut self,
        position: MotorPosition,
        cancel: &AtomicBool,
    ) -> Result<bool> {
        let mut last_capture = Instant::now() - self.pacer.frame_interval();
        let mut capture_failures = 0u32;

        loop {
            // The slack window is the only suspension point; cancellation
            // lands here, never mid-frame.
            loop {
                if cancel.load(Ordering::Relaxed) {
                    return Ok(false);
                }
                match self.pacer.decide(last_capture, Instant::now()) {
                    PaceDecision::CaptureNow => break,
                    PaceDecision::Wait(slack) => std::thread::sleep(slack),
                }
            }

            let frame = self.source.grab().context("Capture source failed")?;
            last_capture = Instant::now();

            let frame = match frame {
                Some(frame) => {
                    capture_failures = 0;
                    frame
                }
                None => {
                    capture_failures += 1;
                    warn!(capture_failures, "no frame from capture source");
                    if capture_failures > self.config.max_capture_failures {
                        bail!(
                            "capture source produced no frame {} times in a row",
                            capture_failures
                        );
                    }
                    continue;
                }
            };

            let raw = self.detector.infer(&frame).context("Inference failed")?;
            let detections = ingest(&raw, &self.classes, &self.config.ingest)
                .context("Detector emitted malformed output")?;

            let event =
                self.arbiter
                    .on_frame(detections.die_center(), detections.pip_count(), Utc::now());
            if let Some(event) = event {
                let record =
                    RollRecord::new(self.config.die_id, &event, position, frame.reference);
                info!(
                    pip_count = record.pip_count,
                    motor_position = record.motor_position,
                    "roll logged"
                );
                self.sink.log_roll(&record).context("Roll sink failed")?;
                return Ok(true);
            }
        }
    }

    /// Arbiter access for inspection after a run.
    pub fn arbiter(&self) -> &RollArbiter {
        &self.arbiter
    }

    /// Pacing overruns observed so far. Diagnostic only.
    pub fn pacing_overruns(&self) -> u64 {
        self.pacer.overruns()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::sim::simulated_rig;

    /// Collects records in memory so tests can inspect them.
    struct MemorySink {
        records: Rc<RefCell<Vec<RollRecord>>>,
    }

    impl RollSink for MemorySink {
        fn log_roll(&mut self, record: &RollRecord) -> Result<()> {
            self.records.borrow_mut().push(record.clone());
            Ok(())
        }
    }

    /// A source that never has a frame.
    struct DeadCamera;

    impl FrameSource for DeadCamera {
        fn grab(&mut self) -> Result<Option<CapturedFrame>> {
            Ok(None)
        }
    }

    fn fast_config(max_samples: u32) -> SessionConfig {
        SessionConfig {
            die_id: 7,
            max_samples,
            target_fps: 2000.0,
            max_capture_failures: 3,
            ..SessionConfig::default()
        }
    }

    #[test]
    fn test_session_logs_one_record_per_sample() {
        let (motor, camera, detector) = simulated_rig(42);
        let records = Rc::new(RefCell::new(Vec::new()));
        let sink = MemorySink {
            records: Rc::clone(&records),
        };
        let mut session = Session::new(fast_config(3), camera, detector, motor, sink).unwrap();

        let stats = session.run(&AtomicBool::new(false)).unwrap();

        assert_eq!(stats.total, 3);
        let records = records.borrow();
        assert_eq!(records.len(), 3);
        for record in records.iter() {
            assert_eq!(record.die_id, 7);
            assert!(record.pip_count >= 1 && record.pip_count <= 6);
            assert!(record.motor_position == 90.0 || record.motor_position == -90.0);
            assert!(record.image_reference.starts_with("sim_frame_"));
        }
        // Consecutive flips alternate endpoints.
        assert_ne!(records[0].motor_position, records[1].motor_position);
    }

    #[test]
    fn test_cancel_before_start_takes_no_samples() {
        let (motor, camera, detector) = simulated_rig(1);
        let sink = MemorySink {
            records: Rc::new(RefCell::new(Vec::new())),
        };
        let mut session = Session::new(fast_config(5), camera, detector, motor, sink).unwrap();

        let cancel = AtomicBool::new(true);
        let stats = session.run(&cancel).unwrap();
        assert_eq!(stats.total, 0);
    }

    #[test]
    fn test_dead_capture_source_aborts_with_context() {
        let (motor, _camera, detector) = simulated_rig(2);
        let sink = MemorySink {
            records: Rc::new(RefCell::new(Vec::new())),
        };
        let mut session =
            Session::new(fast_config(1), DeadCamera, detector, motor, sink).unwrap();

        let err = session.run(&AtomicBool::new(false)).unwrap_err();
        assert!(err.to_string().contains("no frame"));
    }
}
