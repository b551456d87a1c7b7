//! Simulated rig collaborators for the demo binary and integration tests.
//!
//! The rig script is shared between the motor and the detector: each flip
//! starts a tumble, after which the detector reports a moving die for a few
//! frames, then a settled die with jittered pip boxes. The driver loop runs
//! on a single thread, so the collaborators share state through `Rc`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use dierig_core::MotorPosition;
use dierig_core::RollRecord;
use dierig_cv::RawDetection;

use crate::session::{CapturedFrame, Detector, FrameSource, Motor, RollSink};

pub const DIE_CLASS: u32 = 0;
pub const PIP_CLASS: u32 = 1;

/// Shared script state for one simulated rig.
pub struct RigState {
    rng: StdRng,
    position: MotorPosition,
    /// Frames since the last flip.
    frames_since_flip: u32,
    /// Frames the die keeps moving after a flip.
    tumble_frames: u32,
    /// Face the current roll will settle on.
    current_face: u32,
    /// Resting center of the die for the current roll.
    rest_x: f64,
    rest_y: f64,
    frame_counter: u64,
}

/// Build a connected motor/camera/detector triple over one shared rig.
pub fn simulated_rig(seed: u64) -> (SimMotor, SimCamera, SimDetector) {
    let state = Rc::new(RefCell::new(RigState {
        rng: StdRng::seed_from_u64(seed),
        position: MotorPosition::Plus90,
        frames_since_flip: 0,
        tumble_frames: 6,
        current_face: 1,
        rest_x: 320.0,
        rest_y: 240.0,
        frame_counter: 0,
    }));
    let mut names = HashMap::new();
    names.insert(DIE_CLASS, "Dice".to_string());
    names.insert(PIP_CLASS, "Pip".to_string());
    (
        SimMotor {
            state: Rc::clone(&state),
        },
        SimCamera {
            state: Rc::clone(&state),
        },
        SimDetector {
            state,
            class_names: names,
        },
    )
}

pub struct SimMotor {
    state: Rc<RefCell<RigState>>,
}

impl Motor for SimMotor {
    fn flip(&mut self) -> Result<MotorPosition> {
        let mut guard = self.state.borrow_mut();
        let rig = &mut *guard;
        rig.position = rig.position.flipped();
        rig.frames_since_flip = 0;
        rig.current_face = rig.rng.gen_range(1..=6);
        rig.rest_x = rig.rng.gen_range(250.0..400.0);
        rig.rest_y = rig.rng.gen_range(180.0..300.0);
        Ok(rig.position)
    }
}

pub struct SimCamera {
    state: Rc<RefCell<RigState>>,
}

impl FrameSource for SimCamera {
    fn grab(&mut self) -> Result<Option<CapturedFrame>> {
        let mut rig = self.state.borrow_mut();
        rig.frame_counter += 1;
        let reference = format!("sim_frame_{:06}.jpg", rig.frame_counter);
        Ok(Some(CapturedFrame {
            image: image::RgbImage::new(640, 480),
            reference,
        }))
    }
}

pub struct SimDetector {
    state: Rc<RefCell<RigState>>,
    class_names: HashMap<u32, String>,
}

impl Detector for SimDetector {
    fn infer(&mut self, _frame: &CapturedFrame) -> Result<Vec<RawDetection>> {
        let mut guard = self.state.borrow_mut();
        let rig = &mut *guard;
        rig.frames_since_flip += 1;

        let tumbling = rig.frames_since_flip <= rig.tumble_frames;
        let (cx, cy) = if tumbling {
            // Die still in flight: bounce it across the frame.
            (
                rig.rng.gen_range(100.0..540.0),
                rig.rng.gen_range(100.0..380.0),
            )
        } else {
            // Settled: the resting position plus bounding-box jitter.
            let jx = rig.rng.gen_range(-1.5..1.5);
            let jy = rig.rng.gen_range(-1.5..1.5);
            (rig.rest_x + jx, rig.rest_y + jy)
        };

        // ~200px die box, matching the validated die box area of ~40k px².
        let half = 100.0;
        let mut detections = vec![RawDetection {
            class_id: DIE_CLASS,
            x1: cx - half,
            y1: cy - half,
            x2: cx + half,
            y2: cy + half,
            confidence: rig.rng.gen_range(0.85..0.99),
        }];

        // Pips only resolve once the die has settled; 40px squares sit
        // inside the default pip area window.
        if !tumbling {
            for i in 0..rig.current_face {
                let px = cx - half + 20.0 + (i as f64) * 25.0;
                let py = cy - 20.0;
                detections.push(RawDetection {
                    class_id: PIP_CLASS,
                    x1: px,
                    y1: py,
                    x2: px + 40.0,
                    y2: py + 40.0,
                    confidence: rig.rng.gen_range(0.7..0.95),
                });
            }
        }

        Ok(detections)
    }

    fn class_names(&self) -> &HashMap<u32, String> {
        &self.class_names
    }
}

/// Writes one JSON line per roll record.
pub struct JsonlSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonlSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> RollSink for JsonlSink<W> {
    fn log_roll(&mut self, record: &RollRecord) -> Result<()> {
        let line = serde_json::to_string(record).context("Failed to serialize roll record")?;
        writeln!(self.writer, "{}", line).context("Failed to write roll record")?;
        Ok(())
    }
}
