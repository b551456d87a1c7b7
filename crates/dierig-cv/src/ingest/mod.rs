//! Detection ingest: raw inference output → normalized [`DetectionFrame`].

pub mod classes;
pub mod config;
pub mod frame;

pub use classes::ClassBindings;
pub use config::IngestConfig;
pub use frame::DetectionFrame;

use thiserror::Error;

use crate::bbox::BBox;

/// One raw labeled rectangle from the inference collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawDetection {
    pub class_id: u32,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub confidence: f64,
}

/// Ingest failures. Only contract violations are errors; an empty or
/// ambiguous frame is a normal outcome.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Detector emitted a box with non-finite or inverted coordinates.
    /// The collaborator contract is broken; there is no partial recovery.
    #[error("malformed detection at index {index}: non-finite or inverted coordinates")]
    MalformedDetection { index: usize },
    /// The model's class map has no entry for a required class name.
    #[error("model class map has no class named {name:?}")]
    MissingClass { name: &'static str },
}

/// Normalize one frame's raw detections.
///
/// Die selection: the frame gets a die box only when exactly one "Dice"-class
/// detection is present; zero candidates and multiple candidates are treated
/// identically as not found. Pip selection: "Pip"-class boxes survive when
/// their area falls inside the configured window, in detector output order.
/// Unknown class ids are ignored.
pub fn ingest(
    raw: &[RawDetection],
    classes: &ClassBindings,
    config: &IngestConfig,
) -> Result<DetectionFrame, IngestError> {
    let mut die_candidates: Vec<BBox> = Vec::new();
    let mut pip_boxes: Vec<BBox> = Vec::new();

    for (index, det) in raw.iter().enumerate() {
        let bbox = BBox::new(det.x1, det.y1, det.x2, det.y2, det.confidence, det.class_id);
        if !bbox.is_well_formed() {
            return Err(IngestError::MalformedDetection { index });
        }
        if det.class_id == classes.die_class_id {
            die_candidates.push(bbox);
        } else if det.class_id == classes.pip_class_id {
            if config.pip_area_accepted(bbox.area()) {
                pip_boxes.push(bbox);
            }
        }
    }

    // Zero or several die candidates collapse to "not found"; multi-die
    // frames are out of scope and a duplicate box is indistinguishable from
    // a false positive here.
    let die_box = if die_candidates.len() == 1 {
        Some(die_candidates[0])
    } else {
        None
    };

    Ok(DetectionFrame::new(die_box, pip_boxes))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIE: u32 = 0;
    const PIP: u32 = 1;

    fn bindings() -> ClassBindings {
        ClassBindings {
            die_class_id: DIE,
            pip_class_id: PIP,
        }
    }

    fn det(class_id: u32, x1: f64, y1: f64, x2: f64, y2: f64) -> RawDetection {
        RawDetection {
            class_id,
            x1,
            y1,
            x2,
            y2,
            confidence: 0.9,
        }
    }

    /// A pip box with the given area (square, anchored at the origin).
    fn pip_with_area(area: f64) -> RawDetection {
        let side = area.sqrt();
        det(PIP, 0.0, 0.0, side, side)
    }

    #[test]
    fn test_single_die_accepted() {
        let raw = [det(DIE, 100.0, 100.0, 300.0, 300.0)];
        let frame = ingest(&raw, &bindings(), &IngestConfig::default()).unwrap();
        assert!(frame.die_box.is_some());
        let center = frame.die_center().unwrap();
        assert_eq!((center.x, center.y), (200.0, 200.0));
    }

    #[test]
    fn test_no_die_is_none_not_error() {
        let frame = ingest(&[], &bindings(), &IngestConfig::default()).unwrap();
        assert!(frame.die_box.is_none());
        assert!(frame.pip_boxes.is_empty());
        assert_eq!(frame.pip_count(), 0);
    }

    #[test]
    fn test_two_die_boxes_collapse_to_none() {
        // Scenario D: two overlapping die boxes in one frame.
        let raw = [
            det(DIE, 100.0, 100.0, 300.0, 300.0),
            det(DIE, 110.0, 105.0, 310.0, 305.0),
        ];
        let frame = ingest(&raw, &bindings(), &IngestConfig::default()).unwrap();
        assert!(frame.die_box.is_none());
        assert!(frame.die_center().is_none());
    }

    #[test]
    fn test_pip_area_window() {
        let config = IngestConfig::default();
        let raw = [
            pip_with_area(1600.0), // in-range survivor
            pip_with_area(400.0),  // undersized false positive
            pip_with_area(9000.0), // oversized false positive
        ];
        let frame = ingest(&raw, &bindings(), &config).unwrap();
        assert_eq!(frame.pip_count(), 1);
        assert!((frame.pip_boxes[0].area() - 1600.0).abs() < 1e-6);
    }

    #[test]
    fn test_pip_area_boundaries_inclusive() {
        let config = IngestConfig {
            min_pip_area: 1200.0,
            max_pip_area: 2300.0,
        };
        // Exact boundary areas are accepted on both ends.
        assert!(config.pip_area_accepted(1200.0));
        assert!(config.pip_area_accepted(2300.0));
        // Just outside is rejected.
        assert!(!config.pip_area_accepted(1200.0 - 1e-9));
        assert!(!config.pip_area_accepted(2300.0 + 1e-9));
    }

    #[test]
    fn test_pip_order_preserved() {
        let raw = [
            det(PIP, 0.0, 0.0, 40.0, 40.0),
            det(PIP, 50.0, 0.0, 90.0, 40.0),
            det(PIP, 100.0, 0.0, 140.0, 40.0),
        ];
        let frame = ingest(&raw, &bindings(), &IngestConfig::default()).unwrap();
        let xs: Vec<f64> = frame.pip_boxes.iter().map(|b| b.x1).collect();
        assert_eq!(xs, vec![0.0, 50.0, 100.0]);
    }

    #[test]
    fn test_unknown_class_ignored() {
        let raw = [det(99, 0.0, 0.0, 40.0, 40.0)];
        let frame = ingest(&raw, &bindings(), &IngestConfig::default()).unwrap();
        assert!(frame.die_box.is_none());
        assert_eq!(frame.pip_count(), 0);
    }

    #[test]
    fn test_malformed_detection_is_an_error() {
        let raw = [det(DIE, 100.0, 100.0, f64::NAN, 300.0)];
        let err = ingest(&raw, &bindings(), &IngestConfig::default()).unwrap_err();
        assert!(matches!(err, IngestError::MalformedDetection { index: 0 }));
    }

    #[test]
    fn test_inverted_corners_are_malformed() {
        let raw = [
            det(PIP, 0.0, 0.0, 40.0, 40.0),
            det(DIE, 300.0, 100.0, 100.0, 300.0),
        ];
        let err = ingest(&raw, &bindings(), &IngestConfig::default()).unwrap_err();
        assert!(matches!(err, IngestError::MalformedDetection { index: 1 }));
    }
}
