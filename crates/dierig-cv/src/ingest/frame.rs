//! The normalized per-frame detection result.

use dierig_core::Point;
use serde::{Deserialize, Serialize};

use crate::bbox::BBox;

/// One frame's worth of normalized detections. Built fresh per frame,
/// immutable after construction, and discarded once the tracker consumes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionFrame {
    /// At most one die. `None` covers both "not found" and "ambiguous".
    pub die_box: Option<BBox>,
    /// Area-filtered pip boxes in detector output order.
    pub pip_boxes: Vec<BBox>,
}

impl DetectionFrame {
    pub fn new(die_box: Option<BBox>, pip_boxes: Vec<BBox>) -> Self {
        Self { die_box, pip_boxes }
    }

    /// Center of the die box, when a single die was found.
    pub fn die_center(&self) -> Option<Point> {
        self.die_box.as_ref().map(BBox::center)
    }

    /// Candidate pip count for this frame; the face-value proxy.
    pub fn pip_count(&self) -> u32 {
        self.pip_boxes.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_die_center_derived_from_box() {
        let frame = DetectionFrame::new(
            Some(BBox::new(0.0, 0.0, 100.0, 200.0, 0.95, 0)),
            Vec::new(),
        );
        let center = frame.die_center().unwrap();
        assert_eq!((center.x, center.y), (50.0, 100.0));
    }

    #[test]
    fn test_empty_frame() {
        let frame = DetectionFrame::new(None, Vec::new());
        assert!(frame.die_center().is_none());
        assert_eq!(frame.pip_count(), 0);
    }
}
