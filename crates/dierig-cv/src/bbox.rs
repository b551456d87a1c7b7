//! Bounding box representation for detector output.
//!
//! Boxes arrive as xyxy corner coordinates with a class id and confidence,
//! matching what the inference collaborator emits per frame.

use dierig_core::Point;
use serde::{Deserialize, Serialize};

/// One labeled detection box in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub confidence: f64,
    pub class_id: u32,
}

impl BBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64, confidence: f64, class_id: u32) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            confidence,
            class_id,
        }
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// Box area in square pixels; the basis for size-based outlier filtering.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Center point of the box.
    pub fn center(&self) -> Point {
        Point::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// Whether the corners form a usable box: finite coordinates with
    /// non-negative extent. Anything else signals a broken detector contract.
    pub fn is_well_formed(&self) -> bool {
        [self.x1, self.y1, self.x2, self.y2, self.confidence]
            .iter()
            .all(|v| v.is_finite())
            && self.x2 >= self.x1
            && self.y2 >= self.y1
    }
}
