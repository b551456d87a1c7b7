//! Box-size statistics for tuning the outlier filters.
//!
//! Gathered over frames with validated detections, the area statistics give
//! the mean, standard deviation, and a two-sigma acceptance window used to
//! seed the ingest configuration.

use serde::{Deserialize, Serialize};

use crate::bbox::BBox;

/// Area statistics over a collection of boxes of one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxSizeStats {
    pub mean: f64,
    pub stdev: f64,
    /// `mean - 2 * stdev`
    pub min_threshold: f64,
    /// `mean + 2 * stdev`
    pub max_threshold: f64,
}

impl BoxSizeStats {
    /// Compute from raw areas. Empty input yields all zeros; a single
    /// sample has zero deviation, so its window collapses to the mean.
    pub fn from_areas(areas: &[f64]) -> Self {
        if areas.is_empty() {
            return Self {
                mean: 0.0,
                stdev: 0.0,
                min_threshold: 0.0,
                max_threshold: 0.0,
            };
        }
        let mean = areas.iter().sum::<f64>() / areas.len() as f64;
        let stdev = if areas.len() > 1 {
            // Sample standard deviation.
            let var = areas.iter().map(|a| (a - mean).powi(2)).sum::<f64>()
                / (areas.len() - 1) as f64;
            var.sqrt()
        } else {
            0.0
        };
        Self {
            mean,
            stdev,
            min_threshold: mean - 2.0 * stdev,
            max_threshold: mean + 2.0 * stdev,
        }
    }

    /// Compute from boxes directly.
    pub fn from_boxes(boxes: &[BBox]) -> Self {
        let areas: Vec<f64> = boxes.iter().map(BBox::area).collect();
        Self::from_areas(&areas)
    }

    /// Whether an area falls inside the acceptance window.
    pub fn accepts(&self, area: f64) -> bool {
        area >= self.min_threshold && area <= self.max_threshold
    }
}
