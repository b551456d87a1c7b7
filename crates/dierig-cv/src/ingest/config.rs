//! Ingest configuration.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::calibration::BoxSizeStats;

/// Pip box area window in squared pixels of the training image scale.
///
/// Defaults come from box-size statistics gathered over validated frames
/// (pip mean 1666, stdev ~101). The plain two-sigma window dropped several
/// true positives, so the bounds were widened by hand around the observed
/// true extremes (min 1295, max 2256).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestConfig {
    pub min_pip_area: f64,
    pub max_pip_area: f64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            min_pip_area: 1200.0,
            max_pip_area: 2300.0,
        }
    }
}

impl IngestConfig {
    /// Closed interval on both ends: a box exactly at a bound survives.
    pub fn pip_area_accepted(&self, area: f64) -> bool {
        area >= self.min_pip_area && area <= self.max_pip_area
    }

    /// Derive the window from gathered pip box statistics.
    pub fn from_pip_stats(stats: &BoxSizeStats) -> Self {
        Self {
            min_pip_area: stats.min_threshold,
            max_pip_area: stats.max_threshold,
        }
    }

    /// Load a calibration file written by a previous tuning pass.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read ingest config: {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse ingest config: {}", path.display()))
    }
}
