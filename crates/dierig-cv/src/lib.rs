//! Die Rig Computer Vision Library
//!
//! Adapts raw per-frame inference output into the normalized detection frames
//! consumed by the tracking core, with size-based outlier filtering and
//! calibration helpers for deriving the filter windows.

pub mod bbox;
pub mod calibration;
pub mod ingest;
pub mod overlay;

// Re-export commonly used types
pub use bbox::BBox;
pub use calibration::BoxSizeStats;
pub use ingest::{
    ingest, ClassBindings, DetectionFrame, IngestConfig, IngestError, RawDetection,
};

// Error handling
pub type Result<T> = anyhow::Result<T>;
