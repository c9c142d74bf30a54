// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall detection from 2D drawing primitives
//!
//! This crate turns loose line segments extracted from an architectural
//! drawing into classified wall records:
//!
//! 1. Merging: snapping, closed-loop extraction and double-line pairing
//!    produce wall-candidate polygons with a thickness estimate
//! 2. Classification: a four-tier precedence (label, layer, thickness,
//!    default) assigns each candidate a wall type from a legend
//!
//! Both passes are pure, synchronous transformations; geometry problems are
//! recovered locally and reported as aggregate statistics, configuration
//! problems abort the run before any output is produced.
//!
//! # Usage
//!
//! ```rust
//! use planwall_core::{Legend, LegendRule, Point2D, RawSegment};
//! use planwall_detect::{detect_walls, DetectionConfig};
//!
//! let segments = vec![
//!     RawSegment::new(Point2D::new(0.0, 0.0), Point2D::new(1000.0, 0.0)),
//!     RawSegment::new(Point2D::new(0.0, 150.0), Point2D::new(1000.0, 150.0)),
//! ];
//! let legend = Legend::from_rules([
//!     LegendRule::new("P", "Partition").with_max_thickness(100.0),
//!     LegendRule::new("LB", "Load-Bearing").with_min_thickness(200.0),
//! ]).unwrap();
//!
//! let detection = detect_walls(&segments, &legend, &DetectionConfig::default()).unwrap();
//! assert_eq!(detection.walls.len(), 1);
//! ```

pub mod classify;
pub mod error;
pub mod labeling;
pub mod merge;
pub mod segment_ops;

// Re-export commonly used types and functions
pub use classify::{
    classify, ClassifyConfig, ClassifyOutcome, ClassifyStats, LayerPattern, LayerRule,
};
pub use error::{Error, Result};
pub use labeling::attach_labels;
pub use merge::{merge, MergeConfig, MergeOutcome, MergeStats};

use planwall_core::{ClassifiedWall, Legend, RawSegment};
use serde::{Deserialize, Serialize};

/// Configuration for the full detect-and-classify pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectionConfig {
    pub merge: MergeConfig,
    pub classify: ClassifyConfig,
}

/// Result of the full pipeline
#[derive(Debug, Clone)]
pub struct Detection {
    pub walls: Vec<ClassifiedWall>,
    pub merge_stats: MergeStats,
    pub classify_stats: ClassifyStats,
}

/// Run the full pipeline: merge segments into candidates, then classify.
///
/// Label attachment is the caller's job; run [`attach_labels`] (or your own
/// association) on the merge output before classification if the drawing
/// carries text. This entry point is for callers that already have labels on
/// the segments themselves, or none at all.
pub fn detect_walls(
    segments: &[RawSegment],
    legend: &Legend,
    config: &DetectionConfig,
) -> Result<Detection> {
    let merged = merge::merge(segments, &config.merge);
    let classified = classify::classify(&merged.candidates, legend, &config.classify)?;

    Ok(Detection {
        walls: classified.walls,
        merge_stats: merged.stats,
        classify_stats: classified.stats,
    })
}
