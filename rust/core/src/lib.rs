// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Planwall Core
//!
//! Shared data model for the planwall pipeline: raw drawing primitives,
//! merged wall candidates, the classification legend, and classified wall
//! records. No algorithms live here; segment merging and classification
//! are in `planwall-detect`.
//!
//! ## Quick Start
//!
//! ```rust
//! use planwall_core::{Legend, LegendRule, Point2D, RawSegment};
//!
//! let segment = RawSegment::new(Point2D::new(0.0, 0.0), Point2D::new(1000.0, 0.0))
//!     .with_layer("WALL_LB");
//!
//! let legend = Legend::from_rules([
//!     LegendRule::new("B-01", "Load-Bearing Wall").with_min_thickness(200.0),
//!     LegendRule::new("P-01", "Partition Wall").with_max_thickness(120.0),
//! ]).unwrap();
//!
//! assert!(legend.get(" b-01 ").is_some());
//! assert!(segment.layer.is_some());
//! ```

pub mod error;
pub mod legend;
pub mod types;

// Re-export commonly used types
pub use error::{Error, Result};
pub use legend::{Legend, LegendRule};
pub use types::{
    Bounds, ClassifiedWall, Point2D, RawSegment, RuleTier, TextAnnotation, WallCandidate,
    UNKNOWN_TYPE,
};
