// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for wall detection from 2D drawings

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Type name assigned when no classification tier matches.
pub const UNKNOWN_TYPE: &str = "Unknown";

/// A 2D point (simplified for serialization)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_nalgebra(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    pub fn from_nalgebra(p: &Point2<f64>) -> Self {
        Self { x: p.x, y: p.y }
    }

    pub fn distance_to(&self, other: &Point2D) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A raw line segment extracted from a drawing.
///
/// Segments are immutable inputs to the merge pass. The optional layer name
/// and nearby-text label are carried through to the candidate they end up in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawSegment {
    pub start: Point2D,
    pub end: Point2D,
    /// Originating drawing layer, if the entity had one
    pub layer: Option<String>,
    /// Text found near the segment, if any (attachment is the caller's job)
    pub label: Option<String>,
}

impl RawSegment {
    pub fn new(start: Point2D, end: Point2D) -> Self {
        Self {
            start,
            end,
            layer: None,
            label: None,
        }
    }

    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }

    pub fn midpoint(&self) -> Point2D {
        Point2D::new(
            (self.start.x + self.end.x) / 2.0,
            (self.start.y + self.end.y) / 2.0,
        )
    }

    /// Direction angle in radians, in `(-PI, PI]`
    pub fn direction_angle(&self) -> f64 {
        (self.end.y - self.start.y).atan2(self.end.x - self.start.x)
    }

    pub fn is_finite(&self) -> bool {
        self.start.is_finite() && self.end.is_finite()
    }
}

/// A text annotation with its insertion point, as read from the drawing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextAnnotation {
    pub text: String,
    pub position: Point2D,
}

impl TextAnnotation {
    pub fn new(text: impl Into<String>, position: Point2D) -> Self {
        Self {
            text: text.into(),
            position,
        }
    }
}

/// Axis-aligned bounding box of a polygon
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

/// A merged polygon hypothesized to represent a single wall.
///
/// The polygon is an ordered vertex ring, counter-clockwise, first vertex not
/// repeated at the end. `source_ids` records the indices of the raw segments
/// that contributed to the boundary, in ascending order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WallCandidate {
    pub polygon: Vec<Point2D>,
    /// Width estimate: polygon area over half its perimeter.
    /// Exact only in the long-thin limit; underestimates stubby shapes.
    pub thickness: f64,
    pub source_ids: Vec<usize>,
    pub layer: Option<String>,
    pub label: Option<String>,
}

impl WallCandidate {
    /// Signed polygon area using the shoelace formula (positive = CCW)
    pub fn signed_area(points: &[Point2D]) -> f64 {
        let n = points.len();
        if n < 3 {
            return 0.0;
        }

        let mut area = 0.0;
        for i in 0..n {
            let j = (i + 1) % n;
            area += points[i].x * points[j].y;
            area -= points[j].x * points[i].y;
        }

        area / 2.0
    }

    pub fn area(&self) -> f64 {
        Self::signed_area(&self.polygon).abs()
    }

    pub fn perimeter(&self) -> f64 {
        let n = self.polygon.len();
        if n < 2 {
            return 0.0;
        }
        let mut total = 0.0;
        for i in 0..n {
            total += self.polygon[i].distance_to(&self.polygon[(i + 1) % n]);
        }
        total
    }

    /// Vertex-average centroid
    pub fn centroid(&self) -> Option<Point2D> {
        if self.polygon.is_empty() {
            return None;
        }
        let n = self.polygon.len() as f64;
        let sx: f64 = self.polygon.iter().map(|p| p.x).sum();
        let sy: f64 = self.polygon.iter().map(|p| p.y).sum();
        Some(Point2D::new(sx / n, sy / n))
    }

    pub fn bounds(&self) -> Option<Bounds> {
        if self.polygon.is_empty() {
            return None;
        }
        let mut b = Bounds {
            min_x: f64::MAX,
            min_y: f64::MAX,
            max_x: f64::MIN,
            max_y: f64::MIN,
        };
        for p in &self.polygon {
            b.min_x = b.min_x.min(p.x);
            b.min_y = b.min_y.min(p.y);
            b.max_x = b.max_x.max(p.x);
            b.max_y = b.max_y.max(p.y);
        }
        Some(b)
    }
}

/// The classification tier that produced a wall's type assignment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleTier {
    Label,
    Layer,
    Thickness,
    Unclassified,
}

impl std::fmt::Display for RuleTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RuleTier::Label => "label",
            RuleTier::Layer => "layer",
            RuleTier::Thickness => "thickness",
            RuleTier::Unclassified => "unclassified",
        };
        f.write_str(s)
    }
}

/// A wall candidate with its assigned identifier, type and rule tier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassifiedWall {
    /// Stable identifier in candidate order (`WALL_0001`, `WALL_0002`, ...)
    pub id: String,
    pub polygon: Vec<Point2D>,
    pub thickness: f64,
    pub source_ids: Vec<usize>,
    pub layer: Option<String>,
    pub label: Option<String>,
    /// Assigned type name, or [`UNKNOWN_TYPE`]
    pub type_name: String,
    pub tier: RuleTier,
}

impl ClassifiedWall {
    pub fn from_candidate(
        id: String,
        candidate: WallCandidate,
        type_name: String,
        tier: RuleTier,
    ) -> Self {
        Self {
            id,
            polygon: candidate.polygon,
            thickness: candidate.thickness,
            source_ids: candidate.source_ids,
            layer: candidate.layer,
            label: candidate.label,
            type_name,
            tier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rect(w: f64, h: f64) -> Vec<Point2D> {
        vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(w, 0.0),
            Point2D::new(w, h),
            Point2D::new(0.0, h),
        ]
    }

    fn candidate(polygon: Vec<Point2D>) -> WallCandidate {
        WallCandidate {
            polygon,
            thickness: 0.0,
            source_ids: vec![],
            layer: None,
            label: None,
        }
    }

    #[test]
    fn test_rectangle_area_and_perimeter() {
        let c = candidate(rect(10.0, 2.0));
        assert_relative_eq!(c.area(), 20.0);
        assert_relative_eq!(c.perimeter(), 24.0);
    }

    #[test]
    fn test_signed_area_orientation() {
        let ccw = rect(1.0, 1.0);
        let cw: Vec<Point2D> = ccw.iter().rev().copied().collect();
        assert!(WallCandidate::signed_area(&ccw) > 0.0);
        assert!(WallCandidate::signed_area(&cw) < 0.0);
    }

    #[test]
    fn test_centroid_and_bounds() {
        let c = candidate(rect(1.0, 1.0));
        let centroid = c.centroid().unwrap();
        assert_relative_eq!(centroid.x, 0.5);
        assert_relative_eq!(centroid.y, 0.5);

        let b = c.bounds().unwrap();
        assert_relative_eq!(b.max_x, 1.0);
        assert_relative_eq!(b.min_y, 0.0);
    }

    #[test]
    fn test_segment_direction_angle() {
        let s = RawSegment::new(Point2D::new(0.0, 0.0), Point2D::new(0.0, 5.0));
        assert_relative_eq!(s.direction_angle(), std::f64::consts::FRAC_PI_2);
        assert_relative_eq!(s.length(), 5.0);
    }

    #[test]
    fn test_rule_tier_serialization() {
        assert_eq!(
            serde_json::to_string(&RuleTier::Unclassified).unwrap(),
            "\"unclassified\""
        );
        assert_eq!(
            serde_json::from_str::<RuleTier>("\"label\"").unwrap(),
            RuleTier::Label
        );
    }

    #[test]
    fn test_classified_wall_keeps_candidate_fields() {
        let mut c = candidate(rect(10.0, 2.0));
        c.thickness = 1.5;
        c.source_ids = vec![0, 3];
        c.layer = Some("WALL".into());

        let wall = ClassifiedWall::from_candidate(
            "WALL_0001".into(),
            c,
            UNKNOWN_TYPE.into(),
            RuleTier::Unclassified,
        );
        assert_eq!(wall.id, "WALL_0001");
        assert_eq!(wall.source_ids, vec![0, 3]);
        assert_eq!(wall.layer.as_deref(), Some("WALL"));
        assert_relative_eq!(wall.thickness, 1.5);
    }
}
