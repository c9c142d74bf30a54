// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Low-level segment and polygon operations

use nalgebra::Vector2;
use planwall_core::Point2D;
use std::f64::consts::PI;

/// Calculate perpendicular distance from a point to a line segment
pub fn point_to_segment_distance(point: &Point2D, start: &Point2D, end: &Point2D) -> f64 {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let length_sq = dx * dx + dy * dy;

    if length_sq < 1e-10 {
        return point.distance_to(start);
    }

    // Project point onto line and calculate perpendicular distance
    let t = ((point.x - start.x) * dx + (point.y - start.y) * dy) / length_sq;
    let t = t.clamp(0.0, 1.0);

    let proj_x = start.x + t * dx;
    let proj_y = start.y + t * dy;

    let px = point.x - proj_x;
    let py = point.y - proj_y;
    (px * px + py * py).sqrt()
}

/// Undirected angle difference between two direction angles, in `[0, PI/2]`
pub fn angle_difference(a: f64, b: f64) -> f64 {
    let mut diff = (a - b).abs() % PI;
    if diff > PI / 2.0 {
        diff = PI - diff;
    }
    diff
}

/// Unit direction vector from `start` to `end`
pub fn unit_direction(start: &Point2D, end: &Point2D) -> Vector2<f64> {
    let v = Vector2::new(end.x - start.x, end.y - start.y);
    let len = v.norm();
    if len < 1e-12 {
        Vector2::new(1.0, 0.0)
    } else {
        v / len
    }
}

/// Project a point onto a direction, relative to an origin
pub fn project_onto(point: &Point2D, origin: &Point2D, dir: &Vector2<f64>) -> f64 {
    (point.x - origin.x) * dir.x + (point.y - origin.y) * dir.y
}

/// Overlap of two 1D ranges as a fraction of the shorter range.
///
/// Zero when the ranges are disjoint or either is degenerate.
pub fn overlap_ratio(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (a_min, a_max) = (a.0.min(a.1), a.0.max(a.1));
    let (b_min, b_max) = (b.0.min(b.1), b.0.max(b.1));

    let overlap = (a_max.min(b_max) - a_min.max(b_min)).max(0.0);
    let shorter = (a_max - a_min).min(b_max - b_min);

    if shorter < 1e-12 {
        return 0.0;
    }
    overlap / shorter
}

/// Point-in-polygon test by ray casting.
///
/// The polygon ring is implicitly closed. Points exactly on an edge may land
/// on either side; callers pair this with a distance check when that matters.
pub fn point_in_polygon(point: &Point2D, polygon: &[Point2D]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = &polygon[i];
        let pj = &polygon[j];
        if (pi.y > point.y) != (pj.y > point.y) {
            let x_cross = pj.x + (point.y - pj.y) / (pi.y - pj.y) * (pi.x - pj.x);
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Minimum distance from a point to a polygon boundary
pub fn point_to_polygon_distance(point: &Point2D, polygon: &[Point2D]) -> f64 {
    let n = polygon.len();
    if n == 0 {
        return f64::MAX;
    }
    if n == 1 {
        return point.distance_to(&polygon[0]);
    }

    let mut min_dist = f64::MAX;
    for i in 0..n {
        let j = (i + 1) % n;
        min_dist = min_dist.min(point_to_segment_distance(point, &polygon[i], &polygon[j]));
    }
    min_dist
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_point_to_segment_distance() {
        let start = Point2D::new(0.0, 0.0);
        let end = Point2D::new(10.0, 0.0);

        let above = Point2D::new(5.0, 5.0);
        assert_relative_eq!(point_to_segment_distance(&above, &start, &end), 5.0);

        // Beyond the endpoint the distance is to the endpoint itself
        let past = Point2D::new(13.0, 4.0);
        assert_relative_eq!(point_to_segment_distance(&past, &start, &end), 5.0);
    }

    #[test]
    fn test_angle_difference_wraps_direction() {
        // Opposite directions are parallel
        assert_relative_eq!(angle_difference(0.0, PI), 0.0);
        assert_relative_eq!(angle_difference(0.1, PI + 0.1), 0.0, epsilon = 1e-12);
        assert_relative_eq!(angle_difference(0.0, PI / 2.0), PI / 2.0);
    }

    #[test]
    fn test_overlap_ratio() {
        assert_relative_eq!(overlap_ratio((0.0, 10.0), (5.0, 15.0)), 0.5);
        assert_relative_eq!(overlap_ratio((0.0, 10.0), (0.0, 10.0)), 1.0);
        assert_relative_eq!(overlap_ratio((0.0, 10.0), (20.0, 30.0)), 0.0);
        // Argument order inside a range must not matter
        assert_relative_eq!(overlap_ratio((10.0, 0.0), (15.0, 5.0)), 0.5);
    }

    #[test]
    fn test_point_in_polygon() {
        let square = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(10.0, 0.0),
            Point2D::new(10.0, 10.0),
            Point2D::new(0.0, 10.0),
        ];

        assert!(point_in_polygon(&Point2D::new(5.0, 5.0), &square));
        assert!(!point_in_polygon(&Point2D::new(15.0, 5.0), &square));
        assert!(!point_in_polygon(&Point2D::new(-1.0, -1.0), &square));
    }

    #[test]
    fn test_point_to_polygon_distance() {
        let square = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(10.0, 0.0),
            Point2D::new(10.0, 10.0),
            Point2D::new(0.0, 10.0),
        ];

        assert_relative_eq!(
            point_to_polygon_distance(&Point2D::new(5.0, 13.0), &square),
            3.0
        );
        assert_relative_eq!(
            point_to_polygon_distance(&Point2D::new(5.0, 5.0), &square),
            5.0
        );
    }
}
