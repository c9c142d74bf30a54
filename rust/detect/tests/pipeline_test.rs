// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end pipeline tests: merge, label attachment, classification

use planwall_core::{
    ClassifiedWall, Legend, LegendRule, Point2D, RawSegment, RuleTier, TextAnnotation,
    UNKNOWN_TYPE,
};
use planwall_detect::{
    attach_labels, classify, detect_walls, merge, ClassifyConfig, DetectionConfig, LayerRule,
    MergeConfig,
};

fn seg(x1: f64, y1: f64, x2: f64, y2: f64) -> RawSegment {
    RawSegment::new(Point2D::new(x1, y1), Point2D::new(x2, y2))
}

fn rectangle(x: f64, y: f64, w: f64, h: f64) -> Vec<RawSegment> {
    vec![
        seg(x, y, x + w, y),
        seg(x + w, y, x + w, y + h),
        seg(x + w, y + h, x, y + h),
        seg(x, y + h, x, y),
    ]
}

fn sample_legend() -> Legend {
    Legend::from_rules([
        LegendRule::new("P", "Partition").with_max_thickness(100.0),
        LegendRule::new("LB", "Load-Bearing").with_min_thickness(200.0),
        LegendRule::new("B-01", "Load-Bearing"),
    ])
    .unwrap()
}

/// Rotation-normalize a polygon for order-independent comparison
fn normalized(polygon: &[Point2D]) -> Vec<(i64, i64)> {
    let pts: Vec<(i64, i64)> = polygon
        .iter()
        .map(|p| ((p.x * 1000.0).round() as i64, (p.y * 1000.0).round() as i64))
        .collect();
    let start = pts
        .iter()
        .enumerate()
        .min_by_key(|&(_, p)| p)
        .map(|(i, _)| i)
        .unwrap();
    pts[start..].iter().chain(&pts[..start]).copied().collect()
}

fn polygon_set(walls: &[ClassifiedWall]) -> Vec<Vec<(i64, i64)>> {
    let mut set: Vec<Vec<(i64, i64)>> = walls.iter().map(|w| normalized(&w.polygon)).collect();
    set.sort();
    set
}

#[test]
fn test_parallel_pair_classifies_unknown_between_intervals() {
    // Two parallel segments 150 apart: thicker than a partition, thinner
    // than load-bearing
    let segments = vec![
        seg(0.0, 0.0, 1000.0, 0.0),
        seg(0.0, 150.0, 1000.0, 150.0),
    ];

    let detection =
        detect_walls(&segments, &sample_legend(), &DetectionConfig::default()).unwrap();

    assert_eq!(detection.walls.len(), 1);
    let wall = &detection.walls[0];
    assert_eq!(wall.id, "WALL_0001");
    assert_eq!(wall.type_name, UNKNOWN_TYPE);
    assert_eq!(wall.tier, RuleTier::Unclassified);
    assert!(wall.thickness > 100.0 && wall.thickness < 200.0);
    assert_eq!(detection.merge_stats.paired, 1);
    assert_eq!(detection.classify_stats.unclassified, 1);
}

#[test]
fn test_layer_rectangle_classifies_by_layer() {
    let segments: Vec<RawSegment> = rectangle(0.0, 0.0, 1000.0, 200.0)
        .into_iter()
        .map(|s| s.with_layer("WALL_LB"))
        .collect();

    let config = DetectionConfig {
        classify: ClassifyConfig {
            layer_rules: vec![LayerRule::prefix("WALL_LB", "Load-Bearing")],
            thickness_tolerance: 0.0,
        },
        ..Default::default()
    };

    let detection = detect_walls(&segments, &sample_legend(), &config).unwrap();
    assert_eq!(detection.walls.len(), 1);
    assert_eq!(detection.walls[0].type_name, "Load-Bearing");
    assert_eq!(detection.walls[0].tier, RuleTier::Layer);
}

#[test]
fn test_attached_text_classifies_by_label() {
    let segments = rectangle(0.0, 0.0, 1000.0, 200.0);
    let merged = merge(&segments, &MergeConfig::default());
    let mut candidates = merged.candidates;

    let texts = vec![TextAnnotation::new("b-01", Point2D::new(500.0, 100.0))];
    assert_eq!(attach_labels(&mut candidates, &texts, 10.0), 1);

    let outcome = classify(&candidates, &sample_legend(), &ClassifyConfig::default()).unwrap();
    assert_eq!(outcome.walls[0].type_name, "Load-Bearing");
    assert_eq!(outcome.walls[0].tier, RuleTier::Label);
}

#[test]
fn test_mixed_scene_statistics() {
    // A closed room outline, a double-line wall and a stray construction line
    let mut segments = rectangle(0.0, 0.0, 1000.0, 220.0);
    segments.push(seg(2000.0, 0.0, 3000.0, 0.0));
    segments.push(seg(2000.0, 90.0, 3000.0, 90.0));
    segments.push(seg(9000.0, 9000.0, 9500.0, 9500.0));

    let detection =
        detect_walls(&segments, &sample_legend(), &DetectionConfig::default()).unwrap();

    assert_eq!(detection.merge_stats.loops, 1);
    assert_eq!(detection.merge_stats.paired, 1);
    assert_eq!(detection.merge_stats.unpaired, 1);
    assert_eq!(detection.walls.len(), 2);

    let ids: Vec<&str> = detection.walls.iter().map(|w| w.id.as_str()).collect();
    assert_eq!(ids, vec!["WALL_0001", "WALL_0002"]);

    // Output invariant: every wall has exactly one type and one tier
    for wall in &detection.walls {
        assert!(!wall.type_name.is_empty());
    }
}

#[test]
fn test_input_reorder_preserves_candidate_set() {
    let mut segments = rectangle(0.0, 0.0, 1000.0, 220.0);
    segments.push(seg(2000.0, 0.0, 3000.0, 0.0));
    segments.push(seg(2000.0, 90.0, 3000.0, 90.0));

    let forward = detect_walls(&segments, &sample_legend(), &DetectionConfig::default()).unwrap();

    let mut reversed_input = segments.clone();
    reversed_input.reverse();
    let reversed =
        detect_walls(&reversed_input, &sample_legend(), &DetectionConfig::default()).unwrap();

    assert_eq!(polygon_set(&forward.walls), polygon_set(&reversed.walls));
}

#[test]
fn test_legend_reorder_without_overlap_is_neutral() {
    let forward = Legend::from_rules([
        LegendRule::new("P", "Partition").with_max_thickness(100.0),
        LegendRule::new("LB", "Load-Bearing").with_min_thickness(200.0),
    ])
    .unwrap();
    let backward = Legend::from_rules([
        LegendRule::new("LB", "Load-Bearing").with_min_thickness(200.0),
        LegendRule::new("P", "Partition").with_max_thickness(100.0),
    ])
    .unwrap();

    let mut segments = rectangle(0.0, 0.0, 1000.0, 90.0);
    segments.extend(rectangle(0.0, 2000.0, 1000.0, 400.0));

    let config = DetectionConfig::default();
    let a = detect_walls(&segments, &forward, &config).unwrap();
    let b = detect_walls(&segments, &backward, &config).unwrap();

    assert_eq!(a.walls.len(), b.walls.len());
    for (wa, wb) in a.walls.iter().zip(&b.walls) {
        assert_eq!(wa.type_name, wb.type_name);
        assert_eq!(wa.tier, wb.tier);
    }
}

#[test]
fn test_classified_wall_round_trips_through_json() {
    let segments = rectangle(0.0, 0.0, 1000.0, 200.0);
    let detection =
        detect_walls(&segments, &sample_legend(), &DetectionConfig::default()).unwrap();

    let json = serde_json::to_string(&detection.walls).unwrap();
    let back: Vec<ClassifiedWall> = serde_json::from_str(&json).unwrap();

    assert_eq!(back.len(), detection.walls.len());
    for (a, b) in detection.walls.iter().zip(&back) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.tier, b.tier);
        for (pa, pb) in a.polygon.iter().zip(&b.polygon) {
            assert_eq!(pa.x, pb.x);
            assert_eq!(pa.y, pb.y);
        }
    }
}
