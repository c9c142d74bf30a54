// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Segment merging: snapping, loop extraction and parallel pairing
//!
//! The merge pass turns loose line segments into wall-candidate polygons:
//!
//! 1. Endpoints within the snap tolerance are unified (grid-bucketed
//!    union-find), closing the small gaps and overlaps of traced drawings.
//! 2. The snapped segments form a planar graph. Bounded faces of that graph
//!    are extracted as closed wall outlines.
//! 3. Segments on no bounded face are paired with a nearby parallel partner
//!    (the double-line wall convention) and emitted as thin rectangles.
//!
//! Segments that neither close a loop nor find a partner are not walls;
//! they are excluded and counted, never raised as errors.

use crate::segment_ops::{
    angle_difference, overlap_ratio, point_to_segment_distance, project_onto, unit_direction,
};
use nalgebra::Vector2;
use planwall_core::{Point2D, RawSegment, WallCandidate};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Configuration for the merge pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Endpoints closer than this are treated as the same point.
    /// Units follow the drawing (project-unit dependent).
    pub snap_tolerance: f64,
    /// Polygons with a smaller area are dropped as slivers
    pub min_area: f64,
    /// Maximum direction difference for pairing double-line walls (radians)
    pub pair_angle_tolerance: f64,
    /// Maximum separation between paired parallel segments
    pub max_pair_separation: f64,
    /// Minimum extent overlap for pairing, as a fraction of the shorter segment
    pub min_pair_overlap: f64,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            snap_tolerance: 1.0,
            min_area: 1.0,
            pair_angle_tolerance: 0.08, // ~4.5 degrees
            max_pair_separation: 500.0,
            min_pair_overlap: 0.3,
        }
    }
}

/// Aggregate statistics from a merge pass
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MergeStats {
    /// Segments received
    pub input: usize,
    /// Segments with non-finite coordinates, skipped
    pub malformed: usize,
    /// Segments whose endpoints snapped to the same point, skipped
    pub collapsed: usize,
    /// Candidates extracted as closed loops
    pub loops: usize,
    /// Candidates built from parallel segment pairs
    pub paired: usize,
    /// Polygons dropped by the minimum-area filter
    pub dropped_degenerate: usize,
    /// Distinct boundary edges that closed no loop and found no partner
    pub unpaired: usize,
    /// Candidates emitted
    pub candidates: usize,
}

/// Result of a merge pass
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub candidates: Vec<WallCandidate>,
    pub stats: MergeStats,
}

/// Merge raw segments into wall-candidate polygons.
///
/// Never fails: malformed segments, degenerate polygons and leftover
/// segments are dropped and reported through [`MergeStats`]. Candidate order
/// is deterministic for a given input ordering (loops first, then pairs).
///
/// Segments are assumed to intersect only at endpoints once snapped;
/// crossings away from endpoints are not split.
pub fn merge(segments: &[RawSegment], config: &MergeConfig) -> MergeOutcome {
    let mut stats = MergeStats {
        input: segments.len(),
        ..Default::default()
    };

    // Step 1: drop segments that cannot be interpreted as coordinates
    let valid: Vec<(usize, &RawSegment)> = segments
        .iter()
        .enumerate()
        .filter(|(_, s)| {
            if s.is_finite() {
                true
            } else {
                stats.malformed += 1;
                false
            }
        })
        .collect();

    // Step 2: snap endpoints
    let endpoints: Vec<Point2D> = valid
        .iter()
        .flat_map(|(_, s)| [s.start, s.end])
        .collect();
    let (cluster_of, reps) = snap_endpoints(&endpoints, config.snap_tolerance);

    // Step 3: build the planar graph, deduplicating coincident segments
    let mut edges: Vec<Edge> = Vec::new();
    let mut edge_index: FxHashMap<(usize, usize), usize> = FxHashMap::default();

    for (k, (source, _)) in valid.iter().enumerate() {
        let a = cluster_of[2 * k];
        let b = cluster_of[2 * k + 1];
        if a == b {
            stats.collapsed += 1;
            continue;
        }
        let key = (a.min(b), a.max(b));
        match edge_index.get(&key) {
            Some(&e) => edges[e].sources.push(*source),
            None => {
                edge_index.insert(key, edges.len());
                edges.push(Edge {
                    a: key.0,
                    b: key.1,
                    sources: SmallVec::from_slice(&[*source]),
                });
            }
        }
    }

    // Step 4: extract bounded faces as closed wall outlines
    let faces = extract_faces(&edges, &reps);
    let mut in_loop = vec![false; edges.len()];
    let mut candidates = Vec::new();

    for face in &faces {
        for &e in &face.edges {
            in_loop[e] = true;
        }
        if face.area < config.min_area {
            stats.dropped_degenerate += 1;
            continue;
        }
        let polygon: Vec<Point2D> = face.nodes.iter().map(|&n| reps[n]).collect();
        let sources = collect_sources(face.edges.iter().map(|&e| &edges[e]));
        candidates.push(build_candidate(polygon, face.area, sources, segments));
        stats.loops += 1;
    }

    // Step 5: pair leftover parallel segments into thin rectangles
    let pool: Vec<usize> = (0..edges.len()).filter(|&e| !in_loop[e]).collect();
    let mut used = vec![false; edges.len()];

    for (i, &e1) in pool.iter().enumerate() {
        if used[e1] {
            continue;
        }
        let best = pool[i + 1..]
            .iter()
            .filter(|&&e2| !used[e2])
            .filter_map(|&e2| {
                pair_separation(&edges[e1], &edges[e2], &reps, config).map(|sep| (e2, sep))
            })
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        if let Some((e2, _)) = best {
            used[e1] = true;
            used[e2] = true;

            let polygon = pair_rectangle(&edges[e1], &edges[e2], &reps);
            let area = WallCandidate::signed_area(&polygon).abs();
            if area < config.min_area {
                stats.dropped_degenerate += 1;
                continue;
            }
            let sources = collect_sources([&edges[e1], &edges[e2]].into_iter());
            candidates.push(build_candidate(polygon, area, sources, segments));
            stats.paired += 1;
        }
    }

    stats.unpaired = pool.iter().filter(|&&e| !used[e]).count();
    stats.candidates = candidates.len();

    tracing::debug!(
        input = stats.input,
        malformed = stats.malformed,
        collapsed = stats.collapsed,
        loops = stats.loops,
        paired = stats.paired,
        dropped = stats.dropped_degenerate,
        unpaired = stats.unpaired,
        "segment merge finished"
    );

    MergeOutcome { candidates, stats }
}

/// Deduplicated boundary edge between two snapped nodes
struct Edge {
    a: usize,
    b: usize,
    /// Input indices of every segment that mapped onto this edge
    sources: SmallVec<[usize; 2]>,
}

/// A bounded face of the planar graph
struct Face {
    nodes: Vec<usize>,
    edges: Vec<usize>,
    area: f64,
}

/// Group endpoints within `tolerance` into clusters.
///
/// Returns the cluster id for each input point and the representative point
/// (member centroid) for each cluster. Buckets points into a grid with
/// tolerance-sized cells so only the 3x3 neighborhood needs a distance
/// check per point.
fn snap_endpoints(points: &[Point2D], tolerance: f64) -> (Vec<usize>, Vec<Point2D>) {
    let cell = if tolerance > 0.0 { tolerance } else { 1.0 };
    let mut uf = UnionFind::new(points.len());
    let mut grid: FxHashMap<(i64, i64), Vec<usize>> = FxHashMap::default();

    for (i, p) in points.iter().enumerate() {
        let cx = (p.x / cell).floor() as i64;
        let cy = (p.y / cell).floor() as i64;
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(bucket) = grid.get(&(cx + dx, cy + dy)) {
                    for &j in bucket {
                        if p.distance_to(&points[j]) <= tolerance {
                            uf.union(i, j);
                        }
                    }
                }
            }
        }
        grid.entry((cx, cy)).or_default().push(i);
    }

    // Compact cluster ids in first-appearance order, representatives as
    // member centroids
    let mut cluster_of = vec![0usize; points.len()];
    let mut cluster_id: FxHashMap<usize, usize> = FxHashMap::default();
    let mut sums: Vec<(f64, f64, usize)> = Vec::new();

    for i in 0..points.len() {
        let root = uf.find(i);
        let id = *cluster_id.entry(root).or_insert_with(|| {
            sums.push((0.0, 0.0, 0));
            sums.len() - 1
        });
        cluster_of[i] = id;
        sums[id].0 += points[i].x;
        sums[id].1 += points[i].y;
        sums[id].2 += 1;
    }

    let reps = sums
        .iter()
        .map(|&(sx, sy, n)| Point2D::new(sx / n as f64, sy / n as f64))
        .collect();
    (cluster_of, reps)
}

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            // Attach the higher root under the lower so representatives are
            // independent of union order
            let (lo, hi) = (ra.min(rb), ra.max(rb));
            self.parent[hi] = lo;
        }
    }
}

/// Extract bounded (counter-clockwise, positive-area) faces of the planar
/// graph by angle-ordered half-edge walking.
///
/// Half-edge `2e` runs `a -> b`, `2e + 1` runs `b -> a`. At each node the
/// walk leaves along the clockwise-next edge after the arrival direction,
/// which traces every face exactly once; the unbounded outer face comes out
/// clockwise (negative area) and is discarded, as are zero-area retrace
/// walks along dangling paths. Dangling spurs inside a loop appear as
/// out-and-back spikes in the walk and are pruned so face polygons stay
/// simple.
fn extract_faces(edges: &[Edge], reps: &[Point2D]) -> Vec<Face> {
    let mut adjacency: Vec<Vec<(usize, usize)>> = vec![Vec::new(); reps.len()];
    let mut edge_between: FxHashMap<(usize, usize), usize> = FxHashMap::default();
    for (e, edge) in edges.iter().enumerate() {
        adjacency[edge.a].push((edge.b, e));
        adjacency[edge.b].push((edge.a, e));
        edge_between.insert((edge.a, edge.b), e);
    }
    for (v, adj) in adjacency.iter_mut().enumerate() {
        adj.sort_by(|&(n1, _), &(n2, _)| {
            let a1 = (reps[n1].y - reps[v].y).atan2(reps[n1].x - reps[v].x);
            let a2 = (reps[n2].y - reps[v].y).atan2(reps[n2].x - reps[v].x);
            a1.partial_cmp(&a2).unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    let he_count = edges.len() * 2;
    let he_source = |he: usize| {
        if he % 2 == 0 {
            edges[he / 2].a
        } else {
            edges[he / 2].b
        }
    };
    let he_target = |he: usize| {
        if he % 2 == 0 {
            edges[he / 2].b
        } else {
            edges[he / 2].a
        }
    };

    let mut visited = vec![false; he_count];
    let mut faces = Vec::new();

    for start in 0..he_count {
        if visited[start] {
            continue;
        }

        let mut nodes = Vec::new();
        let mut current = start;

        // A face walk can visit each half-edge at most once
        for _ in 0..he_count {
            visited[current] = true;
            nodes.push(he_source(current));

            let v = he_target(current);
            let from = he_source(current);
            let adj = &adjacency[v];
            let pos = adj
                .iter()
                .position(|&(n, e)| e == current / 2 && n == from)
                .unwrap_or(0);
            let (next_node, next_edge) = adj[(pos + adj.len() - 1) % adj.len()];
            current = 2 * next_edge + usize::from(edges[next_edge].a != v);
            debug_assert_eq!(he_source(current), v);
            debug_assert_eq!(he_target(current), next_node);

            if current == start {
                break;
            }
        }

        let nodes = prune_spikes(nodes);
        if nodes.len() < 3 {
            continue;
        }

        let points: Vec<Point2D> = nodes.iter().map(|&n| reps[n]).collect();
        let area = WallCandidate::signed_area(&points);
        if area > 0.0 {
            let mut face_edges: Vec<usize> = (0..nodes.len())
                .filter_map(|i| {
                    let a = nodes[i];
                    let b = nodes[(i + 1) % nodes.len()];
                    edge_between.get(&(a.min(b), a.max(b))).copied()
                })
                .collect();
            face_edges.sort_unstable();
            face_edges.dedup();
            faces.push(Face {
                nodes,
                edges: face_edges,
                area,
            });
        }
    }

    faces
}

/// Remove out-and-back spikes (`... a, b, a ...`) left by dangling spurs
/// walked out and back inside a face
fn prune_spikes(mut nodes: Vec<usize>) -> Vec<usize> {
    loop {
        let n = nodes.len();
        if n < 3 {
            return nodes;
        }
        let spike = (0..n).find(|&i| nodes[(i + n - 1) % n] == nodes[(i + 1) % n]);
        match spike {
            Some(i) => {
                let j = (i + 1) % n;
                // Drop the tip and the duplicated return vertex
                if j > i {
                    nodes.remove(j);
                    nodes.remove(i);
                } else {
                    nodes.remove(i);
                    nodes.remove(j);
                }
            }
            None => return nodes,
        }
    }
}

/// Separation between two pool edges if they qualify as a double-line pair
fn pair_separation(
    e1: &Edge,
    e2: &Edge,
    reps: &[Point2D],
    config: &MergeConfig,
) -> Option<f64> {
    let (a1, b1) = (reps[e1.a], reps[e1.b]);
    let (a2, b2) = (reps[e2.a], reps[e2.b]);

    let ang1 = (b1.y - a1.y).atan2(b1.x - a1.x);
    let ang2 = (b2.y - a2.y).atan2(b2.x - a2.x);
    if angle_difference(ang1, ang2) > config.pair_angle_tolerance {
        return None;
    }

    let mid2 = Point2D::new((a2.x + b2.x) / 2.0, (a2.y + b2.y) / 2.0);
    let separation = point_to_segment_distance(&mid2, &a1, &b1);
    // Closer than the snap tolerance means a duplicate trace, not the two
    // faces of a wall
    if separation <= config.snap_tolerance || separation > config.max_pair_separation {
        return None;
    }

    let dir = unit_direction(&a1, &b1);
    let r1 = (0.0, project_onto(&b1, &a1, &dir));
    let r2 = (project_onto(&a2, &a1, &dir), project_onto(&b2, &a1, &dir));
    if overlap_ratio(r1, r2) < config.min_pair_overlap {
        return None;
    }

    Some(separation)
}

/// Rectangle spanning the combined extent of a parallel pair
fn pair_rectangle(e1: &Edge, e2: &Edge, reps: &[Point2D]) -> Vec<Point2D> {
    let (a1, b1) = (reps[e1.a], reps[e1.b]);
    let (a2, b2) = (reps[e2.a], reps[e2.b]);

    let dir = unit_direction(&a1, &b1);
    let normal = Vector2::new(-dir.y, dir.x);

    let ts = [
        0.0,
        project_onto(&b1, &a1, &dir),
        project_onto(&a2, &a1, &dir),
        project_onto(&b2, &a1, &dir),
    ];
    let t_min = ts.iter().cloned().fold(f64::MAX, f64::min);
    let t_max = ts.iter().cloned().fold(f64::MIN, f64::max);

    let c1 = (project_onto(&a1, &a1, &normal) + project_onto(&b1, &a1, &normal)) / 2.0;
    let c2 = (project_onto(&a2, &a1, &normal) + project_onto(&b2, &a1, &normal)) / 2.0;

    let corner = |t: f64, c: f64| {
        Point2D::new(a1.x + t * dir.x + c * normal.x, a1.y + t * dir.y + c * normal.y)
    };

    let mut polygon = vec![
        corner(t_min, c1),
        corner(t_max, c1),
        corner(t_max, c2),
        corner(t_min, c2),
    ];
    if WallCandidate::signed_area(&polygon) < 0.0 {
        polygon.reverse();
    }
    polygon
}

/// Union of contributing segment indices, ascending
fn collect_sources<'a>(edges: impl Iterator<Item = &'a Edge>) -> Vec<usize> {
    let mut sources: Vec<usize> = edges.flat_map(|e| e.sources.iter().copied()).collect();
    sources.sort_unstable();
    sources.dedup();
    sources
}

/// Assemble a candidate: thickness from area over half-perimeter, layer and
/// label carried over from the lowest-index contributing segment that has one
fn build_candidate(
    polygon: Vec<Point2D>,
    area: f64,
    sources: Vec<usize>,
    segments: &[RawSegment],
) -> WallCandidate {
    let layer = sources
        .iter()
        .find_map(|&i| segments[i].layer.clone());
    let label = sources
        .iter()
        .find_map(|&i| segments[i].label.clone());

    let mut candidate = WallCandidate {
        polygon,
        thickness: 0.0,
        source_ids: sources,
        layer,
        label,
    };
    let perimeter = candidate.perimeter();
    candidate.thickness = if perimeter > 0.0 {
        area / (perimeter / 2.0)
    } else {
        0.0
    };
    candidate
}
