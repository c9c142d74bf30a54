// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Attach nearby text annotations to wall candidates
//!
//! Attachment is the caller's responsibility in the pipeline contract; this
//! helper covers the common case between merge and classify. Each annotation
//! is consumed by at most one candidate, candidates are visited in order,
//! and a candidate that already carries a label is left alone.

use crate::segment_ops::{point_in_polygon, point_to_polygon_distance};
use planwall_core::{TextAnnotation, WallCandidate};

/// Assign each unlabeled candidate the first annotation inside its polygon
/// or within `max_distance` of its boundary. Returns how many annotations
/// were attached.
pub fn attach_labels(
    candidates: &mut [WallCandidate],
    texts: &[TextAnnotation],
    max_distance: f64,
) -> usize {
    let mut used = vec![false; texts.len()];
    let mut attached = 0;

    for candidate in candidates.iter_mut() {
        if candidate.label.is_some() {
            continue;
        }
        for (i, text) in texts.iter().enumerate() {
            if used[i] {
                continue;
            }
            let inside = point_in_polygon(&text.position, &candidate.polygon);
            if inside
                || point_to_polygon_distance(&text.position, &candidate.polygon) <= max_distance
            {
                candidate.label = Some(text.text.clone());
                used[i] = true;
                attached += 1;
                break;
            }
        }
    }

    attached
}
