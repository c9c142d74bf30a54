// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for detection operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a classification run.
///
/// All variants are configuration-class: they are raised before any
/// candidate is classified. Per-segment geometry problems never surface
/// here; the merge pass drops and counts them instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("layer rule {index} is malformed: {reason}")]
    MalformedLayerRule { index: usize, reason: String },

    #[error(transparent)]
    Legend(#[from] planwall_core::Error),
}
