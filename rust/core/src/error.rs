// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for data-model construction
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration-class errors raised while building data-model inputs.
///
/// These abort a run before any classification happens; geometry-level
/// problems are never errors and are reported as counts instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("legend code {0:?} is defined twice with conflicting rules")]
    ConflictingLegendCode(String),

    #[error("legend rule has an empty code")]
    EmptyLegendCode,

    #[error("legend code {code:?} has an empty thickness interval ({min} > {max})")]
    InvalidThicknessRange { code: String, min: f64, max: f64 },
}
