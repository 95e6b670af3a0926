// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during geometry processing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Triangulation failed: {0}")]
    TriangulationError(String),

    /// Segment `next` does not start where segment `prev` ends.
    #[error("curve loop segments are not connected: segment {prev} end does not match segment {next} start")]
    DisconnectedLoop { prev: usize, next: usize },

    /// The last segment does not return to the first segment's start.
    #[error("curve loop is not closed: gap of {0}")]
    OpenLoop(f64),

    #[error("curve loop has no segments")]
    EmptyLoop,

    #[error("degenerate segment: {0}")]
    DegenerateSegment(String),
}
