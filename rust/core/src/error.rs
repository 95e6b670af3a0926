// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for STEP decoding.

use thiserror::Error;

/// Result type alias for decoding operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while reading records out of a STEP file.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A record could not be tokenized.
    #[error("parse error at #{step_id}: {message}")]
    Parse { step_id: u32, message: String },

    /// A reference points at a step id with no record in the file.
    #[error("entity #{0} not found")]
    EntityNotFound(u32),

    /// The HEADER section carries no usable FILE_SCHEMA.
    #[error("invalid file header: {0}")]
    InvalidHeader(String),

    /// FILE_SCHEMA names a schema this crate does not know.
    #[error("unsupported schema: {0}")]
    UnsupportedSchema(String),
}

impl Error {
    /// Shorthand for a tokenizer failure on one record.
    pub fn parse(step_id: u32, message: impl Into<String>) -> Self {
        Error::Parse {
            step_id,
            message: message.into(),
        }
    }
}
