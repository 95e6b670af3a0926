// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for entity resolution.
//!
//! Recoverable problems in the file never show up here; they are recorded
//! as diagnostics and resolution yields `None`. These variants are broken
//! registry invariants and header failures.

use ifc_topo_core::IfcType;

/// Result type alias for import operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A second entity was registered under an existing step id.
    #[error("entity #{0} is already registered")]
    DuplicateStepId(u32),

    /// An entity was registered under a step id other than its own.
    #[error("entity #{entity} cannot be registered under step id #{key}")]
    StepIdMismatch { key: u32, entity: u32 },

    /// The registry holds a different entity family for a step id whose
    /// record belongs to the requested family.
    #[error("registry holds {found} for #{step_id}, expected {expected}")]
    RegistryTypeMismatch {
        step_id: u32,
        expected: IfcType,
        found: IfcType,
    },

    #[error("core error: {0}")]
    Core(#[from] ifc_topo_core::Error),
}
