// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC-Topo Import
//!
//! Resolves topological loop records of an IFC file into shared, typed
//! entities. Each step id is built at most once per [`ImportFile`]; loops
//! derive their vertex list or curve boundary lazily and hand them to a
//! [`ShapeEditScope`](ifc_topo_geometry::ShapeEditScope) on request.
//!
//! Problems in the file never abort an import. They are recorded in the
//! session's [`ImportLog`] and the affected entity resolves to `None`.
//!
//! ```no_run
//! use ifc_topo_import::{ImportFile, ImportOptions};
//!
//! # fn main() -> ifc_topo_import::Result<()> {
//! let content = std::fs::read_to_string("model.ifc").unwrap_or_default();
//! let mut file = ImportFile::new(&content, ImportOptions::default())?;
//! for ifc_loop in file.resolve_all_loops()? {
//!     if let Some(vertices) = ifc_loop.vertices() {
//!         println!("#{}: {} vertices", ifc_loop.step_id(), vertices.len());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod diagnostics;
pub mod entity;
pub mod error;
pub mod file;
pub mod options;
pub mod registry;
pub mod topology;

pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticsSink, ImportLog, Severity};
pub use entity::IfcEntity;
pub use error::{Error, Result};
pub use file::ImportFile;
pub use options::ImportOptions;
pub use registry::EntityRegistry;
pub use topology::{
    EdgeGeometry, EdgeKind, IfcEdge, IfcEdgeLoop, IfcLoop, IfcPolyLoop, IfcVertex, LoopKind,
};

pub use ifc_topo_core::{IfcAnyHandle, IfcSchemaVersion, IfcType, SchemaVersionOracle};
