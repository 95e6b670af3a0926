// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC-Topo Core
//!
//! STEP/IFC record decoding built with [nom](https://docs.rs/nom).
//!
//! ## Overview
//!
//! - **Entity index**: SIMD-accelerated record discovery using [memchr](https://docs.rs/memchr)
//! - **Lazy decoding**: records are tokenized on first request and shared through `Arc`
//! - **Handles**: [`IfcAnyHandle`] wraps a decoded record (or nothing) with its type tag
//! - **Schema versions**: FILE_SCHEMA detection and the [`SchemaVersionOracle`] used for
//!   version-gated subtype dispatch
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ifc_topo_core::{EntityDecoder, IfcType};
//!
//! let content = "#1=IFCCARTESIANPOINT((0.,0.,0.));\n#2=IFCPOLYLOOP((#1));";
//! let mut decoder = EntityDecoder::new(content);
//!
//! let handle = decoder.handle(2)?;
//! assert!(handle.is_subtype_of(IfcType::IfcLoop));
//! ```

pub mod attribute;
pub mod decoder;
pub mod error;
pub mod handle;
pub mod header;
pub mod parser;
pub mod schema;

pub use attribute::{AttributeValue, DecodedEntity};
pub use decoder::{build_entity_index, EntityDecoder, EntityIndex};
pub use error::{Error, Result};
pub use handle::IfcAnyHandle;
pub use header::{detect_schema_version, parse_file_schema};
pub use parser::{parse_entity, Token};
pub use schema::{IfcSchemaVersion, IfcType, SchemaVersionOracle};
