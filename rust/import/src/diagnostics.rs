// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Import diagnostics
//!
//! Everything that goes wrong with the content of a file (as opposed to the
//! registry itself) ends up here instead of in an `Err`. The import keeps
//! going; the affected entity or projection is simply absent.

use ifc_topo_core::{IfcAnyHandle, IfcType};
use std::cell::RefCell;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Warning,
    Error,
}

/// What went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// A required reference was `$` or pointed at step id 0
    NullReference,
    /// The record's type is not one the resolver handles for the requested base
    UnhandledSubtype,
    /// A reference points at a step id with no record
    MissingRecord,
    /// The record text does not parse
    MalformedRecord,
    /// An attribute is missing or has the wrong shape
    InvalidAttribute,
    /// Geometry could not be derived from otherwise valid data
    DegenerateGeometry,
    /// The record references itself through its own resolution
    CyclicReference,
}

/// One reported problem
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub step_id: Option<u32>,
    pub entity_type: Option<IfcType>,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, kind, message)
    }

    pub fn error(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, kind, message)
    }

    fn new(severity: Severity, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity,
            kind,
            step_id: None,
            entity_type: None,
            message: message.into(),
        }
    }

    /// Attach the offending record
    pub fn at(mut self, step_id: u32, entity_type: IfcType) -> Self {
        self.step_id = Some(step_id);
        self.entity_type = Some(entity_type);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.step_id, self.entity_type) {
            (Some(id), Some(ty)) => write!(f, "#{}={}: {}", id, ty, self.message),
            (Some(id), None) => write!(f, "#{}: {}", id, self.message),
            _ => f.write_str(&self.message),
        }
    }
}

/// Receiver of import diagnostics
///
/// Implementors only provide [`record`](DiagnosticsSink::record); the
/// `log_*` helpers build the message.
pub trait DiagnosticsSink {
    fn record(&self, diagnostic: Diagnostic);

    /// A required reference of type `expected_type` was null
    fn log_null_reference(&self, expected_type: IfcType) {
        self.record(Diagnostic::error(
            DiagnosticKind::NullReference,
            format!("missing required reference to {}", expected_type),
        ));
    }

    /// `handle` is not a subtype the resolver for `expected_base` handles.
    /// With `allow_generic_fallback` the caller goes on treating the record as
    /// `expected_base` and the report is a warning.
    fn log_unhandled_subtype(
        &self,
        handle: &IfcAnyHandle,
        expected_base: IfcType,
        allow_generic_fallback: bool,
    ) {
        let type_name = handle.type_name().unwrap_or("<null>");
        let diagnostic = if allow_generic_fallback {
            Diagnostic::warning(
                DiagnosticKind::UnhandledSubtype,
                format!(
                    "unhandled subtype {} of {}, processing as {}",
                    type_name, expected_base, expected_base
                ),
            )
        } else {
            Diagnostic::error(
                DiagnosticKind::UnhandledSubtype,
                format!("unhandled subtype {} of {}, ignored", type_name, expected_base),
            )
        };
        let diagnostic = match (handle.step_id(), handle.declared_type()) {
            (Some(id), Some(ty)) => diagnostic.at(id, ty),
            _ => diagnostic,
        };
        self.record(diagnostic);
    }

    fn log_error(&self, step_id: u32, entity_type: IfcType, kind: DiagnosticKind, message: &str) {
        self.record(Diagnostic::error(kind, message).at(step_id, entity_type));
    }

    fn log_warning(&self, step_id: u32, entity_type: IfcType, kind: DiagnosticKind, message: &str) {
        self.record(Diagnostic::warning(kind, message).at(step_id, entity_type));
    }
}

/// In-memory diagnostics log for one import session
///
/// Keeps every diagnostic in order and, unless disabled, mirrors each one as
/// a tracing event.
#[derive(Debug, Default)]
pub struct ImportLog {
    entries: RefCell<Vec<Diagnostic>>,
    silent: bool,
}

impl ImportLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log that only records, without emitting tracing events
    pub fn silent() -> Self {
        Self {
            entries: RefCell::default(),
            silent: true,
        }
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.entries.borrow().iter().filter(|d| d.is_error()).count()
    }

    pub fn count_kind(&self, kind: DiagnosticKind) -> usize {
        self.entries.borrow().iter().filter(|d| d.kind == kind).count()
    }

    /// Diagnostics attached to one record
    pub fn for_step_id(&self, step_id: u32) -> Vec<Diagnostic> {
        self.entries
            .borrow()
            .iter()
            .filter(|d| d.step_id == Some(step_id))
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl DiagnosticsSink for ImportLog {
    fn record(&self, diagnostic: Diagnostic) {
        if !self.silent {
            let entity_type = diagnostic.entity_type.map(|t| t.as_str());
            match diagnostic.severity {
                Severity::Warning => tracing::warn!(
                    step_id = ?diagnostic.step_id,
                    entity_type = ?entity_type,
                    kind = ?diagnostic.kind,
                    "{}",
                    diagnostic.message
                ),
                Severity::Error => tracing::error!(
                    step_id = ?diagnostic.step_id,
                    entity_type = ?entity_type,
                    kind = ?diagnostic.kind,
                    "{}",
                    diagnostic.message
                ),
            }
        }
        self.entries.borrow_mut().push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_topo_core::DecodedEntity;
    use std::sync::Arc;

    #[test]
    fn test_null_reference() {
        let log = ImportLog::silent();
        log.log_null_reference(IfcType::IfcLoop);

        let entries = log.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, DiagnosticKind::NullReference);
        assert!(entries[0].is_error());
        assert!(entries[0].message.contains("IFCLOOP"));
        assert_eq!(entries[0].step_id, None);
    }

    #[test]
    fn test_unhandled_subtype_names_record_and_base() {
        let log = ImportLog::silent();
        let handle = IfcAnyHandle::new(Arc::new(DecodedEntity::new(
            9,
            "IFCVERTEXLOOP",
            vec![],
        )));

        log.log_unhandled_subtype(&handle, IfcType::IfcLoop, false);
        log.log_unhandled_subtype(&handle, IfcType::IfcLoop, true);

        let entries = log.for_step_id(9);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].entity_type, Some(IfcType::IfcVertexLoop));
        assert!(entries[0].message.contains("IFCVERTEXLOOP"));
        assert!(entries[0].message.contains("IFCLOOP"));
        assert_eq!(entries[0].severity, Severity::Error);
        assert_eq!(entries[1].severity, Severity::Warning);
        assert_eq!(log.error_count(), 1);
    }

    #[test]
    fn test_display() {
        let d = Diagnostic::warning(DiagnosticKind::DegenerateGeometry, "too few distinct vertices")
            .at(42, IfcType::IfcPolyLoop);
        assert_eq!(d.to_string(), "#42=IFCPOLYLOOP: too few distinct vertices");
    }

    #[test]
    fn test_clear() {
        let log = ImportLog::silent();
        log.log_warning(1, IfcType::IfcEdge, DiagnosticKind::InvalidAttribute, "bad");
        assert_eq!(log.count_kind(DiagnosticKind::InvalidAttribute), 1);
        log.clear();
        assert!(log.is_empty());
    }
}
