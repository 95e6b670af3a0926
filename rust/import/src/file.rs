// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Import session
//!
//! An [`ImportFile`] owns everything one file needs while its entities are
//! resolved: the lazy decoder, the schema version, the entity registry and
//! the diagnostics log. Sessions are single-threaded and share nothing.

use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticsSink, ImportLog};
use crate::entity::IfcEntity;
use crate::error::{Error, Result};
use crate::options::ImportOptions;
use crate::registry::EntityRegistry;
use crate::topology::IfcLoop;
use ifc_topo_core::{
    detect_schema_version, AttributeValue, EntityDecoder, IfcAnyHandle, IfcSchemaVersion,
    IfcType, SchemaVersionOracle,
};
use nalgebra::Point3;
use rustc_hash::FxHashSet;
use std::rc::Rc;

pub struct ImportFile<'a> {
    decoder: EntityDecoder<'a>,
    schema_version: IfcSchemaVersion,
    options: ImportOptions,
    registry: EntityRegistry,
    log: Rc<ImportLog>,
    /// Step ids whose resolution is on the stack
    in_progress: FxHashSet<u32>,
    /// (step id, family) pairs that already failed and were reported
    failed: FxHashSet<(u32, IfcType)>,
    /// Step ids already reported as missing or unparsable
    unreadable: FxHashSet<u32>,
}

impl<'a> ImportFile<'a> {
    /// Open a session over STEP content
    ///
    /// The schema comes from `FILE_SCHEMA` unless `options.schema_override`
    /// is set.
    pub fn new(content: &'a str, options: ImportOptions) -> Result<Self> {
        let log = if options.trace_diagnostics {
            ImportLog::new()
        } else {
            ImportLog::silent()
        };
        Self::with_log(content, options, Rc::new(log))
    }

    /// Open a session that reports into an existing log
    pub fn with_log(content: &'a str, options: ImportOptions, log: Rc<ImportLog>) -> Result<Self> {
        let schema_version = match options.schema_override {
            Some(version) => version,
            None => detect_schema_version(content)?,
        };

        let mut decoder = EntityDecoder::new(content);
        tracing::debug!(
            schema = %schema_version,
            entities = decoder.entity_count(),
            "Opened import file"
        );

        Ok(Self {
            decoder,
            schema_version,
            options,
            registry: EntityRegistry::new(),
            log,
            in_progress: FxHashSet::default(),
            failed: FxHashSet::default(),
            unreadable: FxHashSet::default(),
        })
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn log(&self) -> &Rc<ImportLog> {
        &self.log
    }

    /// Shared sink handed to entities that report from lazy computations
    pub(crate) fn sink(&self) -> Rc<dyn DiagnosticsSink> {
        self.log.clone()
    }

    pub fn decoder(&mut self) -> &mut EntityDecoder<'a> {
        &mut self.decoder
    }

    /// Handle for a step id
    ///
    /// Missing and unparsable records give a null handle and are reported
    /// once per step id.
    pub fn handle(&mut self, step_id: u32) -> IfcAnyHandle {
        let result = self.decoder.handle(step_id);
        if result.is_err() && !self.unreadable.insert(step_id) {
            return IfcAnyHandle::null();
        }
        match result {
            Ok(handle) => handle,
            Err(ifc_topo_core::Error::EntityNotFound(id)) => {
                let mut diagnostic = Diagnostic::warning(
                    DiagnosticKind::MissingRecord,
                    format!("reference to missing record #{}", id),
                );
                diagnostic.step_id = Some(id);
                self.log.record(diagnostic);
                IfcAnyHandle::null()
            }
            Err(e) => {
                let mut diagnostic =
                    Diagnostic::error(DiagnosticKind::MalformedRecord, e.to_string());
                diagnostic.step_id = Some(step_id);
                self.log.record(diagnostic);
                IfcAnyHandle::null()
            }
        }
    }

    /// Handle for a reference attribute; anything other than `#n` is null
    pub fn handle_for(&mut self, attr: &AttributeValue) -> IfcAnyHandle {
        match attr.as_entity_ref() {
            Some(id) => self.handle(id),
            None => IfcAnyHandle::null(),
        }
    }

    /// Resolve a loop handle, constructing and registering it on first use
    pub fn resolve_loop(&mut self, handle: &IfcAnyHandle) -> Result<Option<Rc<IfcLoop>>> {
        IfcLoop::process(self, handle)
    }

    /// Resolve the loop at `step_id`
    ///
    /// A missing or unparsable record is reported by [`handle`](Self::handle)
    /// and gives `Ok(None)`.
    pub fn resolve_loop_by_id(&mut self, step_id: u32) -> Result<Option<Rc<IfcLoop>>> {
        let handle = self.handle(step_id);
        if handle.step_id().is_none() {
            return Ok(None);
        }
        self.resolve_loop(&handle)
    }

    /// Resolve every loop record in the file, in step id order
    ///
    /// Loops that fail are reported and skipped; only registry invariant
    /// violations stop the pass.
    pub fn resolve_all_loops(&mut self) -> Result<Vec<Rc<IfcLoop>>> {
        let mut loops = Vec::new();
        for step_id in self.decoder.entity_ids() {
            let handle = self.handle(step_id);
            if !handle.is_subtype_of(IfcType::IfcLoop) {
                continue;
            }
            if let Some(ifc_loop) = self.resolve_loop(&handle)? {
                loops.push(ifc_loop);
            }
        }
        tracing::debug!(
            loops = loops.len(),
            diagnostics = self.log.len(),
            "Resolved loops"
        );
        Ok(loops)
    }

    /// Coordinates of a cartesian point in output units
    pub(crate) fn cartesian_point(&mut self, step_id: u32) -> Option<Point3<f64>> {
        let (x, y, z) = match self.decoder.cartesian_point(step_id) {
            Some(coords) => coords,
            // Fast path only reads canonical records
            None => {
                let entity = self.decoder.decode_by_id(step_id).ok()?;
                if entity.ifc_type != IfcType::IfcCartesianPoint {
                    return None;
                }
                entity.get(0)?.as_coordinates()?
            }
        };
        let scale = self.options.length_scale;
        Some(Point3::new(x * scale, y * scale, z * scale))
    }

    /// Resolve the reference held in attribute `index` of `handle`
    ///
    /// A missing or null attribute gives `Ok(None)` without a diagnostic;
    /// the owner decides whether that is an error.
    pub(crate) fn resolve_attribute<T>(
        &mut self,
        handle: &IfcAnyHandle,
        index: usize,
        resolve: impl FnOnce(&mut Self, &IfcAnyHandle) -> Result<Option<Rc<T>>>,
    ) -> Result<Option<Rc<T>>> {
        let target = match handle.attribute(index) {
            Some(attr) => self.handle_for(attr),
            None => IfcAnyHandle::null(),
        };
        if target.is_null_or_empty() {
            return Ok(None);
        }
        resolve(self, &target)
    }

    pub(crate) fn register(&mut self, entity: IfcEntity) -> Result<()> {
        self.registry.register(entity.step_id(), entity)
    }

    /// Shared resolution steps for every entity family
    ///
    /// Null handles, cached entities, earlier failures and cycles are
    /// handled here; `construct` runs only for a record seen for the first
    /// time and is expected to register what it builds.
    pub(crate) fn resolve_with<T>(
        &mut self,
        handle: &IfcAnyHandle,
        family: IfcType,
        cast: fn(&IfcEntity) -> Option<&Rc<T>>,
        construct: impl FnOnce(&mut Self, &IfcAnyHandle) -> Result<Option<Rc<T>>>,
    ) -> Result<Option<Rc<T>>> {
        let (step_id, declared) = match (handle.step_id(), handle.declared_type()) {
            (Some(id), Some(ty)) if !handle.is_null_or_empty() => (id, ty),
            _ => {
                self.log.log_null_reference(family);
                return Ok(None);
            }
        };

        if let Some(entity) = self.registry.lookup(step_id) {
            if let Some(found) = cast(entity) {
                return Ok(Some(Rc::clone(found)));
            }
            if declared.is_subtype_of(family) {
                return Err(Error::RegistryTypeMismatch {
                    step_id,
                    expected: family,
                    found: entity.entity_type(),
                });
            }
            // Wrong family requested for a record resolved elsewhere
            self.log.log_unhandled_subtype(handle, family, false);
            return Ok(None);
        }

        if self.failed.contains(&(step_id, family)) {
            return Ok(None);
        }

        if !self.in_progress.insert(step_id) {
            self.log.log_error(
                step_id,
                declared,
                DiagnosticKind::CyclicReference,
                &format!("{} references itself", handle),
            );
            self.failed.insert((step_id, family));
            return Ok(None);
        }

        let result = construct(self, handle);
        self.in_progress.remove(&step_id);

        if matches!(result, Ok(None)) {
            self.failed.insert((step_id, family));
        }
        result
    }
}

impl SchemaVersionOracle for ImportFile<'_> {
    fn schema_version(&self) -> IfcSchemaVersion {
        self.schema_version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTENT: &str = r#"ISO-10303-21;
HEADER;
FILE_DESCRIPTION((''),'2;1');
FILE_SCHEMA(('IFC2X3'));
ENDSEC;
DATA;
#1=IFCCARTESIANPOINT((1.,2.,3.));
#2=IFCCARTESIANPOINT((4.,5.));
#3=IFCPOLYLOOP((#1,#2,#9));
#4=IFCDIRECTION((0.,0.,1.));
#5=IFCCARTESIANPOINT( ( 7. , 8. ) ) ;
ENDSEC;
END-ISO-10303-21;
"#;

    fn session(content: &str) -> ImportFile<'_> {
        ImportFile::new(content, ImportOptions::default().with_trace_diagnostics(false)).unwrap()
    }

    #[test]
    fn test_schema_from_header() {
        let file = session(CONTENT);
        assert_eq!(file.schema_version(), IfcSchemaVersion::Ifc2x3);
        assert!(file.schema_at_least(IfcSchemaVersion::Ifc2x2));
        assert!(!file.schema_at_least(IfcSchemaVersion::Ifc4));
    }

    #[test]
    fn test_schema_override() {
        let options = ImportOptions::default()
            .with_schema(IfcSchemaVersion::Ifc2x)
            .with_trace_diagnostics(false);
        let file = ImportFile::new("DATA;\n#1=IFCCARTESIANPOINT((0.,0.));\n", options).unwrap();
        assert_eq!(file.schema_version(), IfcSchemaVersion::Ifc2x);
    }

    #[test]
    fn test_missing_header_is_an_error() {
        let options = ImportOptions::default().with_trace_diagnostics(false);
        assert!(ImportFile::new("DATA;\n#1=IFCCARTESIANPOINT((0.,0.));\n", options).is_err());
    }

    #[test]
    fn test_dangling_reference_gives_null_handle() {
        let mut file = session(CONTENT);
        let handle = file.handle_for(&AttributeValue::EntityRef(9));
        assert!(handle.is_null_or_empty());
        assert_eq!(file.log().count_kind(DiagnosticKind::MissingRecord), 1);
        let entries = file.log().for_step_id(9);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, DiagnosticKind::MissingRecord);

        // Reported once per record
        assert!(file.handle(9).is_null_or_empty());
        let null = file.handle_for(&AttributeValue::Null);
        assert!(null.is_null_or_empty());
        assert_eq!(file.log().len(), 1);
    }

    #[test]
    fn test_cartesian_point_scaled() {
        let options = ImportOptions::default()
            .with_length_scale(0.5)
            .with_trace_diagnostics(false);
        let mut file = ImportFile::new(CONTENT, options).unwrap();
        assert_eq!(file.cartesian_point(1), Some(Point3::new(0.5, 1.0, 1.5)));
        assert_eq!(file.cartesian_point(2), Some(Point3::new(2.0, 2.5, 0.0)));
        assert_eq!(file.cartesian_point(5), Some(Point3::new(3.5, 4.0, 0.0)));
        assert_eq!(file.cartesian_point(4), None);
        assert_eq!(file.cartesian_point(9), None);
    }
}
