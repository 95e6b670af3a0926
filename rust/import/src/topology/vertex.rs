// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IfcVertex and IfcVertexPoint

use crate::diagnostics::{DiagnosticKind, DiagnosticsSink};
use crate::entity::IfcEntity;
use crate::error::Result;
use crate::file::ImportFile;
use ifc_topo_core::{IfcAnyHandle, IfcType, SchemaVersionOracle};
use nalgebra::Point3;
use std::rc::Rc;

/// A topological vertex, with its point when the file gives one
#[derive(Debug, Clone, PartialEq)]
pub struct IfcVertex {
    step_id: u32,
    entity_type: IfcType,
    point: Option<Point3<f64>>,
}

impl IfcVertex {
    pub(crate) fn new(step_id: u32, entity_type: IfcType, point: Option<Point3<f64>>) -> Self {
        Self {
            step_id,
            entity_type,
            point,
        }
    }

    pub fn step_id(&self) -> u32 {
        self.step_id
    }

    pub fn entity_type(&self) -> IfcType {
        self.entity_type
    }

    /// Position in output units; `None` for a bare IfcVertex or an
    /// unsupported point type
    pub fn point(&self) -> Option<Point3<f64>> {
        self.point
    }

    /// Resolve a vertex handle
    pub fn process(file: &mut ImportFile<'_>, handle: &IfcAnyHandle) -> Result<Option<Rc<Self>>> {
        file.resolve_with(handle, IfcType::IfcVertex, IfcEntity::as_vertex, |file, handle| {
            let version = file.schema_version();
            let (Some(step_id), Some(entity_type)) = (handle.step_id(), handle.declared_type())
            else {
                return Ok(None);
            };

            let point = if handle.is_valid_subtype_of(IfcType::IfcVertexPoint, version) {
                // VertexGeometry
                let geometry = match handle.attribute(0).and_then(|a| a.as_entity_ref()) {
                    Some(id) => id,
                    None => {
                        file.log().log_error(
                            step_id,
                            entity_type,
                            DiagnosticKind::InvalidAttribute,
                            "VertexGeometry is missing",
                        );
                        return Ok(None);
                    }
                };
                let point = file.cartesian_point(geometry);
                if point.is_none() {
                    file.log().log_warning(
                        step_id,
                        entity_type,
                        DiagnosticKind::InvalidAttribute,
                        &format!("VertexGeometry #{} is not a cartesian point", geometry),
                    );
                }
                point
            } else if handle.is_valid_subtype_of(IfcType::IfcVertex, version) {
                None
            } else {
                file.log().log_unhandled_subtype(handle, IfcType::IfcVertex, false);
                return Ok(None);
            };

            let vertex = Rc::new(IfcVertex::new(step_id, entity_type, point));
            file.register(IfcEntity::Vertex(Rc::clone(&vertex)))?;
            Ok(Some(vertex))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ImportOptions;

    const CONTENT: &str = "HEADER;FILE_SCHEMA(('IFC4'));ENDSEC;
DATA;
#1=IFCCARTESIANPOINT((1.,2.,3.));
#2=IFCVERTEXPOINT(#1);
#3=IFCVERTEX();
#4=IFCVERTEXPOINT($);
#5=IFCDIRECTION((1.,0.,0.));
#6=IFCVERTEXPOINT(#5);
";

    fn session() -> ImportFile<'static> {
        ImportFile::new(CONTENT, ImportOptions::default().with_trace_diagnostics(false)).unwrap()
    }

    #[test]
    fn test_vertex_point_shared() {
        let mut file = session();
        let handle = file.handle(2);
        let a = IfcVertex::process(&mut file, &handle).unwrap().unwrap();
        let b = IfcVertex::process(&mut file, &handle).unwrap().unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(a.point(), Some(Point3::new(1.0, 2.0, 3.0)));
        assert_eq!(file.registry().len(), 1);
    }

    #[test]
    fn test_bare_vertex_has_no_point() {
        let mut file = session();
        let handle = file.handle(3);
        let vertex = IfcVertex::process(&mut file, &handle).unwrap().unwrap();
        assert_eq!(vertex.point(), None);
        assert!(file.log().is_empty());
    }

    #[test]
    fn test_missing_geometry_fails_once() {
        let mut file = session();
        let handle = file.handle(4);
        assert!(IfcVertex::process(&mut file, &handle).unwrap().is_none());
        assert!(IfcVertex::process(&mut file, &handle).unwrap().is_none());
        assert_eq!(file.log().count_kind(DiagnosticKind::InvalidAttribute), 1);
        assert!(!file.registry().contains(4));
    }

    #[test]
    fn test_unsupported_geometry_is_a_warning() {
        let mut file = session();
        let handle = file.handle(6);
        let vertex = IfcVertex::process(&mut file, &handle).unwrap().unwrap();
        assert_eq!(vertex.point(), None);
        assert_eq!(file.log().len(), 1);
        assert_eq!(file.log().error_count(), 0);
    }
}
