// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IfcLoop: the loop entity family and its dispatcher
//!
//! A loop record resolves to exactly one [`IfcLoop`], whatever its concrete
//! type. Derived geometry (vertex list, curve boundary) is computed on first
//! request and then frozen, including the "cannot be derived" outcome.

use super::edge_loop::IfcEdgeLoop;
use super::poly_loop::IfcPolyLoop;
use crate::diagnostics::{DiagnosticKind, DiagnosticsSink};
use crate::entity::IfcEntity;
use crate::error::Result;
use crate::file::ImportFile;
use ifc_topo_core::{IfcAnyHandle, IfcSchemaVersion, IfcType, SchemaVersionOracle};
use ifc_topo_geometry::transform::transform_points;
use ifc_topo_geometry::{CurveLoop, Matrix4, Point3, ShapeEditScope};
use once_cell::unsync::OnceCell;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Concrete loop variants
#[derive(Debug, Clone)]
pub enum LoopKind {
    Edge(IfcEdgeLoop),
    Poly(IfcPolyLoop),
}

pub struct IfcLoop {
    step_id: u32,
    entity_type: IfcType,
    kind: LoopKind,
    vertex_tolerance: f64,
    /// Empty until first request; `Some(None)` once found not derivable
    vertices: OnceCell<Option<Vec<Point3<f64>>>>,
    curve_boundary: OnceCell<Option<CurveLoop>>,
    /// Set once an open boundary after placement has been reported
    placement_warned: Cell<bool>,
    log: Rc<dyn DiagnosticsSink>,
}

impl IfcLoop {
    pub(crate) fn new(
        step_id: u32,
        entity_type: IfcType,
        kind: LoopKind,
        file: &ImportFile<'_>,
    ) -> Self {
        Self {
            step_id,
            entity_type,
            kind,
            vertex_tolerance: file.options().vertex_tolerance,
            vertices: OnceCell::new(),
            curve_boundary: OnceCell::new(),
            placement_warned: Cell::new(false),
            log: file.sink(),
        }
    }

    /// Resolve a loop handle
    ///
    /// Edge loops exist from IFC2x2 on; before that only poly loops are
    /// recognized. Any other loop type is reported once and yields `None`.
    pub fn process(file: &mut ImportFile<'_>, handle: &IfcAnyHandle) -> Result<Option<Rc<Self>>> {
        file.resolve_with(handle, IfcType::IfcLoop, IfcEntity::as_loop, |file, handle| {
            let version = file.schema_version();
            if file.schema_at_least(IfcSchemaVersion::Ifc2x2)
                && handle.is_subtype_of(IfcType::IfcEdgeLoop)
            {
                return IfcEdgeLoop::construct(file, handle);
            }
            if handle.is_valid_subtype_of(IfcType::IfcPolyLoop, version) {
                return IfcPolyLoop::construct(file, handle);
            }
            file.log().log_unhandled_subtype(handle, IfcType::IfcLoop, false);
            Ok(None)
        })
    }

    pub fn step_id(&self) -> u32 {
        self.step_id
    }

    pub fn entity_type(&self) -> IfcType {
        self.entity_type
    }

    pub fn kind(&self) -> &LoopKind {
        &self.kind
    }

    /// True for a poly loop without points or an edge loop without edges
    pub fn is_empty(&self) -> bool {
        match &self.kind {
            LoopKind::Poly(poly) => poly.is_empty(),
            LoopKind::Edge(edges) => edges.is_empty(),
        }
    }

    /// Distinct corner points of a poly loop
    ///
    /// Computed once. Edge loops have no vertex list of their own.
    pub fn vertices(&self) -> Option<&[Point3<f64>]> {
        self.vertices
            .get_or_init(|| self.generate_vertices())
            .as_deref()
    }

    /// Closed boundary of an edge loop, computed once
    pub fn as_curve_boundary(&self) -> Option<&CurveLoop> {
        self.curve_boundary
            .get_or_init(|| self.generate_curve_boundary())
            .as_ref()
    }

    /// True once [`vertices`](Self::vertices) has been evaluated
    pub fn vertices_computed(&self) -> bool {
        self.vertices.get().is_some()
    }

    pub fn curve_boundary_computed(&self) -> bool {
        self.curve_boundary.get().is_some()
    }

    fn generate_vertices(&self) -> Option<Vec<Point3<f64>>> {
        let LoopKind::Poly(poly) = &self.kind else {
            return None;
        };
        let vertices = poly.generate_vertices(self.vertex_tolerance);
        if vertices.is_none() {
            self.warn(DiagnosticKind::DegenerateGeometry, "too few distinct vertices");
        }
        vertices
    }

    fn generate_curve_boundary(&self) -> Option<CurveLoop> {
        let LoopKind::Edge(edge_loop) = &self.kind else {
            return None;
        };
        if edge_loop.is_empty() {
            return None;
        }
        match edge_loop.generate_loop(self.vertex_tolerance) {
            Ok(curve_loop) => Some(curve_loop),
            Err(e) => {
                self.warn(
                    DiagnosticKind::DegenerateGeometry,
                    &format!("edge loop is not closed: {}", e),
                );
                None
            }
        }
    }

    /// Hand this loop's geometry to a shape scope
    ///
    /// `lcs` places the loop in the owner's frame, `scaled_lcs` is the same
    /// frame with the output scale applied. The representation item is always
    /// added; geometry only when it can be derived.
    pub fn materialize_geometry(
        &self,
        scope: &mut dyn ShapeEditScope,
        lcs: &Matrix4<f64>,
        scaled_lcs: &Matrix4<f64>,
        owner_guid: &str,
    ) {
        scope.add_representation_item(owner_guid, self.step_id, self.entity_type);

        let result = match &self.kind {
            LoopKind::Poly(_) => match self.vertices() {
                Some(vertices) => scope.add_polygon_boundary(
                    owner_guid,
                    self.step_id,
                    &transform_points(scaled_lcs, vertices),
                ),
                None => Ok(()),
            },
            LoopKind::Edge(_) => match self.as_curve_boundary() {
                Some(curve_loop) if !curve_loop.transformed(lcs).is_closed(self.vertex_tolerance) => {
                    if !self.placement_warned.replace(true) {
                        self.warn(
                            DiagnosticKind::DegenerateGeometry,
                            "edge loop is not closed after placement",
                        );
                    }
                    Ok(())
                }
                Some(curve_loop) => scope.add_curve_loop(
                    owner_guid,
                    self.step_id,
                    curve_loop.transformed(scaled_lcs),
                ),
                None => Ok(()),
            },
        };

        if let Err(e) = result {
            self.warn(
                DiagnosticKind::DegenerateGeometry,
                &format!("could not create shape for {}: {}", owner_guid, e),
            );
        }
    }

    fn warn(&self, kind: DiagnosticKind, message: &str) {
        self.log
            .log_warning(self.step_id, self.entity_type, kind, message);
    }
}

impl fmt::Debug for IfcLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IfcLoop")
            .field("step_id", &self.step_id)
            .field("entity_type", &self.entity_type)
            .field("kind", &self.kind)
            .field("vertices", &self.vertices)
            .field("curve_boundary", &self.curve_boundary)
            .finish_non_exhaustive()
    }
}
