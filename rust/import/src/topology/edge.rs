// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Edges: IfcEdge, IfcEdgeCurve, IfcOrientedEdge and IfcSubedge
//!
//! Edges are shared between the loops that use them, so they go through the
//! registry like loops do. Only straight and polyline edge geometry is
//! represented; other curves fall back to the straight segment between the
//! edge's vertices.

use super::vertex::IfcVertex;
use crate::diagnostics::{DiagnosticKind, DiagnosticsSink};
use crate::entity::IfcEntity;
use crate::error::Result;
use crate::file::ImportFile;
use ifc_topo_core::{IfcAnyHandle, IfcType, SchemaVersionOracle};
use ifc_topo_geometry::{CurveSegment, Error as GeometryError, Point3};
use std::rc::Rc;

/// Curve carried by an IfcEdgeCurve
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeGeometry {
    Line,
    Polyline(Vec<Point3<f64>>),
    /// A curve type without a representation here; treated as straight
    Unsupported(IfcType),
}

#[derive(Debug)]
pub enum EdgeKind {
    Plain,
    Curve {
        geometry: EdgeGeometry,
        same_sense: bool,
    },
    Oriented {
        element: Rc<IfcEdge>,
        orientation: bool,
    },
    Sub {
        parent: Rc<IfcEdge>,
    },
}

#[derive(Debug)]
pub struct IfcEdge {
    step_id: u32,
    entity_type: IfcType,
    start: Rc<IfcVertex>,
    end: Rc<IfcVertex>,
    kind: EdgeKind,
}

impl IfcEdge {
    pub fn step_id(&self) -> u32 {
        self.step_id
    }

    pub fn entity_type(&self) -> IfcType {
        self.entity_type
    }

    /// Start vertex in this edge's direction
    pub fn start(&self) -> &Rc<IfcVertex> {
        &self.start
    }

    pub fn end(&self) -> &Rc<IfcVertex> {
        &self.end
    }

    pub fn kind(&self) -> &EdgeKind {
        &self.kind
    }

    /// Geometry from start to end vertex
    pub fn segment(&self) -> ifc_topo_geometry::Result<CurveSegment> {
        match &self.kind {
            EdgeKind::Oriented {
                element,
                orientation,
            } => {
                let segment = element.segment()?;
                Ok(if *orientation {
                    segment
                } else {
                    segment.reversed()
                })
            }
            EdgeKind::Curve {
                geometry: EdgeGeometry::Polyline(points),
                same_sense,
            } => {
                let segment = CurveSegment::polyline(points.iter().copied())?;
                Ok(if *same_sense {
                    segment
                } else {
                    segment.reversed()
                })
            }
            _ => CurveSegment::line(vertex_point(&self.start)?, vertex_point(&self.end)?),
        }
    }

    /// Resolve an edge handle
    pub fn process(file: &mut ImportFile<'_>, handle: &IfcAnyHandle) -> Result<Option<Rc<Self>>> {
        file.resolve_with(handle, IfcType::IfcEdge, IfcEntity::as_edge, Self::construct)
    }

    fn construct(file: &mut ImportFile<'_>, handle: &IfcAnyHandle) -> Result<Option<Rc<Self>>> {
        let (Some(step_id), Some(entity_type)) = (handle.step_id(), handle.declared_type()) else {
            return Ok(None);
        };
        let version = file.schema_version();
        let log = file.sink();
        let fail = |message: &str| {
            log.log_error(step_id, entity_type, DiagnosticKind::InvalidAttribute, message);
            Ok(None)
        };

        let (start, end, kind) = if handle.is_valid_subtype_of(IfcType::IfcOrientedEdge, version) {
            // EdgeStart and EdgeEnd are derived from EdgeElement
            let Some(element) = file.resolve_attribute(handle, 2, IfcEdge::process)? else {
                return fail("EdgeElement does not resolve to an edge");
            };
            let Some(orientation) = handle.attribute(3).and_then(|a| a.as_bool()) else {
                return fail("Orientation is missing");
            };
            let (start, end) = if orientation {
                (Rc::clone(&element.start), Rc::clone(&element.end))
            } else {
                (Rc::clone(&element.end), Rc::clone(&element.start))
            };
            (start, end, EdgeKind::Oriented { element, orientation })
        } else if handle.is_valid_subtype_of(IfcType::IfcEdge, version) {
            let Some(start) = file.resolve_attribute(handle, 0, IfcVertex::process)? else {
                return fail("EdgeStart does not resolve to a vertex");
            };
            let Some(end) = file.resolve_attribute(handle, 1, IfcVertex::process)? else {
                return fail("EdgeEnd does not resolve to a vertex");
            };

            let kind = match entity_type {
                IfcType::IfcEdgeCurve => {
                    let Some(geometry) = edge_geometry(file, handle)? else {
                        return fail("EdgeGeometry is not a curve");
                    };
                    let Some(same_sense) = handle.attribute(3).and_then(|a| a.as_bool()) else {
                        return fail("SameSense is missing");
                    };
                    EdgeKind::Curve {
                        geometry,
                        same_sense,
                    }
                }
                IfcType::IfcSubedge => {
                    let Some(parent) = file.resolve_attribute(handle, 2, IfcEdge::process)? else {
                        return fail("ParentEdge does not resolve to an edge");
                    };
                    EdgeKind::Sub { parent }
                }
                _ => EdgeKind::Plain,
            };
            (start, end, kind)
        } else {
            log.log_unhandled_subtype(handle, IfcType::IfcEdge, false);
            return Ok(None);
        };

        let edge = Rc::new(IfcEdge {
            step_id,
            entity_type,
            start,
            end,
            kind,
        });
        file.register(IfcEntity::Edge(Rc::clone(&edge)))?;
        Ok(Some(edge))
    }
}

fn vertex_point(vertex: &IfcVertex) -> ifc_topo_geometry::Result<Point3<f64>> {
    vertex.point().ok_or_else(|| {
        GeometryError::DegenerateSegment(format!("vertex #{} has no point", vertex.step_id()))
    })
}

/// Read the EdgeGeometry of an IfcEdgeCurve; `None` when it is not a curve
fn edge_geometry(file: &mut ImportFile<'_>, handle: &IfcAnyHandle) -> Result<Option<EdgeGeometry>> {
    let (Some(step_id), Some(entity_type)) = (handle.step_id(), handle.declared_type()) else {
        return Ok(None);
    };
    let curve = match handle.attribute(2) {
        Some(attr) => file.handle_for(attr),
        None => return Ok(None),
    };

    let geometry = match curve.declared_type() {
        Some(IfcType::IfcLine) => EdgeGeometry::Line,
        Some(IfcType::IfcPolyline) => {
            let refs = curve.attribute(0).and_then(|a| a.as_list()).unwrap_or(&[]);
            let points: Option<Vec<Point3<f64>>> = refs
                .iter()
                .map(|r| r.as_entity_ref().and_then(|id| file.cartesian_point(id)))
                .collect();
            match points {
                Some(points) if points.len() >= 2 => EdgeGeometry::Polyline(points),
                _ => {
                    file.log().log_warning(
                        step_id,
                        entity_type,
                        DiagnosticKind::InvalidAttribute,
                        &format!("{} has invalid points, using a straight segment", curve),
                    );
                    EdgeGeometry::Line
                }
            }
        }
        Some(other) if other.is_subtype_of(IfcType::IfcCurve) => {
            file.log().log_warning(
                step_id,
                entity_type,
                DiagnosticKind::UnhandledSubtype,
                &format!("unsupported edge geometry {}, using a straight segment", curve),
            );
            EdgeGeometry::Unsupported(other)
        }
        _ => return Ok(None),
    };
    Ok(Some(geometry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ImportOptions;

    const CONTENT: &str = "HEADER;FILE_SCHEMA(('IFC4'));ENDSEC;
DATA;
#1=IFCCARTESIANPOINT((0.,0.,0.));
#2=IFCCARTESIANPOINT((2.,0.,0.));
#3=IFCCARTESIANPOINT((1.,1.,0.));
#11=IFCVERTEXPOINT(#1);
#12=IFCVERTEXPOINT(#2);
#20=IFCPOLYLINE((#1,#3,#2));
#21=IFCEDGECURVE(#11,#12,#20,.T.);
#22=IFCEDGECURVE(#11,#12,#20,.F.);
#23=IFCORIENTEDEDGE(*,*,#21,.F.);
#24=IFCEDGE(#11,#12);
#25=IFCCIRCLE(#99,1.);
#26=IFCEDGECURVE(#11,#12,#25,.T.);
#27=IFCORIENTEDEDGE(*,*,#27,.T.);
#28=IFCEDGE(#11,$);
";

    fn session() -> ImportFile<'static> {
        ImportFile::new(CONTENT, ImportOptions::default().with_trace_diagnostics(false)).unwrap()
    }

    fn edge(file: &mut ImportFile<'_>, step_id: u32) -> Option<Rc<IfcEdge>> {
        let handle = file.handle(step_id);
        IfcEdge::process(file, &handle).unwrap()
    }

    #[test]
    fn test_polyline_edge_follows_same_sense() {
        let mut file = session();
        let forward = edge(&mut file, 21).unwrap().segment().unwrap();
        assert_eq!(forward.start(), Point3::new(0.0, 0.0, 0.0));
        assert_eq!(forward.end(), Point3::new(2.0, 0.0, 0.0));

        // Same polyline, opposite sense: traversed from its end
        let backward = edge(&mut file, 22).unwrap().segment().unwrap();
        assert_eq!(backward.start(), Point3::new(2.0, 0.0, 0.0));
        assert_eq!(backward.end(), Point3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_oriented_edge_shares_element() {
        let mut file = session();
        let oriented = edge(&mut file, 23).unwrap();
        let element = edge(&mut file, 21).unwrap();

        match oriented.kind() {
            EdgeKind::Oriented { element: inner, orientation } => {
                assert!(Rc::ptr_eq(inner, &element));
                assert!(!orientation);
            }
            other => panic!("expected oriented edge, got {:?}", other),
        }
        assert_eq!(oriented.start().step_id(), 12);
        assert_eq!(oriented.end().step_id(), 11);
        assert!(Rc::ptr_eq(oriented.start(), element.end()));

        let segment = oriented.segment().unwrap();
        assert_eq!(segment.start(), Point3::new(2.0, 0.0, 0.0));
        assert_eq!(segment.end(), Point3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_plain_edge_is_straight() {
        let mut file = session();
        let segment = edge(&mut file, 24).unwrap().segment().unwrap();
        assert_eq!(
            segment,
            CurveSegment::Line {
                start: Point3::new(0.0, 0.0, 0.0),
                end: Point3::new(2.0, 0.0, 0.0),
            }
        );
    }

    #[test]
    fn test_unsupported_curve_is_warned() {
        let mut file = session();
        let curved = edge(&mut file, 26).unwrap();
        assert!(matches!(
            curved.kind(),
            EdgeKind::Curve {
                geometry: EdgeGeometry::Unsupported(IfcType::IfcCircle),
                ..
            }
        ));
        assert!(matches!(curved.segment(), Ok(CurveSegment::Line { .. })));
        assert_eq!(file.log().for_step_id(26).len(), 1);
    }

    #[test]
    fn test_self_referencing_edge() {
        let mut file = session();
        assert!(edge(&mut file, 27).is_none());
        assert_eq!(file.log().count_kind(DiagnosticKind::CyclicReference), 1);
        assert!(!file.registry().contains(27));
    }

    #[test]
    fn test_missing_end_vertex() {
        let mut file = session();
        assert!(edge(&mut file, 28).is_none());
        assert!(edge(&mut file, 28).is_none());
        assert_eq!(file.log().for_step_id(28).len(), 1);
        // The start vertex resolved before the failure stays registered
        assert!(file.registry().contains(11));
    }
}
