// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IfcPolyLoop: a loop given directly as a list of points

use super::loops::{IfcLoop, LoopKind};
use crate::diagnostics::{DiagnosticKind, DiagnosticsSink};
use crate::entity::IfcEntity;
use crate::error::Result;
use crate::file::ImportFile;
use ifc_topo_core::IfcAnyHandle;
use nalgebra::Point3;
use std::rc::Rc;

#[derive(Debug, Clone, Default)]
pub struct IfcPolyLoop {
    polygon: Vec<Point3<f64>>,
}

impl IfcPolyLoop {
    /// Points as read, scaled to output units
    pub fn polygon(&self) -> &[Point3<f64>] {
        &self.polygon
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.polygon.is_empty()
    }

    pub(crate) fn construct(
        file: &mut ImportFile<'_>,
        handle: &IfcAnyHandle,
    ) -> Result<Option<Rc<IfcLoop>>> {
        let (Some(step_id), Some(entity_type)) = (handle.step_id(), handle.declared_type()) else {
            return Ok(None);
        };

        // Polygon
        let Some(items) = handle.attribute(0).and_then(|a| a.as_list()) else {
            file.log().log_error(
                step_id,
                entity_type,
                DiagnosticKind::InvalidAttribute,
                "Polygon is missing or not a list",
            );
            return Ok(None);
        };

        let mut polygon = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            match item.as_entity_ref().and_then(|id| file.cartesian_point(id)) {
                Some(point) => polygon.push(point),
                None => file.log().log_warning(
                    step_id,
                    entity_type,
                    DiagnosticKind::InvalidAttribute,
                    &format!("Polygon item {} is not a cartesian point, skipped", i),
                ),
            }
        }

        let ifc_loop = Rc::new(IfcLoop::new(
            step_id,
            entity_type,
            LoopKind::Poly(IfcPolyLoop { polygon }),
            file,
        ));
        file.register(IfcEntity::Loop(Rc::clone(&ifc_loop)))?;
        Ok(Some(ifc_loop))
    }

    /// Polygon without repeated points and without the closing point
    ///
    /// `None` when fewer than three distinct points remain.
    pub(crate) fn generate_vertices(&self, tolerance: f64) -> Option<Vec<Point3<f64>>> {
        let mut vertices: Vec<Point3<f64>> = Vec::with_capacity(self.polygon.len());
        for point in &self.polygon {
            let repeated = vertices
                .last()
                .map_or(false, |last| (point - last).norm() <= tolerance);
            if !repeated {
                vertices.push(*point);
            }
        }

        while vertices.len() > 1 {
            let (first, last) = (vertices[0], vertices[vertices.len() - 1]);
            if (last - first).norm() > tolerance {
                break;
            }
            vertices.pop();
        }

        if vertices.len() < 3 {
            return None;
        }
        Some(vertices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poly(points: &[[f64; 3]]) -> IfcPolyLoop {
        IfcPolyLoop {
            polygon: points.iter().map(|p| Point3::new(p[0], p[1], p[2])).collect(),
        }
    }

    #[test]
    fn test_triangle_kept_as_is() {
        let triangle = poly(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        let vertices = triangle.generate_vertices(1e-6).unwrap();
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[1], Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_duplicates_and_closing_point_dropped() {
        let square = poly(&[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1e-9],
        ]);
        let vertices = square.generate_vertices(1e-6).unwrap();
        assert_eq!(vertices.len(), 4);
        assert_eq!(vertices[3], Point3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_degenerate_polygon() {
        let sliver = poly(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 0.0]]);
        assert!(sliver.generate_vertices(1e-6).is_none());
        assert!(poly(&[]).generate_vertices(1e-6).is_none());
    }
}
