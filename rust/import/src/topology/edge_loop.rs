// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IfcEdgeLoop: a loop of oriented edges

use super::edge::IfcEdge;
use super::loops::{IfcLoop, LoopKind};
use crate::diagnostics::{DiagnosticKind, DiagnosticsSink};
use crate::entity::IfcEntity;
use crate::error::Result;
use crate::file::ImportFile;
use ifc_topo_core::IfcAnyHandle;
use ifc_topo_geometry::CurveLoop;
use std::rc::Rc;

#[derive(Debug, Clone, Default)]
pub struct IfcEdgeLoop {
    edges: Vec<Rc<IfcEdge>>,
}

impl IfcEdgeLoop {
    /// Edges in loop order, as resolved
    pub fn edges(&self) -> &[Rc<IfcEdge>] {
        &self.edges
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub(crate) fn construct(
        file: &mut ImportFile<'_>,
        handle: &IfcAnyHandle,
    ) -> Result<Option<Rc<IfcLoop>>> {
        let (Some(step_id), Some(entity_type)) = (handle.step_id(), handle.declared_type()) else {
            return Ok(None);
        };

        // EdgeList
        let Some(items) = handle.attribute(0).and_then(|a| a.as_list()) else {
            file.log().log_error(
                step_id,
                entity_type,
                DiagnosticKind::InvalidAttribute,
                "EdgeList is missing or not a list",
            );
            return Ok(None);
        };

        let mut edges = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let edge_handle = file.handle_for(item);
            let edge = if edge_handle.is_null_or_empty() {
                None
            } else {
                IfcEdge::process(file, &edge_handle)?
            };
            match edge {
                Some(edge) => edges.push(edge),
                None => file.log().log_warning(
                    step_id,
                    entity_type,
                    DiagnosticKind::InvalidAttribute,
                    &format!("EdgeList item {} does not resolve to an edge, skipped", i),
                ),
            }
        }

        let ifc_loop = Rc::new(IfcLoop::new(
            step_id,
            entity_type,
            LoopKind::Edge(IfcEdgeLoop { edges }),
            file,
        ));
        file.register(IfcEntity::Loop(Rc::clone(&ifc_loop)))?;
        Ok(Some(ifc_loop))
    }

    /// Chain the edges into a closed curve loop
    pub(crate) fn generate_loop(&self, tolerance: f64) -> ifc_topo_geometry::Result<CurveLoop> {
        let segments = self
            .edges
            .iter()
            .map(|edge| edge.segment())
            .collect::<ifc_topo_geometry::Result<Vec<_>>>()?;
        CurveLoop::from_segments(segments, tolerance)
    }
}
