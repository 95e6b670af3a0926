// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Resolved entities as held by the registry

use crate::topology::{IfcEdge, IfcLoop, IfcVertex};
use ifc_topo_core::IfcType;
use std::rc::Rc;

/// A resolved entity of one of the supported families
#[derive(Debug, Clone)]
pub enum IfcEntity {
    Vertex(Rc<IfcVertex>),
    Edge(Rc<IfcEdge>),
    Loop(Rc<IfcLoop>),
}

impl IfcEntity {
    pub fn step_id(&self) -> u32 {
        match self {
            IfcEntity::Vertex(v) => v.step_id(),
            IfcEntity::Edge(e) => e.step_id(),
            IfcEntity::Loop(l) => l.step_id(),
        }
    }

    /// Declared type of the record this entity was built from
    pub fn entity_type(&self) -> IfcType {
        match self {
            IfcEntity::Vertex(v) => v.entity_type(),
            IfcEntity::Edge(e) => e.entity_type(),
            IfcEntity::Loop(l) => l.entity_type(),
        }
    }

    pub fn as_vertex(&self) -> Option<&Rc<IfcVertex>> {
        match self {
            IfcEntity::Vertex(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_edge(&self) -> Option<&Rc<IfcEdge>> {
        match self {
            IfcEntity::Edge(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_loop(&self) -> Option<&Rc<IfcLoop>> {
        match self {
            IfcEntity::Loop(l) => Some(l),
            _ => None,
        }
    }
}

impl From<Rc<IfcVertex>> for IfcEntity {
    fn from(vertex: Rc<IfcVertex>) -> Self {
        IfcEntity::Vertex(vertex)
    }
}

impl From<Rc<IfcEdge>> for IfcEntity {
    fn from(edge: Rc<IfcEdge>) -> Self {
        IfcEntity::Edge(edge)
    }
}

impl From<Rc<IfcLoop>> for IfcEntity {
    fn from(ifc_loop: Rc<IfcLoop>) -> Self {
        IfcEntity::Loop(ifc_loop)
    }
}
