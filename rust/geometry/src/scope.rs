// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shape edit scopes
//!
//! A scope receives the host-side geometry produced while materializing
//! representation items for one owner (an element guid). Coordinates handed
//! to a scope are already in output space.

use crate::curve_loop::CurveLoop;
use crate::error::Result;
use crate::mesh::{Mesh, SubMeshCollection};
use ifc_topo_core::IfcType;
use nalgebra::Point3;
use rustc_hash::FxHashMap;

/// Sink for materialized representation items
pub trait ShapeEditScope {
    /// Shared bookkeeping for every representation item, called before the
    /// item adds its own geometry.
    fn add_representation_item(&mut self, owner_guid: &str, step_id: u32, item_type: IfcType);

    /// Planar polygon boundary
    fn add_polygon_boundary(
        &mut self,
        owner_guid: &str,
        step_id: u32,
        points: &[Point3<f64>],
    ) -> Result<()>;

    /// Closed parametric boundary
    fn add_curve_loop(&mut self, owner_guid: &str, step_id: u32, curve_loop: CurveLoop)
        -> Result<()>;
}

/// Geometry collected for one owner
#[derive(Debug, Clone, Default)]
pub struct ShapeOutput {
    /// Items in materialization order
    pub items: Vec<(u32, IfcType)>,
    /// Triangulated polygon boundaries, one sub-mesh per item
    pub faces: SubMeshCollection,
    pub curve_loops: Vec<(u32, CurveLoop)>,
}

/// Scope that triangulates polygon boundaries into meshes and keeps curve
/// loops as-is, grouped by owner guid
#[derive(Debug, Default)]
pub struct MeshShapeScope {
    shapes: FxHashMap<String, ShapeOutput>,
}

impl MeshShapeScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shape(&self, owner_guid: &str) -> Option<&ShapeOutput> {
        self.shapes.get(owner_guid)
    }

    /// Number of owners with any output
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    fn output(&mut self, owner_guid: &str) -> &mut ShapeOutput {
        self.shapes.entry(owner_guid.to_string()).or_default()
    }
}

impl ShapeEditScope for MeshShapeScope {
    fn add_representation_item(&mut self, owner_guid: &str, step_id: u32, item_type: IfcType) {
        self.output(owner_guid).items.push((step_id, item_type));
    }

    fn add_polygon_boundary(
        &mut self,
        owner_guid: &str,
        step_id: u32,
        points: &[Point3<f64>],
    ) -> Result<()> {
        let mesh = Mesh::from_polygon(points)?;
        self.output(owner_guid).faces.add(step_id, mesh);
        Ok(())
    }

    fn add_curve_loop(
        &mut self,
        owner_guid: &str,
        step_id: u32,
        curve_loop: CurveLoop,
    ) -> Result<()> {
        self.output(owner_guid).curve_loops.push((step_id, curve_loop));
        Ok(())
    }
}
