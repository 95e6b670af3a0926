// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-Topo Geometry
//!
//! Curve loops, polygon meshing and the shape scopes that topological
//! loops materialize into. Uses earcutr for triangulation and nalgebra for
//! frames.

pub mod curve_loop;
pub mod error;
pub mod mesh;
pub mod scope;
pub mod transform;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point2, Point3, Vector2, Vector3};

pub use curve_loop::{CurveLoop, CurveSegment};
pub use error::{Error, Result};
pub use mesh::{Mesh, SubMesh, SubMeshCollection};
pub use scope::{MeshShapeScope, ShapeEditScope, ShapeOutput};
pub use triangulation::{calculate_polygon_normal, triangulate_polygon};
