// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Topological representation items: loops and the edges and vertices
//! they are built from

mod edge;
mod edge_loop;
mod loops;
mod poly_loop;
mod vertex;

pub use edge::{EdgeGeometry, EdgeKind, IfcEdge};
pub use edge_loop::IfcEdgeLoop;
pub use loops::{IfcLoop, LoopKind};
pub use poly_loop::IfcPolyLoop;
pub use vertex::IfcVertex;
