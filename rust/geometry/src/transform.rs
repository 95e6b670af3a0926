// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Frame utilities shared by shape materialization
//!
//! Frames are plain homogeneous `Matrix4<f64>`. The local frame carries no
//! scale; the scaled frame may scale non-uniformly.

use nalgebra::{Matrix4, Point3};

/// Apply a frame to a list of points
#[inline]
pub fn transform_points(transform: &Matrix4<f64>, points: &[Point3<f64>]) -> Vec<Point3<f64>> {
    points.iter().map(|p| transform.transform_point(p)).collect()
}
