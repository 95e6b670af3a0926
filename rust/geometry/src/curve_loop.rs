// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Closed chains of curve segments.
//!
//! A [`CurveLoop`] is built segment by segment; each appended segment must
//! start where the previous one ends, and a finished loop must return to
//! its first point. Only straight and polyline segments are represented.

use crate::error::{Error, Result};
use nalgebra::{Matrix4, Point3};
use smallvec::SmallVec;

/// Polyline storage; most edge polylines are a handful of points
pub type PolylinePoints = SmallVec<[Point3<f64>; 4]>;

/// One piece of a loop boundary
#[derive(Debug, Clone, PartialEq)]
pub enum CurveSegment {
    Line { start: Point3<f64>, end: Point3<f64> },
    Polyline(PolylinePoints),
}

impl CurveSegment {
    /// Straight segment; rejects zero-length lines.
    pub fn line(start: Point3<f64>, end: Point3<f64>) -> Result<Self> {
        if start == end {
            return Err(Error::DegenerateSegment(format!(
                "zero-length line at ({}, {}, {})",
                start.x, start.y, start.z
            )));
        }
        Ok(CurveSegment::Line { start, end })
    }

    /// Polyline through at least two points.
    pub fn polyline<I>(points: I) -> Result<Self>
    where
        I: IntoIterator<Item = Point3<f64>>,
    {
        let points: PolylinePoints = points.into_iter().collect();
        if points.len() < 2 {
            return Err(Error::DegenerateSegment(format!(
                "polyline needs 2 points, got {}",
                points.len()
            )));
        }
        Ok(CurveSegment::Polyline(points))
    }

    pub fn start(&self) -> Point3<f64> {
        match self {
            CurveSegment::Line { start, .. } => *start,
            CurveSegment::Polyline(points) => points[0],
        }
    }

    pub fn end(&self) -> Point3<f64> {
        match self {
            CurveSegment::Line { end, .. } => *end,
            CurveSegment::Polyline(points) => points[points.len() - 1],
        }
    }

    /// Same geometry traversed the other way
    pub fn reversed(&self) -> Self {
        match self {
            CurveSegment::Line { start, end } => CurveSegment::Line {
                start: *end,
                end: *start,
            },
            CurveSegment::Polyline(points) => {
                CurveSegment::Polyline(points.iter().rev().copied().collect())
            }
        }
    }

    pub fn length(&self) -> f64 {
        match self {
            CurveSegment::Line { start, end } => (end - start).norm(),
            CurveSegment::Polyline(points) => points
                .windows(2)
                .map(|pair| (pair[1] - pair[0]).norm())
                .sum(),
        }
    }

    pub fn transformed(&self, transform: &Matrix4<f64>) -> Self {
        match self {
            CurveSegment::Line { start, end } => CurveSegment::Line {
                start: transform.transform_point(start),
                end: transform.transform_point(end),
            },
            CurveSegment::Polyline(points) => CurveSegment::Polyline(
                points.iter().map(|p| transform.transform_point(p)).collect(),
            ),
        }
    }

    /// Points in traversal order, endpoints included
    fn points(&self) -> PolylinePoints {
        match self {
            CurveSegment::Line { start, end } => [*start, *end].into_iter().collect(),
            CurveSegment::Polyline(points) => points.clone(),
        }
    }
}

/// Closed boundary made of connected segments
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurveLoop {
    segments: Vec<CurveSegment>,
}

impl CurveLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a loop and check it is connected and closed.
    pub fn from_segments<I>(segments: I, tolerance: f64) -> Result<Self>
    where
        I: IntoIterator<Item = CurveSegment>,
    {
        let mut curve_loop = Self::new();
        for segment in segments {
            curve_loop.append(segment, tolerance)?;
        }
        curve_loop.validate_closed(tolerance)?;
        Ok(curve_loop)
    }

    /// Append a segment that must start at the current end.
    pub fn append(&mut self, segment: CurveSegment, tolerance: f64) -> Result<()> {
        if let Some(last) = self.segments.last() {
            if (segment.start() - last.end()).norm() > tolerance {
                return Err(Error::DisconnectedLoop {
                    prev: self.segments.len() - 1,
                    next: self.segments.len(),
                });
            }
        }
        self.segments.push(segment);
        Ok(())
    }

    /// Distance between the last end point and the first start point
    pub fn closure_gap(&self) -> Option<f64> {
        let first = self.segments.first()?;
        let last = self.segments.last()?;
        Some((first.start() - last.end()).norm())
    }

    pub fn is_closed(&self, tolerance: f64) -> bool {
        self.closure_gap().map_or(false, |gap| gap <= tolerance)
    }

    pub fn validate_closed(&self, tolerance: f64) -> Result<()> {
        match self.closure_gap() {
            None => Err(Error::EmptyLoop),
            Some(gap) if gap > tolerance => Err(Error::OpenLoop(gap)),
            Some(_) => Ok(()),
        }
    }

    pub fn segments(&self) -> &[CurveSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Total arc length
    pub fn length(&self) -> f64 {
        self.segments.iter().map(CurveSegment::length).sum()
    }

    pub fn transformed(&self, transform: &Matrix4<f64>) -> Self {
        Self {
            segments: self
                .segments
                .iter()
                .map(|s| s.transformed(transform))
                .collect(),
        }
    }

    /// Corner points in traversal order, without repeating the closing point
    pub fn vertices(&self) -> Vec<Point3<f64>> {
        let mut vertices = Vec::with_capacity(self.segments.len() * 2);
        for segment in &self.segments {
            let points = segment.points();
            // Each segment's end is the next one's start
            vertices.extend_from_slice(&points[..points.len() - 1]);
        }
        vertices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn p(x: f64, y: f64, z: f64) -> Point3<f64> {
        Point3::new(x, y, z)
    }

    fn square() -> Vec<CurveSegment> {
        vec![
            CurveSegment::line(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)).unwrap(),
            CurveSegment::line(p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0)).unwrap(),
            CurveSegment::polyline([p(1.0, 1.0, 0.0), p(0.5, 1.0, 0.0), p(0.0, 1.0, 0.0)])
                .unwrap(),
            CurveSegment::line(p(0.0, 1.0, 0.0), p(0.0, 0.0, 0.0)).unwrap(),
        ]
    }

    #[test]
    fn test_closed_square() {
        let curve_loop = CurveLoop::from_segments(square(), 1e-9).unwrap();
        assert_eq!(curve_loop.len(), 4);
        assert!(curve_loop.is_closed(1e-9));
        assert_relative_eq!(curve_loop.length(), 4.0);
        assert_eq!(curve_loop.vertices().len(), 5);
        assert_eq!(curve_loop.vertices()[3], p(0.5, 1.0, 0.0));
    }

    #[test]
    fn test_disconnected_segment() {
        let mut segments = square();
        segments.swap(1, 2);
        assert_eq!(
            CurveLoop::from_segments(segments, 1e-9).unwrap_err(),
            Error::DisconnectedLoop { prev: 0, next: 1 }
        );
    }

    #[test]
    fn test_open_loop() {
        let mut segments = square();
        segments.pop();
        assert!(matches!(
            CurveLoop::from_segments(segments, 1e-9),
            Err(Error::OpenLoop(gap)) if (gap - 1.0).abs() < 1e-12
        ));
        assert_eq!(
            CurveLoop::from_segments(Vec::new(), 1e-9).unwrap_err(),
            Error::EmptyLoop
        );
    }

    #[test]
    fn test_degenerate_segments() {
        assert!(CurveSegment::line(p(1.0, 1.0, 1.0), p(1.0, 1.0, 1.0)).is_err());
        assert!(CurveSegment::polyline([p(0.0, 0.0, 0.0)]).is_err());
    }

    #[test]
    fn test_reverse_and_transform() {
        let segment = CurveSegment::polyline([p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 2.0, 0.0)])
            .unwrap();
        let reversed = segment.reversed();
        assert_eq!(reversed.start(), p(1.0, 2.0, 0.0));
        assert_eq!(reversed.end(), p(0.0, 0.0, 0.0));
        assert_relative_eq!(reversed.length(), 3.0);

        let shift = Matrix4::new_translation(&Vector3::new(0.0, 0.0, 5.0));
        let moved = segment.transformed(&shift);
        assert_eq!(moved.start(), p(0.0, 0.0, 5.0));
    }
}
