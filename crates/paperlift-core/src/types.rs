// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for document boundary detection: 2-D points, raw and
// canonically-ordered quadrilaterals, and the strategy tag reported with a
// successful detection.

use serde::{Deserialize, Serialize};

/// A 2-D point in image coordinates (origin top-left, y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point2) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// A four-vertex candidate polygon with vertices in arbitrary order.
///
/// Produced by the candidate search; carries no ordering guarantee until
/// converted to a [`CanonicalQuad`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad(pub [Point2; 4]);

impl Quad {
    /// Enclosed area via the shoelace formula. Used to rank competing
    /// candidates; valid for any vertex order that traces the boundary.
    pub fn area(&self) -> f64 {
        shoelace_area(&self.0)
    }
}

/// A quadrilateral with vertices in canonical order: top-left, top-right,
/// bottom-right, bottom-left. The rectifier accepts only this form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanonicalQuad {
    pub tl: Point2,
    pub tr: Point2,
    pub br: Point2,
    pub bl: Point2,
}

impl CanonicalQuad {
    /// Assign canonical corners to four unordered points.
    ///
    /// The point with the smallest x+y sum is top-left and the largest is
    /// bottom-right; the largest x−y difference is top-right and the smallest
    /// is bottom-left. A pure function of the point set: any permutation of
    /// the same four points yields the same assignment.
    pub fn from_unordered(points: [Point2; 4]) -> Self {
        let sum = |p: &Point2| p.x + p.y;
        let diff = |p: &Point2| p.x - p.y;

        let tl = points
            .iter()
            .copied()
            .min_by(|a, b| sum(a).total_cmp(&sum(b)))
            .unwrap_or(points[0]);
        let br = points
            .iter()
            .copied()
            .max_by(|a, b| sum(a).total_cmp(&sum(b)))
            .unwrap_or(points[0]);
        let tr = points
            .iter()
            .copied()
            .max_by(|a, b| diff(a).total_cmp(&diff(b)))
            .unwrap_or(points[0]);
        let bl = points
            .iter()
            .copied()
            .min_by(|a, b| diff(a).total_cmp(&diff(b)))
            .unwrap_or(points[0]);

        Self { tl, tr, br, bl }
    }

    /// Corners in TL, TR, BR, BL order.
    pub fn corners(&self) -> [Point2; 4] {
        [self.tl, self.tr, self.br, self.bl]
    }

    /// Effective width: the longer of the top and bottom edges.
    pub fn effective_width(&self) -> f32 {
        self.tl.distance(&self.tr).max(self.bl.distance(&self.br))
    }

    /// Effective height: the longer of the left and right edges.
    pub fn effective_height(&self) -> f32 {
        self.tl.distance(&self.bl).max(self.tr.distance(&self.br))
    }

    /// Output dimensions for rectification: the effective width and height,
    /// each floored at `min_side` pixels so a barely-valid candidate cannot
    /// produce a degenerate output image.
    pub fn output_size(&self, min_side: u32) -> (u32, u32) {
        let width = (self.effective_width() as u32).max(min_side);
        let height = (self.effective_height() as u32).max(min_side);
        (width, height)
    }

    /// Enclosed area via the shoelace formula.
    pub fn area(&self) -> f64 {
        shoelace_area(&self.corners())
    }
}

/// Which candidate search strategy produced the winning quadrilateral.
///
/// Reported with every successful detection so callers (and tests) can see
/// how far down the fallback ladder the search had to go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchStrategy {
    /// Polygon scan across all three edge maps, best area wins.
    MultiMapScan,
    /// Ten largest contours of the first edge map, relaxed tolerances.
    LargestContourRelaxed,
    /// Otsu threshold map of bright regions, outer contours only.
    BrightRegionScan,
    /// Convex hull (or minimum-area rectangle) of the largest contour.
    ConvexHullFallback,
}

/// Signed shoelace area of a closed polygon, returned as an absolute value.
fn shoelace_area(points: &[Point2]) -> f64 {
    let n = points.len();
    let mut area = 0.0f64;
    for i in 0..n {
        let j = (i + 1) % n;
        area += f64::from(points[i].x) * f64::from(points[j].y);
        area -= f64::from(points[j].x) * f64::from(points[i].y);
    }
    area.abs() / 2.0
}
