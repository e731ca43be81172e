// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Candidate search — four ordered strategies over the binary maps, each
// producing a raw 4-vertex candidate that must pass shape validation. The
// first validated candidate wins and no further strategy runs.

use image::GrayImage;
use imageproc::contours::{BorderType, Contour, find_contours};
use imageproc::geometry::{approximate_polygon_dp, arc_length, convex_hull, min_area_rect};
use imageproc::point::Point;
use paperlift_core::{CanonicalQuad, DetectionConfig, Point2, Quad, SearchStrategy};
use tracing::{debug, instrument};

use crate::maps::threshold_map;
use crate::validate::validate;

/// How many of the largest contours the relaxed-tolerance strategy examines.
pub const RELAXED_CONTOUR_LIMIT: usize = 10;
/// How many of the largest outer contours the bright-region strategy examines.
pub const BRIGHT_CONTOUR_LIMIT: usize = 5;

/// One rung of the strategy ladder.
type StrategyFn = fn(&[GrayImage; 3], &GrayImage, (f64, f64), &DetectionConfig) -> Option<Quad>;

/// A validated search result: the canonical quad plus the strategy that
/// produced it.
#[derive(Debug, Clone, Copy)]
pub struct SearchOutcome {
    pub quad: CanonicalQuad,
    pub strategy: SearchStrategy,
}

/// Run the strategy ladder over the edge maps.
///
/// Strategies run in fixed priority order; the first whose candidate passes
/// validation terminates the search. The Otsu threshold map needed by the
/// bright-region strategy is computed only if the first two strategies fail.
#[instrument(skip_all, fields(img_w, img_h))]
pub fn search(
    maps: &[GrayImage; 3],
    enhanced: &GrayImage,
    img_w: u32,
    img_h: u32,
    config: &DetectionConfig,
) -> Option<SearchOutcome> {
    let bounds = config.area_bounds(img_w, img_h);

    let ladder: [(SearchStrategy, StrategyFn); 4] = [
        (SearchStrategy::MultiMapScan, strategy_multi_map),
        (SearchStrategy::LargestContourRelaxed, strategy_largest_relaxed),
        (SearchStrategy::BrightRegionScan, strategy_bright_region),
        (SearchStrategy::ConvexHullFallback, strategy_convex_hull),
    ];

    for (strategy, run) in ladder {
        let Some(candidate) = run(maps, enhanced, bounds, config) else {
            continue;
        };
        match validate(&candidate, img_w, img_h, config) {
            Some(quad) => {
                debug!(?strategy, "Candidate validated");
                return Some(SearchOutcome { quad, strategy });
            }
            None => debug!(?strategy, "Candidate failed validation, trying next strategy"),
        }
    }

    None
}

/// Strategy 1: scan every contour of every edge map, keep 4-vertex polygon
/// approximations with a plausible bounding-box aspect ratio, and pick the
/// one with the largest enclosed area.
fn strategy_multi_map(
    maps: &[GrayImage; 3],
    _enhanced: &GrayImage,
    bounds: (f64, f64),
    config: &DetectionConfig,
) -> Option<Quad> {
    let mut best: Option<(f64, Quad)> = None;

    for map in maps {
        for contour in find_contours::<i32>(map) {
            let area = contour_area(&contour.points);
            if !within(area, bounds) {
                continue;
            }
            let Some(approx) = approx_quad(&contour.points, config.approx_epsilon) else {
                continue;
            };
            if !config.aspect_in_band(bounding_box_aspect(&approx)) {
                continue;
            }
            if best.is_none_or(|(best_area, _)| area > best_area) {
                best = Some((area, approx));
            }
        }
    }

    best.map(|(area, quad)| {
        debug!(area, "Multi-map scan selected a candidate");
        quad
    })
}

/// Strategy 2: the ten largest contours of the first edge map, each tried at
/// progressively coarser approximation tolerances until one collapses to
/// exactly four vertices.
fn strategy_largest_relaxed(
    maps: &[GrayImage; 3],
    _enhanced: &GrayImage,
    bounds: (f64, f64),
    config: &DetectionConfig,
) -> Option<Quad> {
    let contours = largest_contours(find_contours::<i32>(&maps[0]), RELAXED_CONTOUR_LIMIT);

    for (area, points) in contours {
        if !within(area, bounds) {
            continue;
        }
        for &epsilon in &config.relaxed_epsilons {
            if let Some(quad) = approx_quad(&points, epsilon) {
                debug!(area, epsilon, "Relaxed-tolerance strategy succeeded");
                return Some(quad);
            }
        }
    }

    None
}

/// Strategy 3: threshold the enhanced image to find bright regions (white
/// paper on a darker background) and scan the five largest outer contours.
fn strategy_bright_region(
    _maps: &[GrayImage; 3],
    enhanced: &GrayImage,
    bounds: (f64, f64),
    config: &DetectionConfig,
) -> Option<Quad> {
    let map = threshold_map(enhanced);
    let outer: Vec<Contour<i32>> = find_contours::<i32>(&map)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer)
        .collect();
    let contours = largest_contours(outer, BRIGHT_CONTOUR_LIMIT);

    for (area, points) in contours {
        if !within(area, bounds) {
            continue;
        }
        if let Some(quad) = approx_quad(&points, config.approx_epsilon) {
            debug!(area, "Bright-region strategy succeeded");
            return Some(quad);
        }
    }

    None
}

/// Strategy 4: take the single largest outer contour of the first edge map
/// and force a quadrilateral out of it — directly from its simplified convex
/// hull when that has four vertices, otherwise from the minimum-area
/// enclosing rectangle of the original contour.
fn strategy_convex_hull(
    maps: &[GrayImage; 3],
    _enhanced: &GrayImage,
    bounds: (f64, f64),
    config: &DetectionConfig,
) -> Option<Quad> {
    let outer: Vec<Contour<i32>> = find_contours::<i32>(&maps[0])
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer)
        .collect();
    let (area, points) = largest_contours(outer, 1).into_iter().next()?;
    if !within(area, bounds) {
        return None;
    }

    let hull = convex_hull(points.as_slice());
    let peri = arc_length(&hull, true);
    let approx = approximate_polygon_dp(&hull, config.approx_epsilon * peri, true);

    match approx.len() {
        4 => {
            debug!(area, "Convex hull simplified to four corners");
            Some(to_quad(&approx))
        }
        n if n > 4 => {
            debug!(area, hull_vertices = n, "Falling back to minimum-area rectangle");
            let rect = min_area_rect(&points);
            Some(to_quad(&rect))
        }
        _ => None,
    }
}

// -- Contour helpers ----------------------------------------------------------

/// Enclosed area of a closed contour via the shoelace formula.
fn contour_area(points: &[Point<i32>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0f64;
    for i in 0..n {
        let j = (i + 1) % n;
        area += f64::from(points[i].x) * f64::from(points[j].y);
        area -= f64::from(points[j].x) * f64::from(points[i].y);
    }
    area.abs() / 2.0
}

fn within(area: f64, (min_area, max_area): (f64, f64)) -> bool {
    area >= min_area && area <= max_area
}

/// Sort contours by enclosed area, descending, and keep the `limit` largest.
fn largest_contours(contours: Vec<Contour<i32>>, limit: usize) -> Vec<(f64, Vec<Point<i32>>)> {
    let mut ranked: Vec<(f64, Vec<Point<i32>>)> = contours
        .into_iter()
        .map(|c| (contour_area(&c.points), c.points))
        .collect();
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
    ranked.truncate(limit);
    ranked
}

/// Simplify a closed contour at a tolerance proportional to its perimeter;
/// `Some` only when the result has exactly four vertices.
fn approx_quad(points: &[Point<i32>], epsilon_frac: f64) -> Option<Quad> {
    if points.len() < 4 {
        return None;
    }
    let peri = arc_length(points, true);
    let approx = approximate_polygon_dp(points, epsilon_frac * peri, true);
    (approx.len() == 4).then(|| to_quad(&approx))
}

fn to_quad(points: &[Point<i32>]) -> Quad {
    Quad([
        Point2::new(points[0].x as f32, points[0].y as f32),
        Point2::new(points[1].x as f32, points[1].y as f32),
        Point2::new(points[2].x as f32, points[2].y as f32),
        Point2::new(points[3].x as f32, points[3].y as f32),
    ])
}

/// Bounding-box width/height aspect ratio of a raw candidate.
fn bounding_box_aspect(quad: &Quad) -> f64 {
    let xs = quad.0.map(|p| p.x);
    let ys = quad.0.map(|p| p.y);
    let width = xs.iter().copied().fold(f32::MIN, f32::max)
        - xs.iter().copied().fold(f32::MAX, f32::min);
    let height = ys.iter().copied().fold(f32::MIN, f32::max)
        - ys.iter().copied().fold(f32::MAX, f32::min);
    if height > 0.0 {
        f64::from(width) / f64::from(height)
    } else {
        0.0
    }
}
