// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shape validation — accepts or rejects a raw 4-vertex candidate against the
// size, aspect-ratio, and image-margin rules.

use paperlift_core::{CanonicalQuad, DetectionConfig, Quad};
use tracing::debug;

/// Validate a raw candidate against the document shape rules.
///
/// Orders the corners canonically first, then checks, in order:
/// minimum side length, width/height aspect ratio, and the full-frame test
/// (a quad whose corners all hug the image margins is the frame itself, not
/// a document inside it). Returns the canonically-ordered quad on success.
pub fn validate(
    candidate: &Quad,
    img_w: u32,
    img_h: u32,
    config: &DetectionConfig,
) -> Option<CanonicalQuad> {
    let quad = CanonicalQuad::from_unordered(candidate.0);

    let width = quad.effective_width();
    let height = quad.effective_height();
    if width < config.min_side_px || height < config.min_side_px {
        debug!(width, height, "Candidate rejected: below minimum side length");
        return None;
    }

    let aspect = if height > 0.0 {
        f64::from(width) / f64::from(height)
    } else {
        0.0
    };
    if !config.aspect_in_band(aspect) {
        debug!(aspect, "Candidate rejected: aspect ratio outside band");
        return None;
    }

    if touches_all_margins(&quad, img_w, img_h, config.frame_margin_px) {
        debug!("Candidate rejected: indistinguishable from the image frame");
        return None;
    }

    Some(quad)
}

/// Whether the quad simultaneously reaches into the margin strip along all
/// four image edges.
fn touches_all_margins(quad: &CanonicalQuad, img_w: u32, img_h: u32, margin: f32) -> bool {
    let right_edge = img_w as f32 - margin;
    let bottom_edge = img_h as f32 - margin;

    let touches_left = quad.tl.x.min(quad.bl.x) < margin;
    let touches_right = quad.tr.x.max(quad.br.x) > right_edge;
    let touches_top = quad.tl.y.min(quad.tr.y) < margin;
    let touches_bottom = quad.bl.y.max(quad.br.y) > bottom_edge;

    touches_left && touches_right && touches_top && touches_bottom
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperlift_core::Point2;

    fn quad(tl: (f32, f32), tr: (f32, f32), br: (f32, f32), bl: (f32, f32)) -> Quad {
        Quad([
            Point2::new(tl.0, tl.1),
            Point2::new(tr.0, tr.1),
            Point2::new(br.0, br.1),
            Point2::new(bl.0, bl.1),
        ])
    }

    #[test]
    fn accepts_a_plausible_document() {
        let config = DetectionConfig::default();
        let candidate = quad(
            (100.0, 120.0),
            (700.0, 110.0),
            (710.0, 560.0),
            (95.0, 570.0),
        );
        let canonical = validate(&candidate, 1000, 1000, &config).expect("should validate");
        assert_eq!(canonical.tl, Point2::new(100.0, 120.0));
    }

    #[test]
    fn rejects_sides_below_minimum() {
        let config = DetectionConfig::default();
        let candidate = quad((0.0, 0.0), (40.0, 0.0), (40.0, 40.0), (0.0, 40.0));
        assert!(validate(&candidate, 1000, 1000, &config).is_none());
    }

    /// A 4.0 width/height ratio is outside the band; 2.0 is inside.
    #[test]
    fn aspect_ratio_band_is_enforced() {
        let config = DetectionConfig::default();

        let elongated = quad((100.0, 100.0), (900.0, 100.0), (900.0, 300.0), (100.0, 300.0));
        assert!(validate(&elongated, 1000, 1000, &config).is_none());

        let acceptable = quad((100.0, 100.0), (700.0, 100.0), (700.0, 400.0), (100.0, 400.0));
        assert!(validate(&acceptable, 1000, 1000, &config).is_some());
    }

    /// Corners within the 10 px margin of all four edges are the frame, not
    /// a document — rejected even though area and aspect are fine.
    #[test]
    fn rejects_full_frame_quads() {
        let config = DetectionConfig::default();
        let frame = quad((2.0, 3.0), (997.0, 2.0), (998.0, 996.0), (3.0, 997.0));
        assert!(validate(&frame, 1000, 1000, &config).is_none());
    }

    /// Touching three margins but not the fourth is still a document.
    #[test]
    fn accepts_quads_touching_only_some_margins() {
        let config = DetectionConfig::default();
        let candidate = quad((2.0, 2.0), (997.0, 2.0), (997.0, 700.0), (2.0, 700.0));
        assert!(validate(&candidate, 1000, 1000, &config).is_some());
    }
}
