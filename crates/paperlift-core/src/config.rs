// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detection configuration.

use serde::{Deserialize, Serialize};

/// Tunable heuristics for document boundary detection.
///
/// Every geometric threshold used by the candidate search and the shape
/// validator lives here so the pipeline can be tuned without touching
/// algorithm code. The defaults are calibrated for hand-held photographs of
/// A-series and Letter documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Minimum candidate area as a fraction of total image area. Candidates
    /// smaller than this are background clutter, not a document.
    pub min_area_ratio: f64,
    /// Maximum candidate area as a fraction of total image area. Candidates
    /// larger than this are indistinguishable from the frame itself.
    pub max_area_ratio: f64,
    /// Minimum width and height, in pixels, of a validated quadrilateral.
    pub min_side_px: f32,
    /// Lower bound of the accepted width/height aspect ratio. Applied both
    /// when filtering candidates during search and by the final validator.
    pub min_aspect_ratio: f64,
    /// Upper bound of the accepted width/height aspect ratio.
    pub max_aspect_ratio: f64,
    /// A quadrilateral whose corners all sit within this margin (pixels) of
    /// the image edges is rejected as the frame border.
    pub frame_margin_px: f32,
    /// Floor applied to each axis of the rectified output, in pixels.
    pub min_output_side: u32,
    /// Polygon approximation tolerance as a fraction of contour perimeter.
    pub approx_epsilon: f64,
    /// Relaxed tolerance ladder tried, in order, when the base tolerance
    /// fails to reduce a large contour to four vertices.
    pub relaxed_epsilons: Vec<f64>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_area_ratio: 0.10,
            max_area_ratio: 0.95,
            min_side_px: 50.0,
            min_aspect_ratio: 0.33,
            max_aspect_ratio: 3.0,
            frame_margin_px: 10.0,
            min_output_side: 100,
            approx_epsilon: 0.02,
            relaxed_epsilons: vec![0.02, 0.03, 0.04, 0.05],
        }
    }
}

impl DetectionConfig {
    /// Absolute candidate area bounds for an image of the given dimensions.
    pub fn area_bounds(&self, img_w: u32, img_h: u32) -> (f64, f64) {
        let image_area = f64::from(img_w) * f64::from(img_h);
        (
            image_area * self.min_area_ratio,
            image_area * self.max_area_ratio,
        )
    }

    /// Whether an aspect ratio (width / height) falls inside the accepted band.
    pub fn aspect_in_band(&self, ratio: f64) -> bool {
        (self.min_aspect_ratio..=self.max_aspect_ratio).contains(&ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_area_bounds_scale_with_image() {
        let config = DetectionConfig::default();
        let (min_area, max_area) = config.area_bounds(1000, 1000);
        assert_eq!(min_area, 100_000.0);
        assert_eq!(max_area, 950_000.0);
    }

    #[test]
    fn aspect_band_is_inclusive() {
        let config = DetectionConfig::default();
        assert!(config.aspect_in_band(0.33));
        assert!(config.aspect_in_band(3.0));
        assert!(config.aspect_in_band(1.414));
        assert!(!config.aspect_in_band(0.32));
        assert!(!config.aspect_in_band(3.01));
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = DetectionConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: DetectionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.min_area_ratio, config.min_area_ratio);
        assert_eq!(back.relaxed_epsilons, config.relaxed_epsilons);
    }
}
