// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline controller — sequences preprocessing, map extraction, candidate
// search, and rectification for a single input image.

use image::DynamicImage;
use paperlift_core::error::{PaperliftError, Result};
use paperlift_core::{DetectionConfig, SearchStrategy};
use tracing::{debug, info, instrument, warn};

use crate::candidates::search;
use crate::maps::edge_maps;
use crate::preprocess::preprocess;
use crate::rectify::rectify;

/// Terminal output of a detection run.
///
/// `NotFound` is a first-class outcome, not an error: many photographs simply
/// contain no document. Callers that need to distinguish bad input or
/// internal faults get those as `Err` from [`DocumentDetector::detect`].
#[derive(Debug)]
pub enum DetectionResult {
    /// A document was found and rectified.
    Found {
        /// The rectified, upright document image.
        image: DynamicImage,
        /// Output width in pixels.
        width: u32,
        /// Output height in pixels.
        height: u32,
        /// Which search strategy produced the winning candidate.
        strategy: SearchStrategy,
    },
    /// No candidate survived the strategy ladder and validation.
    NotFound,
}

impl DetectionResult {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

/// Document boundary detector.
///
/// A stateless service object: construct one with a [`DetectionConfig`] at
/// process start and share it freely — every invocation is an independent,
/// synchronous computation over freshly-allocated buffers, so concurrent
/// calls need no coordination.
#[derive(Debug, Clone, Default)]
pub struct DocumentDetector {
    config: DetectionConfig,
}

impl DocumentDetector {
    /// Create a detector with the default heuristics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detector with custom heuristics.
    pub fn with_config(config: DetectionConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Detect and rectify a document in a decoded image.
    ///
    /// Returns `Ok(DetectionResult::NotFound)` when no document is present,
    /// `Err(PaperliftError::InvalidInput)` for an empty image, and
    /// `Err(PaperliftError::Internal)` only if the perspective solve fails on
    /// a configuration that slipped past validation.
    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    pub fn detect(&self, image: &DynamicImage) -> Result<DetectionResult> {
        let (img_w, img_h) = (image.width(), image.height());
        if img_w == 0 || img_h == 0 {
            return Err(PaperliftError::InvalidInput("image has zero dimensions".into()));
        }

        let pre = preprocess(image);
        let maps = edge_maps(&pre);

        let Some(outcome) = search(&maps, &pre.enhanced, img_w, img_h, &self.config) else {
            info!("No document detected");
            return Ok(DetectionResult::NotFound);
        };

        debug!(strategy = ?outcome.strategy, "Candidate accepted, rectifying");
        let rectified = rectify(image, &outcome.quad, &self.config)?;
        let (width, height) = (rectified.width(), rectified.height());
        info!(width, height, strategy = ?outcome.strategy, "Document detected");

        Ok(DetectionResult::Found {
            image: rectified,
            width,
            height,
            strategy: outcome.strategy,
        })
    }

    /// Decode an encoded image payload (JPEG, PNG, ...) and run detection.
    ///
    /// A convenience for transport collaborators: decode failure maps to
    /// `InvalidInput`, so bad payloads, absent documents, and internal
    /// faults stay distinguishable. Re-encoding the result is the caller's
    /// job.
    #[instrument(skip(self, data), fields(data_len = data.len()))]
    pub fn detect_bytes(&self, data: &[u8]) -> Result<DetectionResult> {
        let image = image::load_from_memory(data).map_err(|err| {
            warn!(%err, "Image payload failed to decode");
            PaperliftError::InvalidInput(format!("failed to decode image: {err}"))
        })?;
        self.detect(&image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    /// Dark background with a filled bright quadrilateral.
    fn scene_with_rect(
        img_w: u32,
        img_h: u32,
        x0: u32,
        y0: u32,
        rect_w: u32,
        rect_h: u32,
    ) -> DynamicImage {
        let mut img = GrayImage::from_pixel(img_w, img_h, Luma([45u8]));
        for y in y0..(y0 + rect_h) {
            for x in x0..(x0 + rect_w) {
                img.put_pixel(x, y, Luma([225u8]));
            }
        }
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn empty_image_is_invalid_input() {
        let detector = DocumentDetector::new();
        let empty = DynamicImage::ImageLuma8(GrayImage::new(0, 0));
        assert!(matches!(
            detector.detect(&empty),
            Err(PaperliftError::InvalidInput(_))
        ));
    }

    #[test]
    fn garbage_bytes_are_invalid_input() {
        let detector = DocumentDetector::new();
        assert!(matches!(
            detector.detect_bytes(b"definitely not an image"),
            Err(PaperliftError::InvalidInput(_))
        ));
    }

    /// A quad covering 5% of a 1000x1000 frame sits below the 10% area
    /// floor: the expected outcome is NotFound, not an error.
    #[test]
    fn five_percent_region_is_not_found() {
        let detector = DocumentDetector::new();
        let scene = scene_with_rect(1000, 1000, 400, 400, 224, 224);
        let result = detector.detect(&scene).unwrap();
        assert!(!result.is_found());
    }

    /// A quad covering 50% of the frame is comfortably inside the bounds
    /// and must be detected.
    #[test]
    fn fifty_percent_region_is_found() {
        let detector = DocumentDetector::new();
        let scene = scene_with_rect(1000, 1000, 146, 146, 707, 707);
        let result = detector.detect(&scene).unwrap();
        assert!(result.is_found());
    }

    /// An un-rotated rectangle occupying ~80% of the frame round-trips with
    /// its aspect ratio preserved within 1%.
    #[test]
    fn axis_aligned_rectangle_preserves_aspect() {
        let detector = DocumentDetector::new();
        let (rect_w, rect_h) = (900u32, 710u32);
        let scene = scene_with_rect(1000, 800, 50, 45, rect_w, rect_h);

        match detector.detect(&scene).unwrap() {
            DetectionResult::Found { width, height, .. } => {
                let detected = f64::from(width) / f64::from(height);
                let expected = f64::from(rect_w) / f64::from(rect_h);
                let drift = (detected - expected).abs() / expected;
                assert!(
                    drift <= 0.01,
                    "aspect drift {drift:.4} exceeds 1% ({width}x{height})"
                );
            }
            DetectionResult::NotFound => panic!("expected a detection"),
        }
    }

    /// Rectified output dimensions always respect the 100 px floor, driven
    /// here through a custom config with a lowered area floor so a small
    /// (but valid) document gets through.
    #[test]
    fn small_document_output_is_floored() {
        let config = DetectionConfig {
            min_area_ratio: 0.01,
            ..DetectionConfig::default()
        };
        let detector = DocumentDetector::with_config(config);
        // 80x60 rectangle in a 400x400 frame: 3% of the area, sides >= 50.
        let scene = scene_with_rect(400, 400, 160, 170, 80, 60);

        match detector.detect(&scene).unwrap() {
            DetectionResult::Found { width, height, .. } => {
                assert!(width >= 100, "width {width} below floor");
                assert!(height >= 100, "height {height} below floor");
            }
            DetectionResult::NotFound => panic!("expected a detection"),
        }
    }
}
