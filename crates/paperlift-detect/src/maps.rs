// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Binary map extraction — three independently parameterized Canny edge maps
// for the main candidate search, and an Otsu threshold map computed on demand
// for the bright-region fallback.

use image::{GrayImage, Luma};
use imageproc::contrast::otsu_level;
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::morphology::{close, dilate, open};
use tracing::{debug, instrument};

use crate::preprocess::Preprocessed;

/// Canny thresholds for the two passes over the Gaussian-blurred variant.
pub const CANNY_GAUSSIAN_PASSES: [(f32, f32); 2] = [(50.0, 150.0), (75.0, 200.0)];
/// Canny thresholds for the pass over the bilateral-blurred variant.
pub const CANNY_BILATERAL_PASS: (f32, f32) = (30.0, 100.0);

/// Compute the three dilated edge maps the candidate search scans.
///
/// Two Canny parameterizations run on the Gaussian-blurred image and one
/// looser pass on the bilateral-blurred image. Each map gets a single 3x3
/// dilation to bridge small gaps in document borders before contour
/// extraction.
#[instrument(skip(pre))]
pub fn edge_maps(pre: &Preprocessed) -> [GrayImage; 3] {
    let (low_a, high_a) = CANNY_GAUSSIAN_PASSES[0];
    let (low_b, high_b) = CANNY_GAUSSIAN_PASSES[1];
    let (low_c, high_c) = CANNY_BILATERAL_PASS;

    let maps = [
        canny(&pre.gaussian, low_a, high_a),
        canny(&pre.gaussian, low_b, high_b),
        canny(&pre.bilateral, low_c, high_c),
    ];
    debug!("Canny passes complete");

    maps.map(|edges| dilate(&edges, Norm::LInf, 1))
}

/// Compute the global-optimal (Otsu) threshold map of the enhanced image.
///
/// Splits the bimodal brightness histogram to separate a light document from
/// a darker background, then runs a 5x5 morphological close and open to fill
/// small gaps and remove speckle noise. Used only by the bright-region
/// fallback strategy, so it is computed lazily by the caller.
#[instrument(skip(enhanced))]
pub fn threshold_map(enhanced: &GrayImage) -> GrayImage {
    let level = otsu_level(enhanced);
    debug!(level, "Otsu threshold computed");

    let (width, height) = enhanced.dimensions();
    let mut binary = GrayImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let value = enhanced.get_pixel(x, y).0[0];
            // otsu_level returns the last value of the dark mode, so the
            // bright side is strictly above it.
            let bit = if value > level { 255u8 } else { 0u8 };
            binary.put_pixel(x, y, Luma([bit]));
        }
    }

    let closed = close(&binary, Norm::LInf, 2);
    open(&closed, Norm::LInf, 2)
}
