// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rectification — solve the projective transform taking the detected corners
// to an upright rectangle and resample the source image through it.

use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use paperlift_core::error::{PaperliftError, Result};
use paperlift_core::{CanonicalQuad, DetectionConfig};
use tracing::{debug, instrument};

/// Warp the region bounded by `quad` into an upright, axis-aligned image.
///
/// The output dimensions come from the quad's effective edge lengths, floored
/// at `config.min_output_side` per axis. A failed transform solve means the
/// corner configuration was degenerate — the 50 px minimum-side check is
/// supposed to prevent that, so this surfaces as an internal fault rather
/// than a "not found" result.
#[instrument(skip(image, quad, config))]
pub fn rectify(
    image: &DynamicImage,
    quad: &CanonicalQuad,
    config: &DetectionConfig,
) -> Result<DynamicImage> {
    let (out_w, out_h) = quad.output_size(config.min_output_side);

    let src: [(f32, f32); 4] = [
        (quad.tl.x, quad.tl.y),
        (quad.tr.x, quad.tr.y),
        (quad.br.x, quad.br.y),
        (quad.bl.x, quad.bl.y),
    ];
    let dst: [(f32, f32); 4] = [
        (0.0, 0.0),
        (out_w as f32 - 1.0, 0.0),
        (out_w as f32 - 1.0, out_h as f32 - 1.0),
        (0.0, out_h as f32 - 1.0),
    ];

    let projection = Projection::from_control_points(src, dst).ok_or_else(|| {
        PaperliftError::Internal("perspective transform solve failed on degenerate corners".into())
    })?;

    let rgba_input = image.to_rgba8();
    let default_pixel = Rgba([255u8, 255, 255, 255]);
    let mut output = RgbaImage::new(out_w, out_h);
    warp_into(
        &rgba_input,
        &projection,
        Interpolation::Bilinear,
        default_pixel,
        &mut output,
    );

    debug!(out_w, out_h, "Rectification applied");
    Ok(DynamicImage::ImageRgba8(output))
}
