// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preprocessing stage — grayscale conversion, tile-based contrast-limited
// adaptive histogram equalization (CLAHE), and the two smoothed variants the
// edge extractor consumes.

use image::{DynamicImage, GrayImage};
use imageproc::filter::{bilateral_filter, gaussian_blur_f32};
use tracing::{debug, instrument};

/// CLAHE clip limit, as a multiple of the mean histogram bin height.
pub const CLAHE_CLIP_LIMIT: f32 = 2.0;
/// CLAHE tile grid: the image is divided into this many tiles per axis.
pub const CLAHE_TILE_GRID: u32 = 8;
/// Gaussian smoothing sigma (equivalent to a 5x5 kernel).
pub const GAUSSIAN_SIGMA: f32 = 1.1;
/// Bilateral filter window size: full side length, so 9 gives a 9x9 window.
pub const BILATERAL_WINDOW: u32 = 9;
/// Bilateral filter intensity-domain sigma.
pub const BILATERAL_SIGMA_COLOR: f32 = 75.0;
/// Bilateral filter spatial-domain sigma.
pub const BILATERAL_SIGMA_SPATIAL: f32 = 75.0;

/// Output of the preprocessing stage.
///
/// Each buffer is freshly allocated; nothing aliases the input image.
pub struct Preprocessed {
    /// Plain grayscale conversion of the input.
    pub gray: GrayImage,
    /// Contrast-enhanced grayscale (CLAHE), the base for all binary maps.
    pub enhanced: GrayImage,
    /// Gaussian-blurred variant of `enhanced`.
    pub gaussian: GrayImage,
    /// Edge-preserving (bilateral) blurred variant of `enhanced`.
    pub bilateral: GrayImage,
}

/// Run the full preprocessing stage on a decoded image.
///
/// Always succeeds for a non-empty image; emptiness is rejected by the
/// pipeline controller before this stage runs.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn preprocess(image: &DynamicImage) -> Preprocessed {
    let gray = image.to_luma8();
    let enhanced = clahe(&gray, CLAHE_CLIP_LIMIT, CLAHE_TILE_GRID);
    debug!("Contrast enhancement complete");

    let gaussian = gaussian_blur_f32(&enhanced, GAUSSIAN_SIGMA);
    let bilateral = bilateral_filter(
        &enhanced,
        BILATERAL_WINDOW,
        BILATERAL_SIGMA_COLOR,
        BILATERAL_SIGMA_SPATIAL,
    );
    debug!("Smoothing variants complete");

    Preprocessed {
        gray,
        enhanced,
        gaussian,
        bilateral,
    }
}

/// Contrast-limited adaptive histogram equalization.
///
/// The image is divided into a `grid` x `grid` tile lattice. Each tile gets a
/// clipped, redistributed histogram and an equalization lookup table; every
/// pixel is then mapped through a bilinear blend of the four nearest tile
/// tables, which removes the blocking artifacts of per-tile equalization.
///
/// `clip_limit` caps each histogram bin at that multiple of the mean bin
/// height; the clipped excess is spread evenly over all bins, which bounds
/// noise amplification in flat regions.
pub fn clahe(gray: &GrayImage, clip_limit: f32, grid: u32) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return gray.clone();
    }

    let grid = grid.max(1);
    let tiles_x = grid.min(width) as usize;
    let tiles_y = grid.min(height) as usize;
    let tile_w = width as f32 / tiles_x as f32;
    let tile_h = height as f32 / tiles_y as f32;

    // One equalization LUT per tile.
    let mut luts = vec![[0u8; 256]; tiles_x * tiles_y];
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let x0 = (tx as f32 * tile_w) as u32;
            let x1 = (((tx + 1) as f32 * tile_w) as u32).min(width);
            let y0 = (ty as f32 * tile_h) as u32;
            let y1 = (((ty + 1) as f32 * tile_h) as u32).min(height);

            let mut histogram = [0u32; 256];
            for y in y0..y1 {
                for x in x0..x1 {
                    histogram[gray.get_pixel(x, y).0[0] as usize] += 1;
                }
            }
            let tile_pixels = ((x1 - x0) * (y1 - y0)).max(1);

            clip_histogram(&mut histogram, clip_limit, tile_pixels);

            // Cumulative distribution -> LUT.
            let lut = &mut luts[ty * tiles_x + tx];
            let mut cumulative = 0u64;
            for (value, &count) in histogram.iter().enumerate() {
                cumulative += u64::from(count);
                lut[value] = ((cumulative * 255) / u64::from(tile_pixels)) as u8;
            }
        }
    }

    // Bilinear interpolation between the four nearest tile LUTs.
    GrayImage::from_fn(width, height, |x, y| {
        let u = (x as f32 + 0.5) / tile_w - 0.5;
        let v = (y as f32 + 0.5) / tile_h - 0.5;

        let tx0 = (u.floor().max(0.0) as usize).min(tiles_x - 1);
        let ty0 = (v.floor().max(0.0) as usize).min(tiles_y - 1);
        let tx1 = (tx0 + 1).min(tiles_x - 1);
        let ty1 = (ty0 + 1).min(tiles_y - 1);
        let fx = (u - u.floor()).clamp(0.0, 1.0);
        let fy = (v - v.floor()).clamp(0.0, 1.0);

        let value = gray.get_pixel(x, y).0[0] as usize;
        let p00 = f32::from(luts[ty0 * tiles_x + tx0][value]);
        let p10 = f32::from(luts[ty0 * tiles_x + tx1][value]);
        let p01 = f32::from(luts[ty1 * tiles_x + tx0][value]);
        let p11 = f32::from(luts[ty1 * tiles_x + tx1][value]);

        let top = p00 + (p10 - p00) * fx;
        let bottom = p01 + (p11 - p01) * fx;
        let blended = top + (bottom - top) * fy;
        image::Luma([blended.round().clamp(0.0, 255.0) as u8])
    })
}

/// Clip a tile histogram at `clip_limit` times the mean bin height and
/// redistribute the excess evenly over all bins.
fn clip_histogram(histogram: &mut [u32; 256], clip_limit: f32, tile_pixels: u32) {
    let limit = ((clip_limit * tile_pixels as f32 / 256.0) as u32).max(1);

    let mut excess = 0u64;
    for count in histogram.iter_mut() {
        if *count > limit {
            excess += u64::from(*count - limit);
            *count = limit;
        }
    }

    let per_bin = (excess / 256) as u32;
    let mut remainder = (excess % 256) as u32;
    for count in histogram.iter_mut() {
        *count += per_bin;
        if remainder > 0 {
            *count += 1;
            remainder -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn gradient_image(width: u32, height: u32, low: u8, high: u8) -> GrayImage {
        GrayImage::from_fn(width, height, |x, _| {
            let t = x as f32 / (width - 1) as f32;
            Luma([(f32::from(low) + t * f32::from(high - low)) as u8])
        })
    }

    #[test]
    fn preprocess_preserves_dimensions() {
        let img = DynamicImage::ImageLuma8(gradient_image(120, 90, 60, 180));
        let pre = preprocess(&img);
        for buffer in [&pre.gray, &pre.enhanced, &pre.gaussian, &pre.bilateral] {
            assert_eq!(buffer.dimensions(), (120, 90));
        }
    }

    /// CLAHE must widen the value range of a low-contrast image.
    #[test]
    fn clahe_stretches_low_contrast() {
        let img = gradient_image(160, 160, 100, 150);
        let enhanced = clahe(&img, CLAHE_CLIP_LIMIT, CLAHE_TILE_GRID);

        let range = |image: &GrayImage| {
            let (mut lo, mut hi) = (255u8, 0u8);
            for pixel in image.pixels() {
                lo = lo.min(pixel.0[0]);
                hi = hi.max(pixel.0[0]);
            }
            u16::from(hi) - u16::from(lo)
        };

        assert!(
            range(&enhanced) > range(&img),
            "expected contrast stretch, got {} <= {}",
            range(&enhanced),
            range(&img)
        );
    }

    /// The bilateral window spans a full 9x9 neighborhood: a bright block
    /// centred four pixels away must still pull a pixel's value upward.
    #[test]
    fn bilateral_window_covers_nine_by_nine() {
        let mut img = GrayImage::from_pixel(40, 40, Luma([100u8]));
        for y in 19..=21 {
            for x in 19..=21 {
                img.put_pixel(x, y, Luma([200u8]));
            }
        }
        let out = bilateral_filter(
            &img,
            BILATERAL_WINDOW,
            BILATERAL_SIGMA_COLOR,
            BILATERAL_SIGMA_SPATIAL,
        );
        assert!(
            out.get_pixel(24, 20).0[0] > 100,
            "bright block outside a 3x3 window had no influence"
        );
    }

    #[test]
    fn clahe_is_deterministic() {
        let img = gradient_image(64, 64, 40, 220);
        let a = clahe(&img, 2.0, 8);
        let b = clahe(&img, 2.0, 8);
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn clip_histogram_conserves_mass() {
        let mut histogram = [0u32; 256];
        histogram[200] = 4000;
        histogram[10] = 96;
        let total: u64 = histogram.iter().map(|&c| u64::from(c)).sum();

        clip_histogram(&mut histogram, 2.0, 4096);
        let after: u64 = histogram.iter().map(|&c| u64::from(c)).sum();
        assert_eq!(total, after);

        let limit = (2.0 * 4096.0 / 256.0) as u32;
        // The spike is clipped to the limit plus its share of redistribution.
        assert!(histogram[200] < 4000);
        assert!(histogram[200] >= limit);
    }
}
