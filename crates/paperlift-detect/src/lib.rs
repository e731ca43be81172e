// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// paperlift-detect — Document boundary detection and perspective
// rectification for photographed pages.
//
// The pipeline runs strictly forward: preprocessing (grayscale, CLAHE,
// smoothing), binary map extraction (Canny edge maps plus an on-demand Otsu
// threshold map), a four-strategy candidate search, shape validation, and
// finally a perspective warp into an upright output image.

pub mod candidates;
pub mod detector;
pub mod maps;
pub mod preprocess;
pub mod rectify;
pub mod validate;

// Re-export the primary entry points so callers can use
// `paperlift_detect::DocumentDetector` etc.
pub use detector::{DetectionResult, DocumentDetector};
pub use paperlift_core::{CanonicalQuad, DetectionConfig, PaperliftError, Quad, SearchStrategy};
