// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Paperlift.

use thiserror::Error;

/// Top-level error type for all Paperlift operations.
///
/// The absence of a document in an image is *not* an error — it is reported
/// through `DetectionResult::NotFound`. Errors here cover the two remaining
/// outcome kinds a caller must distinguish: input that cannot enter the
/// pipeline at all, and internal computation faults that should not occur
/// when the shape invariants hold.
#[derive(Debug, Error)]
pub enum PaperliftError {
    /// The supplied image is empty or could not be decoded. Surfaced before
    /// any pipeline stage runs.
    #[error("invalid input image: {0}")]
    InvalidInput(String),

    /// An unexpected computation fault, e.g. a perspective transform solve
    /// failing on a degenerate corner configuration that evaded validation.
    /// Fatal to the single invocation only.
    #[error("internal detection fault: {0}")]
    Internal(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PaperliftError>;
