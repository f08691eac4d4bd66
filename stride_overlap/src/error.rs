/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use thiserror::Error;

/// Structural problems with a view's geometry. These are programming
/// errors on the caller's side: nothing here is recovered from or
/// compensated for.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidView {
    #[error("rank mismatch: shape has {shape} dims, strides has {strides}")]
    RankMismatch { shape: usize, strides: usize },

    #[error("negative extent {extent} in dimension {dim}")]
    NegativeExtent { dim: usize, extent: i64 },

    #[error("item size must be positive, got {item_size}")]
    NonPositiveItemSize { item_size: i64 },

    #[error("dimension {dim} out of range for a view of rank {ndim}")]
    DimOutOfRange { dim: usize, ndim: usize },

    #[error("slice step must be positive")]
    ZeroStep,

    #[error("element count mismatch: expected {expected}, got {got}")]
    ElementCountMismatch { expected: usize, got: usize },

    #[error("view is not contiguous in row-major order")]
    NotContiguous,

    #[error("arithmetic overflow while deriving view geometry")]
    Overflow,
}

/// Errors surfaced by address enumeration and overlap detection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OverlapError {
    #[error("invalid view: {0}")]
    InvalidView(#[from] InvalidView),

    #[error("invalid dims: expected {expected}, got {got}")]
    InvalidDims { expected: usize, got: usize },

    #[error("index {index} out of range {size} in dimension {dim}")]
    IndexOutOfRange {
        dim: usize,
        index: usize,
        size: usize,
    },

    /// An element address falls outside `0..=u64::MAX`. Wrapping
    /// would silently change the verdict, so we refuse instead.
    #[error("address overflow: base {base:#x} offset by {offset}")]
    AddressOverflow { base: u64, offset: i128 },
}
