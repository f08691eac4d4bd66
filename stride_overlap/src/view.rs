/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Strided views over a byte-addressed buffer.
//!
//! A [`View`] describes which elements of some memory buffer an array
//! addresses, without owning or touching that buffer:
//!
//! ```text
//! address(index) = base_address + Σₖ index[k] × strides[k]
//!     for 0 ≤ index[k] < shape[k]
//! ```
//!
//! Strides are in bytes and signed: a negative stride walks a
//! dimension backwards (reversed views), a zero stride repeats the
//! same element (broadcast views). A view with `ndim == 0` is a
//! scalar addressing exactly `base_address`; a view with any zero
//! extent addresses nothing.
//!
//! Views are validated once, at construction, and immutable after
//! that. The numpy-style derivations (`slice`, `flip`, `reshape`)
//! live in [`crate::reshape`].

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::error::InvalidView;
use crate::reshape::Order;

/// A validated geometric descriptor of a strided array view.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawView")]
pub struct View {
    base_address: u64,
    shape: Vec<usize>,
    strides: Vec<i64>,
    item_size: usize,
}

impl View {
    /// Builds a view from already-extracted geometry.
    ///
    /// Fails if `shape` and `strides` disagree on the number of
    /// dimensions, if `item_size` is zero, or if the element count
    /// does not fit in a `usize`.
    pub fn new(
        base_address: u64,
        shape: Vec<usize>,
        strides: Vec<i64>,
        item_size: usize,
    ) -> Result<Self, InvalidView> {
        if shape.len() != strides.len() {
            return Err(InvalidView::RankMismatch {
                shape: shape.len(),
                strides: strides.len(),
            });
        }
        if item_size == 0 {
            return Err(InvalidView::NonPositiveItemSize { item_size: 0 });
        }
        shape
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n))
            .ok_or(InvalidView::Overflow)?;

        Ok(Self {
            base_address,
            shape,
            strides,
            item_size,
        })
    }

    /// A zero-dimensional view of the single element at `base_address`.
    pub fn scalar(base_address: u64, item_size: usize) -> Result<Self, InvalidView> {
        Self::new(base_address, vec![], vec![], item_size)
    }

    /// A contiguous C-order view, as if `shape` had just been
    /// allocated at `base_address`.
    pub fn row_major(
        base_address: u64,
        shape: Vec<usize>,
        item_size: usize,
    ) -> Result<Self, InvalidView> {
        Self::contiguous(base_address, shape, item_size, Order::RowMajor)
    }

    /// The one-dimensional view covering `data`.
    ///
    /// Only the pointer and length are read; the elements themselves
    /// are never inspected. Zero-sized element types have no
    /// addressable extent and are rejected.
    pub fn from_slice<T>(data: &[T]) -> Result<Self, InvalidView> {
        let item_size = std::mem::size_of::<T>();
        if item_size == 0 {
            return Err(InvalidView::NonPositiveItemSize { item_size: 0 });
        }
        let stride = i64::try_from(item_size).map_err(|_| InvalidView::Overflow)?;
        let base = u64::try_from(data.as_ptr() as usize).map_err(|_| InvalidView::Overflow)?;
        Self::new(base, vec![data.len()], vec![stride], item_size)
    }

    /// Address of the element at the all-zero index.
    pub fn base_address(&self) -> u64 {
        self.base_address
    }

    /// Extent of each dimension.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Byte stride of each dimension.
    pub fn strides(&self) -> &[i64] {
        &self.strides
    }

    /// Width of one element in bytes.
    pub fn item_size(&self) -> usize {
        self.item_size
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Number of addressed elements: the product of the extents, 1
    /// for a scalar and 0 if any extent is 0.
    pub fn num_elements(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.shape.contains(&0)
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "View {{ base={:#x} shape={:?} strides={:?} item={} }}",
            self.base_address, self.shape, self.strides, self.item_size
        )
    }
}

/// The unvalidated form of a [`View`] as it arrives from outside the
/// crate (JSON, command lines). Extents and item size are signed so
/// that malformed input can be reported rather than being
/// unrepresentable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawView {
    pub base_address: u64,
    pub shape: Vec<i64>,
    pub strides: Vec<i64>,
    pub item_size: i64,
}

impl TryFrom<RawView> for View {
    type Error = InvalidView;

    fn try_from(raw: RawView) -> Result<Self, Self::Error> {
        if raw.shape.len() != raw.strides.len() {
            return Err(InvalidView::RankMismatch {
                shape: raw.shape.len(),
                strides: raw.strides.len(),
            });
        }
        let shape = raw
            .shape
            .iter()
            .enumerate()
            .map(|(dim, &extent)| {
                usize::try_from(extent).map_err(|_| InvalidView::NegativeExtent { dim, extent })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let item_size = match usize::try_from(raw.item_size) {
            Ok(size) if size > 0 => size,
            _ => {
                return Err(InvalidView::NonPositiveItemSize {
                    item_size: raw.item_size,
                });
            }
        };
        View::new(raw.base_address, shape, raw.strides, item_size)
    }
}

impl From<View> for RawView {
    fn from(view: View) -> Self {
        RawView {
            base_address: view.base_address,
            shape: view.shape.iter().map(|&n| n as i64).collect(),
            strides: view.strides,
            item_size: view.item_size as i64,
        }
    }
}
