/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Deriving views from views.
//!
//! These are the geometric operations an array library performs when
//! it slices, reverses or reshapes an array without copying: each
//! produces a new [`View`] over the same buffer by adjusting the base
//! address and strides. They are how callers (and the tests) build
//! the operands handed to [`crate::overlaps`].
//!
//! ```text
//! x = row_major(0, [7, 8], 1)
//! x.slice(0, 0::2)  -> base 0, shape [4, 8], strides [16, 1]
//! x.flip(1)         -> base 7, shape [7, 8], strides [8, -1]
//! ```

use crate::error::InvalidView;
use crate::range::Range;
use crate::view::View;

/// Memory layout order used to compute strides of contiguous views.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Order {
    /// Row-major layout (C-style): last index varies fastest.
    RowMajor,

    /// Column-major layout (Fortran-style): first index varies
    /// fastest.
    ColumnMajor,
}

/// Byte strides of a dense layout of `shape` in the given order.
pub fn dense_strides(
    shape: &[usize],
    item_size: usize,
    order: Order,
) -> Result<Vec<i64>, InvalidView> {
    let mut strides = vec![0i64; shape.len()];
    let mut step = i64::try_from(item_size).map_err(|_| InvalidView::Overflow)?;
    let dims: Box<dyn Iterator<Item = usize>> = match order {
        Order::RowMajor => Box::new((0..shape.len()).rev()),
        Order::ColumnMajor => Box::new(0..shape.len()),
    };
    for dim in dims {
        strides[dim] = step;
        let extent = i64::try_from(shape[dim]).map_err(|_| InvalidView::Overflow)?;
        step = step.checked_mul(extent).ok_or(InvalidView::Overflow)?;
    }
    Ok(strides)
}

impl View {
    /// A dense view of `shape` starting at `base_address`.
    pub fn contiguous(
        base_address: u64,
        shape: Vec<usize>,
        item_size: usize,
        order: Order,
    ) -> Result<Self, InvalidView> {
        let strides = dense_strides(&shape, item_size, order)?;
        View::new(base_address, shape, strides, item_size)
    }

    /// Restricts dimension `dim` to `range`, the equivalent of
    /// `x[..., start:stop:step, ...]`.
    pub fn slice<R: Into<Range>>(&self, dim: usize, range: R) -> Result<Self, InvalidView> {
        self.check_dim(dim)?;
        let range: Range = range.into();
        let (begin, len, step) = range.resolve(self.shape()[dim])?;
        let stride = self.strides()[dim];

        let mut shape = self.shape().to_vec();
        let mut strides = self.strides().to_vec();
        shape[dim] = len;
        strides[dim] = i64::try_from(step)
            .ok()
            .and_then(|step| stride.checked_mul(step))
            .ok_or(InvalidView::Overflow)?;

        let base = if len == 0 {
            self.base_address()
        } else {
            shift(self.base_address(), begin, stride)?
        };
        View::new(base, shape, strides, self.item_size())
    }

    /// Applies `ranges` to the leading dimensions, one range per
    /// dimension, like `x[r0, r1, ...]`.
    pub fn slices<R, I>(&self, ranges: I) -> Result<Self, InvalidView>
    where
        R: Into<Range>,
        I: IntoIterator<Item = R>,
    {
        ranges
            .into_iter()
            .enumerate()
            .try_fold(self.clone(), |view, (dim, range)| view.slice(dim, range))
    }

    /// Reverses dimension `dim`, the equivalent of `x[..., ::-1, ...]`.
    /// The base moves to the last element along `dim` and the stride
    /// changes sign, so the addressed set is unchanged.
    pub fn flip(&self, dim: usize) -> Result<Self, InvalidView> {
        self.check_dim(dim)?;
        let extent = self.shape()[dim];
        let stride = self.strides()[dim];

        let mut strides = self.strides().to_vec();
        strides[dim] = stride.checked_neg().ok_or(InvalidView::Overflow)?;

        let base = if extent == 0 || self.is_empty() {
            self.base_address()
        } else {
            shift(self.base_address(), extent - 1, stride)?
        };
        View::new(base, self.shape().to_vec(), strides, self.item_size())
    }

    /// Reinterprets a dense row-major view with a new shape of the
    /// same element count.
    pub fn reshape(&self, shape: Vec<usize>) -> Result<Self, InvalidView> {
        let expected = self.num_elements();
        let got = shape
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n))
            .ok_or(InvalidView::Overflow)?;
        if got != expected {
            return Err(InvalidView::ElementCountMismatch { expected, got });
        }
        if !self.is_row_major_contiguous() {
            return Err(InvalidView::NotContiguous);
        }
        View::row_major(self.base_address(), shape, self.item_size())
    }

    /// Whether the view is dense in row-major order. Dimensions of
    /// extent 1 do not constrain their stride.
    pub fn is_row_major_contiguous(&self) -> bool {
        if self.is_empty() {
            return true;
        }
        let mut expected = self.item_size() as i128;
        for (&extent, &stride) in self.shape().iter().zip(self.strides()).rev() {
            if extent == 1 {
                continue;
            }
            if stride as i128 != expected {
                return false;
            }
            expected *= extent as i128;
        }
        true
    }

    fn check_dim(&self, dim: usize) -> Result<(), InvalidView> {
        if dim >= self.ndim() {
            return Err(InvalidView::DimOutOfRange {
                dim,
                ndim: self.ndim(),
            });
        }
        Ok(())
    }
}

// base + steps × stride, failing rather than wrapping.
fn shift(base: u64, steps: usize, stride: i64) -> Result<u64, InvalidView> {
    let offset = (steps as i128)
        .checked_mul(stride as i128)
        .ok_or(InvalidView::Overflow)?;
    u64::try_from(base as i128 + offset).map_err(|_| InvalidView::Overflow)
}
