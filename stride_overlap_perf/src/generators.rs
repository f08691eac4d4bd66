/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Synthetic operands for timing the detector.
//!
//! No memory is allocated: every buffer is a row-major [`View`] at a
//! fixed base address, and operands are derived from it by slicing
//! and reshaping exactly as an array library would.

use clap::ValueEnum;
use stride_overlap::InvalidView;
use stride_overlap::Range;
use stride_overlap::View;

const BASE: u64 = 0x7f00_0000_0000;
const I64: usize = 8;

/// Operand pairs for a sweep, parameterized by `n`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Variant {
    /// `x[1::2]` vs `x[::2]` of an `n`-element buffer.
    NElts,
    /// Every axis of a `[5; n]` buffer sliced `0::2` vs `1::2`.
    NDims,
}

impl Variant {
    /// Header of the first CSV column.
    pub fn axis_title(&self) -> &'static str {
        match self {
            Variant::NElts => "n_elts",
            Variant::NDims => "n_dims",
        }
    }

    pub fn views(&self, n: usize) -> Result<(View, View), InvalidView> {
        match self {
            Variant::NElts => odd_even(n),
            Variant::NDims => high_dim(n),
        }
    }

    /// Default `(min, max, step)` range of `n`.
    pub fn default_range(&self) -> (usize, usize, usize) {
        match self {
            Variant::NElts => (1, 1_000_000, 100_000),
            Variant::NDims => (1, 12, 1),
        }
    }
}

/// Odd and even elements of an `n`-element `i64` buffer. Disjoint
/// for every `n`.
pub fn odd_even(n: usize) -> Result<(View, View), InvalidView> {
    let x = View::row_major(BASE, vec![n], I64)?;
    Ok((x.slice(0, Range(1, None, 2))?, x.slice(0, Range(0, None, 2))?))
}

/// A `[5; n]` `i64` buffer sliced `0::2` and `1::2` along every
/// axis: `3ⁿ` against `2ⁿ` elements, never overlapping.
pub fn high_dim(n: usize) -> Result<(View, View), InvalidView> {
    let len = u32::try_from(n)
        .ok()
        .and_then(|n| 5usize.checked_pow(n))
        .ok_or(InvalidView::Overflow)?;
    let x = View::row_major(BASE, vec![len], I64)?.reshape(vec![5; n])?;
    Ok((
        x.slices(vec![Range(0, None, 2); n])?,
        x.slices(vec![Range(1, None, 2); n])?,
    ))
}

/// A named operand pair with a known verdict.
pub struct Scenario {
    pub name: &'static str,
    pub a: View,
    pub b: View,
    pub expected: bool,
}

/// The fixed scenarios timed by the `scenarios` subcommand.
pub fn scenarios() -> Result<Vec<Scenario>, InvalidView> {
    let all = Range::all;
    let from = |start, step| Range(start, None, step);

    // x = arange(6); x[::2] vs x[1::2]
    let x1 = View::row_major(BASE, vec![6], I64)?;
    // x = arange(7 * 8, int8).reshape(7, 8); x[::2, ::3] vs x[1::5, ::2]
    let x2 = View::row_major(BASE, vec![7, 8], 1)?;
    // x = arange(4 * 20).reshape(4, 20).astype(int8); x[:, ::7] vs x[:, 3::3]
    let x3 = View::row_major(BASE, vec![4, 20], 1)?;
    // x = arange(7 * 8 * 4, int32).reshape(7, 8, 4); x[:, 1::3, :] vs x[1:, 3::4, :]
    let x4 = View::row_major(BASE, vec![7 * 8 * 4], 4)?.reshape(vec![7, 8, 4])?;

    Ok(vec![
        Scenario {
            name: "perf_01",
            a: x1.slice(0, from(0, 2))?,
            b: x1.slice(0, from(1, 2))?,
            expected: false,
        },
        Scenario {
            name: "perf_02",
            a: x2.slices([from(0, 2), from(0, 3)])?,
            b: x2.slices([from(1, 5), from(0, 2)])?,
            expected: true,
        },
        Scenario {
            name: "perf_03",
            a: x3.slices([all(), from(0, 7)])?,
            b: x3.slices([all(), from(3, 3)])?,
            expected: false,
        },
        Scenario {
            name: "perf_04",
            a: x4.slices([all(), from(1, 3), all()])?,
            b: x4.slices([from(1, 1), from(3, 4), all()])?,
            expected: true,
        },
    ])
}
