/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Address enumeration.
//!
//! Materializes the element-start address of every element a view
//! addresses. This is the O(elements) part of overlap detection: the
//! cost is one address per element regardless of how the strides
//! relate to each other, which is what lets the detector handle
//! mixed-sign, broadcast and self-aliasing layouts uniformly.

use crate::affine::AffineMap;
use crate::error::OverlapError;
use crate::view::View;

/// Iterator over the element-start addresses of a [`View`], in
/// row-major index order (last dimension fastest).
///
/// Addresses are updated incrementally: stepping dimension `k` adds
/// `strides[k]`, and wrapping it back to zero subtracts
/// `shape[k] × strides[k]`. The iterator is only constructed after
/// [`AffineMap::address_bounds`] succeeds, so every yielded value is a
/// valid `u64`.
#[derive(Debug, Clone)]
pub struct Addresses<'a> {
    view: &'a View,
    index: Vec<usize>,
    cursor: i128,
    remaining: usize,
}

impl Iterator for Addresses<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.remaining == 0 {
            return None;
        }
        let address = self.cursor as u64;
        self.remaining -= 1;

        // Advance the odometer.
        for dim in (0..self.index.len()).rev() {
            let stride = self.view.strides()[dim] as i128;
            self.index[dim] += 1;
            self.cursor += stride;
            if self.index[dim] < self.view.shape()[dim] {
                break;
            }
            self.cursor -= stride * self.index[dim] as i128;
            self.index[dim] = 0;
        }

        Some(address)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Addresses<'_> {}

/// Lazily enumerates the addresses of `view`.
///
/// Fails with [`OverlapError::AddressOverflow`] if any element would
/// lie outside the address space.
pub fn addresses(view: &View) -> Result<Addresses<'_>, OverlapError> {
    let remaining = match view.address_bounds()? {
        Some(_) => view.num_elements(),
        None => 0,
    };
    Ok(Addresses {
        view,
        index: vec![0; view.ndim()],
        cursor: view.base_address() as i128,
        remaining,
    })
}

/// Every element-start address of `view`, one per element.
///
/// The result has exactly `Π shape` entries; duplicates produced by
/// zero or otherwise aliasing strides are kept.
pub fn enumerate(view: &View) -> Result<Vec<u64>, OverlapError> {
    Ok(addresses(view)?.collect())
}

/// Renders addresses as `0x`-prefixed hexadecimal strings.
pub fn hex(addrs: &[u64]) -> Vec<String> {
    addrs.iter().map(|addr| format!("{:#x}", addr)).collect()
}
