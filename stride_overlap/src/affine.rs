/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use crate::error::OverlapError;
use crate::view::View;

mod sealed {
    // Only types in this crate can implement the map traits.
    pub trait Sealed {}
}

/// A trait for affine maps from integer coordinates to byte
/// addresses.
///
/// This abstraction captures strided layouts as the affine
/// transformation `f(x) = origin + dot(strides, x)`, with signed
/// strides and an unsigned address space. All arithmetic is carried
/// out in `i128` and only narrowed to `u64` once the result is known
/// to be representable; anything else is an
/// [`OverlapError::AddressOverflow`].
pub trait AffineMap: sealed::Sealed {
    /// Address of the all-zero coordinate.
    fn origin(&self) -> u64;

    /// Extent of each dimension of the domain.
    fn extents(&self) -> &[usize];

    /// Byte step of each dimension.
    fn steps(&self) -> &[i64];

    /// The number of dimensions in the domain of the map.
    fn rank(&self) -> usize {
        self.extents().len()
    }

    /// Maps a multidimensional coordinate to a byte address.
    fn address_of(&self, coord: &[usize]) -> Result<u64, OverlapError> {
        if coord.len() != self.rank() {
            return Err(OverlapError::InvalidDims {
                expected: self.rank(),
                got: coord.len(),
            });
        }
        for (dim, (&index, &size)) in coord.iter().zip(self.extents()).enumerate() {
            if index >= size {
                return Err(OverlapError::IndexOutOfRange { dim, index, size });
            }
        }

        // Dot product ∑ᵢ (strideᵢ × coordᵢ)
        let offset = coord
            .iter()
            .zip(self.steps())
            .try_fold(0i128, |acc, (&i, &s)| {
                (i as i128).checked_mul(s as i128)?.checked_add(acc)
            });
        narrow(self.origin(), offset)
    }

    /// The lowest and highest addresses reached by the map, or `None`
    /// if the domain is empty.
    ///
    /// Every address of the domain lies in this closed interval, so a
    /// successful call proves that no coordinate overflows.
    fn address_bounds(&self) -> Result<Option<(u64, u64)>, OverlapError> {
        if self.extents().contains(&0) {
            return Ok(None);
        }

        let mut lo = Some(0i128);
        let mut hi = Some(0i128);
        for (&size, &stride) in self.extents().iter().zip(self.steps()) {
            let reach = ((size - 1) as i128).checked_mul(stride as i128);
            if stride < 0 {
                lo = lo.zip(reach).and_then(|(lo, r)| lo.checked_add(r));
            } else {
                hi = hi.zip(reach).and_then(|(hi, r)| hi.checked_add(r));
            }
        }
        Ok(Some((narrow(self.origin(), lo)?, narrow(self.origin(), hi)?)))
    }
}

impl sealed::Sealed for View {}

impl AffineMap for View {
    fn origin(&self) -> u64 {
        self.base_address()
    }

    fn extents(&self) -> &[usize] {
        self.shape()
    }

    fn steps(&self) -> &[i64] {
        self.strides()
    }
}

// Narrows `base + offset` to an address. `None` means the offset
// itself was not representable.
fn narrow(base: u64, offset: Option<i128>) -> Result<u64, OverlapError> {
    let overflow = |offset| OverlapError::AddressOverflow { base, offset };
    let offset = offset.ok_or(overflow(i128::MAX))?;
    (base as i128)
        .checked_add(offset)
        .and_then(|addr| u64::try_from(addr).ok())
        .ok_or(overflow(offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reshape::Order;

    #[test]
    fn test_address_of_row_major() {
        let v = View::row_major(0x1000, vec![7, 8, 4], 4).unwrap();
        assert_eq!(v.address_of(&[0, 0, 0]).unwrap(), 0x1000);
        assert_eq!(v.address_of(&[1, 2, 3]).unwrap(), 0x1000 + 128 + 32 + 12);
        assert_eq!(v.rank(), 3);
    }

    #[test]
    fn test_address_of_column_major() {
        let v = View::contiguous(0, vec![3, 4], 1, Order::ColumnMajor).unwrap();
        assert_eq!(v.address_of(&[2, 1]).unwrap(), 5);
    }

    #[test]
    fn test_address_of_negative_stride() {
        let v = View::new(10, vec![3], vec![-5], 1).unwrap();
        assert_eq!(v.address_of(&[2]).unwrap(), 0);
    }

    #[test]
    fn test_address_of_errors() {
        let v = View::row_major(0, vec![2, 3], 1).unwrap();
        assert_eq!(
            v.address_of(&[1]),
            Err(OverlapError::InvalidDims {
                expected: 2,
                got: 1
            })
        );
        assert_eq!(
            v.address_of(&[1, 3]),
            Err(OverlapError::IndexOutOfRange {
                dim: 1,
                index: 3,
                size: 3
            })
        );

        let under = View::new(4, vec![3], vec![-4], 1).unwrap();
        assert_eq!(
            under.address_of(&[2]),
            Err(OverlapError::AddressOverflow { base: 4, offset: -8 })
        );
    }

    #[test]
    fn test_address_bounds() {
        // Mixed signs: min pulls from the negative stride, max from
        // the positive one.
        let v = View::new(100, vec![3, 4], vec![-10, 2], 1).unwrap();
        assert_eq!(v.address_bounds().unwrap(), Some((80, 106)));

        let s = View::scalar(42, 8).unwrap();
        assert_eq!(s.address_bounds().unwrap(), Some((42, 42)));

        let e = View::new(0, vec![0, 4], vec![-1, 1], 1).unwrap();
        assert_eq!(e.address_bounds().unwrap(), None);
    }

    #[test]
    fn test_address_bounds_overflow() {
        let high = View::new(u64::MAX - 1, vec![3], vec![1], 1).unwrap();
        assert_eq!(
            high.address_bounds(),
            Err(OverlapError::AddressOverflow {
                base: u64::MAX - 1,
                offset: 2
            })
        );

        let low = View::new(1, vec![2], vec![-2], 1).unwrap();
        assert_eq!(
            low.address_bounds(),
            Err(OverlapError::AddressOverflow { base: 1, offset: -2 })
        );
    }
}
