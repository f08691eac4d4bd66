/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Overlap detection by enumerate-and-intersect.
//!
//! The smaller operand is materialized into a lookup structure and
//! the larger one is streamed against it, stopping at the first
//! shared address. Time is O(|A| + |B|) with hash lookups and
//! O((|A| + |B|) log min(|A|, |B|)) with sorted lookups; space is
//! O(min(|A|, |B|)).
//!
//! Two cheap checks run first and can only ever produce `false`: an
//! empty operand, and operands whose address intervals are disjoint.

use std::collections::HashSet;

use crate::affine::AffineMap;
use crate::config::Membership;
use crate::config::OverlapOpts;
use crate::config::Semantics;
use crate::enumerate::addresses;
use crate::error::OverlapError;
use crate::view::View;

/// Whether `a` and `b` share an element-start address, using the
/// default [`OverlapOpts`].
pub fn overlaps(a: &View, b: &View) -> Result<bool, OverlapError> {
    overlaps_with(a, b, &OverlapOpts::default())
}

/// Whether `a` and `b` address common memory under `opts`.
///
/// The verdict is symmetric in `a` and `b` and independent of the
/// traversal order of either view. An [`OverlapError::AddressOverflow`]
/// in either operand is returned rather than guessed around.
pub fn overlaps_with(a: &View, b: &View, opts: &OverlapOpts) -> Result<bool, OverlapError> {
    if a.is_empty() || b.is_empty() {
        tracing::trace!("empty operand, no overlap");
        return Ok(false);
    }

    let semantics = opts.semantics();
    let (Some(bounds_a), Some(bounds_b)) = (a.address_bounds()?, b.address_bounds()?) else {
        return Ok(false);
    };
    if !intervals_intersect(
        span(bounds_a, a.item_size(), semantics),
        span(bounds_b, b.item_size(), semantics),
    ) {
        tracing::trace!(?bounds_a, ?bounds_b, "disjoint address intervals");
        return Ok(false);
    }

    let (small, large) = if a.num_elements() <= b.num_elements() {
        (a, b)
    } else {
        (b, a)
    };
    let found = match (semantics, opts.membership()) {
        (Semantics::ElementStart, Membership::Hash) => {
            shares_address::<HashSet<u64>>(small, large)?
        }
        (Semantics::ElementStart, Membership::Sorted) => {
            shares_address::<SortedAddresses>(small, large)?
        }
        (Semantics::ByteRange, _) => shares_bytes(small, large)?,
    };

    tracing::debug!(
        small = small.num_elements(),
        large = large.num_elements(),
        %semantics,
        found,
        "overlap test"
    );
    Ok(found)
}

// Closed byte interval covered by a view under `semantics`. Ends are
// u128 so that an element ending exactly at the top of the address
// space is representable.
fn span((lo, hi): (u64, u64), item_size: usize, semantics: Semantics) -> (u128, u128) {
    match semantics {
        Semantics::ElementStart => (lo as u128, hi as u128),
        Semantics::ByteRange => (lo as u128, hi as u128 + item_size as u128 - 1),
    }
}

fn intervals_intersect((lo_a, hi_a): (u128, u128), (lo_b, hi_b): (u128, u128)) -> bool {
    lo_a <= hi_b && lo_b <= hi_a
}

/// A set of addresses that can be probed for membership.
trait AddressSet: FromIterator<u64> {
    fn contains_address(&self, addr: u64) -> bool;
}

impl AddressSet for HashSet<u64> {
    fn contains_address(&self, addr: u64) -> bool {
        self.contains(&addr)
    }
}

/// Sorted, deduplicated addresses probed by binary search.
struct SortedAddresses(Vec<u64>);

impl FromIterator<u64> for SortedAddresses {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        let mut addrs: Vec<u64> = iter.into_iter().collect();
        addrs.sort_unstable();
        addrs.dedup();
        SortedAddresses(addrs)
    }
}

impl AddressSet for SortedAddresses {
    fn contains_address(&self, addr: u64) -> bool {
        self.0.binary_search(&addr).is_ok()
    }
}

fn shares_address<S: AddressSet>(small: &View, large: &View) -> Result<bool, OverlapError> {
    let set: S = addresses(small)?.collect();
    Ok(addresses(large)?.any(|addr| set.contains_address(addr)))
}

/// Disjoint, sorted half-open byte intervals `[start, end)`.
struct ByteRanges(Vec<(u128, u128)>);

impl ByteRanges {
    fn of(view: &View) -> Result<Self, OverlapError> {
        let width = view.item_size() as u128;
        let mut ranges: Vec<(u128, u128)> = addresses(view)?
            .map(|addr| (addr as u128, addr as u128 + width))
            .collect();
        ranges.sort_unstable();

        let mut merged: Vec<(u128, u128)> = Vec::with_capacity(ranges.len());
        for (start, end) in ranges {
            match merged.last_mut() {
                Some(last) if start <= last.1 => last.1 = last.1.max(end),
                _ => merged.push((start, end)),
            }
        }
        Ok(ByteRanges(merged))
    }

    // The only candidate is the last interval starting before `end`:
    // every earlier one ends before that one begins.
    fn intersects(&self, start: u128, end: u128) -> bool {
        let idx = self.0.partition_point(|&(s, _)| s < end);
        idx > 0 && self.0[idx - 1].1 > start
    }
}

fn shares_bytes(small: &View, large: &View) -> Result<bool, OverlapError> {
    let ranges = ByteRanges::of(small)?;
    let width = large.item_size() as u128;
    Ok(addresses(large)?.any(|addr| ranges.intersects(addr as u128, addr as u128 + width)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::Range;

    fn all_opts() -> Vec<OverlapOpts> {
        vec![
            OverlapOpts::default(),
            OverlapOpts::default().with_membership(Membership::Sorted),
            OverlapOpts::byte_range(),
        ]
    }

    #[test]
    fn test_odd_even_disjoint() {
        let x = View::row_major(0, vec![6], 1).unwrap();
        let a = x.slice(0, Range(0, None, 2)).unwrap();
        let b = x.slice(0, Range(1, None, 2)).unwrap();
        for opts in all_opts() {
            assert!(!overlaps_with(&a, &b, &opts).unwrap(), "{:?}", opts);
        }
    }

    #[test]
    fn test_interleaved_2d() {
        let a = View::new(0, vec![4, 3], vec![16, 3], 1).unwrap();
        let b = View::new(8, vec![2, 4], vec![40, 2], 1).unwrap();
        for opts in all_opts() {
            assert!(overlaps_with(&a, &b, &opts).unwrap(), "{:?}", opts);
            assert!(overlaps_with(&b, &a, &opts).unwrap(), "{:?}", opts);
        }
    }

    #[test]
    fn test_empty_never_overlaps() {
        let e = View::new(0, vec![4, 0], vec![1, 1], 1).unwrap();
        let x = View::row_major(0, vec![16], 1).unwrap();
        assert!(!overlaps(&e, &x).unwrap());
        assert!(!overlaps(&x, &e).unwrap());
        assert!(!overlaps(&e, &e).unwrap());
    }

    #[test]
    fn test_empty_short_circuits_before_overflow() {
        // The other operand would overflow, but is never enumerated.
        let e = View::new(0, vec![0], vec![1], 1).unwrap();
        let bad = View::new(u64::MAX, vec![4], vec![1], 1).unwrap();
        assert!(!overlaps(&e, &bad).unwrap());
    }

    #[test]
    fn test_scalar() {
        let s = View::scalar(64, 8).unwrap();
        let t = View::scalar(64, 8).unwrap();
        let u = View::scalar(72, 8).unwrap();
        assert!(overlaps(&s, &t).unwrap());
        assert!(!overlaps(&s, &u).unwrap());

        let row = View::row_major(0, vec![16], 8).unwrap();
        assert!(overlaps(&s, &row).unwrap());
    }

    #[test]
    fn test_self_overlap() {
        let broadcast = View::new(32, vec![5, 3], vec![0, 4], 4).unwrap();
        assert!(overlaps(&broadcast, &broadcast).unwrap());
    }

    #[test]
    fn test_reversed_operand() {
        let x = View::row_major(0, vec![7, 8], 1).unwrap();
        let a = x.slices([Range(0, None, 2), Range(0, None, 3)]).unwrap();
        let b = x.slices([Range(1, None, 5), Range(0, None, 2)]).unwrap();
        let b_rev = b.flip(0).unwrap().flip(1).unwrap();
        assert_eq!(overlaps(&a, &b).unwrap(), overlaps(&a, &b_rev).unwrap());
    }

    #[test]
    fn test_element_start_vs_byte_range() {
        // Four u32 elements at 0, 4, 8, 12 and four u8 elements at
        // 1, 5, 9, 13: the bytes intersect but no start is shared.
        let wide = View::row_major(0, vec![4], 4).unwrap();
        let narrow = View::new(1, vec![4], vec![4], 1).unwrap();
        assert!(!overlaps(&wide, &narrow).unwrap());
        assert!(overlaps_with(&wide, &narrow, &OverlapOpts::byte_range()).unwrap());
        assert!(overlaps_with(&narrow, &wide, &OverlapOpts::byte_range()).unwrap());
    }

    #[test]
    fn test_byte_range_adjacent_is_disjoint() {
        // [0, 8) and [8, 16) touch but do not intersect.
        let a = View::scalar(0, 8).unwrap();
        let b = View::scalar(8, 8).unwrap();
        assert!(!overlaps_with(&a, &b, &OverlapOpts::byte_range()).unwrap());

        let c = View::scalar(7, 1).unwrap();
        assert!(overlaps_with(&a, &c, &OverlapOpts::byte_range()).unwrap());
    }

    #[test]
    fn test_byte_range_top_of_address_space() {
        let top = View::scalar(u64::MAX, 1).unwrap();
        let wide = View::scalar(u64::MAX - 3, 4).unwrap();
        assert!(overlaps_with(&top, &wide, &OverlapOpts::byte_range()).unwrap());
        assert!(!overlaps(&top, &wide).unwrap());
    }

    #[test]
    fn test_interleaved_rows_within_bounds() {
        // Bounds intersect but the lattices never meet.
        let a = View::new(0, vec![10], vec![4], 1).unwrap();
        let b = View::new(2, vec![10], vec![4], 1).unwrap();
        for opts in all_opts() {
            assert!(!overlaps_with(&a, &b, &opts).unwrap(), "{:?}", opts);
        }
    }

    #[test]
    fn test_overflow_is_surfaced() {
        let ok = View::row_major(0, vec![4], 1).unwrap();
        let bad = View::new(2, vec![4], vec![-1], 1).unwrap();
        assert_eq!(
            overlaps(&ok, &bad),
            Err(OverlapError::AddressOverflow { base: 2, offset: -3 })
        );
        assert_eq!(
            overlaps(&bad, &ok),
            Err(OverlapError::AddressOverflow { base: 2, offset: -3 })
        );
    }
}
