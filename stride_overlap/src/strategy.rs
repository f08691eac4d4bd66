/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Property-based generators for [`View`]s.
//!
//! These strategies are used in `proptest`-based tests to construct
//! randomized views for testing enumeration and overlap detection.
//!
//! Two families are provided:
//!
//! - [`gen_view`] produces arbitrary geometry: any rank up to 3, any
//!   small signed strides (including zero), any element width. These
//!   views self-alias freely and rarely overlap each other.
//! - [`gen_derived_view`] produces views the way an array library
//!   would, by slicing and reversing a shared row-major buffer. Pairs
//!   drawn from it overlap often, which keeps the `true` branch of the
//!   detector exercised.
//!
//! This module is only included in test builds (`#[cfg(test)]`).

use proptest::prelude::*;

use crate::Range;
use crate::View;

/// Base address of generated views. High enough that no generated
/// negative stride can reach below zero.
const BASE: u64 = 0x1000;

/// Shape of the buffer [`gen_derived_view`] slices into.
const BUFFER: &[usize] = &[6, 5, 4];

/// Arbitrary view geometry of rank `0..=3`.
pub fn gen_view() -> BoxedStrategy<View> {
    (0usize..=3)
        .prop_flat_map(|ndim| {
            (
                prop::collection::vec(0usize..5, ndim),
                prop::collection::vec(-12i64..=12, ndim),
                prop::sample::select(vec![1usize, 2, 4, 8]),
                BASE..BASE + 256,
            )
        })
        .prop_map(|(shape, strides, item_size, base)| {
            View::new(base, shape, strides, item_size).unwrap()
        })
        .boxed()
}

/// A view obtained by slicing and optionally reversing each
/// dimension of a shared row-major buffer with `item_size`-byte
/// elements.
pub fn gen_derived_view(item_size: usize) -> BoxedStrategy<View> {
    let dim = (0usize..7, prop::option::of(0usize..7), 1usize..4, any::<bool>());
    prop::collection::vec(dim, BUFFER.len())
        .prop_map(move |dims| {
            let mut view = View::row_major(BASE, BUFFER.to_vec(), item_size).unwrap();
            for (d, (start, stop, step, reverse)) in dims.into_iter().enumerate() {
                view = view.slice(d, Range(start, stop, step)).unwrap();
                if reverse {
                    view = view.flip(d).unwrap();
                }
            }
            view
        })
        .boxed()
}

mod tests {
    use std::collections::BTreeSet;

    use proptest::strategy::ValueTree;
    use proptest::test_runner::Config;
    use proptest::test_runner::TestRunner;

    use super::*;
    use crate::Membership;
    use crate::OverlapOpts;
    use crate::enumerate;
    use crate::overlaps;
    use crate::overlaps_with;

    fn address_set(view: &View) -> BTreeSet<u64> {
        enumerate(view).unwrap().into_iter().collect()
    }

    // Reference verdict: intersect the full address sets.
    fn reference(a: &View, b: &View) -> bool {
        !address_set(a).is_disjoint(&address_set(b))
    }

    #[test]
    fn sample_many() {
        let mut runner = TestRunner::new(Config::default());

        for _ in 0..64 {
            let view = gen_derived_view(2).new_tree(&mut runner).unwrap().current();
            assert_eq!(view.ndim(), BUFFER.len());
            println!("{}", view);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256, ..ProptestConfig::default()
        })]

        #[test]
        fn enumeration_size(v in gen_view()) {
            prop_assert_eq!(enumerate(&v).unwrap().len(), v.num_elements());
        }

        #[test]
        fn symmetry(a in gen_view(), b in gen_view()) {
            prop_assert_eq!(overlaps(&a, &b).unwrap(), overlaps(&b, &a).unwrap());
        }

        #[test]
        fn reflexivity(a in gen_view()) {
            prop_assume!(!a.is_empty());
            prop_assert!(overlaps(&a, &a).unwrap());
        }

        #[test]
        fn emptiness(a in gen_view(), b in gen_view(), k in any::<prop::sample::Index>()) {
            if a.ndim() == 0 {
                return Ok(());
            }
            let mut shape = a.shape().to_vec();
            shape[k.index(a.ndim())] = 0;
            let empty = View::new(a.base_address(), shape, a.strides().to_vec(), a.item_size())
                .unwrap();
            prop_assert!(!overlaps(&empty, &b).unwrap());
            prop_assert!(!overlaps(&b, &empty).unwrap());
            prop_assert!(!overlaps(&empty, &empty).unwrap());
        }

        #[test]
        fn agrees_with_reference(a in gen_derived_view(2), b in gen_derived_view(2)) {
            prop_assert_eq!(overlaps(&a, &b).unwrap(), reference(&a, &b));
        }

        #[test]
        fn arbitrary_agrees_with_reference(a in gen_view(), b in gen_view()) {
            prop_assert_eq!(overlaps(&a, &b).unwrap(), reference(&a, &b));
        }

        #[test]
        fn membership_strategies_agree(a in gen_derived_view(4), b in gen_derived_view(4)) {
            let sorted = OverlapOpts::default().with_membership(Membership::Sorted);
            prop_assert_eq!(
                overlaps(&a, &b).unwrap(),
                overlaps_with(&a, &b, &sorted).unwrap()
            );
        }

        #[test]
        fn flip_preserves_verdict(
            a in gen_derived_view(1),
            b in gen_derived_view(1),
            dim in 0usize..3
        ) {
            let flipped = b.flip(dim).unwrap();
            prop_assert_eq!(address_set(&b), address_set(&flipped));
            prop_assert_eq!(overlaps(&a, &b).unwrap(), overlaps(&a, &flipped).unwrap());
        }

        // A shared start address is always a shared byte.
        #[test]
        fn byte_range_is_weaker(a in gen_view(), b in gen_view()) {
            if overlaps(&a, &b).unwrap() {
                prop_assert!(overlaps_with(&a, &b, &OverlapOpts::byte_range()).unwrap());
            }
        }

        // With equal element widths on a common grid, byte ranges
        // intersect exactly when start addresses coincide.
        #[test]
        fn byte_range_matches_on_common_grid(
            a in gen_derived_view(8),
            b in gen_derived_view(8)
        ) {
            prop_assert_eq!(
                overlaps(&a, &b).unwrap(),
                overlaps_with(&a, &b, &OverlapOpts::byte_range()).unwrap()
            );
        }
    }
}
