/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Memory overlap detection for strided array views.
//!
//! Array libraries need to know whether two views of memory alias
//! before running an in-place or vectorized operation: if they do, the
//! source must be copied first. This crate answers that question for
//! views described by a base address, a shape and signed byte
//! strides.
//!
//! ```
//! use stride_overlap::Range;
//! use stride_overlap::View;
//! use stride_overlap::overlaps;
//!
//! // x = np.arange(6, dtype=np.int8); x[::2] vs x[1::2]
//! let x = View::row_major(0, vec![6], 1).unwrap();
//! let even = x.slice(0, Range(0, None, 2)).unwrap();
//! let odd = x.slice(0, Range(1, None, 2)).unwrap();
//! assert!(!overlaps(&even, &odd).unwrap());
//! assert!(overlaps(&even, &x).unwrap());
//! ```
//!
//! The algorithm enumerates every element address of both operands
//! and intersects the two sets, which is linear in the number of
//! elements and exact for any stride pattern. See [`overlaps_with`]
//! for the available [`Semantics`] and [`Membership`] strategies.

pub mod affine;
pub mod config;
pub mod enumerate;
mod error;
pub mod overlap;
mod range;
pub mod reshape;
mod view;

#[cfg(test)]
mod strategy;

pub use affine::AffineMap;
pub use config::Membership;
pub use config::OverlapOpts;
pub use config::Semantics;
pub use enumerate::Addresses;
pub use enumerate::addresses;
pub use enumerate::enumerate;
pub use enumerate::hex;
pub use error::InvalidView;
pub use error::OverlapError;
pub use overlap::overlaps;
pub use overlap::overlaps_with;
pub use range::Range;
pub use reshape::Order;
pub use view::RawView;
pub use view::View;
