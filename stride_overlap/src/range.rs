/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::error::InvalidView;

/// A `start:stop:step` selection along one dimension, with the same
/// clamping rules as a positive-step Python slice. `None` as the stop
/// means "to the end of the dimension".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range(pub usize, pub Option<usize>, pub usize);

impl Range {
    /// Every index of the dimension.
    pub fn all() -> Self {
        Range(0, None, 1)
    }

    /// `self` with its step replaced.
    pub fn step_by(self, step: usize) -> Self {
        Range(self.0, self.1, step)
    }

    /// Resolves the range against a dimension of `size` elements,
    /// returning `(begin, len, step)`.
    pub fn resolve(&self, size: usize) -> Result<(usize, usize, usize), InvalidView> {
        let Range(start, stop, step) = *self;
        if step == 0 {
            return Err(InvalidView::ZeroStep);
        }
        let stop = stop.map_or(size, |stop| stop.min(size));
        let begin = start.min(size);
        let len = if stop > begin {
            (stop - begin).div_ceil(step)
        } else {
            0
        };
        Ok((begin, len, step))
    }
}

impl From<usize> for Range {
    fn from(index: usize) -> Self {
        Range(index, Some(index + 1), 1)
    }
}

impl From<std::ops::Range<usize>> for Range {
    fn from(r: std::ops::Range<usize>) -> Self {
        Range(r.start, Some(r.end), 1)
    }
}

impl From<std::ops::RangeFrom<usize>> for Range {
    fn from(r: std::ops::RangeFrom<usize>) -> Self {
        Range(r.start, None, 1)
    }
}

impl From<std::ops::RangeFull> for Range {
    fn from(_: std::ops::RangeFull) -> Self {
        Range::all()
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.1 {
            Some(stop) => write!(f, "{}:{}:{}", self.0, stop, self.2),
            None => write!(f, "{}::{}", self.0, self.2),
        }
    }
}
