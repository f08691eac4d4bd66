/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Configuration for overlap detection.
//!
//! Options have defaults matching the reference behaviour
//! (element-start comparison, hash membership) and can be overridden
//! from environment variables or merged with explicitly set values.

use std::env;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Environment variable selecting [`Semantics`].
pub const SEMANTICS_ENV: &str = "STRIDE_OVERLAP_SEMANTICS";

/// Environment variable selecting [`Membership`].
pub const MEMBERSHIP_ENV: &str = "STRIDE_OVERLAP_MEMBERSHIP";

/// What it means for two views to share memory.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Semantics {
    /// Two views overlap iff some element-start address is addressed
    /// by both. Elements of different widths that intersect without
    /// sharing a start address are reported as disjoint.
    #[default]
    ElementStart,

    /// Two views overlap iff some `[addr, addr + item_size)` byte
    /// range of one intersects a byte range of the other.
    ByteRange,
}

/// Lookup structure built over the smaller operand.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Membership {
    /// `HashSet` lookups, O(1) average per probe.
    #[default]
    Hash,

    /// Sorted, deduplicated vector with binary search.
    Sorted,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized {what}: {value:?}")]
pub struct ParseOptionError {
    what: &'static str,
    value: String,
}

impl FromStr for Semantics {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "element" | "element_start" | "element-start" => Ok(Semantics::ElementStart),
            "byte" | "byte_range" | "byte-range" => Ok(Semantics::ByteRange),
            _ => Err(ParseOptionError {
                what: "overlap semantics",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Semantics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Semantics::ElementStart => f.write_str("element_start"),
            Semantics::ByteRange => f.write_str("byte_range"),
        }
    }
}

impl FromStr for Membership {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hash" => Ok(Membership::Hash),
            "sorted" => Ok(Membership::Sorted),
            _ => Err(ParseOptionError {
                what: "membership strategy",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Membership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Membership::Hash => f.write_str("hash"),
            Membership::Sorted => f.write_str("sorted"),
        }
    }
}

/// Options controlling [`crate::overlaps_with`].
///
/// `None` fields fall back to the defaults; keeping them optional
/// lets [`OverlapOpts::merge`] tell an explicit setting from an
/// inherited one.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlapOpts {
    pub semantics: Option<Semantics>,
    pub membership: Option<Membership>,
}

impl OverlapOpts {
    /// Byte-range comparison with the default membership strategy.
    pub fn byte_range() -> Self {
        Self {
            semantics: Some(Semantics::ByteRange),
            ..Self::default()
        }
    }

    pub fn with_membership(self, membership: Membership) -> Self {
        Self {
            membership: Some(membership),
            ..self
        }
    }

    /// Effective semantics.
    pub fn semantics(&self) -> Semantics {
        self.semantics.unwrap_or_default()
    }

    /// Effective membership strategy.
    pub fn membership(&self) -> Membership {
        self.membership.unwrap_or_default()
    }

    /// Load options from environment variables. Unparseable values
    /// are ignored.
    pub fn from_env() -> Self {
        Self {
            semantics: parse_env(SEMANTICS_ENV),
            membership: parse_env(MEMBERSHIP_ENV),
        }
    }

    /// Merge with another set of options, with the other taking
    /// precedence where it is set.
    pub fn merge(&mut self, other: &OverlapOpts) {
        if other.semantics.is_some() {
            self.semantics = other.semantics;
        }
        if other.membership.is_some() {
            self.membership = other.membership;
        }
    }
}

fn parse_env<T>(name: &str) -> Option<T>
where
    T: FromStr<Err = ParseOptionError>,
{
    let val = env::var(name).ok()?;
    match val.parse() {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            tracing::warn!("ignoring {}: {}", name, err);
            None
        }
    }
}
