/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Human-readable durations.

use std::time::Duration;

use clap::ValueEnum;

/// A unit elapsed times can be reported in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum TimeUnit {
    #[value(name = "d")]
    Days,
    #[value(name = "h")]
    Hours,
    #[value(name = "min")]
    Minutes,
    #[value(name = "s")]
    Seconds,
    #[value(name = "ms")]
    Millis,
    #[value(name = "us")]
    Micros,
    #[value(name = "ns")]
    Nanos,
}

impl TimeUnit {
    const ALL: [TimeUnit; 7] = [
        TimeUnit::Days,
        TimeUnit::Hours,
        TimeUnit::Minutes,
        TimeUnit::Seconds,
        TimeUnit::Millis,
        TimeUnit::Micros,
        TimeUnit::Nanos,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TimeUnit::Days => "d",
            TimeUnit::Hours => "h",
            TimeUnit::Minutes => "min",
            TimeUnit::Seconds => "s",
            TimeUnit::Millis => "ms",
            TimeUnit::Micros => "μs",
            TimeUnit::Nanos => "ns",
        }
    }

    fn nanos(&self) -> u128 {
        match self {
            TimeUnit::Days => 86_400 * 1_000_000_000,
            TimeUnit::Hours => 3_600 * 1_000_000_000,
            TimeUnit::Minutes => 60 * 1_000_000_000,
            TimeUnit::Seconds => 1_000_000_000,
            TimeUnit::Millis => 1_000_000,
            TimeUnit::Micros => 1_000,
            TimeUnit::Nanos => 1,
        }
    }
}

/// Formats `elapsed`.
///
/// With a fixed `unit` the whole duration is expressed as a truncated
/// count of that unit (`"12 ms"`). Without one it is decomposed into
/// every non-zero unit from days down to nanoseconds
/// (`"1 s 250 ms 3 ns"`). `with_unit = false` drops the labels, which
/// is what the CSV sweeps want.
pub fn format_duration(elapsed: Duration, unit: Option<TimeUnit>, with_unit: bool) -> String {
    let render = |value: u128, unit: TimeUnit| {
        if with_unit {
            format!("{} {}", value, unit.label())
        } else {
            value.to_string()
        }
    };

    let total = elapsed.as_nanos();
    match unit {
        Some(unit) => render(total / unit.nanos(), unit),
        None => {
            let mut rest = total;
            let parts: Vec<String> = TimeUnit::ALL
                .iter()
                .filter_map(|&unit| {
                    let value = rest / unit.nanos();
                    rest %= unit.nanos();
                    (value > 0).then(|| render(value, unit))
                })
                .collect();
            if parts.is_empty() {
                render(0, TimeUnit::Nanos)
            } else {
                parts.join(" ")
            }
        }
    }
}
