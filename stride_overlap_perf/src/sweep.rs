/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Timing runs. Every report is written to a caller-supplied sink;
//! nothing here touches stdout directly.

use std::fs::File;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use std::time::Instant;

use anyhow::Context;
use anyhow::Result;
use anyhow::ensure;
use stride_overlap::OverlapOpts;
use stride_overlap::View;
use stride_overlap::overlaps_with;
use tabwriter::TabWriter;

use crate::generators::Variant;
use crate::generators::scenarios;
use crate::timer::TimeUnit;
use crate::timer::format_duration;

/// Runs the detector once and measures it.
pub fn time_overlap(a: &View, b: &View, opts: &OverlapOpts) -> Result<(bool, Duration)> {
    let start = Instant::now();
    let verdict = overlaps_with(a, b, opts)?;
    Ok((verdict, start.elapsed()))
}

/// Parameters of a sweep over `n = min, min + step, ..., ≤ max`.
#[derive(Debug, Clone)]
pub struct Sweep {
    pub variant: Variant,
    pub min: usize,
    pub max: usize,
    pub step: usize,
    pub unit: TimeUnit,
}

/// Times one operand pair per `n` and writes `n,elapsed` CSV rows,
/// preceded by a header naming the axis and unit.
pub fn run_sweep<W: Write>(sweep: &Sweep, opts: &OverlapOpts, out: &mut W) -> Result<()> {
    ensure!(sweep.step > 0, "sweep step must be positive");
    writeln!(
        out,
        "{},time ({})",
        sweep.variant.axis_title(),
        sweep.unit.label()
    )?;
    for n in (sweep.min..=sweep.max).step_by(sweep.step) {
        let axis = sweep.variant.axis_title();
        let (a, b) = sweep
            .variant
            .views(n)
            .with_context(|| format!("building operands for {}={}", axis, n))?;
        let (verdict, elapsed) = time_overlap(&a, &b, opts)?;
        tracing::debug!(n, verdict, ?elapsed, "sweep point");
        writeln!(out, "{},{}", n, format_duration(elapsed, Some(sweep.unit), false))?;
    }
    out.flush()?;
    Ok(())
}

/// Creates `path` for a sweep's results, refusing to clobber an
/// existing file.
pub fn create_output(path: &Path) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .with_context(|| format!("{} exists already or cannot be created", path.display()))
}

/// Times the fixed scenarios and writes an aligned table.
pub fn run_scenarios<W: Write>(opts: &OverlapOpts, unit: Option<TimeUnit>, out: W) -> Result<()> {
    let mut tw = TabWriter::new(out);
    writeln!(tw, "SCENARIO\tA\tB\tOVERLAPS\tELAPSED")?;
    for scenario in scenarios()? {
        let (verdict, elapsed) = time_overlap(&scenario.a, &scenario.b, opts)?;
        if verdict != scenario.expected {
            tracing::warn!(
                scenario = scenario.name,
                verdict,
                expected = scenario.expected,
                "unexpected verdict"
            );
        }
        writeln!(
            tw,
            "{}\t{:?}\t{:?}\t{}\t{}",
            scenario.name,
            scenario.a.shape(),
            scenario.b.shape(),
            verdict,
            format_duration(elapsed, unit, true)
        )?;
    }
    tw.flush()?;
    Ok(())
}
