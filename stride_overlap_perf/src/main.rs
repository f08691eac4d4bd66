/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Timing harness for `stride_overlap`.
//!
//! ```text
//! stride-overlap-perf scenarios
//! stride-overlap-perf sweep --variant n-elts --unit ms --output naive_perf_n_elts.csv
//! stride-overlap-perf check \
//!     --a '{"base_address":0,"shape":[4,3],"strides":[16,3],"item_size":1}' \
//!     --b '{"base_address":8,"shape":[2,4],"strides":[40,2],"item_size":1}'
//! ```

mod generators;
mod sweep;
mod timer;

use std::io;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use clap::Subcommand;
use serde::Serialize;
use stride_overlap::Membership;
use stride_overlap::OverlapOpts;
use stride_overlap::RawView;
use stride_overlap::Semantics;
use stride_overlap::View;
use stride_overlap::enumerate;
use stride_overlap::hex;
use tracing_subscriber::EnvFilter;

use crate::generators::Variant;
use crate::sweep::Sweep;
use crate::timer::TimeUnit;

#[derive(Parser, Debug)]
#[command(about = "Time and exercise strided-view overlap detection")]
struct Args {
    /// Overlap semantics; defaults to $STRIDE_OVERLAP_SEMANTICS or
    /// element_start.
    #[arg(long, global = true)]
    semantics: Option<Semantics>,

    /// Membership strategy; defaults to $STRIDE_OVERLAP_MEMBERSHIP or
    /// hash.
    #[arg(long, global = true)]
    membership: Option<Membership>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Time the fixed example scenarios.
    Scenarios {
        /// Report every scenario in this unit instead of a full
        /// breakdown.
        #[arg(long, value_enum)]
        unit: Option<TimeUnit>,
    },

    /// Time a family of generated operands and write CSV.
    Sweep {
        #[arg(long, value_enum)]
        variant: Variant,

        #[arg(long)]
        min: Option<usize>,

        #[arg(long)]
        max: Option<usize>,

        #[arg(long)]
        step: Option<usize>,

        #[arg(long, value_enum, default_value = "ms")]
        unit: TimeUnit,

        /// CSV destination. Must not exist yet.
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Decide overlap for two views given as JSON.
    Check {
        #[arg(long)]
        a: String,

        #[arg(long)]
        b: String,

        /// Include the hex addresses of both views in the report.
        #[arg(long)]
        addresses: bool,
    },
}

#[derive(Serialize)]
struct CheckReport {
    overlaps: bool,
    semantics: Semantics,
    elements: (usize, usize),
    #[serde(skip_serializing_if = "Option::is_none")]
    addresses: Option<(Vec<String>, Vec<String>)>,
}

fn parse_view(arg: &str, json: &str) -> Result<View> {
    let raw: RawView =
        serde_json::from_str(json).with_context(|| format!("parsing --{} as a view", arg))?;
    View::try_from(raw).with_context(|| format!("validating --{}", arg))
}

fn check<W: Write>(a: &str, b: &str, addresses: bool, opts: &OverlapOpts, out: W) -> Result<()> {
    let a = parse_view("a", a)?;
    let b = parse_view("b", b)?;
    let (overlaps, elapsed) = sweep::time_overlap(&a, &b, opts)?;
    tracing::info!(%a, %b, overlaps, ?elapsed, "checked");

    let addresses = if addresses {
        Some((hex(&enumerate(&a)?), hex(&enumerate(&b)?)))
    } else {
        None
    };
    let report = CheckReport {
        overlaps,
        semantics: opts.semantics(),
        elements: (a.num_elements(), b.num_elements()),
        addresses,
    };
    serde_json::to_writer_pretty(out, &report)?;
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut opts = OverlapOpts::from_env();
    opts.merge(&OverlapOpts {
        semantics: args.semantics,
        membership: args.membership,
    });
    tracing::debug!(?opts, "resolved options");

    let stdout = io::stdout();
    match args.command {
        Command::Scenarios { unit } => sweep::run_scenarios(&opts, unit, stdout.lock()),
        Command::Sweep {
            variant,
            min,
            max,
            step,
            unit,
            output,
        } => {
            let (default_min, default_max, default_step) = variant.default_range();
            let sweep = Sweep {
                variant,
                min: min.unwrap_or(default_min),
                max: max.unwrap_or(default_max),
                step: step.unwrap_or(default_step),
                unit,
            };
            let mut file = sweep::create_output(&output)?;
            tracing::info!(?sweep, output = %output.display(), "starting sweep");
            sweep::run_sweep(&sweep, &opts, &mut file)
        }
        Command::Check { a, b, addresses } => {
            let mut out = stdout.lock();
            check(&a, &b, addresses, &opts, &mut out)?;
            writeln!(out)?;
            Ok(())
        }
    }
}
