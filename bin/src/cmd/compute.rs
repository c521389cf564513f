//! Full-run command implementation.

use crate::data;
use anyhow::{Result, bail};
use ronda_engine::{ExportConfig, NanPolicy, RunConfig, Runner, export_parquet, upsert_full};
use ronda_factors::build_factor;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for a full factor run.
pub(crate) struct ComputeArgs {
    pub(crate) factor: String,
    pub(crate) from: String,
    pub(crate) to: String,
    pub(crate) workers: usize,
    pub(crate) nan_policy: NanPolicy,
    pub(crate) export: bool,
    pub(crate) export_dir: Option<PathBuf>,
}

/// Computes a factor over a date window and upserts the result.
pub(crate) fn run(
    args: ComputeArgs,
    data_dir: PathBuf,
    calendar_start: String,
    refresh_calendar: bool,
) -> Result<()> {
    let from = data::parse_date(&args.from)?;
    let to = data::parse_date(&args.to)?;
    if from > to {
        bail!("--from {} is after --to {}", args.from, args.to);
    }

    let export = ExportConfig {
        enabled: args.export,
        dir: args.export_dir,
    };
    // Reject a half-configured export before any computation runs.
    export.validate()?;

    let store = data::open_store(&data_dir)?;
    let calendar = data::load_calendar(
        &store,
        data::parse_date(&calendar_start)?,
        refresh_calendar,
    )?;

    let Some(mut factor) = build_factor(&args.factor, Arc::clone(&calendar)) else {
        bail!("unknown factor '{}' (see `ronda factors`)", args.factor);
    };

    let runner = Runner::new(
        calendar,
        RunConfig {
            workers: args.workers,
            nan_policy: args.nan_policy,
        },
    );
    let report = runner.run_full(factor.as_mut(), &store, from, to)?;

    let rows = upsert_full(&store, &report.frame)?;
    println!(
        "{}: {} rows upserted over {} trading days ({} failed)",
        factor.name(),
        rows,
        report.days_total,
        report.days_failed
    );
    println!(
        "  missing values: {:.2}% ({} rows dropped)",
        report.clean.missing_fraction * 100.0,
        report.clean.rows_dropped
    );

    if export.enabled {
        // validate() guarantees the directory is present.
        if let Some(dir) = export.dir {
            let path = export_parquet(&report.frame, &dir)?;
            println!("  exported to {}", path.display());
        }
    }

    Ok(())
}
