//! Incremental update command implementation.

use crate::data;
use anyhow::{Result, bail};
use ronda_engine::{NanPolicy, RunConfig, UpdateOutcome, Updater};
use ronda_factors::build_factor;
use std::path::PathBuf;
use std::sync::Arc;

/// Brings a persisted factor series up to date with the return series.
pub(crate) fn run(
    factor_name: &str,
    workers: usize,
    nan_policy: NanPolicy,
    data_dir: PathBuf,
    calendar_start: String,
    refresh_calendar: bool,
) -> Result<()> {
    let store = data::open_store(&data_dir)?;
    let calendar = data::load_calendar(
        &store,
        data::parse_date(&calendar_start)?,
        refresh_calendar,
    )?;

    let Some(mut factor) = build_factor(factor_name, Arc::clone(&calendar)) else {
        bail!("unknown factor '{factor_name}' (see `ronda factors`)");
    };

    let updater = Updater::new(calendar, RunConfig { workers, nan_policy });
    match updater.update(factor.as_mut(), &store)? {
        UpdateOutcome::UpToDate => {
            println!("{}: already up to date", factor.name());
        }
        UpdateOutcome::Appended { from, to, rows } => {
            println!("{}: appended {rows} rows for {from}..={to}", factor.name());
        }
    }
    Ok(())
}
