//! Range-delete command implementation.

use crate::data;
use anyhow::{Result, bail};
use ronda_engine::{RunConfig, Updater};
use std::path::PathBuf;

/// Deletes persisted rows of a factor series for a closed date range.
pub(crate) fn run(
    series: &str,
    from: &str,
    to: &str,
    data_dir: PathBuf,
    calendar_start: String,
) -> Result<()> {
    let from = data::parse_date(from)?;
    let to = data::parse_date(to)?;
    if from > to {
        bail!("--from {from} is after --to {to}");
    }

    let store = data::open_store(&data_dir)?;
    let calendar = data::load_calendar(&store, data::parse_date(&calendar_start)?, false)?;

    let updater = Updater::new(calendar, RunConfig::default());
    updater.delete_range(&store, series, from, to)?;
    println!("{series}: deleted rows for {from}..={to}");
    Ok(())
}
