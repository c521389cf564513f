//! Shared data-layer wiring for the CLI.

use anyhow::{Context, Result};
use ronda_calendar::Calendar;
use ronda_store::ParquetStore;
use ronda_traits::Date;
use std::path::Path;
use std::sync::Arc;

/// Opens the parquet-backed store rooted at `data_dir`.
pub(crate) fn open_store(data_dir: &Path) -> Result<ParquetStore> {
    ParquetStore::open(data_dir)
        .with_context(|| format!("cannot open data directory {}", data_dir.display()))
}

/// Loads the trading calendar from the store, optionally refreshing it
/// from the reference return series first.
pub(crate) fn load_calendar(
    store: &ParquetStore,
    start: Date,
    refresh: bool,
) -> Result<Arc<Calendar>> {
    let calendar = Calendar::load(store, start, refresh)
        .context("cannot load trading calendar (is the trade_dates series seeded?)")?;
    Ok(Arc::new(calendar))
}

/// Parses a YYYY-MM-DD date argument.
pub(crate) fn parse_date(s: &str) -> Result<Date> {
    Date::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
}
