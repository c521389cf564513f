//! Calendar inspection command implementation.

use crate::data;
use anyhow::Result;
use ronda_calendar::Period;
use std::path::PathBuf;

/// Which boundary of each period bucket to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum Boundary {
    /// First trading day of each bucket.
    First,
    /// Last trading day of each bucket.
    Last,
}

/// Lists trading days in a window, optionally collapsed to period
/// boundaries.
pub(crate) fn run(
    from: &str,
    to: &str,
    period: Option<Period>,
    boundary: Boundary,
    data_dir: PathBuf,
    calendar_start: String,
    refresh: bool,
) -> Result<()> {
    let from = data::parse_date(from)?;
    let to = data::parse_date(to)?;

    let store = data::open_store(&data_dir)?;
    let calendar = data::load_calendar(&store, data::parse_date(&calendar_start)?, refresh)?;

    let days = match period {
        Some(p) => calendar.period_boundary(from, to, p, boundary == Boundary::First)?,
        None => calendar.enumerate(from, to)?,
    };

    for day in &days {
        println!("{day}");
    }
    println!("{} trading days", days.len());
    Ok(())
}
