//! The persistence seam consumed by the engine and the calendar.
//!
//! A [`FactorStore`] is a durable keyed store with upsert-by-(ticker, date)
//! semantics. One table ("series") per factor name, plus a handful of
//! well-known series for the calendar and the upstream reference data. At
//! the storage boundary dates travel as ISO `YYYY-MM-DD` strings; adapters
//! perform that conversion explicitly so native timestamp coercion never
//! happens behind the caller's back.

use crate::error::Result;
use crate::types::Date;
use polars::prelude::DataFrame;

/// Names of the series every deployment carries.
pub mod series {
    /// The trading calendar: one row per trading day, tagged with its
    /// month / quarter / year bucket.
    pub const TRADE_DATES: &str = "trade_dates";

    /// The upstream reference series: per-ticker daily returns with volume
    /// and float shares. Its max date defines "upstream freshness" for both
    /// the calendar refresh and the incremental updater.
    pub const DAILY_RETURNS: &str = "daily_returns";

    /// Benchmark return series, one column per benchmark.
    pub const BENCHMARKS: &str = "benchmarks";
}

/// A durable keyed store for factor tables.
///
/// Implementations must guarantee keyed uniqueness on (ticker, date) for
/// [`upsert_indexed`](Self::upsert_indexed); a single logical writer per
/// series is assumed, so no cross-writer transaction layer is provided.
///
/// Range conventions:
/// - [`find_range`](Self::find_range) is closed on both ends,
/// - [`delete_range`](Self::delete_range) is half-open `[from, to)`.
pub trait FactorStore: Send + Sync {
    /// Inserts or replaces rows keyed by (ticker, date). Last write wins.
    fn upsert_indexed(&self, series: &str, rows: &DataFrame) -> Result<()>;

    /// Appends rows without any key check. Used by the incremental updater,
    /// which has already established the rows are strictly past the
    /// watermark.
    fn append_rows(&self, series: &str, rows: &DataFrame) -> Result<()>;

    /// The maximum date present in a series, or `None` when the series does
    /// not exist or holds no rows. This is the series' watermark.
    fn latest_date(&self, series: &str) -> Result<Option<Date>>;

    /// Deletes all rows whose date falls in the half-open range `[from, to)`.
    fn delete_range(&self, series: &str, from: Date, to: Date) -> Result<()>;

    /// Fetches rows with dates in the closed range `[from, to]`, or with no
    /// upper bound when `to` is `None`. When `columns` is given, only those
    /// columns are returned.
    ///
    /// The returned table carries a polars `Date`-typed `date` column; the
    /// ISO string representation stays inside the adapter.
    fn find_range(
        &self,
        series: &str,
        from: Date,
        to: Option<Date>,
        columns: Option<&[&str]>,
    ) -> Result<DataFrame>;
}

/// Serializes a date for the storage boundary.
#[must_use]
pub fn date_to_iso(date: Date) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parses a storage-boundary ISO date string.
pub fn iso_to_date(s: &str) -> Result<Date> {
    Date::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| crate::error::RondaError::InvalidDate(format!("{s}: {e}")))
}
