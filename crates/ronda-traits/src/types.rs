//! Common types used throughout the ronda factor engine.
//!
//! This module defines the core data types for representing factor results
//! and temporal information. The data substrate is a Polars [`DataFrame`];
//! [`FactorFrame`] wraps one with the schema every factor table shares.

use crate::error::{Result, RondaError};
use polars::prelude::*;

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// An instrument identifier.
///
/// Tickers identify the entities a factor is computed for, e.g. "600519.SH".
pub type Ticker = String;

/// Well-known column names shared by every factor table.
pub mod col {
    /// Instrument identifier column.
    pub const TICKER: &str = "ticker";
    /// Trading-date column.
    pub const DATE: &str = "date";
}

/// Days between 0001-01-01 (chrono's CE epoch) and 1970-01-01 (polars' date
/// epoch).
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Converts a [`Date`] to the physical days-since-epoch representation used
/// by the polars `Date` dtype.
#[must_use]
pub fn date_to_days(date: Date) -> i32 {
    use chrono::Datelike;
    date.num_days_from_ce() - EPOCH_DAYS_FROM_CE
}

/// Converts a physical days-since-epoch value back to a [`Date`].
#[must_use]
pub fn days_to_date(days: i32) -> Option<Date> {
    Date::from_num_days_from_ce_opt(days + EPOCH_DAYS_FROM_CE)
}

/// Builds a polars `Date`-typed column from chrono dates.
pub fn date_column(name: &str, dates: &[Date]) -> Column {
    let days: Vec<i32> = dates.iter().map(|&d| date_to_days(d)).collect();
    Int32Chunked::from_vec(name.into(), days)
        .into_date()
        .into_series()
        .into_column()
}

/// Extracts the `date` column of a table as chrono dates.
pub fn date_values(df: &DataFrame) -> Result<Vec<Date>> {
    let dates = df.column(col::DATE)?.as_materialized_series().date()?;
    dates
        .into_iter()
        .map(|d| {
            d.and_then(days_to_date)
                .ok_or_else(|| RondaError::InvalidDate("null date in table".to_string()))
        })
        .collect()
}

/// A unified factor result table.
///
/// `FactorFrame` wraps a Polars DataFrame with the fixed factor schema:
/// a `ticker` column, a `date` column, and exactly one value column named
/// after the factor series it belongs to.
///
/// Invariants maintained by the execution engine:
/// - rows are sorted ascending by date before persistence,
/// - at most one row per (ticker, date) pair after cleaning.
///
/// # Example
///
/// ```no_run
/// use ronda_traits::{FactorFrame, Date};
///
/// let day = Date::from_ymd_opt(2021, 10, 8).unwrap();
/// let rows = vec![("600519.SH".to_string(), 1.02), ("000001.SZ".to_string(), 0.98)];
/// let frame = FactorFrame::from_day_rows("abnormal_turnover", day, &rows).unwrap();
/// assert_eq!(frame.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct FactorFrame {
    /// The underlying DataFrame.
    data: DataFrame,
}

impl FactorFrame {
    /// Wraps an existing DataFrame, validating the factor schema.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::MissingColumn`] when `ticker` or `date` is
    /// absent, or when no value column is present.
    pub fn new(data: DataFrame) -> Result<Self> {
        for required in [col::TICKER, col::DATE] {
            if data.column(required).is_err() {
                return Err(RondaError::MissingColumn(required.to_string()));
            }
        }
        if data.width() < 3 {
            return Err(RondaError::MissingColumn("<value>".to_string()));
        }
        Ok(Self { data })
    }

    /// Creates an empty frame with the factor schema for `name`.
    #[must_use]
    pub fn empty(name: &str) -> Self {
        let ticker = Column::new(col::TICKER.into(), Vec::<String>::new());
        let date = date_column(col::DATE, &[]);
        let value = Column::new(name.into(), Vec::<f64>::new());
        // Schema is fixed, construction cannot fail.
        let data = DataFrame::new(vec![ticker, date, value]).expect("valid factor schema");
        Self { data }
    }

    /// Builds a one-day partial frame from per-ticker values.
    ///
    /// This is the shape a [`Factor`](crate::Factor) computation produces:
    /// a constant `date` column and one value per ticker, with the value
    /// column already named after the factor.
    pub fn from_day_rows(name: &str, day: Date, rows: &[(Ticker, f64)]) -> Result<Self> {
        let tickers: Vec<String> = rows.iter().map(|(t, _)| t.clone()).collect();
        let values: Vec<f64> = rows.iter().map(|(_, v)| *v).collect();
        let dates = vec![day; rows.len()];

        let data = DataFrame::new(vec![
            Column::new(col::TICKER.into(), tickers),
            date_column(col::DATE, &dates),
            Column::new(name.into(), values),
        ])?;
        Ok(Self { data })
    }

    /// Returns a reference to the underlying DataFrame.
    pub const fn data(&self) -> &DataFrame {
        &self.data
    }

    /// Consumes self and returns the underlying DataFrame.
    pub fn into_inner(self) -> DataFrame {
        self.data
    }

    /// Name of the value column (the series name).
    pub fn value_name(&self) -> Result<&str> {
        self.data
            .get_column_names()
            .iter()
            .map(|s| s.as_str())
            .find(|&n| n != col::TICKER && n != col::DATE)
            .ok_or_else(|| RondaError::MissingColumn("<value>".to_string()))
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.data.height()
    }

    /// Returns whether the frame has no rows.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the frame sorted ascending by date.
    pub fn sort_by_date(self) -> Result<Self> {
        let data = self.data.sort([col::DATE], Default::default())?;
        Ok(Self { data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_date_roundtrip() {
        let date = d(2021, 10, 8);
        assert_eq!(days_to_date(date_to_days(date)), Some(date));
        // polars date epoch
        assert_eq!(date_to_days(d(1970, 1, 1)), 0);
    }

    #[test]
    fn test_from_day_rows() {
        let rows = vec![("A".to_string(), 1.0), ("B".to_string(), 2.0)];
        let frame = FactorFrame::from_day_rows("f", d(2021, 10, 8), &rows).unwrap();
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.value_name().unwrap(), "f");
        assert_eq!(date_values(frame.data()).unwrap(), vec![d(2021, 10, 8); 2]);
    }

    #[test]
    fn test_empty_frame_schema() {
        let frame = FactorFrame::empty("f");
        assert!(frame.is_empty());
        assert_eq!(frame.value_name().unwrap(), "f");
    }

    #[test]
    fn test_new_rejects_missing_columns() {
        let df = DataFrame::new(vec![Column::new("x".into(), vec![1.0f64])]).unwrap();
        assert!(matches!(
            FactorFrame::new(df),
            Err(RondaError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_sort_by_date() {
        let mut rows1 = FactorFrame::from_day_rows("f", d(2021, 10, 8), &[("A".into(), 1.0)])
            .unwrap()
            .into_inner();
        let rows2 = FactorFrame::from_day_rows("f", d(2021, 10, 4), &[("B".into(), 2.0)])
            .unwrap()
            .into_inner();
        rows1.vstack_mut(&rows2).unwrap();
        let sorted = FactorFrame::new(rows1).unwrap().sort_by_date().unwrap();
        let dates = date_values(sorted.data()).unwrap();
        assert_eq!(dates, vec![d(2021, 10, 4), d(2021, 10, 8)]);
    }
}
