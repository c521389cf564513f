//! The trading-day calendar.
//!
//! A [`Calendar`] holds the full ordered set of trading days, loaded once
//! from the backing store. It supports closed-range enumeration, relative
//! offsetting with a floor clamp at the range start, and periodic boundary
//! extraction. Before loading, it can refresh the persisted calendar
//! against the upstream daily-return series — an append-only, idempotent
//! step.
//!
//! Once constructed the calendar is immutable and safe for concurrent
//! reads from all workers.

use chrono::Datelike;
use polars::prelude::*;
use ronda_traits::period::{Period, quarter_of};
use ronda_traits::store::series;
use ronda_traits::types::{col, date_column, date_values};
use ronda_traits::{Date, FactorStore, Result, RondaError};
use tracing::{debug, info};

/// One valid computation date, tagged with its period buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradingDay {
    /// The calendar date.
    pub date: Date,
    /// Month bucket (1..=12).
    pub month: u32,
    /// Quarter bucket (1..=4).
    pub quarter: u32,
    /// Year bucket.
    pub year: i32,
}

impl TradingDay {
    /// Tags a date with its month / quarter / year buckets.
    #[must_use]
    pub fn new(date: Date) -> Self {
        let month = date.month();
        Self {
            date,
            month,
            quarter: quarter_of(month),
            year: date.year(),
        }
    }
}

/// The ordered set of trading days.
#[derive(Debug, Clone)]
pub struct Calendar {
    // Ascending, no duplicates.
    days: Vec<TradingDay>,
}

impl Calendar {
    /// Loads the calendar from the store's `trade_dates` series, keeping
    /// days on or after `from`.
    ///
    /// With `refresh` set, the persisted calendar is first synchronized
    /// against the upstream `daily_returns` series via [`Self::refresh`].
    ///
    /// # Errors
    ///
    /// Fails when the `trade_dates` series is missing or holds no days on
    /// or after `from`.
    pub fn load(store: &dyn FactorStore, from: Date, refresh: bool) -> Result<Self> {
        if refresh {
            Self::refresh(store)?;
        }

        let df = store.find_range(series::TRADE_DATES, from, None, Some(&[col::DATE]))?;
        let mut dates = date_values(&df)?;
        dates.sort_unstable();
        dates.dedup();
        if dates.is_empty() {
            return Err(RondaError::InsufficientData(format!(
                "no trading days on or after {from}"
            )));
        }
        debug!(days = dates.len(), first = %dates[0], "trading calendar loaded");
        Ok(Self::from_days(dates))
    }

    /// Builds a calendar directly from a list of dates. Used by fixtures
    /// and tests; buckets are derived from the dates.
    #[must_use]
    pub fn from_days(mut dates: Vec<Date>) -> Self {
        dates.sort_unstable();
        dates.dedup();
        Self {
            days: dates.into_iter().map(TradingDay::new).collect(),
        }
    }

    /// Appends any trading days the upstream reference series knows about
    /// but the persisted calendar does not.
    ///
    /// Compares the max persisted trading day against the max date in
    /// `daily_returns`; when the upstream is strictly ahead, the missing
    /// days are tagged and appended exactly once. Re-running with no
    /// upstream advance is a no-op, so the refresh is idempotent.
    ///
    /// Returns whether anything was appended.
    pub fn refresh(store: &dyn FactorStore) -> Result<bool> {
        let known = store
            .latest_date(series::TRADE_DATES)?
            .ok_or_else(|| RondaError::MissingSeries(series::TRADE_DATES.to_string()))?;
        let Some(upstream) = store.latest_date(series::DAILY_RETURNS)? else {
            debug!("no upstream reference series; skipping calendar refresh");
            return Ok(false);
        };
        if known >= upstream {
            debug!(%known, "trading calendar already current");
            return Ok(false);
        }

        let df = store.find_range(
            series::DAILY_RETURNS,
            known,
            Some(upstream),
            Some(&[col::DATE]),
        )?;
        let mut dates = date_values(&df)?;
        dates.sort_unstable();
        dates.dedup();
        // The known max is fetched by the closed range query but is
        // already persisted.
        dates.retain(|&d| d > known);
        if dates.is_empty() {
            return Ok(false);
        }

        info!(from = %dates[0], to = %upstream, days = dates.len(), "appending new trading days");
        store.append_rows(series::TRADE_DATES, &trade_date_rows(&dates)?)?;
        Ok(true)
    }

    /// Enumerates trading days in the closed range `[from, to]`.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::EmptyRange`] when `from > to`. A range that
    /// simply contains no trading days yields an empty vector.
    pub fn enumerate(&self, from: Date, to: Date) -> Result<Vec<Date>> {
        if from > to {
            return Err(RondaError::EmptyRange { from, to });
        }
        let start = self.days.partition_point(|td| td.date < from);
        let end = self.days.partition_point(|td| td.date <= to);
        Ok(self.days[start..end].iter().map(|td| td.date).collect())
    }

    /// Resolves `date` to the latest trading day at or before it, then
    /// shifts by `n` positions (negative = backward).
    ///
    /// Shifting before the range start clamps to the first trading day —
    /// a floor policy, not an error. Shifting past the range end fails,
    /// since the day genuinely does not exist yet.
    pub fn offset(&self, date: Date, n: i64) -> Result<Date> {
        let pos = self.days.partition_point(|td| td.date <= date);
        if pos == 0 {
            return Err(RondaError::InvalidDate(format!(
                "{date} precedes the first known trading day"
            )));
        }
        let idx = (pos as i64 - 1 + n).max(0) as usize;
        self.days.get(idx).map(|td| td.date).ok_or_else(|| {
            RondaError::InvalidDate(format!("offset {n} from {date} is past the calendar end"))
        })
    }

    /// Returns the first or last trading day of each month / quarter /
    /// year bucket intersecting `[from, to]`, ordered by bucket ascending.
    pub fn period_boundary(
        &self,
        from: Date,
        to: Date,
        period: Period,
        take_first: bool,
    ) -> Result<Vec<Date>> {
        if from > to {
            return Err(RondaError::EmptyRange { from, to });
        }
        let start = self.days.partition_point(|td| td.date < from);
        let end = self.days.partition_point(|td| td.date <= to);

        let mut out: Vec<Date> = Vec::new();
        let mut current: Option<(i32, u32)> = None;
        for td in &self.days[start..end] {
            let key = match period {
                Period::Month => (td.year, td.month),
                Period::Quarter => (td.year, td.quarter),
                Period::Year => (td.year, 0),
            };
            if current == Some(key) {
                if !take_first {
                    *out.last_mut().expect("bucket has a first day") = td.date;
                }
            } else {
                current = Some(key);
                out.push(td.date);
            }
        }
        Ok(out)
    }

    /// Whether `date` is a trading day.
    #[must_use]
    pub fn is_trading_day(&self, date: Date) -> bool {
        self.days.binary_search_by_key(&date, |td| td.date).is_ok()
    }

    /// First trading day in the calendar.
    #[must_use]
    pub fn first(&self) -> Option<Date> {
        self.days.first().map(|td| td.date)
    }

    /// Last trading day in the calendar.
    #[must_use]
    pub fn last(&self) -> Option<Date> {
        self.days.last().map(|td| td.date)
    }

    /// Number of trading days loaded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Whether the calendar holds no days.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Builds the persisted `trade_dates` rows for a batch of new days.
fn trade_date_rows(dates: &[Date]) -> Result<DataFrame> {
    let month: Vec<i32> = dates.iter().map(|d| d.month() as i32).collect();
    let quarter: Vec<i32> = month.iter().map(|&m| quarter_of(m as u32) as i32).collect();
    let year: Vec<i32> = dates.iter().map(Datelike::year).collect();
    DataFrame::new(vec![
        date_column(col::DATE, dates),
        Column::new("month".into(), month),
        Column::new("quarter".into(), quarter),
        Column::new("year".into(), year),
    ])
    .map_err(Into::into)
}
