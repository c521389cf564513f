//! Wide panel (dates x tickers) pivoted from a long store table.
//!
//! Every bundled factor prepares by pivoting the reference series into
//! this shape once, then slices lookback windows out of it per day.
//! Missing observations are `NaN`. The per-ticker eligibility rule lives
//! here so the 40% minimum-observation constant is written down exactly
//! once.

use polars::prelude::*;
use ronda_traits::types::{col, days_to_date};
use ronda_traits::{Date, Result, RondaError, Ticker};
use std::collections::HashMap;
use std::ops::Range;

/// A ticker is dropped for a day when at least this fraction of its
/// lookback window is missing. Plugin-local policy, not an engine
/// contract.
pub(crate) const MIN_OBS_FRACTION: f64 = 0.4;

/// A dense dates-x-tickers value matrix.
#[derive(Debug, Clone)]
pub struct Panel {
    dates: Vec<Date>,
    tickers: Vec<Ticker>,
    // Row-major over dates; NaN marks a missing observation.
    values: Vec<f64>,
}

impl Panel {
    /// Pivots a long table (`date`, `ticker`, `value_col`) into a panel.
    /// Duplicate (ticker, date) observations keep the last one seen.
    pub fn from_long(df: &DataFrame, value_col: &str) -> Result<Self> {
        let date_phys = df.column(col::DATE)?.as_materialized_series().date()?.clone();
        let ticker_col = df.column(col::TICKER)?.as_materialized_series().str()?.clone();
        let value_f64 = df.column(value_col)?.as_materialized_series().f64()?.clone();

        let mut dates: Vec<Date> = date_phys
            .into_iter()
            .flatten()
            .filter_map(days_to_date)
            .collect();
        dates.sort_unstable();
        dates.dedup();
        let mut tickers: Vec<Ticker> = ticker_col
            .into_iter()
            .flatten()
            .map(str::to_owned)
            .collect();
        tickers.sort_unstable();
        tickers.dedup();

        let date_index: HashMap<Date, usize> =
            dates.iter().enumerate().map(|(i, &d)| (d, i)).collect();
        let ticker_index: HashMap<&str, usize> = tickers
            .iter()
            .enumerate()
            .map(|(i, t)| (t.as_str(), i))
            .collect();

        let mut values = vec![f64::NAN; dates.len() * tickers.len()];
        let width = tickers.len();
        let rows = date_phys
            .into_iter()
            .zip(ticker_col.into_iter())
            .zip(value_f64.into_iter());
        for ((d, t), v) in rows {
            let (Some(d), Some(t)) = (d.and_then(days_to_date), t) else {
                continue;
            };
            let (di, ti) = (date_index[&d], ticker_index[t]);
            values[di * width + ti] = v.unwrap_or(f64::NAN);
        }

        Ok(Self {
            dates,
            tickers,
            values,
        })
    }

    /// Ascending date axis.
    #[must_use]
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Sorted ticker axis.
    #[must_use]
    pub fn tickers(&self) -> &[Ticker] {
        &self.tickers
    }

    /// Date-index range covering the closed window `[from, to]`.
    #[must_use]
    pub fn window(&self, from: Date, to: Date) -> Range<usize> {
        let start = self.dates.partition_point(|&d| d < from);
        let end = self.dates.partition_point(|&d| d <= to);
        start..end
    }

    /// Value at (date index, ticker index); `NaN` when missing.
    #[must_use]
    pub fn value(&self, date_idx: usize, ticker_idx: usize) -> f64 {
        self.values[date_idx * self.tickers.len() + ticker_idx]
    }

    /// Ticker indices eligible for the window's last day: the last-day
    /// observation must be present and fewer than `0.4 * lookback`
    /// observations, truncated to a whole count, may be missing across the
    /// window.
    #[must_use]
    pub fn eligible(&self, rows: Range<usize>, lookback: usize) -> Vec<usize> {
        if rows.is_empty() {
            return Vec::new();
        }
        let last = rows.end - 1;
        let cutoff = (lookback as f64 * MIN_OBS_FRACTION) as usize;
        (0..self.tickers.len())
            .filter(|&ti| {
                if self.value(last, ti).is_nan() {
                    return false;
                }
                let missing = rows
                    .clone()
                    .filter(|&di| self.value(di, ti).is_nan())
                    .count();
                missing < cutoff
            })
            .collect()
    }

    /// Guard used by plugins to surface a misuse of the trait contract.
    pub fn expect_prepared(panel: &Option<Self>) -> Result<&Self> {
        panel
            .as_ref()
            .ok_or_else(|| RondaError::Computation("compute called before prepare".to_string()))
    }
}
