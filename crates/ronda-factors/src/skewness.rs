//! Rolling return skewness.
//!
//! Third standardized moment of daily returns over a rolling window, using
//! the biased (population) estimator `g1 = m3 / m2^1.5`.

use crate::panel::Panel;
use ronda_calendar::Calendar;
use ronda_traits::store::series;
use ronda_traits::types::col;
use ronda_traits::{Date, Factor, FactorStore, Result, Ticker};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Configuration for the return skewness factor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnSkewnessConfig {
    /// Rolling window in trading days.
    pub lookback_days: usize,
}

impl Default for ReturnSkewnessConfig {
    fn default() -> Self {
        Self { lookback_days: 60 }
    }
}

/// Skewness of daily returns over a rolling window.
#[derive(Debug)]
pub struct ReturnSkewness {
    config: ReturnSkewnessConfig,
    calendar: Arc<Calendar>,
    panel: Option<Panel>,
}

impl ReturnSkewness {
    /// Creates the factor with an explicit configuration.
    #[must_use]
    pub const fn new(calendar: Arc<Calendar>, config: ReturnSkewnessConfig) -> Self {
        Self {
            config,
            calendar,
            panel: None,
        }
    }

    /// Creates the factor with the default 60-day window.
    #[must_use]
    pub fn with_defaults(calendar: Arc<Calendar>) -> Self {
        Self::new(calendar, ReturnSkewnessConfig::default())
    }

    /// The rolling window length in trading days.
    #[must_use]
    pub const fn lookback_days(&self) -> usize {
        self.config.lookback_days
    }
}

impl Factor for ReturnSkewness {
    fn name(&self) -> &str {
        "return_skewness"
    }

    fn prepare(&mut self, store: &dyn FactorStore, from: Date, to: Date) -> Result<()> {
        let lead = self
            .calendar
            .offset(from, -(self.config.lookback_days as i64))?;
        let returns = store.find_range(
            series::DAILY_RETURNS,
            lead,
            Some(to),
            Some(&[col::DATE, col::TICKER, "ret"]),
        )?;
        self.panel = Some(Panel::from_long(&returns, "ret")?);
        Ok(())
    }

    fn compute(&self, day: Date) -> Result<Vec<(Ticker, f64)>> {
        let panel = Panel::expect_prepared(&self.panel)?;
        let begin = self
            .calendar
            .offset(day, -(self.config.lookback_days as i64))?;
        let rows = panel.window(begin, day);

        let out = panel
            .eligible(rows.clone(), self.config.lookback_days)
            .into_iter()
            .filter_map(|ti| {
                let obs: Vec<f64> = rows
                    .clone()
                    .map(|di| panel.value(di, ti))
                    .filter(|v| v.is_finite())
                    .collect();
                skewness(&obs).map(|g1| (panel.tickers()[ti].clone(), g1))
            })
            .collect();
        Ok(out)
    }
}

/// Biased sample skewness `g1 = m3 / m2^1.5`. Returns `None` for fewer
/// than three observations or a constant series.
fn skewness(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 3 {
        return None;
    }
    let nf = n as f64;
    let mean = values.iter().sum::<f64>() / nf;
    let m2 = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / nf;
    if m2 <= f64::EPSILON {
        return None;
    }
    let m3 = values.iter().map(|v| (v - mean).powi(3)).sum::<f64>() / nf;
    Some(m3 / m2.powf(1.5))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use polars::prelude::*;
    use ronda_store::MemoryStore;
    use ronda_traits::types::date_column;

    fn d(day: u32) -> Date {
        Date::from_ymd_opt(2021, 11, day).unwrap()
    }

    #[test]
    fn test_symmetric_series_has_zero_skew() {
        let values = [-2.0, -1.0, 0.0, 1.0, 2.0];
        assert_relative_eq!(skewness(&values).unwrap(), 0.0);
    }

    #[test]
    fn test_right_tail_is_positive() {
        // One large outlier pulls the third moment positive.
        let values = [0.0, 0.0, 0.0, 0.0, 10.0];
        assert!(skewness(&values).unwrap() > 1.0);
    }

    #[test]
    fn test_degenerate_series() {
        assert!(skewness(&[1.0, 2.0]).is_none());
        assert!(skewness(&[3.0, 3.0, 3.0]).is_none());
    }

    #[test]
    fn test_end_to_end_window() {
        let dates: Vec<Date> = (1..=6).map(d).collect();
        let rets = vec![0.01, -0.01, 0.02, -0.02, 0.0, 0.08];
        let df = DataFrame::new(vec![
            date_column(col::DATE, &dates),
            Column::new(col::TICKER.into(), vec!["AA"; 6]),
            Column::new("ret".into(), rets.clone()),
        ])
        .unwrap();
        let store = MemoryStore::new();
        store.append_rows(series::DAILY_RETURNS, &df).unwrap();

        let calendar = Arc::new(Calendar::from_days(dates));
        let mut factor = ReturnSkewness::new(calendar, ReturnSkewnessConfig { lookback_days: 5 });
        factor.prepare(&store, d(6), d(6)).unwrap();

        let out = factor.compute(d(6)).unwrap();
        assert_eq!(out.len(), 1);
        assert_relative_eq!(out[0].1, skewness(&rets).unwrap(), max_relative = 1e-12);
    }
}
