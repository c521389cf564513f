//! Bayes-adjusted market beta.
//!
//! Estimates each ticker's OLS beta against a benchmark return series over
//! a rolling window, then shrinks the estimates toward the cross-sectional
//! mean, weighting by estimation precision (Vasicek 1973).

use crate::panel::Panel;
use ronda_calendar::Calendar;
use ronda_traits::store::series;
use ronda_traits::types::{col, days_to_date};
use ronda_traits::{Date, Factor, FactorStore, Result, RondaError, Ticker};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Configuration for the Bayes beta factor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BayesBetaConfig {
    /// Rolling estimation window in trading days.
    pub lookback_days: usize,
    /// Benchmark column in the `benchmarks` series.
    pub benchmark: String,
}

impl Default for BayesBetaConfig {
    fn default() -> Self {
        Self {
            lookback_days: 250,
            benchmark: "market".to_string(),
        }
    }
}

/// Bayes-adjusted beta over a 250-day window.
#[derive(Debug)]
pub struct BayesBeta {
    config: BayesBetaConfig,
    calendar: Arc<Calendar>,
    panel: Option<Panel>,
    benchmark: Option<BTreeMap<Date, f64>>,
}

impl BayesBeta {
    /// Creates the factor with an explicit configuration.
    #[must_use]
    pub const fn new(calendar: Arc<Calendar>, config: BayesBetaConfig) -> Self {
        Self {
            config,
            calendar,
            panel: None,
            benchmark: None,
        }
    }

    /// Creates the factor with the default 250-day window.
    #[must_use]
    pub fn with_defaults(calendar: Arc<Calendar>) -> Self {
        Self::new(calendar, BayesBetaConfig::default())
    }

    /// The rolling window length in trading days.
    #[must_use]
    pub const fn lookback_days(&self) -> usize {
        self.config.lookback_days
    }
}

impl Factor for BayesBeta {
    fn name(&self) -> &str {
        "bayes_beta_250"
    }

    fn prepare(&mut self, store: &dyn FactorStore, from: Date, to: Date) -> Result<()> {
        // Extra lead so the first requested day has a full window behind it.
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

        let bench = store.find_range(
            series::BENCHMARKS,
            lead,
            Some(to),
            Some(&[col::DATE, self.config.benchmark.as_str()]),
        )?;
        let dates = bench.column(col::DATE)?.as_materialized_series().date()?.clone();
        let values = bench
            .column(self.config.benchmark.as_str())?
            .as_materialized_series()
            .f64()?
            .clone();
        let mut map = BTreeMap::new();
        for (d, v) in dates.into_iter().zip(values.into_iter()) {
            if let (Some(d), Some(v)) = (d.and_then(days_to_date), v) {
                map.insert(d, v);
            }
        }
        if map.is_empty() {
            return Err(RondaError::InsufficientData(format!(
                "benchmark '{}' has no observations in range",
                self.config.benchmark
            )));
        }
        self.benchmark = Some(map);
        Ok(())
    }

    fn compute(&self, day: Date) -> Result<Vec<(Ticker, f64)>> {
        let panel = Panel::expect_prepared(&self.panel)?;
        let bench = self
            .benchmark
            .as_ref()
            .ok_or_else(|| RondaError::Computation("compute called before prepare".to_string()))?;

        let begin = self
            .calendar
            .offset(day, -(self.config.lookback_days as i64))?;
        let rows = panel.window(begin, day);
        let eligible = panel.eligible(rows.clone(), self.config.lookback_days);

        // Raw OLS pass.
        let mut estimates: Vec<(usize, f64, f64)> = Vec::with_capacity(eligible.len());
        for ti in eligible {
            let pairs: Vec<(f64, f64)> = rows
                .clone()
                .filter_map(|di| {
                    let r = panel.value(di, ti);
                    let m = bench.get(&panel.dates()[di]).copied()?;
                    (r.is_finite() && m.is_finite()).then_some((m, r))
                })
                .collect();
            if let Some((slope, stderr)) = ols_slope(&pairs) {
                estimates.push((ti, slope, stderr));
            }
        }
        if estimates.is_empty() {
            return Ok(Vec::new());
        }

        // Vasicek shrinkage toward the cross-sectional mean.
        let betas: Vec<f64> = estimates.iter().map(|&(_, b, _)| b).collect();
        let mean = betas.iter().sum::<f64>() / betas.len() as f64;
        let var = betas.iter().map(|b| (b - mean).powi(2)).sum::<f64>() / betas.len() as f64;

        let out = estimates
            .into_iter()
            .map(|(ti, beta, stderr)| {
                let adjusted = if var <= f64::EPSILON {
                    beta
                } else {
                    let w = if stderr <= f64::EPSILON {
                        1.0
                    } else {
                        let precision = stderr.powi(-2);
                        precision / (precision + var.recip())
                    };
                    w * beta + (1.0 - w) * mean
                };
                (panel.tickers()[ti].clone(), adjusted)
            })
            .collect();
        Ok(out)
    }
}

/// OLS slope of `y` on `x` with its standard error, from `(x, y)` pairs.
/// Returns `None` when the fit is degenerate (fewer than 3 points or a
/// constant regressor).
fn ols_slope(pairs: &[(f64, f64)]) -> Option<(f64, f64)> {
    let n = pairs.len();
    if n < 3 {
        return None;
    }
    let nf = n as f64;
    let mean_x = pairs.iter().map(|&(x, _)| x).sum::<f64>() / nf;
    let mean_y = pairs.iter().map(|&(_, y)| y).sum::<f64>() / nf;
    let sxx: f64 = pairs.iter().map(|&(x, _)| (x - mean_x).powi(2)).sum();
    if sxx <= f64::EPSILON {
        return None;
    }
    let sxy: f64 = pairs
        .iter()
        .map(|&(x, y)| (x - mean_x) * (y - mean_y))
        .sum();
    let slope = sxy / sxx;

    let sse: f64 = pairs
        .iter()
        .map(|&(x, y)| {
            let fitted = mean_y + slope * (x - mean_x);
            (y - fitted).powi(2)
        })
        .sum();
    let stderr = (sse / (nf - 2.0) / sxx).sqrt();
    Some((slope, stderr))
}
