//! Abnormal turnover.
//!
//! Turnover is daily volume scaled by floating shares. The factor value is
//! the latest turnover divided by its rolling-window mean, so a reading
//! above one flags unusually heavy trading.

use crate::panel::Panel;
use polars::prelude::*;
use ronda_calendar::Calendar;
use ronda_traits::store::series;
use ronda_traits::types::col;
use ronda_traits::{Date, Factor, FactorStore, Result, Ticker};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Configuration for the abnormal turnover factor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbnormalTurnoverConfig {
    /// Rolling mean window in trading days.
    pub lookback_days: usize,
}

impl Default for AbnormalTurnoverConfig {
    fn default() -> Self {
        Self { lookback_days: 20 }
    }
}

/// Latest turnover relative to its rolling mean.
#[derive(Debug)]
pub struct AbnormalTurnover {
    config: AbnormalTurnoverConfig,
    calendar: Arc<Calendar>,
    panel: Option<Panel>,
}

impl AbnormalTurnover {
    /// Creates the factor with an explicit configuration.
    #[must_use]
    pub const fn new(calendar: Arc<Calendar>, config: AbnormalTurnoverConfig) -> Self {
        Self {
            config,
            calendar,
            panel: None,
        }
    }

    /// Creates the factor with the default 20-day window.
    #[must_use]
    pub fn with_defaults(calendar: Arc<Calendar>) -> Self {
        Self::new(calendar, AbnormalTurnoverConfig::default())
    }

    /// The rolling window length in trading days.
    #[must_use]
    pub const fn lookback_days(&self) -> usize {
        self.config.lookback_days
    }
}

impl Factor for AbnormalTurnover {
    fn name(&self) -> &str {
        "abnormal_turnover"
    }

    fn prepare(&mut self, store: &dyn FactorStore, from: Date, to: Date) -> Result<()> {
        let lead = self
            .calendar
            .offset(from, -(self.config.lookback_days as i64))?;
        let mut df = store.find_range(
            series::DAILY_RETURNS,
            lead,
            Some(to),
            Some(&[col::DATE, col::TICKER, "volume", "float_shares"]),
        )?;

        let volume = df.column("volume")?.as_materialized_series().f64()?.clone();
        let shares = df
            .column("float_shares")?
            .as_materialized_series()
            .f64()?
            .clone();
        let turnover: Float64Chunked = volume
            .into_iter()
            .zip(shares.into_iter())
            .map(|(v, s)| match (v, s) {
                (Some(v), Some(s)) if s > 0.0 => Some(v / s),
                _ => None,
            })
            .collect();
        df.with_column(turnover.with_name("turnover".into()).into_series())?;

        self.panel = Some(Panel::from_long(&df, "turnover")?);
        Ok(())
    }

    fn compute(&self, day: Date) -> Result<Vec<(Ticker, f64)>> {
        let panel = Panel::expect_prepared(&self.panel)?;
        let begin = self
            .calendar
            .offset(day, -(self.config.lookback_days as i64))?;
        let rows = panel.window(begin, day);
        let Some(last) = rows.clone().last() else {
            return Ok(Vec::new());
        };

        let out = panel
            .eligible(rows.clone(), self.config.lookback_days)
            .into_iter()
            .filter_map(|ti| {
                let latest = panel.value(last, ti);
                let obs: Vec<f64> = rows
                    .clone()
                    .map(|di| panel.value(di, ti))
                    .filter(|v| v.is_finite())
                    .collect();
                let mean = obs.iter().sum::<f64>() / obs.len() as f64;
                (mean > 0.0).then(|| (panel.tickers()[ti].clone(), latest / mean))
            })
            .collect();
        Ok(out)
    }
}
