//! The NaN-cleaning pass applied after aggregation.
//!
//! Non-finite values (`NaN`, `±inf`) are normalized to missing uniformly;
//! the policy then decides whether rows with a missing value are dropped or
//! retained. The fraction of missing values is surfaced as an observability
//! signal, never a failure condition.

use polars::prelude::*;
use ronda_traits::{FactorFrame, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What to do with rows whose value is missing after normalization.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum NanPolicy {
    /// Retain missing-valued rows (values normalized but not removed).
    #[default]
    #[display("keep")]
    Keep,
    /// Drop missing-valued rows.
    #[display("drop")]
    Drop,
}

impl FromStr for NanPolicy {
    type Err = ronda_traits::RondaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "keep" => Ok(Self::Keep),
            "drop" => Ok(Self::Drop),
            other => Err(format!("invalid nan policy: {other} (expected keep or drop)").into()),
        }
    }
}

/// Outcome of a cleaning pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CleanReport {
    /// Fraction of values that were missing after normalization, over the
    /// pre-drop row count.
    pub missing_fraction: f64,
    /// Rows removed by [`NanPolicy::Drop`].
    pub rows_dropped: usize,
}

/// Normalizes the value column and applies the policy.
pub fn clean(frame: FactorFrame, policy: NanPolicy) -> Result<(FactorFrame, CleanReport)> {
    let name = frame.value_name()?.to_string();
    let mut df = frame.into_inner();
    let before = df.height();
    if before == 0 {
        let report = CleanReport {
            missing_fraction: 0.0,
            rows_dropped: 0,
        };
        return Ok((FactorFrame::new(df)?, report));
    }

    let normalized: Float64Chunked = df
        .column(&name)?
        .as_materialized_series()
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect();
    let missing = normalized.null_count();
    df.with_column(normalized.with_name(name.as_str().into()).into_series())?;

    if policy == NanPolicy::Drop {
        let mask = df
            .column(&name)?
            .as_materialized_series()
            .f64()?
            .is_not_null();
        df = df.filter(&mask)?;
    }

    let report = CleanReport {
        missing_fraction: missing as f64 / before as f64,
        rows_dropped: before - df.height(),
    };
    Ok((FactorFrame::new(df)?, report))
}
