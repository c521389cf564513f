//! Factor registry.
//!
//! Maps factor names (and their legacy aliases) to constructors so callers
//! can build any bundled factor from a string.

use crate::beta::BayesBeta;
use crate::skewness::ReturnSkewness;
use crate::turnover::AbnormalTurnover;
use ronda_calendar::Calendar;
use ronda_traits::Factor;
use serde::Serialize;
use std::sync::Arc;

/// Broad grouping of the bundled factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum FactorCategory {
    /// Risk and volatility measures.
    #[display("volatility")]
    Volatility,
    /// Trading-activity measures.
    #[display("liquidity")]
    Liquidity,
    /// Price- and return-shape measures.
    #[display("technical")]
    Technical,
}

impl FactorCategory {
    /// Human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Volatility => "risk and volatility measures",
            Self::Liquidity => "trading-activity measures",
            Self::Technical => "price- and return-shape measures",
        }
    }
}

/// Metadata for one bundled factor.
#[derive(Debug, Clone, Serialize)]
pub struct FactorInfo {
    /// Canonical name, also the value column of the output frame.
    pub name: &'static str,
    /// Category the factor belongs to.
    pub category: FactorCategory,
    /// One-line description.
    pub description: &'static str,
    /// Default rolling window in trading days.
    pub lookback_days: usize,
    /// Legacy short names accepted by [`build_factor`].
    pub aliases: &'static [&'static str],
}

/// All bundled factors with their metadata.
#[must_use]
pub fn available_factors() -> Vec<FactorInfo> {
    vec![
        FactorInfo {
            name: "bayes_beta_250",
            category: FactorCategory::Volatility,
            description: "Vasicek-shrunk market beta over a 250-day window",
            lookback_days: 250,
            aliases: &["f00002", "beta"],
        },
        FactorInfo {
            name: "abnormal_turnover",
            category: FactorCategory::Liquidity,
            description: "latest turnover relative to its 20-day mean",
            lookback_days: 20,
            aliases: &["f00012", "abturn"],
        },
        FactorInfo {
            name: "return_skewness",
            category: FactorCategory::Technical,
            description: "skewness of daily returns over a 60-day window",
            lookback_days: 60,
            aliases: &["f00014", "ts"],
        },
    ]
}

/// Builds a bundled factor by canonical name or alias. Returns `None` for
/// unknown names.
#[must_use]
pub fn build_factor(name: &str, calendar: Arc<Calendar>) -> Option<Box<dyn Factor>> {
    let canonical = available_factors()
        .into_iter()
        .find(|info| info.name == name || info.aliases.contains(&name))?
        .name;
    match canonical {
        "bayes_beta_250" => Some(Box::new(BayesBeta::with_defaults(calendar))),
        "abnormal_turnover" => Some(Box::new(AbnormalTurnover::with_defaults(calendar))),
        "return_skewness" => Some(Box::new(ReturnSkewness::with_defaults(calendar))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ronda_traits::Date;

    fn calendar() -> Arc<Calendar> {
        Arc::new(Calendar::from_days(vec![
            Date::from_ymd_opt(2021, 11, 1).unwrap(),
        ]))
    }

    #[test]
    fn test_canonical_names_resolve() {
        for info in available_factors() {
            let factor = build_factor(info.name, calendar()).unwrap();
            assert_eq!(factor.name(), info.name);
        }
    }

    #[test]
    fn test_aliases_resolve() {
        for (alias, canonical) in [
            ("f00002", "bayes_beta_250"),
            ("beta", "bayes_beta_250"),
            ("f00012", "abnormal_turnover"),
            ("abturn", "abnormal_turnover"),
            ("f00014", "return_skewness"),
            ("ts", "return_skewness"),
        ] {
            let factor = build_factor(alias, calendar()).unwrap();
            assert_eq!(factor.name(), canonical);
        }
    }

    #[test]
    fn test_unknown_name() {
        assert!(build_factor("nope", calendar()).is_none());
    }
}
