//! Period buckets and computation schedules.

use crate::error::RondaError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A periodic bucket over trading days.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Calendar month.
    #[display("month")]
    Month,
    /// Calendar quarter.
    #[display("quarter")]
    Quarter,
    /// Calendar year.
    #[display("year")]
    Year,
}

impl FromStr for Period {
    type Err = RondaError;

    /// Accepts the short tags used by the storage schema (`m`, `q`, `y`)
    /// as well as the full words.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "m" | "month" => Ok(Self::Month),
            "q" | "quarter" => Ok(Self::Quarter),
            "y" | "year" => Ok(Self::Year),
            other => Err(RondaError::InvalidPeriod(other.to_string())),
        }
    }
}

/// Maps a calendar month (1..=12) to its quarter (1..=4).
#[must_use]
pub const fn quarter_of(month: u32) -> u32 {
    match month {
        1..=3 => 1,
        4..=6 => 2,
        7..=9 => 3,
        _ => 4,
    }
}

/// Which trading days a factor computes on.
///
/// The engine resolves this against the calendar when it enumerates work
/// units, so a period-frequency factor only ever sees the boundary days
/// it asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Schedule {
    /// Every trading day in the range.
    Daily,
    /// The first trading day of each period bucket in the range.
    PeriodStart(Period),
    /// The last trading day of each period bucket in the range.
    PeriodEnd(Period),
}
