#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ronda/issues/")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Trading-day calendar for the ronda factor engine.
//!
//! Enumerates valid computation dates, offsets dates along the trading
//! sequence, extracts periodic (month / quarter / year) boundaries, and
//! keeps the persisted calendar synchronized with the upstream reference
//! series.

/// The version of the ronda-calendar crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod calendar;

pub use calendar::{Calendar, TradingDay};
pub use ronda_traits::period::{Period, Schedule, quarter_of};

#[cfg(test)]
mod tests {
    use super::*;
    use ronda_store::MemoryStore;
    use ronda_traits::store::series;
    use ronda_traits::types::{col, date_column};
    use ronda_traits::{Date, FactorStore};

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    fn seed_calendar(store: &MemoryStore, dates: &[Date]) {
        use chrono::Datelike;
        let month: Vec<i32> = dates.iter().map(|d| d.month() as i32).collect();
        let quarter: Vec<i32> = month
            .iter()
            .map(|&m| quarter_of(m as u32) as i32)
            .collect();
        let year: Vec<i32> = dates.iter().map(Datelike::year).collect();
        let df = polars::prelude::DataFrame::new(vec![
            date_column(col::DATE, dates),
            polars::prelude::Column::new("month".into(), month),
            polars::prelude::Column::new("quarter".into(), quarter),
            polars::prelude::Column::new("year".into(), year),
        ])
        .unwrap();
        store.append_rows(series::TRADE_DATES, &df).unwrap();
    }

    fn seed_returns(store: &MemoryStore, dates: &[Date]) {
        let tickers: Vec<String> = dates.iter().map(|_| "600519.SH".to_string()).collect();
        let rets: Vec<f64> = dates.iter().map(|_| 0.01).collect();
        let df = polars::prelude::DataFrame::new(vec![
            date_column(col::DATE, dates),
            polars::prelude::Column::new(col::TICKER.into(), tickers),
            polars::prelude::Column::new("ret".into(), rets),
        ])
        .unwrap();
        store.append_rows(series::DAILY_RETURNS, &df).unwrap();
    }

    #[test]
    fn test_load_without_refresh() {
        let store = MemoryStore::new();
        seed_calendar(&store, &[d(2021, 10, 8), d(2021, 10, 11)]);
        let cal = Calendar::load(&store, d(2021, 1, 1), false).unwrap();
        assert_eq!(cal.len(), 2);
        assert_eq!(cal.first(), Some(d(2021, 10, 8)));
    }

    #[test]
    fn test_refresh_appends_missing_suffix() {
        let store = MemoryStore::new();
        seed_calendar(&store, &[d(2021, 10, 8)]);
        seed_returns(&store, &[d(2021, 10, 8), d(2021, 10, 11), d(2021, 10, 12)]);

        assert!(Calendar::refresh(&store).unwrap());
        let cal = Calendar::load(&store, d(2021, 1, 1), false).unwrap();
        assert_eq!(cal.len(), 3);
        assert_eq!(cal.last(), Some(d(2021, 10, 12)));
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let store = MemoryStore::new();
        seed_calendar(&store, &[d(2021, 10, 8)]);
        seed_returns(&store, &[d(2021, 10, 8), d(2021, 10, 11)]);

        assert!(Calendar::refresh(&store).unwrap());
        // No upstream advance since the first refresh.
        assert!(!Calendar::refresh(&store).unwrap());
        let cal = Calendar::load(&store, d(2021, 1, 1), true).unwrap();
        assert_eq!(cal.len(), 2);
    }

    #[test]
    fn test_load_honors_start_date() {
        let store = MemoryStore::new();
        seed_calendar(&store, &[d(2020, 12, 31), d(2021, 10, 8)]);
        let cal = Calendar::load(&store, d(2021, 1, 1), false).unwrap();
        assert_eq!(cal.len(), 1);
    }
}
