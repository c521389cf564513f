//! In-memory store adapter.
//!
//! Backs tests and fixtures. Holds one table per series behind a mutex,
//! with dates already in their storage (ISO string) form so the adapter
//! exercises the same boundary conversion as a durable store.

use crate::convert;
use polars::prelude::DataFrame;
use ronda_traits::{Date, FactorStore, Result, RondaError};
use std::collections::HashMap;
use std::sync::Mutex;

/// A `FactorStore` kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, DataFrame>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently held for a series, or `None` when absent.
    pub fn row_count(&self, series: &str) -> Result<Option<usize>> {
        Ok(self.lock()?.get(series).map(DataFrame::height))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, DataFrame>>> {
        self.tables
            .lock()
            .map_err(|_| RondaError::Store("store mutex poisoned".to_string()))
    }
}

impl FactorStore for MemoryStore {
    fn upsert_indexed(&self, series: &str, rows: &DataFrame) -> Result<()> {
        let incoming = convert::to_storage(rows)?;
        let mut tables = self.lock()?;
        let merged = convert::upsert(tables.get(series), &incoming)?;
        tables.insert(series.to_string(), merged);
        Ok(())
    }

    fn append_rows(&self, series: &str, rows: &DataFrame) -> Result<()> {
        let incoming = convert::to_storage(rows)?;
        let mut tables = self.lock()?;
        let merged = convert::append(tables.get(series), &incoming)?;
        tables.insert(series.to_string(), merged);
        Ok(())
    }

    fn latest_date(&self, series: &str) -> Result<Option<Date>> {
        match self.lock()?.get(series) {
            None => Ok(None),
            Some(df) => convert::latest(df),
        }
    }

    fn delete_range(&self, series: &str, from: Date, to: Date) -> Result<()> {
        let mut tables = self.lock()?;
        let df = tables
            .get(series)
            .ok_or_else(|| RondaError::MissingSeries(series.to_string()))?;
        let remaining = convert::drop_half_open(df, from, to)?;
        tables.insert(series.to_string(), remaining);
        Ok(())
    }

    fn find_range(
        &self,
        series: &str,
        from: Date,
        to: Option<Date>,
        columns: Option<&[&str]>,
    ) -> Result<DataFrame> {
        let tables = self.lock()?;
        let df = tables
            .get(series)
            .ok_or_else(|| RondaError::MissingSeries(series.to_string()))?;
        let filtered = convert::filter_closed(df, from, to)?;
        convert::project(&filtered, columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use ronda_traits::types::{col, date_column, date_values};

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    fn frame(rows: &[(&str, Date, f64)]) -> DataFrame {
        let tickers: Vec<String> = rows.iter().map(|(t, ..)| (*t).to_string()).collect();
        let dates: Vec<Date> = rows.iter().map(|&(_, d, _)| d).collect();
        let values: Vec<f64> = rows.iter().map(|&(.., v)| v).collect();
        DataFrame::new(vec![
            Column::new(col::TICKER.into(), tickers),
            date_column(col::DATE, &dates),
            Column::new("f".into(), values),
        ])
        .unwrap()
    }

    #[test]
    fn test_upsert_deduplicates_on_key() {
        let store = MemoryStore::new();
        let day = d(2021, 10, 8);
        store
            .upsert_indexed("f", &frame(&[("A", day, 1.0), ("B", day, 2.0)]))
            .unwrap();
        // Same key, new value: must replace, not duplicate.
        store.upsert_indexed("f", &frame(&[("A", day, 9.0)])).unwrap();
        assert_eq!(store.row_count("f").unwrap(), Some(2));

        let df = store.find_range("f", day, Some(day), None).unwrap();
        let vals: Vec<f64> = df
            .column("f")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert!(vals.contains(&9.0));
        assert!(!vals.contains(&1.0));
    }

    #[test]
    fn test_append_does_not_deduplicate() {
        let store = MemoryStore::new();
        let day = d(2021, 10, 8);
        store.append_rows("f", &frame(&[("A", day, 1.0)])).unwrap();
        store.append_rows("f", &frame(&[("A", day, 1.0)])).unwrap();
        assert_eq!(store.row_count("f").unwrap(), Some(2));
    }

    #[test]
    fn test_latest_date_is_watermark() {
        let store = MemoryStore::new();
        assert_eq!(store.latest_date("f").unwrap(), None);
        store
            .append_rows(
                "f",
                &frame(&[("A", d(2021, 10, 8), 1.0), ("A", d(2021, 10, 4), 2.0)]),
            )
            .unwrap();
        assert_eq!(store.latest_date("f").unwrap(), Some(d(2021, 10, 8)));
    }

    #[test]
    fn test_delete_range_is_half_open() {
        let store = MemoryStore::new();
        store
            .append_rows(
                "f",
                &frame(&[
                    ("A", d(2021, 10, 4), 1.0),
                    ("A", d(2021, 10, 8), 2.0),
                    ("A", d(2021, 10, 11), 3.0),
                ]),
            )
            .unwrap();
        store.delete_range("f", d(2021, 10, 4), d(2021, 10, 11)).unwrap();
        assert_eq!(store.row_count("f").unwrap(), Some(1));
        assert_eq!(store.latest_date("f").unwrap(), Some(d(2021, 10, 11)));
    }

    #[test]
    fn test_find_range_is_closed_and_projects() {
        let store = MemoryStore::new();
        store
            .append_rows(
                "f",
                &frame(&[
                    ("A", d(2021, 10, 4), 1.0),
                    ("A", d(2021, 10, 8), 2.0),
                    ("A", d(2021, 10, 11), 3.0),
                ]),
            )
            .unwrap();
        let df = store
            .find_range("f", d(2021, 10, 4), Some(d(2021, 10, 8)), Some(&[col::DATE, "f"]))
            .unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 2);
        // Date column comes back as a real Date dtype.
        assert_eq!(
            date_values(&df).unwrap(),
            vec![d(2021, 10, 4), d(2021, 10, 8)]
        );
    }

    #[test]
    fn test_find_range_missing_series() {
        let store = MemoryStore::new();
        let err = store
            .find_range("absent", d(2021, 1, 1), None, None)
            .unwrap_err();
        assert!(matches!(err, RondaError::MissingSeries(_)));
    }
}
