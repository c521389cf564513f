//! Date conversion and row-level operations shared by the adapters.
//!
//! At the storage boundary dates travel as ISO `YYYY-MM-DD` strings: the
//! conversion is explicit in both directions so no adapter ever relies on a
//! native timestamp encoding. ISO strings sort lexicographically in date
//! order, which every range filter here exploits.

use polars::prelude::*;
use ronda_traits::types::{col, date_to_days, days_to_date};
use ronda_traits::{Date, Result, RondaError, date_to_iso, iso_to_date};
use std::collections::HashMap;

/// Converts a table's `date` column from the polars `Date` dtype to ISO
/// strings for storage. Tables without a `date` column pass through.
pub(crate) fn to_storage(df: &DataFrame) -> Result<DataFrame> {
    let mut out = df.clone();
    let Ok(column) = df.column(col::DATE) else {
        return Ok(out);
    };
    if column.dtype() == &DataType::String {
        return Ok(out);
    }
    let dates = column.as_materialized_series().date()?;
    let iso: StringChunked = dates
        .into_iter()
        .map(|d| d.and_then(days_to_date).map(date_to_iso))
        .collect();
    out.with_column(iso.with_name(col::DATE.into()).into_series())?;
    Ok(out)
}

/// Converts a stored table's `date` column back to the polars `Date` dtype.
pub(crate) fn from_storage(df: &DataFrame) -> Result<DataFrame> {
    let mut out = df.clone();
    let Ok(column) = df.column(col::DATE) else {
        return Ok(out);
    };
    if column.dtype() == &DataType::Date {
        return Ok(out);
    }
    let iso = column.as_materialized_series().str()?;
    let days = iso
        .into_iter()
        .map(|s| s.map(|s| iso_to_date(s).map(date_to_days)).transpose())
        .collect::<Result<Vec<Option<i32>>>>()?;
    let dates = Int32Chunked::from_iter_options(col::DATE.into(), days.into_iter()).into_date();
    out.with_column(dates.into_series())?;
    Ok(out)
}

fn date_strs(df: &DataFrame) -> Result<Vec<String>> {
    let iso = df.column(col::DATE)?.as_materialized_series().str()?;
    iso.into_iter()
        .map(|s| {
            s.map(str::to_owned)
                .ok_or_else(|| RondaError::InvalidDate("null date in stored table".to_string()))
        })
        .collect()
}

/// The maximum date in a stored table, or `None` when it has no rows.
pub(crate) fn latest(df: &DataFrame) -> Result<Option<Date>> {
    let mut max: Option<String> = None;
    for s in date_strs(df)? {
        if max.as_deref().is_none_or(|m| s.as_str() > m) {
            max = Some(s);
        }
    }
    max.as_deref().map(iso_to_date).transpose()
}

/// Keeps rows with dates in the closed range `[from, to]` (`to = None`
/// leaves the upper end unbounded).
pub(crate) fn filter_closed(df: &DataFrame, from: Date, to: Option<Date>) -> Result<DataFrame> {
    let from = date_to_iso(from);
    let to = to.map(date_to_iso);
    let mask: Vec<bool> = date_strs(df)?
        .iter()
        .map(|d| d.as_str() >= from.as_str() && to.as_deref().is_none_or(|t| d.as_str() <= t))
        .collect();
    Ok(df.filter(&BooleanChunked::from_slice("mask".into(), &mask))?)
}

/// Drops rows with dates in the half-open range `[from, to)`.
pub(crate) fn drop_half_open(df: &DataFrame, from: Date, to: Date) -> Result<DataFrame> {
    let from = date_to_iso(from);
    let to = date_to_iso(to);
    let mask: Vec<bool> = date_strs(df)?
        .iter()
        .map(|d| d.as_str() < from.as_str() || d.as_str() >= to.as_str())
        .collect();
    Ok(df.filter(&BooleanChunked::from_slice("mask".into(), &mask))?)
}

/// Reorders `incoming` to the stored schema so tables can be stacked.
fn align_schema(existing: &DataFrame, incoming: &DataFrame) -> Result<DataFrame> {
    if existing.width() != incoming.width() {
        return Err(RondaError::Store(format!(
            "schema mismatch: stored table has {} columns, incoming has {}",
            existing.width(),
            incoming.width()
        )));
    }
    incoming
        .select(existing.get_column_names().iter().map(|s| s.as_str()))
        .map_err(Into::into)
}

/// Stacks `incoming` onto `existing` with no key check.
pub(crate) fn append(existing: Option<&DataFrame>, incoming: &DataFrame) -> Result<DataFrame> {
    match existing {
        None => Ok(incoming.clone()),
        Some(stored) => {
            let mut out = stored.clone();
            out.vstack_mut(&align_schema(stored, incoming)?)?;
            Ok(out)
        }
    }
}

/// Stacks and then deduplicates on the compound key, keeping the last
/// occurrence — the Mongo-upsert "last write wins" rule. The key is
/// (ticker, date) when a ticker column exists, date alone otherwise.
pub(crate) fn upsert(existing: Option<&DataFrame>, incoming: &DataFrame) -> Result<DataFrame> {
    let stacked = append(existing, incoming)?;
    let dates = date_strs(&stacked)?;
    let tickers: Option<Vec<String>> = match stacked.column(col::TICKER) {
        Ok(c) => Some(
            c.as_materialized_series()
                .str()?
                .into_iter()
                .map(|t| t.unwrap_or_default().to_owned())
                .collect(),
        ),
        Err(_) => None,
    };

    let mut last_index: HashMap<(String, String), usize> = HashMap::new();
    let keys: Vec<(String, String)> = dates
        .into_iter()
        .enumerate()
        .map(|(i, d)| {
            let t = tickers.as_ref().map(|ts| ts[i].clone()).unwrap_or_default();
            (t, d)
        })
        .collect();
    for (i, key) in keys.iter().enumerate() {
        last_index.insert(key.clone(), i);
    }
    let mask: Vec<bool> = keys
        .iter()
        .enumerate()
        .map(|(i, key)| last_index[key] == i)
        .collect();
    Ok(stacked.filter(&BooleanChunked::from_slice("mask".into(), &mask))?)
}

/// Applies an optional column projection, then converts the `date` column
/// back to the `Date` dtype for the caller.
pub(crate) fn project(df: &DataFrame, columns: Option<&[&str]>) -> Result<DataFrame> {
    let selected = match columns {
        Some(cols) => df.select(cols.iter().copied())?,
        None => df.clone(),
    };
    from_storage(&selected)
}
