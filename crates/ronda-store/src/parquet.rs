//! Durable store adapter: one parquet file per series.
//!
//! Layout: `{root}/{series}.parquet`, dates stored as ISO strings. Writes
//! are atomic (write to `.tmp`, rename into place), following the parquet
//! cache convention used elsewhere in the stack. A single logical writer
//! per series is assumed.

use crate::convert;
use polars::prelude::*;
use ronda_traits::{Date, FactorStore, Result, RondaError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A `FactorStore` backed by a directory of parquet files.
#[derive(Debug)]
pub struct ParquetStore {
    root: PathBuf,
}

impl ParquetStore {
    /// Opens (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .map_err(|e| RondaError::Store(format!("cannot create store root: {e}")))?;
        Ok(Self { root })
    }

    /// Root directory of the store.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, series: &str) -> PathBuf {
        self.root.join(format!("{series}.parquet"))
    }

    fn read(&self, series: &str) -> Result<Option<DataFrame>> {
        let path = self.path(series);
        if !path.exists() {
            return Ok(None);
        }
        let file = fs::File::open(&path)
            .map_err(|e| RondaError::Store(format!("cannot open {}: {e}", path.display())))?;
        let df = ParquetReader::new(file).finish()?;
        Ok(Some(df))
    }

    fn write_atomic(&self, series: &str, mut df: DataFrame) -> Result<()> {
        let path = self.path(series);
        let tmp = path.with_extension("parquet.tmp");
        let file = fs::File::create(&tmp)
            .map_err(|e| RondaError::Store(format!("cannot create {}: {e}", tmp.display())))?;
        ParquetWriter::new(file).finish(&mut df)?;
        fs::rename(&tmp, &path)
            .map_err(|e| RondaError::Store(format!("cannot commit {}: {e}", path.display())))?;
        debug!(series, rows = df.height(), "series written");
        Ok(())
    }
}

impl FactorStore for ParquetStore {
    fn upsert_indexed(&self, series: &str, rows: &DataFrame) -> Result<()> {
        let incoming = convert::to_storage(rows)?;
        let merged = convert::upsert(self.read(series)?.as_ref(), &incoming)?;
        self.write_atomic(series, merged)
    }

    fn append_rows(&self, series: &str, rows: &DataFrame) -> Result<()> {
        let incoming = convert::to_storage(rows)?;
        let merged = convert::append(self.read(series)?.as_ref(), &incoming)?;
        self.write_atomic(series, merged)
    }

    fn latest_date(&self, series: &str) -> Result<Option<Date>> {
        match self.read(series)? {
            None => Ok(None),
            Some(df) => convert::latest(&df),
        }
    }

    fn delete_range(&self, series: &str, from: Date, to: Date) -> Result<()> {
        let df = self
            .read(series)?
            .ok_or_else(|| RondaError::MissingSeries(series.to_string()))?;
        let remaining = convert::drop_half_open(&df, from, to)?;
        self.write_atomic(series, remaining)
    }

    fn find_range(
        &self,
        series: &str,
        from: Date,
        to: Option<Date>,
        columns: Option<&[&str]>,
    ) -> Result<DataFrame> {
        let df = self
            .read(series)?
            .ok_or_else(|| RondaError::MissingSeries(series.to_string()))?;
        let filtered = convert::filter_closed(&df, from, to)?;
        convert::project(&filtered, columns)
    }
}
