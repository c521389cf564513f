//! Persistence glue: chunked writes and the optional file export.
//!
//! Upsert batches are chunked so a mid-batch failure can report exactly
//! which rows made it in and which did not — persistence errors are fatal
//! for the run and never silently swallowed.

use polars::prelude::*;
use ronda_traits::{FactorFrame, FactorStore, Result, RondaError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Rows per store write.
pub const CHUNK_ROWS: usize = 100_000;

#[derive(Debug, Clone, Copy)]
enum WriteMode {
    Upsert,
    Append,
}

/// Writes a full run's table with upsert-by-(ticker, date) semantics.
/// Returns the number of rows persisted.
pub fn upsert_full(store: &dyn FactorStore, frame: &FactorFrame) -> Result<usize> {
    chunked_write(store, frame, WriteMode::Upsert)
}

/// Appends an incremental delta without key checks. The caller has already
/// established every row lies strictly past the watermark.
pub fn append_delta(store: &dyn FactorStore, frame: &FactorFrame) -> Result<usize> {
    chunked_write(store, frame, WriteMode::Append)
}

fn chunked_write(store: &dyn FactorStore, frame: &FactorFrame, mode: WriteMode) -> Result<usize> {
    let series = frame.value_name()?.to_string();
    let df = frame.data();
    let total = df.height();
    let mut persisted = 0usize;

    while persisted < total {
        let chunk = df.slice(persisted as i64, CHUNK_ROWS);
        let written = match mode {
            WriteMode::Upsert => store.upsert_indexed(&series, &chunk),
            WriteMode::Append => store.append_rows(&series, &chunk),
        };
        if let Err(cause) = written {
            return Err(RondaError::PartialWrite {
                series,
                persisted,
                remaining: total - persisted,
                cause: cause.to_string(),
            });
        }
        persisted += chunk.height();
        debug!(series = %series, persisted, total, "chunk persisted");
    }

    if total > 0 {
        info!(series = %series, rows = total, "series persisted");
    }
    Ok(total)
}

/// File-export settings for a full run.
///
/// Mirrors the run configuration surface: a run may ask for a parquet
/// snapshot of the unified table next to the store write.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Whether a parquet snapshot is requested.
    pub enabled: bool,
    /// Directory the snapshot is written to.
    pub dir: Option<PathBuf>,
}

impl ExportConfig {
    /// Fails fast — before any computation — when an export is requested
    /// without a destination.
    pub fn validate(&self) -> Result<()> {
        if self.enabled && self.dir.is_none() {
            return Err(RondaError::MissingConfiguration(
                "parquet export requested but no export directory supplied".to_string(),
            ));
        }
        Ok(())
    }
}

/// Writes the unified table as `{dir}/{series}.parquet` (atomic: tmp file
/// then rename).
pub fn export_parquet(frame: &FactorFrame, dir: &Path) -> Result<PathBuf> {
    let series = frame.value_name()?;
    fs::create_dir_all(dir)
        .map_err(|e| RondaError::Store(format!("cannot create export dir: {e}")))?;
    let path = dir.join(format!("{series}.parquet"));
    let tmp = path.with_extension("parquet.tmp");

    let file = fs::File::create(&tmp)
        .map_err(|e| RondaError::Store(format!("cannot create {}: {e}", tmp.display())))?;
    let mut df = frame.data().clone();
    ParquetWriter::new(file).finish(&mut df)?;
    fs::rename(&tmp, &path)
        .map_err(|e| RondaError::Store(format!("cannot commit {}: {e}", path.display())))?;

    info!(series, path = %path.display(), "export written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ronda_store::MemoryStore;
    use ronda_traits::Date;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    fn small_frame() -> FactorFrame {
        FactorFrame::from_day_rows(
            "f",
            d(2021, 10, 8),
            &[("A".to_string(), 1.0), ("B".to_string(), 2.0)],
        )
        .unwrap()
    }

    #[test]
    fn test_upsert_full_roundtrip() {
        let store = MemoryStore::new();
        let rows = upsert_full(&store, &small_frame()).unwrap();
        assert_eq!(rows, 2);
        assert_eq!(store.row_count("f").unwrap(), Some(2));

        // Upserting again must not duplicate.
        upsert_full(&store, &small_frame()).unwrap();
        assert_eq!(store.row_count("f").unwrap(), Some(2));
    }

    #[test]
    fn test_empty_frame_writes_nothing() {
        let store = MemoryStore::new();
        let rows = upsert_full(&store, &FactorFrame::empty("f")).unwrap();
        assert_eq!(rows, 0);
        assert_eq!(store.row_count("f").unwrap(), None);
    }

    // Delegates to an inner store but starts refusing writes after a set
    // number of calls.
    struct FailingStore {
        inner: MemoryStore,
        successes_allowed: usize,
        calls: std::sync::atomic::AtomicUsize,
    }

    impl FailingStore {
        fn after(successes_allowed: usize) -> Self {
            Self {
                inner: MemoryStore::new(),
                successes_allowed,
                calls: std::sync::atomic::AtomicUsize::new(0),
            }
        }

        fn admit(&self) -> Result<()> {
            let call = self
                .calls
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if call < self.successes_allowed {
                Ok(())
            } else {
                Err(RondaError::Store("disk full".to_string()))
            }
        }
    }

    impl FactorStore for FailingStore {
        fn upsert_indexed(&self, series: &str, rows: &DataFrame) -> Result<()> {
            self.admit()?;
            self.inner.upsert_indexed(series, rows)
        }

        fn append_rows(&self, series: &str, rows: &DataFrame) -> Result<()> {
            self.admit()?;
            self.inner.append_rows(series, rows)
        }

        fn latest_date(&self, series: &str) -> Result<Option<Date>> {
            self.inner.latest_date(series)
        }

        fn delete_range(&self, series: &str, from: Date, to: Date) -> Result<()> {
            self.inner.delete_range(series, from, to)
        }

        fn find_range(
            &self,
            series: &str,
            from: Date,
            to: Option<Date>,
            columns: Option<&[&str]>,
        ) -> Result<DataFrame> {
            self.inner.find_range(series, from, to, columns)
        }
    }

    fn wide_frame(rows: usize) -> FactorFrame {
        let values: Vec<(String, f64)> = (0..rows).map(|i| (format!("T{i}"), 1.0)).collect();
        FactorFrame::from_day_rows("f", d(2021, 10, 8), &values).unwrap()
    }

    #[test]
    fn test_partial_write_reports_persisted_and_remaining() {
        // One full chunk and a half: the first chunk lands, the second is
        // refused mid-batch.
        let store = FailingStore::after(1);
        let frame = wide_frame(CHUNK_ROWS + CHUNK_ROWS / 2);

        let err = upsert_full(&store, &frame).unwrap_err();
        match err {
            RondaError::PartialWrite {
                series,
                persisted,
                remaining,
                cause,
            } => {
                assert_eq!(series, "f");
                assert_eq!(persisted, CHUNK_ROWS);
                assert_eq!(remaining, CHUNK_ROWS / 2);
                assert!(cause.contains("disk full"));
            }
            other => panic!("expected PartialWrite, got {other}"),
        }

        // Rows written before the failure are durably present.
        assert_eq!(store.inner.row_count("f").unwrap(), Some(CHUNK_ROWS));
    }

    #[test]
    fn test_append_delta_partial_write() {
        let store = FailingStore::after(0);
        let err = append_delta(&store, &small_frame()).unwrap_err();
        assert!(matches!(
            err,
            RondaError::PartialWrite {
                persisted: 0,
                remaining: 2,
                ..
            }
        ));
        assert_eq!(store.inner.row_count("f").unwrap(), None);
    }

    #[test]
    fn test_export_requires_directory() {
        let config = ExportConfig {
            enabled: true,
            dir: None,
        };
        assert!(matches!(
            config.validate(),
            Err(RondaError::MissingConfiguration(_))
        ));
        assert!(ExportConfig::default().validate().is_ok());
    }

    #[test]
    fn test_export_writes_parquet() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_parquet(&small_frame(), dir.path()).unwrap();
        assert!(path.exists());
        assert_eq!(path.file_name().unwrap(), "f.parquet");
    }
}
