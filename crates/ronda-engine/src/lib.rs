#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ronda/issues/")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Parallel execution engine and incremental updater for ronda factors.
//!
//! The engine drives "compute for every trading day in range" over a
//! fixed-size worker pool, aggregates per-day partials in arrival order,
//! sorts and cleans the unified table, and hands it to persistence. The
//! updater layers the staleness check on top: it computes only the missing
//! suffix of history past a series' watermark.
//!
//! No ordering is guaranteed between work units; the only ordering
//! guarantee is on the final table (date ascending). One bad day degrades
//! output completeness instead of aborting the run. Per-unit timeouts are
//! deliberately out of scope here; a production deployment that fears
//! hanging plugins should wrap `compute` with one and treat expiry as a
//! unit failure.

/// The version of the ronda-engine crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod clean;
pub mod persist;
pub mod runner;
pub mod update;

pub use clean::{CleanReport, NanPolicy, clean};
pub use persist::{CHUNK_ROWS, ExportConfig, append_delta, export_parquet, upsert_full};
pub use runner::{RunConfig, RunReport, Runner};
pub use update::{UpdateOutcome, Updater};
