#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ronda/issues/")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Persistence adapters for the ronda factor engine.
//!
//! Two implementations of the [`FactorStore`](ronda_traits::FactorStore)
//! seam: [`MemoryStore`] for tests and fixtures, and [`ParquetStore`] for a
//! durable directory-of-parquet layout. Both serialize dates as ISO
//! `YYYY-MM-DD` strings at the boundary.

/// The version of the ronda-store crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod convert;
pub mod memory;
pub mod parquet;

pub use memory::MemoryStore;
pub use parquet::ParquetStore;
