#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # ronda
//!
//! Trading-calendar aware factor computation engine.
//!
//! ronda is an umbrella crate that re-exports all ronda sub-crates for
//! convenience. It provides a unified API for enumerating trading days,
//! running factor computations across worker threads, and persisting the
//! resulting panels.
//!
//! ## Quick Start
//!
//! ```ignore
//! use ronda::{Calendar, Runner, RunConfig, Result};
//! use ronda::factors::build_factor;
//! use ronda::store::ParquetStore;
//! use ronda::types::Date;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<()> {
//! let store = ParquetStore::open("data")?;
//! let calendar = Arc::new(Calendar::load(
//!     &store,
//!     Date::from_ymd_opt(2020, 1, 1).unwrap(),
//!     false,
//! )?);
//!
//! let mut factor = build_factor("bayes_beta_250", Arc::clone(&calendar))
//!     .ok_or("unknown factor")?;
//!
//! let runner = Runner::new(calendar, RunConfig::default());
//! let report = runner.run_full(
//!     factor.as_mut(),
//!     &store,
//!     Date::from_ymd_opt(2021, 1, 1).unwrap(),
//!     Date::from_ymd_opt(2021, 12, 31).unwrap(),
//! )?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`traits`] - Core trait definitions ([`Factor`], [`FactorStore`]) and shared types
//! - [`calendar`] - Trading-day calendar (enumerate, offset, period boundaries)
//! - [`engine`] - Parallel runner, NaN cleaning, persistence glue, incremental updater
//! - [`store`] - Persistence adapters (in-memory and parquet-backed)
//! - [`factors`] - Bundled factor implementations and the name registry
//!
//! ## Architecture
//!
//! ronda follows a modular architecture:
//!
//! 1. **Calendar** turns a date window into the trading days to compute
//! 2. **Factors** prepare their inputs once and score tickers per day
//! 3. **Runner** fans days out across a thread pool and assembles the panel
//! 4. **Stores** persist panels in chunks and answer range queries

/// Version information for the ronda crate.
///
/// This constant contains the current version of ronda as specified in Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core trait definitions and shared types.
///
/// Re-exports [`ronda_traits`]: the [`Factor`] plugin trait, the
/// [`FactorStore`] persistence trait, the [`FactorFrame`] output wrapper,
/// and the error type.
pub mod traits {
    pub use ronda_traits::*;
}

/// Trading-day calendar.
///
/// Re-exports [`ronda_calendar`]: [`Calendar`], [`TradingDay`] and
/// [`Period`].
pub mod calendar {
    pub use ronda_calendar::*;
}

/// Execution engine.
///
/// Re-exports [`ronda_engine`]: the parallel [`Runner`], NaN cleaning
/// policies, chunked persistence helpers, and the incremental
/// [`Updater`](ronda_engine::Updater).
pub mod engine {
    pub use ronda_engine::*;
}

/// Persistence adapters.
///
/// Re-exports [`ronda_store`]: [`MemoryStore`](ronda_store::MemoryStore)
/// for tests and [`ParquetStore`](ronda_store::ParquetStore) for on-disk
/// data.
pub mod store {
    pub use ronda_store::*;
}

/// Bundled factor implementations.
///
/// Re-exports [`ronda_factors`]: the beta, turnover, and skewness factors
/// plus [`build_factor`](ronda_factors::build_factor) and
/// [`available_factors`](ronda_factors::available_factors).
pub mod factors {
    pub use ronda_factors::*;
}

/// Shared scalar and frame types.
pub mod types {
    pub use ronda_traits::types::*;
    pub use ronda_traits::{Date, Ticker};
}

// Re-export core traits and types at top level for convenience
pub use ronda_calendar::{Calendar, Period, TradingDay};
pub use ronda_engine::{NanPolicy, RunConfig, RunReport, Runner, UpdateOutcome, Updater};
pub use ronda_traits::{Date, Factor, FactorFrame, FactorStore, Result, RondaError, Schedule, Ticker};
