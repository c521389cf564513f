#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ronda/issues/")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core trait definitions for the ronda factor engine.
//!
//! This crate provides the foundational abstractions shared by the rest of
//! the workspace: the [`Factor`] plugin interface, the [`FactorStore`]
//! persistence seam, the [`FactorFrame`] result table, and the error
//! taxonomy.

/// The version of the ronda-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod error;
pub mod factor;
pub mod period;
pub mod store;
pub mod types;

// Re-exports
pub use error::{Result, RondaError};
pub use factor::Factor;
pub use period::{Period, Schedule};
pub use store::{FactorStore, date_to_iso, iso_to_date};
pub use types::{Date, FactorFrame, Ticker};
