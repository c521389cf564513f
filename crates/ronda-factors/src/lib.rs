//! Bundled factor plugins for the ronda factor engine.
//!
//! This crate provides concrete [`Factor`](ronda_traits::Factor)
//! implementations across three categories:
//! - Volatility: Bayes-adjusted market beta
//! - Liquidity: abnormal turnover
//! - Technical: rolling return skewness
//!
//! Each factor loads its inputs once in `prepare` and answers per-day
//! `compute` calls from an in-memory panel, so the engine can fan days out
//! across worker threads.
//!
//! # Example
//!
//! ```ignore
//! use ronda_factors::beta::BayesBeta;
//! use ronda_factors::registry::{available_factors, build_factor};
//!
//! // Discover available factors, then build one by name or alias.
//! let infos = available_factors();
//! let factor = build_factor("beta", calendar).unwrap();
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod beta;
pub mod panel;
pub mod registry;
pub mod skewness;
pub mod turnover;

// Re-export key types
pub use registry::{FactorCategory, FactorInfo, available_factors, build_factor};
