//! The factor plugin trait.
//!
//! This module defines [`Factor`], the capability interface every factor
//! plugin implements. The engine never inspects plugin internals: it calls
//! [`prepare`](Factor::prepare) once per run to let the plugin batch-fetch
//! whatever history it needs, then drives [`compute`](Factor::compute) once
//! per trading day, possibly from many worker threads at once.

use crate::error::Result;
use crate::period::Schedule;
use crate::store::FactorStore;
use crate::types::{Date, Ticker};

/// A factor: a derived per-ticker, per-date numeric signal.
///
/// Implementations must be `Send + Sync`; after `prepare` returns, the
/// engine shares the plugin immutably across its worker pool, so `compute`
/// must be safe to call concurrently and must not depend on the order of
/// other calls.
///
/// # Example
///
/// ```no_run
/// use ronda_traits::{Date, Factor, FactorStore, Result, Ticker};
///
/// struct ConstantFactor;
///
/// impl Factor for ConstantFactor {
///     fn name(&self) -> &str {
///         "constant"
///     }
///
///     fn prepare(&mut self, _store: &dyn FactorStore, _from: Date, _to: Date) -> Result<()> {
///         Ok(())
///     }
///
///     fn compute(&self, _day: Date) -> Result<Vec<(Ticker, f64)>> {
///         Ok(vec![("600519.SH".to_string(), 1.0)])
///     }
/// }
/// ```
pub trait Factor: Send + Sync {
    /// Unique name of this factor; owns exactly one persisted series.
    fn name(&self) -> &str;

    /// The trading days this factor computes on. Daily unless overridden;
    /// a lower-frequency factor returns a period schedule and the engine
    /// only drives `compute` on the matching boundary days.
    fn schedule(&self) -> Schedule {
        Schedule::Daily
    }

    /// Fetches and caches all data the plugin will need for any day in
    /// `[from, to]`, including whatever lookback lead time the plugin
    /// requires. Called exactly once per run, before any `compute` call.
    ///
    /// # Errors
    ///
    /// A failure here is fatal for the whole run; the engine performs no
    /// retries on the plugin's behalf.
    fn prepare(&mut self, store: &dyn FactorStore, from: Date, to: Date) -> Result<()>;

    /// Computes the factor value for every eligible ticker on one trading
    /// day, from the data cached by `prepare`.
    ///
    /// Returning an empty vector is valid (no ticker was eligible that
    /// day). Non-finite values are allowed; the engine's cleaning pass
    /// normalizes them according to the run's NaN policy.
    fn compute(&self, day: Date) -> Result<Vec<(Ticker, f64)>>;
}
