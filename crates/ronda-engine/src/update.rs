//! The incremental updater.
//!
//! Compares a factor series' watermark (its latest persisted date) against
//! the latest date in the upstream reference series. When the upstream is
//! ahead, only the missing suffix of history is computed and appended —
//! never recomputed, never overwritten. Both dates are read fresh from the
//! store on every call, which is what makes back-to-back updates true
//! no-ops.

use crate::persist::append_delta;
use crate::runner::{RunConfig, Runner};
use ronda_calendar::Calendar;
use ronda_traits::store::series;
use ronda_traits::{Date, Factor, FactorStore, Result, RondaError};
use std::sync::Arc;
use tracing::info;

/// What an update call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The watermark already covers the upstream; nothing was computed.
    UpToDate,
    /// The missing suffix was computed and appended.
    Appended {
        /// First trading day of the computed suffix.
        from: Date,
        /// Last trading day of the computed suffix (the upstream max).
        to: Date,
        /// Rows appended.
        rows: usize,
    },
}

/// Drives incremental factor maintenance.
#[derive(Debug, Clone)]
pub struct Updater {
    runner: Runner,
}

impl Updater {
    /// Creates an updater over a shared calendar.
    #[must_use]
    pub const fn new(calendar: Arc<Calendar>, config: RunConfig) -> Self {
        Self {
            runner: Runner::new(calendar, config),
        }
    }

    /// The underlying execution engine.
    #[must_use]
    pub const fn runner(&self) -> &Runner {
        &self.runner
    }

    /// Brings a factor series up to date with the upstream reference
    /// series.
    ///
    /// # Errors
    ///
    /// Fails when either the factor series or the upstream series has no
    /// watermark — an update presumes an initial full run has been
    /// persisted.
    pub fn update(
        &self,
        factor: &mut dyn Factor,
        store: &dyn FactorStore,
    ) -> Result<UpdateOutcome> {
        let name = factor.name().to_string();
        let watermark = store
            .latest_date(&name)?
            .ok_or_else(|| RondaError::MissingSeries(name.clone()))?;
        let upstream = store
            .latest_date(series::DAILY_RETURNS)?
            .ok_or_else(|| RondaError::MissingSeries(series::DAILY_RETURNS.to_string()))?;

        if watermark >= upstream {
            info!(factor = %name, %watermark, "series already current; nothing to do");
            return Ok(UpdateOutcome::UpToDate);
        }

        let from = self.runner.calendar().offset(watermark, 1)?;
        info!(factor = %name, %from, to = %upstream, "computing missing suffix");

        let report = self.runner.run_full(factor, store, from, upstream)?;
        let rows = append_delta(store, &report.frame)?;

        Ok(UpdateOutcome::Appended {
            from,
            to: upstream,
            rows,
        })
    }

    /// Deletes persisted rows for `series_name` with dates in
    /// `[from, to + 1 trading day)` — the upper bound is made exclusive by
    /// a one-day forward shift, matching the store's half-open delete.
    /// When `to` is on or past the last known trading day there is no next
    /// trading day to shift to, so the next calendar day is used and the
    /// whole suffix is removed.
    pub fn delete_range(
        &self,
        store: &dyn FactorStore,
        series_name: &str,
        from: Date,
        to: Date,
    ) -> Result<()> {
        let calendar = self.runner.calendar();
        let end = if calendar.last().is_some_and(|last| to < last) {
            calendar.offset(to, 1)?
        } else {
            to.succ_opt()
                .ok_or_else(|| RondaError::InvalidDate(format!("no day after {to}")))?
        };
        info!(series = series_name, %from, %end, "deleting persisted rows");
        store.delete_range(series_name, from, end)
    }
}
