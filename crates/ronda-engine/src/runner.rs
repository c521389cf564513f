//! The execution engine: drives one factor computation per trading day
//! across a worker pool and aggregates the partial results.
//!
//! Per-date computations are fully independent; results arrive in
//! unspecified order and are concatenated, sorted ascending by date, and
//! cleaned once every unit has resolved. A failure in one date's
//! computation is logged and excluded — it never aborts the run.

use crate::clean::{CleanReport, NanPolicy, clean};
use polars::prelude::DataFrame;
use rayon::prelude::*;
use ronda_calendar::Calendar;
use ronda_traits::{Date, Factor, FactorFrame, FactorStore, Result, RondaError, Schedule};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Execution parameters for a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Degree of parallelism for per-date work units.
    pub workers: usize,
    /// Cleaning policy applied after aggregation.
    pub nan_policy: NanPolicy,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            nan_policy: NanPolicy::default(),
        }
    }
}

/// Outcome of a full run.
#[derive(Debug)]
pub struct RunReport {
    /// The unified, cleaned factor table, sorted ascending by date.
    pub frame: FactorFrame,
    /// Trading days enumerated for the range.
    pub days_total: usize,
    /// Days whose computation failed and was excluded.
    pub days_failed: usize,
    /// Cleaning statistics for the run.
    pub clean: CleanReport,
}

/// The per-date execution engine.
#[derive(Debug, Clone)]
pub struct Runner {
    calendar: Arc<Calendar>,
    config: RunConfig,
}

impl Runner {
    /// Creates a runner over a shared calendar.
    #[must_use]
    pub const fn new(calendar: Arc<Calendar>, config: RunConfig) -> Self {
        Self { calendar, config }
    }

    /// The calendar this runner enumerates dates from.
    #[must_use]
    pub const fn calendar(&self) -> &Arc<Calendar> {
        &self.calendar
    }

    /// The run configuration.
    #[must_use]
    pub const fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Computes a factor for every scheduled trading day in the closed
    /// range `[from, to]` — all of them for a daily factor, only the
    /// period boundary days for a lower-frequency one.
    ///
    /// The plugin's preparation hook runs exactly once for the whole range
    /// (it batch-fetches all history it needs); per-day computations then
    /// run on a pool of `workers` threads. Missing days in the output mean
    /// those days failed (and were logged), not that they were null-filled.
    pub fn run_full(
        &self,
        factor: &mut dyn Factor,
        store: &dyn FactorStore,
        from: Date,
        to: Date,
    ) -> Result<RunReport> {
        let name = factor.name().to_string();

        let t0 = Instant::now();
        info!(factor = %name, %from, %to, "fetching plugin data");
        factor.prepare(store, from, to)?;
        debug!(factor = %name, elapsed_ms = t0.elapsed().as_millis() as u64, "preparation finished");

        // The plugin picks its own cadence; period-frequency factors only
        // ever see boundary days.
        let days = match factor.schedule() {
            Schedule::Daily => self.calendar.enumerate(from, to)?,
            Schedule::PeriodStart(period) => {
                self.calendar.period_boundary(from, to, period, true)?
            }
            Schedule::PeriodEnd(period) => {
                self.calendar.period_boundary(from, to, period, false)?
            }
        };
        let days_total = days.len();

        // Prepared; from here the plugin is shared immutably by the pool.
        let factor: &dyn Factor = factor;
        let workers = self.config.workers.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| RondaError::Other(format!("worker pool: {e}")))?;

        let t0 = Instant::now();
        let results: Vec<std::result::Result<DataFrame, (Date, RondaError)>> = pool.install(|| {
            days.par_iter()
                .map(|&day| day_frame(factor, &name, day).map_err(|e| (day, e)))
                .collect()
        });

        let mut partials = Vec::with_capacity(results.len());
        let mut days_failed = 0usize;
        for result in results {
            match result {
                Ok(partial) => partials.push(partial),
                Err((day, error)) => {
                    days_failed += 1;
                    warn!(factor = %name, %day, %error, "per-day computation failed; continuing");
                }
            }
        }

        let mut unified = FactorFrame::empty(&name).into_inner();
        for partial in &partials {
            unified.vstack_mut(partial)?;
        }
        let frame = FactorFrame::new(unified)?.sort_by_date()?;
        let (frame, clean_report) = clean(frame, self.config.nan_policy)?;

        info!(
            factor = %name,
            rows = frame.len(),
            days = days_total,
            failed = days_failed,
            missing_pct = format!("{:.4}", clean_report.missing_fraction * 100.0),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "factor run complete"
        );

        Ok(RunReport {
            frame,
            days_total,
            days_failed,
            clean: clean_report,
        })
    }
}

/// One work unit: compute a single day and shape it as a partial table.
fn day_frame(factor: &dyn Factor, name: &str, day: Date) -> Result<DataFrame> {
    let rows = factor.compute(day)?;
    Ok(FactorFrame::from_day_rows(name, day, &rows)?.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ronda_store::MemoryStore;
    use ronda_traits::Ticker;
    use ronda_traits::types::date_values;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    // Fixture trading days for the 2021-10-01..2021-10-08 scenario.
    fn fixture_calendar() -> Arc<Calendar> {
        Arc::new(Calendar::from_days(vec![
            d(2021, 9, 30),
            d(2021, 10, 4),
            d(2021, 10, 5),
            d(2021, 10, 6),
            d(2021, 10, 7),
            d(2021, 10, 8),
            d(2021, 10, 11),
        ]))
    }

    struct StubFactor {
        tickers: Vec<Ticker>,
        value: f64,
    }

    impl Factor for StubFactor {
        fn name(&self) -> &str {
            "stub"
        }

        fn prepare(&mut self, _store: &dyn FactorStore, _from: Date, _to: Date) -> Result<()> {
            Ok(())
        }

        fn compute(&self, _day: Date) -> Result<Vec<(Ticker, f64)>> {
            Ok(self.tickers.iter().map(|t| (t.clone(), self.value)).collect())
        }
    }

    struct PoisonedFactor {
        fail_on: Date,
    }

    impl Factor for PoisonedFactor {
        fn name(&self) -> &str {
            "poisoned"
        }

        fn prepare(&mut self, _store: &dyn FactorStore, _from: Date, _to: Date) -> Result<()> {
            Ok(())
        }

        fn compute(&self, day: Date) -> Result<Vec<(Ticker, f64)>> {
            if day == self.fail_on {
                return Err(RondaError::Computation("poisoned day".to_string()));
            }
            Ok(vec![("A".to_string(), 1.0)])
        }
    }

    fn run(factor: &mut dyn Factor, config: RunConfig) -> RunReport {
        let runner = Runner::new(fixture_calendar(), config);
        let store = MemoryStore::new();
        runner
            .run_full(factor, &store, d(2021, 10, 1), d(2021, 10, 8))
            .unwrap()
    }

    #[test]
    fn test_full_run_covers_every_day_and_ticker() {
        let mut factor = StubFactor {
            tickers: vec!["A".to_string(), "B".to_string()],
            value: 1.5,
        };
        let report = run(&mut factor, RunConfig::default());

        // 5 fixture trading days in 2021-10-01..2021-10-08, two tickers.
        assert_eq!(report.days_total, 5);
        assert_eq!(report.frame.len(), 10);
        assert_eq!(report.days_failed, 0);

        let dates = date_values(report.frame.data()).unwrap();
        assert!(dates.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(dates.first(), Some(&d(2021, 10, 4)));
        assert_eq!(dates.last(), Some(&d(2021, 10, 8)));
    }

    #[test]
    fn test_no_duplicate_keys_after_run() {
        let mut factor = StubFactor {
            tickers: vec!["A".to_string(), "B".to_string()],
            value: 1.0,
        };
        let report = run(&mut factor, RunConfig { workers: 4, ..Default::default() });

        let df = report.frame.data();
        let dates = date_values(df).unwrap();
        let tickers: Vec<String> = df
            .column("ticker")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .map(|t| t.unwrap().to_string())
            .collect();
        let mut keys: Vec<(String, Date)> = tickers.into_iter().zip(dates).collect();
        let total = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), total);
    }

    #[test]
    fn test_parallel_run_matches_sequential() {
        let mut sequential = StubFactor {
            tickers: vec!["A".to_string()],
            value: 2.0,
        };
        let mut parallel = StubFactor {
            tickers: vec!["A".to_string()],
            value: 2.0,
        };
        let seq = run(&mut sequential, RunConfig { workers: 1, ..Default::default() });
        let par = run(&mut parallel, RunConfig { workers: 8, ..Default::default() });
        assert_eq!(seq.frame.len(), par.frame.len());
        assert_eq!(
            date_values(seq.frame.data()).unwrap(),
            date_values(par.frame.data()).unwrap()
        );
    }

    #[test]
    fn test_one_poisoned_day_degrades_not_aborts() {
        let mut factor = PoisonedFactor {
            fail_on: d(2021, 10, 6),
        };
        let report = run(&mut factor, RunConfig { workers: 3, ..Default::default() });

        assert_eq!(report.days_failed, 1);
        // The poisoned day is absent, not null-filled.
        assert_eq!(report.frame.len(), 4);
        let dates = date_values(report.frame.data()).unwrap();
        assert!(!dates.contains(&d(2021, 10, 6)));
    }

    struct MonthEndFactor;

    impl Factor for MonthEndFactor {
        fn name(&self) -> &str {
            "month_end"
        }

        fn schedule(&self) -> ronda_traits::Schedule {
            ronda_traits::Schedule::PeriodEnd(ronda_calendar::Period::Month)
        }

        fn prepare(&mut self, _store: &dyn FactorStore, _from: Date, _to: Date) -> Result<()> {
            Ok(())
        }

        fn compute(&self, _day: Date) -> Result<Vec<(Ticker, f64)>> {
            Ok(vec![("A".to_string(), 1.0)])
        }
    }

    #[test]
    fn test_period_schedule_computes_boundary_days_only() {
        let runner = Runner::new(fixture_calendar(), RunConfig::default());
        let store = MemoryStore::new();
        let mut factor = MonthEndFactor;
        let report = runner
            .run_full(&mut factor, &store, d(2021, 9, 1), d(2021, 10, 31))
            .unwrap();

        // One row per month bucket: the last September and October
        // trading days, nothing in between.
        assert_eq!(report.days_total, 2);
        assert_eq!(
            date_values(report.frame.data()).unwrap(),
            vec![d(2021, 9, 30), d(2021, 10, 11)]
        );
    }

    #[test]
    fn test_empty_day_window_yields_empty_frame() {
        let runner = Runner::new(fixture_calendar(), RunConfig::default());
        let store = MemoryStore::new();
        let mut factor = StubFactor {
            tickers: vec!["A".to_string()],
            value: 1.0,
        };
        // Valid range containing no fixture trading days.
        let report = runner
            .run_full(&mut factor, &store, d(2021, 10, 1), d(2021, 10, 3))
            .unwrap();
        assert_eq!(report.days_total, 0);
        assert!(report.frame.is_empty());
    }
}
