//! ronda CLI binary.
//!
//! Provides a command-line interface for the ronda factor engine.

mod cmd;
mod data;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cmd::calendar::Boundary;
use cmd::compute::ComputeArgs;
use ronda_calendar::Period;
use ronda_engine::NanPolicy;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ronda")]
#[command(about = "Trading-calendar aware factor computation engine", long_about = None)]
#[command(version)]
struct Cli {
    /// Root directory of the parquet store
    #[arg(long, global = true, default_value = "data")]
    data_dir: PathBuf,

    /// First date the trading calendar is loaded from (YYYY-MM-DD)
    #[arg(long, global = true, default_value = "2000-01-01")]
    calendar_start: String,

    /// Refresh the calendar from the return series before running
    #[arg(long, global = true)]
    refresh_calendar: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available factors
    Factors {
        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,

        /// Show detailed information
        #[arg(short, long)]
        verbose: bool,

        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Compute a factor over a date window and upsert the result
    Compute {
        /// Factor name or alias
        factor: String,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: String,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: String,

        /// Worker threads for per-date computation
        #[arg(short, long, default_value = "1")]
        workers: usize,

        /// NaN handling after aggregation (keep or drop)
        #[arg(long, default_value = "keep")]
        nan_policy: NanPolicy,

        /// Also write a parquet snapshot of the result
        #[arg(long)]
        export: bool,

        /// Directory the snapshot is written to
        #[arg(long)]
        export_dir: Option<PathBuf>,
    },

    /// Append the missing suffix of an already-persisted factor series
    Update {
        /// Factor name or alias
        factor: String,

        /// Worker threads for per-date computation
        #[arg(short, long, default_value = "1")]
        workers: usize,

        /// NaN handling after aggregation (keep or drop)
        #[arg(long, default_value = "keep")]
        nan_policy: NanPolicy,
    },

    /// Delete persisted rows of a series for a closed date range
    Delete {
        /// Series name (a factor's canonical name)
        series: String,

        /// Start date, inclusive (YYYY-MM-DD)
        #[arg(long)]
        from: String,

        /// End date, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: String,
    },

    /// List trading days or period boundaries in a window
    Calendar {
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: String,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: String,

        /// Collapse to one day per month, quarter, or year
        #[arg(short, long)]
        period: Option<Period>,

        /// Which boundary of each bucket to keep
        #[arg(short, long, value_enum, default_value = "last")]
        boundary: Boundary,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Factors {
            category,
            verbose,
            json,
        } => {
            cmd::factors::list_factors(category, verbose, json)?;
        }
        Commands::Compute {
            factor,
            from,
            to,
            workers,
            nan_policy,
            export,
            export_dir,
        } => {
            cmd::compute::run(
                ComputeArgs {
                    factor,
                    from,
                    to,
                    workers,
                    nan_policy,
                    export,
                    export_dir,
                },
                cli.data_dir,
                cli.calendar_start,
                cli.refresh_calendar,
            )?;
        }
        Commands::Update {
            factor,
            workers,
            nan_policy,
        } => {
            cmd::update::run(
                &factor,
                workers,
                nan_policy,
                cli.data_dir,
                cli.calendar_start,
                cli.refresh_calendar,
            )?;
        }
        Commands::Delete { series, from, to } => {
            cmd::delete::run(&series, &from, &to, cli.data_dir, cli.calendar_start)?;
        }
        Commands::Calendar {
            from,
            to,
            period,
            boundary,
        } => {
            cmd::calendar::run(
                &from,
                &to,
                period,
                boundary,
                cli.data_dir,
                cli.calendar_start,
                cli.refresh_calendar,
            )?;
        }
    }

    Ok(())
}
