//! Command-line argument definitions for the station QC tool
//!
//! Defines the CLI interface using the clap derive API. Logging and output
//! options are global so they can be given before or after the subcommand.

use crate::app::models::{DatetimeRange, DiscreteQuery, FlagKind};
use crate::constants::MONTH_RANGE;
use crate::{Error, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the station QC tool
///
/// Inspects QC flag integers, resolves threshold parameters and gauge
/// installations from a parameter file, and previews chunked range deletes.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "station-qc",
    version,
    about = "Inspect QC flags, resolve station QC parameters and preview chunked deletes",
    long_about = "Quality-control companion for hourly climate station observations. Decodes and \
                  encodes persisted flag integers, resolves the most specific range and delta \
                  limits or the rain gauge installation in force from a parameter file, and shows \
                  how a bulk range delete is split into flushed chunks."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    ///
    /// Defaults to station-qc/config.toml under the user configuration directory
    /// when that file exists.
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        global = true,
        help = "Path to configuration file"
    )]
    pub config_file: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    ///
    /// Only show errors. Overrides verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help = "Suppress logging except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Output format for results
    #[arg(
        long = "format",
        value_enum,
        default_value = "human",
        global = true,
        help = "Output format for results"
    )]
    pub format: OutputFormat,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Decode a persisted flag integer or encode flag kinds into one
    Flags(FlagsArgs),
    /// Resolve the range limits that apply to an element
    ResolveRange(ResolveArgs),
    /// Resolve the delta limit that applies to an element
    ResolveDelta(ResolveArgs),
    /// Find the rain gauge installation in force at a station on a date
    Gauge(GaugeArgs),
    /// Show how a station range delete is split into chunks
    PlanDelete(PlanDeleteArgs),
}

/// Arguments for the flags command
#[derive(Debug, Clone, Parser)]
pub struct FlagsArgs {
    /// Persisted flag integer to decode
    ///
    /// When omitted, the vector starts all-clear.
    #[arg(value_name = "VALUE", allow_negative_numbers = true)]
    pub value: Option<i64>,

    /// Flag kinds to raise (comma-separated: range,delta,door,exception,frozen,sensor)
    #[arg(long = "set", value_name = "KINDS", value_delimiter = ',')]
    pub set: Vec<FlagKind>,

    /// Flag kinds to clear (comma-separated)
    #[arg(long = "clear", value_name = "KINDS", value_delimiter = ',')]
    pub clear: Vec<FlagKind>,
}

/// Arguments for the range and delta resolution commands
#[derive(Debug, Clone, Parser)]
pub struct ResolveArgs {
    /// TOML parameter file with [[range]], [[delta]] and [[gauge]] tables
    #[arg(short = 'p', long = "parameters", value_name = "FILE")]
    pub parameters: PathBuf,

    /// Element id (required exact match)
    #[arg(short = 'e', long = "element", value_name = "ID")]
    pub element_id: i32,

    /// Stream id; omitted means only stream-wildcard parameters apply
    #[arg(long = "stream", value_name = "ID")]
    pub stream_id: Option<i32>,

    /// Station id; omitted means only station-wildcard parameters apply
    #[arg(short = 's', long = "station", value_name = "ID")]
    pub station_id: Option<i32>,

    /// Month (1-12); omitted means only month-wildcard parameters apply
    #[arg(short = 'm', long = "month", value_name = "MONTH")]
    pub month: Option<i32>,
}

/// Arguments for the gauge command
#[derive(Debug, Clone, Parser)]
pub struct GaugeArgs {
    /// TOML parameter file with [[gauge]] tables
    #[arg(short = 'p', long = "parameters", value_name = "FILE")]
    pub parameters: PathBuf,

    /// Station id
    #[arg(short = 's', long = "station", value_name = "ID")]
    pub station_id: i32,

    /// Query date (YYYY-MM-DD)
    #[arg(short = 'd', long = "date", value_name = "DATE")]
    pub date: NaiveDate,
}

/// Arguments for the plan-delete command
#[derive(Debug, Clone, Parser)]
pub struct PlanDeleteArgs {
    /// Station id
    #[arg(short = 's', long = "station", value_name = "ID")]
    pub station_id: i32,

    /// First datetime id (inclusive)
    #[arg(long = "begin", value_name = "ID", allow_negative_numbers = true)]
    pub begin: i32,

    /// Last datetime id (inclusive)
    #[arg(long = "end", value_name = "ID", allow_negative_numbers = true)]
    pub end: i32,

    /// Override the configured chunk size
    #[arg(long = "chunk-size", value_name = "N")]
    pub chunk_size: Option<usize>,
}

/// Output format options for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
}

impl Args {
    /// Get log level based on verbosity and quiet flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Whether progress bars may be drawn
    pub fn show_progress(&self) -> bool {
        !self.quiet && self.format == OutputFormat::Human
    }
}

impl ResolveArgs {
    /// Validate the query dimensions
    pub fn validate(&self) -> Result<()> {
        match self.month {
            Some(month) if !MONTH_RANGE.contains(&month) => Err(Error::data_validation(format!(
                "Month {} must be between 1 and 12",
                month
            ))),
            _ => Ok(()),
        }
    }

    /// Build the discrete query from the supplied dimensions
    pub fn query(&self) -> DiscreteQuery {
        DiscreteQuery {
            element_id: self.element_id,
            stream_id: self.stream_id,
            station_id: self.station_id,
            month: self.month,
        }
    }
}

impl PlanDeleteArgs {
    /// Inclusive datetime span to delete
    pub fn range(&self) -> Result<DatetimeRange> {
        DatetimeRange::new(self.begin, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level() {
        let args = Args::parse_from(["station-qc", "-vv", "flags", "5"]);
        assert_eq!(args.get_log_level(), "debug");

        let args = Args::parse_from(["station-qc", "flags", "5", "--quiet"]);
        assert_eq!(args.get_log_level(), "error");
        assert!(!args.show_progress());
    }

    #[test]
    fn test_flags_args() {
        let args = Args::parse_from(["station-qc", "flags", "--set", "range,door", "--clear", "delta"]);
        match args.command {
            Some(Commands::Flags(flags)) => {
                assert_eq!(flags.value, None);
                assert_eq!(flags.set, vec![FlagKind::Range, FlagKind::Door]);
                assert_eq!(flags.clear, vec![FlagKind::Delta]);
            }
            other => panic!("Expected flags command, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_flag_value_is_parsed() {
        let args = Args::parse_from(["station-qc", "flags", "-3"]);
        match args.command {
            Some(Commands::Flags(flags)) => assert_eq!(flags.value, Some(-3)),
            other => panic!("Expected flags command, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_args_query() {
        let args = Args::parse_from([
            "station-qc",
            "resolve-range",
            "-p",
            "params.toml",
            "-e",
            "188",
            "--stream",
            "8",
            "-s",
            "1026",
            "-m",
            "4",
            "--format",
            "json",
        ]);
        assert_eq!(args.format, OutputFormat::Json);
        match args.command {
            Some(Commands::ResolveRange(resolve)) => {
                assert!(resolve.validate().is_ok());
                assert_eq!(
                    resolve.query(),
                    DiscreteQuery::new(188).stream(8).station(1026).month(4)
                );
            }
            other => panic!("Expected resolve-range command, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_args_rejects_bad_month() {
        let args = Args::parse_from(["station-qc", "resolve-delta", "-p", "p.toml", "-e", "1", "-m", "13"]);
        match args.command {
            Some(Commands::ResolveDelta(resolve)) => assert!(resolve.validate().is_err()),
            other => panic!("Expected resolve-delta command, got {:?}", other),
        }
    }

    #[test]
    fn test_gauge_args_parse_date() {
        let args = Args::parse_from(["station-qc", "gauge", "-p", "p.toml", "-s", "12", "-d", "2011-02-03"]);
        match args.command {
            Some(Commands::Gauge(gauge)) => {
                assert_eq!(gauge.date, NaiveDate::from_ymd_opt(2011, 2, 3).unwrap());
            }
            other => panic!("Expected gauge command, got {:?}", other),
        }
    }

    #[test]
    fn test_plan_delete_range() {
        let args = Args::parse_from(["station-qc", "plan-delete", "-s", "3", "--begin", "10", "--end", "5"]);
        match args.command {
            Some(Commands::PlanDelete(plan)) => assert!(plan.range().is_err()),
            other => panic!("Expected plan-delete command, got {:?}", other),
        }
    }
}
