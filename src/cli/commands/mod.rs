//! Command implementations for the station QC CLI
//!
//! Each command lives in its own module:
//! - `flags`: decode and encode persisted flag integers
//! - `resolve`: range and delta limit resolution from a parameter file
//! - `gauge`: effective-dated gauge installation lookup
//! - `plan_delete`: chunk decomposition of a station range delete

pub mod flags;
pub mod gauge;
pub mod plan_delete;
pub mod resolve;
pub mod shared;

use crate::Result;
use crate::cli::args::{Args, Commands};
use shared::{load_config, setup_logging};
use tracing::debug;

/// Main command runner
///
/// Sets up logging, loads configuration and dispatches to the subcommand.
pub async fn run(args: Args) -> Result<()> {
    setup_logging(&args);
    debug!("Arguments: {:?}", args);

    let config = load_config(&args).await?;

    match &args.command {
        Some(Commands::Flags(flags_args)) => flags::run_flags(flags_args, args.format),
        Some(Commands::ResolveRange(resolve_args)) => {
            resolve::run_resolve_range(resolve_args, args.format).await
        }
        Some(Commands::ResolveDelta(resolve_args)) => {
            resolve::run_resolve_delta(resolve_args, args.format).await
        }
        Some(Commands::Gauge(gauge_args)) => gauge::run_gauge(gauge_args, args.format).await,
        Some(Commands::PlanDelete(plan_args)) => {
            plan_delete::run_plan_delete(plan_args, &config, args.format)
        }
        None => Ok(()),
    }
}
