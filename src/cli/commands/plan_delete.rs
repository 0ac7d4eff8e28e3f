//! Plan-delete command: range delete decomposition preview

use super::shared::emit;
use crate::Result;
use crate::app::models::DatetimeRange;
use crate::app::services::batch_persister::{BatchPersister, plan_range_chunks};
use crate::cli::args::{OutputFormat, PlanDeleteArgs};
use crate::config::QcConfig;
use colored::*;
use serde::Serialize;

/// Sub-ranges a station range delete is split into
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletePlan {
    pub station_id: i32,
    pub range: DatetimeRange,
    pub chunk_size: usize,
    pub sub_ranges: Vec<DatetimeRange>,
}

/// Build the plan, taking the chunk size from `args` or the configuration
pub fn build_plan(args: &PlanDeleteArgs, config: &QcConfig) -> Result<DeletePlan> {
    let persister = BatchPersister::new(args.chunk_size.unwrap_or(config.batch.chunk_size))?;
    let range = args.range()?;
    Ok(DeletePlan {
        station_id: args.station_id,
        range,
        chunk_size: persister.chunk_size(),
        sub_ranges: plan_range_chunks(range, persister.chunk_size()),
    })
}

/// Plan-delete command runner
pub fn run_plan_delete(args: &PlanDeleteArgs, config: &QcConfig, format: OutputFormat) -> Result<()> {
    let plan = build_plan(args, config)?;

    emit(format, &plan, |plan| {
        println!(
            "{} station {} datetimes {}..={} ({} ids, chunk size {})",
            "Delete plan:".bold(),
            plan.station_id,
            plan.range.begin,
            plan.range.end,
            plan.range.len(),
            plan.chunk_size
        );
        for (index, sub_range) in plan.sub_ranges.iter().enumerate() {
            println!(
                "  {:>4}. {}..={} ({} ids), then flush",
                index + 1,
                sub_range.begin,
                sub_range.end,
                sub_range.len().to_string().bright_white()
            );
        }
        println!(
            "{} sub-range(s), each deleting load log, flags, values, then observations",
            plan.sub_ranges.len().to_string().bright_green().bold()
        );
    })
}
