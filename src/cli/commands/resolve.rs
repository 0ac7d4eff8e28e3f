//! Range and delta resolution commands

use super::shared::emit;
use crate::Result;
use crate::app::models::{DeltaLimit, DiscreteQuery, DiscreteScope, RangeLimits};
use crate::app::services::parameter_resolver::ParameterResolver;
use crate::cli::args::{OutputFormat, ResolveArgs};
use colored::*;
use serde::Serialize;
use tracing::info;

/// Outcome of a discrete resolution
///
/// `scope` and `limits` are both absent when no parameter applies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolveReport<L> {
    pub kind: &'static str,
    pub query: DiscreteQuery,
    pub scope: Option<DiscreteScope>,
    pub limits: Option<L>,
}

/// Resolve range limits for the query in `args`
pub fn resolve_range(
    resolver: &ParameterResolver,
    args: &ResolveArgs,
) -> Result<ResolveReport<RangeLimits>> {
    args.validate()?;
    let query = args.query();
    let parameter = resolver.range_parameter(&query)?;
    Ok(ResolveReport {
        kind: "range",
        query,
        scope: parameter.map(|p| p.scope()),
        limits: parameter.map(|p| p.limits()),
    })
}

/// Resolve the delta limit for the query in `args`
pub fn resolve_delta(
    resolver: &ParameterResolver,
    args: &ResolveArgs,
) -> Result<ResolveReport<DeltaLimit>> {
    args.validate()?;
    let query = args.query();
    let parameter = resolver.delta_parameter(&query)?;
    Ok(ResolveReport {
        kind: "delta",
        query,
        scope: parameter.map(|p| p.scope()),
        limits: parameter.map(|p| p.limit()),
    })
}

fn print_header<L>(report: &ResolveReport<L>) -> bool {
    match report.scope {
        Some(scope) => {
            println!("{} {}", "Query:".bold(), report.query);
            println!("{} {}", "Matched:".bold(), scope.to_string().bright_white());
            true
        }
        None => {
            println!(
                "{} for {}",
                format!("No {} constraint defined", report.kind).yellow(),
                report.query
            );
            false
        }
    }
}

/// resolve-range command runner
pub async fn run_resolve_range(args: &ResolveArgs, format: OutputFormat) -> Result<()> {
    let resolver = ParameterResolver::from_file(&args.parameters).await?;
    info!("Loaded {} parameter records", resolver.len());

    let report = resolve_range(&resolver, args)?;
    emit(format, &report, |report| {
        if let (true, Some(limits)) = (print_header(report), report.limits) {
            println!(
                "{} [{}, {}]",
                "Range:".bold(),
                limits.min.to_string().bright_green(),
                limits.max.to_string().bright_green()
            );
        }
    })
}

/// resolve-delta command runner
pub async fn run_resolve_delta(args: &ResolveArgs, format: OutputFormat) -> Result<()> {
    let resolver = ParameterResolver::from_file(&args.parameters).await?;
    info!("Loaded {} parameter records", resolver.len());

    let report = resolve_delta(&resolver, args)?;
    emit(format, &report, |report| {
        if let (true, Some(limit)) = (print_header(report), report.limits) {
            println!(
                "{} {}",
                "Max delta:".bold(),
                limit.max_delta.to_string().bright_green()
            );
        }
    })
}
