//! Gauge command: effective-dated installation lookup

use super::shared::emit;
use crate::Result;
use crate::app::models::{EffectiveRecord, GaugeInstall};
use crate::app::services::parameter_resolver::{ParameterResolver, TemporalNote};
use crate::cli::args::{GaugeArgs, OutputFormat};
use chrono::NaiveDate;
use colored::*;
use serde::Serialize;

/// Outcome of a gauge lookup; `install` is absent when the station has none
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugeReport {
    pub station_id: i32,
    pub date: NaiveDate,
    pub install: Option<EffectiveRecord<GaugeInstall>>,
    pub note: Option<TemporalNote>,
}

/// Look up the installation in force for `args`
pub fn lookup_gauge(resolver: &ParameterResolver, args: &GaugeArgs) -> GaugeReport {
    let found = resolver.gauge_install(args.station_id, args.date);
    GaugeReport {
        station_id: args.station_id,
        date: args.date,
        install: found.as_ref().map(|m| m.record.clone()),
        note: found.map(|m| m.note),
    }
}

/// Gauge command runner
pub async fn run_gauge(args: &GaugeArgs, format: OutputFormat) -> Result<()> {
    let resolver = ParameterResolver::from_file(&args.parameters).await?;
    let report = lookup_gauge(&resolver, args);

    emit(format, &report, |report| match (&report.install, report.note) {
        (Some(install), Some(note)) => {
            println!(
                "{} station {} on {}",
                "Gauge:".bold(),
                report.station_id,
                report.date
            );
            println!(
                "  depth {} mm, effective {}",
                install.value.depth_mm.to_string().bright_white().bold(),
                install.effective_date
            );
            if let Some(text) = &install.value.note {
                println!("  note: {}", text);
            }
            if note.is_warning() {
                println!("  {}", note.to_string().yellow());
            } else {
                println!("  {}", note.to_string().dimmed());
            }
        }
        _ => println!(
            "{} for station {}",
            "No gauge installations recorded".yellow(),
            report.station_id
        ),
    })
}
