//! Flags command: decode and encode persisted flag integers

use super::shared::emit;
use crate::Result;
use crate::app::models::{FlagKind, FlagVector};
use crate::cli::args::{FlagsArgs, OutputFormat};
use colored::*;
use serde::Serialize;

/// Decoded view of a flag integer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlagReport {
    pub value: u64,
    pub kinds: Vec<FlagKind>,
    /// Bits beyond the declared kinds, kept but not interpreted
    pub unknown_bits: u64,
    pub table_version: u32,
}

impl From<FlagVector> for FlagReport {
    fn from(flags: FlagVector) -> Self {
        Self {
            value: flags.to_int(),
            kinds: flags.kinds(),
            unknown_bits: flags.unknown_bits(),
            table_version: FlagKind::table_version(),
        }
    }
}

/// Apply the command's decode, set and clear steps
pub fn build_flags(args: &FlagsArgs) -> Result<FlagVector> {
    let mut flags = FlagVector::from_nullable(args.value)?;
    for kind in &args.set {
        flags.set_flagged(*kind, true);
    }
    for kind in &args.clear {
        flags.set_flagged(*kind, false);
    }
    Ok(flags)
}

/// Flags command runner
pub fn run_flags(args: &FlagsArgs, format: OutputFormat) -> Result<()> {
    let report = FlagReport::from(build_flags(args)?);

    emit(format, &report, |report| {
        println!("{} {}", "Flag value:".bold(), report.value.to_string().bright_white().bold());
        if report.kinds.is_empty() {
            println!("  {}", "all clear".green());
        }
        for kind in &report.kinds {
            println!("  {} {}", "raised".yellow(), kind);
        }
        if report.unknown_bits != 0 {
            println!(
                "  {} {:#b} (not in table version {})",
                "unknown bits".bright_red(),
                report.unknown_bits,
                report.table_version
            );
        }
    })
}
