//! Shared components for CLI commands

use crate::cli::args::{Args, OutputFormat};
use crate::config::QcConfig;
use crate::constants::LOG_TARGET;
use crate::{Error, Result};
use serde::Serialize;
use tracing::debug;

/// Set up structured logging on stderr
///
/// `RUST_LOG` overrides the level derived from `-v`/`-q`. A subscriber that
/// is already installed is left in place.
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}={}", LOG_TARGET, log_level)));

    let installed = if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    if installed.is_ok() {
        debug!("Logging initialized at level: {}", log_level);
    }
}

/// Load configuration from `--config`, the default location or defaults
///
/// Progress bars stay off in quiet mode and for JSON output.
pub async fn load_config(args: &Args) -> Result<QcConfig> {
    let mut config = QcConfig::load(args.config_file.as_deref()).await?;
    if !args.show_progress() {
        config.batch.show_progress = false;
    }
    Ok(config)
}

/// Render a result as pretty JSON
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| Error::data_validation(format!("Failed to serialize output: {}", e)))
}

/// Print `value` as JSON, or run `human` for human-readable output
pub fn emit<T: Serialize>(format: OutputFormat, value: &T, human: impl FnOnce(&T)) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", to_json(value)?),
        OutputFormat::Human => human(value),
    }
    Ok(())
}
