//! Logging setup
//!
//! Structured diagnostics go to stderr through `tracing`, so converted
//! output written to stdout stays clean. Priority (highest first):
//! 1. `TANK_CONVERT_LOG` / `TANK_CONVERT_LOG_FORMAT` environment variables
//! 2. Settings (`log.level`, `log.format`)

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::LogSettings;
use crate::error::ConvertError;

/// Filter directive variable, e.g. `TANK_CONVERT_LOG=tank_config_converter=debug`.
pub const LOG_ENV: &str = "TANK_CONVERT_LOG";
pub const LOG_FORMAT_ENV: &str = "TANK_CONVERT_LOG_FORMAT";

/// Install the global subscriber.
///
/// Fails if a subscriber is already installed.
pub fn init_logging(settings: &LogSettings) -> Result<(), ConvertError> {
    let filter = build_env_filter(settings)?;
    let format = determine_format(settings)?;
    let base = Registry::default().with(filter);

    let result = if format == "json" {
        base.with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .try_init()
    } else {
        base.with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .try_init()
    };

    result.map_err(|e| ConvertError::Logging(e.to_string()))
}

fn build_env_filter(settings: &LogSettings) -> Result<EnvFilter, ConvertError> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return Ok(filter);
    }
    EnvFilter::try_new(&settings.level)
        .map_err(|e| ConvertError::Logging(format!("invalid log level '{}': {}", settings.level, e)))
}

fn determine_format(settings: &LogSettings) -> Result<String, ConvertError> {
    if let Ok(format) = std::env::var(LOG_FORMAT_ENV) {
        if format == "json" || format == "text" {
            return Ok(format);
        }
    }

    match settings.format.as_str() {
        "json" | "text" => Ok(settings.format.clone()),
        other => Err(ConvertError::Logging(format!(
            "log format must be 'json' or 'text', got '{}'",
            other
        ))),
    }
}
