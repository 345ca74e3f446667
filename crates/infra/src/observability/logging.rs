//! Tracing subscriber setup
//!
//! `RUST_LOG` takes precedence; without it everything logs at `info`.

use std::str::FromStr;

use erpbridge_domain::{ErpError, Result};
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "info";

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable compact lines
    #[default]
    Compact,
    /// One JSON object per event, with span fields flattened in
    Json,
}

impl FromStr for LogFormat {
    type Err = ErpError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "compact" | "text" | "pretty" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(ErpError::Config(format!("unknown log format '{other}'"))),
        }
    }
}

fn env_filter() -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_DIRECTIVE))
        .map_err(|e| ErpError::Config(format!("Failed to create log filter: {e}")))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_tracing(format: LogFormat) -> Result<()> {
    let filter = env_filter()?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match format {
        LogFormat::Compact => {
            registry.with(fmt::layer().with_target(true).compact()).try_init()
        }
        LogFormat::Json => registry
            .with(fmt::layer().with_target(true).json().flatten_event(true).with_current_span(true))
            .try_init(),
    };

    installed.map_err(|e| ErpError::Internal(format!("tracing already initialised: {e}")))
}

/// Route test output through the libtest writer. Safe to call repeatedly.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with(fmt::layer().with_test_writer().with_target(false).compact())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_log_formats() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("JSON ".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert_eq!("".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!(matches!("xml".parse::<LogFormat>(), Err(ErpError::Config(_))));
    }

    #[test]
    fn second_init_reports_error() {
        init_test_tracing();
        assert!(init_tracing(LogFormat::Compact).is_err());
    }
}
