//! Logging setup for the editor core
//!
//! Everything in this crate reports through `tracing`. Render lifecycle
//! transitions log at `info`, inference statistics at `debug`, and per-frame
//! drag work at `trace`, so a `debug` filter stays readable while dragging.
//!
//! # Usage
//!
//! ```rust
//! use shipwright::core::logging::init_logging;
//!
//! // Level and format fall back to the environment, then to info/compact
//! let _ = init_logging(None, None);
//! ```
//!
//! # Environment Variables
//!
//! - `SHIPWRIGHT_LOG_LEVEL`: log level or filter directive
//! - `SHIPWRIGHT_LOG_FORMAT`: `compact`, `pretty` or `json`
//! - `RUST_LOG`: standard `tracing-subscriber` filter, consulted last
//!
//! # Filtering
//!
//! ```bash
//! # Only inference details
//! RUST_LOG="shipwright::core::inference=debug" shipwright inspect -i diagram.svg
//! ```
//!
//! On `wasm32` the subscriber is `tracing-wasm`, which writes to the browser
//! console; the format argument is ignored there.

use std::str::FromStr;

#[cfg(not(target_arch = "wasm32"))]
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact single-line format
    Compact,
    /// Pretty multi-line format with colors
    Pretty,
    /// JSON format for log aggregation
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

impl LogFormat {
    /// Get all valid format names
    pub fn variants() -> &'static [&'static str] {
        &["compact", "pretty", "json"]
    }
}

/// Pick the level from the argument, then `SHIPWRIGHT_LOG_LEVEL`, then `RUST_LOG`
pub fn resolve_level(level: Option<&str>) -> String {
    level
        .map(str::to_string)
        .or_else(|| std::env::var("SHIPWRIGHT_LOG_LEVEL").ok())
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string())
}

/// Pick the format from the argument, then `SHIPWRIGHT_LOG_FORMAT`
pub fn resolve_format(format: Option<&str>) -> Result<LogFormat, String> {
    let name = format
        .map(str::to_string)
        .or_else(|| std::env::var("SHIPWRIGHT_LOG_FORMAT").ok())
        .unwrap_or_else(|| "compact".to_string());
    LogFormat::from_str(&name).map_err(|e| format!("Invalid log format: {}", e))
}

/// Initialize the global subscriber
///
/// Fails when the format is unknown or a subscriber is already installed.
/// Unknown levels fall back to `info`.
pub fn init_logging(
    level: Option<&str>,
    format: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(target_arch = "wasm32")]
    {
        let _ = (level, format);
        tracing_wasm::set_as_global_default_with_config(tracing_wasm::WASMLayerConfig::default());
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let log_level = resolve_level(level);
        let format = resolve_format(format)?;

        let filter = if log_level == "off" {
            EnvFilter::new("off")
        } else {
            EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info"))
        };

        let registry = Registry::default().with(filter);
        match format {
            LogFormat::Compact => registry
                .with(
                    fmt::Layer::default()
                        .with_writer(std::io::stderr)
                        .with_target(false)
                        .with_span_events(FmtSpan::NONE),
                )
                .try_init()?,
            LogFormat::Pretty => registry
                .with(
                    fmt::Layer::default()
                        .with_writer(std::io::stderr)
                        .with_file(true)
                        .with_line_number(true)
                        .with_span_events(FmtSpan::ACTIVE)
                        .pretty(),
                )
                .try_init()?,
            LogFormat::Json => registry
                .with(
                    fmt::Layer::default()
                        .with_writer(std::io::stderr)
                        .with_file(true)
                        .with_line_number(true)
                        .json(),
                )
                .try_init()?,
        }

        Ok(())
    }
}
