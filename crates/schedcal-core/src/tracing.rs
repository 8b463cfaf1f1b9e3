//! Tracing setup for schedcal
//!
//! All crates log through `tracing`; the binary installs one subscriber at
//! startup. Logs go to stderr so rendered calendars on stdout stay clean.
//!
//! ```ignore
//! use schedcal_core::tracing::{init_tracing, TracingConfig, TracingOutputFormat};
//!
//! init_tracing(TracingConfig::batch().with_format(TracingOutputFormat::Json))?;
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self as tfmt, format::FmtSpan},
    prelude::*,
};

/// Target prefix shared by every schedcal crate.
const FILTER_TARGET: &str = "schedcal";

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    /// Failed to set global subscriber
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    /// Failed to parse env filter directive
    #[error("failed to parse env filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),
}

/// Output format for log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    #[default]
    Pretty,
    /// Single-line records
    Compact,
    /// One JSON object per record, for cron jobs feeding a log collector
    Json,
}

impl TracingOutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pretty => "pretty",
            Self::Compact => "compact",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for TracingOutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TracingOutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "unknown log format '{}', expected pretty, compact or json",
                other
            )),
        }
    }
}

/// Subscriber settings for one process.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level for schedcal targets when neither `env_filter` nor `RUST_LOG`
    /// is set.
    pub default_level: Level,
    pub output_format: TracingOutputFormat,
    /// Adds file, line and module target to every record.
    pub verbose: bool,
    pub include_timestamp: bool,
    /// Emits a record when each calendar span opens and closes.
    pub include_span_events: bool,
    pub env_filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: Level::WARN,
            output_format: TracingOutputFormat::Compact,
            verbose: false,
            include_timestamp: false,
            include_span_events: false,
            env_filter: None,
        }
    }
}

impl TracingConfig {
    /// `--debug`: DEBUG level with source locations.
    #[must_use]
    pub fn cli_debug() -> Self {
        Self {
            default_level: Level::DEBUG,
            verbose: true,
            ..Self::default()
        }
    }

    /// Unattended batch runs: INFO, timestamps, one record per calendar span.
    #[must_use]
    pub fn batch() -> Self {
        Self {
            default_level: Level::INFO,
            include_timestamp: true,
            include_span_events: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.default_level = level;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.output_format = format;
        self
    }

    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Filter directive used when neither `env_filter` nor `RUST_LOG` is set.
    pub fn default_directive(&self) -> String {
        format!("{}={}", FILTER_TARGET, self.default_level)
    }

    /// Builds the filter: explicit directive, then `RUST_LOG`, then
    /// [`default_directive`](Self::default_directive).
    ///
    /// # Errors
    ///
    /// Returns [`TracingError::EnvFilter`] if the explicit directive does not
    /// parse.
    pub fn filter(&self) -> Result<EnvFilter, TracingError> {
        match &self.env_filter {
            Some(directive) => Ok(EnvFilter::try_new(directive)?),
            None => Ok(EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(self.default_directive()))),
        }
    }

    fn span_events(&self) -> FmtSpan {
        if self.include_span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

/// Installs the global subscriber. Call once at startup.
///
/// # Errors
///
/// Returns an error if a global subscriber is already set or if the filter
/// directive is invalid.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let filter = config.filter()?;

    let base = tfmt::layer()
        .with_writer(std::io::stderr)
        .with_file(config.verbose)
        .with_line_number(config.verbose)
        .with_target(config.verbose)
        .with_span_events(config.span_events());

    let layer: Box<dyn Layer<Registry> + Send + Sync> =
        match (config.output_format, config.include_timestamp) {
            (TracingOutputFormat::Pretty, _) => base.pretty().boxed(),
            (TracingOutputFormat::Json, _) => base.json().boxed(),
            (TracingOutputFormat::Compact, true) => base.compact().boxed(),
            (TracingOutputFormat::Compact, false) => base.compact().without_time().boxed(),
        };

    let subscriber = tracing_subscriber::registry().with(layer).with(filter);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
