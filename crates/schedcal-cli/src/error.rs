//! CLI error types.

use std::path::PathBuf;

use schedcal_calendar::CalendarError;
use schedcal_core::TracingError;
use schedcal_sources::SourceError;
use thiserror::Error;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Errors that end a CLI command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Neither `--config` nor `SCHEDCAL_CONFIG` was given.
    #[error("no calendar configuration given (use --config or SCHEDCAL_CONFIG)")]
    NoConfig,

    /// A config path could not be listed.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Calendar(#[from] CalendarError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Tracing(#[from] TracingError),

    /// A calendar name given on the command line is not configured.
    #[error("unknown calendar '{0}'")]
    UnknownCalendar(String),

    /// Some calendars failed; each failure was already reported.
    #[error("{failed} of {total} calendar(s) failed")]
    Failed { failed: usize, total: usize },

    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}
