//! Calendar error types.

use std::path::PathBuf;

use schedcal_sources::SourceError;
use thiserror::Error;

/// Result type for calendar operations.
pub type CalendarResult<T> = Result<T, CalendarError>;

/// Errors that abort one calendar. Other calendars of the same run are
/// unaffected.
#[derive(Debug, Error)]
pub enum CalendarError {
    /// The configuration file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid YAML or does not match the schema.
    #[error("failed to parse {origin}: {source}")]
    ConfigParse {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// The configuration parsed but cannot be used.
    #[error("invalid configuration for '{name}': {message}")]
    InvalidConfig { name: String, message: String },

    /// The configured variant is not registered.
    #[error("unknown variant '{variant}' for '{name}'")]
    UnknownVariant { name: String, variant: String },

    /// A source document could not be fetched.
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: SourceError,
    },

    /// The template collaborator failed.
    #[error("failed to render: {0}")]
    Render(String),

    /// The output file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CalendarError {
    pub fn invalid(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Short machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConfigRead { .. } => "config_read",
            Self::ConfigParse { .. } => "config_parse",
            Self::InvalidConfig { .. } => "invalid_config",
            Self::UnknownVariant { .. } => "unknown_variant",
            Self::Fetch { .. } => "fetch",
            Self::Render(_) => "render",
            Self::Write { .. } => "write",
        }
    }
}
