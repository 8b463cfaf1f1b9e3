//! Error types for document fetching.

use std::fmt;
use thiserror::Error;

/// The category of a fetch error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceErrorCode {
    /// Connection failed, timed out, DNS resolution failed.
    NetworkError,
    /// The server answered with a non-success status.
    HttpStatus,
    /// The server answered 5xx.
    ServerError,
    /// The document does not exist (404 or missing file).
    NotFound,
    /// The location is neither an http(s) URL, a file URL nor a path.
    InvalidLocation,
    /// The document was fetched but contains nothing.
    EmptyDocument,
    /// Local file could not be read.
    IoError,
    /// The fetcher itself could not be set up.
    ConfigurationError,
}

impl SourceErrorCode {
    /// Returns true if the same fetch may succeed when retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NetworkError | Self::ServerError)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkError => "network_error",
            Self::HttpStatus => "http_status",
            Self::ServerError => "server_error",
            Self::NotFound => "not_found",
            Self::InvalidLocation => "invalid_location",
            Self::EmptyDocument => "empty_document",
            Self::IoError => "io_error",
            Self::ConfigurationError => "configuration_error",
        }
    }
}

impl fmt::Display for SourceErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error raised while fetching a schedule document.
#[derive(Debug, Error)]
pub struct SourceError {
    code: SourceErrorCode,
    message: String,
    /// The location being fetched, when known.
    location: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl SourceError {
    pub fn new(code: SourceErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            location: None,
            source: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(SourceErrorCode::NetworkError, message)
    }

    /// Creates an error for an unexpected HTTP status.
    pub fn http_status(status: u16) -> Self {
        let code = match status {
            404 | 410 => SourceErrorCode::NotFound,
            500..=599 => SourceErrorCode::ServerError,
            _ => SourceErrorCode::HttpStatus,
        };
        Self::new(code, format!("unexpected HTTP status {}", status))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(SourceErrorCode::NotFound, message)
    }

    pub fn invalid_location(message: impl Into<String>) -> Self {
        Self::new(SourceErrorCode::InvalidLocation, message)
    }

    pub fn empty_document() -> Self {
        Self::new(SourceErrorCode::EmptyDocument, "document is empty")
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(SourceErrorCode::IoError, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(SourceErrorCode::ConfigurationError, message)
    }

    /// Sets the location this error relates to.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Sets the underlying cause.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> SourceErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        if let Some(ref location) = self.location {
            write!(f, " ({})", location)?;
        }
        Ok(())
    }
}

/// A specialized Result type for fetch operations.
pub type SourceResult<T> = Result<T, SourceError>;
