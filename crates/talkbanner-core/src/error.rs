//! Error types for talkbanner
//!
//! Provides error handling for:
//! - Remote wiki operations (transport, API, absence)
//! - Read failures that abort a page pipeline
//! - Write failures isolated to a single page
//! - Page pool and configuration errors

use crate::types::PageTitle;

/// Errors reported by a [`WikiApi`](crate::api::WikiApi) implementation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WikiError {
    /// Requested page does not exist
    #[error("page not found: {title}")]
    NotFound {
        /// Title that was looked up
        title: String,
    },

    /// Connection, timeout or HTTP status failure
    #[error("transport failure: {0}")]
    Transport(String),

    /// Error object returned by the remote API
    #[error("api error {code}: {info}")]
    Api {
        /// Machine-readable error code, e.g. `missingtitle`
        code: String,
        /// Human-readable message
        info: String,
    },

    /// Response could not be decoded
    #[error("malformed response: {0}")]
    Decode(String),

    /// Session could not be established
    #[error("authentication failed: {0}")]
    Auth(String),
}

impl WikiError {
    /// Create not-found error for a title
    #[inline]
    pub fn not_found(title: impl Into<String>) -> Self {
        Self::NotFound {
            title: title.into(),
        }
    }

    /// Create API error
    #[inline]
    pub fn api(code: impl Into<String>, info: impl Into<String>) -> Self {
        Self::Api {
            code: code.into(),
            info: info.into(),
        }
    }

    /// Check if this is the recoverable absence condition
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Main pipeline error type
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    /// A read operation failed; aborts the affected pipeline
    #[error("upstream query '{operation}' failed: {source}")]
    UpstreamQuery {
        /// Operation that failed
        operation: &'static str,
        /// Underlying wiki error
        #[source]
        source: WikiError,
    },

    /// The banner edit failed; isolated to the page
    #[error("edit of {title} failed: {source}")]
    UpstreamWrite {
        /// Page being edited
        title: PageTitle,
        /// Underlying wiki error
        #[source]
        source: WikiError,
    },

    /// Page pool failure
    #[error("pool error: {0}")]
    Pool(#[from] PoolError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl BotError {
    /// Wrap a read failure
    #[inline]
    pub fn query(operation: &'static str, source: WikiError) -> Self {
        Self::UpstreamQuery { operation, source }
    }

    /// Wrap a write failure
    #[inline]
    pub fn write(title: PageTitle, source: WikiError) -> Self {
        Self::UpstreamWrite { title, source }
    }

    /// Check if error came from the edit write
    #[inline]
    #[must_use]
    pub fn is_write(&self) -> bool {
        matches!(self, Self::UpstreamWrite { .. })
    }

    /// Underlying wiki error, if any
    #[must_use]
    pub fn wiki_error(&self) -> Option<&WikiError> {
        match self {
            Self::UpstreamQuery { source, .. } | Self::UpstreamWrite { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Page pool errors
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// Pool was closed while waiting for a slot
    #[error("page pool closed")]
    Closed,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        /// File that was being read
        path: std::path::PathBuf,
        /// Underlying read error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML for the expected schema
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values are out of range or inconsistent
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Result type alias for pipeline operations
pub type BotResult<T> = Result<T, BotError>;
