//! Error types for the fetch module.
//!
//! Every fetch failure is local to one document: the pipeline records an
//! empty row for it and moves on.

use std::fmt;

use thiserror::Error;

/// Coarse failure category used for logging and run statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    /// The request did not complete within the per-request timeout.
    Timeout,
    /// DNS, connect, TLS or body transfer failure.
    Connection,
    /// The server answered with a non-success status.
    BadStatus,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Timeout => "timeout",
            Self::Connection => "connection",
            Self::BadStatus => "bad-status",
        };
        f.write_str(label)
    }
}

/// Errors that can occur while fetching one abstract page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Request timed out before completion.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Network-level error (DNS resolution, connection refused, TLS, truncated body).
    #[error("connection error fetching {url}: {source}")]
    Connection {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} fetching {url}")]
    BadStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },
}

impl FetchError {
    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates a connection error from a reqwest error.
    pub fn connection(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Connection {
            url: url.into(),
            source,
        }
    }

    /// Creates a bad-status error.
    pub fn bad_status(url: impl Into<String>, status: u16) -> Self {
        Self::BadStatus {
            url: url.into(),
            status,
        }
    }

    /// Maps a transport error onto [`FetchError::Timeout`] or [`FetchError::Connection`].
    pub fn from_transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::timeout(url)
        } else {
            Self::connection(url, source)
        }
    }

    /// Returns the failure category.
    #[must_use]
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::Timeout { .. } => FetchErrorKind::Timeout,
            Self::Connection { .. } => FetchErrorKind::Connection,
            Self::BadStatus { .. } => FetchErrorKind::BadStatus,
        }
    }

    /// Returns the URL that failed.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url } | Self::Connection { url, .. } | Self::BadStatus { url, .. } => {
                url
            }
        }
    }
}
