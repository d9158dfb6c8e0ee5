//! Error types for source list loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading the source list.
///
/// Both variants are fatal for a run: they are raised before any network
/// activity takes place.
#[derive(Debug, Error)]
pub enum SourceListError {
    /// The source list could not be opened.
    #[error("cannot open source list {path}: {source}\n  Suggestion: check the source path in your config or --source")]
    Open {
        /// Source list path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A row could not be read (IO failure or invalid UTF-8).
    #[error("cannot read source list {path}: {source}")]
    Read {
        /// Source list path.
        path: PathBuf,
        /// Underlying CSV reader error.
        #[source]
        source: csv::Error,
    },
}

impl SourceListError {
    /// Creates an open error.
    pub fn open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Open {
            path: path.into(),
            source,
        }
    }

    /// Creates a read error.
    pub fn read(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }
}
