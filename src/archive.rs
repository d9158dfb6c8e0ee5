//! Per-document archive of raw abstract pages.
//!
//! Each successfully fetched page is stored verbatim as
//! `<archive_dir>/<sanitized-id>.html`. Archive failures are reported to the
//! caller, which logs them; they never cost a document its ledger row.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::patterns::compile_static_regex;

/// Characters not allowed in archive file names.
static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r#"[<>:"/\\|?*]"#));

/// Extension of archived pages.
const ARCHIVE_EXTENSION: &str = "html";

/// Errors raised while archiving a page.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The archive directory could not be created.
    #[error("cannot create archive directory {path}: {source}")]
    CreateDir {
        /// Archive directory.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The page file could not be written.
    #[error("cannot write archived page {path}: {source}")]
    Write {
        /// Target file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Replaces each of `< > : " / \ | ? *` with `_`.
///
/// ```
/// use harvester_core::sanitize_document_id;
///
/// assert_eq!(sanitize_document_id("a/b:c?"), "a_b_c_");
/// assert_eq!(sanitize_document_id("PN0060987"), "PN0060987");
/// ```
#[must_use]
pub fn sanitize_document_id(doc_id: &str) -> String {
    UNSAFE_FILENAME_CHARS.replace_all(doc_id, "_").into_owned()
}

/// Directory of archived abstract pages.
#[derive(Debug, Clone)]
pub struct Archive {
    dir: PathBuf,
}

impl Archive {
    /// Creates a handle for `dir`; the directory is created on first store.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the archive directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a document's page is archived under.
    #[must_use]
    pub fn path_for(&self, doc_id: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{ARCHIVE_EXTENSION}", sanitize_document_id(doc_id)))
    }

    /// Writes `body` verbatim for `doc_id`, replacing any earlier copy.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError`] if the directory or file cannot be written.
    #[instrument(skip(self, body), fields(bytes = body.len()))]
    pub fn store(&self, doc_id: &str, body: &str) -> Result<PathBuf, ArchiveError> {
        fs::create_dir_all(&self.dir).map_err(|source| ArchiveError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path_for(doc_id);
        fs::write(&path, body).map_err(|source| ArchiveError::Write {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "Archived page");
        Ok(path)
    }
}
