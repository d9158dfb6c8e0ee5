//! Append-only CSV ledger of harvest results.
//!
//! The ledger carries a fixed header written exactly once, when the file is
//! first appended to (or found empty). Rows are only ever appended, so two
//! runs over disjoint ID ranges against the same ledger are strictly additive.
//! A batch lands whole or not at all: a failed write is cut back to the
//! length the file had before the append, so retrying the batch never
//! duplicates rows.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::extract::ExtractedMetadata;
use crate::license::UNKNOWN_LICENSE;

/// Ledger header, in column order.
pub const LEDGER_COLUMNS: [&str; 11] = [
    "doc_id",
    "abs_url",
    "license_url",
    "license_name",
    "version",
    "title",
    "authors",
    "comments",
    "subjects",
    "journal_ref",
    "related_doi",
];

/// Errors raised while writing or reading the ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The ledger file or its directory could not be created, opened or written.
    #[error("IO error on ledger {path}: {source}")]
    Io {
        /// Ledger path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A row could not be encoded or decoded.
    #[error("CSV error on ledger {path}: {source}")]
    Csv {
        /// Ledger path.
        path: PathBuf,
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },
}

impl LedgerError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a CSV error.
    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}

/// One ledger row. Field order matches [`LEDGER_COLUMNS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    pub doc_id: String,
    /// Normalized abstract URL, or the raw reference URL when normalization failed.
    pub abs_url: String,
    pub license_url: Option<String>,
    pub license_name: String,
    pub version: Option<String>,
    pub title: String,
    pub authors: String,
    pub comments: String,
    pub subjects: String,
    pub journal_ref: String,
    pub related_doi: String,
}

impl ResultRow {
    /// Row recorded when a document could not be normalized or fetched.
    #[must_use]
    pub fn empty(doc_id: impl Into<String>, abs_url: impl Into<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            abs_url: abs_url.into(),
            license_url: None,
            license_name: UNKNOWN_LICENSE.to_string(),
            version: None,
            title: String::new(),
            authors: String::new(),
            comments: String::new(),
            subjects: String::new(),
            journal_ref: String::new(),
            related_doi: String::new(),
        }
    }

    /// Row for a fetched and extracted page.
    #[must_use]
    pub fn from_metadata(
        doc_id: impl Into<String>,
        abs_url: impl Into<String>,
        metadata: ExtractedMetadata,
        license_name: impl Into<String>,
    ) -> Self {
        Self {
            doc_id: doc_id.into(),
            abs_url: abs_url.into(),
            license_url: metadata.license_url,
            license_name: license_name.into(),
            version: metadata.version,
            title: metadata.title,
            authors: metadata.authors,
            comments: metadata.comments,
            subjects: metadata.subjects,
            journal_ref: metadata.journal_ref,
            related_doi: metadata.related_doi,
        }
    }
}

/// Handle on the append-only ledger file.
///
/// Creating a `Ledger` touches nothing on disk; the file and its header
/// appear on the first non-empty append.
#[derive(Debug, Clone)]
pub struct Ledger {
    path: PathBuf,
}

impl Ledger {
    /// Creates a handle for the ledger at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the ledger path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `rows` in one write, preceded by the header if the file is new or empty.
    ///
    /// Returns the number of rows written. An empty slice performs no IO.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the rows cannot be encoded or the file
    /// cannot be written. Nothing is written when encoding fails.
    #[instrument(skip(self, rows), fields(path = %self.path.display(), rows = rows.len()))]
    pub fn append(&self, rows: &[ResultRow]) -> Result<usize, LedgerError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let needs_header = self.is_missing_or_empty()?;
        let batch = encode_rows(rows, needs_header).map_err(|e| LedgerError::csv(&self.path, e))?;

        let parent = self.path.parent();
        if let Some(parent) = parent.filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| LedgerError::io(parent, e))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| LedgerError::io(&self.path, e))?;
        let rollback_len = file
            .metadata()
            .map_err(|e| LedgerError::io(&self.path, e))?
            .len();
        write_batch(&mut file, &batch, rollback_len)
            .map_err(|e| LedgerError::io(&self.path, e))?;

        debug!(header = needs_header, "Appended rows to ledger");
        Ok(rows.len())
    }

    /// Reads every row of the ledger at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the file cannot be opened or a row does not
    /// match the ledger columns.
    pub fn read_rows(path: &Path) -> Result<Vec<ResultRow>, LedgerError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|e| LedgerError::csv(path, e))?;
        reader
            .deserialize()
            .collect::<Result<Vec<ResultRow>, _>>()
            .map_err(|e| LedgerError::csv(path, e))
    }

    fn is_missing_or_empty(&self) -> Result<bool, LedgerError> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len() == 0),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(true),
            Err(e) => Err(LedgerError::io(&self.path, e)),
        }
    }
}

/// Output that can be cut back to an earlier length.
trait Truncate: Write {
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;
}

impl Truncate for fs::File {
    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

/// Writes `batch`, truncating back to `rollback_len` if any part of it fails.
fn write_batch<W: Truncate>(out: &mut W, batch: &[u8], rollback_len: u64) -> io::Result<()> {
    let Err(e) = out.write_all(batch).and_then(|()| out.flush()) else {
        return Ok(());
    };
    if let Err(rollback) = out.truncate_to(rollback_len) {
        warn!(
            error = %rollback,
            len = rollback_len,
            "Could not roll back partial ledger write"
        );
    }
    Err(e)
}

fn encode_rows(rows: &[ResultRow], with_header: bool) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    if with_header {
        writer.write_record(LEDGER_COLUMNS)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}
