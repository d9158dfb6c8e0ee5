//! Loading, filtering and ordering of the tab-delimited source list.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info, instrument};

use super::error::SourceListError;
use super::identifier::resolve;
use crate::config::IdRange;

/// A source list entry that survived resolution and range filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    /// Identifier exactly as it appears in the source list (trimmed).
    pub raw_id: String,
    /// Reference URL exactly as it appears in the source list (trimmed).
    pub raw_url: String,
    /// Resolved numeric key; always inside the configured range.
    pub numeric_key: u64,
}

/// Column layout and range filter applied while loading.
#[derive(Debug, Clone, Copy)]
pub struct SourceLayout {
    /// Column holding the raw identifier.
    pub id_column: usize,
    /// Column holding the reference URL.
    pub url_column: usize,
    /// Inclusive numeric range to keep.
    pub range: IdRange,
}

/// Per-reason counts of rows dropped while loading.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SkipCounts {
    /// Rows with too few columns.
    pub short_rows: usize,
    /// Rows whose reference URL is empty.
    pub empty_urls: usize,
    /// Rows whose identifier has no numeric key.
    pub unresolved: usize,
    /// Rows whose key falls outside the range.
    pub out_of_range: usize,
}

/// Loads the source list at `path`.
///
/// # Errors
///
/// Returns [`SourceListError`] when the file cannot be opened or read.
#[instrument(skip(layout), fields(path = %path.display()))]
pub fn load_documents(
    path: &Path,
    layout: SourceLayout,
) -> Result<Vec<DocumentRef>, SourceListError> {
    let file = File::open(path).map_err(|e| SourceListError::open(path, e))?;
    let (documents, skipped) =
        read_documents(file, layout).map_err(|e| SourceListError::read(path, e))?;
    info!(
        documents = documents.len(),
        short_rows = skipped.short_rows,
        empty_urls = skipped.empty_urls,
        unresolved = skipped.unresolved,
        out_of_range = skipped.out_of_range,
        "Loaded source list"
    );
    Ok(documents)
}

/// Reads source rows from any reader, returning in-range documents sorted by key.
///
/// Sorting is stable, so rows sharing a key keep their source order.
///
/// # Errors
///
/// Returns the underlying [`csv::Error`] if a row cannot be read.
pub fn read_documents<R: Read>(
    reader: R,
    layout: SourceLayout,
) -> Result<(Vec<DocumentRef>, SkipCounts), csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let min_columns = layout.id_column.max(layout.url_column) + 1;
    let mut documents = Vec::new();
    let mut skipped = SkipCounts::default();

    for record in csv_reader.records() {
        let record = record?;
        if record.len() < min_columns {
            skipped.short_rows += 1;
            continue;
        }

        let raw_id = record.get(layout.id_column).unwrap_or_default().trim();
        let raw_url = record.get(layout.url_column).unwrap_or_default().trim();
        if raw_url.is_empty() {
            skipped.empty_urls += 1;
            continue;
        }

        let Some(numeric_key) = resolve(raw_id) else {
            debug!(raw_id = %raw_id, "identifier has no numeric key");
            skipped.unresolved += 1;
            continue;
        };
        if !layout.range.contains(numeric_key) {
            skipped.out_of_range += 1;
            continue;
        }

        documents.push(DocumentRef {
            raw_id: raw_id.to_string(),
            raw_url: raw_url.to_string(),
            numeric_key,
        });
    }

    documents.sort_by_key(|doc| doc.numeric_key);
    Ok((documents, skipped))
}
