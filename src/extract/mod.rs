//! Tolerant field extraction from abstract page markup.
//!
//! Extraction never fails. Each field owns an ordered list of independent
//! strategies (see [`strategies`]) and takes the first one that produces a
//! value; a missing field leaves the other fields untouched.
//!
//! # Example
//!
//! ```
//! use harvester_core::extract::extract;
//!
//! let metadata = extract(
//!     r#"<html><body>
//!          <h1 class="title">Title: Deep Nets</h1>
//!          <div class="submission-history">[v1] Mon [v2] Tue</div>
//!        </body></html>"#,
//! );
//! assert_eq!(metadata.title, "Deep Nets");
//! assert_eq!(metadata.version.as_deref(), Some("v2"));
//! assert_eq!(metadata.license_url, None);
//! ```

pub(crate) mod strategies;
mod text;

use scraper::Html;
use serde::Serialize;
use tracing::debug;

use strategies::{Strategy, first_match};

/// Fields pulled from one abstract page.
///
/// License URL and version are optional; the remaining fields are empty
/// strings when the page does not carry them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedMetadata {
    /// Absolute license URL, if any license link was found.
    pub license_url: Option<String>,
    /// Highest version marker (`vN`), if any.
    pub version: Option<String>,
    pub title: String,
    /// Author names joined with `", "`.
    pub authors: String,
    pub comments: String,
    pub subjects: String,
    pub journal_ref: String,
    pub related_doi: String,
}

impl ExtractedMetadata {
    /// Number of fields that carry a value.
    #[must_use]
    pub fn populated_fields(&self) -> usize {
        let optional = [&self.license_url, &self.version]
            .into_iter()
            .filter(|field| field.is_some())
            .count();
        let text = [
            &self.title,
            &self.authors,
            &self.comments,
            &self.subjects,
            &self.journal_ref,
            &self.related_doi,
        ]
        .into_iter()
        .filter(|field| !field.is_empty())
        .count();
        optional + text
    }
}

/// Extracts every known field from `markup`.
#[must_use]
pub fn extract(markup: &str) -> ExtractedMetadata {
    let document = Html::parse_document(markup);
    let text_field =
        |strategies: &[Strategy]| first_match(&document, strategies).unwrap_or_default();

    let metadata = ExtractedMetadata {
        license_url: first_match(&document, strategies::LICENSE_URL),
        version: first_match(&document, strategies::VERSION),
        title: text_field(strategies::TITLE),
        authors: text_field(strategies::AUTHORS),
        comments: text_field(strategies::COMMENTS),
        subjects: text_field(strategies::SUBJECTS),
        journal_ref: text_field(strategies::JOURNAL_REF),
        related_doi: text_field(strategies::RELATED_DOI),
    };
    debug!(
        populated = metadata.populated_fields(),
        has_license = metadata.license_url.is_some(),
        "Extracted page fields"
    );
    metadata
}
