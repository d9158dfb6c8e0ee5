//! Source parsing: identifiers, reference URLs and the source list itself.
//!
//! This module turns the raw tab-delimited source list into an ordered set of
//! [`DocumentRef`]s and maps each reference URL onto a canonical abstract page.
//!
//! # Example
//!
//! ```
//! use harvester_core::parser::{normalize, resolve};
//!
//! assert_eq!(resolve("PN0060987"), Some(60987));
//! assert_eq!(
//!     normalize("https://arxiv.org/pdf/2301.12345v2.pdf").as_deref(),
//!     Some("https://arxiv.org/abs/2301.12345v2")
//! );
//! ```

mod error;
mod identifier;
mod source_list;
mod url;

pub use error::SourceListError;
pub use identifier::resolve;
pub use source_list::{DocumentRef, SkipCounts, SourceLayout, load_documents, read_documents};
pub use url::{extract_paper_id, normalize, normalize_with_base};
