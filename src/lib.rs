//! Harvester Core Library
//!
//! This library provides the core functionality for the arXiv harvester,
//! which walks a bounded range of document identifiers, fetches each paper's
//! abstract page, extracts license and bibliographic fields, and appends the
//! results to an append-only CSV ledger with periodic checkpoints.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`parser`] - Identifier resolution, abstract URL normalization, source list loading
//! - [`license`] - License URL classification against an ordered rule table
//! - [`extract`] - Tolerant field extraction from abstract page markup
//! - [`fetch`] - Timeout-bounded page fetching and request pacing
//! - [`ledger`] - Append-only CSV ledger and result rows
//! - [`archive`] - Per-document raw page archive
//! - [`pipeline`] - Sequential, checkpointed harvest driver
//! - [`report`] - License and version distribution report over a ledger
//! - [`config`] - Explicit run configuration

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod archive;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod ledger;
pub mod license;
pub mod parser;
pub(crate) mod patterns;
pub mod pipeline;
pub mod report;
#[cfg(test)]
pub mod test_support;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use archive::{Archive, ArchiveError, sanitize_document_id};
pub use config::{ConfigError, HarvestConfig, IdRange};
pub use extract::{ExtractedMetadata, extract};
pub use fetch::{FetchError, FetchErrorKind, HttpFetcher, PageFetcher, RequestPacer};
pub use ledger::{LEDGER_COLUMNS, Ledger, LedgerError, ResultRow};
pub use license::{LicenseRule, UNKNOWN_LICENSE, UNMAPPED_LICENSE, classify, classify_with};
pub use parser::{DocumentRef, SourceListError, load_documents, normalize, resolve};
pub use pipeline::{HarvestError, HarvestStats, Harvester};
pub use report::{DistributionReport, ReportError, build_report};
