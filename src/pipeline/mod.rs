//! Sequential, checkpointed harvest driver.
//!
//! One worker walks the in-range documents in ascending key order. For each
//! document it normalizes the reference URL, fetches the abstract page,
//! extracts and classifies its fields, archives the raw body and buffers one
//! ledger row. The buffer is appended to the ledger every
//! `checkpoint_interval` documents and once at the end, and a fixed delay is
//! observed after every document whatever its outcome.
//!
//! Exactly one row is produced per in-range document, so once a run
//! completes (and its flushes succeed) the ledger grew by the number of
//! documents loaded.

mod checkpoint;
mod stats;

use std::sync::Arc;

use indicatif::ProgressBar;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use crate::archive::Archive;
use crate::config::{ConfigError, HarvestConfig};
use crate::extract::extract;
use crate::fetch::{FetchErrorKind, PageFetcher, RequestPacer};
use crate::ledger::{Ledger, ResultRow};
use crate::license::classify_with;
use crate::parser::{
    DocumentRef, SourceLayout, SourceListError, load_documents, normalize_with_base,
};

use checkpoint::{CheckpointBuffer, FlushOutcome};
pub use stats::HarvestStats;

/// Fatal errors: both are raised before any network activity.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// The configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The source list could not be read.
    #[error(transparent)]
    SourceList(#[from] SourceListError),
}

/// What happened to one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentOutcome {
    /// Page fetched and extracted; `archived` is false if the archive write failed.
    Harvested {
        /// Whether the raw page was archived.
        archived: bool,
    },
    /// The reference URL matched no known shape.
    NormalizationFailed,
    /// The fetch failed.
    FetchFailed(FetchErrorKind),
}

/// A document as a dry run reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFetch {
    /// Identifier as it appears in the source list.
    pub doc_id: String,
    /// Resolved numeric key.
    pub numeric_key: u64,
    /// Abstract URL that would be fetched; `None` if normalization fails.
    pub abs_url: Option<String>,
}

/// Harvest driver built from an explicit configuration.
pub struct Harvester {
    config: HarvestConfig,
    fetcher: Arc<dyn PageFetcher>,
    pacer: RequestPacer,
    ledger: Ledger,
    archive: Archive,
    progress: Option<ProgressBar>,
}

impl std::fmt::Debug for Harvester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Harvester")
            .field("config", &self.config)
            .field("pacer", &self.pacer)
            .field("ledger", &self.ledger)
            .field("archive", &self.archive)
            .finish_non_exhaustive()
    }
}

impl Harvester {
    /// Creates a harvester after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::Config`] if the configuration is invalid.
    pub fn new(config: HarvestConfig, fetcher: Arc<dyn PageFetcher>) -> Result<Self, HarvestError> {
        config.validate()?;
        Ok(Self {
            pacer: RequestPacer::new(config.request_delay),
            ledger: Ledger::new(&config.ledger_path),
            archive: Archive::new(&config.archive_dir),
            config,
            fetcher,
            progress: None,
        })
    }

    /// Attaches a progress bar that is advanced once per document.
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Returns the run configuration.
    #[must_use]
    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Returns the pacer, for inspecting pauses after a run.
    #[must_use]
    pub fn pacer(&self) -> &RequestPacer {
        &self.pacer
    }

    /// Loads in-range documents sorted by numeric key.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::SourceList`] if the source list is unreadable.
    pub fn load(&self) -> Result<Vec<DocumentRef>, HarvestError> {
        let layout = SourceLayout {
            id_column: self.config.id_column,
            url_column: self.config.url_column,
            range: self.config.id_range,
        };
        Ok(load_documents(&self.config.source_path, layout)?)
    }

    /// Loads and normalizes the source list without network or disk writes.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::SourceList`] if the source list is unreadable.
    #[instrument(skip(self))]
    pub fn dry_run(&self) -> Result<Vec<PlannedFetch>, HarvestError> {
        let documents = self.load()?;
        let planned: Vec<PlannedFetch> = documents
            .into_iter()
            .map(|doc| {
                let abs_url = normalize_with_base(&doc.raw_url, &self.config.abs_base_url);
                match &abs_url {
                    Some(url) => info!(doc_id = %doc.raw_id, url = %url, "Would fetch"),
                    None => warn!(
                        doc_id = %doc.raw_id,
                        raw_url = %doc.raw_url,
                        "Would record empty row: unrecognized URL"
                    ),
                }
                PlannedFetch {
                    doc_id: doc.raw_id,
                    numeric_key: doc.numeric_key,
                    abs_url,
                }
            })
            .collect();
        if planned.is_empty() {
            warn!(
                start = self.config.id_range.start,
                end = self.config.id_range.end,
                "No documents in range"
            );
        }
        Ok(planned)
    }

    /// Runs the harvest over every in-range document.
    ///
    /// Only an unreadable source list is fatal. Every per-document failure
    /// becomes an empty row, and a failed ledger append keeps its rows for
    /// the next flush; rows still unwritten at the end are reported in
    /// [`HarvestStats::unflushed_rows`].
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::SourceList`] if the source list is unreadable.
    #[instrument(skip(self), fields(ledger = %self.config.ledger_path.display()))]
    pub async fn run(&self) -> Result<HarvestStats, HarvestError> {
        let started = Instant::now();
        let documents = self.load()?;
        let total = documents.len();
        let mut stats = HarvestStats {
            total,
            ..HarvestStats::default()
        };

        if documents.is_empty() {
            warn!(
                start = self.config.id_range.start,
                end = self.config.id_range.end,
                "No documents in range; nothing to harvest"
            );
            stats.elapsed = started.elapsed();
            return Ok(stats);
        }

        info!(
            total,
            interval = self.config.checkpoint_interval,
            "Starting harvest"
        );
        if let Some(progress) = &self.progress {
            progress.set_length(u64::try_from(total).unwrap_or(u64::MAX));
        }

        let mut buffer = CheckpointBuffer::new(self.config.checkpoint_interval);
        for doc in &documents {
            if let Some(progress) = &self.progress {
                progress.set_message(doc.raw_id.clone());
            }

            let (row, outcome) = self.process_document(doc).await;
            match outcome {
                DocumentOutcome::Harvested { archived } => {
                    stats.successful += 1;
                    if !archived {
                        stats.archive_failures += 1;
                    }
                }
                DocumentOutcome::NormalizationFailed => stats.normalization_failures += 1,
                DocumentOutcome::FetchFailed(kind) => stats.record_fetch_failure(kind),
            }
            buffer.push(row);
            stats.processed += 1;

            if buffer.is_due(stats.processed) {
                let outcome = buffer.flush(&self.ledger, stats.processed, total);
                record_flush(&mut stats, outcome);
            }
            if let Some(progress) = &self.progress {
                progress.inc(1);
            }

            self.pacer.pause().await;
        }

        let outcome = buffer.flush(&self.ledger, stats.processed, total);
        record_flush(&mut stats, outcome);
        stats.unflushed_rows = buffer.len();
        if stats.unflushed_rows > 0 {
            error!(
                rows = stats.unflushed_rows,
                ledger = %self.ledger.path().display(),
                "Final flush failed; rows were not written to the ledger"
            );
        }

        stats.elapsed = started.elapsed();
        info!(
            processed = stats.processed,
            successful = stats.successful,
            flushes = stats.flushes,
            elapsed_secs = stats.elapsed.as_secs_f64(),
            "Harvest complete"
        );
        Ok(stats)
    }

    /// Produces the ledger row for one document. Never fails.
    #[instrument(skip(self, doc), fields(doc_id = %doc.raw_id, key = doc.numeric_key))]
    pub async fn process_document(&self, doc: &DocumentRef) -> (ResultRow, DocumentOutcome) {
        let Some(abs_url) = normalize_with_base(&doc.raw_url, &self.config.abs_base_url) else {
            warn!(raw_url = %doc.raw_url, "Unrecognized reference URL");
            return (
                ResultRow::empty(&doc.raw_id, &doc.raw_url),
                DocumentOutcome::NormalizationFailed,
            );
        };

        let body = match self.fetcher.fetch(&abs_url).await {
            Ok(body) => body,
            Err(e) => {
                return (
                    ResultRow::empty(&doc.raw_id, &abs_url),
                    DocumentOutcome::FetchFailed(e.kind()),
                );
            }
        };

        let archived = match self.archive.store(&doc.raw_id, &body) {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Archive write failed; keeping row");
                false
            }
        };

        let metadata = extract(&body);
        let license_name =
            classify_with(metadata.license_url.as_deref(), &self.config.license_rules);
        debug!(
            license = %license_name,
            version = ?metadata.version,
            "Classified page"
        );
        let row = ResultRow::from_metadata(&doc.raw_id, abs_url, metadata, license_name);
        (row, DocumentOutcome::Harvested { archived })
    }
}

fn record_flush(stats: &mut HarvestStats, outcome: FlushOutcome) {
    match outcome {
        FlushOutcome::Written(_) => stats.flushes += 1,
        FlushOutcome::Retained(_) => stats.failed_flushes += 1,
        FlushOutcome::Empty => {}
    }
}
