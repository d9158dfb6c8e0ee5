//! Explicit run configuration for a harvest.
//!
//! Every knob the pipeline reads lives on [`HarvestConfig`], which is built
//! once (defaults, then config file, then CLI flags) and handed to the
//! [`Harvester`](crate::pipeline::Harvester) at construction.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::license::{DEFAULT_LICENSE_RULES, LicenseRule};
use crate::user_agent;

/// Default tab-delimited source list path.
pub const DEFAULT_SOURCE_PATH: &str = "iSearchIDs.txt";

/// Default ledger path.
pub const DEFAULT_LEDGER_PATH: &str = "arxiv_metadata.csv";

/// Default archive directory for raw abstract pages.
pub const DEFAULT_ARCHIVE_DIR: &str = "abstract_pages";

/// Default delay observed after every document (500ms).
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(500);

/// Default per-request timeout (15 seconds).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Default number of documents between ledger flushes.
pub const DEFAULT_CHECKPOINT_INTERVAL: usize = 50;

/// Default base URL for canonical abstract pages.
pub const DEFAULT_ABS_BASE_URL: &str = "https://arxiv.org";

/// Default column holding the raw document identifier.
pub const DEFAULT_ID_COLUMN: usize = 0;

/// Default column holding the reference URL.
pub const DEFAULT_URL_COLUMN: usize = 3;

/// Errors raised when a configuration value is out of range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Checkpoint interval must be at least one document.
    #[error("checkpoint interval must be at least 1")]
    ZeroCheckpointInterval,

    /// Range start is greater than range end.
    #[error("invalid document ID range: start {start} is greater than end {end}")]
    InvertedRange {
        /// Inclusive lower bound.
        start: u64,
        /// Inclusive upper bound.
        end: u64,
    },

    /// Request timeout must be non-zero.
    #[error("request timeout must be greater than zero")]
    ZeroTimeout,

    /// Identifier and URL columns must differ.
    #[error("identifier column and URL column must differ (both are {0})")]
    ColumnClash(usize),

    /// The abstract base URL must be an http(s) URL.
    #[error("abstract base URL '{0}' must start with http:// or https://")]
    InvalidBaseUrl(String),
}

/// Inclusive numeric document ID range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdRange {
    /// Inclusive lower bound.
    pub start: u64,
    /// Inclusive upper bound.
    pub end: u64,
}

impl IdRange {
    /// Creates a new inclusive range.
    #[must_use]
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Returns true if `key` falls inside the range (both ends inclusive).
    #[must_use]
    pub fn contains(&self, key: u64) -> bool {
        (self.start..=self.end).contains(&key)
    }
}

impl Default for IdRange {
    fn default() -> Self {
        Self::new(60_987, 61_041)
    }
}

/// Configuration for a single harvest run.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Tab-delimited source list.
    pub source_path: PathBuf,
    /// Append-only CSV ledger.
    pub ledger_path: PathBuf,
    /// Directory for per-document raw page archives.
    pub archive_dir: PathBuf,
    /// Delay observed after every document, regardless of outcome.
    pub request_delay: Duration,
    /// Per-request network timeout.
    pub request_timeout: Duration,
    /// Number of processed documents between ledger flushes.
    pub checkpoint_interval: usize,
    /// Inclusive numeric ID range to process.
    pub id_range: IdRange,
    /// Identifying client tag sent as User-Agent.
    pub user_agent: String,
    /// Ordered license substring rules; first match wins.
    pub license_rules: Vec<LicenseRule>,
    /// Base URL canonical abstract pages are rewritten onto.
    pub abs_base_url: String,
    /// Source list column holding the raw identifier.
    pub id_column: usize,
    /// Source list column holding the reference URL.
    pub url_column: usize,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from(DEFAULT_SOURCE_PATH),
            ledger_path: PathBuf::from(DEFAULT_LEDGER_PATH),
            archive_dir: PathBuf::from(DEFAULT_ARCHIVE_DIR),
            request_delay: DEFAULT_REQUEST_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            id_range: IdRange::default(),
            user_agent: user_agent::default_harvest_user_agent(),
            license_rules: DEFAULT_LICENSE_RULES.to_vec(),
            abs_base_url: DEFAULT_ABS_BASE_URL.to_string(),
            id_column: DEFAULT_ID_COLUMN,
            url_column: DEFAULT_URL_COLUMN,
        }
    }
}

impl HarvestConfig {
    /// Validates values the pipeline relies on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for the first out-of-range value found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.checkpoint_interval == 0 {
            return Err(ConfigError::ZeroCheckpointInterval);
        }
        if self.id_range.start > self.id_range.end {
            return Err(ConfigError::InvertedRange {
                start: self.id_range.start,
                end: self.id_range.end,
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.id_column == self.url_column {
            return Err(ConfigError::ColumnClash(self.id_column));
        }
        let base = self.abs_base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(self.abs_base_url.clone()));
        }
        Ok(())
    }
}
