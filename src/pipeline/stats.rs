//! Run statistics.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::fetch::FetchErrorKind;

/// Counters accumulated over one harvest run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct HarvestStats {
    /// In-range documents loaded from the source list.
    pub total: usize,
    /// Documents that produced a ledger row (buffered or flushed).
    pub processed: usize,
    /// Documents fetched and extracted.
    pub successful: usize,
    /// Documents whose reference URL matched no known shape.
    pub normalization_failures: usize,
    /// Fetches that timed out.
    pub fetch_timeouts: usize,
    /// Fetches that failed at the connection level.
    pub fetch_connection_errors: usize,
    /// Fetches answered with a non-success status.
    pub fetch_bad_status: usize,
    /// Pages fetched but not archived.
    pub archive_failures: usize,
    /// Successful ledger appends.
    pub flushes: usize,
    /// Ledger appends that failed and were retried later.
    pub failed_flushes: usize,
    /// Rows still buffered when the run ended.
    pub unflushed_rows: usize,
    /// Wall-clock duration of the run.
    #[serde(serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

impl HarvestStats {
    /// Total fetch failures of any kind.
    #[must_use]
    pub fn fetch_failures(&self) -> usize {
        self.fetch_timeouts + self.fetch_connection_errors + self.fetch_bad_status
    }

    /// Percentage of processed documents that were harvested; 0 when none were processed.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        if self.processed == 0 {
            return 0.0;
        }
        self.successful as f64 / self.processed as f64 * 100.0
    }

    pub(crate) fn record_fetch_failure(&mut self, kind: FetchErrorKind) {
        match kind {
            FetchErrorKind::Timeout => self.fetch_timeouts += 1,
            FetchErrorKind::Connection => self.fetch_connection_errors += 1,
            FetchErrorKind::BadStatus => self.fetch_bad_status += 1,
        }
    }
}

impl fmt::Display for HarvestStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Processed: {}/{}", self.processed, self.total)?;
        writeln!(f, "Successful: {}", self.successful)?;
        writeln!(f, "Normalization failures: {}", self.normalization_failures)?;
        writeln!(
            f,
            "Fetch failures: {} (timeout {}, connection {}, bad status {})",
            self.fetch_failures(),
            self.fetch_timeouts,
            self.fetch_connection_errors,
            self.fetch_bad_status
        )?;
        writeln!(f, "Archive failures: {}", self.archive_failures)?;
        writeln!(
            f,
            "Ledger flushes: {} ({} failed)",
            self.flushes, self.failed_flushes
        )?;
        if self.unflushed_rows > 0 {
            writeln!(f, "Rows NOT written to ledger: {}", self.unflushed_rows)?;
        }
        writeln!(f, "Elapsed: {:.1}s", self.elapsed.as_secs_f64())?;
        write!(f, "Success rate: {:.1}%", self.success_rate())
    }
}

fn serialize_secs<S: serde::Serializer>(
    value: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(value.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate_zero_when_nothing_processed() {
        assert!(HarvestStats::default().success_rate().abs() < f64::EPSILON);
    }

    #[test]
    fn test_success_rate_percentage() {
        let stats = HarvestStats {
            processed: 4,
            successful: 3,
            ..HarvestStats::default()
        };
        assert!((stats.success_rate() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_fetch_failures_sum_kinds() {
        let mut stats = HarvestStats::default();
        stats.record_fetch_failure(FetchErrorKind::Timeout);
        stats.record_fetch_failure(FetchErrorKind::BadStatus);
        stats.record_fetch_failure(FetchErrorKind::BadStatus);
        assert_eq!(stats.fetch_failures(), 3);
        assert_eq!(stats.fetch_bad_status, 2);
    }

    #[test]
    fn test_display_mentions_unflushed_rows_only_when_present() {
        let clean = HarvestStats::default().to_string();
        assert!(!clean.contains("NOT written"));
        let lossy = HarvestStats {
            unflushed_rows: 3,
            ..HarvestStats::default()
        }
        .to_string();
        assert!(lossy.contains("Rows NOT written to ledger: 3"));
    }
}
