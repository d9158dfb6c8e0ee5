//! License and version distribution report over a ledger.
//!
//! A pure consumer of the ledger: empty `license_name` and `version` cells are
//! counted as [`UNKNOWN_LICENSE`]. The report renders as plain text or JSON.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};

use crate::ledger::{Ledger, LedgerError, ResultRow};
use crate::license::UNKNOWN_LICENSE;
use crate::patterns::compile_static_regex;

/// Number of licenses listed in the top section.
pub const TOP_LICENSES: usize = 5;

static FIRST_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"\d+"));

/// Errors raised while building or rendering a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The ledger could not be read.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The report could not be serialized.
    #[error("cannot serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One bucket of a distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionEntry {
    pub name: String,
    pub count: usize,
    /// Share of all records, in percent.
    pub percentage: f64,
}

/// License and version distribution over every ledger row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionReport {
    pub total_records: usize,
    pub records_with_license: usize,
    pub records_with_version: usize,
    pub license_coverage: f64,
    pub version_coverage: f64,
    /// Up to five most frequent licenses.
    pub top_licenses: Vec<DistributionEntry>,
    /// Licenses by count descending, ties by name.
    pub licenses: Vec<DistributionEntry>,
    /// Versions by number ascending; non-numeric values last.
    pub versions: Vec<DistributionEntry>,
}

/// Builds the report for `rows`.
#[must_use]
pub fn build_report(rows: &[ResultRow]) -> DistributionReport {
    let total = rows.len();
    let mut license_counts: HashMap<&str, usize> = HashMap::new();
    let mut version_counts: HashMap<&str, usize> = HashMap::new();

    for row in rows {
        *license_counts
            .entry(or_unknown(&row.license_name))
            .or_default() += 1;
        *version_counts
            .entry(or_unknown(row.version.as_deref().unwrap_or_default()))
            .or_default() += 1;
    }

    let records_with_license = total - license_counts.get(UNKNOWN_LICENSE).copied().unwrap_or(0);
    let records_with_version = total - version_counts.get(UNKNOWN_LICENSE).copied().unwrap_or(0);

    let mut licenses: Vec<(&str, usize)> = license_counts.into_iter().collect();
    licenses.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let mut versions: Vec<(&str, usize)> = version_counts.into_iter().collect();
    versions.sort_by(|a, b| {
        let key = |name: &str| version_number(name).map_or((1, 0), |n| (0, n));
        key(a.0).cmp(&key(b.0)).then_with(|| a.0.cmp(b.0))
    });

    let licenses: Vec<DistributionEntry> = licenses
        .into_iter()
        .map(|(name, count)| entry(name, count, total))
        .collect();
    let versions = versions
        .into_iter()
        .map(|(name, count)| entry(name, count, total))
        .collect();

    DistributionReport {
        total_records: total,
        records_with_license,
        records_with_version,
        license_coverage: percentage(records_with_license, total),
        version_coverage: percentage(records_with_version, total),
        top_licenses: licenses.iter().take(TOP_LICENSES).cloned().collect(),
        licenses,
        versions,
    }
}

/// Reads the ledger at `path` and builds its report.
///
/// # Errors
///
/// Returns [`ReportError::Ledger`] if the ledger cannot be read.
#[instrument(fields(path = %path.display()))]
pub fn load_report(path: &Path) -> Result<DistributionReport, ReportError> {
    let rows = Ledger::read_rows(path)?;
    info!(records = rows.len(), "Loaded ledger");
    Ok(build_report(&rows))
}

impl DistributionReport {
    /// Renders the plain-text report.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str("ARXIV LICENSE AND VERSION DISTRIBUTION REPORT\n");
        out.push_str(&"=".repeat(50));
        out.push_str("\n\n");

        section(&mut out, "SUMMARY STATISTICS:", 20);
        let _ = writeln!(
            out,
            "Total records analyzed: {}",
            group_thousands(self.total_records)
        );
        let _ = writeln!(
            out,
            "Records with license information: {}",
            group_thousands(self.records_with_license)
        );
        let _ = writeln!(
            out,
            "Records with version information: {}",
            group_thousands(self.records_with_version)
        );
        let _ = writeln!(out, "License coverage: {:.1}%", self.license_coverage);
        let _ = writeln!(out, "Version coverage: {:.1}%", self.version_coverage);
        out.push('\n');

        section(&mut out, "TOP 5 LICENSES:", 15);
        entries(&mut out, &self.top_licenses);

        out.push('\n');
        section(&mut out, "DETAILED LICENSE DISTRIBUTION:", 30);
        entries(&mut out, &self.licenses);

        out.push('\n');
        section(&mut out, "VERSION DISTRIBUTION:", 20);
        entries(&mut out, &self.versions);
        out
    }

    /// Renders the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialize`] if serialization fails.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn or_unknown(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        UNKNOWN_LICENSE
    } else {
        trimmed
    }
}

fn version_number(name: &str) -> Option<u64> {
    FIRST_NUMBER_RE.find(name)?.as_str().parse().ok()
}

#[allow(clippy::cast_precision_loss)]
fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

fn entry(name: &str, count: usize, total: usize) -> DistributionEntry {
    DistributionEntry {
        name: name.to_string(),
        count,
        percentage: percentage(count, total),
    }
}

fn section(out: &mut String, title: &str, rule: usize) {
    out.push_str(title);
    out.push('\n');
    out.push_str(&"-".repeat(rule));
    out.push('\n');
}

fn entries(out: &mut String, list: &[DistributionEntry]) {
    for item in list {
        let _ = writeln!(
            out,
            "{}: {} ({:.1}%)",
            item.name,
            group_thousands(item.count),
            item.percentage
        );
    }
}

fn group_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
