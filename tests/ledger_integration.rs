//! Resumption by re-running over disjoint ranges against one ledger.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use harvester_core::config::IdRange;
use harvester_core::{
    FetchError, HarvestConfig, Harvester, LEDGER_COLUMNS, Ledger, PageFetcher, build_report,
};
use tempfile::TempDir;

/// Every page carries the same arXiv license and two versions.
struct FixedPage;

#[async_trait]
impl PageFetcher for FixedPage {
    async fn fetch(&self, _url: &str) -> Result<String, FetchError> {
        Ok(r#"<html><body>
            <div class="submission-history">[v1] [v2]</div>
            <a href="/licenses/nonexclusive-distrib/1.0/">license</a>
        </body></html>"#
            .to_string())
    }
}

fn write_source(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("ids.txt");
    let body: String = (60_987..=60_996)
        .map(|n| format!("PN0{n:06}\tq\tr\thttps://arxiv.org/abs/2301.{n:05}\n"))
        .collect();
    std::fs::write(&path, body).unwrap();
    path
}

fn config(dir: &Path, source: &Path, range: IdRange) -> HarvestConfig {
    HarvestConfig {
        source_path: source.to_path_buf(),
        ledger_path: dir.join("ledger.csv"),
        archive_dir: dir.join("pages"),
        request_delay: Duration::ZERO,
        checkpoint_interval: 3,
        id_range: range,
        ..HarvestConfig::default()
    }
}

#[tokio::test]
async fn test_disjoint_runs_are_additive_with_single_header() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path());

    let first = Harvester::new(
        config(dir.path(), &source, IdRange::new(60_987, 60_991)),
        Arc::new(FixedPage),
    )
    .unwrap();
    let stats = first.run().await.unwrap();
    assert_eq!(stats.processed, 5);
    assert_eq!(stats.flushes, 2);

    let second = Harvester::new(
        config(dir.path(), &source, IdRange::new(60_992, 60_996)),
        Arc::new(FixedPage),
    )
    .unwrap();
    second.run().await.unwrap();

    let ledger_path = dir.path().join("ledger.csv");
    let content = std::fs::read_to_string(&ledger_path).unwrap();
    let header = LEDGER_COLUMNS.join(",");
    assert_eq!(content.lines().filter(|l| *l == header).count(), 1);
    assert!(content.starts_with(&header));

    let rows = Ledger::read_rows(&ledger_path).unwrap();
    let ids: Vec<String> = rows.iter().map(|r| r.doc_id.clone()).collect();
    let expected: Vec<String> = (60_987..=60_996).map(|n| format!("PN0{n:06}")).collect();
    assert_eq!(ids, expected);
    assert!(rows.iter().all(|r| r.license_name == "arXiv Non-exclusive"));
    assert!(rows.iter().all(|r| r.version.as_deref() == Some("v2")));
    assert!(rows.iter().all(|r| {
        r.license_url.as_deref() == Some("https://arxiv.org/licenses/nonexclusive-distrib/1.0/")
    }));

    let report = build_report(&rows);
    assert_eq!(report.total_records, 10);
    assert!((report.license_coverage - 100.0).abs() < 1e-9);
}
