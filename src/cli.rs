//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args as ClapArgs, Parser, Subcommand};
use harvester_core::config::IdRange;
use harvester_core::{HarvestConfig, LicenseRule};

use crate::app_config::parse_license_rule;

/// Harvest license and bibliographic metadata from arXiv abstract pages.
///
/// Walks a bounded range of document identifiers from a tab-delimited source
/// list, fetches each paper's abstract page at a fixed pace and appends one
/// row per document to a CSV ledger.
#[derive(Parser, Debug)]
#[command(name = "harvester")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/arxiv-harvester/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch abstract pages and append results to the ledger
    Harvest(HarvestArgs),
    /// Summarize license and version distribution of a ledger
    Report(ReportArgs),
}

/// Options for `harvester harvest`.
#[derive(ClapArgs, Debug, Default)]
pub struct HarvestArgs {
    /// Tab-delimited source list
    #[arg(short, long, value_name = "PATH")]
    pub source: Option<PathBuf>,

    /// CSV ledger to append to
    #[arg(long, value_name = "PATH")]
    pub ledger: Option<PathBuf>,

    /// Directory for archived abstract pages
    #[arg(long, value_name = "DIR")]
    pub archive_dir: Option<PathBuf>,

    /// First numeric document ID to process (inclusive)
    #[arg(long)]
    pub start: Option<u64>,

    /// Last numeric document ID to process (inclusive)
    #[arg(long)]
    pub end: Option<u64>,

    /// Delay after every document in milliseconds (0 to disable, max 60000)
    #[arg(short = 'l', long, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub delay_ms: Option<u64>,

    /// Per-request timeout in seconds (1-3600)
    #[arg(short = 't', long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout_secs: Option<u64>,

    /// Documents between ledger flushes (at least 1)
    #[arg(short = 'k', long, value_parser = parse_checkpoint_interval)]
    pub checkpoint_interval: Option<usize>,

    /// User-Agent sent with every request
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Base URL canonical abstract pages are fetched from
    #[arg(long, value_name = "URL")]
    pub abs_base_url: Option<String>,

    /// Source column holding the document identifier
    #[arg(long)]
    pub id_column: Option<usize>,

    /// Source column holding the reference URL
    #[arg(long)]
    pub url_column: Option<usize>,

    /// License rule "<pattern> => <name>"; repeat to replace the built-in table
    #[arg(long = "license-rule", value_name = "RULE", value_parser = parse_license_rule_arg)]
    pub license_rules: Vec<LicenseRule>,

    /// Load and normalize the source list without fetching or writing
    #[arg(long)]
    pub dry_run: bool,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl HarvestArgs {
    /// Applies flags on top of `config`.
    pub fn apply_to(&self, config: &mut HarvestConfig) {
        if let Some(path) = &self.source {
            config.source_path.clone_from(path);
        }
        if let Some(path) = &self.ledger {
            config.ledger_path.clone_from(path);
        }
        if let Some(path) = &self.archive_dir {
            config.archive_dir.clone_from(path);
        }
        config.id_range = IdRange::new(
            self.start.unwrap_or(config.id_range.start),
            self.end.unwrap_or(config.id_range.end),
        );
        if let Some(ms) = self.delay_ms {
            config.request_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = self.timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(interval) = self.checkpoint_interval {
            config.checkpoint_interval = interval;
        }
        if let Some(agent) = &self.user_agent {
            config.user_agent.clone_from(agent);
        }
        if let Some(base) = &self.abs_base_url {
            config.abs_base_url.clone_from(base);
        }
        if let Some(column) = self.id_column {
            config.id_column = column;
        }
        if let Some(column) = self.url_column {
            config.url_column = column;
        }
        if !self.license_rules.is_empty() {
            config.license_rules.clone_from(&self.license_rules);
        }
    }
}

/// Options for `harvester report`.
#[derive(ClapArgs, Debug, Default)]
pub struct ReportArgs {
    /// Ledger to analyze (defaults to the configured ledger path)
    #[arg(long, value_name = "PATH")]
    pub ledger: Option<PathBuf>,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Emit JSON instead of the text report
    #[arg(long)]
    pub json: bool,
}

fn parse_checkpoint_interval(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("checkpoint interval must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn parse_license_rule_arg(value: &str) -> Result<LicenseRule, String> {
    parse_license_rule(value).map_err(|e| e.to_string())
}
