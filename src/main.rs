//! CLI entry point for the arXiv harvester.

use std::fs;
use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use harvester_core::report::load_report;
use harvester_core::{HarvestConfig, Harvester, HttpFetcher};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

mod app_config;
mod cli;

use cli::{Args, Command, HarvestArgs, ReportArgs};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let loaded = app_config::load_config(args.config.as_deref())?;
    let mut config = HarvestConfig::default();
    if let Some(file_config) = &loaded.config {
        file_config.apply_to(&mut config);
        debug!(path = ?loaded.path, "Loaded config file");
    }

    match &args.command {
        Command::Harvest(harvest) => run_harvest(config, harvest, args.quiet).await,
        Command::Report(report) => run_report(&config, report),
    }
}

async fn run_harvest(mut config: HarvestConfig, args: &HarvestArgs, quiet: bool) -> Result<()> {
    args.apply_to(&mut config);
    config.validate().context("Invalid harvest configuration")?;

    let fetcher = HttpFetcher::from_config(&config).context("Failed to build HTTP client")?;
    let mut harvester = Harvester::new(config, Arc::new(fetcher))?;

    if args.dry_run {
        let plan = harvester.dry_run()?;
        let fetchable = plan.iter().filter(|p| p.abs_url.is_some()).count();
        println!(
            "Dry run: {} documents in range, {} fetchable, {} would be recorded as empty rows",
            plan.len(),
            fetchable,
            plan.len() - fetchable
        );
        return Ok(());
    }

    let show_progress = !quiet && !args.no_progress && io::stderr().is_terminal();
    let progress = show_progress.then(new_progress_bar);
    if let Some(bar) = &progress {
        harvester = harvester.with_progress(bar.clone());
    }

    info!(
        source = %harvester.config().source_path.display(),
        ledger = %harvester.config().ledger_path.display(),
        "Harvester starting"
    );
    let stats = harvester.run().await?;
    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    if !quiet {
        println!("{stats}");
    }
    if stats.unflushed_rows > 0 {
        bail!(
            "{} rows could not be written to {}",
            stats.unflushed_rows,
            harvester.config().ledger_path.display()
        );
    }
    Ok(())
}

fn run_report(config: &HarvestConfig, args: &ReportArgs) -> Result<()> {
    let ledger = args.ledger.as_deref().unwrap_or(&config.ledger_path);
    let report = load_report(ledger)
        .with_context(|| format!("Failed to build report from '{}'", ledger.display()))?;

    let rendered = if args.json {
        report.to_json()?
    } else {
        report.render_text()
    };

    match &args.output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("Failed to write report to '{}'", path.display()))?;
            info!(path = %path.display(), "Report saved");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            if !rendered.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}

fn new_progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}
