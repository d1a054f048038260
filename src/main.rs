//! fdio main entry point
//!
//! Command-line interface for crawling GitHub for Flogo contributions.

use clap::Parser;
use fdio::config::load_config_with_hash;
use fdio::crawler::{auth_headers, crawl, ContributionType, CrawlReport, CrawlSettings};
use fdio::storage::{open_storage, MemorySink, RunLog};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the configured API token
const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// fdio: discover Flogo activities and triggers published on GitHub
///
/// Searches GitHub code search for contribution metadata files, normalizes
/// each one, and stores the results in the configured SQLite database.
#[derive(Parser, Debug)]
#[command(name = "fdio")]
#[command(version)]
#[command(about = "Crawl GitHub for Flogo contributions", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Contribution type to search for ("Trigger"; anything else means activities)
    #[arg(short = 't', long = "type", default_value = "Activity")]
    contribution_type: String,

    /// Stop once the last repository seen is idle for more than this many hours (0 disables)
    #[arg(long, value_name = "HOURS")]
    timeout: Option<f64>,

    /// Crawl without writing to the database and print the records as JSON lines
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let timeout_hours = cli.timeout.unwrap_or(config.crawler.timeout_hours);
    if !timeout_hours.is_finite() || timeout_hours < 0.0 {
        return Err(format!("--timeout must be a non-negative number, got {}", timeout_hours).into());
    }

    let token = std::env::var(TOKEN_ENV).ok().or_else(|| config.github.token.clone());
    if token.is_none() {
        tracing::warn!("No API token configured; search requests will be heavily rate limited");
    }
    let headers = auth_headers(token.as_deref())?;

    let settings = CrawlSettings::from_config(&config);
    let contribution = ContributionType::from_label(&cli.contribution_type);
    tracing::info!(
        "Crawling {} contributions (staleness timeout: {} hours)",
        contribution,
        timeout_hours
    );

    if cli.dry_run {
        let mut sink = MemorySink::new();
        let report = crawl(&settings, &headers, &mut sink, timeout_hours, contribution).await?;
        for record in sink.into_records() {
            println!("{}", serde_json::to_string(&record)?);
        }
        log_report(&report);
        return Ok(());
    }

    let mut storage = open_storage(Path::new(&config.output.database_path))?;
    let run_id = storage.create_run(&config_hash, contribution.as_str())?;

    let result = crawl(&settings, &headers, &mut storage, timeout_hours, contribution).await;

    match result {
        Ok(report) => {
            storage.complete_run(run_id, &report)?;
            log_report(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            storage.fail_run(run_id, &e.to_string())?;
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("fdio=info,warn"),
            1 => EnvFilter::new("fdio=debug,info"),
            2 => EnvFilter::new("fdio=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn log_report(report: &CrawlReport) {
    tracing::info!(
        "Crawl completed: {} of {} pages, {} records, {} hits skipped ({})",
        report.pages_fetched,
        report.pages_total,
        report.records_emitted,
        report.skipped.len(),
        report.stop
    );

    for skipped in report.skipped.iter().filter(|s| !s.reason.is_silent()) {
        tracing::debug!("Skipped {}: {}", skipped.source, skipped.reason);
    }
}
