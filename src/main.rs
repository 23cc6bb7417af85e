//! Feed-Gleaner main entry point
//!
//! This is the command-line interface for the Feed-Gleaner image harvester.

use anyhow::{bail, Context};
use clap::Parser;
use dialoguer::Input;
use feed_gleaner::config::{load_config_with_hash, validate, validate_page_range, Config};
use feed_gleaner::crawler::Coordinator;
use feed_gleaner::output::{generate_markdown_summary, print_summary};
use feed_gleaner::url::FeedUrls;
use std::path::PathBuf;
use std::str::FromStr;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Feed-Gleaner: a polite image harvester for paginated feeds
///
/// Feed-Gleaner finds the last page of a feed that still carries images,
/// then downloads every image page by page into `page_{n}` directories.
/// Files already on disk are skipped, so re-running resumes a crawl.
#[derive(Parser, Debug)]
#[command(name = "feed-gleaner")]
#[command(version = "1.0.0")]
#[command(about = "A polite image harvester for paginated feeds", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// First page to crawl (overrides the config)
    #[arg(long, value_name = "PAGE")]
    start: Option<u32>,

    /// Last page to crawl (overrides the config; defaults to the located bound)
    #[arg(long, value_name = "PAGE")]
    end: Option<u32>,

    /// Crawl without asking for confirmation
    #[arg(short, long)]
    yes: bool,

    /// Site root of the feed (overrides the config)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Download root directory (overrides the config)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Locate the page bound and show what would be crawled, without downloading
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    apply_overrides(&mut config, &cli)?;
    let explicit_range =
        cli.start.is_some() || cli.end.is_some() || config.crawler.end_page.is_some();

    let feed = FeedUrls::from_config(&config.feed)?;
    println!("Starting image scraper for {}", feed.page_url(1));
    println!("Download directory: {}", config.output.download_root.display());
    println!("Press Ctrl+C to stop scraping at any time\n");

    let summary_path = config.output.summary_path.clone();
    let start_page = config.crawler.start_page;
    let end_page = config.crawler.end_page;
    let dry_run = cli.dry_run;

    let mut coordinator = Coordinator::new(config.clone())?.with_config_hash(config_hash);

    let token = coordinator.cancellation_token();
    spawn_interrupt_listener(token.clone());

    let bound = match coordinator.locate_bound().await {
        Ok(Some(bound)) => bound,
        Ok(None) => {
            println!("\nScraping stopped by user");
            print_summary(&coordinator.summary());
            return Ok(());
        }
        Err(e) => {
            tracing::error!("Could not determine the feed's page count: {}", e);
            print_summary(&coordinator.summary());
            return Err(e.into());
        }
    };

    println!("Detected maximum pages: {}", bound);

    if dry_run {
        handle_dry_run(&config, bound);
        return Ok(());
    }

    let range = if explicit_range || cli.yes {
        resolve_range(start_page, end_page, bound)?
    } else {
        let answer = run_prompt(token.clone(), move || prompt_for_range(bound)).await?;
        if token.is_cancelled() {
            // The prompt thread may still be blocked on stdin
            println!("Scraping cancelled");
            std::process::exit(130);
        }
        match answer {
            Some(range) => range,
            None => {
                println!("Scraping cancelled");
                return Ok(());
            }
        }
    };

    println!("Scraping pages {} to {}", range.0, range.1);
    let summary = coordinator.crawl(range.0, range.1).await?;

    print_summary(&summary);

    if let Some(path) = summary_path {
        generate_markdown_summary(&summary, &path)
            .with_context(|| format!("writing summary to {}", path.display()))?;
        println!("Summary written to: {}", path.display());
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("feed_gleaner=info,warn"),
            1 => EnvFilter::new("feed_gleaner=debug,info"),
            2 => EnvFilter::new("feed_gleaner=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Cancels `token` on the first Ctrl-C and exits the process on the second
///
/// The first interrupt lets the coordinator stop between requests; the second
/// one does not wait for an in-flight download.
fn spawn_interrupt_listener(token: CancellationToken) {
    tokio::spawn(async move {
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Unable to listen for interrupt signal: {}", e);
                return;
            }
            if token.is_cancelled() {
                eprintln!("\nSecond interrupt received, exiting immediately");
                std::process::exit(130);
            }
            tracing::info!("Interrupt received, stopping after the current request");
            token.cancel();
        }
    });
}

/// Range to crawl when no prompt is shown; `end` defaults to the located bound
fn resolve_range(start: u32, end: Option<u32>, bound: u32) -> anyhow::Result<(u32, u32)> {
    let end = end.unwrap_or(bound);
    check_range(start, end)?;
    Ok((start, end))
}

fn check_range(start: u32, end: u32) -> anyhow::Result<()> {
    if validate_page_range(start, Some(end)).is_err() {
        bail!("Invalid page range: {} to {}", start, end);
    }
    Ok(())
}

/// Runs a blocking prompt off the runtime workers, giving up on cancellation
///
/// Returns `Ok(None)` when `token` is cancelled first.
async fn run_prompt<T, F>(token: CancellationToken, prompt: F) -> anyhow::Result<Option<T>>
where
    T: Send + 'static,
    F: FnOnce() -> anyhow::Result<Option<T>> + Send + 'static,
{
    let task = tokio::task::spawn_blocking(prompt);
    tokio::select! {
        biased;
        _ = token.cancelled() => Ok(None),
        answer = task => answer.context("prompt task failed")?,
    }
}

/// Applies command-line overrides and re-validates the result
fn apply_overrides(config: &mut Config, cli: &Cli) -> anyhow::Result<()> {
    if let Some(base_url) = &cli.base_url {
        config.feed.base_url = base_url.clone();
    }
    if let Some(output) = &cli.output {
        config.output.download_root = output.clone();
    }
    if let Some(start) = cli.start {
        config.crawler.start_page = start;
    }
    if let Some(end) = cli.end {
        config.crawler.end_page = Some(end);
    }

    validate(config).context("invalid configuration after command-line overrides")?;
    Ok(())
}

/// Asks whether to crawl `1..=bound`, nothing, or a custom range
///
/// Returns `None` when the user declines.
fn prompt_for_range(bound: u32) -> anyhow::Result<Option<(u32, u32)>> {
    let prompt = format!("Do you want to scrape pages 1 to {}? (y/n/custom)", bound);
    let Some(answer) = ask::<String>(&prompt)? else {
        return Ok(None);
    };

    match answer.trim().to_lowercase().as_str() {
        "y" | "yes" => Ok(Some((1, bound))),
        "custom" => {
            let Some(start) = ask::<u32>("Enter start page")? else {
                return Ok(None);
            };
            let Some(end) = ask::<u32>("Enter end page")? else {
                return Ok(None);
            };
            check_range(start, end)?;
            Ok(Some((start, end)))
        }
        _ => Ok(None),
    }
}

/// Reads one answer; `Ok(None)` when the user pressed Ctrl-C at the prompt
fn ask<T>(prompt: &str) -> anyhow::Result<Option<T>>
where
    T: Clone + ToString + FromStr,
    <T as FromStr>::Err: ToString,
{
    match Input::<T>::new().with_prompt(prompt).interact_text() {
        Ok(value) => Ok(Some(value)),
        Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config, bound: u32) {
    println!("\n=== Feed-Gleaner Dry Run ===\n");

    println!("Feed:");
    println!("  Base URL: {}", config.feed.base_url);
    println!("  Feed path: {}", config.feed.feed_path);
    println!("  Page parameter: {}", config.feed.page_param);

    println!("\nCrawler Configuration:");
    println!(
        "  Bound search: {} to {}",
        config.crawler.lower_bound, config.crawler.upper_estimate
    );
    println!("  Page delay: {}ms", config.crawler.page_delay_ms);
    println!("  Download delay: {}ms", config.crawler.download_delay_ms);
    println!(
        "  Timeouts: fetch {}s, download {}s",
        config.crawler.fetch_timeout_secs, config.crawler.download_timeout_secs
    );

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nFilters:");
    println!("  Skip patterns: {}", config.filters.skip_patterns.join(", "));
    println!(
        "  Source attributes: {}",
        config.filters.source_attributes.join(", ")
    );

    let end = config.crawler.end_page.unwrap_or(bound);
    println!("\n✓ Configuration is valid");
    println!("✓ Last page with images: {}", bound);
    println!(
        "✓ Would crawl pages {} to {} into {}",
        config.crawler.start_page,
        end,
        config.output.download_root.display()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_resolve_range_defaults_end_to_bound() {
        assert_eq!(resolve_range(1, None, 40).unwrap(), (1, 40));
        assert_eq!(resolve_range(5, Some(9), 40).unwrap(), (5, 9));
    }

    #[test]
    fn test_resolve_range_rejects_start_past_bound() {
        let err = resolve_range(50, None, 40).unwrap_err();
        assert!(err.to_string().contains("50 to 40"));
    }

    #[tokio::test]
    async fn test_prompt_answer_returned() {
        let token = CancellationToken::new();
        let answer = run_prompt(token, || Ok(Some((1u32, 7u32)))).await.unwrap();
        assert_eq!(answer, Some((1, 7)));
    }

    #[tokio::test]
    async fn test_cancelled_prompt_does_not_wait_for_input() {
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let started = Instant::now();
        let answer = run_prompt(token, || {
            // Stands in for a user who never answers
            std::thread::sleep(Duration::from_millis(500));
            Ok(Some((1u32, 1u32)))
        })
        .await
        .unwrap();

        assert_eq!(answer, None);
        assert!(started.elapsed() < Duration::from_millis(400));
    }
}
