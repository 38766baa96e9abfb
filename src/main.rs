// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments and load the JSON config
// 2. Build a tokio runtime with as many workers as the config asks for
// 3. Wire up the profiler, the page parser and the crawler
// 4. Crawl, then write the result and the profiling report
// 5. Exit with proper code (0 = success, 1 = output failed, 2 = error)
//
// Rust concepts used:
// - async/await: pages are fetched and parsed concurrently
// - Trait objects: Box<dyn WebCrawler> picks the implementation at runtime
// - Result<T, E>: For error handling, with anyhow for context
// =============================================================================

mod cli;
mod config;
mod crawl;
mod parser;
mod profiler;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use config::{CrawlerConfig, CrawlerKind};
use crawl::{CrawlSettings, ParallelWebCrawler, SequentialWebCrawler, WebCrawler, WEB_CRAWLER};
use parser::HtmlParserFactory;
use profiler::Profiler;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    init_logging();

    let exit_code = match start() {
        Ok(code) => code,
        Err(e) => {
            // If an unexpected error occurred, print it and exit with code 2
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so stdout stays clean for the JSON result and report.
// RUST_LOG overrides the default filter.
fn init_logging() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,word_crawler=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// Loads the config and runs the crawl on a runtime sized to it
//
// We build the runtime by hand instead of using #[tokio::main] because the
// worker count comes from the config file.
fn start() -> Result<i32> {
    let cli = Cli::parse();

    let mut config = CrawlerConfig::from_path(&cli.config)?;
    cli.apply_overrides(&mut config);
    let parallelism = config.effective_parallelism()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(parallelism)
        .enable_all()
        .build()?;

    runtime.block_on(run(config, parallelism))
}

// Returns:
//   Ok(0) = crawl finished and everything was written
//   Ok(1) = crawl finished but the result or report couldn't be written
//   Err = config or crawl error
async fn run(config: CrawlerConfig, parallelism: usize) -> Result<i32> {
    let profiler = Profiler::new();

    let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
    let parser_factory = Arc::new(HtmlParserFactory::new(
        client,
        config.ignored_word_patterns()?,
        Some(profiler.state()),
    ));

    let settings = CrawlSettings {
        parser_factory,
        timeout: Duration::from_secs(config.timeout_seconds),
        max_depth: config.max_depth,
        ignored_urls: config.ignored_url_patterns()?,
        popular_word_count: config.popular_word_count,
    };

    let crawler: Box<dyn WebCrawler> = match config.implementation_override {
        CrawlerKind::Parallel => Box::new(
            profiler.wrap(&WEB_CRAWLER, ParallelWebCrawler::new(settings, parallelism))?,
        ),
        CrawlerKind::Sequential => {
            Box::new(profiler.wrap(&WEB_CRAWLER, SequentialWebCrawler::new(settings))?)
        }
    };

    eprintln!(
        "🔍 Crawling {} starting page(s) with up to {} worker(s)",
        config.start_pages.len(),
        crawler.max_parallelism()
    );

    let result = crawler.crawl(&config.start_pages).await?;

    eprintln!(
        "📄 Visited {} page(s), {} word(s) in the result",
        result.urls_visited,
        result.word_counts.len()
    );

    let mut exit_code = 0;

    // A failed write is reported, but the profile report is still attempted
    let result_path = config.result_path();
    match &result_path {
        Some(path) => eprintln!("Writing result to {}", path.display()),
        None => eprintln!("Printing result to standard output"),
    }
    if let Err(e) = crawl::write_result(&result, result_path.as_deref()) {
        error!(error = %format!("{:#}", e), "failed to write crawl result");
        exit_code = 1;
    }

    let written = match config.profile_output_path() {
        Some(path) => profiler.write_to_file(&path),
        None => profiler.write_data(&mut std::io::stdout().lock()),
    };
    if let Err(e) = written {
        warn!(error = %e, "failed to write profiling report");
        exit_code = 1;
    }

    Ok(exit_code)
}
