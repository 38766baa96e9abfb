// src/crawl/crawler.rs
// =============================================================================
// The two crawler implementations.
//
// Both build a fresh VisitedRegistry and WordCountAggregator for every run,
// start one CrawlJob per starting URL, and turn the final totals into a
// CrawlResult. They only differ in how the jobs are driven:
// - ParallelWebCrawler: seeds and children are spawned onto the tokio worker
//   pool and joined
// - SequentialWebCrawler: everything runs one page at a time
// =============================================================================

use super::result::CrawlResult;
use super::state::{VisitedRegistry, WordCountAggregator};
use super::task::{CrawlContext, CrawlJob};
use super::WebCrawler;
use crate::parser::PageParserFactory;
use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::info;

// Settings shared by both crawler implementations
#[derive(Clone)]
pub struct CrawlSettings {
    pub parser_factory: Arc<dyn PageParserFactory>,
    pub timeout: Duration,
    pub max_depth: usize,
    pub ignored_urls: Vec<Regex>,
    pub popular_word_count: Option<usize>,
}

// One run's shared state plus the context handed to its jobs
struct CrawlRun {
    visited: Arc<VisitedRegistry>,
    counts: Arc<WordCountAggregator>,
    context: Arc<CrawlContext>,
}

impl CrawlRun {
    // The deadline is fixed here, at the start of the run
    fn start(settings: &CrawlSettings) -> Self {
        let visited = Arc::new(VisitedRegistry::new());
        let counts = Arc::new(WordCountAggregator::new());
        let context = Arc::new(CrawlContext::new(
            Instant::now() + settings.timeout,
            settings.ignored_urls.clone(),
            Arc::clone(&settings.parser_factory),
            Arc::clone(&visited),
            Arc::clone(&counts),
        ));

        Self {
            visited,
            counts,
            context,
        }
    }

    fn job(&self, url: &str, settings: &CrawlSettings) -> CrawlJob {
        CrawlJob::new(url.to_string(), settings.max_depth, Arc::clone(&self.context))
    }

    // Only called after every job of the run has finished
    fn finish(self, settings: &CrawlSettings) -> CrawlResult {
        let result = CrawlResult::new(
            self.counts.snapshot(),
            self.visited.len(),
            settings.popular_word_count,
        );
        info!(
            urls_visited = result.urls_visited,
            words = result.word_counts.len(),
            "crawl finished"
        );
        result
    }
}

pub struct ParallelWebCrawler {
    settings: CrawlSettings,
    parallelism: usize,
}

impl ParallelWebCrawler {
    // `parallelism` is the size of the worker pool the crawl runs on; the
    // runtime is built with that many workers in main.
    pub fn new(settings: CrawlSettings, parallelism: usize) -> Self {
        Self {
            settings,
            parallelism,
        }
    }
}

#[async_trait]
impl WebCrawler for ParallelWebCrawler {
    async fn crawl(&self, starting_urls: &[String]) -> Result<CrawlResult> {
        info!(
            seeds = starting_urls.len(),
            max_depth = self.settings.max_depth,
            parallelism = self.parallelism,
            "starting parallel crawl"
        );

        // Fresh registry and totals; the deadline starts counting now
        let run = CrawlRun::start(&self.settings);

        // Every seed gets its own task, just like the links found later
        let mut seeds = JoinSet::new();
        for url in starting_urls {
            seeds.spawn(run.job(url, &self.settings).run());
        }

        // Each seed task only finishes after its whole subtree has, so once
        // this loop ends there is nothing left running
        while let Some(joined) = seeds.join_next().await {
            joined.context("Crawl task panicked")??;
        }

        Ok(run.finish(&self.settings))
    }

    fn max_parallelism(&self) -> usize {
        self.parallelism
    }
}

pub struct SequentialWebCrawler {
    settings: CrawlSettings,
}

impl SequentialWebCrawler {
    pub fn new(settings: CrawlSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl WebCrawler for SequentialWebCrawler {
    async fn crawl(&self, starting_urls: &[String]) -> Result<CrawlResult> {
        info!(
            seeds = starting_urls.len(),
            max_depth = self.settings.max_depth,
            "starting sequential crawl"
        );

        let run = CrawlRun::start(&self.settings);

        // Seeds one after another, each crawled depth-first
        for url in starting_urls {
            run.job(url, &self.settings).run_sequential().await?;
        }

        Ok(run.finish(&self.settings))
    }

    fn max_parallelism(&self) -> usize {
        1
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does #[async_trait] do?
//    - Plain traits can't be used as `dyn Trait` when they have async fns
//    - The macro rewrites each async fn to return a boxed future
//    - That is what lets main pick the crawler at runtime as Box<dyn WebCrawler>
//
// 2. Why build new state on every crawl() call?
//    - A crawler can be reused, and one run must not see another's visited URLs
//    - CrawlRun is dropped at the end of crawl(), taking its state with it
// -----------------------------------------------------------------------------
