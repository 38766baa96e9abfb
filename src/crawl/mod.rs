// src/crawl/mod.rs
// =============================================================================
// This module handles crawling and word counting.
//
// Features:
// - Depth-limited crawling from a set of starting URLs
// - Every page parsed at most once per run, even when found by many paths
// - A wall-clock deadline after which no new pages are started
// - Ignored URL patterns
// - Parallel (tokio worker pool) and sequential crawlers
//
// Submodules:
// - state: the visited-URL registry and the word-count aggregator
// - task: one recursive crawl step
// - crawler: the WebCrawler implementations
// - result: the final word table and its JSON output
// =============================================================================

mod crawler;
mod result;
mod state;
mod task;

#[cfg(test)]
mod test_support;

pub use crawler::{CrawlSettings, ParallelWebCrawler, SequentialWebCrawler};
pub use result::{write_result, CrawlResult};

use crate::profiler::{CapabilitySet, Operation, Profiled};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait WebCrawler: Send + Sync {
    // Crawls from the given URLs and returns the word table
    async fn crawl(&self, starting_urls: &[String]) -> Result<CrawlResult>;

    // Largest number of pages this crawler works on at once
    fn max_parallelism(&self) -> usize;
}

pub const WEB_CRAWLER: CapabilitySet = CapabilitySet::new(
    "WebCrawler",
    &[Operation::profiled("crawl"), Operation::plain("max_parallelism")],
);

#[async_trait]
impl<D: WebCrawler> WebCrawler for Profiled<D> {
    async fn crawl(&self, starting_urls: &[String]) -> Result<CrawlResult> {
        self.invoke("crawl", self.delegate().crawl(starting_urls)).await
    }

    fn max_parallelism(&self) -> usize {
        self.invoke_sync("max_parallelism", |crawler| crawler.max_parallelism())
    }
}
