// src/crawl/task.rs
// =============================================================================
// One step of the crawl: visit a single URL, then fan out to its links.
//
// How a job runs:
// 1. Prune: stop right away if depth is used up, the deadline has passed,
//    the URL is ignored, or another job already claimed it
// 2. Parse the page and add its word counts to the shared totals
// 3. Spawn one child job per discovered link (depth - 1)
// 4. Wait for every child before reporting done
//
// Because of step 4, when the top-level job returns the whole subtree below
// it has been processed and every count is merged.
//
// Rust concepts:
// - JoinSet: a group of spawned tokio tasks we can wait on together
// - BoxFuture: recursive async code needs a boxed, concretely-typed future
// - Arc: the read-only context is shared by every job in the run
// =============================================================================

use super::state::{VisitedRegistry, WordCountAggregator};
use crate::parser::PageParserFactory;
use anyhow::{Context, Result};
use futures::future::{BoxFuture, FutureExt};
use regex::Regex;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::debug;

// Everything a crawl run shares between its jobs
//
// Nothing in here changes once the run starts; the registry and aggregator
// do their own locking.
pub struct CrawlContext {
    deadline: Instant,
    ignored_urls: Vec<Regex>,
    parser_factory: Arc<dyn PageParserFactory>,
    visited: Arc<VisitedRegistry>,
    counts: Arc<WordCountAggregator>,
}

impl CrawlContext {
    pub fn new(
        deadline: Instant,
        ignored_urls: Vec<Regex>,
        parser_factory: Arc<dyn PageParserFactory>,
        visited: Arc<VisitedRegistry>,
        counts: Arc<WordCountAggregator>,
    ) -> Self {
        Self {
            deadline,
            ignored_urls,
            parser_factory,
            visited,
            counts,
        }
    }

    fn is_ignored(&self, url: &str) -> bool {
        self.ignored_urls.iter().any(|pattern| pattern.is_match(url))
    }
}

// A single URL to crawl with the depth still available below it
#[derive(Clone)]
pub struct CrawlJob {
    url: String,
    depth: usize,
    context: Arc<CrawlContext>,
}

impl CrawlJob {
    pub fn new(url: String, depth: usize, context: Arc<CrawlContext>) -> Self {
        Self { url, depth, context }
    }

    fn child(&self, url: String) -> Self {
        Self {
            url,
            depth: self.depth - 1,
            context: Arc::clone(&self.context),
        }
    }

    // Crawls this URL and everything reachable from it, children in parallel
    //
    // Children are spawned onto the runtime's worker pool. If any branch
    // fails, the error is returned and the remaining children are aborted
    // when the JoinSet is dropped.
    pub fn run(self) -> BoxFuture<'static, Result<()>> {
        async move {
            // Pruned pages have no links to follow
            let links = match self.visit().await? {
                Some(links) => links,
                None => return Ok(()),
            };

            // One task per link; each child checks depth, deadline and
            // visited state again when it starts
            let mut children = JoinSet::new();
            for link in links {
                children.spawn(self.child(link).run());
            }

            // join_next yields children as they finish, in any order.
            // The outer ? is a panicked or cancelled task, the inner ? is
            // the child's own crawl error.
            while let Some(joined) = children.join_next().await {
                joined.context("Crawl task panicked")??;
            }

            // Every child has finished, so the subtree is fully merged
            Ok(())
        }
        .boxed()
    }

    // Same traversal as `run`, one child at a time on the current task
    pub fn run_sequential(self) -> BoxFuture<'static, Result<()>> {
        async move {
            let links = match self.visit().await? {
                Some(links) => links,
                None => return Ok(()),
            };

            for link in links {
                self.child(link).run_sequential().await?;
            }
            Ok(())
        }
        .boxed()
    }

    // Parses the page unless it is pruned; returns its links
    async fn visit(&self) -> Result<Option<Vec<String>>> {
        if let Some(reason) = self.prune_reason() {
            debug!(url = %self.url, depth = self.depth, reason, "skipping");
            return Ok(None);
        }

        let parser = self.context.parser_factory.get(&self.url)?;
        let result = parser
            .parse()
            .await
            .with_context(|| format!("Failed to parse {}", self.url))?;

        debug!(
            url = %self.url,
            depth = self.depth,
            words = result.word_counts.len(),
            links = result.links.len(),
            "parsed page"
        );

        self.context.counts.merge_all(result.word_counts);
        Ok(Some(result.links))
    }

    // The checks run in this order and the first hit wins. try_visit comes
    // last because it is the one that records the URL.
    fn prune_reason(&self) -> Option<&'static str> {
        if self.depth == 0 {
            return Some("max depth reached");
        }
        if Instant::now() >= self.context.deadline {
            return Some("deadline passed");
        }
        if self.context.is_ignored(&self.url) {
            return Some("ignored url");
        }
        if !self.context.visited.try_visit(&self.url) {
            return Some("already visited");
        }
        None
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why does run() return a BoxFuture?
//    - An async fn that calls itself would have an infinitely sized future
//    - Boxing puts the child future on the heap, so its size is known
//    - .boxed() also makes it Send + 'static, which tokio::spawn needs
//
// 2. What is JoinSet?
//    - A collection of spawned tasks owned by one parent
//    - join_next() waits for whichever task finishes next
//    - Dropping a JoinSet aborts every task still in it
//
// 3. Why the double ?? after join_next()?
//    - join_next() gives Result<Result<()>, JoinError>
//    - The first ? handles the task itself dying (panic or abort)
//    - The second ? handles the crawl error the task returned
//
// 4. Why is try_visit the last check?
//    - It is the only check that changes shared state
//    - A URL skipped for depth or the deadline must not be marked as visited
// -----------------------------------------------------------------------------
