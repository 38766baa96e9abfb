// src/crawl/test_support.rs
// =============================================================================
// An in-memory page graph for crawler tests.
//
// Pages are declared up front with their words and links; the factory hands
// out parsers that return them without any network access. It also counts
// how often each URL was parsed, so tests can check that no page is parsed
// twice.
// =============================================================================

use crate::parser::{PageParser, PageParserFactory, ParseResult};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
pub struct GraphParserFactory {
    pages: HashMap<String, ParseResult>,
    failing: HashSet<String>,
    delay: Duration,
    parses: Arc<DashMap<String, usize>>,
}

impl GraphParserFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, words: &[(&str, u64)], links: &[&str]) -> Self {
        let result = ParseResult {
            word_counts: words.iter().map(|(w, c)| (w.to_string(), *c)).collect(),
            links: links.iter().map(|l| l.to_string()).collect(),
        };
        self.pages.insert(url.to_string(), result);
        self
    }

    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    /// Makes every parse sleep, so sibling jobs really overlap.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn parses_of(&self, url: &str) -> usize {
        self.parses.get(url).map_or(0, |count| *count)
    }

    pub fn total_parses(&self) -> usize {
        self.parses.iter().map(|entry| *entry.value()).sum()
    }
}

impl PageParserFactory for GraphParserFactory {
    fn get(&self, url: &str) -> Result<Box<dyn PageParser>> {
        let outcome = if self.failing.contains(url) {
            Err(format!("page {} is broken", url))
        } else {
            Ok(self.pages.get(url).cloned().unwrap_or_default())
        };

        Ok(Box::new(GraphPageParser {
            url: url.to_string(),
            outcome,
            delay: self.delay,
            parses: Arc::clone(&self.parses),
        }))
    }
}

struct GraphPageParser {
    url: String,
    outcome: Result<ParseResult, String>,
    delay: Duration,
    parses: Arc<DashMap<String, usize>>,
}

#[async_trait]
impl PageParser for GraphPageParser {
    async fn parse(&self) -> Result<ParseResult> {
        *self.parses.entry(self.url.clone()).or_insert(0) += 1;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.outcome.clone().map_err(|e| anyhow!(e))
    }
}
