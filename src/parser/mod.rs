// src/parser/mod.rs
// =============================================================================
// This module turns a URL into the words and links found on that page.
//
// The crawler only talks to the two traits defined here:
// - PageParserFactory: hands out a parser for a given URL
// - PageParser: fetches and parses that one page
//
// The html submodule provides the real implementation; tests plug in
// in-memory page graphs instead.
// =============================================================================

mod html;

pub use html::HtmlParserFactory;

use crate::profiler::{CapabilitySet, Operation, Profiled};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

// What one page contributed to the crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseResult {
    /// How often each word occurs on the page
    pub word_counts: HashMap<String, u64>,
    /// Outgoing links, in document order
    pub links: Vec<String>,
}

#[async_trait]
pub trait PageParser: Send + Sync {
    async fn parse(&self) -> Result<ParseResult>;
}

pub trait PageParserFactory: Send + Sync {
    fn get(&self, url: &str) -> Result<Box<dyn PageParser>>;
}

pub const PAGE_PARSER: CapabilitySet =
    CapabilitySet::new("PageParser", &[Operation::profiled("parse")]);

#[async_trait]
impl<D: PageParser> PageParser for Profiled<D> {
    async fn parse(&self) -> Result<ParseResult> {
        self.invoke("parse", self.delegate().parse()).await
    }
}
