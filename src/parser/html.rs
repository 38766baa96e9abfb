// src/parser/html.rs
// =============================================================================
// This module fetches pages and extracts their links and words.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// Pages can come from the web (http/https, fetched with reqwest) or from the
// local disk (file://), which makes it easy to crawl a folder of HTML files.
//
// Rust concepts:
// - Arc: one list of ignored-word patterns shared by every parser
// - Lazy statics: CSS selectors parsed once, on first use
// - Iterators: For walking the DOM and counting words
// =============================================================================

use super::{PageParser, PageParserFactory, ParseResult, PAGE_PARSER};
use crate::profiler::{Profiled, ProfilingState};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

// Both selectors are constants and known to be valid
static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static BODY_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("body").unwrap());

// Hands out one HtmlPageParser per URL
//
// When profiling is on, every parser comes back wrapped so the time spent
// in parse() shows up in the report.
pub struct HtmlParserFactory {
    client: Client,
    ignored_words: Arc<Vec<Regex>>,
    profiling: Option<Arc<ProfilingState>>,
}

impl HtmlParserFactory {
    pub fn new(
        client: Client,
        ignored_words: Vec<Regex>,
        profiling: Option<Arc<ProfilingState>>,
    ) -> Self {
        Self {
            client,
            ignored_words: Arc::new(ignored_words),
            profiling,
        }
    }
}

impl PageParserFactory for HtmlParserFactory {
    fn get(&self, url: &str) -> Result<Box<dyn PageParser>> {
        let parser = HtmlPageParser {
            client: self.client.clone(),
            url: url.to_string(),
            ignored_words: Arc::clone(&self.ignored_words),
        };

        match &self.profiling {
            Some(state) => Ok(Box::new(Profiled::wrap(
                &PAGE_PARSER,
                parser,
                Arc::clone(state),
            )?)),
            None => Ok(Box::new(parser)),
        }
    }
}

pub struct HtmlPageParser {
    client: Client,
    url: String,
    ignored_words: Arc<Vec<Regex>>,
}

#[async_trait]
impl PageParser for HtmlPageParser {
    async fn parse(&self) -> Result<ParseResult> {
        let html = self.fetch().await?;
        Ok(parse_page(&html, &self.url, &self.ignored_words))
    }
}

impl HtmlPageParser {
    async fn fetch(&self) -> Result<String> {
        let url = Url::parse(&self.url)
            .map_err(|e| anyhow!("Invalid URL '{}': {}", self.url, e))?;

        match url.scheme() {
            "http" | "https" => fetch_page(&self.client, &self.url).await,
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| anyhow!("Invalid file URL: {}", self.url))?;
                tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))
            }
            other => Err(anyhow!("Unsupported URL scheme '{}': {}", other, self.url)),
        }
    }
}

// Fetches a web page and returns its HTML content
async fn fetch_page(client: &Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to fetch {}", url))?;

    if !response.status().is_success() {
        return Err(anyhow!("HTTP {} for {}", response.status(), url));
    }

    let html = response.text().await?;
    Ok(html)
}

// Parses one page into its word counts and links
//
// Parameters:
//   html: the HTML content to parse
//   page_url: the URL of the page (for resolving relative links)
//   ignored_words: words fully matching any of these are not counted
pub fn parse_page(html: &str, page_url: &str, ignored_words: &[Regex]) -> ParseResult {
    let document = Html::parse_document(html);

    ParseResult {
        word_counts: count_words(&document, ignored_words),
        links: extract_links(&document, page_url),
    }
}

// Counts the words in the page body
//
// Text inside <script> and <style> is skipped. Each whitespace-separated
// token is stripped of non-word characters and lowercased:
//   "Hello," -> "hello", "don't" -> "dont", "--" -> (dropped)
fn count_words(document: &Html, ignored_words: &[Regex]) -> HashMap<String, u64> {
    let mut counts = HashMap::new();

    let body = match document.select(&BODY_SELECTOR).next() {
        Some(body) => body,
        None => return counts,
    };

    for node in body.descendants() {
        let text = match node.value().as_text() {
            Some(text) => text,
            None => continue,
        };

        let in_code = node
            .parent()
            .and_then(|parent| parent.value().as_element().map(|el| el.name()))
            .map_or(false, |name| name == "script" || name == "style");
        if in_code {
            continue;
        }

        for token in text.split_whitespace() {
            let word = normalize_word(token);
            if word.is_empty() || ignored_words.iter().any(|p| p.is_match(&word)) {
                continue;
            }
            *counts.entry(word).or_insert(0) += 1;
        }
    }

    counts
}

fn normalize_word(token: &str) -> String {
    token
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .flat_map(char::to_lowercase)
        .collect()
}

// Extracts all crawlable links from the document
//
// Relative links are resolved against the page URL; anything that doesn't
// end up as http or https (mailto:, javascript:, ...) is dropped. file://
// links are only followed from pages that are local files themselves.
fn extract_links(document: &Html, page_url: &str) -> Vec<String> {
    let mut links = Vec::new();

    // If the page URL itself is invalid we can't resolve relative links
    let base = match Url::parse(page_url) {
        Ok(url) => url,
        Err(_) => return links,
    };

    let allow_files = base.scheme() == "file";

    for element in document.select(&LINK_SELECTOR) {
        if let Some(href) = element.value().attr("href") {
            if let Some(absolute_url) = resolve_url(&base, href) {
                if is_crawlable_link(&absolute_url, allow_files) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

// Resolves a possibly-relative URL to an absolute URL
//
// Examples:
//   base = "https://example.com/page"
//   href = "/docs" -> Some("https://example.com/docs")
//   href = "../other" -> Some("https://example.com/other")
//   href = "https://other.com" -> Some("https://other.com/")
fn resolve_url(base: &Url, href: &str) -> Option<String> {
    // Anchors point back into the same page
    if href.starts_with('#') {
        return None;
    }

    match Url::parse(href) {
        Ok(url) => Some(url.to_string()),
        Err(_) => base.join(href).ok().map(|url| url.to_string()),
    }
}

fn is_crawlable_link(url: &str, allow_files: bool) -> bool {
    url.starts_with("http://")
        || url.starts_with("https://")
        || (allow_files && url.starts_with("file://"))
}
