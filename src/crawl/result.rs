// src/crawl/result.rs
// =============================================================================
// The outcome of a crawl run and how it is written out.
//
// The JSON looks like:
//   {
//     "wordCounts": { "rust": 12, "crab": 7 },
//     "urlsVisited": 4
//   }
// with wordCounts ordered from most to least popular.
// =============================================================================

use anyhow::{Context, Result};
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlResult {
    /// Most popular words first
    #[serde(serialize_with = "ordered_map")]
    pub word_counts: Vec<(String, u64)>,
    /// Number of distinct URLs that were parsed
    pub urls_visited: usize,
}

impl CrawlResult {
    // Builds the result from the final totals
    //
    // `popular_word_count` keeps only the top N words; None keeps them all.
    pub fn new(
        counts: HashMap<String, u64>,
        urls_visited: usize,
        popular_word_count: Option<usize>,
    ) -> Self {
        Self {
            word_counts: popular_words(counts, popular_word_count),
            urls_visited,
        }
    }
}

// Sorts words by count (highest first), then by length (longest first),
// then alphabetically, and keeps the first `limit`
pub fn popular_words(counts: HashMap<String, u64>, limit: Option<usize>) -> Vec<(String, u64)> {
    let mut words: Vec<(String, u64)> = counts.into_iter().collect();
    words.sort_by(|(a, a_count), (b, b_count)| {
        b_count
            .cmp(a_count)
            .then_with(|| b.len().cmp(&a.len()))
            .then_with(|| a.cmp(b))
    });

    if let Some(limit) = limit {
        words.truncate(limit);
    }
    words
}

// Serializes the (word, count) list as a JSON object, keeping its order
fn ordered_map<S: Serializer>(words: &[(String, u64)], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_map(words.iter().map(|(word, count)| (word, count)))
}

// Writes the result as pretty JSON to `path`, or to stdout when there is none
pub fn write_result(result: &CrawlResult, path: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;

    match path {
        Some(path) => std::fs::write(path, json + "\n")
            .with_context(|| format!("Failed to write result to {}", path.display())),
        None => {
            println!("{}", json);
            Ok(())
        }
    }
}
