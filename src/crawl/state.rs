// src/crawl/state.rs
// =============================================================================
// Shared state for one crawl run.
//
// Two structures are shared by every crawl task in the run:
// - VisitedRegistry: which URLs have already been claimed for parsing
// - WordCountAggregator: running word totals across all parsed pages
//
// Both are created once per run by the crawler and handed to the tasks
// behind an Arc. All locking lives inside these types; callers only ever
// see single, indivisible operations.
//
// Rust concepts:
// - DashMap / DashSet: concurrent hash map/set split into locked shards
// - Interior mutability: methods take &self even though they mutate
// =============================================================================

use dashmap::{DashMap, DashSet};
use std::collections::HashMap;

// The set of URLs claimed so far in this run
//
// A URL goes in at most once and never comes out.
#[derive(Debug, Default)]
pub struct VisitedRegistry {
    urls: DashSet<String>,
}

impl VisitedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Claims a URL for parsing
    //
    // Returns true the first time it is called for a given URL and false on
    // every later call. Among concurrent callers racing on the same URL
    // exactly one gets true: DashSet::insert checks and inserts while holding
    // the shard's write lock.
    pub fn try_visit(&self, url: &str) -> bool {
        // Fast path: a read lock is enough for URLs seen before
        if self.urls.contains(url) {
            return false;
        }
        // insert returns false if another task got here first
        self.urls.insert(url.to_string())
    }

    /// Number of distinct URLs claimed so far.
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

// Running word totals for the whole crawl run
#[derive(Debug, Default)]
pub struct WordCountAggregator {
    counts: DashMap<String, u64>,
}

impl WordCountAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    // Adds one page's word counts to the running totals
    //
    // Each word is updated through DashMap::entry, which keeps the shard
    // locked from the read to the write, so two pages adding to the same
    // word at the same time can never lose an update.
    pub fn merge_all<I>(&self, page_counts: I)
    where
        I: IntoIterator<Item = (String, u64)>,
    {
        for (word, count) in page_counts {
            // entry() holds the shard lock until the += is done
            *self.counts.entry(word).or_insert(0) += count;
        }
    }

    // Copies the totals into a plain HashMap
    //
    // Only meaningful once every merge of the run has finished.
    pub fn snapshot(&self) -> HashMap<String, u64> {
        self.counts
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why DashMap instead of Mutex<HashMap>?
//    - A Mutex<HashMap> lets only one task touch the map at a time
//    - DashMap splits the map into shards with their own locks
//    - Tasks working on different words rarely wait for each other
//
// 2. Why can these methods take &self and still change data?
//    - DashMap and DashSet do their own locking inside
//    - This is called interior mutability
//    - It lets many tasks share one value through an Arc
// -----------------------------------------------------------------------------
