// src/profiler/state.rs
// =============================================================================
// The duration ledger behind the profiler.
//
// Every profiled call ends up here as (target type, operation, elapsed time).
// Totals only ever grow, and the ledger can be read for a report at any point,
// including while a crawl is still running.
// =============================================================================

use dashmap::DashMap;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

// Cumulative figures for one (target, operation) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileEntry {
    /// Position in first-recorded order; fixes the report ordering
    pub order: u64,
    /// Sum of all recorded durations
    pub total: Duration,
    /// How many calls contributed to `total`
    pub invocations: u64,
}

#[derive(Debug, Default)]
pub struct ProfilingState {
    entries: DashMap<String, ProfileEntry>,
    next_order: AtomicU64,
}

impl ProfilingState {
    pub fn new() -> Self {
        Self::default()
    }

    // Adds one measured call to the ledger
    //
    // The entry lock is held across the whole read-add-write, so concurrent
    // records for the same pair never overwrite each other.
    pub fn record(&self, target: &str, operation: &str, elapsed: Duration) {
        let mut entry = self
            .entries
            .entry(call_key(target, operation))
            .or_insert_with(|| ProfileEntry {
                order: self.next_order.fetch_add(1, Ordering::Relaxed),
                total: Duration::ZERO,
                invocations: 0,
            });
        entry.total += elapsed;
        entry.invocations += 1;
    }

    #[cfg(test)]
    pub fn get(&self, target: &str, operation: &str) -> Option<ProfileEntry> {
        self.entries
            .get(&call_key(target, operation))
            .map(|entry| *entry.value())
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // Writes one line per recorded pair, in first-recorded order
    //
    //   word_crawler::parser::html::HtmlPageParser#parse took 0m 1s 250ms (12 invocations)
    pub fn write(&self, writer: &mut impl Write) -> io::Result<()> {
        let mut lines: Vec<(String, ProfileEntry)> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();
        lines.sort_by_key(|(_, entry)| entry.order);

        for (key, entry) in lines {
            writeln!(
                writer,
                "{} took {} ({} invocations)",
                key,
                format_duration(entry.total),
                entry.invocations
            )?;
        }
        Ok(())
    }
}

fn call_key(target: &str, operation: &str) -> String {
    format!("{}#{}", target, operation)
}

// 83.456s -> "1m 23s 456ms"
fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}m {}s {}ms", secs / 60, secs % 60, duration.subsec_millis())
}
