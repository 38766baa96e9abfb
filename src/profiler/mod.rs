// src/profiler/mod.rs
// =============================================================================
// This module measures how long selected operations take.
//
// Submodules:
// - state: the shared ledger of cumulative durations
// - wrapper: the Profiled<D> decorator that feeds the ledger
//
// The Profiler ties them together: it owns the ledger, remembers when the
// run started, hands out wrapped components and writes the final report.
// =============================================================================

mod state;
mod wrapper;

pub use state::ProfilingState;
pub use wrapper::{CapabilitySet, Operation, Profiled, ProfilerError};

use chrono::{DateTime, Utc};
use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

pub struct Profiler {
    state: Arc<ProfilingState>,
    started_at: DateTime<Utc>,
}

impl Profiler {
    pub fn new() -> Self {
        Self {
            state: Arc::new(ProfilingState::new()),
            started_at: Utc::now(),
        }
    }

    /// Shared handle to the ledger, for components that wrap their own children.
    pub fn state(&self) -> Arc<ProfilingState> {
        Arc::clone(&self.state)
    }

    pub fn wrap<D>(
        &self,
        capabilities: &'static CapabilitySet,
        delegate: D,
    ) -> Result<Profiled<D>, ProfilerError> {
        Profiled::wrap(capabilities, delegate, self.state())
    }

    // Writes the report:
    //
    //   Run at Sun, 18 Oct 2026 09:15:02 GMT
    //   <one line per profiled operation>
    //   <empty line>
    pub fn write_data(&self, writer: &mut impl Write) -> io::Result<()> {
        writeln!(
            writer,
            "Run at {}",
            self.started_at.format("%a, %-d %b %Y %H:%M:%S GMT")
        )?;
        self.state.write(writer)?;
        writeln!(writer)?;
        writer.flush()
    }

    // Appends the report to a file, creating it if needed
    //
    // Earlier reports in the same file are left untouched.
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = BufWriter::new(file);
        self.write_data(&mut writer)
    }
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_report_layout() {
        let profiler = Profiler::new();
        profiler
            .state()
            .record("Crawler", "crawl", Duration::from_millis(1500));

        let mut out = Vec::new();
        profiler.write_data(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("Run at "));
        assert!(lines[0].ends_with(" GMT"));
        assert_eq!(lines[1], "Crawler#crawl took 0m 1s 500ms (1 invocations)");
        assert_eq!(lines[2], "");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_write_to_file_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.txt");
        std::fs::write(&path, "previous report\n").unwrap();

        let profiler = Profiler::new();
        profiler
            .state()
            .record("Parser", "parse", Duration::from_millis(3));
        profiler.write_to_file(&path).unwrap();
        profiler.write_to_file(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("previous report\nRun at "));
        assert_eq!(text.matches("Run at ").count(), 2);
        assert_eq!(text.matches("Parser#parse took").count(), 2);
    }

    #[test]
    fn test_write_to_file_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new-profile.txt");

        Profiler::new().write_to_file(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Run at "));
    }
}
