// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// The crawler is driven by a JSON config file (see config.rs). The flags here
// override single values from that file, which is handy for quick runs:
//
//   word-crawler crawl.json --max-depth 2 --timeout-seconds 5
// =============================================================================

use crate::config::CrawlerConfig;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "word-crawler",
    version = "0.1.0",
    about = "Crawl web pages in parallel and count the most popular words",
    long_about = "word-crawler follows links from a set of starting pages up to a maximum depth \
                  and time budget, counts the words it finds, and reports how long the crawl \
                  and each page parse took."
)]
pub struct Cli {
    /// Path to the JSON crawler configuration
    pub config: PathBuf,

    /// Override the maximum crawl depth
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Override the number of worker threads
    #[arg(long)]
    pub parallelism: Option<usize>,

    /// Override the crawl time budget, in seconds
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Write the JSON result here instead of the configured path
    #[arg(long)]
    pub result_path: Option<String>,

    /// Append the profiling report here instead of the configured path
    #[arg(long)]
    pub profile_output_path: Option<String>,
}

impl Cli {
    // Applies the flags that were given on top of the loaded config
    pub fn apply_overrides(&self, config: &mut CrawlerConfig) {
        if let Some(max_depth) = self.max_depth {
            config.max_depth = max_depth;
        }
        if let Some(parallelism) = self.parallelism {
            config.parallelism = Some(parallelism);
        }
        if let Some(timeout_seconds) = self.timeout_seconds {
            config.timeout_seconds = timeout_seconds;
        }
        if let Some(path) = &self.result_path {
            config.result_path = path.clone();
        }
        if let Some(path) = &self.profile_output_path {
            config.profile_output_path = path.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_config_values() {
        let cli = Cli::parse_from([
            "word-crawler",
            "crawl.json",
            "--max-depth",
            "4",
            "--timeout-seconds",
            "9",
        ]);
        let mut config = CrawlerConfig {
            max_depth: 1,
            parallelism: Some(2),
            ..CrawlerConfig::default()
        };
        cli.apply_overrides(&mut config);

        assert_eq!(cli.config, PathBuf::from("crawl.json"));
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.timeout_seconds, 9);
        assert_eq!(config.parallelism, Some(2));
    }
}
