// src/config.rs
// =============================================================================
// This file loads the crawler configuration from a JSON file.
//
// Example config:
//   {
//     "startPages": ["https://www.rust-lang.org/"],
//     "ignoredUrls": [".*\\.pdf"],
//     "ignoredWords": ["^.{1,3}$"],
//     "parallelism": 4,
//     "maxDepth": 3,
//     "timeoutSeconds": 10,
//     "popularWordCount": 25,
//     "resultPath": "crawl-result.json",
//     "profileOutputPath": "profile.txt"
//   }
//
// Every key is optional. Empty output paths mean "print to stdout".
// =============================================================================

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A URL or word pattern that isn't a valid regular expression
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Parallelism must be greater than 0
    #[error("Parallelism must be greater than 0, got {0}")]
    InvalidParallelism(usize),
}

// Which WebCrawler implementation to run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlerKind {
    #[default]
    Parallel,
    Sequential,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CrawlerConfig {
    pub start_pages: Vec<String>,
    /// Regexes; a URL matching any of them in full is never crawled
    pub ignored_urls: Vec<String>,
    /// Regexes; a word matching any of them in full is never counted
    pub ignored_words: Vec<String>,
    /// Worker threads; defaults to the number of CPUs
    pub parallelism: Option<usize>,
    pub implementation_override: CrawlerKind,
    pub max_depth: usize,
    pub timeout_seconds: u64,
    /// Size of the popular word table; all words when unset
    pub popular_word_count: Option<usize>,
    pub result_path: String,
    pub profile_output_path: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            start_pages: Vec::new(),
            ignored_urls: Vec::new(),
            ignored_words: Vec::new(),
            parallelism: None,
            implementation_override: CrawlerKind::Parallel,
            max_depth: 0,
            timeout_seconds: 1,
            popular_word_count: None,
            result_path: String::new(),
            profile_output_path: String::new(),
        }
    }
}

impl CrawlerConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn ignored_url_patterns(&self) -> Result<Vec<Regex>, ConfigError> {
        compile_patterns(&self.ignored_urls)
    }

    pub fn ignored_word_patterns(&self) -> Result<Vec<Regex>, ConfigError> {
        compile_patterns(&self.ignored_words)
    }

    // Number of worker threads to crawl with
    //
    // Never more than the machine's CPU count.
    pub fn effective_parallelism(&self) -> Result<usize, ConfigError> {
        let cpus = std::thread::available_parallelism().map_or(1, |n| n.get());
        match self.parallelism {
            Some(0) => Err(ConfigError::InvalidParallelism(0)),
            Some(requested) => Ok(requested.min(cpus)),
            None => Ok(cpus),
        }
    }

    pub fn result_path(&self) -> Option<PathBuf> {
        non_empty_path(&self.result_path)
    }

    pub fn profile_output_path(&self) -> Option<PathBuf> {
        non_empty_path(&self.profile_output_path)
    }
}

// Compiles patterns so that they only match a whole string
//
// "docs" matches "docs" but not "docs/page" or "my-docs".
pub fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(&format!("^(?:{})$", pattern)).map_err(|source| {
                ConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                }
            })
        })
        .collect()
}

fn non_empty_path(path: &str) -> Option<PathBuf> {
    if path.trim().is_empty() {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config() {
        let config = CrawlerConfig::from_json(
            r#"{
                "startPages": ["https://example.com/"],
                "ignoredUrls": [".*\\.pdf"],
                "ignoredWords": ["^.{1,3}$"],
                "parallelism": 4,
                "implementationOverride": "sequential",
                "maxDepth": 3,
                "timeoutSeconds": 10,
                "popularWordCount": 25,
                "resultPath": "out.json",
                "profileOutputPath": ""
            }"#,
        )
        .unwrap();

        assert_eq!(config.start_pages, vec!["https://example.com/"]);
        assert_eq!(config.parallelism, Some(4));
        assert_eq!(config.implementation_override, CrawlerKind::Sequential);
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.timeout_seconds, 10);
        assert_eq!(config.popular_word_count, Some(25));
        assert_eq!(config.result_path(), Some(PathBuf::from("out.json")));
        assert_eq!(config.profile_output_path(), None);
    }

    #[test]
    fn test_defaults() {
        let config = CrawlerConfig::from_json("{}").unwrap();
        assert_eq!(config, CrawlerConfig::default());
        assert_eq!(config.timeout_seconds, 1);
        assert_eq!(config.implementation_override, CrawlerKind::Parallel);
        // unset means the result keeps every word
        assert_eq!(config.popular_word_count, None);
        assert!(config.effective_parallelism().unwrap() >= 1);
    }

    #[test]
    fn test_patterns_match_whole_string() {
        let patterns = compile_patterns(&["http://example\\.com/docs".to_string()]).unwrap();
        assert!(patterns[0].is_match("http://example.com/docs"));
        assert!(!patterns[0].is_match("http://example.com/docs/page"));
        assert!(!patterns[0].is_match("see http://example.com/docs"));
    }

    #[test]
    fn test_invalid_pattern() {
        let config = CrawlerConfig {
            ignored_urls: vec!["(unclosed".to_string()],
            ..CrawlerConfig::default()
        };
        let err = config.ignored_url_patterns().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { ref pattern, .. } if pattern == "(unclosed"));
    }

    #[test]
    fn test_zero_parallelism_is_rejected() {
        let config = CrawlerConfig {
            parallelism: Some(0),
            ..CrawlerConfig::default()
        };
        assert!(matches!(
            config.effective_parallelism(),
            Err(ConfigError::InvalidParallelism(0))
        ));
    }

    #[test]
    fn test_parallelism_is_capped_by_cpus() {
        let config = CrawlerConfig {
            parallelism: Some(usize::MAX),
            ..CrawlerConfig::default()
        };
        let cpus = std::thread::available_parallelism().unwrap().get();
        assert_eq!(config.effective_parallelism().unwrap(), cpus);
    }

    #[test]
    fn test_missing_file() {
        let err = CrawlerConfig::from_path(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
