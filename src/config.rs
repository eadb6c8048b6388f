// src/config.rs

//! Analysis configuration
//!
//! Every field has a default, so an empty TOML file (or no file at all) gives
//! the standard behavior. Loaded configs are validated before a pass starts.

use crate::aggregate::words::DEFAULT_STOP_WORDS;
use crate::categorize::CategoryRules;
use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Key used to group commits into contributors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributorIdentity {
    /// Display name only; one person with several emails stays merged
    #[default]
    Name,
    /// Display name and email; people sharing a name stay apart
    NameAndEmail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Stop after this many commits; unbounded when `None`
    #[serde(default)]
    pub max_commits: Option<usize>,
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,
    /// Length of every top-N ranking and award list
    #[serde(default = "default_ranking_size")]
    pub ranking_size: usize,
    #[serde(default = "default_stop_words")]
    pub stop_words: Vec<String>,
    #[serde(default)]
    pub category_rules: CategoryRules,
    #[serde(default)]
    pub contributor_identity: ContributorIdentity,
    /// Numstat only reports lines; byte metrics are estimated with this factor
    #[serde(default = "default_bytes_per_line")]
    pub bytes_per_line: u64,
    /// Commits folded into the aggregators per parallel step
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Chunks the log producer may buffer ahead of the parser
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// Read size used by the log producers
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_commits: None,
            progress_interval: default_progress_interval(),
            ranking_size: default_ranking_size(),
            stop_words: default_stop_words(),
            category_rules: CategoryRules::default(),
            contributor_identity: ContributorIdentity::default(),
            bytes_per_line: default_bytes_per_line(),
            batch_size: default_batch_size(),
            channel_capacity: default_channel_capacity(),
            chunk_size: default_chunk_size(),
        }
    }
}

fn default_progress_interval() -> usize { 100 }
fn default_ranking_size() -> usize { 10 }
fn default_bytes_per_line() -> u64 { 40 }
fn default_batch_size() -> usize { 256 }
fn default_channel_capacity() -> usize { 64 }
fn default_chunk_size() -> usize { 64 * 1024 }

fn default_stop_words() -> Vec<String> {
    DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect()
}

impl AnalysisConfig {
    /// Loads and validates a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AnalysisConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects limits that would make a pass meaningless
    pub fn validate(&self) -> Result<()> {
        if self.max_commits == Some(0) {
            return Err(AnalysisError::Config("max_commits must be at least 1".into()));
        }
        let positive = [
            ("progress_interval", self.progress_interval),
            ("ranking_size", self.ranking_size),
            ("batch_size", self.batch_size),
            ("channel_capacity", self.channel_capacity),
            ("chunk_size", self.chunk_size),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(AnalysisError::Config(format!("{name} must be greater than 0")));
            }
        }
        Ok(())
    }
}
