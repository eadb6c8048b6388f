// src/cli.rs

use clap::Parser;
use git_almanac::{AnalysisConfig, ContributorIdentity};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the git repository to analyze
    #[arg(short, long, default_value = ".")]
    pub repo: PathBuf,

    /// Analyze a saved `git log --numstat --summary` file instead of running git
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Write the analysis bundle as JSON to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Stop after this many commits
    #[arg(long)]
    pub max_commits: Option<usize>,

    /// Report progress every N commits
    #[arg(long)]
    pub progress_interval: Option<usize>,

    /// Length of the rankings and award lists
    #[arg(long)]
    pub top: Option<usize>,

    /// How commits are grouped into contributors
    #[arg(long, value_enum)]
    pub identity: Option<Identity>,

    /// Hide the progress bar
    #[arg(long)]
    pub quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug, Copy)]
pub enum Identity {
    /// Group by display name
    Name,
    /// Group by display name and email
    NameEmail,
}

impl Args {
    /// Command-line flags override values from the config file
    pub fn apply(&self, config: &mut AnalysisConfig) {
        if let Some(max_commits) = self.max_commits {
            config.max_commits = Some(max_commits);
        }
        if let Some(interval) = self.progress_interval {
            config.progress_interval = interval;
        }
        if let Some(top) = self.top {
            config.ranking_size = top;
        }
        if let Some(identity) = self.identity {
            config.contributor_identity = match identity {
                Identity::Name => ContributorIdentity::Name,
                Identity::NameEmail => ContributorIdentity::NameAndEmail,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let args = Args::parse_from(["git-almanac", "--max-commits", "20", "--identity", "name-email"]);
        let mut config = AnalysisConfig { ranking_size: 3, ..AnalysisConfig::default() };
        args.apply(&mut config);
        assert_eq!(config.max_commits, Some(20));
        assert_eq!(config.ranking_size, 3);
        assert_eq!(config.contributor_identity, ContributorIdentity::NameAndEmail);
    }
}
