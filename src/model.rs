// src/model.rs

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::AddAssign;

/// Commit timestamps keep the offset the log was written with
pub type Timestamp = DateTime<FixedOffset>;

/// How a file was touched by a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
}

/// One numstat entry of a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// Path after the commit (the new path for renames)
    pub path: String,
    /// Path before a rename
    pub old_path: Option<String>,
    /// `None` when git reported the binary sentinel `-`
    pub additions: Option<u64>,
    pub deletions: Option<u64>,
    pub status: ChangeStatus,
}

impl FileChange {
    pub fn is_binary(&self) -> bool {
        self.additions.is_none() && self.deletions.is_none()
    }

    pub fn lines_added(&self) -> u64 {
        self.additions.unwrap_or(0)
    }

    pub fn lines_deleted(&self) -> u64 {
        self.deletions.unwrap_or(0)
    }

    /// Additions minus deletions for this change
    pub fn net_lines(&self) -> i64 {
        self.lines_added() as i64 - self.lines_deleted() as i64
    }
}

/// A fully parsed commit, as emitted by the stream parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub sha: String,
    pub author_name: String,
    pub author_email: String,
    pub timestamp: Timestamp,
    pub message: String,
    pub file_changes: Vec<FileChange>,
}

impl CommitRecord {
    pub fn lines_added(&self) -> u64 {
        self.file_changes.iter().map(FileChange::lines_added).sum()
    }

    pub fn lines_deleted(&self) -> u64 {
        self.file_changes.iter().map(FileChange::lines_deleted).sum()
    }

    pub fn net_lines(&self) -> i64 {
        self.lines_added() as i64 - self.lines_deleted() as i64
    }

    /// First line of the message
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

/// Semantic bucket a file path falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Application,
    Test,
    Build,
    Documentation,
    Other,
}

impl FileCategory {
    pub const ALL: [FileCategory; 5] = [
        FileCategory::Application,
        FileCategory::Test,
        FileCategory::Build,
        FileCategory::Documentation,
        FileCategory::Other,
    ];
}

/// A value tracked per file category, plus the total across all categories
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotals<T> {
    pub application: T,
    pub test: T,
    pub build: T,
    pub documentation: T,
    pub other: T,
    pub total: T,
}

impl<T: Copy + AddAssign> CategoryTotals<T> {
    /// Adds `value` to one category and to the total
    pub fn add(&mut self, category: FileCategory, value: T) {
        *self.slot_mut(category) += value;
        self.total += value;
    }

    /// Adds every field of `other` into `self`
    pub fn accumulate(&mut self, other: &CategoryTotals<T>) {
        for category in FileCategory::ALL {
            *self.slot_mut(category) += other.get(category);
        }
        self.total += other.total;
    }

    pub fn get(&self, category: FileCategory) -> T {
        match category {
            FileCategory::Application => self.application,
            FileCategory::Test => self.test,
            FileCategory::Build => self.build,
            FileCategory::Documentation => self.documentation,
            FileCategory::Other => self.other,
        }
    }

    fn slot_mut(&mut self, category: FileCategory) -> &mut T {
        match category {
            FileCategory::Application => &mut self.application,
            FileCategory::Test => &mut self.test,
            FileCategory::Build => &mut self.build,
            FileCategory::Documentation => &mut self.documentation,
            FileCategory::Other => &mut self.other,
        }
    }
}

/// Width of a time-series bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Month,
    Quarter,
    /// Buckets spanning the given number of years
    Years(u32),
}

/// One bucket of the date-indexed growth series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub bucket_start: NaiveDate,
    pub commit_count: usize,
    pub lines_added: CategoryTotals<u64>,
    pub lines_deleted: CategoryTotals<u64>,
    /// Running additions minus deletions up to and including this bucket
    pub cumulative_lines: CategoryTotals<i64>,
    pub cumulative_bytes: CategoryTotals<i64>,
    pub commit_shas: Vec<String>,
}

/// One point per commit of the commit-indexed growth series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearSeriesPoint {
    pub commit_index: usize,
    pub cumulative_lines: i64,
    pub cumulative_bytes: i64,
    pub sha: String,
    pub net_lines: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributorStats {
    pub canonical_name: String,
    pub emails: BTreeSet<String>,
    pub commits: usize,
    pub lines_added: u64,
    pub lines_deleted: u64,
    pub files_modified: BTreeSet<String>,
    pub first_commit: Timestamp,
    pub last_commit: Timestamp,
}

impl ContributorStats {
    /// Mean of added plus deleted lines per commit
    pub fn average_lines_changed(&self) -> f64 {
        if self.commits == 0 {
            return 0.0;
        }
        (self.lines_added + self.lines_deleted) as f64 / self.commits as f64
    }
}

/// Lifetime metrics of a single path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetrics {
    pub path: String,
    /// `raw_lines` floored at zero, for display
    pub current_lines: u64,
    /// Unclamped running additions minus deletions
    pub raw_lines: i64,
    pub total_commits: usize,
    pub total_churn: u64,
    pub complexity: Option<f64>,
    pub last_modified: Timestamp,
    pub first_appeared: Timestamp,
    pub contributors: BTreeSet<String>,
    pub language: String,
    pub category: FileCategory,
    /// The most recent change to this path was a deletion
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordFrequencyEntry {
    pub word: String,
    pub weight: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedFile {
    pub path: String,
    pub value: f64,
    pub percentage_of_total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rankings {
    pub largest: Vec<RankedFile>,
    pub most_churn: Vec<RankedFile>,
    pub most_complex: Vec<RankedFile>,
}

/// A commit singled out by one of the commit-level awards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAward {
    pub sha: String,
    pub author_name: String,
    pub timestamp: Timestamp,
    pub subject: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributorAward {
    pub name: String,
    pub commits: usize,
    pub average_lines_changed: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Awards {
    pub most_files_touched: Vec<CommitAward>,
    pub most_lines_added: Vec<CommitAward>,
    pub most_lines_removed: Vec<CommitAward>,
    pub most_bytes_added: Vec<CommitAward>,
    pub most_bytes_removed: Vec<CommitAward>,
    pub lowest_average_change: Vec<ContributorAward>,
    pub highest_average_change: Vec<ContributorAward>,
}

/// Progress notification emitted by the stream parser
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    pub processed: usize,
    /// Only known when a commit cutoff is configured
    pub total: Option<usize>,
    pub percentage: Option<f64>,
    pub complete: bool,
}

/// The complete results of one analysis pass
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisBundle {
    pub commit_count: usize,
    pub first_commit: Option<Timestamp>,
    pub last_commit: Option<Timestamp>,
    pub granularity: Granularity,
    pub time_series: Vec<TimeSeriesPoint>,
    pub linear_series: Vec<LinearSeriesPoint>,
    pub contributors: Vec<ContributorStats>,
    pub files: Vec<FileMetrics>,
    pub word_frequencies: Vec<WordFrequencyEntry>,
    pub rankings: Rankings,
    pub awards: Awards,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(additions: Option<u64>, deletions: Option<u64>) -> FileChange {
        FileChange {
            path: "a.rs".to_string(),
            old_path: None,
            additions,
            deletions,
            status: ChangeStatus::Modified,
        }
    }

    #[test]
    fn binary_needs_both_sentinels() {
        assert!(change(None, None).is_binary());
        assert!(!change(Some(3), None).is_binary());
        assert_eq!(change(Some(3), None).net_lines(), 3);
        assert_eq!(change(None, None).net_lines(), 0);
    }

    #[test]
    fn category_totals_track_total() {
        let mut totals = CategoryTotals::<i64>::default();
        totals.add(FileCategory::Test, 5);
        totals.add(FileCategory::Application, -2);
        assert_eq!(totals.test, 5);
        assert_eq!(totals.application, -2);
        assert_eq!(totals.total, 3);

        let mut sum = totals;
        sum.accumulate(&totals);
        assert_eq!(sum.total, 6);
        assert_eq!(sum.get(FileCategory::Test), 10);
    }
}
