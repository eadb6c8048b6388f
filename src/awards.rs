// src/awards.rs

//! Top-N rankings and superlatives
//!
//! Commit-level awards are tracked while the pass runs (`CommitAwardsTracker`)
//! so no commit has to be retained. File rankings and contributor awards are
//! derived from the finished aggregator output.

use crate::aggregate::{estimate_bytes, Aggregator};
use crate::model::{
    Awards, CommitAward, CommitRecord, ContributorAward, ContributorStats, FileMetrics,
    RankedFile, Rankings,
};
use std::cmp::Ordering;

/// Bounded list of the `size` largest values; ties keep the earlier entry
#[derive(Debug, Clone)]
struct TopList {
    size: usize,
    entries: Vec<CommitAward>,
}

impl TopList {
    fn new(size: usize) -> Self {
        Self { size, entries: Vec::with_capacity(size + 1) }
    }

    fn offer(&mut self, commit: &CommitRecord, value: u64) {
        if value == 0 {
            return;
        }
        if self.entries.len() >= self.size
            && self.entries.last().is_some_and(|last| last.value >= value)
        {
            return;
        }
        let position = self.entries.partition_point(|entry| entry.value >= value);
        self.entries.insert(
            position,
            CommitAward {
                sha: commit.sha.clone(),
                author_name: commit.author_name.clone(),
                timestamp: commit.timestamp,
                subject: commit.subject().to_string(),
                value,
            },
        );
        self.entries.truncate(self.size);
    }
}

/// Streaming fold for the commit-level awards
pub struct CommitAwardsTracker {
    bytes_per_line: u64,
    most_files_touched: TopList,
    most_lines_added: TopList,
    most_lines_removed: TopList,
    most_bytes_added: TopList,
    most_bytes_removed: TopList,
}

/// Commit-level award lists, ready to merge into [`Awards`]
#[derive(Debug, Clone, Default)]
pub struct CommitAwards {
    pub most_files_touched: Vec<CommitAward>,
    pub most_lines_added: Vec<CommitAward>,
    pub most_lines_removed: Vec<CommitAward>,
    pub most_bytes_added: Vec<CommitAward>,
    pub most_bytes_removed: Vec<CommitAward>,
}

impl CommitAwardsTracker {
    pub fn new(size: usize, bytes_per_line: u64) -> Self {
        Self {
            bytes_per_line,
            most_files_touched: TopList::new(size),
            most_lines_added: TopList::new(size),
            most_lines_removed: TopList::new(size),
            most_bytes_added: TopList::new(size),
            most_bytes_removed: TopList::new(size),
        }
    }
}

impl Aggregator for CommitAwardsTracker {
    type Output = CommitAwards;

    fn observe(&mut self, commit: &CommitRecord) {
        let added = commit.lines_added();
        let removed = commit.lines_deleted();
        let bytes = |lines: u64| estimate_bytes(lines as i64, self.bytes_per_line).max(0) as u64;
        let (bytes_added, bytes_removed) = (bytes(added), bytes(removed));

        self.most_files_touched.offer(commit, commit.file_changes.len() as u64);
        self.most_lines_added.offer(commit, added);
        self.most_lines_removed.offer(commit, removed);
        self.most_bytes_added.offer(commit, bytes_added);
        self.most_bytes_removed.offer(commit, bytes_removed);
    }

    fn finish(self) -> Self::Output {
        CommitAwards {
            most_files_touched: self.most_files_touched.entries,
            most_lines_added: self.most_lines_added.entries,
            most_lines_removed: self.most_lines_removed.entries,
            most_bytes_added: self.most_bytes_added.entries,
            most_bytes_removed: self.most_bytes_removed.entries,
        }
    }
}

fn descending(a: &f64, b: &f64) -> Ordering {
    b.partial_cmp(a).unwrap_or(Ordering::Equal)
}

/// Ranks positive values, largest first; stable for equal values
fn rank_by(
    files: &[FileMetrics],
    size: usize,
    metric: impl Fn(&FileMetrics) -> Option<f64>,
) -> Vec<RankedFile> {
    let mut scored: Vec<(&FileMetrics, f64)> = files
        .iter()
        .filter_map(|file| metric(file).map(|value| (file, value)))
        .filter(|(_, value)| *value > 0.0)
        .collect();
    let total: f64 = scored.iter().map(|(_, value)| value).sum();

    scored.sort_by(|a, b| descending(&a.1, &b.1));
    scored
        .into_iter()
        .take(size)
        .map(|(file, value)| RankedFile {
            path: file.path.clone(),
            value,
            percentage_of_total: if total > 0.0 { value / total * 100.0 } else { 0.0 },
        })
        .collect()
}

pub fn compute_rankings(files: &[FileMetrics], size: usize) -> Rankings {
    Rankings {
        largest: rank_by(files, size, |f| Some(f.current_lines as f64)),
        most_churn: rank_by(files, size, |f| Some(f.total_churn as f64)),
        most_complex: rank_by(files, size, |f| f.complexity),
    }
}

/// Lowest and highest average lines changed per commit
pub fn contributor_awards(
    contributors: &[ContributorStats],
    size: usize,
) -> (Vec<ContributorAward>, Vec<ContributorAward>) {
    let mut averages: Vec<ContributorAward> = contributors
        .iter()
        .filter(|c| c.commits > 0)
        .map(|c| ContributorAward {
            name: c.canonical_name.clone(),
            commits: c.commits,
            average_lines_changed: c.average_lines_changed(),
        })
        .collect();

    let mut highest = averages.clone();
    highest.sort_by(|a, b| descending(&a.average_lines_changed, &b.average_lines_changed));
    highest.truncate(size);

    averages.sort_by(|a, b| descending(&b.average_lines_changed, &a.average_lines_changed));
    averages.truncate(size);

    (averages, highest)
}

/// Runs once every aggregator has finished
pub fn compute_awards(
    commit_awards: CommitAwards,
    contributors: &[ContributorStats],
    size: usize,
) -> Awards {
    let (lowest_average_change, highest_average_change) = contributor_awards(contributors, size);
    Awards {
        most_files_touched: commit_awards.most_files_touched,
        most_lines_added: commit_awards.most_lines_added,
        most_lines_removed: commit_awards.most_lines_removed,
        most_bytes_added: commit_awards.most_bytes_added,
        most_bytes_removed: commit_awards.most_bytes_removed,
        lowest_average_change,
        highest_average_change,
    }
}
