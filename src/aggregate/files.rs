// src/aggregate/files.rs

use super::Aggregator;
use crate::categorize::{language_for, CategoryRules};
use crate::model::{ChangeStatus, CommitRecord, FileChange, FileMetrics};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::trace;

/// Source of per-file complexity scores computed outside the log pass
pub trait ComplexityProvider: Send + Sync {
    fn complexity(&self, path: &str) -> Option<f64>;
}

impl ComplexityProvider for HashMap<String, f64> {
    fn complexity(&self, path: &str) -> Option<f64> {
        self.get(path).copied()
    }
}

/// Lifetime metrics for every path the history touched
///
/// Paths are kept in first-seen order. Deleted files stay in the output.
pub struct FileMetricsAggregator {
    rules: Arc<CategoryRules>,
    file_map: HashMap<String, usize>,
    files: Vec<FileMetrics>,
}

impl FileMetricsAggregator {
    pub fn new(rules: Arc<CategoryRules>) -> Self {
        Self { rules, file_map: HashMap::new(), files: Vec::new() }
    }

    /// Moves the history of a renamed file to its new path
    fn follow_rename(&mut self, change: &FileChange) {
        let Some(old_path) = change.old_path.as_deref() else {
            return;
        };
        if self.file_map.contains_key(&change.path) {
            return;
        }
        if let Some(id) = self.file_map.remove(old_path) {
            trace!("Following rename {old_path} -> {}", change.path);
            self.file_map.insert(change.path.clone(), id);
            let info = &mut self.files[id];
            info.path = change.path.clone();
            info.language = language_for(&change.path).to_string();
            info.category = self.rules.categorize(&change.path);
        }
    }
}

impl Aggregator for FileMetricsAggregator {
    type Output = Vec<FileMetrics>;

    fn observe(&mut self, commit: &CommitRecord) {
        for change in &commit.file_changes {
            if change.status == ChangeStatus::Renamed {
                self.follow_rename(change);
            }

            let files = &mut self.files;
            let rules = &self.rules;
            let id = *self.file_map.entry(change.path.clone()).or_insert_with(|| {
                files.push(FileMetrics {
                    path: change.path.clone(),
                    current_lines: 0,
                    raw_lines: 0,
                    total_commits: 0,
                    total_churn: 0,
                    complexity: None,
                    last_modified: commit.timestamp,
                    first_appeared: commit.timestamp,
                    contributors: BTreeSet::new(),
                    language: language_for(&change.path).to_string(),
                    category: rules.categorize(&change.path),
                    deleted: false,
                });
                files.len() - 1
            });

            let info = &mut self.files[id];
            info.total_commits += 1;
            info.raw_lines += change.net_lines();
            info.current_lines = info.raw_lines.max(0) as u64;
            info.total_churn += change.lines_added() + change.lines_deleted();
            info.contributors.insert(commit.author_name.clone());
            info.first_appeared = info.first_appeared.min(commit.timestamp);
            info.last_modified = info.last_modified.max(commit.timestamp);
            info.deleted = change.status == ChangeStatus::Deleted;
        }
    }

    fn finish(self) -> Self::Output {
        self.files
    }
}

/// Fills in complexity scores from an external provider
pub fn attach_complexity(files: &mut [FileMetrics], provider: &dyn ComplexityProvider) {
    for file in files {
        file.complexity = provider.complexity(&file.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FileCategory;
    use crate::parser::parse_log;

    fn metrics(log: &str) -> Vec<FileMetrics> {
        let mut aggregator = FileMetricsAggregator::new(Arc::new(CategoryRules::default()));
        aggregator.observe_all(&parse_log(log, None));
        aggregator.finish()
    }

    #[test]
    fn floors_size_but_keeps_raw_value() {
        let files = metrics(
            "commit 1
Author: A <a@x.com>
Date:   Mon, 1 Jan 2024 10:00:00 +0000

    add

5\t0\tsrc/app.rs

commit 2
Author: B <b@x.com>
Date:   Tue, 2 Jan 2024 10:00:00 +0000

    shrink

2\t9\tsrc/app.rs
",
        );
        assert_eq!(files.len(), 1);
        let app = &files[0];
        assert_eq!(app.raw_lines, -2);
        assert_eq!(app.current_lines, 0);
        assert_eq!(app.total_churn, 16);
        assert_eq!(app.total_commits, 2);
        assert_eq!(app.contributors.len(), 2);
        assert_eq!(app.language, "Rust");
        assert_eq!(app.category, FileCategory::Application);
        assert!(app.first_appeared < app.last_modified);
    }

    #[test]
    fn deleted_files_stay_and_renames_carry_history() {
        let files = metrics(
            "commit 1
Author: A <a@x.com>
Date:   Mon, 1 Jan 2024 10:00:00 +0000

    start

40\t0\tsrc/old.rs
7\t0\tnotes.txt
 create mode 100644 src/old.rs
 create mode 100644 notes.txt

commit 2
Author: A <a@x.com>
Date:   Tue, 2 Jan 2024 10:00:00 +0000

    move and clean up

3\t1\tsrc/{old.rs => new.rs}
0\t7\tnotes.txt
 rename src/{old.rs => new.rs} (90%)
 delete mode 100644 notes.txt
",
        );
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, "src/new.rs");
        assert_eq!(files[0].current_lines, 42);
        assert_eq!(files[0].total_commits, 2);

        assert_eq!(files[1].path, "notes.txt");
        assert_eq!(files[1].current_lines, 0);
        assert!(files[1].deleted);
    }

    #[test]
    fn complexity_from_provider() {
        let mut files = metrics(
            "commit 1
Author: A <a@x.com>
Date:   Mon, 1 Jan 2024 10:00:00 +0000

    add

5\t0\ta.py
5\t0\tb.py
",
        );
        let scores = HashMap::from([("b.py".to_string(), 12.5)]);
        attach_complexity(&mut files, &scores);
        assert_eq!(files[0].complexity, None);
        assert_eq!(files[1].complexity, Some(12.5));
    }
}
