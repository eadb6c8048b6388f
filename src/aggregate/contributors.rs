// src/aggregate/contributors.rs

use super::Aggregator;
use crate::config::ContributorIdentity;
use crate::model::{CommitRecord, ContributorStats};
use std::collections::{BTreeSet, HashMap};

/// Per-author totals, in first-seen order
pub struct ContributorAggregator {
    identity: ContributorIdentity,
    contributor_map: HashMap<String, usize>,
    contributors: Vec<ContributorStats>,
}

impl ContributorAggregator {
    pub fn new(identity: ContributorIdentity) -> Self {
        Self { identity, contributor_map: HashMap::new(), contributors: Vec::new() }
    }

    fn key(&self, commit: &CommitRecord) -> String {
        match self.identity {
            ContributorIdentity::Name => commit.author_name.clone(),
            ContributorIdentity::NameAndEmail => {
                format!("{} <{}>", commit.author_name, commit.author_email.to_lowercase())
            }
        }
    }
}

impl Aggregator for ContributorAggregator {
    type Output = Vec<ContributorStats>;

    fn observe(&mut self, commit: &CommitRecord) {
        let key = self.key(commit);
        let contributors = &mut self.contributors;
        let id = *self.contributor_map.entry(key).or_insert_with(|| {
            contributors.push(ContributorStats {
                canonical_name: commit.author_name.clone(),
                emails: BTreeSet::new(),
                commits: 0,
                lines_added: 0,
                lines_deleted: 0,
                files_modified: BTreeSet::new(),
                first_commit: commit.timestamp,
                last_commit: commit.timestamp,
            });
            contributors.len() - 1
        });

        let stats = &mut self.contributors[id];
        stats.emails.insert(commit.author_email.clone());
        stats.commits += 1;
        stats.lines_added += commit.lines_added();
        stats.lines_deleted += commit.lines_deleted();
        stats.files_modified.extend(commit.file_changes.iter().map(|c| c.path.clone()));
        stats.first_commit = stats.first_commit.min(commit.timestamp);
        stats.last_commit = stats.last_commit.max(commit.timestamp);
    }

    fn finish(self) -> Self::Output {
        self.contributors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_log;

    const LOG: &str = "commit 1
Author: Sam Lee <sam@work.com>
Date:   Mon, 1 Jan 2024 10:00:00 +0000

    first

5\t1\ta.rs

commit 2
Author: Sam Lee <sam@home.net>
Date:   Tue, 2 Jan 2024 10:00:00 +0000

    second

3\t0\tb.rs
2\t2\ta.rs

commit 3
Author: Kim <kim@x.com>
Date:   Wed, 3 Jan 2024 10:00:00 +0000

    third

1\t0\tc.rs
";

    #[test]
    fn groups_by_name() {
        let mut aggregator = ContributorAggregator::new(ContributorIdentity::Name);
        aggregator.observe_all(&parse_log(LOG, None));
        let contributors = aggregator.finish();

        assert_eq!(contributors.len(), 2);
        let sam = &contributors[0];
        assert_eq!(sam.canonical_name, "Sam Lee");
        assert_eq!(sam.commits, 2);
        assert_eq!(sam.lines_added, 10);
        assert_eq!(sam.lines_deleted, 3);
        assert_eq!(sam.emails.len(), 2);
        assert_eq!(sam.files_modified.iter().collect::<Vec<_>>(), vec!["a.rs", "b.rs"]);
        assert!(sam.first_commit < sam.last_commit);
        assert_eq!(contributors[1].canonical_name, "Kim");
    }

    #[test]
    fn name_and_email_keeps_aliases_apart() {
        let mut aggregator = ContributorAggregator::new(ContributorIdentity::NameAndEmail);
        aggregator.observe_all(&parse_log(LOG, None));
        let contributors = aggregator.finish();

        assert_eq!(contributors.len(), 3);
        assert!(contributors.iter().all(|c| c.commits == 1));
        assert_eq!(contributors[0].canonical_name, contributors[1].canonical_name);
    }
}
