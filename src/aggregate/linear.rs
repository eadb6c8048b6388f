// src/aggregate/linear.rs

use super::{estimate_bytes, Aggregator};
use crate::model::{CommitRecord, LinearSeriesPoint};

/// Commit-indexed growth series: one point per commit
pub struct LinearSeriesAggregator {
    bytes_per_line: u64,
    cumulative_lines: i64,
    cumulative_bytes: i64,
    points: Vec<LinearSeriesPoint>,
}

impl LinearSeriesAggregator {
    pub fn new(bytes_per_line: u64) -> Self {
        Self { bytes_per_line, cumulative_lines: 0, cumulative_bytes: 0, points: Vec::new() }
    }
}

impl Aggregator for LinearSeriesAggregator {
    type Output = Vec<LinearSeriesPoint>;

    fn observe(&mut self, commit: &CommitRecord) {
        let net_lines = commit.net_lines();
        self.cumulative_lines += net_lines;
        self.cumulative_bytes += estimate_bytes(net_lines, self.bytes_per_line);
        self.points.push(LinearSeriesPoint {
            commit_index: self.points.len(),
            cumulative_lines: self.cumulative_lines,
            cumulative_bytes: self.cumulative_bytes,
            sha: commit.sha.clone(),
            net_lines,
        });
    }

    fn finish(self) -> Self::Output {
        self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_log;

    #[test]
    fn running_totals_per_commit() {
        let log = "commit a1
Author: A <a@x.com>
Date:   Mon, 1 Jan 2024 10:00:00 +0000

    one

10\t0\tsrc/a.rs

commit b2
Author: A <a@x.com>
Date:   Mon, 1 Jan 2024 11:00:00 +0000

    two

1\t6\tsrc/a.rs
-\t-\tlogo.png
";
        let mut aggregator = LinearSeriesAggregator::new(10);
        aggregator.observe_all(&parse_log(log, None));
        let points = aggregator.finish();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].commit_index, 0);
        assert_eq!(points[0].cumulative_lines, 10);
        assert_eq!(points[0].cumulative_bytes, 100);
        assert_eq!(points[1].commit_index, 1);
        assert_eq!(points[1].net_lines, -5);
        assert_eq!(points[1].cumulative_lines, 5);
        assert_eq!(points[1].cumulative_bytes, 50);
        assert_eq!(points[1].sha, "b2");
    }
}
