// src/aggregate/time_series.rs

//! Date-bucketed growth series
//!
//! The bucket width is only known once the whole history has been seen, so the
//! pass keeps one entry per active day and rolls those up at `finish`. Memory
//! grows with the number of distinct commit days, not with the commit count.
//!
//! Buckets follow stream order: a commit whose local date is earlier than one
//! already seen (other time zones, rebased author dates) joins the latest day
//! so far, keeping every bucket's cumulative totals equal to the per-commit
//! series at its last commit.

use super::{estimate_bytes, Aggregator};
use crate::categorize::CategoryRules;
use crate::model::{CategoryTotals, CommitRecord, Granularity, TimeSeriesPoint};
use chrono::{Datelike, Duration, Months, NaiveDate};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Upper bound on the number of emitted buckets
pub const MAX_BUCKETS: i64 = 50;

#[derive(Debug, Clone, Default)]
struct Bucket {
    commit_count: usize,
    lines_added: CategoryTotals<u64>,
    lines_deleted: CategoryTotals<u64>,
    net_lines: CategoryTotals<i64>,
    shas: Vec<String>,
}

impl Bucket {
    fn merge(&mut self, other: Bucket) {
        self.commit_count += other.commit_count;
        self.lines_added.accumulate(&other.lines_added);
        self.lines_deleted.accumulate(&other.lines_deleted);
        self.net_lines.accumulate(&other.net_lines);
        self.shas.extend(other.shas);
    }
}

pub struct TimeSeriesAggregator {
    rules: Arc<CategoryRules>,
    bytes_per_line: u64,
    days: BTreeMap<NaiveDate, Bucket>,
    latest_day: Option<NaiveDate>,
}

impl TimeSeriesAggregator {
    pub fn new(rules: Arc<CategoryRules>, bytes_per_line: u64) -> Self {
        Self { rules, bytes_per_line, days: BTreeMap::new(), latest_day: None }
    }
}

impl Aggregator for TimeSeriesAggregator {
    type Output = (Granularity, Vec<TimeSeriesPoint>);

    fn observe(&mut self, commit: &CommitRecord) {
        // Calendar day in the commit's own offset, never before an earlier commit's
        let local_day = commit.timestamp.date_naive();
        let day_key = self.latest_day.map_or(local_day, |latest| latest.max(local_day));
        self.latest_day = Some(day_key);

        let day = self.days.entry(day_key).or_default();
        day.commit_count += 1;
        day.shas.push(commit.sha.clone());

        for change in &commit.file_changes {
            let category = self.rules.categorize(&change.path);
            day.lines_added.add(category, change.lines_added());
            day.lines_deleted.add(category, change.lines_deleted());
            day.net_lines.add(category, change.net_lines());
        }
    }

    fn finish(self) -> Self::Output {
        let (Some(&first), Some(&last)) = (self.days.keys().next(), self.days.keys().next_back())
        else {
            return (Granularity::Day, Vec::new());
        };
        let granularity = choose_granularity(first, last);

        let mut buckets: BTreeMap<NaiveDate, Bucket> = BTreeMap::new();
        for (day, bucket) in self.days {
            buckets.entry(bucket_start(granularity, day)).or_default().merge(bucket);
        }

        let mut points = Vec::new();
        let mut cumulative_lines = CategoryTotals::<i64>::default();
        let mut cumulative_bytes = CategoryTotals::<i64>::default();
        let end = bucket_start(granularity, last);
        let mut cursor = Some(bucket_start(granularity, first));

        while let Some(start) = cursor.filter(|start| *start <= end) {
            let bucket = buckets.remove(&start).unwrap_or_default();
            cumulative_lines.accumulate(&bucket.net_lines);
            for category in crate::model::FileCategory::ALL {
                let bytes = estimate_bytes(bucket.net_lines.get(category), self.bytes_per_line);
                cumulative_bytes.add(category, bytes);
            }

            points.push(TimeSeriesPoint {
                bucket_start: start,
                commit_count: bucket.commit_count,
                lines_added: bucket.lines_added,
                lines_deleted: bucket.lines_deleted,
                cumulative_lines,
                cumulative_bytes,
                commit_shas: bucket.shas,
            });
            cursor = next_bucket(granularity, start);
        }

        (granularity, points)
    }
}

/// Picks the finest granularity that keeps the series within `MAX_BUCKETS`
pub fn choose_granularity(first: NaiveDate, last: NaiveDate) -> Granularity {
    let candidates = [Granularity::Day, Granularity::Week, Granularity::Month, Granularity::Quarter];
    for granularity in candidates {
        if bucket_count(granularity, first, last) <= MAX_BUCKETS {
            return granularity;
        }
    }

    let mut stride = 1;
    while bucket_count(Granularity::Years(stride), first, last) > MAX_BUCKETS {
        stride += 1;
    }
    Granularity::Years(stride)
}

/// Number of contiguous buckets between the buckets holding `first` and `last`
pub fn bucket_count(granularity: Granularity, first: NaiveDate, last: NaiveDate) -> i64 {
    let (from, to) = (bucket_start(granularity, first), bucket_start(granularity, last));
    match granularity {
        Granularity::Day => (to - from).num_days() + 1,
        Granularity::Week => (to - from).num_days() / 7 + 1,
        Granularity::Month => month_index(to) - month_index(from) + 1,
        Granularity::Quarter => (month_index(to) - month_index(from)) / 3 + 1,
        Granularity::Years(stride) => (to.year() - from.year()) as i64 / stride as i64 + 1,
    }
}

fn month_index(date: NaiveDate) -> i64 {
    date.year() as i64 * 12 + date.month0() as i64
}

/// First day of the bucket containing `date`; weeks start on Monday
pub fn bucket_start(granularity: Granularity, date: NaiveDate) -> NaiveDate {
    let first_of_month = date - Duration::days(date.day0() as i64);
    match granularity {
        Granularity::Day => date,
        Granularity::Week => date - Duration::days(date.weekday().num_days_from_monday() as i64),
        Granularity::Month => first_of_month,
        Granularity::Quarter => first_of_month
            .checked_sub_months(Months::new(date.month0() % 3))
            .unwrap_or(first_of_month),
        Granularity::Years(stride) => {
            let year = date.year() - date.year().rem_euclid(stride.max(1) as i32);
            NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(first_of_month)
        }
    }
}

fn next_bucket(granularity: Granularity, start: NaiveDate) -> Option<NaiveDate> {
    match granularity {
        Granularity::Day => start.succ_opt(),
        Granularity::Week => start.checked_add_signed(Duration::days(7)),
        Granularity::Month => start.checked_add_months(Months::new(1)),
        Granularity::Quarter => start.checked_add_months(Months::new(3)),
        Granularity::Years(stride) => start.checked_add_months(Months::new(12 * stride.max(1))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChangeStatus, FileChange};
    use chrono::{DateTime, FixedOffset};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn commit(sha: &str, ts: &str, changes: &[(&str, u64, u64)]) -> CommitRecord {
        CommitRecord {
            sha: sha.to_string(),
            author_name: "A".to_string(),
            author_email: "a@x.com".to_string(),
            timestamp: DateTime::<FixedOffset>::parse_from_rfc3339(ts).unwrap(),
            message: String::new(),
            file_changes: changes
                .iter()
                .map(|&(path, add, del)| FileChange {
                    path: path.to_string(),
                    old_path: None,
                    additions: Some(add),
                    deletions: Some(del),
                    status: ChangeStatus::Modified,
                })
                .collect(),
        }
    }

    fn aggregator() -> TimeSeriesAggregator {
        TimeSeriesAggregator::new(Arc::new(CategoryRules::default()), 40)
    }

    #[test]
    fn granularity_thresholds() {
        let start = date(2024, 1, 1);
        assert_eq!(choose_granularity(start, start), Granularity::Day);
        assert_eq!(choose_granularity(start, date(2024, 2, 19)), Granularity::Day);
        assert_eq!(choose_granularity(start, date(2024, 2, 20)), Granularity::Week);
        assert_eq!(choose_granularity(start, date(2024, 12, 1)), Granularity::Week);
        assert_eq!(choose_granularity(start, date(2027, 6, 1)), Granularity::Month);
        assert_eq!(choose_granularity(start, date(2030, 1, 1)), Granularity::Quarter);
        assert_eq!(choose_granularity(start, date(2080, 1, 1)), Granularity::Years(2));
    }

    #[test]
    fn bucket_starts() {
        let d = date(2024, 8, 15); // a Thursday
        assert_eq!(bucket_start(Granularity::Week, d), date(2024, 8, 12));
        assert_eq!(bucket_start(Granularity::Month, d), date(2024, 8, 1));
        assert_eq!(bucket_start(Granularity::Quarter, d), date(2024, 7, 1));
        assert_eq!(bucket_start(Granularity::Years(5), d), date(2020, 1, 1));
    }

    #[test]
    fn bucket_bound_holds_for_long_spans() {
        let start = date(2001, 3, 17);
        for days in [0, 10, 49, 50, 51, 200, 351, 352, 400, 1600, 5000, 20000, 60000] {
            let end = start + Duration::days(days);
            let granularity = choose_granularity(start, end);
            assert!(bucket_count(granularity, start, end) <= MAX_BUCKETS, "{days} days");
        }
    }

    #[test]
    fn daily_buckets_fill_gaps_and_accumulate() {
        let mut series = aggregator();
        series.observe(&commit("a", "2024-01-01T10:00:00+00:00", &[("src/a.rs", 10, 0)]));
        series.observe(&commit("b", "2024-01-01T12:00:00+00:00", &[("tests/a.rs", 5, 0)]));
        series.observe(&commit("c", "2024-01-03T09:00:00+00:00", &[("src/a.rs", 0, 4)]));
        let (granularity, points) = series.finish();

        assert_eq!(granularity, Granularity::Day);
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].commit_shas, vec!["a", "b"]);
        assert_eq!(points[0].cumulative_lines.total, 15);
        assert_eq!(points[0].cumulative_lines.application, 10);
        assert_eq!(points[0].cumulative_lines.test, 5);
        assert_eq!(points[0].cumulative_bytes.total, 600);

        // Empty day carries the totals forward
        assert_eq!(points[1].bucket_start, date(2024, 1, 2));
        assert_eq!(points[1].commit_count, 0);
        assert_eq!(points[1].cumulative_lines.total, 15);

        assert_eq!(points[2].lines_deleted.application, 4);
        assert_eq!(points[2].cumulative_lines.total, 11);
        assert_eq!(points[2].cumulative_lines.application, 6);
    }

    #[test]
    fn earlier_local_date_joins_the_latest_day() {
        let mut series = aggregator();
        series.observe(&commit("a1", "2024-01-02T01:00:00+05:00", &[("src/a.rs", 10, 0)]));
        series.observe(&commit("b2", "2024-01-01T23:00:00-05:00", &[("src/b.rs", 5, 0)]));
        series.observe(&commit("c3", "2023-12-30T12:00:00+00:00", &[("src/c.rs", 1, 0)]));
        let (granularity, points) = series.finish();

        assert_eq!(granularity, Granularity::Day);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].bucket_start, date(2024, 1, 2));
        assert_eq!(points[0].commit_shas, vec!["a1", "b2", "c3"]);
        assert_eq!(points[0].cumulative_lines.total, 16);
    }

    #[test]
    fn monthly_rollup() {
        let mut series = aggregator();
        series.observe(&commit("a", "2020-01-05T10:00:00+00:00", &[("a.md", 3, 0)]));
        series.observe(&commit("b", "2020-01-25T10:00:00+00:00", &[("a.md", 2, 0)]));
        series.observe(&commit("c", "2021-06-10T10:00:00+00:00", &[("a.md", 1, 1)]));
        let (granularity, points) = series.finish();

        assert_eq!(granularity, Granularity::Month);
        assert_eq!(points.len(), 18);
        assert_eq!(points[0].bucket_start, date(2020, 1, 1));
        assert_eq!(points[0].commit_count, 2);
        assert_eq!(points[0].cumulative_lines.documentation, 5);
        assert_eq!(points[17].bucket_start, date(2021, 6, 1));
        assert_eq!(points[17].commit_shas, vec!["c"]);
        assert_eq!(points[17].cumulative_lines.total, 5);
    }

    #[test]
    fn empty_history() {
        let (granularity, points) = aggregator().finish();
        assert_eq!(granularity, Granularity::Day);
        assert!(points.is_empty());
    }
}
