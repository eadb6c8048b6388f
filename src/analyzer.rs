// src/analyzer.rs

use crate::aggregate::files::attach_complexity;
use crate::aggregate::{
    Aggregator, ComplexityProvider, ContributorAggregator, FileMetricsAggregator,
    LinearSeriesAggregator, TimeSeriesAggregator, WordFrequencyAggregator,
};
use crate::awards::{compute_awards, compute_rankings, CommitAwardsTracker};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::line_buffer::LineBuffer;
use crate::model::{AnalysisBundle, CommitRecord, Timestamp};
use crate::parser::{CommitStreamParser, ProgressCallback};
use crate::producer::{GitLogProducer, LogProducer};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// All per-run aggregation state
struct Aggregators {
    time_series: TimeSeriesAggregator,
    linear: LinearSeriesAggregator,
    contributors: ContributorAggregator,
    files: FileMetricsAggregator,
    words: WordFrequencyAggregator,
    commit_awards: CommitAwardsTracker,
    first_commit: Option<Timestamp>,
    last_commit: Option<Timestamp>,
}

impl Aggregators {
    fn new(config: &AnalysisConfig) -> Self {
        let rules = Arc::new(config.category_rules.clone());
        Self {
            time_series: TimeSeriesAggregator::new(Arc::clone(&rules), config.bytes_per_line),
            linear: LinearSeriesAggregator::new(config.bytes_per_line),
            contributors: ContributorAggregator::new(config.contributor_identity),
            files: FileMetricsAggregator::new(rules),
            words: WordFrequencyAggregator::new(config.stop_words.as_slice()),
            commit_awards: CommitAwardsTracker::new(config.ranking_size, config.bytes_per_line),
            first_commit: None,
            last_commit: None,
        }
    }

    /// Folds one batch into every aggregator concurrently
    fn observe_batch(&mut self, batch: &[CommitRecord]) {
        if batch.is_empty() {
            return;
        }
        for commit in batch {
            let ts = commit.timestamp;
            self.first_commit = Some(self.first_commit.map_or(ts, |first| first.min(ts)));
            self.last_commit = Some(self.last_commit.map_or(ts, |last| last.max(ts)));
        }

        let Aggregators { time_series, linear, contributors, files, words, commit_awards, .. } = self;
        rayon::scope(|s| {
            s.spawn(move |_| time_series.observe_all(batch));
            s.spawn(move |_| linear.observe_all(batch));
            s.spawn(move |_| contributors.observe_all(batch));
            s.spawn(move |_| files.observe_all(batch));
            s.spawn(move |_| words.observe_all(batch));
            s.spawn(move |_| commit_awards.observe_all(batch));
        });
    }
}

/// Drives one streaming pass from raw log bytes to an [`AnalysisBundle`]
pub struct AnalysisOrchestrator {
    config: AnalysisConfig,
    on_progress: Option<ProgressCallback>,
    complexity: Option<Box<dyn ComplexityProvider>>,
}

impl AnalysisOrchestrator {
    /// Validates `config`; nothing runs until [`run`](Self::run)
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, on_progress: None, complexity: None })
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    pub fn with_complexity(mut self, provider: Box<dyn ComplexityProvider>) -> Self {
        self.complexity = Some(provider);
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Consumes `producer` to the end (or to the commit limit)
    ///
    /// Any producer or transport failure aborts the pass; no partial bundle
    /// is returned. The producer is cancelled whenever the pass stops early.
    pub fn run<P: LogProducer>(self, mut producer: P) -> Result<AnalysisBundle> {
        let AnalysisOrchestrator { config, on_progress, complexity } = self;
        info!("Starting analysis (max_commits: {:?})", config.max_commits);

        let mut parser = CommitStreamParser::new(config.max_commits, config.progress_interval);
        if let Some(callback) = on_progress {
            parser = parser.with_progress(callback);
        }
        let mut aggregators = Aggregators::new(&config);

        match consume(&mut producer, &mut parser, &mut aggregators, config.batch_size) {
            Ok(true) => {}
            Ok(false) => {
                debug!("Commit limit reached, stopping the log producer");
                producer.cancel();
            }
            Err(e) => {
                producer.cancel();
                return Err(e);
            }
        }

        info!("Parsed {} commits ({} incomplete dropped)", parser.emitted(), parser.dropped());
        Ok(build_bundle(&config, parser.emitted(), aggregators, complexity.as_deref()))
    }
}

/// Pumps chunks through the line buffer and parser; false on early cutoff
fn consume<P: LogProducer>(
    producer: &mut P,
    parser: &mut CommitStreamParser,
    aggregators: &mut Aggregators,
    batch_size: usize,
) -> Result<bool> {
    let mut buffer = LineBuffer::new();
    let mut batch: Vec<CommitRecord> = Vec::with_capacity(batch_size);

    while let Some(chunk) = producer.next_chunk()? {
        for line in buffer.feed(&chunk) {
            batch.extend(parser.push_line(&line));
            if batch.len() >= batch_size {
                aggregators.observe_batch(&batch);
                batch.clear();
            }
            if parser.is_done() {
                aggregators.observe_batch(&batch);
                return Ok(false);
            }
        }
    }

    if let Some(line) = buffer.flush() {
        batch.extend(parser.push_line(&line));
    }
    batch.extend(parser.finish());
    aggregators.observe_batch(&batch);
    Ok(true)
}

fn build_bundle(
    config: &AnalysisConfig,
    commit_count: usize,
    aggregators: Aggregators,
    complexity: Option<&dyn ComplexityProvider>,
) -> AnalysisBundle {
    let (granularity, time_series) = aggregators.time_series.finish();
    let contributors = aggregators.contributors.finish();
    let mut files = aggregators.files.finish();
    if let Some(provider) = complexity {
        attach_complexity(&mut files, provider);
    }

    // Rankings and awards need the finished file and contributor state
    let rankings = compute_rankings(&files, config.ranking_size);
    let commit_awards = aggregators.commit_awards.finish();
    let awards = compute_awards(commit_awards, &contributors, config.ranking_size);

    AnalysisBundle {
        commit_count,
        first_commit: aggregators.first_commit,
        last_commit: aggregators.last_commit,
        granularity,
        time_series,
        linear_series: aggregators.linear.finish(),
        contributors,
        files,
        word_frequencies: aggregators.words.finish(),
        rankings,
        awards,
    }
}

/// Runs `git log` in `repo_path` and analyzes its output
pub fn analyze_repository(repo_path: &Path, config: AnalysisConfig) -> Result<AnalysisBundle> {
    let orchestrator = AnalysisOrchestrator::new(config)?;
    let producer = GitLogProducer::spawn(repo_path, orchestrator.config())?;
    orchestrator.run(producer)
}
