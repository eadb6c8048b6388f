// src/report.rs

use anyhow::{Context, Result};
use git_almanac::aggregate::words::top_words;
use git_almanac::model::{AnalysisBundle, CommitAward, RankedFile};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Serializes the whole bundle for the report builder
pub fn write_json(bundle: &AnalysisBundle, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), bundle)
        .with_context(|| format!("Failed to write analysis to {}", path.display()))?;
    Ok(())
}

fn print_ranking(title: &str, entries: &[RankedFile]) {
    if entries.is_empty() {
        return;
    }
    println!("\n{title}");
    for entry in entries {
        println!("  {:>10.0}  {:>5.1}%  {}", entry.value, entry.percentage_of_total, entry.path);
    }
}

fn print_award(title: &str, entries: &[CommitAward]) {
    if let Some(top) = entries.first() {
        let short = top.sha.get(..10).unwrap_or(&top.sha);
        println!("  {title}: {} ({}) by {} - {}", top.value, short, top.author_name, top.subject);
    }
}

pub fn print_summary(bundle: &AnalysisBundle) {
    if let (Some(first), Some(last)) = (bundle.first_commit, bundle.last_commit) {
        println!(
            "History spans from {} to {} ({} buckets, {:?}).",
            first.to_rfc2822(),
            last.to_rfc2822(),
            bundle.time_series.len(),
            bundle.granularity
        );
    }
    if let Some(point) = bundle.linear_series.last() {
        println!("Net lines after the last commit: {}", point.cumulative_lines);
    }

    let mut contributors: Vec<_> = bundle.contributors.iter().collect();
    contributors.sort_by(|a, b| b.commits.cmp(&a.commits));
    println!("\nTop contributors");
    for c in contributors.iter().take(10) {
        println!(
            "  {:>6} commits  +{:<8} -{:<8} {}",
            c.commits, c.lines_added, c.lines_deleted, c.canonical_name
        );
    }

    print_ranking("Largest files", &bundle.rankings.largest);
    print_ranking("Most churn", &bundle.rankings.most_churn);
    print_ranking("Most complex", &bundle.rankings.most_complex);

    println!("\nAwards");
    print_award("Most files touched", &bundle.awards.most_files_touched);
    print_award("Most lines added", &bundle.awards.most_lines_added);
    print_award("Most lines removed", &bundle.awards.most_lines_removed);

    let words = top_words(&bundle.word_frequencies, 10);
    if !words.is_empty() {
        let line: Vec<String> = words.iter().map(|w| format!("{} ({})", w.word, w.weight)).collect();
        println!("\nFrequent words: {}", line.join(", "));
    }
}
