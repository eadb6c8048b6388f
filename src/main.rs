// src/main.rs

mod cli;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Args;
use git_almanac::model::Progress;
use git_almanac::{AnalysisConfig, AnalysisOrchestrator, GitLogProducer, ReaderProducer};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::time::Instant;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn progress_bar(total: Option<usize>, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    match total {
        Some(total) => {
            let bar = ProgressBar::new(total as u64);
            if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} commits {msg}") {
                bar.set_style(style);
            }
            bar
        }
        None => {
            let bar = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::with_template("{spinner} {pos} commits {msg}") {
                bar.set_style(style);
            }
            bar
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let start_time = Instant::now();

    let mut config = match &args.config {
        Some(path) => AnalysisConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    args.apply(&mut config);

    let bar = progress_bar(config.max_commits, args.quiet);
    bar.set_message("Analyzing commits");
    let progress = bar.clone();
    let orchestrator = AnalysisOrchestrator::new(config)?.with_progress(Box::new(
        move |p: &Progress| progress.set_position(p.processed as u64),
    ));

    let bundle = match &args.log_file {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let producer = ReaderProducer::new(file, orchestrator.config().chunk_size);
            orchestrator.run(producer)?
        }
        None => {
            let producer = GitLogProducer::spawn(&args.repo, orchestrator.config())
                .with_context(|| format!("Failed to read history of {}", args.repo.display()))?;
            orchestrator.run(producer)?
        }
    };
    bar.finish_with_message("Analysis complete");

    println!(
        "Analysis finished in {:.2?}. Found {} commits, {} files, {} contributors.",
        start_time.elapsed(),
        bundle.commit_count,
        bundle.files.len(),
        bundle.contributors.len()
    );
    report::print_summary(&bundle);

    if let Some(output) = &args.output {
        report::write_json(&bundle, output)?;
        println!("\nWrote analysis to {}", output.display());
    }

    Ok(())
}
