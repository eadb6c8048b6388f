// src/lib.rs

//! Commit-history analytics from `git log --numstat` output
//!
//! Raw log bytes flow through [`line_buffer::LineBuffer`] and
//! [`parser::CommitStreamParser`] into a set of streaming aggregators; the
//! result of one pass is an [`model::AnalysisBundle`] with growth series,
//! contributor and file statistics, word frequencies, rankings and awards.
//!
//! ```no_run
//! use git_almanac::{analyze_repository, AnalysisConfig};
//! use std::path::Path;
//!
//! let bundle = analyze_repository(Path::new("."), AnalysisConfig::default()).unwrap();
//! println!("{} commits", bundle.commit_count);
//! ```

pub mod aggregate;
pub mod analyzer;
pub mod awards;
pub mod categorize;
pub mod config;
pub mod error;
pub mod line_buffer;
pub mod model;
pub mod parser;
pub mod producer;

pub use analyzer::{analyze_repository, AnalysisOrchestrator};
pub use categorize::{categorize, language_for, CategoryRules};
pub use config::{AnalysisConfig, ContributorIdentity};
pub use error::{AnalysisError, Result};
pub use model::AnalysisBundle;
pub use producer::{GitLogProducer, LogProducer, ReaderProducer};
