// src/error.rs

use thiserror::Error;

/// Errors that abort an analysis pass
///
/// Malformed individual commits never surface here; the parser drops them and
/// the pass continues.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Not a git repository: {0}")]
    Repository(#[from] git2::Error),

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Log producer exited with {status}: {stderr}")]
    Producer { status: String, stderr: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
