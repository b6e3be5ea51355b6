use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a whole batch. No partial output is written after one of these.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A line whose field count does not match the record schema.
    #[error("malformed record on line {line}: expected {expected} fields, found {found}")]
    MalformedRecord {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("invalid branch ID pattern {pattern}: {reason}")]
    IdPattern { pattern: String, reason: String },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("no records found in {path}")]
    EmptyInput { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
