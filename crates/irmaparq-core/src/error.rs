use std::path::{Path, PathBuf};

use thiserror::Error;

/// Core error type for ingest operations
#[derive(Error, Debug)]
pub enum IngestError {
    /// IO errors from file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow errors from Arrow operations
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),

    /// Parquet format errors
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Delimited-text decoding errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Workbook decoding errors
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    /// Malformed glob patterns
    #[error("Glob pattern error: {0}")]
    Pattern(#[from] glob::PatternError),

    /// IO failures while walking a glob pattern
    #[error("Glob error: {0}")]
    Glob(#[from] glob::GlobError),

    /// Timestamp conversion errors
    #[error("Time error: {0}")]
    Time(#[from] jiff::Error),

    /// File name matched no known record kind
    #[error("Unclassified input file: {path}")]
    Unclassified {
        /// Offending path
        path: PathBuf,
    },

    /// Byte-size or duration text that does not fit the unit grammar
    #[error("Malformed unit {input:?}: {reason}")]
    MalformedUnit {
        /// Original text
        input: String,
        /// What was wrong with it
        reason: String,
    },

    /// Structural errors in an input file
    #[error("Parse error in {path}: {message}")]
    Parse {
        /// File being parsed
        path: PathBuf,
        /// What was wrong with it
        message: String,
    },

    /// A cell that cannot be coerced to its column's resolved type
    #[error("Schema mismatch in column {column:?}: expected {expected}, found {found}")]
    SchemaMismatch {
        /// Column being bound
        column: String,
        /// Resolved column type
        expected: String,
        /// Offending cell, rendered
        found: String,
    },

    /// A merge pattern (and its fallback, if any) matched nothing
    #[error("No files found for pattern {pattern:?}")]
    NoFilesFound {
        /// Pattern that came up empty
        pattern: String,
    },

    /// Internal errors that shouldn't happen
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for ingest operations
pub type Result<T> = std::result::Result<T, IngestError>;

impl IngestError {
    /// Create a new unclassified-file error
    pub fn unclassified<P: Into<PathBuf>>(path: P) -> Self {
        IngestError::Unclassified { path: path.into() }
    }

    /// Create a new malformed-unit error
    pub fn malformed_unit<S: Into<String>, R: Into<String>>(input: S, reason: R) -> Self {
        IngestError::MalformedUnit {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create a new parse error for a file
    pub fn parse<S: Into<String>>(path: &Path, message: S) -> Self {
        IngestError::Parse {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// Create a new schema mismatch error
    pub fn schema_mismatch<C, E, F>(column: C, expected: E, found: F) -> Self
    where
        C: Into<String>,
        E: Into<String>,
        F: Into<String>,
    {
        IngestError::SchemaMismatch {
            column: column.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create a new no-files-found error
    pub fn no_files<S: Into<String>>(pattern: S) -> Self {
        IngestError::NoFilesFound {
            pattern: pattern.into(),
        }
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        IngestError::Internal(msg.into())
    }
}
