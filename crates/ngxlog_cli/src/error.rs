//! CLI error types.

use std::path::PathBuf;

use ngxlog_codec::CodecError;
use thiserror::Error;

/// Errors reported by the `ngxlog` commands.
#[derive(Error, Debug)]
pub enum CliError {
    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configured template does not compile.
    #[error("invalid log format: {0}")]
    Format(#[source] CodecError),

    /// A line failed to parse.
    #[error("line {line}: {source}")]
    Line {
        /// 1-based line number.
        line: usize,
        /// Codec error for the line.
        #[source]
        source: CodecError,
    },

    /// A JSON record could not be read.
    #[error("line {line}: invalid record: {message}")]
    Record {
        /// 1-based line number.
        line: usize,
        /// What was wrong with the record.
        message: String,
    },

    /// A line exceeded the configured length limit.
    #[error("line {line}: {len} bytes exceeds limit of {max}")]
    LineTooLong {
        /// 1-based line number.
        line: usize,
        /// Line length in bytes.
        len: usize,
        /// Configured limit.
        max: usize,
    },

    /// The configuration file could not be loaded.
    #[error("config {path:?}: {message}")]
    Config {
        /// Path of the configuration file.
        path: PathBuf,
        /// Description of the problem.
        message: String,
    },

    /// JSON output could not be produced.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Whether the error concerns a single input line, so processing can
    /// continue with the next one.
    pub fn is_line_error(&self) -> bool {
        matches!(
            self,
            Self::Line { .. } | Self::Record { .. } | Self::LineTooLong { .. }
        )
    }
}
