//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while compiling a template, parsing a line or
/// rendering a record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The `escape=<mode>;` directive named a mode other than `json`.
    #[error("unknown escape mode: {mode:?}")]
    UnknownEscapeMode {
        /// The mode name as written in the template.
        mode: String,
    },

    /// Two variables follow each other without a literal between them.
    #[error("ambiguous template: ${first} is directly followed by ${second}")]
    AmbiguousTemplate {
        /// Name of the first variable.
        first: String,
        /// Name of the variable that follows it.
        second: String,
    },

    /// The data does not conform to the compiled template.
    #[error("format mismatch at offset {offset}: {message}")]
    FormatMismatch {
        /// Byte offset into the data.
        offset: usize,
        /// Description of the mismatch.
        message: String,
    },

    /// A malformed or disallowed escape sequence.
    #[error("invalid escape at offset {offset}: {message}")]
    InvalidEscape {
        /// Byte offset of the backslash that opened the escape.
        offset: usize,
        /// Description of the escape error.
        message: String,
    },

    /// Raw input bytes are not valid UTF-8.
    #[error("invalid UTF-8 input")]
    InvalidUtf8,

    /// The output sink refused further text.
    #[error("output sink rejected rendered text")]
    Sink,
}

impl CodecError {
    /// Create an unknown escape mode error.
    pub fn unknown_escape_mode(mode: impl Into<String>) -> Self {
        Self::UnknownEscapeMode { mode: mode.into() }
    }

    /// Create an ambiguous template error.
    pub fn ambiguous_template(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self::AmbiguousTemplate {
            first: first.into(),
            second: second.into(),
        }
    }

    /// Create a format mismatch error.
    pub fn format_mismatch(offset: usize, message: impl Into<String>) -> Self {
        Self::FormatMismatch {
            offset,
            message: message.into(),
        }
    }

    /// Create an invalid escape error.
    pub fn invalid_escape(offset: usize, message: impl Into<String>) -> Self {
        Self::InvalidEscape {
            offset,
            message: message.into(),
        }
    }

    /// Whether this error was raised while compiling a template.
    pub fn is_compile_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownEscapeMode { .. } | Self::AmbiguousTemplate { .. }
        )
    }

    /// Whether this error was raised while parsing data.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::FormatMismatch { .. } | Self::InvalidEscape { .. } | Self::InvalidUtf8
        )
    }
}

impl From<std::fmt::Error> for CodecError {
    fn from(_: std::fmt::Error) -> Self {
        Self::Sink
    }
}
