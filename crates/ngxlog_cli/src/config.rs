//! CLI configuration.

use std::path::Path;

use ngxlog_codec::{compile, CompiledFormat, COMBINED_FORMAT};
use serde::Deserialize;

use crate::error::CliError;

/// Keyword selecting the built-in combined format.
pub const COMBINED_KEYWORD: &str = "combined";

/// Configuration for the `ngxlog` commands.
///
/// Loaded from a JSON file with `--config`; every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Template source, or `combined`.
    pub format: String,

    /// Log and skip lines that fail instead of stopping.
    pub skip_invalid: bool,

    /// Longest accepted input line in bytes.
    pub max_line_len: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            format: COMBINED_KEYWORD.to_string(),
            skip_invalid: false,
            max_line_len: 64 * 1024, // 64 KiB
        }
    }
}

impl CliConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration file.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path).map_err(|e| CliError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| CliError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Sets the template.
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Sets whether failing lines are skipped.
    #[must_use]
    pub const fn with_skip_invalid(mut self, skip: bool) -> Self {
        self.skip_invalid = skip;
        self
    }

    /// Sets the maximum line length.
    #[must_use]
    pub const fn with_max_line_len(mut self, len: usize) -> Self {
        self.max_line_len = len;
        self
    }

    /// The template source this configuration selects.
    pub fn template(&self) -> &str {
        if self.format == COMBINED_KEYWORD {
            COMBINED_FORMAT
        } else {
            &self.format
        }
    }

    /// Compiles the configured template.
    pub fn compile(&self) -> Result<CompiledFormat, CliError> {
        compile(self.template()).map_err(CliError::Format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = CliConfig::new();
        assert_eq!(config.template(), COMBINED_FORMAT);
        assert!(!config.skip_invalid);
        assert_eq!(config.max_line_len, 65536);
    }

    #[test]
    fn builder_overrides() {
        let config = CliConfig::new()
            .with_format("$a|$b")
            .with_skip_invalid(true)
            .with_max_line_len(10);
        assert_eq!(config.template(), "$a|$b");
        assert!(config.skip_invalid);
        assert_eq!(config.compile().unwrap().variables().count(), 2);
    }

    #[test]
    fn load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"format": "escape=json;{{\"m\":\"$msg\"}}", "skip_invalid": true}}"#).unwrap();
        let config = CliConfig::load(file.path()).unwrap();
        assert_eq!(config.format, r#"escape=json;{"m":"$msg"}"#);
        assert!(config.skip_invalid);
        assert_eq!(config.max_line_len, 65536);
    }

    #[test]
    fn load_rejects_unknown_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"formats": "x"}}"#).unwrap();
        assert!(matches!(
            CliConfig::load(file.path()),
            Err(CliError::Config { .. })
        ));
    }

    #[test]
    fn bad_template_reported() {
        let config = CliConfig::new().with_format("$a$b");
        assert!(matches!(config.compile(), Err(CliError::Format(_))));
    }
}
