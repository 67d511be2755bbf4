//! Parse command implementation.
//!
//! Reads raw log lines and writes one JSON object per line, with keys in
//! template order.

use std::io::{BufRead, Write};

use ngxlog_codec::{CompiledFormat, Fields};
use serde::ser::{Serialize, Serializer};

use super::{for_each_line, Summary};
use crate::config::CliConfig;
use crate::error::CliError;

/// Serializes parsed fields as a JSON object in field order.
struct OrderedRecord<'a>(&'a Fields);

impl Serialize for OrderedRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter())
    }
}

/// Runs the parse command.
pub fn run<R: BufRead, W: Write>(
    format: &CompiledFormat,
    config: &CliConfig,
    input: R,
    output: &mut W,
) -> Result<Summary, CliError> {
    let summary = for_each_line(input, config, |line, data| {
        let fields = format
            .parse_bytes(data)
            .map_err(|source| CliError::Line { line, source })?;
        serde_json::to_writer(&mut *output, &OrderedRecord(&fields))?;
        output.write_all(b"\n")?;
        Ok(())
    })?;
    output.flush()?;
    Ok(summary)
}
