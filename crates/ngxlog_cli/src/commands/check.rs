//! Check command implementation.

use std::io::Write;

use ngxlog_codec::{CompiledFormat, EscapeMode};
use serde::Serialize;

use crate::error::CliError;

/// Description of a compiled template.
#[derive(Debug, Serialize)]
pub struct CheckResult<'a> {
    /// Canonical template text.
    pub template: String,
    /// Escape mode name.
    pub escape: &'static str,
    /// Variable names in template order.
    pub variables: Vec<&'a str>,
}

/// Runs the check command.
pub fn run<W: Write>(format: &CompiledFormat, json: bool, output: &mut W) -> Result<(), CliError> {
    let result = CheckResult {
        template: format.to_string(),
        escape: match format.mode() {
            EscapeMode::Plain => "default",
            EscapeMode::JsonString => "json",
        },
        variables: format.variables().collect(),
    };

    if json {
        serde_json::to_writer_pretty(&mut *output, &result)?;
        writeln!(output)?;
    } else {
        writeln!(output, "template:  {}", result.template)?;
        writeln!(output, "escape:    {}", result.escape)?;
        writeln!(output, "variables: {}", result.variables.join(", "))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ngxlog_codec::compile;

    #[test]
    fn text_output() {
        let format = compile(r#"escape=json;{"$$k":"$v"}"#).unwrap();
        let mut out = Vec::new();
        run(&format, false, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "template:  escape=json;{\"$$k\":\"$v\"}\nescape:    json\nvariables: v\n"
        );
    }

    #[test]
    fn json_output() {
        let mut out = Vec::new();
        run(CompiledFormat::combined(), true, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["escape"], "default");
        assert_eq!(value["variables"].as_array().unwrap().len(), 8);
    }
}
