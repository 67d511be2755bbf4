//! Render command implementation.
//!
//! Reads one JSON object per line and writes the rendered log line. String
//! members are used as-is, numbers and booleans in their JSON text form;
//! `null` members count as missing.

use std::borrow::Cow;
use std::io::{BufRead, Write};

use ngxlog_codec::{CompiledFormat, FieldSource};
use serde_json::{Map, Value};

use super::{for_each_line, Summary};
use crate::config::CliConfig;
use crate::error::CliError;

/// A JSON object viewed as a record.
struct JsonRecord(Map<String, Value>);

impl FieldSource for JsonRecord {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match self.0.get(name)? {
            Value::String(s) => Some(Cow::Borrowed(s)),
            Value::Number(n) => Some(Cow::Owned(n.to_string())),
            Value::Bool(b) => Some(Cow::Owned(b.to_string())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

fn read_record(line: usize, data: &[u8]) -> Result<JsonRecord, CliError> {
    let value: Value = serde_json::from_slice(data).map_err(|e| CliError::Record {
        line,
        message: e.to_string(),
    })?;
    let Value::Object(map) = value else {
        return Err(CliError::Record {
            line,
            message: "expected a JSON object".to_string(),
        });
    };
    if let Some((name, _)) = map
        .iter()
        .find(|(_, v)| matches!(v, Value::Array(_) | Value::Object(_)))
    {
        return Err(CliError::Record {
            line,
            message: format!("field {name:?} is not a scalar"),
        });
    }
    Ok(JsonRecord(map))
}

/// Runs the render command.
pub fn run<R: BufRead, W: Write>(
    format: &CompiledFormat,
    config: &CliConfig,
    input: R,
    output: &mut W,
) -> Result<Summary, CliError> {
    let summary = for_each_line(input, config, |line, data| {
        let record = read_record(line, data)?;
        let mut rendered = format.render(&record);
        rendered.push('\n');
        output.write_all(rendered.as_bytes())?;
        Ok(())
    })?;
    output.flush()?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_all(input: &str, config: &CliConfig) -> Result<String, CliError> {
        let mut out = Vec::new();
        run(CompiledFormat::combined(), config, input.as_bytes(), &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn numbers_render_as_decimal_text() {
        let input = r#"{"remote_addr":"$remote_addr","remote_user":"$remote_user","time_local":"$time_local","request":"$request","status":200,"body_bytes_sent":0,"http_referer":"$http_referer","http_user_agent":"$http_user_agent"}"#;
        assert_eq!(
            render_all(input, &CliConfig::new()).unwrap(),
            "$remote_addr - $remote_user [$time_local] \"$request\" 200 0 \"$http_referer\" \"$http_user_agent\"\n"
        );
    }

    #[test]
    fn null_and_missing_render_empty() {
        let out = render_all(r#"{"remote_addr":"::1","remote_user":null}"#, &CliConfig::new()).unwrap();
        assert_eq!(out, "::1 -  [] \"\"   \"\" \"\"\n");
    }

    #[test]
    fn nested_values_rejected() {
        let err = render_all(r#"{"status":[1]}"#, &CliConfig::new()).unwrap_err();
        assert!(matches!(err, CliError::Record { line: 1, .. }));

        let err = render_all("[1]", &CliConfig::new()).unwrap_err();
        assert!(matches!(err, CliError::Record { .. }));
    }

    #[test]
    fn bad_records_skipped_when_configured() {
        let config = CliConfig::new().with_skip_invalid(true);
        let out = render_all("not json\n{\"status\":\"404\"}\n", &config).unwrap();
        assert_eq!(out, " -  [] \"\" 404  \"\" \"\"\n");
    }
}
