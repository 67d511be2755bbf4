//! Shared parse/render vectors.
//!
//! Each [`FormatVector`] pins one line: what it parses to and what the parsed
//! record renders back to. [`ErrorVector`]s pin rejected templates and lines.

use serde::{Deserialize, Serialize};

use ngxlog_codec::COMBINED_FORMAT;

const JSON_KV: &str = r#"escape=json;{"$key":"$value"}"#;
const BACKSLASH_QUOTED: &str = r#"\$request\"$request_body\"\"$header_cookie\""#;

/// A line that must parse, and the line its record renders back to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Template to compile.
    pub template: String,
    /// Input line.
    pub data: String,
    /// Expected fields in template order.
    pub expected: Vec<(String, String)>,
    /// Expected output of rendering the parsed fields.
    pub rendered: String,
}

/// Which error a vector must produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// `CodecError::UnknownEscapeMode`.
    UnknownEscapeMode,
    /// `CodecError::AmbiguousTemplate`.
    AmbiguousTemplate,
    /// `CodecError::FormatMismatch`.
    FormatMismatch,
    /// `CodecError::InvalidEscape`.
    InvalidEscape,
}

impl ErrorKind {
    /// Whether `err` is of this kind.
    pub fn matches(self, err: &ngxlog_codec::CodecError) -> bool {
        use ngxlog_codec::CodecError;
        matches!(
            (self, err),
            (Self::UnknownEscapeMode, CodecError::UnknownEscapeMode { .. })
                | (Self::AmbiguousTemplate, CodecError::AmbiguousTemplate { .. })
                | (Self::FormatMismatch, CodecError::FormatMismatch { .. })
                | (Self::InvalidEscape, CodecError::InvalidEscape { .. })
        )
    }
}

/// A template or line that must be rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Template to compile.
    pub template: String,
    /// Line to parse; `None` when compilation itself must fail.
    pub data: Option<String>,
    /// Expected error.
    pub expected_error: ErrorKind,
}

fn fields(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

fn vector(
    id: &str,
    description: &str,
    template: &str,
    data: &str,
    expected: &[(&str, &str)],
    rendered: &str,
) -> FormatVector {
    FormatVector {
        id: id.into(),
        description: description.into(),
        template: template.into(),
        data: data.into(),
        expected: fields(expected),
        rendered: rendered.into(),
    }
}

/// Vectors that must parse and re-render.
pub fn format_vectors() -> Vec<FormatVector> {
    vec![
        vector(
            "combined_self",
            "combined format parsing its own template text",
            COMBINED_FORMAT,
            COMBINED_FORMAT,
            &[
                ("remote_addr", "$remote_addr"),
                ("remote_user", "$remote_user"),
                ("time_local", "$time_local"),
                ("request", "$request"),
                ("status", "$status"),
                ("body_bytes_sent", "$body_bytes_sent"),
                ("http_referer", "$http_referer"),
                ("http_user_agent", "$http_user_agent"),
            ],
            COMBINED_FORMAT,
        ),
        vector(
            "combined_real_line",
            "typical combined line with brackets and spaces inside fields",
            COMBINED_FORMAT,
            r#"192.0.2.4 - - [14/Oct/2026:08:15:02 +0200] "GET /index.html?q=a%20b HTTP/1.1" 304 0 "https://example.org/" "Mozilla/5.0 (X11; Linux x86_64) Gecko/20100101 Firefox/131.0""#,
            &[
                ("remote_addr", "192.0.2.4"),
                ("remote_user", "-"),
                ("time_local", "14/Oct/2026:08:15:02 +0200"),
                ("request", "GET /index.html?q=a%20b HTTP/1.1"),
                ("status", "304"),
                ("body_bytes_sent", "0"),
                ("http_referer", "https://example.org/"),
                (
                    "http_user_agent",
                    "Mozilla/5.0 (X11; Linux x86_64) Gecko/20100101 Firefox/131.0",
                ),
            ],
            r#"192.0.2.4 - - [14/Oct/2026:08:15:02 +0200] "GET /index.html?q=a%20b HTTP/1.1" 304 0 "https://example.org/" "Mozilla/5.0 (X11; Linux x86_64) Gecko/20100101 Firefox/131.0""#,
        ),
        vector(
            "backslash_delimited",
            "single backslashes as the only separators",
            r"\$request\$request_body\$header_cookie\",
            r"\request\request_body\header_cookie\",
            &[
                ("request", "request"),
                ("request_body", "request_body"),
                ("header_cookie", "header_cookie"),
            ],
            r"\request\request_body\header_cookie\",
        ),
        vector(
            "backslash_quote_delimited",
            "escaped-quote separators",
            BACKSLASH_QUOTED,
            r#"\request\"request_body\"\"header_cookie\""#,
            &[
                ("request", "request"),
                ("request_body", "request_body"),
                ("header_cookie", "header_cookie"),
            ],
            r#"\request\"request_body\"\"header_cookie\""#,
        ),
        vector(
            "backslash_quote_inside_value",
            "a value holding an escaped backslash and quote before its separator",
            BACKSLASH_QUOTED,
            r#"\requ\\\"est\"request_body\"\"header_cookie\""#,
            &[
                ("request", r#"requ\"est"#),
                ("request_body", "request_body"),
                ("header_cookie", "header_cookie"),
            ],
            r#"\requ\\\"est\"request_body\"\"header_cookie\""#,
        ),
        vector(
            "json_plain_text",
            "JSON mode without escapes",
            JSON_KV,
            r#"{"$key":"$value"}"#,
            &[("key", "$key"), ("value", "$value")],
            r#"{"$key":"$value"}"#,
        ),
        vector(
            "json_named_escapes",
            "control escapes are re-escaped, \\uf755 is not",
            JSON_KV,
            "{\"\\u0024k\\u0065y\":\"\\r\\f\\t\\uf755\\n\"}",
            &[("key", "$key"), ("value", "\r\u{c}\t\u{f755}\n")],
            "{\"$key\":\"\\r\\f\\t\u{f755}\\n\"}",
        ),
        vector(
            "json_surrogate_pair",
            "a surrogate pair becomes one scalar value",
            JSON_KV,
            "{\"\\u0024k\\u0065\\u0079\":\"\\ud83c\\udf09\"}",
            &[("key", "$key"), ("value", "\u{1f309}")],
            "{\"$key\":\"\u{1f309}\"}",
        ),
        vector(
            "json_surrogate_pair_after_text",
            "surrogate pair after plain text",
            JSON_KV,
            "{\"\\u0024k\\u0065\\u0079\":\"surrogate pair : \\ud83c\\udf09\"}",
            &[("key", "$key"), ("value", "surrogate pair : \u{1f309}")],
            "{\"$key\":\"surrogate pair : \u{1f309}\"}",
        ),
        vector(
            "json_surrogate_pairs_then_text",
            "consecutive surrogate pairs followed by escaped spaces",
            JSON_KV,
            "{\"\\u0024k\\u0065\\u0079\":\"\\ud83c\\udf09\\ud83c\\udf09is\\u0020surrogate\\u0020pair\"}",
            &[("key", "$key"), ("value", "\u{1f309}\u{1f309}is surrogate pair")],
            "{\"$key\":\"\u{1f309}\u{1f309}is surrogate pair\"}",
        ),
        vector(
            "json_surrogate_pairs_then_quote",
            "an escaped quote right before the closing literal",
            JSON_KV,
            "{\"\\u0024k\\u0065\\u0079\":\"\\ud83c\\udf09\\ud83c\\udf09\\ud83c\\udf09\\ud83c\\udf09\\\"\"}",
            &[
                ("key", "$key"),
                ("value", "\u{1f309}\u{1f309}\u{1f309}\u{1f309}\""),
            ],
            "{\"$key\":\"\u{1f309}\u{1f309}\u{1f309}\u{1f309}\\\"\"}",
        ),
        vector(
            "json_literal_dollars",
            "$$ before a variable is a literal dollar",
            r#"escape=json;{"$$$key":"$$$value"}"#,
            r#"{"$key":"$value"}"#,
            &[("key", "key"), ("value", "value")],
            r#"{"$key":"$value"}"#,
        ),
    ]
}

/// Vectors that must fail.
pub fn error_vectors() -> Vec<ErrorVector> {
    let error = |id: &str, template: &str, data: Option<&str>, kind| ErrorVector {
        id: id.into(),
        template: template.into(),
        data: data.map(Into::into),
        expected_error: kind,
    };
    vec![
        error("adjacent_variables", "$a$b", None, ErrorKind::AmbiguousTemplate),
        error("unknown_mode", "escape=yaml;$a", None, ErrorKind::UnknownEscapeMode),
        error(
            "lone_high_surrogate",
            JSON_KV,
            Some("{\"k\":\"\\ud83c\"}"),
            ErrorKind::InvalidEscape,
        ),
        error(
            "high_surrogate_then_text",
            JSON_KV,
            Some("{\"k\":\"\\ud83cabc\"}"),
            ErrorKind::InvalidEscape,
        ),
        error(
            "lone_low_surrogate",
            JSON_KV,
            Some("{\"k\":\"\\udf09\"}"),
            ErrorKind::InvalidEscape,
        ),
        error(
            "short_unicode_escape",
            JSON_KV,
            Some("{\"k\":\"\\u12\"}"),
            ErrorKind::InvalidEscape,
        ),
        error(
            "unknown_json_escape",
            JSON_KV,
            Some(r#"{"k":"\x41"}"#),
            ErrorKind::InvalidEscape,
        ),
        error(
            "missing_bracket",
            COMBINED_FORMAT,
            Some(r#"1.2.3.4 - - 14/Oct/2026 "GET /" 200 0 "-" "-""#),
            ErrorKind::FormatMismatch,
        ),
        error(
            "trailing_garbage",
            "[$a]",
            Some("[x]y"),
            ErrorKind::FormatMismatch,
        ),
    ]
}

/// Combined collection of all vectors.
#[derive(Debug, Serialize, Deserialize)]
pub struct AllVectors {
    /// Vectors that must parse.
    pub format: Vec<FormatVector>,
    /// Vectors that must fail.
    pub errors: Vec<ErrorVector>,
}

/// Export all vectors as pretty-printed JSON.
///
/// # Errors
///
/// Returns the serializer error if encoding fails.
pub fn all_vectors_json() -> serde_json::Result<String> {
    let vectors = AllVectors {
        format: format_vectors(),
        errors: error_vectors(),
    };
    serde_json::to_string_pretty(&vectors)
}
