//! Line parsing.
//!
//! Variable boundaries are recovered from the literal text around each
//! variable. A value is read token by token (an escaped pair or a single
//! character), and may stop at any token boundary where the next literal
//! matches, provided the rest of the template then matches through to the end
//! of the line. The earliest such boundary wins, except when the literal
//! itself starts with a backslash: there the escaped-pair reading is preferred
//! and boundaries are tried from the latest one back.
//!
//! Tokenizing is memoryless, so every start offset of a variable walks a
//! suffix of the same boundary chain. The chosen stop of each
//! (segment, offset) state is memoised and walks end as soon as they reach a
//! known state, which keeps a parse within O(segments × line length) steps.
//! Values are only decoded once the whole line has matched.

use std::collections::HashMap;

use tracing::trace;

use crate::error::{CodecError, CodecResult};
use crate::escape::{decode_json_escape, decode_plain_escape};
use crate::format::{CompiledFormat, EscapeMode, Segment};
use crate::record::{FieldSink, Fields};

impl CompiledFormat {
    /// Parse a line into an ordered record.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::FormatMismatch`] if the line does not conform to
    /// this format, or [`CodecError::InvalidEscape`] for a bad JSON escape.
    pub fn parse(&self, data: &str) -> CodecResult<Fields> {
        let mut fields = Fields::new();
        self.parse_into(data, &mut fields)?;
        Ok(fields)
    }

    /// Parse raw bytes, which must be UTF-8.
    ///
    /// # Errors
    ///
    /// As [`parse`](Self::parse), plus [`CodecError::InvalidUtf8`].
    pub fn parse_bytes(&self, data: &[u8]) -> CodecResult<Fields> {
        let data = std::str::from_utf8(data).map_err(|_| CodecError::InvalidUtf8)?;
        self.parse(data)
    }

    /// Parse a line and store every variable into `sink`.
    ///
    /// Nothing is written to `sink` unless the whole line matches.
    ///
    /// # Errors
    ///
    /// As [`parse`](Self::parse).
    pub fn parse_into<S: FieldSink + ?Sized>(&self, data: &str, sink: &mut S) -> CodecResult<()> {
        for (name, value) in Extractor::new(self, data).extract()? {
            sink.set_field(name, value);
        }
        Ok(())
    }
}

/// Matches one line against a compiled format.
pub(crate) struct Extractor<'a> {
    segments: &'a [Segment],
    mode: EscapeMode,
    data: &'a str,
    // Stop offset chosen for a variable segment entered at an offset, or
    // `None` when no stop lets the rest of the line match.
    stops: HashMap<(usize, usize), Option<usize>>,
    furthest: Option<(usize, CodecError)>,
}

impl<'a> Extractor<'a> {
    pub(crate) fn new(format: &'a CompiledFormat, data: &'a str) -> Self {
        Self {
            segments: format.segments(),
            mode: format.mode(),
            data,
            stops: HashMap::new(),
            furthest: None,
        }
    }

    /// Run the match, returning `(name, value)` pairs in template order.
    ///
    /// On failure the error that got furthest into the line is returned.
    pub(crate) fn extract(mut self) -> CodecResult<Vec<(&'a str, String)>> {
        if self.match_from(0, 0) {
            return Ok(self.collect_values());
        }
        let (segment, err) = self.furthest.take().unwrap_or_else(|| {
            (0, CodecError::format_mismatch(0, "line does not match format"))
        });
        trace!(segment, offset = error_offset(&err), error = %err, "log line rejected");
        Err(err)
    }

    fn match_from(&mut self, seg: usize, pos: usize) -> bool {
        let segments = self.segments;
        match segments.get(seg) {
            None if pos == self.data.len() => true,
            None => {
                self.fail(seg, CodecError::format_mismatch(pos, "unexpected trailing data"));
                false
            }
            Some(Segment::Literal(text)) => {
                if self.data[pos..].starts_with(text.as_str()) {
                    self.match_from(seg + 1, pos + text.len())
                } else {
                    self.fail(seg, CodecError::format_mismatch(pos, format!("expected {text:?}")));
                    false
                }
            }
            Some(Segment::Variable(_)) => self.match_variable(seg, pos),
        }
    }

    /// Find the stop of the variable at `seg` entered at `start`.
    fn match_variable(&mut self, seg: usize, start: usize) -> bool {
        let segments = self.segments;
        let terminator = segments.get(seg + 1).and_then(Segment::as_literal);
        let latest_first = terminator.is_some_and(|t| t.starts_with('\\'));
        let mut walked = Vec::new();
        let mut scratch = String::new();
        let mut cursor = start;

        let mut found = loop {
            if let Some(&known) = self.stops.get(&(seg, cursor)) {
                break known;
            }
            walked.push(cursor);
            if !latest_first && self.can_stop(seg, terminator, cursor) {
                break Some(cursor);
            }
            if cursor == self.data.len() {
                if let (Some(Segment::Variable(name)), Some(_)) = (segments.get(seg), terminator) {
                    self.fail(
                        seg,
                        CodecError::format_mismatch(cursor, format!("unterminated value for ${name}")),
                    );
                }
                break None;
            }
            scratch.clear();
            match read_token(self.mode, self.data, cursor, &mut scratch) {
                Ok(len) => cursor += len,
                Err(err) => {
                    self.fail(seg, err);
                    break None;
                }
            }
        };

        if latest_first {
            for &at in walked.iter().rev() {
                if found.is_none() && self.can_stop(seg, terminator, at) {
                    found = Some(at);
                }
                self.stops.insert((seg, at), found);
            }
        } else {
            for at in walked {
                self.stops.insert((seg, at), found);
            }
        }
        found.is_some()
    }

    /// Whether the variable at `seg` may end at `at`.
    fn can_stop(&mut self, seg: usize, terminator: Option<&str>, at: usize) -> bool {
        match terminator {
            Some(text) => {
                self.data[at..].starts_with(text) && self.match_from(seg + 2, at + text.len())
            }
            None => at == self.data.len(),
        }
    }

    /// Decode every variable along the matched path.
    fn collect_values(&self) -> Vec<(&'a str, String)> {
        let segments = self.segments;
        let mut values = Vec::new();
        let mut pos = 0;
        for (seg, segment) in segments.iter().enumerate() {
            match segment {
                Segment::Literal(text) => pos += text.len(),
                Segment::Variable(name) => {
                    let stop = self.stops.get(&(seg, pos)).copied().flatten().unwrap_or(pos);
                    let mut value = String::new();
                    while pos < stop {
                        match read_token(self.mode, self.data, pos, &mut value) {
                            Ok(len) if len > 0 => pos += len,
                            _ => break,
                        }
                    }
                    values.push((name.as_str(), value));
                    pos = stop;
                }
            }
        }
        values
    }

    fn fail(&mut self, seg: usize, err: CodecError) {
        let offset = error_offset(&err);
        if self
            .furthest
            .as_ref()
            .is_none_or(|(_, prev)| offset > error_offset(prev))
        {
            self.furthest = Some((seg, err));
        }
    }
}

/// Decode one token at `cursor` into `out`, returning its byte length.
fn read_token(mode: EscapeMode, data: &str, cursor: usize, out: &mut String) -> CodecResult<usize> {
    match data[cursor..].chars().next() {
        Some('\\') => match mode {
            EscapeMode::Plain => Ok(decode_plain_escape(data, cursor, out)),
            EscapeMode::JsonString => decode_json_escape(data, cursor, out),
        },
        Some(ch) => {
            out.push(ch);
            Ok(ch.len_utf8())
        }
        None => Ok(0),
    }
}

fn error_offset(err: &CodecError) -> usize {
    match err {
        CodecError::FormatMismatch { offset, .. } | CodecError::InvalidEscape { offset, .. } => {
            *offset
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::format::{compile, COMBINED_FORMAT};

    // Far above what a linear walk needs, far below a quadratic one.
    const LONG_LINE_BUDGET: Duration = Duration::from_secs(5);

    fn json_kv() -> CompiledFormat {
        compile(r#"escape=json;{"$key":"$value"}"#).unwrap()
    }

    #[test]
    fn parse_combined_line() {
        let line = r#"203.0.113.9 - - [10/Oct/2000:13:55:36 -0700] "GET /apache_pb.gif HTTP/1.0" 200 2326 "http://www.example.com/start.html" "Mozilla/4.08 [en] (Win98; I ;Nav)""#;
        let fields = CompiledFormat::combined().parse(line).unwrap();
        assert_eq!(fields.get("remote_addr"), Some("203.0.113.9"));
        assert_eq!(fields.get("remote_user"), Some("-"));
        assert_eq!(fields.get("time_local"), Some("10/Oct/2000:13:55:36 -0700"));
        assert_eq!(fields.get("request"), Some("GET /apache_pb.gif HTTP/1.0"));
        assert_eq!(fields.get("status"), Some("200"));
        assert_eq!(fields.get("body_bytes_sent"), Some("2326"));
        assert_eq!(
            fields.get("http_user_agent"),
            Some("Mozilla/4.08 [en] (Win98; I ;Nav)")
        );
        assert_eq!(
            fields.iter().map(|(k, _)| k).collect::<Vec<_>>(),
            CompiledFormat::combined().variables().collect::<Vec<_>>()
        );
    }

    #[test]
    fn parse_template_text_as_data() {
        let fields = CompiledFormat::combined().parse(COMBINED_FORMAT).unwrap();
        assert_eq!(fields.get("status"), Some("$status"));
        assert_eq!(fields.get("http_user_agent"), Some("$http_user_agent"));
    }

    #[test]
    fn escaped_quote_does_not_end_value() {
        let format = compile(r#""$request" $status"#).unwrap();
        let fields = format.parse(r#""GET /\"x\" HTTP/1.1" 200"#).unwrap();
        assert_eq!(fields.get("request"), Some(r#"GET /"x" HTTP/1.1"#));
        assert_eq!(fields.get("status"), Some("200"));
    }

    #[test]
    fn backslash_delimiters() {
        let format = compile(r"\$request\$request_body\$header_cookie\").unwrap();
        let fields = format.parse(r"\request\request_body\header_cookie\").unwrap();
        assert_eq!(fields.get("request"), Some("request"));
        assert_eq!(fields.get("request_body"), Some("request_body"));
        assert_eq!(fields.get("header_cookie"), Some("header_cookie"));
    }

    #[test]
    fn delimiter_inside_escaped_value_backtracks() {
        let format = compile(r#"\$request\"$request_body\"\"$header_cookie\""#).unwrap();
        let fields = format
            .parse(r#"\requ\\\"est\"request_body\"\"header_cookie\""#)
            .unwrap();
        assert_eq!(fields.get("request"), Some(r#"requ\"est"#));
        assert_eq!(fields.get("request_body"), Some("request_body"));
        assert_eq!(fields.get("header_cookie"), Some("header_cookie"));
    }

    #[test]
    fn later_delimiter_wins_when_earlier_fails() {
        let format = compile("$a-$b.").unwrap();
        let fields = format.parse("x-y-z.").unwrap();
        assert_eq!(fields.get("a"), Some("x"));
        assert_eq!(fields.get("b"), Some("y-z"));

        let format = compile("$a-$b|").unwrap();
        let fields = format.parse("x-y|-z|").unwrap();
        assert_eq!(fields.get("a"), Some("x"));
        assert_eq!(fields.get("b"), Some("y|-z"));
    }

    #[test]
    fn json_unicode_escapes() {
        let data = "{\"\\u0024k\\u0065y\":\"\\r\\f\\t\\uf755\\n\"}";
        let fields = json_kv().parse(data).unwrap();
        assert_eq!(fields.get("key"), Some("$key"));
        assert_eq!(fields.get("value"), Some("\r\u{c}\t\u{f755}\n"));
    }

    #[test]
    fn json_surrogate_pairs() {
        let data = "{\"\\u0024k\\u0065\\u0079\":\"\\ud83c\\udf09\\ud83c\\udf09is\\u0020surrogate\\u0020pair\"}";
        let fields = json_kv().parse(data).unwrap();
        assert_eq!(fields.get("key"), Some("$key"));
        assert_eq!(fields.get("value"), Some("\u{1f309}\u{1f309}is surrogate pair"));
    }

    #[test]
    fn json_escaped_quote_before_closing_literal() {
        let data = "{\"k\":\"\\ud83c\\udf09\\\"\"}";
        let fields = json_kv().parse(data).unwrap();
        assert_eq!(fields.get("value"), Some("\u{1f309}\""));
    }

    #[test]
    fn json_lone_surrogate_rejected() {
        let data = "{\"k\":\"\\ud83c\"}";
        assert!(matches!(
            json_kv().parse(data),
            Err(CodecError::InvalidEscape { offset: 6, .. })
        ));
    }

    #[test]
    fn json_unknown_escape_rejected() {
        assert!(matches!(
            json_kv().parse(r#"{"k":"\q"}"#),
            Err(CodecError::InvalidEscape { .. })
        ));
    }

    #[test]
    fn plain_mode_generic_escape() {
        let format = compile("[$a]").unwrap();
        assert_eq!(format.parse(r"[\q\]]").unwrap().get("a"), Some("q]"));
    }

    #[test]
    fn raw_multibyte_copied() {
        let format = compile("<$a>").unwrap();
        assert_eq!(format.parse("<héllo 🌉>").unwrap().get("a"), Some("héllo 🌉"));
    }

    #[test]
    fn empty_values() {
        let format = compile("$a:$b").unwrap();
        let fields = format.parse(":").unwrap();
        assert_eq!(fields.get("a"), Some(""));
        assert_eq!(fields.get("b"), Some(""));
    }

    #[test]
    fn literal_mismatch() {
        let format = compile("[$a] $b").unwrap();
        assert!(matches!(
            format.parse("(x) y"),
            Err(CodecError::FormatMismatch { offset: 0, .. })
        ));
    }

    #[test]
    fn missing_terminator() {
        let format = compile("[$a]").unwrap();
        assert!(matches!(
            format.parse("[abc"),
            Err(CodecError::FormatMismatch { offset: 4, .. })
        ));
    }

    #[test]
    fn trailing_data_rejected() {
        let format = compile("$a]").unwrap();
        assert!(matches!(
            format.parse("x]y"),
            Err(CodecError::FormatMismatch { .. })
        ));
        assert!(compile("").unwrap().parse("").unwrap().is_empty());
        assert!(compile("").unwrap().parse("x").is_err());
    }

    #[test]
    fn failed_parse_leaves_sink_untouched() {
        let format = compile("$a-$b.").unwrap();
        let mut sink = Fields::new();
        assert!(format.parse_into("x-y", &mut sink).is_err());
        assert!(sink.is_empty());
        // The format stays usable.
        assert_eq!(format.parse("x-y.").unwrap().get("b"), Some("y"));
    }

    #[test]
    fn parse_into_map() {
        let mut map: std::collections::HashMap<String, String> = Default::default();
        compile("$a=$b").unwrap().parse_into("k=v", &mut map).unwrap();
        assert_eq!(map.get("a").map(String::as_str), Some("k"));
        assert_eq!(map.get("b").map(String::as_str), Some("v"));
    }

    #[test]
    fn parse_bytes_checks_utf8() {
        let format = compile("<$a>").unwrap();
        assert_eq!(format.parse_bytes(b"<x>").unwrap().get("a"), Some("x"));
        assert_eq!(
            format.parse_bytes(&[b'<', 0xff, b'>']),
            Err(CodecError::InvalidUtf8)
        );
    }

    #[test]
    fn repeated_variable_keeps_last() {
        let format = compile("$a/$a").unwrap();
        let fields = format.parse("x/y").unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get("a"), Some("y"));
    }

    #[test]
    fn json_backslash_terminator_prefers_latest_stop() {
        let format = compile(r#"escape=json;$a\"$b"#).unwrap();
        let fields = format.parse(r#"x\"y\"z"#).unwrap();
        assert_eq!(fields.get("a"), Some(r#"x"y"#));
        assert_eq!(fields.get("b"), Some("z"));
    }

    #[test]
    fn earlier_backslash_stop_used_when_latest_fails() {
        let format = compile(r#"$a\"$b;$c"#).unwrap();
        let fields = format.parse(r#"x\"y;z\"w"#).unwrap();
        assert_eq!(fields.get("a"), Some("x"));
        assert_eq!(fields.get("b"), Some("y"));
        assert_eq!(fields.get("c"), Some(r#"z"w"#));
    }

    #[test]
    fn long_mismatched_combined_line_is_rejected_quickly() {
        let line = format!("1 - u [t] \"r\" {}", "\" ".repeat(20_000));
        let started = Instant::now();
        assert!(CompiledFormat::combined().parse(&line).is_err());
        assert!(started.elapsed() < LONG_LINE_BUDGET);
    }

    #[test]
    fn long_runs_of_separators_are_linear() {
        let format = compile("$a $b $c $d!").unwrap();
        let spaces = " ".repeat(20_000);

        let started = Instant::now();
        assert!(matches!(
            format.parse(&spaces),
            Err(CodecError::FormatMismatch { offset: 20_000, .. })
        ));
        let fields = format.parse(&format!("{spaces}!")).unwrap();
        assert_eq!(fields.get("a"), Some(""));
        assert_eq!(fields.get("d").map(str::len), Some(20_000 - 3));
        assert!(started.elapsed() < LONG_LINE_BUDGET);
    }

    #[test]
    fn long_escaped_backslash_run_is_linear() {
        let format = compile(r#"\$a\"$b!"#).unwrap();
        let line = format!("\\{}", "\\\"".repeat(20_000));

        let started = Instant::now();
        assert!(format.parse(&line).is_err());
        let fields = format.parse(&format!("{line}!")).unwrap();
        assert_eq!(fields.get("a").map(str::len), Some(19_999));
        assert_eq!(fields.get("b"), Some(""));
        assert!(started.elapsed() < LONG_LINE_BUDGET);
    }
}
