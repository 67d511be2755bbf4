//! Template compilation.
//!
//! A template such as `$remote_addr - [$time_local] "$request"` is compiled
//! once into a [`CompiledFormat`]: an ordered list of [`Segment`]s plus the
//! [`EscapeMode`] selected by an optional leading `escape=json;` directive.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use tracing::debug;

use crate::error::{CodecError, CodecResult};

/// The combined access-log format.
pub const COMBINED_FORMAT: &str = r#"$remote_addr - $remote_user [$time_local] "$request" $status $body_bytes_sent "$http_referer" "$http_user_agent""#;

const ESCAPE_DIRECTIVE: &str = "escape=";

/// How variable values are escaped in the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EscapeMode {
    /// A backslash escapes the character after it.
    #[default]
    Plain,
    /// Values are JSON string contents.
    JsonString,
}

impl EscapeMode {
    /// Look up a mode by the name used in the `escape=` directive.
    pub fn from_name(name: &str) -> CodecResult<Self> {
        match name {
            "json" => Ok(Self::JsonString),
            other => Err(CodecError::unknown_escape_mode(other)),
        }
    }
}

/// One piece of a compiled template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Text that must appear verbatim in the data.
    Literal(String),
    /// A named placeholder.
    Variable(String),
}

impl Segment {
    /// The literal text, if this is a literal segment.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Segment::Literal(text) => Some(text),
            Segment::Variable(_) => None,
        }
    }

    /// The variable name, if this is a variable segment.
    pub fn as_variable(&self) -> Option<&str> {
        match self {
            Segment::Variable(name) => Some(name),
            Segment::Literal(_) => None,
        }
    }
}

/// A compiled template.
///
/// Immutable after [`compile`]; share it freely between threads and reuse it
/// for any number of parse and render calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompiledFormat {
    segments: Vec<Segment>,
    mode: EscapeMode,
}

/// Compile a template into a reusable [`CompiledFormat`].
///
/// # Errors
///
/// Returns [`CodecError::UnknownEscapeMode`] if an `escape=` directive names
/// an unsupported mode, and [`CodecError::AmbiguousTemplate`] if two
/// variables are not separated by literal text.
pub fn compile(template: &str) -> CodecResult<CompiledFormat> {
    let (mode, body) = split_directive(template)?;
    let segments = scan_segments(body);
    validate(&segments)?;

    let format = CompiledFormat { segments, mode };
    debug!(
        segments = format.segments.len(),
        variables = format.variables().count(),
        mode = ?format.mode,
        "compiled log format"
    );
    Ok(format)
}

fn split_directive(template: &str) -> CodecResult<(EscapeMode, &str)> {
    let Some(rest) = template.strip_prefix(ESCAPE_DIRECTIVE) else {
        return Ok((EscapeMode::Plain, template));
    };
    match rest.split_once(';') {
        Some((name, body)) => Ok((EscapeMode::from_name(name)?, body)),
        // No terminating `;`: the text is not a directive at all.
        None => Ok((EscapeMode::Plain, template)),
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn scan_segments(body: &str) -> Vec<Segment> {
    let bytes = body.as_bytes();
    let mut segments = Vec::new();
    let mut pending = String::new();
    let mut literal_start = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] != b'$' {
            pos += 1;
            continue;
        }
        pending.push_str(&body[literal_start..pos]);

        if bytes.get(pos + 1) == Some(&b'$') {
            pending.push('$');
            pos += 2;
        } else {
            let name_len = bytes[pos + 1..]
                .iter()
                .take_while(|&&b| is_ident_byte(b))
                .count();
            if name_len == 0 {
                pending.push('$');
                pos += 1;
            } else {
                if !pending.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut pending)));
                }
                segments.push(Segment::Variable(
                    body[pos + 1..pos + 1 + name_len].to_string(),
                ));
                pos += 1 + name_len;
            }
        }
        literal_start = pos;
    }

    pending.push_str(&body[literal_start..]);
    if !pending.is_empty() {
        segments.push(Segment::Literal(pending));
    }
    segments
}

fn validate(segments: &[Segment]) -> CodecResult<()> {
    for pair in segments.windows(2) {
        if let (Segment::Variable(first), Segment::Variable(second)) = (&pair[0], &pair[1]) {
            return Err(CodecError::ambiguous_template(first, second));
        }
    }
    Ok(())
}

impl CompiledFormat {
    /// The process-wide compiled [`COMBINED_FORMAT`].
    pub fn combined() -> &'static CompiledFormat {
        static COMBINED: OnceLock<CompiledFormat> = OnceLock::new();
        COMBINED.get_or_init(|| CompiledFormat {
            segments: scan_segments(COMBINED_FORMAT),
            mode: EscapeMode::Plain,
        })
    }

    /// The segments in template order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The escape mode.
    pub fn mode(&self) -> EscapeMode {
        self.mode
    }

    /// Variable names in template order. A name used twice appears twice.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(Segment::as_variable)
    }
}

impl FromStr for CompiledFormat {
    type Err = CodecError;

    fn from_str(template: &str) -> CodecResult<Self> {
        compile(template)
    }
}

/// Writes a template that compiles back to the same segments.
impl fmt::Display for CompiledFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mode == EscapeMode::JsonString {
            f.write_str("escape=json;")?;
        }
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => f.write_str(&text.replace('$', "$$"))?,
                Segment::Variable(name) => write!(f, "${name}")?,
            }
        }
        Ok(())
    }
}
