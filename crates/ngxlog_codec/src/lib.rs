//! # ngxlog codec
//!
//! Bidirectional codec for nginx-style access-log lines.
//!
//! A template in the style of the `log_format` directive mixes literal text
//! with `$name` placeholders. It is compiled once into a [`CompiledFormat`],
//! which then renders records into lines and parses lines back into records.
//!
//! ## Template grammar
//!
//! - An optional leading `escape=json;` selects JSON string escaping for
//!   variable values. Without it, a backslash escapes the next character.
//! - `$name` is a placeholder; names are letters, digits and underscores.
//! - `$$` is a literal `$`, as is a `$` not followed by a name character.
//! - Two placeholders must be separated by literal text.
//!
//! ## Usage
//!
//! ```
//! use ngxlog_codec::{compile, Fields};
//!
//! let format = compile(r#"$remote_addr [$time_local] "$request""#).unwrap();
//! let fields = format
//!     .parse(r#"10.0.0.1 [01/Jan/2024:00:00:00 +0000] "GET / HTTP/1.1""#)
//!     .unwrap();
//! assert_eq!(fields.get("request"), Some("GET / HTTP/1.1"));
//!
//! let line = format.render(&fields);
//! assert_eq!(line, r#"10.0.0.1 [01/Jan/2024:00:00:00 +0000] "GET / HTTP/1.1""#);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;
pub mod escape;
mod format;
mod record;

pub use error::{CodecError, CodecResult};
pub use format::{compile, CompiledFormat, EscapeMode, Segment, COMBINED_FORMAT};
pub use record::{FieldSink, FieldSource, Fields};

/// Parse a line in the combined access-log format.
///
/// # Errors
///
/// See [`CompiledFormat::parse`].
pub fn parse(data: &str) -> CodecResult<Fields> {
    CompiledFormat::combined().parse(data)
}

/// Render a record in the combined access-log format.
pub fn render<R: FieldSource + ?Sized>(record: &R) -> String {
    CompiledFormat::combined().render(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combined_helpers_roundtrip() {
        let line = r#"::1 - alice [14/Oct/2026:09:00:00 +0000] "POST /api HTTP/2.0" 201 17 "-" "curl/8.5.0""#;
        let fields = parse(line).unwrap();
        assert_eq!(fields.get("remote_user"), Some("alice"));
        assert_eq!(render(&fields), line);
    }

    #[test]
    fn compiled_format_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CompiledFormat>();

        let format = std::sync::Arc::new(compile("$a|$b").unwrap());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let format = std::sync::Arc::clone(&format);
                std::thread::spawn(move || {
                    let line = format!("{i}|x");
                    let fields = format.parse(&line).unwrap();
                    format.render(&fields) == line
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
