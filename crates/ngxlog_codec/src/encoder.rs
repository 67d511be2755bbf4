//! Record rendering.

use std::fmt::Write;

use crate::error::CodecResult;
use crate::escape::{escape_json, escape_plain};
use crate::format::{CompiledFormat, EscapeMode, Segment};
use crate::record::FieldSource;

impl CompiledFormat {
    /// Render a record as a log line.
    ///
    /// A variable with no matching field renders as empty text.
    pub fn render<R: FieldSource + ?Sized>(&self, record: &R) -> String {
        let mut out = String::with_capacity(self.estimated_len());
        self.render_values(record, &mut out);
        out
    }

    /// Render a record into `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Sink`](crate::CodecError::Sink) if the sink
    /// rejects the text.
    pub fn render_to<R, W>(&self, record: &R, sink: &mut W) -> CodecResult<()>
    where
        R: FieldSource + ?Sized,
        W: Write + ?Sized,
    {
        sink.write_str(&self.render(record))?;
        Ok(())
    }

    fn render_values<R: FieldSource + ?Sized>(&self, record: &R, out: &mut String) {
        for segment in self.segments() {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Variable(name) => {
                    let Some(value) = record.field(name) else {
                        continue;
                    };
                    match self.mode() {
                        EscapeMode::Plain => escape_plain(&value, out),
                        EscapeMode::JsonString => escape_json(&value, out),
                    }
                }
            }
        }
    }

    fn estimated_len(&self) -> usize {
        self.segments()
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => text.len(),
                Segment::Variable(_) => 16,
            })
            .sum()
    }
}
