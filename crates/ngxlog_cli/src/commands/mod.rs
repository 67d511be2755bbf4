//! CLI command implementations.

pub mod check;
pub mod parse;
pub mod render;

use std::io::{self, BufRead, Read};

use tracing::warn;

use crate::config::CliConfig;
use crate::error::CliError;

/// Outcome of a line-oriented command.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Lines written to the output.
    pub processed: usize,
    /// Lines skipped because they failed.
    pub skipped: usize,
}

/// Feeds each input line to `handle`, applying the length limit and the
/// skip policy from `config`. Line terminators (`\n` or `\r\n`) are removed
/// and blank lines are ignored. At most `max_line_len` bytes of a line (plus
/// its terminator) are buffered; the rest of an over-long line is discarded
/// unread.
pub(crate) fn for_each_line<R, F>(
    mut input: R,
    config: &CliConfig,
    mut handle: F,
) -> Result<Summary, CliError>
where
    R: BufRead,
    F: FnMut(usize, &[u8]) -> Result<(), CliError>,
{
    let max = config.max_line_len;
    // Longest accepted line plus a `\r\n` terminator.
    let limit = (max as u64).saturating_add(2);
    let mut summary = Summary::default();
    let mut buf = Vec::new();
    let mut line_no = 0;

    loop {
        buf.clear();
        let read = (&mut input).take(limit).read_until(b'\n', &mut buf)?;
        if read == 0 {
            break;
        }
        line_no += 1;
        let truncated = buf.last() != Some(&b'\n') && read as u64 == limit;
        let line = buf.strip_suffix(b"\n").unwrap_or(&buf);
        let line = line.strip_suffix(b"\r").unwrap_or(line);

        let result = if truncated {
            Err(CliError::LineTooLong {
                line: line_no,
                len: buf.len() + skip_line(&mut input)?,
                max,
            })
        } else if line.is_empty() {
            continue;
        } else if line.len() > max {
            Err(CliError::LineTooLong {
                line: line_no,
                len: line.len(),
                max,
            })
        } else {
            handle(line_no, line)
        };

        match result {
            Ok(()) => summary.processed += 1,
            Err(err) if config.skip_invalid && err.is_line_error() => {
                warn!(error = %err, "skipping line");
                summary.skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }
    Ok(summary)
}

/// Discard input through the next `\n`, returning how many bytes came
/// before it.
fn skip_line<R: BufRead>(input: &mut R) -> io::Result<usize> {
    let mut skipped = 0;
    loop {
        let chunk = input.fill_buf()?;
        if chunk.is_empty() {
            return Ok(skipped);
        }
        match chunk.iter().position(|&b| b == b'\n') {
            Some(end) => {
                input.consume(end + 1);
                return Ok(skipped + end);
            }
            None => {
                let len = chunk.len();
                input.consume(len);
                skipped += len;
            }
        }
    }
}
