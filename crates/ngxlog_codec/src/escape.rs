//! Backslash escape handling for variable values.
//!
//! Decoding works on one escaped token at a time: the caller positions the
//! cursor on a backslash and gets back the number of bytes the token spans.
//! Encoding rewrites a whole value.

use crate::error::{CodecError, CodecResult};

const HIGH_SURROGATES: std::ops::RangeInclusive<u16> = 0xD800..=0xDBFF;
const LOW_SURROGATES: std::ops::RangeInclusive<u16> = 0xDC00..=0xDFFF;

/// Decode the JSON string escape starting at `pos` (which must hold a
/// backslash) and append the decoded text to `out`.
///
/// Returns the number of bytes consumed from `data`. A `\uHHHH` high
/// surrogate consumes the `\uHHHH` low surrogate after it as well.
///
/// # Errors
///
/// Returns [`CodecError::InvalidEscape`] for an unknown escape letter, a
/// truncated `\u` escape, or a surrogate that is not part of a valid pair.
pub fn decode_json_escape(data: &str, pos: usize, out: &mut String) -> CodecResult<usize> {
    let bytes = data.as_bytes();
    debug_assert_eq!(bytes.get(pos), Some(&b'\\'));

    let Some(&letter) = bytes.get(pos + 1) else {
        return Err(CodecError::invalid_escape(pos, "trailing backslash"));
    };

    let decoded = match letter {
        b'"' => '"',
        b'\\' => '\\',
        b'/' => '/',
        b'b' => '\u{0008}',
        b'f' => '\u{000C}',
        b'n' => '\n',
        b'r' => '\r',
        b't' => '\t',
        b'u' => return decode_unicode_escape(bytes, pos, out),
        _ => {
            let shown = data[pos + 1..].chars().next().unwrap_or_default();
            return Err(CodecError::invalid_escape(
                pos,
                format!("unsupported escape \\{shown}"),
            ));
        }
    };
    out.push(decoded);
    Ok(2)
}

fn decode_unicode_escape(bytes: &[u8], pos: usize, out: &mut String) -> CodecResult<usize> {
    let unit = read_hex4(bytes, pos + 2)
        .ok_or_else(|| CodecError::invalid_escape(pos, "\\u escape needs 4 hex digits"))?;

    if LOW_SURROGATES.contains(&unit) {
        return Err(CodecError::invalid_escape(
            pos,
            format!("lone low surrogate \\u{unit:04x}"),
        ));
    }

    if !HIGH_SURROGATES.contains(&unit) {
        // Every non-surrogate UTF-16 unit is a scalar value.
        let ch = char::from_u32(u32::from(unit))
            .ok_or_else(|| CodecError::invalid_escape(pos, "invalid code point"))?;
        out.push(ch);
        return Ok(6);
    }

    let low = match (bytes.get(pos + 6), bytes.get(pos + 7)) {
        (Some(b'\\'), Some(b'u')) => read_hex4(bytes, pos + 8),
        _ => None,
    };
    let low = low.filter(|unit| LOW_SURROGATES.contains(unit)).ok_or_else(|| {
        CodecError::invalid_escape(
            pos,
            format!("high surrogate \\u{unit:04x} not followed by a low surrogate"),
        )
    })?;

    let scalar = 0x10000 + (u32::from(unit) - 0xD800) * 0x400 + (u32::from(low) - 0xDC00);
    let ch = char::from_u32(scalar)
        .ok_or_else(|| CodecError::invalid_escape(pos, "invalid surrogate pair"))?;
    out.push(ch);
    Ok(12)
}

/// Read exactly four ASCII hex digits starting at `at`.
fn read_hex4(bytes: &[u8], at: usize) -> Option<u16> {
    let digits = bytes.get(at..at + 4)?;
    digits.iter().try_fold(0u16, |acc, &b| {
        let nibble = (b as char).to_digit(16)?;
        // Four nibbles never overflow a u16.
        Some((acc << 4) | nibble as u16)
    })
}

/// Decode the generic escape starting at `pos`: the backslash is dropped and
/// the following character is kept as-is.
///
/// Returns the number of bytes consumed. A backslash at the very end of the
/// data has nothing to escape and is kept literally.
pub fn decode_plain_escape(data: &str, pos: usize, out: &mut String) -> usize {
    match data[pos + 1..].chars().next() {
        Some(ch) => {
            out.push(ch);
            1 + ch.len_utf8()
        }
        None => {
            out.push('\\');
            1
        }
    }
}

/// Append `value` to `out`, writing the seven named JSON escapes.
///
/// Everything else, including other control characters and non-ASCII text,
/// is copied through unchanged.
pub fn escape_json(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch => out.push(ch),
        }
    }
}

/// Append `value` to `out`, protecting backslashes and double quotes with a
/// backslash so that [`decode_plain_escape`] restores them.
pub fn escape_plain(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            ch => out.push(ch),
        }
    }
}
