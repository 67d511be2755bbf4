//! Fuzz testing harnesses.
//!
//! These targets can be driven by cargo-fuzz or any other byte-slice fuzzer.

use ngxlog_codec::{compile, CompiledFormat};

/// Fuzz target for template compilation.
///
/// Arbitrary templates either compile or fail with a compile error, and a
/// compiled template survives a trip through its `Display` form.
pub fn fuzz_compile(data: &[u8]) {
    let Ok(template) = std::str::from_utf8(data) else {
        return;
    };
    match compile(template) {
        Ok(format) => {
            let again = compile(&format.to_string()).expect("canonical template must compile");
            assert_eq!(format, again, "canonical template changed segments");
        }
        Err(err) => assert!(err.is_compile_error(), "unexpected error {err:?}"),
    }
}

/// Fuzz target for parsing with the combined format.
///
/// A line that parses must render to a line that parses again. The second
/// parse may split differently: the first line could have escaped a literal's
/// text inside a value, which renders without the escape.
pub fn fuzz_parse_combined(data: &[u8]) {
    fuzz_parse_with(CompiledFormat::combined(), data);
}

/// Fuzz target for parsing with a JSON-mode format.
pub fn fuzz_parse_json(data: &[u8]) {
    let format = compile(r#"escape=json;{"key":"$key","value":"$value"}"#)
        .expect("fixed template compiles");
    fuzz_parse_with(&format, data);
}

fn fuzz_parse_with(format: &CompiledFormat, data: &[u8]) {
    match format.parse_bytes(data) {
        Ok(fields) => {
            let rendered = format.render(&fields);
            let reparsed = format.parse(&rendered);
            assert!(reparsed.is_ok(), "rendered line {rendered:?} failed: {reparsed:?}");
        }
        Err(err) => assert!(err.is_parse_error(), "unexpected error {err:?}"),
    }
}
