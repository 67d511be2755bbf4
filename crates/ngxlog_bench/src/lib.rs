//! Benchmark utilities.

use ngxlog_codec::{CompiledFormat, Fields};
use rand::seq::SliceRandom;
use rand::Rng;

const METHODS: &[&str] = &["GET", "POST", "HEAD", "PUT"];
const AGENTS: &[&str] = &[
    "Mozilla/5.0 (X11; Linux x86_64; rv:131.0) Gecko/20100101 Firefox/131.0",
    "curl/8.5.0",
    "Mozilla/5.0 (compatible; \"quoted\" bot/2.1; +http://example.com/bot)",
];

/// Generate a random combined-format record.
pub fn random_combined_record<R: Rng>(rng: &mut R) -> Fields {
    let addr = format!(
        "{}.{}.{}.{}",
        rng.gen::<u8>(),
        rng.gen::<u8>(),
        rng.gen::<u8>(),
        rng.gen::<u8>()
    );
    let method = METHODS.choose(rng).copied().unwrap_or("GET");
    let path: String = (0..rng.gen_range(1..30))
        .map(|_| rng.gen_range(b'a'..=b'z') as char)
        .collect();
    let agent = AGENTS.choose(rng).copied().unwrap_or("-");
    [
        ("remote_addr", addr),
        ("remote_user", "-".to_string()),
        ("time_local", "14/Oct/2026:10:00:00 +0000".to_string()),
        ("request", format!("{method} /{path} HTTP/1.1")),
        ("status", rng.gen_range(200..600u16).to_string()),
        ("body_bytes_sent", rng.gen_range(0..1_000_000u32).to_string()),
        ("http_referer", "-".to_string()),
        ("http_user_agent", agent.to_string()),
    ]
    .into_iter()
    .collect()
}

/// Generate `count` rendered combined-format lines.
pub fn combined_lines(count: usize) -> Vec<String> {
    let mut rng = rand::thread_rng();
    let format = CompiledFormat::combined();
    (0..count)
        .map(|_| format.render(&random_combined_record(&mut rng)))
        .collect()
}

/// Generate `count` JSON-mode lines whose values carry escapes and
/// surrogate pairs.
pub fn json_lines(format: &CompiledFormat, count: usize) -> Vec<String> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|i| {
            let mut record = Fields::new();
            record.insert("key", format!("k{i}"));
            let value: String = (0..rng.gen_range(4..24))
                .map(|_| match rng.gen_range(0..4) {
                    0 => '\n',
                    1 => '"',
                    2 => '\u{1f309}',
                    _ => rng.gen_range('a'..='z'),
                })
                .collect();
            record.insert("value", value);
            format.render(&record)
        })
        .collect()
}
