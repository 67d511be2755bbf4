//! Property-based test generators using proptest.
//!
//! The template strategies only pair separators with value alphabets that
//! cannot contain them, so every generated line has exactly one valid split.

use ngxlog_codec::Fields;
use proptest::prelude::*;

/// Separators usable in plain-mode templates.
///
/// None of these characters occur raw in [`plain_value_strategy`] output.
pub const PLAIN_SEPARATORS: &[&str] = &[" ", " - ", " [", "] ", "|", ", ", "\t", "\" \"", "\""];

/// A generated template together with its variable names in order.
#[derive(Debug, Clone)]
pub struct GeneratedFormat {
    /// Template source.
    pub template: String,
    /// Variable names, unique, in template order.
    pub names: Vec<String>,
}

/// Strategy for generating variable names.
pub fn variable_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,11}").expect("Invalid regex")
}

/// Strategy for plain-mode values.
///
/// Quotes and backslashes are included: rendering escapes them.
pub fn plain_value_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9._:/%=?&\"\\\\]{0,12}").expect("Invalid regex")
}

/// Strategy for JSON-mode values: any characters at all.
pub fn json_value_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(any::<char>(), 0..16).prop_map(|chars| chars.into_iter().collect())
}

fn unique_names(count: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(variable_name_strategy(), count).prop_map(|names| {
        names
            .into_iter()
            .enumerate()
            .map(|(i, name)| format!("{name}_{i}"))
            .collect()
    })
}

/// Strategy for plain-mode templates with 1 to `max_vars` variables.
pub fn plain_format_strategy(max_vars: usize) -> impl Strategy<Value = GeneratedFormat> {
    (1..=max_vars.max(1))
        .prop_flat_map(|count| {
            (
                unique_names(count),
                prop::collection::vec(prop::sample::select(PLAIN_SEPARATORS), count - 1),
                prop::option::of(prop::sample::select(PLAIN_SEPARATORS)),
                prop::option::of(prop::sample::select(PLAIN_SEPARATORS)),
            )
        })
        .prop_map(|(names, separators, prefix, suffix)| {
            let mut template = String::from(prefix.unwrap_or(""));
            for (i, name) in names.iter().enumerate() {
                if i > 0 {
                    template.push_str(separators[i - 1]);
                }
                template.push('$');
                template.push_str(name);
            }
            template.push_str(suffix.unwrap_or(""));
            GeneratedFormat { template, names }
        })
}

/// Strategy for JSON-mode object templates such as
/// `escape=json;{"a":"$a","b":"$b"}`.
pub fn json_format_strategy(max_vars: usize) -> impl Strategy<Value = GeneratedFormat> {
    (1..=max_vars.max(1))
        .prop_flat_map(unique_names)
        .prop_map(|names| {
            let body = names
                .iter()
                .map(|name| format!("\"{name}\":\"${name}\""))
                .collect::<Vec<_>>()
                .join(",");
            GeneratedFormat {
                template: format!("escape=json;{{{body}}}"),
                names,
            }
        })
}

/// Strategy for a record holding one value per name.
pub fn record_strategy(
    names: Vec<String>,
    values: impl Strategy<Value = String>,
) -> impl Strategy<Value = Fields> {
    let count = names.len();
    prop::collection::vec(values, count).prop_map(move |values| {
        names.iter().cloned().zip(values).collect::<Fields>()
    })
}

/// Strategy for realistic combined-format records.
pub fn combined_record_strategy() -> impl Strategy<Value = Fields> {
    let re = |pattern: &str| prop::string::string_regex(pattern).expect("Invalid regex");
    (
        re("(25[0-5]|2[0-4][0-9]|1?[0-9]{1,2})(\\.(25[0-5]|2[0-4][0-9]|1?[0-9]{1,2})){3}"),
        re("-|[a-z]{1,8}"),
        re("[0-3][0-9]/(Jan|Feb|Mar|Oct)/20[0-9]{2}:[0-2][0-9]:[0-5][0-9]:[0-5][0-9] [+-][0-9]{4}"),
        re("(GET|POST|HEAD) /[a-z0-9/._?=&\"]{0,20} HTTP/1\\.[01]"),
        100u16..600,
        0u32..1_000_000,
        re("-|https?://[a-z]{1,10}\\.(com|org)/[a-z]{0,6}"),
        re("[A-Za-z0-9/.;() \\\\\"-]{1,40}"),
    )
        .prop_map(|(addr, user, time, request, status, bytes, referer, agent)| {
            [
                ("remote_addr", addr),
                ("remote_user", user),
                ("time_local", time),
                ("request", request),
                ("status", status.to_string()),
                ("body_bytes_sent", bytes.to_string()),
                ("http_referer", referer),
                ("http_user_agent", agent),
            ]
            .into_iter()
            .collect()
        })
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
