//! Extraction of test cases from JavaScript spec files.
//!
//! Grep filters select spec files by the titles and tags of the tests they
//! declare. Those are scraped from the source text with a small regex
//! pipeline rather than a JavaScript parser:
//!
//! 1. locate `it(...)` / `test(...)` / `test.describe(...)` call openings at
//!    the start of a line, capturing the arguments up to the callback;
//! 2. extract the first quoted argument as the title;
//! 3. extract an optional `tags:` (cypress) or `tag:` (playwright) option,
//!    either a quoted string or a bracketed list.
//!
//! Only the conventional call shapes test authors write are supported.
//! Multi-line declarations, mixed quote styles and trailing commas parse;
//! computed titles, titles built by concatenation and wrapper helpers do not.

pub mod cypress;
pub mod playwright;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A test case declared in a spec file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// The first argument of `it`/`test`/`test.describe`.
    pub title: String,

    /// Space delimited concatenation of all tags declared for the test.
    pub tags: String,
}

impl TestCase {
    pub fn new(title: impl Into<String>, tags: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            tags: tags.into(),
        }
    }
}

/// Runs the three-pass pipeline over `input`.
///
/// `tag_patterns` are tried in order; the first one that matches supplies
/// the raw tag list.
pub(crate) fn parse_with(
    input: &str,
    call_re: &Regex,
    title_re: &Regex,
    tag_patterns: &[&Regex],
) -> Vec<TestCase> {
    call_re
        .captures_iter(input)
        .filter_map(|cap| cap.get(1))
        .map(|args| {
            let args = args.as_str();
            TestCase {
                title: parse_title(args, title_re),
                tags: parse_tags(args, tag_patterns),
            }
        })
        .collect()
}

fn parse_title(args: &str, title_re: &Regex) -> String {
    title_re
        .captures(args)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn parse_tags(args: &str, tag_patterns: &[&Regex]) -> String {
    let Some(raw) = tag_patterns
        .iter()
        .find_map(|re| re.captures(args).and_then(|cap| cap.get(1)))
    else {
        return String::new();
    };

    raw.as_str()
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| t.trim_matches(|c| c == '"' || c == '\'' || c == '`'))
        .collect::<Vec<_>>()
        .join(" ")
}
