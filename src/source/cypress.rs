//! Cypress spec parsing (`it(...)` / `test(...)` with `{ tags }` options).

use std::sync::LazyLock;

use regex::Regex;

use super::{TestCase, parse_with};

static TEST_CASE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:it|test)(?:\.\w+)?(\([\s\S]*?,\s*(?:function)?\s*\()")
        .expect("valid test case regex")
});

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\(["'\x60](.*?)["'\x60],\s*?(?:function)?|[{(]"#).expect("valid title regex")
});

static MULTI_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"tags\s*:\s*\[([\s\S]*?)\]").expect("valid tag list regex")
});

static SINGLE_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"tags\s*:\s*['"\x60](.*?)['"\x60]"#).expect("valid tag regex")
});

/// Parses the test cases declared in the contents of a cypress spec file.
///
/// # Example
///
/// ```
/// use saucectl::source::{cypress, TestCase};
///
/// let cases = cypress::parse(r#"it("test title", { tags: ['@tag1', "@tag2"] }, () => {})"#);
/// assert_eq!(cases, vec![TestCase::new("test title", "@tag1 @tag2")]);
/// ```
pub fn parse(input: &str) -> Vec<TestCase> {
    parse_with(
        input,
        &TEST_CASE_RE,
        &TITLE_RE,
        &[&SINGLE_TAG_RE, &MULTI_TAG_RE],
    )
}
