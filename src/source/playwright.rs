//! Playwright spec parsing (`test(...)`, `test.describe(...)`, async callbacks).

use std::sync::LazyLock;

use regex::Regex;

use super::{TestCase, parse_with};

static TEST_CASE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*test(?:\.describe)?(?:\.\w+)?(\([\s\S]*?,\s*(?:async)?\s*(?:function)?\s*\()",
    )
    .expect("valid test case regex")
});

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\(["'\x60](.*?)["'\x60],\s*?(?:function)?|[{(]"#).expect("valid title regex")
});

static MULTI_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\btag\s*:\s*\[([\s\S]*?)\]").expect("valid tag list regex")
});

static SINGLE_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\btag\s*:\s*['"\x60](.*?)['"\x60]"#).expect("valid tag regex")
});

/// Parses the tests and describe blocks declared in a playwright spec file.
///
/// Tags declared through the `{ tag: ... }` details object are collected
/// into [`TestCase::tags`]; tags written inline in the title stay part of
/// the title.
pub fn parse(input: &str) -> Vec<TestCase> {
    parse_with(
        input,
        &TEST_CASE_RE,
        &TITLE_RE,
        &[&SINGLE_TAG_RE, &MULTI_TAG_RE],
    )
}
