//! `@cypress/grep` title and tag expressions.
//!
//! Two independent dialects, both evaluated per test case:
//!
//! - **title** (`grep`): `;`-separated substrings. Plain parts are OR-ed,
//!   `-`-prefixed parts must all be absent. `-hello;world;there` matches
//!   titles containing `world` or `there` but not `hello`.
//! - **tags** (`grepTags`): space or comma separated groups are OR-ed, `+`
//!   joins tags within a group (AND), a `-` prefix inverts a tag, and a
//!   `--` prefix inverts it in every group. Tags compare as whole tokens.
//!
//! ```
//! use saucectl::filter::cypress_grep::parse_grep_tags_exp;
//!
//! let exp = parse_grep_tags_exp("@smoke+-@slow @e2e");
//! assert!(exp.eval("@smoke @fast"));
//! assert!(!exp.eval("@smoke @slow"));
//! assert!(exp.eval("@e2e @slow"));
//! ```

use tracing::warn;

use super::{MatchResult, SpecSource};
use crate::source::cypress;

/// A parsed grep expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    /// Substring search, optionally inverted.
    Partial { search: String, invert: bool },
    /// Whole-token search over a whitespace separated tag list.
    Exact { tag: String, invert: bool },
    /// True if any child is true; false when empty.
    Any(Vec<Expression>),
    /// True if every child is true; true when empty.
    All(Vec<Expression>),
}

impl Expression {
    pub fn eval(&self, input: &str) -> bool {
        match self {
            Expression::Partial { search, invert } => input.contains(search.as_str()) != *invert,
            Expression::Exact { tag, invert } => {
                input.split_whitespace().any(|t| t == tag) != *invert
            }
            Expression::Any(children) => children.iter().any(|c| c.eval(input)),
            Expression::All(children) => children.iter().all(|c| c.eval(input)),
        }
    }
}

/// Parses a title grep expression.
pub fn parse_grep_exp(expr: &str) -> Expression {
    let mut inverted = Vec::new();
    let mut positive = Vec::new();

    for part in expr.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        match part.strip_prefix('-') {
            Some(search) => inverted.push(Expression::Partial {
                search: search.to_string(),
                invert: true,
            }),
            None => positive.push(Expression::Partial {
                search: part.to_string(),
                invert: false,
            }),
        }
    }

    let mut all = vec![Expression::All(inverted)];
    if !positive.is_empty() {
        all.push(Expression::Any(positive));
    }
    Expression::All(all)
}

/// Parses a tag grep expression.
pub fn parse_grep_tags_exp(expr: &str) -> Expression {
    let mut globals = Vec::new();
    let mut groups: Vec<Vec<Expression>> = Vec::new();

    for part in expr.split([' ', ',']).filter(|p| !p.is_empty()) {
        if let Some(tag) = part.strip_prefix("--") {
            globals.push(Expression::Exact {
                tag: tag.to_string(),
                invert: true,
            });
            continue;
        }

        let group: Vec<Expression> = part
            .split('+')
            .filter(|t| !t.is_empty())
            .map(|t| match t.strip_prefix('-') {
                Some(tag) => Expression::Exact {
                    tag: tag.to_string(),
                    invert: true,
                },
                None => Expression::Exact {
                    tag: t.to_string(),
                    invert: false,
                },
            })
            .collect();
        if !group.is_empty() {
            groups.push(group);
        }
    }

    if groups.is_empty() {
        return Expression::All(globals);
    }

    Expression::Any(
        groups
            .into_iter()
            .map(|mut group| {
                group.extend(globals.iter().cloned());
                Expression::All(group)
            })
            .collect(),
    )
}

/// Partitions `files` by whether any of their test cases matches both the
/// `title` and `tags` expressions.
///
/// A test case with an empty title matches any title expression. Files that
/// cannot be read, or that declare no test cases, are unmatched.
pub fn match_files(
    source: &dyn SpecSource,
    files: &[String],
    title: &str,
    tags: &str,
) -> MatchResult {
    let title_exp = parse_grep_exp(title);
    let tags_exp = parse_grep_tags_exp(tags);

    let mut result = MatchResult::default();
    for file in files {
        let matched = match source.read_to_string(file) {
            Ok(content) => cypress::parse(&content).iter().any(|tc| {
                (tc.title.is_empty() || title_exp.eval(&tc.title)) && tags_exp.eval(&tc.tags)
            }),
            Err(err) => {
                warn!(file = %file, error = %err, "Could not read spec file, excluding it from grep");
                false
            }
        };
        result.push(file, matched);
    }
    result
}
