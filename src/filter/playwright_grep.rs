//! Playwright `--grep` / `--grep-invert` file filtering.
//!
//! Playwright matches its grep patterns against the full test title, which
//! includes the file path. Spec files are therefore first matched by path;
//! only if the path does not decide, the declared test titles are checked.
//!
//! An empty pattern is treated as absent. A pattern that does not compile
//! is logged and treated as absent too, so a typo widens the selection
//! rather than emptying it.

use regex::Regex;
use tracing::warn;

use super::{MatchResult, SpecSource};
use crate::source::playwright;

struct Patterns {
    grep: Option<Regex>,
    invert: Option<Regex>,
}

impl Patterns {
    fn compile(grep: &str, grep_invert: &str) -> Self {
        Self {
            grep: compile("grep", grep),
            invert: compile("grepInvert", grep_invert),
        }
    }

    fn is_match(&self, title: &str) -> bool {
        if title.is_empty() {
            return true;
        }
        match (&self.grep, &self.invert) {
            (Some(grep), Some(invert)) => grep.is_match(title) && !invert.is_match(title),
            (Some(grep), None) => grep.is_match(title),
            (None, Some(invert)) => !invert.is_match(title),
            (None, None) => true,
        }
    }
}

fn compile(field: &str, pattern: &str) -> Option<Regex> {
    if pattern.is_empty() {
        return None;
    }
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(err) => {
            warn!(field, pattern, error = %err, "Ignoring invalid playwright grep pattern");
            None
        }
    }
}

/// Partitions `files` the way playwright's `grep`/`grepInvert` would.
///
/// A file whose path matches is selected without being read. Otherwise, if
/// an invert pattern is set the file is excluded, and if not the file is
/// selected when any declared test (or `"{title} {tags}"` for tests with a
/// `tag` option) matches. Unreadable files are unmatched.
pub fn match_files(
    source: &dyn SpecSource,
    files: &[String],
    grep: &str,
    grep_invert: &str,
) -> MatchResult {
    let patterns = Patterns::compile(grep, grep_invert);

    let mut result = MatchResult::default();
    for file in files {
        if patterns.is_match(file) {
            result.push(file, true);
            continue;
        }

        if patterns.invert.is_some() {
            result.push(file, false);
            continue;
        }

        let matched = match source.read_to_string(file) {
            Ok(content) => playwright::parse(&content).iter().any(|tc| {
                patterns.is_match(&tc.title)
                    || (!tc.tags.is_empty()
                        && patterns.is_match(&format!("{} {}", tc.title, tc.tags)))
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::mem_source;

    const TODO: &str = r#"
test.describe('New Todo', () => {
  test('should allow me to add todo items @query', async ({ page }) => {
  });

  test('should allow me to add multiple todo items @save', async ({ page }) => {
  });
});
"#;

    const STEP: &str = r#"
test.describe('New Step', () => {
  test('should allow me to add one step @fast @unique', async ({ page }) => {
  });

  test('should allow me to add multiple steps @slow @unique', async ({ page }) => {
  });
});
"#;

    fn files() -> Vec<String> {
        vec!["demo-todo.spec.js".to_string(), "demo-step.spec.js".to_string()]
    }

    fn run(grep: &str, grep_invert: &str) -> MatchResult {
        let source = mem_source(&[("demo-todo.spec.js", TODO), ("demo-step.spec.js", STEP)]);
        let result = match_files(&source, &files(), grep, grep_invert);
        assert_eq!(result.matched.len() + result.unmatched.len(), 2);
        result
    }

    #[test]
    fn test_match_by_title() {
        let result = run("New Todo", "");
        assert_eq!(result.matched, vec!["demo-todo.spec.js"]);
        assert_eq!(result.unmatched, vec!["demo-step.spec.js"]);
    }

    #[test]
    fn test_match_by_inline_tag() {
        assert_eq!(run("@fast", "").matched, vec!["demo-step.spec.js"]);
        assert_eq!(run("@fast|@slow", "").matched, vec!["demo-step.spec.js"]);
        assert_eq!(run("@fast|@save", "").matched, files());
    }

    #[test]
    fn test_match_by_filename() {
        let result = run("demo-step", "");
        assert_eq!(result.matched, vec!["demo-step.spec.js"]);
        assert_eq!(result.unmatched, vec!["demo-todo.spec.js"]);
    }

    #[test]
    fn test_combined_tags() {
        assert!(run("(.*@fast)(.*)(.*@slow)", "").matched.is_empty());
        assert_eq!(
            run("(.*@fast)(.*)(.*@unique)", "").matched,
            vec!["demo-step.spec.js"]
        );
    }

    #[test]
    fn test_grep_invert_skips_content() {
        let result = run("New Todo", "demo-todo");
        assert!(result.matched.is_empty());
        assert_eq!(result.unmatched, files());

        // path does not hit the invert pattern, so it is selected outright
        let result = run("", "@slow");
        assert_eq!(result.matched, files());
    }

    #[test]
    fn test_invalid_pattern_matches_everything() {
        let result = run("(unclosed", "");
        assert_eq!(result.matched, files());
        assert!(result.unmatched.is_empty());
    }

    #[test]
    fn test_tag_details_are_matched() {
        let source = mem_source(&[(
            "tagged.spec.ts",
            "test('checkout', { tag: ['@slow', '@e2e'] }, async ({ page }) => {\n});\n",
        )]);
        let files = vec!["tagged.spec.ts".to_string()];
        assert_eq!(match_files(&source, &files, "@e2e", "").matched, files);
        assert!(match_files(&source, &files, "@fast", "").matched.is_empty());
    }

    #[test]
    fn test_unreadable_file_is_unmatched() {
        let source = mem_source(&[]);
        let files = vec!["missing.spec.js".to_string()];
        let result = match_files(&source, &files, "nothing", "");
        assert_eq!(result.unmatched, files);
    }
}
