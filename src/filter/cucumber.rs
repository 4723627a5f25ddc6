//! Cucumber feature file filtering and scenario listing.

use tracing::{debug, warn};

use super::gherkin::{self, Pickle};
use super::tag_expr;
use super::{MatchResult, SpecSource};

/// Combines the `tags` entries of a cucumber suite into one expression.
///
/// Cucumber ANDs repeated `--tags` options, so each entry is parenthesised
/// and the entries are joined with `and`.
///
/// ```
/// use saucectl::filter::cucumber::tag_expression;
///
/// let tags = vec!["@smoke or @e2e".to_string(), "not @wip".to_string()];
/// assert_eq!(tag_expression(&tags), "(@smoke or @e2e) and (not @wip)");
/// ```
pub fn tag_expression(tags: &[String]) -> String {
    tags.iter()
        .map(|t| format!("({t})"))
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Partitions feature `files` by whether any of their scenarios satisfies
/// the tag expression `expr`.
///
/// An expression that does not parse matches no file. Files that cannot be
/// read or parsed are unmatched.
pub fn match_files(source: &dyn SpecSource, files: &[String], expr: &str) -> MatchResult {
    let expression = match tag_expr::parse(expr) {
        Ok(expression) => expression,
        Err(err) => {
            warn!(error = %err, "Invalid cucumber tag expression, no feature file will match");
            return MatchResult::none(files);
        }
    };

    let mut result = MatchResult::default();
    for file in files {
        let matched = read_pickles(source, file)
            .is_some_and(|pickles| pickles.iter().any(|p| expression.evaluate(&p.tags)));
        result.push(file, matched);
    }
    result
}

/// Lists the scenarios of every readable, parseable feature file, in file
/// order.
pub fn list_scenarios(source: &dyn SpecSource, files: &[String]) -> Vec<Pickle> {
    files
        .iter()
        .filter_map(|file| read_pickles(source, file))
        .flatten()
        .collect()
}

/// Returns each distinct scenario name once, in first-seen order.
pub fn unique_names(scenarios: &[Pickle]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    scenarios
        .iter()
        .filter(|s| seen.insert(s.name.as_str()))
        .map(|s| s.name.clone())
        .collect()
}

fn read_pickles(source: &dyn SpecSource, file: &str) -> Option<Vec<Pickle>> {
    let content = match source.read_to_string(file) {
        Ok(content) => content,
        Err(err) => {
            warn!(file, error = %err, "Could not read feature file");
            return None;
        }
    };
    match gherkin::parse(&content) {
        Ok(pickles) => {
            debug!(file, scenarios = pickles.len(), "Parsed feature file");
            Some(pickles)
        }
        Err(err) => {
            warn!(file, error = %err, "Could not parse feature file, it will be excluded");
            None
        }
    }
}
