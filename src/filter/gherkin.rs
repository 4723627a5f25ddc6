//! Compiles feature files into pickles.
//!
//! Parsing is delegated to the [`gherkin`](::gherkin) crate, which reads
//! every Gherkin dialect selected with a `# language: <code>` header
//! (English otherwise). Only what tag filtering and scenario sharding need
//! is kept from the syntax tree: the name of every executable scenario and
//! the tags it inherits.
//!
//! Tag inheritance follows the Gherkin compiler:
//!
//! | Declared on | Applies to |
//! |-------------|------------|
//! | `Feature` | every scenario in the file |
//! | `Rule` | every scenario in the rule |
//! | `Scenario` / `Scenario Outline` | that scenario or outline |
//! | `Examples` | the pickles generated from that examples table |
//!
//! Each row of an outline's `Examples` table yields one pickle, with
//! `<column>` placeholders in the outline name replaced by the row values.

use std::borrow::Cow;

use ::gherkin::{Feature, GherkinEnv, Scenario};
use serde::Serialize;

/// An executable scenario compiled from a feature file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pickle {
    pub name: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GherkinError {
    #[error("invalid feature file: {0}")]
    Parse(String),
}

pub type GherkinResult<T> = Result<T, GherkinError>;

/// Compiles the pickles declared in the feature file `text`.
///
/// A file without any content compiles to no pickles.
pub fn parse(text: &str) -> GherkinResult<Vec<Pickle>> {
    let text = text.trim_start();
    if text.trim_end().is_empty() {
        return Ok(Vec::new());
    }

    // the grammar expects every line, including the last, to be terminated
    let input: Cow<'_, str> = if text.ends_with('\n') {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(format!("{text}\n"))
    };

    let feature = Feature::parse(input.as_ref(), GherkinEnv::default())
        .map_err(|e| GherkinError::Parse(e.to_string()))?;
    Ok(compile(&feature))
}

fn compile(feature: &Feature) -> Vec<Pickle> {
    let feature_tags = tags(&feature.tags);
    let mut pickles = Vec::new();

    for scenario in &feature.scenarios {
        compile_scenario(scenario, &feature_tags, &mut pickles);
    }
    for rule in &feature.rules {
        let mut inherited = feature_tags.clone();
        inherited.extend(tags(&rule.tags));
        for scenario in &rule.scenarios {
            compile_scenario(scenario, &inherited, &mut pickles);
        }
    }
    pickles
}

fn compile_scenario(scenario: &Scenario, inherited: &[String], pickles: &mut Vec<Pickle>) {
    let mut scenario_tags = inherited.to_vec();
    scenario_tags.extend(tags(&scenario.tags));

    if scenario.examples.is_empty() {
        pickles.push(Pickle {
            name: scenario.name.clone(),
            tags: scenario_tags,
        });
        return;
    }

    for examples in &scenario.examples {
        let Some(table) = &examples.table else {
            continue;
        };
        let Some((header, rows)) = table.rows.split_first() else {
            continue;
        };

        let mut example_tags = scenario_tags.clone();
        example_tags.extend(tags(&examples.tags));
        for row in rows {
            let mut name = scenario.name.clone();
            for (column, value) in header.iter().zip(row) {
                name = name.replace(&format!("<{column}>"), value);
            }
            pickles.push(Pickle {
                name,
                tags: example_tags.clone(),
            });
        }
    }
}

/// Tags as written in the feature file, `@` included.
fn tags(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|t| format!("@{}", t.trim_start_matches('@')))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(pickles: &[Pickle]) -> Vec<&str> {
        pickles.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_feature_and_scenario_tags() {
        let pickles = parse(
            r#"
@act3 @credits
Feature: Scenario 3

	@nomatch
        Scenario: Epilogue
                When The credits reach mid point
                Then Start the first mid-credit scene

        Scenario: Last Bonus Scene
                When The credits reach the end
"#,
        )
        .unwrap();

        assert_eq!(
            pickles,
            vec![
                Pickle {
                    name: "Epilogue".into(),
                    tags: vec!["@act3".into(), "@credits".into(), "@nomatch".into()],
                },
                Pickle {
                    name: "Last Bonus Scene".into(),
                    tags: vec!["@act3".into(), "@credits".into()],
                },
            ]
        );
    }

    #[test]
    fn test_outline_expands_examples() {
        let pickles = parse(
            r#"
Feature: Eating

  @outline
  Scenario Outline: eating <eat> of <start>
    Given there are <start> cucumbers
    When I eat <eat> cucumbers

    @small
    Examples:
      | start | eat |
      |    12 |   5 |
      |    20 |   5 |

    Examples: Large
      | start | eat |
      |   100 |  50 |
"#,
        )
        .unwrap();

        assert_eq!(
            names(&pickles),
            vec!["eating 5 of 12", "eating 5 of 20", "eating 50 of 100"]
        );
        assert_eq!(pickles[0].tags, vec!["@outline", "@small"]);
        assert_eq!(pickles[2].tags, vec!["@outline"]);
    }

    #[test]
    fn test_rule_tags_and_background() {
        let pickles = parse(
            r#"
@feature
Feature: Rules

  Background:
    Given a user

  @rule
  Rule: first
    Example: one
      Given something

  Rule: second
    @own
    Scenario: two
      Given something else
"#,
        )
        .unwrap();

        assert_eq!(names(&pickles), vec!["one", "two"]);
        assert_eq!(pickles[0].tags, vec!["@feature", "@rule"]);
        assert_eq!(pickles[1].tags, vec!["@feature", "@own"]);
    }

    #[test]
    fn test_doc_strings_and_data_tables_are_not_scenarios() {
        let pickles = parse(
            r#"
Feature: Docs

  # a comment
  @tagged
  Scenario: with doc string
    Given a document
      """
      Scenario: not a scenario
      @not-a-tag
      """
    And a table
      | Scenario: | nope |
"#,
        )
        .unwrap();

        assert_eq!(names(&pickles), vec!["with doc string"]);
        assert_eq!(pickles[0].tags, vec!["@tagged"]);
    }

    #[test]
    fn test_language_header() {
        let pickles = parse(
            "# language: fr\n@smoke\nFonctionnalité: Panier\n  Scénario: Ajouter\n    Soit un panier\n",
        )
        .unwrap();
        assert_eq!(
            pickles,
            vec![Pickle {
                name: "Ajouter".into(),
                tags: vec!["@smoke".into()],
            }]
        );

        let pickles = parse(
            r#"# language: de
Funktionalität: Warenkorb

  @schnell
  Szenario: Artikel hinzufügen
    Angenommen ein leerer Warenkorb
"#,
        )
        .unwrap();
        assert_eq!(names(&pickles), vec!["Artikel hinzufügen"]);
        assert_eq!(pickles[0].tags, vec!["@schnell"]);
    }

    #[test]
    fn test_missing_trailing_newline() {
        let pickles = parse("Feature: a\n  Scenario: s\n    Given x").unwrap();
        assert_eq!(names(&pickles), vec!["s"]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse("Scenario: orphan"),
            Err(GherkinError::Parse(_))
        ));
    }

    #[test]
    fn test_empty_file() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("\n   \n").unwrap().is_empty());
    }
}
