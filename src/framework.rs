//! Per-framework sharding adapters.
//!
//! Each supported framework gets a small [`Sharder`] implementation that
//! tells the generic pipeline in [`crate::shard`] where a suite's spec
//! patterns live, which filter expression applies and how to build a
//! replica. Suites are dispatched by matching on [`SuiteConfig`]; there is
//! no runtime registry.
//!
//! # Built-in Frameworks
//!
//! | Implementation | Framework | Filter | Replica selection field |
//! |----------------|-----------|--------|-------------------------|
//! | [`cypress::CypressSharder`] | cypress | `@cypress/grep` | `spec_pattern` |
//! | [`playwright::PlaywrightSharder`] | playwright | `grep` / `grep_invert` | `test_match` |
//! | [`testcafe::TestcafeSharder`] | testcafe | none | `src` |
//! | [`cucumber::CucumberSharder`] | cucumber | tag expressions | `paths` or `scenario_name` |
//! | [`native::TestListSharder`] | xcuitest, espresso | none | `class` |
//!
//! # Example
//!
//! ```no_run
//! use saucectl::config::load_config;
//! use saucectl::framework::shard_all;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("saucectl.toml"))?;
//! let ctx = config.shard_context()?;
//! for suite in shard_all(&config.suites, &ctx)? {
//!     println!("{}", suite.name());
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cucumber;
pub mod cypress;
pub mod native;
pub mod playwright;
pub mod testcafe;

use serde::Serialize;

use crate::config::{CucumberShard, SpecShard, SuiteConfig, TestListShard};
use crate::filter::{self, MatchResult, SpecSource};
use crate::shard::{self, ShardContext, ShardError, ShardMode, ShardResult, Sharder};
use crate::source;

impl From<SpecShard> for ShardMode {
    fn from(shard: SpecShard) -> Self {
        match shard {
            SpecShard::Spec => ShardMode::ByFile,
            SpecShard::Concurrency => ShardMode::ByConcurrency,
        }
    }
}

impl From<CucumberShard> for ShardMode {
    fn from(shard: CucumberShard) -> Self {
        match shard {
            CucumberShard::Spec | CucumberShard::Scenario => ShardMode::ByFile,
            CucumberShard::Concurrency => ShardMode::ByConcurrency,
        }
    }
}

impl From<TestListShard> for ShardMode {
    fn from(shard: TestListShard) -> Self {
        match shard {
            TestListShard::TestList => ShardMode::ByFile,
            TestListShard::Concurrency => ShardMode::ByConcurrency,
        }
    }
}

/// Shards one suite with the adapter of its framework.
pub fn shard_suite(suite: &SuiteConfig, ctx: &ShardContext) -> ShardResult<Vec<SuiteConfig>> {
    fn wrap<T>(replicas: Vec<T>, variant: fn(T) -> SuiteConfig) -> Vec<SuiteConfig> {
        replicas.into_iter().map(variant).collect()
    }

    let replicas = match suite {
        SuiteConfig::Cypress(s) => wrap(
            shard::shard_suite(&cypress::CypressSharder, s, ctx)?,
            SuiteConfig::Cypress,
        ),
        SuiteConfig::Playwright(s) => wrap(
            shard::shard_suite(&playwright::PlaywrightSharder, s, ctx)?,
            SuiteConfig::Playwright,
        ),
        SuiteConfig::Testcafe(s) => wrap(
            shard::shard_suite(&testcafe::TestcafeSharder, s, ctx)?,
            SuiteConfig::Testcafe,
        ),
        SuiteConfig::Cucumber(s) => wrap(
            shard::shard_suite(&cucumber::CucumberSharder, s, ctx)?,
            SuiteConfig::Cucumber,
        ),
        SuiteConfig::Xcuitest(s) => wrap(
            shard::shard_suite(&native::TestListSharder, s, ctx)?,
            SuiteConfig::Xcuitest,
        ),
        SuiteConfig::Espresso(s) => wrap(
            shard::shard_suite(&native::TestListSharder, s, ctx)?,
            SuiteConfig::Espresso,
        ),
    };
    Ok(replicas)
}

/// Shards every suite in order, stopping at the first error.
pub fn shard_all(suites: &[SuiteConfig], ctx: &ShardContext) -> ShardResult<Vec<SuiteConfig>> {
    let mut sharded = Vec::with_capacity(suites.len());
    for suite in suites {
        sharded.extend(shard_suite(suite, ctx)?);
    }
    Ok(sharded)
}

/// The items a suite selects, before splitting.
#[derive(Debug, Clone, Serialize)]
pub struct Collection {
    pub suite: String,
    pub framework: &'static str,

    /// Items kept by the suite's filter, with the tests they declare.
    pub selected: Vec<CollectedItem>,

    /// Items the suite's filter removed.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filtered_out: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectedItem {
    pub path: String,

    /// Test titles (JavaScript specs) or scenario names (feature files).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tests: Vec<String>,
}

/// Resolves and filters the items of `suite` without sharding it.
///
/// Unlike sharding, a filter that removes every item is reported rather
/// than treated as an error. Suites without a shard mode are collected as
/// well.
pub fn collect(suite: &SuiteConfig, ctx: &ShardContext) -> ShardResult<Collection> {
    let result = match suite {
        SuiteConfig::Cypress(s) => collect_with(&cypress::CypressSharder, s, ctx)?,
        SuiteConfig::Playwright(s) => collect_with(&playwright::PlaywrightSharder, s, ctx)?,
        SuiteConfig::Testcafe(s) => collect_with(&testcafe::TestcafeSharder, s, ctx)?,
        SuiteConfig::Cucumber(s) => collect_with(&cucumber::CucumberSharder, s, ctx)?,
        SuiteConfig::Xcuitest(s) | SuiteConfig::Espresso(s) => {
            collect_with(&native::TestListSharder, s, ctx)?
        }
    };

    let spec_source = ctx.source();
    let selected = result
        .matched
        .into_iter()
        .map(|path| {
            let tests = match suite {
                SuiteConfig::Cypress(_) => titles(&spec_source, &path, source::cypress::parse),
                SuiteConfig::Playwright(_) => titles(&spec_source, &path, source::playwright::parse),
                SuiteConfig::Cucumber(_) => filter::cucumber::unique_names(
                    &filter::cucumber::list_scenarios(&spec_source, std::slice::from_ref(&path)),
                ),
                SuiteConfig::Testcafe(_) | SuiteConfig::Xcuitest(_) | SuiteConfig::Espresso(_) => {
                    Vec::new()
                }
            };
            CollectedItem { path, tests }
        })
        .collect();

    Ok(Collection {
        suite: suite.name().to_string(),
        framework: suite.framework(),
        selected,
        filtered_out: result.unmatched,
    })
}

fn collect_with<S: Sharder + ?Sized>(
    sharder: &S,
    suite: &S::Suite,
    ctx: &ShardContext,
) -> ShardResult<MatchResult> {
    let items = sharder.items(suite, ctx)?;
    if items.is_empty() {
        return Err(ShardError::NoMatch {
            suite: sharder.name(suite).to_string(),
            patterns: sharder.include(suite).to_vec(),
        });
    }
    Ok(match sharder.filter(suite, ctx, &items) {
        Some(filtered) => filtered.result,
        None => MatchResult::all(&items),
    })
}

fn titles(
    reader: &dyn SpecSource,
    path: &str,
    parse: fn(&str) -> Vec<source::TestCase>,
) -> Vec<String> {
    reader
        .read_to_string(path)
        .map(|content| parse(&content).into_iter().map(|tc| tc.title).collect())
        .unwrap_or_default()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::{CucumberSuite, NativeSuite, TestcafeSuite};
    use std::fs;
    use tempfile::TempDir;

    /// Writes `files` under a fresh temporary project root.
    pub(crate) fn project(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (path, content) in files {
            let path = dir.path().join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        dir
    }

    #[test]
    fn test_shard_all_preserves_suite_order() {
        let dir = project(&[
            ("tests/a.js", "test('a', async () => {})\n"),
            ("tests/b.js", "test('b', async () => {})\n"),
            ("tests.txt", "LoginTest\nLogoutTest\n"),
        ]);
        let suites = vec![
            SuiteConfig::Testcafe(TestcafeSuite {
                name: "tc".to_string(),
                src: vec!["tests/*.js".to_string()],
                shard: Some(SpecShard::Spec),
                ..Default::default()
            }),
            SuiteConfig::Cucumber(CucumberSuite {
                name: "unsharded".to_string(),
                ..Default::default()
            }),
            SuiteConfig::Espresso(NativeSuite {
                name: "android".to_string(),
                test_list_file: Some("tests.txt".into()),
                shard: Some(TestListShard::Concurrency),
                ..Default::default()
            }),
        ];

        let sharded = shard_all(&suites, &ShardContext::new(dir.path(), 2)).unwrap();
        let names: Vec<_> = sharded.iter().map(SuiteConfig::name).collect();
        assert_eq!(
            names,
            vec!["tc - tests/a.js", "tc - tests/b.js", "unsharded", "android - 1/2", "android - 2/2"]
        );
        assert!(matches!(sharded[3], SuiteConfig::Espresso(_)));
        assert_eq!(sharded[4].selection().to_vec(), vec!["LogoutTest"]);
    }

    #[test]
    fn test_shard_all_stops_at_first_error() {
        let dir = project(&[("tests/a.js", "")]);
        let suites = vec![
            SuiteConfig::Testcafe(TestcafeSuite {
                name: "missing".to_string(),
                src: vec!["nope/*.js".to_string()],
                shard: Some(SpecShard::Spec),
                ..Default::default()
            }),
            SuiteConfig::Testcafe(TestcafeSuite {
                name: "fine".to_string(),
                src: vec!["tests/*.js".to_string()],
                shard: Some(SpecShard::Spec),
                ..Default::default()
            }),
        ];

        let err = shard_all(&suites, &ShardContext::new(dir.path(), 2)).unwrap_err();
        assert_eq!(err.to_string(), "suite 'missing' patterns have no matching files: nope/*.js");
    }

    #[test]
    fn test_collect_lists_tests() {
        let dir = project(&[
            ("features/a.feature", "Feature: a\n  @smoke\n  Scenario: one\n  Scenario: two\n"),
            ("features/b.feature", "Feature: b\n  Scenario: three\n"),
        ]);
        let suite = SuiteConfig::Cucumber(CucumberSuite {
            name: "cu".to_string(),
            paths: vec!["features/*.feature".to_string()],
            shard_tags_enabled: true,
            tags: vec!["@smoke".to_string()],
            ..Default::default()
        });

        let collection = collect(&suite, &ShardContext::new(dir.path(), 1)).unwrap();
        assert_eq!(collection.framework, "cucumber");
        assert_eq!(collection.selected.len(), 1);
        assert_eq!(collection.selected[0].path, "features/a.feature");
        assert_eq!(collection.selected[0].tests, vec!["one", "two"]);
        assert_eq!(collection.filtered_out, vec!["features/b.feature"]);
    }
}
