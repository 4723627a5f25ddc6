//! Cucumber suite sharding.
//!
//! Feature files come from `paths` minus `excluded_test_files`. With
//! `shard_tags_enabled`, files without a scenario matching every entry of
//! `tags` are dropped.
//!
//! The `scenario` shard mode creates one replica per unique scenario name
//! across the remaining files. Each replica keeps the suite's `paths` and
//! restricts cucumber with an anchored `scenario_name` regex.

use tracing::warn;

use crate::config::{CucumberShard, CucumberSuite};
use crate::filter::cucumber::{self, list_scenarios, tag_expression, unique_names};
use crate::shard::{Filtered, ShardContext, ShardError, ShardMode, ShardResult, Sharder};

pub struct CucumberSharder;

impl Sharder for CucumberSharder {
    type Suite = CucumberSuite;

    fn name<'a>(&self, suite: &'a CucumberSuite) -> &'a str {
        &suite.name
    }

    fn mode(&self, suite: &CucumberSuite) -> ShardMode {
        suite.shard.map(ShardMode::from).unwrap_or_default()
    }

    fn include<'a>(&self, suite: &'a CucumberSuite) -> &'a [String] {
        &suite.paths
    }

    fn exclude<'a>(&self, suite: &'a CucumberSuite) -> &'a [String] {
        &suite.excluded_test_files
    }

    fn filter(
        &self,
        suite: &CucumberSuite,
        ctx: &ShardContext,
        items: &[String],
    ) -> Option<Filtered> {
        if !suite.shard_tags_enabled || suite.tags.is_empty() {
            return None;
        }
        let expression = tag_expression(&suite.tags);
        let result = cucumber::match_files(&ctx.source(), items, &expression);
        Some(Filtered { expression, result })
    }

    fn expand(
        &self,
        suite: &CucumberSuite,
        ctx: &ShardContext,
        items: Vec<String>,
    ) -> ShardResult<Vec<String>> {
        if suite.shard != Some(CucumberShard::Scenario) {
            return Ok(items);
        }

        let names = unique_names(&list_scenarios(&ctx.source(), &items));
        if names.is_empty() {
            warn!(suite = %suite.name, "No scenarios found in the selected feature files");
            return Err(ShardError::NoScenarios {
                suite: suite.name.clone(),
            });
        }
        Ok(names)
    }

    fn replicate(&self, suite: &CucumberSuite, name: String, selection: Vec<String>) -> CucumberSuite {
        if suite.shard == Some(CucumberShard::Scenario) {
            return CucumberSuite {
                name,
                scenario_name: Some(scenario_pattern(&selection)),
                ..suite.clone()
            };
        }
        CucumberSuite {
            name,
            paths: selection,
            ..suite.clone()
        }
    }
}

/// Anchored regex matching exactly the given scenario names.
fn scenario_pattern(names: &[String]) -> String {
    let escaped: Vec<String> = names.iter().map(|n| regex::escape(n)).collect();
    match escaped.as_slice() {
        [single] => format!("^{single}$"),
        _ => format!("^(?:{})$", escaped.join("|")),
    }
}
