//! Playwright suite sharding.
//!
//! With `shard_grep_enabled` and a non-empty `grep` or `grep_invert`, spec
//! files are narrowed the way `playwright test --grep` would select them.

use crate::config::PlaywrightSuite;
use crate::filter::playwright_grep;
use crate::shard::{Filtered, ShardContext, ShardMode, Sharder};

pub struct PlaywrightSharder;

impl Sharder for PlaywrightSharder {
    type Suite = PlaywrightSuite;

    fn name<'a>(&self, suite: &'a PlaywrightSuite) -> &'a str {
        &suite.name
    }

    fn mode(&self, suite: &PlaywrightSuite) -> ShardMode {
        suite.shard.map(ShardMode::from).unwrap_or_default()
    }

    fn include<'a>(&self, suite: &'a PlaywrightSuite) -> &'a [String] {
        &suite.test_match
    }

    fn exclude<'a>(&self, suite: &'a PlaywrightSuite) -> &'a [String] {
        &suite.exclude
    }

    fn filter(
        &self,
        suite: &PlaywrightSuite,
        ctx: &ShardContext,
        items: &[String],
    ) -> Option<Filtered> {
        if !suite.shard_grep_enabled || (suite.grep.is_empty() && suite.grep_invert.is_empty()) {
            return None;
        }
        Some(Filtered {
            expression: format!("grep={:?} grepInvert={:?}", suite.grep, suite.grep_invert),
            result: playwright_grep::match_files(
                &ctx.source(),
                items,
                &suite.grep,
                &suite.grep_invert,
            ),
        })
    }

    fn replicate(
        &self,
        suite: &PlaywrightSuite,
        name: String,
        selection: Vec<String>,
    ) -> PlaywrightSuite {
        PlaywrightSuite {
            name,
            test_match: selection,
            ..suite.clone()
        }
    }
}
