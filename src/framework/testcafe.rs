//! TestCafe suite sharding. TestCafe has no filter the CLI can evaluate
//! ahead of time, so only `src` and `exclude` decide the files.

use crate::config::TestcafeSuite;
use crate::shard::{ShardMode, Sharder};

pub struct TestcafeSharder;

impl Sharder for TestcafeSharder {
    type Suite = TestcafeSuite;

    fn name<'a>(&self, suite: &'a TestcafeSuite) -> &'a str {
        &suite.name
    }

    fn mode(&self, suite: &TestcafeSuite) -> ShardMode {
        suite.shard.map(ShardMode::from).unwrap_or_default()
    }

    fn include<'a>(&self, suite: &'a TestcafeSuite) -> &'a [String] {
        &suite.src
    }

    fn exclude<'a>(&self, suite: &'a TestcafeSuite) -> &'a [String] {
        &suite.exclude
    }

    fn replicate(&self, suite: &TestcafeSuite, name: String, selection: Vec<String>) -> TestcafeSuite {
        TestcafeSuite {
            name,
            src: selection,
            ..suite.clone()
        }
    }
}
