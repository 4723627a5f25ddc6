//! XCUITest and Espresso suite sharding.
//!
//! Native suites are not split by spec file but by test: the items are the
//! lines of `test_list_file`, one `Class` or `Class/method` per line. Blank
//! lines are skipped. Replicas receive their tests in `class`.

use std::path::Path;

use tracing::debug;

use crate::config::NativeSuite;
use crate::shard::{ShardContext, ShardError, ShardMode, ShardResult, Sharder};

pub struct TestListSharder;

impl Sharder for TestListSharder {
    type Suite = NativeSuite;

    fn name<'a>(&self, suite: &'a NativeSuite) -> &'a str {
        &suite.name
    }

    fn mode(&self, suite: &NativeSuite) -> ShardMode {
        suite.shard.map(ShardMode::from).unwrap_or_default()
    }

    fn include<'a>(&self, suite: &'a NativeSuite) -> &'a [String] {
        &suite.class
    }

    fn items(&self, suite: &NativeSuite, ctx: &ShardContext) -> ShardResult<Vec<String>> {
        let Some(file) = &suite.test_list_file else {
            return Ok(suite.class.clone());
        };
        read_test_list(&ctx.root_dir.join(file))
    }

    fn replicate(&self, suite: &NativeSuite, name: String, selection: Vec<String>) -> NativeSuite {
        NativeSuite {
            name,
            class: selection,
            ..suite.clone()
        }
    }
}

/// Reads the non-blank, trimmed lines of a test list file.
pub fn read_test_list(path: &Path) -> ShardResult<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|source| ShardError::TestList {
        path: path.to_path_buf(),
        source,
    })?;

    let tests: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    if tests.is_empty() {
        return Err(ShardError::EmptyTestList {
            path: path.to_path_buf(),
        });
    }

    debug!(path = %path.display(), tests = tests.len(), "Read test list");
    Ok(tests)
}
