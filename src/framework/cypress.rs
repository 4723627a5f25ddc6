//! Cypress suite sharding.
//!
//! Spec files come from `spec_pattern` minus `exclude_spec_pattern`. With
//! `shard_grep_enabled`, files are narrowed by the `grep` and `grepTags`
//! entries of the suite's `env`, the same expressions `@cypress/grep`
//! evaluates at runtime. Only the presence of a key enables its filter; an
//! empty value matches everything.

use crate::config::CypressSuite;
use crate::filter::cypress_grep;
use crate::shard::{Filtered, ShardContext, ShardMode, Sharder};

pub struct CypressSharder;

impl Sharder for CypressSharder {
    type Suite = CypressSuite;

    fn name<'a>(&self, suite: &'a CypressSuite) -> &'a str {
        &suite.name
    }

    fn mode(&self, suite: &CypressSuite) -> ShardMode {
        suite.shard.map(ShardMode::from).unwrap_or_default()
    }

    fn include<'a>(&self, suite: &'a CypressSuite) -> &'a [String] {
        &suite.spec_pattern
    }

    fn exclude<'a>(&self, suite: &'a CypressSuite) -> &'a [String] {
        &suite.exclude_spec_pattern
    }

    fn filter(
        &self,
        suite: &CypressSuite,
        ctx: &ShardContext,
        items: &[String],
    ) -> Option<Filtered> {
        if !suite.shard_grep_enabled {
            return None;
        }
        let grep = suite.env.get("grep");
        let grep_tags = suite.env.get("grepTags");
        if grep.is_none() && grep_tags.is_none() {
            return None;
        }

        let grep = grep.map(String::as_str).unwrap_or_default();
        let grep_tags = grep_tags.map(String::as_str).unwrap_or_default();
        Some(Filtered {
            expression: format!("grep={grep:?} grepTags={grep_tags:?}"),
            result: cypress_grep::match_files(&ctx.source(), items, grep, grep_tags),
        })
    }

    fn replicate(&self, suite: &CypressSuite, name: String, selection: Vec<String>) -> CypressSuite {
        CypressSuite {
            name,
            spec_pattern: selection,
            ..suite.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpecShard;
    use crate::framework::tests::project;
    use crate::shard::{ShardError, shard_suites};

    const SMOKE: &str = "it('logs in', { tags: ['@smoke'] }, () => {})\n";
    const FLAKEY: &str = "it('checks out', { tags: '@flakey' }, () => {})\n";

    fn suite(shard: SpecShard) -> CypressSuite {
        CypressSuite {
            name: "cy".to_string(),
            spec_pattern: vec!["cypress/e2e/**/*.cy.js".to_string()],
            shard: Some(shard),
            ..Default::default()
        }
    }

    #[test]
    fn test_shard_by_spec_with_exclude() {
        let dir = project(&[
            ("cypress/e2e/a.cy.js", SMOKE),
            ("cypress/e2e/b.cy.js", FLAKEY),
            ("cypress/e2e/legacy/c.cy.js", SMOKE),
        ]);
        let mut suite = suite(SpecShard::Spec);
        suite.exclude_spec_pattern = vec!["cypress/e2e/legacy/**".to_string()];

        let sharded = shard_suites(&CypressSharder, &[suite], &ShardContext::new(dir.path(), 2)).unwrap();
        let names: Vec<_> = sharded.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["cy - cypress/e2e/a.cy.js", "cy - cypress/e2e/b.cy.js"]);
        assert_eq!(sharded[1].spec_pattern, vec!["cypress/e2e/b.cy.js"]);
    }

    #[test]
    fn test_grep_tags_filter() {
        let dir = project(&[("cypress/e2e/a.cy.js", SMOKE), ("cypress/e2e/b.cy.js", FLAKEY)]);
        let mut suite = suite(SpecShard::Concurrency);
        suite.shard_grep_enabled = true;
        suite.env.insert("grepTags".to_string(), "@smoke".to_string());

        let sharded = shard_suites(&CypressSharder, &[suite], &ShardContext::new(dir.path(), 2)).unwrap();
        assert_eq!(sharded.len(), 1);
        assert_eq!(sharded[0].name, "cy - 1/1");
        assert_eq!(sharded[0].spec_pattern, vec!["cypress/e2e/a.cy.js"]);
        assert_eq!(sharded[0].env["grepTags"], "@smoke");
    }

    #[test]
    fn test_grep_ignored_when_disabled() {
        let dir = project(&[("cypress/e2e/a.cy.js", SMOKE), ("cypress/e2e/b.cy.js", FLAKEY)]);
        let mut suite = suite(SpecShard::Spec);
        suite.env.insert("grep".to_string(), "nothing matches this".to_string());

        let sharded = shard_suites(&CypressSharder, &[suite], &ShardContext::new(dir.path(), 2)).unwrap();
        assert_eq!(sharded.len(), 2);
    }

    #[test]
    fn test_no_matching_tests() {
        let dir = project(&[("cypress/e2e/a.cy.js", SMOKE)]);
        let mut suite = suite(SpecShard::Spec);
        suite.shard_grep_enabled = true;
        suite.env.insert("grep".to_string(), "nothing matches this".to_string());

        let err = shard_suites(&CypressSharder, &[suite], &ShardContext::new(dir.path(), 2)).unwrap_err();
        assert!(matches!(err, ShardError::NoMatchingTests { .. }));
    }
}
