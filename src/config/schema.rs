//! Configuration schema definitions for saucectl.
//!
//! This module defines the project file read by every subcommand. Suites
//! are a tagged enum selected by their `framework` field, so each framework
//! only accepts the fields it understands and a misspelled shard mode is
//! rejected when the file is parsed.
//!
//! # Schema Overview
//!
//! ```text
//! Config (root)
//! ├── SauceConfig            - Concurrency budget, root directory, .sauceignore
//! └── suites: [SuiteConfig]  - Tagged enum selected by `framework`
//!     ├── Cypress            - spec_pattern, env.grep / env.grepTags
//!     ├── Playwright         - test_match, grep / grep_invert
//!     ├── Testcafe           - src
//!     ├── Cucumber           - paths, tag expressions, scenario sharding
//!     ├── Xcuitest           - test list file
//!     └── Espresso           - test list file
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration structure for saucectl.
///
/// # Example
///
/// ```
/// use saucectl::config::{Config, SuiteConfig};
///
/// let config: Config = toml::from_str(r#"
///     [sauce]
///     concurrency = 4
///
///     [[suites]]
///     framework = "cypress"
///     name = "smoke"
///     spec_pattern = ["cypress/e2e/**/*.cy.js"]
///     shard = "spec"
/// "#).unwrap();
///
/// assert_eq!(config.sauce.concurrency, 4);
/// assert!(matches!(config.suites[0], SuiteConfig::Cypress(_)));
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Account and project wide settings.
    #[serde(default)]
    pub sauce: SauceConfig,

    /// Suites in the order they are submitted.
    #[serde(default)]
    pub suites: Vec<SuiteConfig>,
}

/// Project wide settings.
///
/// # Defaults
///
/// | Field | Default |
/// |-------|---------|
/// | `concurrency` | 2 |
/// | `max_concurrency` | None (no account cap) |
/// | `root_dir` | `"."` |
/// | `sauceignore` | `".sauceignore"` |
///
/// # Example
///
/// ```toml
/// [sauce]
/// concurrency = 8
/// max_concurrency = 5
/// root_dir = "~/projects/web"
/// sauceignore = ".sauceignore"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SauceConfig {
    /// Number of suites to run at the same time.
    ///
    /// Suites sharded by concurrency are split into this many replicas.
    ///
    /// Default: 2
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Concurrency allowed by the account.
    ///
    /// If set, `concurrency` is clamped to it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrency: Option<usize>,

    /// Directory spec patterns are resolved against.
    ///
    /// `~` and environment variables are expanded.
    ///
    /// Default: `"."`
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,

    /// Gitignore style exclusion file, relative to `root_dir`.
    ///
    /// A missing file excludes nothing.
    ///
    /// Default: `".sauceignore"`
    #[serde(default = "default_sauceignore")]
    pub sauceignore: PathBuf,
}

impl Default for SauceConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            max_concurrency: None,
            root_dir: default_root_dir(),
            sauceignore: default_sauceignore(),
        }
    }
}

fn default_concurrency() -> usize {
    2
}

fn default_root_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_sauceignore() -> PathBuf {
    PathBuf::from(".sauceignore")
}

/// A suite, tagged by the framework that runs it.
///
/// | Framework | Spec selection | Filter | Shard modes |
/// |-----------|----------------|--------|-------------|
/// | `cypress` | `spec_pattern` | `env.grep`, `env.grepTags` | `spec`, `concurrency` |
/// | `playwright` | `test_match` | `grep`, `grep_invert` | `spec`, `concurrency` |
/// | `testcafe` | `src` | none | `spec`, `concurrency` |
/// | `cucumber` | `paths` | `tags` | `spec`, `concurrency`, `scenario` |
/// | `xcuitest` | `test_list_file` | none | `concurrency`, `testList` |
/// | `espresso` | `test_list_file` | none | `concurrency`, `testList` |
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "framework", rename_all = "lowercase")]
pub enum SuiteConfig {
    Cypress(CypressSuite),
    Playwright(PlaywrightSuite),
    Testcafe(TestcafeSuite),
    Cucumber(CucumberSuite),
    Xcuitest(NativeSuite),
    Espresso(NativeSuite),
}

impl SuiteConfig {
    pub fn name(&self) -> &str {
        match self {
            SuiteConfig::Cypress(s) => &s.name,
            SuiteConfig::Playwright(s) => &s.name,
            SuiteConfig::Testcafe(s) => &s.name,
            SuiteConfig::Cucumber(s) => &s.name,
            SuiteConfig::Xcuitest(s) | SuiteConfig::Espresso(s) => &s.name,
        }
    }

    pub fn framework(&self) -> &'static str {
        match self {
            SuiteConfig::Cypress(_) => "cypress",
            SuiteConfig::Playwright(_) => "playwright",
            SuiteConfig::Testcafe(_) => "testcafe",
            SuiteConfig::Cucumber(_) => "cucumber",
            SuiteConfig::Xcuitest(_) => "xcuitest",
            SuiteConfig::Espresso(_) => "espresso",
        }
    }

    /// The configured shard value, as written in the project file.
    pub fn shard_type(&self) -> Option<&'static str> {
        match self {
            SuiteConfig::Cypress(s) => s.shard.map(SpecShard::as_str),
            SuiteConfig::Playwright(s) => s.shard.map(SpecShard::as_str),
            SuiteConfig::Testcafe(s) => s.shard.map(SpecShard::as_str),
            SuiteConfig::Cucumber(s) => s.shard.map(CucumberShard::as_str),
            SuiteConfig::Xcuitest(s) | SuiteConfig::Espresso(s) => s.shard.map(TestListShard::as_str),
        }
    }

    /// The files or tests this suite selects, as configured.
    pub fn selection(&self) -> &[String] {
        match self {
            SuiteConfig::Cypress(s) => &s.spec_pattern,
            SuiteConfig::Playwright(s) => &s.test_match,
            SuiteConfig::Testcafe(s) => &s.src,
            SuiteConfig::Cucumber(s) => &s.paths,
            SuiteConfig::Xcuitest(s) | SuiteConfig::Espresso(s) => &s.class,
        }
    }
}

/// Shard modes of file based frameworks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecShard {
    /// One replica per spec file.
    Spec,
    /// Spec files split over `sauce.concurrency` replicas.
    Concurrency,
}

impl SpecShard {
    pub fn as_str(self) -> &'static str {
        match self {
            SpecShard::Spec => "spec",
            SpecShard::Concurrency => "concurrency",
        }
    }
}

/// Shard modes of cucumber suites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CucumberShard {
    Spec,
    Concurrency,
    /// One replica per unique scenario name.
    Scenario,
}

impl CucumberShard {
    pub fn as_str(self) -> &'static str {
        match self {
            CucumberShard::Spec => "spec",
            CucumberShard::Concurrency => "concurrency",
            CucumberShard::Scenario => "scenario",
        }
    }
}

/// Shard modes of suites driven by a test list file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum TestListShard {
    /// Tests split over `sauce.concurrency` replicas.
    #[serde(rename = "concurrency")]
    Concurrency,
    /// One replica per test.
    #[serde(rename = "testList")]
    TestList,
}

impl TestListShard {
    pub fn as_str(self) -> &'static str {
        match self {
            TestListShard::Concurrency => "concurrency",
            TestListShard::TestList => "testList",
        }
    }
}

/// A cypress suite.
///
/// # Example
///
/// ```toml
/// [[suites]]
/// framework = "cypress"
/// name = "checkout"
/// spec_pattern = ["cypress/e2e/**/*.cy.js"]
/// exclude_spec_pattern = ["cypress/e2e/legacy/**"]
/// shard = "concurrency"
/// shard_grep_enabled = true
///
/// [suites.env]
/// grep = "checkout;-flaky"
/// grepTags = "@smoke+-@slow"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CypressSuite {
    pub name: String,

    /// Glob patterns selecting spec files.
    #[serde(default)]
    pub spec_pattern: Vec<String>,

    /// Glob patterns removed from the selection.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_spec_pattern: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shard: Option<SpecShard>,

    /// Only shard spec files matching `env.grep` / `env.grepTags`.
    #[serde(default)]
    pub shard_grep_enabled: bool,

    /// Environment passed to cypress; `grep` and `grepTags` drive
    /// `@cypress/grep`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

/// A playwright suite.
///
/// # Example
///
/// ```toml
/// [[suites]]
/// framework = "playwright"
/// name = "todo"
/// test_match = ["tests/**/*.spec.ts"]
/// shard = "spec"
/// shard_grep_enabled = true
/// grep = "@fast"
/// grep_invert = "@flaky"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PlaywrightSuite {
    pub name: String,

    #[serde(default)]
    pub test_match: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shard: Option<SpecShard>,

    /// Only shard spec files matching `grep` / `grep_invert`.
    #[serde(default)]
    pub shard_grep_enabled: bool,

    /// Regex selecting tests, empty for none.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub grep: String,

    /// Regex deselecting tests, empty for none.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub grep_invert: String,
}

/// A testcafe suite.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TestcafeSuite {
    pub name: String,

    #[serde(default)]
    pub src: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shard: Option<SpecShard>,
}

/// A cucumber suite.
///
/// # Example
///
/// ```toml
/// [[suites]]
/// framework = "cucumber"
/// name = "features"
/// paths = ["features/**/*.feature"]
/// shard = "scenario"
/// shard_tags_enabled = true
/// tags = ["@smoke or @e2e", "not @wip"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CucumberSuite {
    pub name: String,

    #[serde(default)]
    pub paths: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_test_files: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shard: Option<CucumberShard>,

    /// Only shard feature files with a scenario matching `tags`.
    #[serde(default)]
    pub shard_tags_enabled: bool,

    /// Tag expressions, all of which must hold.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Regex restricting which scenarios cucumber runs.
    ///
    /// Set to `^<name>$` on replicas created by scenario sharding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_name: Option<String>,
}

/// An XCUITest or Espresso suite whose tests come from a list file.
///
/// # Example
///
/// ```toml
/// [[suites]]
/// framework = "xcuitest"
/// name = "ios"
/// test_list_file = "tests.txt"
/// shard = "concurrency"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct NativeSuite {
    pub name: String,

    /// File with one test (`Class` or `Class/method`) per line, relative to
    /// the root directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_list_file: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shard: Option<TestListShard>,

    /// Tests to run; filled per replica when sharded.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub class: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.sauce.concurrency, 2);
        assert_eq!(config.sauce.root_dir, PathBuf::from("."));
        assert_eq!(config.sauce.sauceignore, PathBuf::from(".sauceignore"));
        assert!(config.sauce.max_concurrency.is_none());
        assert!(config.suites.is_empty());
    }

    #[test]
    fn test_all_frameworks() {
        let config: Config = toml::from_str(
            r#"
            [[suites]]
            framework = "cypress"
            name = "cy"
            spec_pattern = ["cypress/e2e/**/*.js"]
            shard = "concurrency"
            env = { grepTags = "@smoke" }

            [[suites]]
            framework = "playwright"
            name = "pw"
            test_match = ["tests/*.spec.ts"]
            grep_invert = "@slow"

            [[suites]]
            framework = "testcafe"
            name = "tc"
            src = ["tests/*.js"]
            shard = "spec"

            [[suites]]
            framework = "cucumber"
            name = "cu"
            paths = ["features/*.feature"]
            shard = "scenario"
            tags = ["@a"]

            [[suites]]
            framework = "xcuitest"
            name = "ios"
            test_list_file = "tests.txt"
            shard = "testList"

            [[suites]]
            framework = "espresso"
            name = "android"
            class = ["com.example.LoginTest"]
        "#,
        )
        .unwrap();

        let frameworks: Vec<_> = config.suites.iter().map(SuiteConfig::framework).collect();
        assert_eq!(
            frameworks,
            vec!["cypress", "playwright", "testcafe", "cucumber", "xcuitest", "espresso"]
        );
        let shards: Vec<_> = config.suites.iter().map(SuiteConfig::shard_type).collect();
        assert_eq!(
            shards,
            vec![
                Some("concurrency"),
                None,
                Some("spec"),
                Some("scenario"),
                Some("testList"),
                None
            ]
        );
        match &config.suites[0] {
            SuiteConfig::Cypress(s) => assert_eq!(s.env["grepTags"], "@smoke"),
            other => panic!("unexpected suite {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unsupported_shard_mode() {
        let err = toml::from_str::<Config>(
            r#"
            [[suites]]
            framework = "testcafe"
            name = "tc"
            shard = "scenario"
        "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("scenario"));
    }

    #[test]
    fn test_rejects_unknown_framework() {
        assert!(
            toml::from_str::<Config>(
                r#"
                [[suites]]
                framework = "jest"
                name = "unit"
            "#
            )
            .is_err()
        );
    }
}
