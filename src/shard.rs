//! Splitting suites into concurrently runnable replicas.
//!
//! A suite with a shard mode is replaced by one replica per spec file (or
//! test, or scenario), or by one replica per bucket of a round-robin split
//! over the configured concurrency. Replicas are full clones of the suite
//! with only their name and selection overwritten.
//!
//! # Pipeline
//!
//! ```text
//! suite ──► items()  ─────────► filter() ─────────► expand() ──► split ──► replicate()
//!           resolve patterns     grep / tag          scenario      per item
//!           minus sauceignore    expression          names         or bin_pack
//!               │                    │
//!               ▼                    ▼
//!            NoMatch           NoMatchingTests
//! ```
//!
//! Framework specifics live behind the [`Sharder`] trait; the orchestration
//! in [`shard_suites`] is shared by every framework. The first error aborts
//! the whole run, no partial result is returned.
//!
//! # Replica Names
//!
//! | Mode | Name |
//! |------|------|
//! | [`ShardMode::ByFile`] | `"{suite} - {item}"` |
//! | [`ShardMode::ByConcurrency`] | `"{suite} - {i}/{n}"` (1-based) |

use std::io;
use std::path::PathBuf;

use tracing::{debug, error, info};

use crate::concurrency::bin_pack;
use crate::fileset::{self, FilesetError, Sauceignore};
use crate::filter::{DirSource, MatchResult};

/// How a suite is split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShardMode {
    /// The suite runs as configured.
    #[default]
    None,
    /// One replica per item.
    ByFile,
    /// One replica per bucket of `bin_pack(items, concurrency)`.
    ByConcurrency,
}

/// Result type for sharding operations.
pub type ShardResult<T> = Result<T, ShardError>;

/// Errors that abort sharding.
#[derive(Debug, thiserror::Error)]
pub enum ShardError {
    /// The suite's patterns resolved to no files.
    #[error("suite '{suite}' patterns have no matching files: {}", patterns.join(", "))]
    NoMatch { suite: String, patterns: Vec<String> },

    /// Files were found, but the suite's filter excluded all of them.
    #[error("suite '{suite}' has no files matching '{filter}'")]
    NoMatchingTests { suite: String, filter: String },

    /// The filtered feature files declare no scenario.
    #[error("suite '{suite}' has no scenarios to shard")]
    NoScenarios { suite: String },

    #[error(transparent)]
    Fileset(#[from] FilesetError),

    #[error("failed to read test list file '{}': {source}", path.display())]
    TestList {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("test list file '{}' is empty", path.display())]
    EmptyTestList { path: PathBuf },
}

/// Environment shared by every suite of a sharding run.
#[derive(Debug, Clone)]
pub struct ShardContext {
    /// Directory spec patterns are resolved against.
    pub root_dir: PathBuf,

    /// Number of buckets for [`ShardMode::ByConcurrency`].
    pub concurrency: usize,

    /// Files never to select.
    pub sauceignore: Sauceignore,
}

impl ShardContext {
    pub fn new(root_dir: impl Into<PathBuf>, concurrency: usize) -> Self {
        Self {
            root_dir: root_dir.into(),
            concurrency,
            sauceignore: Sauceignore::none(),
        }
    }

    pub fn with_sauceignore(mut self, sauceignore: Sauceignore) -> Self {
        self.sauceignore = sauceignore;
        self
    }

    /// Spec file access rooted at [`ShardContext::root_dir`].
    pub fn source(&self) -> DirSource {
        DirSource::new(self.root_dir.clone())
    }
}

/// The outcome of a framework filter over the collected items.
#[derive(Debug, Clone)]
pub struct Filtered {
    /// Human readable filter, used in logs and errors.
    pub expression: String,
    pub result: MatchResult,
}

/// Framework specific parts of sharding.
///
/// Only the accessors and [`Sharder::replicate`] are required; the
/// remaining hooks default to resolving spec-file patterns without any
/// filtering.
pub trait Sharder {
    type Suite: Clone;

    fn name<'a>(&self, suite: &'a Self::Suite) -> &'a str;

    fn mode(&self, suite: &Self::Suite) -> ShardMode;

    fn include<'a>(&self, suite: &'a Self::Suite) -> &'a [String];

    fn exclude<'a>(&self, _suite: &'a Self::Suite) -> &'a [String] {
        &[]
    }

    /// Collects the items to split.
    fn items(&self, suite: &Self::Suite, ctx: &ShardContext) -> ShardResult<Vec<String>> {
        let files = fileset::resolve(&ctx.root_dir, self.include(suite), self.exclude(suite))?;
        Ok(ctx.sauceignore.filter(files))
    }

    /// Narrows the items with the suite's filter expression, if it has one.
    fn filter(
        &self,
        _suite: &Self::Suite,
        _ctx: &ShardContext,
        _items: &[String],
    ) -> Option<Filtered> {
        None
    }

    /// Maps filtered items to the units replicas are created for.
    fn expand(
        &self,
        _suite: &Self::Suite,
        _ctx: &ShardContext,
        items: Vec<String>,
    ) -> ShardResult<Vec<String>> {
        Ok(items)
    }

    /// Clones `suite` under `name`, selecting only `selection`.
    fn replicate(&self, suite: &Self::Suite, name: String, selection: Vec<String>) -> Self::Suite;
}

/// Shards a single suite.
pub fn shard_suite<S: Sharder + ?Sized>(
    sharder: &S,
    suite: &S::Suite,
    ctx: &ShardContext,
) -> ShardResult<Vec<S::Suite>> {
    let mode = sharder.mode(suite);
    if mode == ShardMode::None {
        return Ok(vec![suite.clone()]);
    }

    let name = sharder.name(suite);
    let mut items = sharder.items(suite, ctx)?;
    if items.is_empty() {
        error!(
            suite = name,
            root = %ctx.root_dir.display(),
            patterns = ?sharder.include(suite),
            "The suite's test file patterns have no matching files"
        );
        return Err(ShardError::NoMatch {
            suite: name.to_string(),
            patterns: sharder.include(suite).to_vec(),
        });
    }

    if let Some(filtered) = sharder.filter(suite, ctx, &items) {
        if filtered.result.matched.is_empty() {
            error!(
                suite = name,
                expression = %filtered.expression,
                "No files match the configured filter"
            );
            return Err(ShardError::NoMatchingTests {
                suite: name.to_string(),
                filter: filtered.expression,
            });
        }
        if !filtered.result.unmatched.is_empty() {
            info!(
                suite = name,
                expression = %filtered.expression,
                "Files filtered out: {:?}",
                filtered.result.unmatched
            );
        }
        items = filtered.result.matched;
    }

    let items = sharder.expand(suite, ctx, items)?;
    debug!(suite = name, items = items.len(), ?mode, "Sharding suite");

    let replicas = match mode {
        ShardMode::None => vec![suite.clone()],
        ShardMode::ByFile => items
            .into_iter()
            .map(|item| sharder.replicate(suite, format!("{name} - {item}"), vec![item]))
            .collect(),
        ShardMode::ByConcurrency => {
            let buckets = bin_pack(&items, ctx.concurrency);
            let total = buckets.len();
            buckets
                .into_iter()
                .enumerate()
                .map(|(i, bucket)| {
                    sharder.replicate(suite, format!("{name} - {}/{total}", i + 1), bucket)
                })
                .collect()
        }
    };
    Ok(replicas)
}

/// Shards every suite in order, stopping at the first error.
pub fn shard_suites<S: Sharder + ?Sized>(
    sharder: &S,
    suites: &[S::Suite],
    ctx: &ShardContext,
) -> ShardResult<Vec<S::Suite>> {
    let mut sharded = Vec::with_capacity(suites.len());
    for suite in suites {
        sharded.extend(shard_suite(sharder, suite, ctx)?);
    }
    Ok(sharded)
}
