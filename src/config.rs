//! Configuration loading and schema definitions for saucectl.
//!
//! This module provides types and functions for loading the saucectl
//! project file from TOML files or strings, and the project level queries
//! the subcommands need before sharding.
//!
//! # The Configuration File Format is described in the README.

pub mod schema;

pub use schema::*;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::concurrency::{self, FixedLimit};
use crate::fileset::Sauceignore;
use crate::shard::ShardContext;

/// Loads saucectl configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read (e.g., doesn't exist or permission denied)
/// - The file contains invalid TOML syntax
/// - The configuration doesn't match the expected schema
///
/// # Example
///
/// ```no_run
/// use saucectl::config::load_config;
/// use std::path::Path;
///
/// let config = load_config(Path::new("saucectl.toml"))?;
/// println!("Concurrency: {}", config.sauce.concurrency);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}

/// Loads saucectl configuration from a TOML string.
///
/// # Example
///
/// ```
/// use saucectl::config::load_config_str;
///
/// let config = load_config_str(r#"
///     [sauce]
///     concurrency = 4
///
///     [[suites]]
///     framework = "testcafe"
///     name = "all"
///     src = ["tests/**/*.js"]
/// "#)?;
///
/// assert_eq!(config.sauce.concurrency, 4);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn load_config_str(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).context("Failed to parse config")?;

    Ok(config)
}

impl Config {
    /// Keeps only the suite named `name`.
    pub fn filter_suites(&mut self, name: &str) -> Result<()> {
        match self.suites.iter().position(|s| s.name() == name) {
            Some(idx) => {
                let suite = self.suites.swap_remove(idx);
                self.suites = vec![suite];
                Ok(())
            }
            None => bail!("no suite named '{name}' found"),
        }
    }

    /// The distinct shard values used by the suites, in suite order.
    pub fn shard_types(&self) -> Vec<&'static str> {
        let mut types = Vec::new();
        for shard in self.suites.iter().filter_map(SuiteConfig::shard_type) {
            if !types.contains(&shard) {
                types.push(shard);
            }
        }
        types
    }

    /// Whether any suite is sharded.
    pub fn is_sharded(&self) -> bool {
        self.suites.iter().any(|s| s.shard_type().is_some())
    }

    /// Checks the invariants serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.sauce.concurrency == 0 {
            bail!("sauce.concurrency must be at least 1");
        }
        let mut seen = std::collections::HashSet::new();
        for suite in &self.suites {
            if suite.name().trim().is_empty() {
                bail!("a {} suite has no name", suite.framework());
            }
            if !seen.insert(suite.name()) {
                bail!("suite name '{}' is used more than once", suite.name());
            }
        }
        Ok(())
    }

    /// `sauce.concurrency`, clamped to `sauce.max_concurrency` if set.
    pub fn effective_concurrency(&self) -> usize {
        match self.sauce.max_concurrency {
            Some(limit) => concurrency::min(&FixedLimit(limit), self.sauce.concurrency),
            None => self.sauce.concurrency,
        }
    }

    /// `sauce.root_dir` with `~` and environment variables expanded.
    pub fn root_dir(&self) -> Result<PathBuf> {
        let raw = self.sauce.root_dir.to_string_lossy();
        let expanded = shellexpand::full(&raw)
            .with_context(|| format!("Failed to expand root_dir: {raw}"))?;
        Ok(PathBuf::from(expanded.into_owned()))
    }

    /// Builds the sharding context, loading `.sauceignore` from the root.
    pub fn shard_context(&self) -> Result<ShardContext> {
        let root = self.root_dir()?;
        let sauceignore = Sauceignore::load(&root, &root.join(&self.sauce.sauceignore));
        Ok(ShardContext::new(root, self.effective_concurrency()).with_sauceignore(sauceignore))
    }
}
