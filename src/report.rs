//! Shard plan reporting and output generation.
//!
//! A [`ShardPlan`] is the ordered list of suites that would be submitted
//! after sharding. It renders as styled text for people, or as JSON/TOML
//! for tooling. [`ShardPlan::digest`] fingerprints the replica assignment
//! so CI can detect when a change to patterns, filters or concurrency
//! moves specs between shards.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::config::{CucumberSuite, SuiteConfig};
use crate::framework::Collection;

/// The suites of a project after sharding.
#[derive(Debug, Clone, Serialize)]
pub struct ShardPlan {
    /// Concurrency the plan was computed for.
    pub concurrency: usize,

    /// SHA-256 of the replica names and selections.
    pub digest: String,

    pub suites: Vec<SuiteConfig>,
}

impl ShardPlan {
    pub fn new(concurrency: usize, suites: Vec<SuiteConfig>) -> Self {
        let digest = digest(&suites);
        Self {
            concurrency,
            digest,
            suites,
        }
    }

    /// Renders the plan for a terminal.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} {} suites at concurrency {}",
            console::style("Shard plan:").bold(),
            self.suites.len(),
            self.concurrency
        );

        for suite in &self.suites {
            let _ = writeln!(
                out,
                "  {:<10} {}",
                console::style(suite.framework()).cyan(),
                console::style(suite.name()).bold()
            );
            if let SuiteConfig::Cucumber(CucumberSuite {
                scenario_name: Some(pattern),
                ..
            }) = suite
            {
                let _ = writeln!(out, "      scenario {}", console::style(pattern).yellow());
            }
            for item in suite.selection() {
                let _ = writeln!(out, "      {item}");
            }
        }

        let _ = writeln!(out, "{} {}", console::style("Digest:").dim(), self.digest);
        out
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize shard plan to JSON")
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize shard plan to TOML")
    }
}

/// Fingerprints the replica assignment of `suites`.
///
/// Only names and selections contribute, so reordering unrelated config
/// keys does not change the digest.
pub fn digest(suites: &[SuiteConfig]) -> String {
    let mut hasher = Sha256::new();
    for suite in suites {
        hasher.update(suite.framework().as_bytes());
        hasher.update([0]);
        hasher.update(suite.name().as_bytes());
        hasher.update([0]);
        if let SuiteConfig::Cucumber(CucumberSuite {
            scenario_name: Some(pattern),
            ..
        }) = suite
        {
            hasher.update(pattern.as_bytes());
        }
        hasher.update([0]);
        for item in suite.selection() {
            hasher.update(item.as_bytes());
            hasher.update([b'\n']);
        }
        hasher.update([0xff]);
    }
    format!("{:x}", hasher.finalize())
}

/// Renders the output of `saucectl collect` for a terminal.
pub fn render_collections(collections: &[Collection]) -> String {
    let mut out = String::new();
    for collection in collections {
        let _ = writeln!(
            out,
            "{} {} ({} selected, {} filtered out)",
            console::style(collection.framework).cyan(),
            console::style(&collection.suite).bold(),
            collection.selected.len(),
            collection.filtered_out.len()
        );
        for item in &collection.selected {
            let _ = writeln!(out, "  {}", item.path);
            for test in &item.tests {
                let _ = writeln!(out, "      {}", console::style(test).dim());
            }
        }
        for path in &collection.filtered_out {
            let _ = writeln!(out, "  {} {}", console::style("-").red(), console::style(path).dim());
        }
    }
    out
}
