//! saucectl: test-file sharding and tag/grep filtering for Sauce Labs runs.
//!
//! This crate turns the suites of a saucectl project into the list of
//! suites that is actually submitted: spec patterns are resolved, files are
//! narrowed by the framework's own filter dialect, and suites are split
//! into replicas that run concurrently.
//!
//! # Architecture
//!
//! The main components are:
//!
//! - **Fileset**: Resolve glob patterns and `.sauceignore` ([`fileset`])
//! - **Source**: Scrape test titles and tags from JavaScript specs ([`source`])
//! - **Filter**: Cucumber tag expressions, `@cypress/grep`, Playwright grep ([`filter`])
//! - **Shard**: Split suites by file or by concurrency ([`shard`], [`concurrency`])
//! - **Framework**: One sharding adapter per framework ([`framework`])
//! - **Report**: Render the resulting plan ([`report`])
//!
//! # Example
//!
//! ```no_run
//! use saucectl::config::load_config;
//! use saucectl::framework::shard_all;
//! use saucectl::report::ShardPlan;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = load_config(std::path::Path::new("saucectl.toml"))?;
//!     let ctx = config.shard_context()?;
//!     let plan = ShardPlan::new(ctx.concurrency, shard_all(&config.suites, &ctx)?);
//!     print!("{}", plan.render_text());
//!     Ok(())
//! }
//! ```

pub mod concurrency;
pub mod config;
pub mod fileset;
pub mod filter;
pub mod framework;
pub mod report;
pub mod shard;
pub mod source;

// Re-export commonly used types
pub use config::{Config, SuiteConfig, load_config};
pub use report::ShardPlan;
pub use shard::{ShardContext, ShardError, ShardMode, ShardResult, Sharder};
