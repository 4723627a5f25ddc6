//! saucectl CLI - shard Sauce Labs test suites across concurrent jobs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use saucectl::config::{self, Config};
use saucectl::framework::{self, Collection};
use saucectl::report::{self, ShardPlan};

#[derive(Parser)]
#[command(name = "saucectl")]
#[command(about = "Shard Sauce Labs test suites across concurrent jobs", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "saucectl.toml")]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Shard suites and print the resulting suite list
    Shard {
        /// Override sauce.concurrency
        #[arg(long)]
        concurrency: Option<usize>,

        /// Override sauce.root_dir
        #[arg(long)]
        root_dir: Option<PathBuf>,

        /// Only shard the suite with this name
        #[arg(long)]
        suite: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Resolve and filter spec files without sharding
    Collect {
        /// Override sauce.root_dir
        #[arg(long)]
        root_dir: Option<PathBuf>,

        /// Only collect the suite with this name
        #[arg(long)]
        suite: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Validate configuration file
    Validate,

    /// Initialize a new configuration file
    Init {
        /// Framework of the starter suite
        #[arg(short, long, value_enum, default_value_t = InitFramework::Cypress)]
        framework: InitFramework,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    Toml,
}

#[derive(Clone, Copy, ValueEnum)]
enum InitFramework {
    Cypress,
    Playwright,
    Testcafe,
    Cucumber,
    Xcuitest,
    Espresso,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging; RUST_LOG takes precedence over --verbose
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Shard {
            concurrency,
            root_dir,
            suite,
            format,
        } => shard(&cli.config, concurrency, root_dir, suite, format),
        Commands::Collect {
            root_dir,
            suite,
            format,
        } => collect(&cli.config, root_dir, suite, format),
        Commands::Validate => validate_config(&cli.config),
        Commands::Init { framework } => init_config(&cli.config, framework),
    }
}

fn load(
    config_path: &Path,
    root_dir: Option<PathBuf>,
    suite: Option<String>,
) -> Result<Config> {
    let mut config = config::load_config(config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    if let Some(root_dir) = root_dir {
        config.sauce.root_dir = root_dir;
    }
    if let Some(name) = suite {
        config.filter_suites(&name)?;
    }

    info!("Loaded configuration from {}", config_path.display());
    Ok(config)
}

fn shard(
    config_path: &Path,
    concurrency: Option<usize>,
    root_dir: Option<PathBuf>,
    suite: Option<String>,
    format: Format,
) -> Result<()> {
    let mut config = load(config_path, root_dir, suite)?;
    if let Some(concurrency) = concurrency {
        config.sauce.concurrency = concurrency;
    }
    config.validate()?;

    let ctx = config.shard_context()?;
    info!(
        suites = config.suites.len(),
        concurrency = ctx.concurrency,
        root = %ctx.root_dir.display(),
        "Sharding suites"
    );

    let suites = framework::shard_all(&config.suites, &ctx).context("Failed to shard suites")?;
    let plan = ShardPlan::new(ctx.concurrency, suites);
    info!(replicas = plan.suites.len(), digest = %plan.digest, "Sharding complete");

    match format {
        Format::Text => print!("{}", plan.render_text()),
        Format::Json => println!("{}", plan.to_json()?),
        Format::Toml => print!("{}", plan.to_toml()?),
    }
    Ok(())
}

#[derive(Serialize)]
struct Collected {
    suites: Vec<Collection>,
}

fn collect(
    config_path: &Path,
    root_dir: Option<PathBuf>,
    suite: Option<String>,
    format: Format,
) -> Result<()> {
    let config = load(config_path, root_dir, suite)?;
    config.validate()?;
    let ctx = config.shard_context()?;

    let mut collections = Vec::with_capacity(config.suites.len());
    for suite in &config.suites {
        collections.push(
            framework::collect(suite, &ctx)
                .with_context(|| format!("Failed to collect suite '{}'", suite.name()))?,
        );
    }

    match format {
        Format::Text => print!("{}", report::render_collections(&collections)),
        Format::Json => println!(
            "{}",
            serde_json::to_string_pretty(&Collected {
                suites: collections
            })?
        ),
        Format::Toml => print!(
            "{}",
            toml::to_string_pretty(&Collected {
                suites: collections
            })?
        ),
    }
    Ok(())
}

fn validate_config(config_path: &Path) -> Result<()> {
    let config = match config::load_config(config_path).and_then(|c| c.validate().map(|()| c)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            std::process::exit(1);
        }
    };

    println!("Configuration is valid!");
    println!();
    println!("Settings:");
    println!("  Concurrency: {}", config.effective_concurrency());
    println!("  Root dir: {}", config.sauce.root_dir.display());
    println!("  Sauceignore: {}", config.sauce.sauceignore.display());
    println!("  Suites: {}", config.suites.len());
    for suite in &config.suites {
        println!(
            "    {} ({}, shard: {})",
            suite.name(),
            suite.framework(),
            suite.shard_type().unwrap_or("none")
        );
    }
    if config.is_sharded() {
        println!("  Shard types: {}", config.shard_types().join(", "));
    }

    Ok(())
}

fn init_config(path: &Path, framework: InitFramework) -> Result<()> {
    let suite_config = match framework {
        InitFramework::Cypress => {
            r#"[[suites]]
framework = "cypress"
name = "cypress"
spec_pattern = ["cypress/e2e/**/*.cy.js"]
shard = "concurrency"
shard_grep_enabled = false

[suites.env]
# grep = "checkout"
# grepTags = "@smoke"
"#
        }
        InitFramework::Playwright => {
            r#"[[suites]]
framework = "playwright"
name = "playwright"
test_match = ["tests/**/*.spec.ts"]
shard = "spec"
shard_grep_enabled = false
# grep = "@smoke"
# grep_invert = "@slow"
"#
        }
        InitFramework::Testcafe => {
            r#"[[suites]]
framework = "testcafe"
name = "testcafe"
src = ["tests/**/*.js"]
shard = "concurrency"
"#
        }
        InitFramework::Cucumber => {
            r#"[[suites]]
framework = "cucumber"
name = "cucumber"
paths = ["features/**/*.feature"]
shard = "scenario"
shard_tags_enabled = false
# tags = ["@smoke", "not @wip"]
"#
        }
        InitFramework::Xcuitest => {
            r#"[[suites]]
framework = "xcuitest"
name = "xcuitest"
test_list_file = "tests.txt"
shard = "concurrency"
"#
        }
        InitFramework::Espresso => {
            r#"[[suites]]
framework = "espresso"
name = "espresso"
test_list_file = "tests.txt"
shard = "concurrency"
"#
        }
    };

    let config = format!(
        r#"# saucectl configuration file

[sauce]
concurrency = 2
root_dir = "."
sauceignore = ".sauceignore"

{}"#,
        suite_config
    );

    if path.exists() {
        bail!(
            "{} already exists. Remove it first or edit manually.",
            path.display()
        );
    }

    std::fs::write(path, config)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Created {}", path.display());
    println!();
    println!("Edit the configuration as needed, then run:");
    println!("  saucectl shard");

    Ok(())
}
