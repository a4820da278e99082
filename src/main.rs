//! plancheck CLI entrypoint.
//!
//! This is the main entrypoint for the plancheck command-line tool.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use plancheck::assertion::{presets, Expectation};
use plancheck::cli::{Cli, Commands, OutputFormatter};
use plancheck::config::{find_config_file, CheckConfig, ConfigParser, ConfigValidator};
use plancheck::engine::PlanAssertionEngine;
use plancheck::error::{ConfigError, PlanCheckError, Result};
use plancheck::plan::ChangeGraph;

use clap::Parser;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let formatter = OutputFormatter::new(cli.output);

    match cli.command {
        Commands::Init { path, force } => cmd_init(&path, force),
        Commands::Validate { warnings } => cmd_validate(cli.config.as_ref(), warnings),
        Commands::Plan { source } => cmd_plan(cli.config.as_ref(), source, &formatter).await,
        Commands::Check { source, preset } => {
            cmd_check(cli.config.as_ref(), source, preset, &formatter).await
        }
    }
}

/// Write a starter check suite.
fn cmd_init(path: &Path, force: bool) -> Result<()> {
    info!("Initializing check suite in: {}", path.display());

    let config_path = path.join("plancheck.yaml");

    if !force && config_path.exists() {
        eprintln!("Configuration file already exists: {}", config_path.display());
        eprintln!("Use --force to overwrite.");
        return Ok(());
    }

    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }

    let config_template = include_str!("../templates/plancheck.yaml");
    std::fs::write(&config_path, config_template)?;
    eprintln!("Created: {}", config_path.display());

    eprintln!("\nCheck suite initialized.");
    eprintln!("Next steps:");
    eprintln!("  1. Point source_dir at the module to check");
    eprintln!("  2. Run 'plancheck validate' to check the suite");
    eprintln!("  3. Run 'plancheck check' to plan and assert");

    Ok(())
}

/// Validate configuration.
fn cmd_validate(config_path: Option<&PathBuf>, show_warnings: bool) -> Result<()> {
    let config_file = resolve_config_path(config_path)?;
    info!("Validating configuration: {}", config_file.display());

    let parser = parser_for(&config_file);
    parser.load_dotenv()?;
    let config = parser.load_with_env(&config_file)?;

    let result = ConfigValidator::new().validate(&config)?;

    eprintln!("Configuration is valid!");
    if show_warnings && !result.warnings.is_empty() {
        eprintln!("\nWarnings:");
        for warning in &result.warnings {
            eprintln!("  - {warning}");
        }
    }

    eprintln!("\nConfiguration summary:");
    eprintln!("  Source: {}", config.source_dir.display());
    eprintln!("  Tool: {}", config.tool.binary);
    eprintln!("  Preset: {}", config.preset.as_deref().unwrap_or("none"));
    eprintln!("  Expectations: {}", config.expectations.len());
    eprintln!("  Attribute checks: {}", config.attribute_check_count());

    Ok(())
}

/// Generate and list the plan.
async fn cmd_plan(
    config_path: Option<&PathBuf>,
    source: Option<PathBuf>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let config = load_config(config_path, source)?;
    let graph = generate_with_timeout(&config).await?;

    println!("{}", formatter.format_graph(&graph));
    Ok(())
}

/// Generate the plan and check it.
async fn cmd_check(
    config_path: Option<&PathBuf>,
    source: Option<PathBuf>,
    preset: Option<String>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let mut config = load_config(config_path, source)?;
    if preset.is_some() {
        config.preset = preset;
    }

    let expectations = collect_expectations(&config)?;
    if expectations.is_empty() {
        warn!("No expectations to check; only plan generation is verified");
    }

    let graph = generate_with_timeout(&config).await?;
    let report = plancheck::assertion::AssertionEvaluator::new().evaluate(&graph, &expectations)?;

    println!("{}", formatter.format_report(&report));
    report.into_result().map(|_| ())
}

/// Preset expectations first, then the suite's own.
fn collect_expectations(config: &CheckConfig) -> Result<Vec<Expectation>> {
    let mut expectations = match &config.preset {
        Some(name) => presets::preset(name)?,
        None => Vec::new(),
    };
    expectations.extend(config.expectations.iter().cloned());
    Ok(expectations)
}

/// Runs plan generation under the configured time limit.
async fn generate_with_timeout(config: &CheckConfig) -> Result<ChangeGraph> {
    let engine = PlanAssertionEngine::new(config.tool.clone());
    let limit = Duration::from_secs(config.timeout_secs);

    debug!(
        "Generating plan for {} (timeout {}s)",
        config.source_dir.display(),
        config.timeout_secs
    );

    engine.generate_plan_within(&config.source_dir, limit).await
}

/// Resolves the configuration file path.
fn resolve_config_path(config_path: Option<&PathBuf>) -> Result<PathBuf> {
    config_path.map_or_else(|| find_config_file("."), |path| Ok(path.clone()))
}

fn parser_for(config_file: &Path) -> ConfigParser {
    ConfigParser::new().with_base_path(config_file.parent().unwrap_or_else(|| Path::new(".")))
}

/// Loads and validates configuration, applying a source override.
///
/// Without a suite file, a `--source` override alone runs with defaults.
fn load_config(config_path: Option<&PathBuf>, source: Option<PathBuf>) -> Result<CheckConfig> {
    let mut config = match resolve_config_path(config_path) {
        Ok(config_file) => {
            debug!("Loading configuration from: {}", config_file.display());
            let parser = parser_for(&config_file);
            parser.load_dotenv()?;
            parser.load_with_env(&config_file)?
        }
        Err(PlanCheckError::Config(ConfigError::FileNotFound { .. }))
            if config_path.is_none() && source.is_some() =>
        {
            debug!("No configuration file found; using defaults");
            let mut config = CheckConfig::default();
            ConfigParser::apply_env_overrides(&mut config)?;
            config
        }
        Err(e) => return Err(e),
    };

    if let Some(source) = source {
        config.source_dir = source;
    }

    ConfigValidator::new().validate(&config)?;
    Ok(config)
}
