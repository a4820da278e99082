//! Configuration parser for loading check-suite files.
//!
//! This module handles loading configuration from YAML files and environment
//! variables, with proper precedence and error handling.

use crate::error::{ConfigError, PlanCheckError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::spec::CheckConfig;

/// Default configuration file names to search for.
pub const DEFAULT_CONFIG_FILES: &[&str] = &["plancheck.yaml", "plancheck.yml"];

const ENV_SOURCE_DIR: &str = "PLANCHECK_SOURCE_DIR";
const ENV_TOOL_BINARY: &str = "PLANCHECK_TOOL_BINARY";
const ENV_TIMEOUT_SECS: &str = "PLANCHECK_TIMEOUT_SECS";

/// Configuration parser for loading check-suite configuration.
#[derive(Debug, Default)]
pub struct ConfigParser {
    /// Base path for resolving relative paths.
    base_path: Option<PathBuf>,
}

impl ConfigParser {
    /// Creates a new configuration parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path for resolving relative paths.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<CheckConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(PlanCheckError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            PlanCheckError::Config(ConfigError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            })
        })?;

        self.parse_yaml(&content, Some(path))
    }

    /// Parses configuration from a YAML string.
    ///
    /// A relative `source_dir` is resolved against the base path.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<CheckConfig> {
        debug!("Parsing YAML configuration");

        let mut config: CheckConfig = serde_yaml::from_str(content).map_err(|e| {
            let location = source.map(|p| p.display().to_string());
            PlanCheckError::Config(ConfigError::ParseError {
                message: format!("YAML parse error: {e}"),
                location,
            })
        })?;

        self.resolve_source_dir(&mut config);

        debug!(
            "Parsed configuration with {} expectation(s) for {}",
            config.expectations.len(),
            config.source_dir.display()
        );
        Ok(config)
    }

    /// Loads configuration with environment variable overrides.
    ///
    /// Recognized variables: `PLANCHECK_SOURCE_DIR`, `PLANCHECK_TOOL_BINARY`
    /// and `PLANCHECK_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or an override
    /// has an invalid value.
    pub fn load_with_env(&self, path: impl AsRef<Path>) -> Result<CheckConfig> {
        let mut config = self.load_file(path)?;

        Self::apply_env_overrides(&mut config)?;

        Ok(config)
    }

    /// Applies environment variable overrides to the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `PLANCHECK_TIMEOUT_SECS` is not a number.
    pub fn apply_env_overrides(config: &mut CheckConfig) -> Result<()> {
        Self::apply_overrides(config, |key| std::env::var(key).ok())
    }

    /// Applies overrides read through `lookup`, keyed by the
    /// `PLANCHECK_*` variable names.
    ///
    /// # Errors
    ///
    /// Returns an error if `PLANCHECK_TIMEOUT_SECS` is not a number.
    pub fn apply_overrides<F>(config: &mut CheckConfig, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_SOURCE_DIR) {
            debug!("Overriding source_dir from environment");
            config.source_dir = PathBuf::from(dir);
        }

        if let Some(binary) = lookup(ENV_TOOL_BINARY) {
            debug!("Overriding tool.binary from environment");
            config.tool.binary = binary;
        }

        if let Some(timeout) = lookup(ENV_TIMEOUT_SECS) {
            debug!("Overriding timeout_secs from environment");
            config.timeout_secs = timeout.trim().parse().map_err(|_| {
                ConfigError::validation(
                    format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds, got '{timeout}'"),
                    "timeout_secs",
                )
            })?;
        }

        Ok(())
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                PlanCheckError::Config(ConfigError::ParseError {
                    message: format!("Failed to load .env file: {e}"),
                    location: Some(env_path.display().to_string()),
                })
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }

    fn resolve_source_dir(&self, config: &mut CheckConfig) {
        if let Some(base) = &self.base_path
            && config.source_dir.is_relative()
        {
            config.source_dir = base.join(&config.source_dir);
        }
    }
}

/// Finds the configuration file in the given directory or its parents.
///
/// # Errors
///
/// Returns an error if no configuration file is found.
pub fn find_config_file(start_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let start = start_dir.as_ref();
    let mut current = start.to_path_buf();

    loop {
        for filename in DEFAULT_CONFIG_FILES {
            let config_path = current.join(filename);
            if config_path.exists() {
                info!("Found configuration file: {}", config_path.display());
                return Ok(config_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    Err(PlanCheckError::Config(ConfigError::FileNotFound {
        path: start.join(DEFAULT_CONFIG_FILES[0]),
    }))
}
