//! Configuration module for plancheck.
//!
//! This module handles all configuration-related functionality:
//! - Parsing and deserializing `plancheck.yaml`
//! - Environment variable overrides
//! - Validation of configuration values

mod parser;
mod spec;
mod validator;

pub use parser::{ConfigParser, DEFAULT_CONFIG_FILES, find_config_file};
pub use spec::{CheckConfig, ToolConfig};
pub use validator::{ConfigValidator, ValidationError, ValidationResult};
