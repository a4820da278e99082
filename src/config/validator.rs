//! Configuration validation for check suites.
//!
//! This module validates a check suite before any external tool is run,
//! so that mistakes in the suite surface as configuration errors rather
//! than as confusing plan failures.

use crate::assertion::{presets, Condition, Expectation};
use crate::error::{ConfigError, PlanCheckError, Result};
use crate::plan::AttributePath;
use std::collections::HashSet;
use tracing::debug;

use super::spec::{CheckConfig, ToolConfig};

/// Validator for check-suite configurations.
#[derive(Debug, Default)]
pub struct ConfigValidator;

/// Validation result containing all errors found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The field path that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl ConfigValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a check-suite configuration.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first problem found.
    pub fn validate(&self, config: &CheckConfig) -> Result<ValidationResult> {
        let mut result = ValidationResult::default();

        Self::validate_tool(&config.tool, &mut result);

        if config.timeout_secs == 0 {
            result.errors.push(ValidationError {
                field: String::from("timeout_secs"),
                message: String::from("Timeout must be at least 1 second"),
            });
        }

        if let Some(name) = &config.preset
            && presets::preset(name).is_err()
        {
            result.errors.push(ValidationError {
                field: String::from("preset"),
                message: format!(
                    "Unknown preset '{name}'. Available: {}",
                    presets::PRESET_NAMES.join(", ")
                ),
            });
        }

        Self::validate_expectations(&config.expectations, &mut result);

        if config.expectations.is_empty() && config.preset.is_none() {
            result
                .warnings
                .push(String::from("No expectations defined; checks will trivially pass"));
        }

        if result.errors.is_empty() {
            debug!("Configuration validation passed");
            Ok(result)
        } else {
            let first_error = &result.errors[0];
            Err(PlanCheckError::Config(ConfigError::ValidationError {
                message: first_error.message.clone(),
                field: Some(first_error.field.clone()),
            }))
        }
    }

    /// Validates tool settings.
    fn validate_tool(tool: &ToolConfig, result: &mut ValidationResult) {
        if tool.binary.trim().is_empty() {
            result.errors.push(ValidationError {
                field: String::from("tool.binary"),
                message: String::from("Tool binary cannot be empty"),
            });
        }

        if tool.source_extension.is_empty() || tool.source_extension.starts_with('.') {
            result.errors.push(ValidationError {
                field: String::from("tool.source_extension"),
                message: format!(
                    "Source extension '{}' is invalid. Give it without the leading dot (e.g. 'tf').",
                    tool.source_extension
                ),
            });
        }

        if tool.plan_file.is_empty() || tool.plan_file.contains(['/', '\\']) {
            result.errors.push(ValidationError {
                field: String::from("tool.plan_file"),
                message: format!(
                    "Plan file '{}' must be a plain file name inside the source directory",
                    tool.plan_file
                ),
            });
        }

        if tool.keep_plan {
            result.warnings.push(format!(
                "tool.keep_plan: '{}' will be left in the source directory",
                tool.plan_file
            ));
        }
    }

    /// Validates expectations.
    fn validate_expectations(expectations: &[Expectation], result: &mut ValidationResult) {
        let mut seen = HashSet::new();

        for (i, expectation) in expectations.iter().enumerate() {
            let prefix = format!("expectations[{i}]");

            if expectation.resource.trim().is_empty() {
                result.errors.push(ValidationError {
                    field: format!("{prefix}.resource"),
                    message: String::from("Resource type cannot be empty"),
                });
            } else if !seen.insert(expectation.resource.as_str()) {
                result.warnings.push(format!(
                    "{prefix}.resource: '{}' appears more than once",
                    expectation.resource
                ));
            }

            if let Some(count) = expectation.count
                && count < expectation.min_count
            {
                result.errors.push(ValidationError {
                    field: format!("{prefix}.count"),
                    message: format!(
                        "count ({count}) is lower than min_count ({})",
                        expectation.min_count
                    ),
                });
            }

            for (j, check) in expectation.attributes.iter().enumerate() {
                if let Err(e) = check.path.parse::<AttributePath>() {
                    result.errors.push(ValidationError {
                        field: format!("{prefix}.attributes[{j}].path"),
                        message: e.to_string(),
                    });
                }

                if matches!(&check.condition, Condition::Equals(v) if v.is_null()) {
                    result.errors.push(ValidationError {
                        field: format!("{prefix}.attributes[{j}].equals"),
                        message: String::from(
                            "A null attribute counts as absent; use 'defined: false' instead of 'equals: null'",
                        ),
                    });
                }
            }

            if expectation.min_count == 0
                && expectation.count.is_none()
                && (!expectation.attributes.is_empty() || expectation.after_defined)
            {
                result.warnings.push(format!(
                    "{prefix}: attribute checks are skipped when no '{}' change is planned",
                    expectation.resource
                ));
            }
        }
    }
}

impl ValidationResult {
    /// Returns true if validation passed (no errors).
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of errors.
    #[must_use]
    pub const fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Returns the number of warnings.
    #[must_use]
    pub const fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
