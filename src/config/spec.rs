//! Configuration specification types for a check suite.
//!
//! This module defines the structs that map to the `plancheck.yaml` file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::assertion::Expectation;

/// The root configuration of a check suite.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckConfig {
    /// Directory holding the declarative sources to plan.
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,
    /// External tool settings.
    #[serde(default)]
    pub tool: ToolConfig,
    /// Upper bound on a full plan generation, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Built-in expectation preset to include before `expectations`.
    #[serde(default)]
    pub preset: Option<String>,
    /// Expectations to check against the plan.
    #[serde(default)]
    pub expectations: Vec<Expectation>,
}

/// Settings for the external planning tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolConfig {
    /// Executable name or path.
    #[serde(default = "default_binary")]
    pub binary: String,
    /// Extension of the tool's source files, without the dot.
    #[serde(default = "default_source_extension")]
    pub source_extension: String,
    /// Plan artifact file name, written inside the source directory.
    #[serde(default = "default_plan_file")]
    pub plan_file: String,
    /// Keep the plan artifact after the run.
    #[serde(default)]
    pub keep_plan: bool,
    /// Extra environment variables for every tool invocation.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

fn default_source_dir() -> PathBuf {
    PathBuf::from(".")
}

const fn default_timeout_secs() -> u64 {
    180
}

fn default_binary() -> String {
    String::from("terraform")
}

fn default_source_extension() -> String {
    String::from("tf")
}

fn default_plan_file() -> String {
    String::from("plan.tfplan")
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            source_extension: default_source_extension(),
            plan_file: default_plan_file(),
            keep_plan: false,
            env: BTreeMap::new(),
        }
    }
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            tool: ToolConfig::default(),
            timeout_secs: default_timeout_secs(),
            preset: None,
            expectations: Vec::new(),
        }
    }
}

impl CheckConfig {
    /// Returns the number of attribute checks across all expectations.
    #[must_use]
    pub fn attribute_check_count(&self) -> usize {
        self.expectations.iter().map(|e| e.attributes.len()).sum()
    }

    /// Returns the resource types named by the expectations.
    #[must_use]
    pub fn resource_types(&self) -> Vec<&str> {
        self.expectations.iter().map(|e| e.resource.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_terraform() {
        let config = CheckConfig::default();
        assert_eq!(config.tool.binary, "terraform");
        assert_eq!(config.tool.source_extension, "tf");
        assert_eq!(config.tool.plan_file, "plan.tfplan");
        assert_eq!(config.timeout_secs, 180);
        assert!(!config.tool.keep_plan);
    }

    #[test]
    fn test_counts() {
        let mut config = CheckConfig::default();
        config.expectations = vec![
            Expectation::present("aws_s3_bucket"),
            Expectation::present("aws_s3_bucket_versioning")
                .expect_equals("versioning_configuration.status", "Enabled"),
        ];
        assert_eq!(config.attribute_check_count(), 1);
        assert_eq!(config.resource_types(), vec!["aws_s3_bucket", "aws_s3_bucket_versioning"]);
    }
}
