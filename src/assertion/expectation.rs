//! Declarative expectations about a change graph.
//!
//! Expectations are written in the check-suite YAML file:
//!
//! ```yaml
//! expectations:
//!   - resource: aws_s3_bucket_versioning
//!     attributes:
//!       - path: versioning_configuration.status
//!         equals: Enabled
//!   - resource: aws_iam_role
//!     after_defined: true
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Expectation about every resource change of one type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expectation {
    /// Resource type to select.
    pub resource: String,
    /// Minimum number of matching changes.
    #[serde(default = "default_min_count")]
    pub min_count: usize,
    /// Exact number of matching changes, if pinned.
    #[serde(default)]
    pub count: Option<usize>,
    /// Require each matching change to carry an `after` field (a `null` destroy snapshot counts).
    #[serde(default)]
    pub after_defined: bool,
    /// Attribute checks applied to each matching change.
    #[serde(default)]
    pub attributes: Vec<AttributeCheck>,
    /// Free-form note shown in reports.
    #[serde(default)]
    pub description: Option<String>,
}

/// A check on one attribute of the `after` snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttributeCheck {
    /// Dotted/indexed path into `after`.
    pub path: String,
    /// What must hold for the value at `path`.
    #[serde(flatten)]
    pub condition: Condition,
}

/// Condition on an attribute value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Value must be known and equal to the literal. `null` never matches,
    /// since a null attribute is absent; use `Defined(false)` for that.
    Equals(Value),
    /// `true`: value must be present (unknown counts as present).
    /// `false`: value must be absent or null.
    Defined(bool),
}

const fn default_min_count() -> usize {
    1
}

impl Expectation {
    /// Expects at least one change of the given type.
    #[must_use]
    pub fn present(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            min_count: default_min_count(),
            count: None,
            after_defined: false,
            attributes: Vec::new(),
            description: None,
        }
    }

    /// Pins the exact number of matching changes.
    #[must_use]
    pub const fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Requires an `after` field on each match, `null` included.
    #[must_use]
    pub const fn with_after_defined(mut self) -> Self {
        self.after_defined = true;
        self
    }

    /// Adds an equality check.
    #[must_use]
    pub fn expect_equals(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.push(AttributeCheck {
            path: path.into(),
            condition: Condition::Equals(value.into()),
        });
        self
    }

    /// Adds a definedness check.
    #[must_use]
    pub fn expect_defined(mut self, path: impl Into<String>) -> Self {
        self.attributes.push(AttributeCheck {
            path: path.into(),
            condition: Condition::Defined(true),
        });
        self
    }

    /// Sets the report description.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Equals(value) => write!(f, "== {value}"),
            Self::Defined(true) => write!(f, "is defined"),
            Self::Defined(false) => write!(f, "is absent"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_yaml_expectations() {
        let yaml = r"
- resource: aws_s3_bucket_versioning
  attributes:
    - path: versioning_configuration.status
      equals: Enabled
- resource: aws_s3_bucket_public_access_block
  count: 1
  attributes:
    - path: block_public_acls
      equals: true
    - path: policy
      defined: false
- resource: aws_iam_role
  after_defined: true
";
        let parsed: Vec<Expectation> = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].min_count, 1);
        assert_eq!(
            parsed[0].attributes[0].condition,
            Condition::Equals(json!("Enabled"))
        );
        assert_eq!(parsed[1].count, Some(1));
        assert_eq!(parsed[1].attributes[0].condition, Condition::Equals(json!(true)));
        assert_eq!(parsed[1].attributes[1].condition, Condition::Defined(false));
        assert!(parsed[2].after_defined);
        assert!(parsed[2].attributes.is_empty());
    }

    #[test]
    fn test_builder_matches_yaml() {
        let built = Expectation::present("aws_s3_bucket_versioning")
            .expect_equals("versioning_configuration.status", "Enabled");
        let parsed: Expectation = serde_yaml::from_str(
            "resource: aws_s3_bucket_versioning\nattributes:\n  - path: versioning_configuration.status\n    equals: Enabled\n",
        )
        .unwrap();

        assert_eq!(built, parsed);
    }

    #[test]
    fn test_condition_display() {
        assert_eq!(Condition::Equals(json!("Enabled")).to_string(), "== \"Enabled\"");
        assert_eq!(Condition::Defined(true).to_string(), "is defined");
    }
}
