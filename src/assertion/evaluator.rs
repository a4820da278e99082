//! Evaluation of expectations against a change graph.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AssertionFailure, Result};
use crate::plan::{AttributePath, ChangeGraph, ResourceChange};

use super::expectation::{AttributeCheck, Condition, Expectation};

/// Evaluates expectations and collects per-check outcomes.
#[derive(Debug, Default)]
pub struct AssertionEvaluator;

/// Outcome of one check.
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    /// Resource type the check belongs to.
    pub resource_type: String,
    /// Address of the inspected change, if the check targets one.
    pub address: Option<String>,
    /// What was checked.
    pub check: String,
    /// Whether the check held.
    pub passed: bool,
    /// Why it failed, or a note on how it passed.
    pub detail: Option<String>,
}

/// Result of evaluating a full set of expectations.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    /// Identifier of this evaluation.
    pub run_id: Uuid,
    /// When the report was produced.
    pub generated_at: DateTime<Utc>,
    /// Fingerprint of the evaluated graph.
    pub fingerprint: String,
    /// Number of resource changes in the graph.
    pub resource_count: usize,
    /// Outcomes in expectation order.
    pub outcomes: Vec<CheckOutcome>,
}

impl AssertionEvaluator {
    /// Creates a new evaluator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Evaluates every expectation against the graph.
    ///
    /// A failed check is recorded in the report, not returned as an error.
    ///
    /// # Errors
    ///
    /// Returns an error if an attribute path cannot be parsed.
    pub fn evaluate(&self, graph: &ChangeGraph, expectations: &[Expectation]) -> Result<CheckReport> {
        let mut outcomes = Vec::new();

        for expectation in expectations {
            Self::evaluate_one(graph, expectation, &mut outcomes)?;
        }

        let report = CheckReport {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            fingerprint: graph.fingerprint(),
            resource_count: graph.len(),
            outcomes,
        };

        info!(
            "Evaluated {} checks: {} passed, {} failed",
            report.outcomes.len(),
            report.passed_count(),
            report.failed_count()
        );

        Ok(report)
    }

    fn evaluate_one(
        graph: &ChangeGraph,
        expectation: &Expectation,
        outcomes: &mut Vec<CheckOutcome>,
    ) -> Result<()> {
        let paths = expectation
            .attributes
            .iter()
            .map(|check| check.path.parse::<AttributePath>().map(|p| (p, check)))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let changes = graph.find_changes(&expectation.resource);
        debug!("Found {} '{}' changes", changes.len(), expectation.resource);

        outcomes.push(Self::count_outcome(expectation, changes.len()));

        for change in &changes {
            if expectation.after_defined {
                outcomes.push(Self::after_outcome(expectation, change));
            }

            for (path, check) in &paths {
                outcomes.push(Self::attribute_outcome(expectation, change, path, check));
            }
        }

        Ok(())
    }

    fn count_outcome(expectation: &Expectation, found: usize) -> CheckOutcome {
        let (check, passed) = expectation.count.map_or_else(
            || (format!("at least {} present", expectation.min_count), found >= expectation.min_count),
            |exact| (format!("exactly {exact} present"), found == exact),
        );

        CheckOutcome {
            resource_type: expectation.resource.clone(),
            address: None,
            check,
            passed,
            detail: if passed {
                expectation.description.clone()
            } else {
                Some(format!("found {found}"))
            },
        }
    }

    /// Presence of the `after` field only. A `null` snapshot (planned
    /// destroy) still passes; its contents are never inspected.
    fn after_outcome(expectation: &Expectation, change: &ResourceChange) -> CheckOutcome {
        let present = change.change.after_present;
        let detail = if !present {
            Some(String::from("plan carries no after field"))
        } else if change.change.after.is_null() {
            Some(String::from("after is null"))
        } else {
            None
        };

        CheckOutcome {
            resource_type: expectation.resource.clone(),
            address: change.address.clone(),
            check: String::from("after is defined"),
            passed: present,
            detail,
        }
    }

    fn attribute_outcome(
        expectation: &Expectation,
        change: &ResourceChange,
        path: &AttributePath,
        check: &AttributeCheck,
    ) -> CheckOutcome {
        let value = change.attribute_after(path);

        let (passed, detail) = match (&check.condition, value) {
            (Condition::Equals(_), None) => (false, Some(String::from("attribute is absent"))),
            (Condition::Equals(expected), Some(actual)) => match actual.matches_literal(expected) {
                Some(true) => (true, None),
                Some(false) => (false, Some(format!("found {actual}"))),
                None => (
                    false,
                    Some(String::from(
                        "value is known only after apply; only definedness can be asserted",
                    )),
                ),
            },
            (Condition::Defined(true), Some(actual)) => {
                (true, actual.is_unknown().then(|| String::from("known after apply")))
            }
            (Condition::Defined(true), None) => (false, Some(String::from("attribute is absent"))),
            (Condition::Defined(false), None) => (true, None),
            (Condition::Defined(false), Some(actual)) => (false, Some(format!("found {actual}"))),
        };

        CheckOutcome {
            resource_type: expectation.resource.clone(),
            address: change.address.clone(),
            check: format!("{path} {}", check.condition),
            passed,
            detail,
        }
    }
}

impl CheckReport {
    /// Returns the number of passed checks.
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed).count()
    }

    /// Returns the number of failed checks.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.passed).count()
    }

    /// Returns true if every check passed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.passed)
    }

    /// Returns the failed outcomes.
    #[must_use]
    pub fn failures(&self) -> Vec<&CheckOutcome> {
        self.outcomes.iter().filter(|o| !o.passed).collect()
    }

    /// Converts a report with failures into an [`AssertionFailure`].
    ///
    /// # Errors
    ///
    /// Returns an error if any check failed.
    pub fn into_result(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }

        Err(AssertionFailure {
            failures: self.failures().iter().map(|o| o.to_string()).collect(),
            total: self.outcomes.len(),
        }
        .into())
    }
}

impl std::fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.address.as_deref().unwrap_or(&self.resource_type),
            self.check
        )?;
        if let Some(detail) = &self.detail {
            write!(f, " ({detail})")?;
        }
        Ok(())
    }
}
