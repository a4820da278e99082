//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! plans and check reports in text or JSON.

use colored::Colorize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::assertion::CheckReport;
use crate::plan::{ChangeGraph, PlanValue};

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Resource change row for table display.
#[derive(Tabled)]
struct ChangeRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Type")]
    resource_type: String,
    #[tabled(rename = "Actions")]
    actions: String,
    #[tabled(rename = "Unknown")]
    unknown: String,
}

/// Check outcome row for table display.
#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "")]
    status: String,
    #[tabled(rename = "Resource")]
    resource: String,
    #[tabled(rename = "Check")]
    check: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a change graph for display.
    #[must_use]
    pub fn format_graph(&self, graph: &ChangeGraph) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(&GraphJson::from(graph)).unwrap_or_default()
            }
            OutputFormat::Text => Self::format_graph_text(graph),
        }
    }

    /// Formats a graph as text.
    fn format_graph_text(graph: &ChangeGraph) -> String {
        if graph.is_empty() {
            return format!("{} Plan lists no resource changes.\n", "✓".green());
        }

        let mut output = String::new();

        let _ = write!(output, "\nPlan ({} resource changes)\n", graph.len());
        if let Some(version) = &graph.tool_version {
            let _ = writeln!(output, "   Tool version: {version}");
        }
        let _ = write!(output, "   Fingerprint: {}\n\n", Self::short(&graph.fingerprint()));

        let rows: Vec<ChangeRow> = graph
            .resource_changes()
            .iter()
            .enumerate()
            .map(|(i, rc)| ChangeRow {
                index: i + 1,
                address: Self::truncate(rc.label(), 60),
                resource_type: rc.resource_type.clone(),
                actions: rc.action_summary(),
                unknown: if rc.change.after.contains_unknown() {
                    String::from("yes")
                } else {
                    String::new()
                },
            })
            .collect();

        output.push_str(&Table::new(rows).to_string());
        output.push('\n');

        output
    }

    /// Formats a check report for display.
    #[must_use]
    pub fn format_report(&self, report: &CheckReport) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_default(),
            OutputFormat::Text => Self::format_report_text(report),
        }
    }

    /// Formats a report as text.
    fn format_report_text(report: &CheckReport) -> String {
        let mut output = String::new();

        let _ = write!(
            output,
            "\nPlan checks ({} resource changes, fingerprint {})\n\n",
            report.resource_count,
            Self::short(&report.fingerprint)
        );

        let rows: Vec<OutcomeRow> = report
            .outcomes
            .iter()
            .map(|o| OutcomeRow {
                status: if o.passed {
                    "✓".green().to_string()
                } else {
                    "✗".red().to_string()
                },
                resource: o.address.clone().unwrap_or_else(|| o.resource_type.clone()),
                check: o.check.clone(),
                detail: Self::truncate(o.detail.as_deref().unwrap_or(""), 60),
            })
            .collect();

        if !rows.is_empty() {
            output.push_str(&Table::new(rows).to_string());
            output.push('\n');
        }

        let summary = if report.is_success() {
            "passed".green().to_string()
        } else {
            "failed".red().to_string()
        };
        let _ = writeln!(
            output,
            "\nResult: {summary} ({} passed, {} failed)",
            report.passed_count().to_string().green(),
            report.failed_count().to_string().red()
        );

        output
    }

    fn short(hash: &str) -> &str {
        hash.get(..12).unwrap_or(hash)
    }

    /// Truncates a string for table display.
    fn truncate(s: &str, max_len: usize) -> String {
        if s.chars().count() <= max_len {
            s.to_string()
        } else {
            let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
            format!("{kept}...")
        }
    }
}

#[derive(serde::Serialize)]
struct GraphJson<'a> {
    fingerprint: String,
    format_version: Option<&'a str>,
    tool_version: Option<&'a str>,
    resource_count: usize,
    resource_changes: Vec<ChangeJson<'a>>,
}

#[derive(serde::Serialize)]
struct ChangeJson<'a> {
    address: Option<&'a str>,
    resource_type: &'a str,
    actions: Vec<&'static str>,
    after: &'a PlanValue,
}

impl<'a> From<&'a ChangeGraph> for GraphJson<'a> {
    fn from(graph: &'a ChangeGraph) -> Self {
        Self {
            fingerprint: graph.fingerprint(),
            format_version: graph.format_version.as_deref(),
            tool_version: graph.tool_version.as_deref(),
            resource_count: graph.len(),
            resource_changes: graph
                .resource_changes()
                .iter()
                .map(|rc| ChangeJson {
                    address: rc.address.as_deref(),
                    resource_type: &rc.resource_type,
                    actions: rc.change.actions.iter().map(|a| a.as_str()).collect(),
                    after: &rc.change.after,
                })
                .collect(),
        }
    }
}
