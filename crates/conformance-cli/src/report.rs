// crates/conformance-cli/src/report.rs
// ============================================================================
// Module: Report Rendering
// Description: JSON and Markdown renderings of a conformance report.
// Purpose: Present per-step outcomes and SKIP-free aggregate counts.
// Dependencies: conformance-core, serde, serde_json
// ============================================================================

//! ## Overview
//! Both renderings list every resource type in discovery order with its
//! outcomes in step order. Aggregate counts report `SKIP` separately and
//! never include it in the scored total.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write;

use conformance_core::ConformanceReport;
use conformance_core::OutcomeCounts;
use conformance_core::ResourceReport;
use conformance_core::ResourceType;
use conformance_core::StepOutcome;
use serde::Serialize;

// ============================================================================
// SECTION: JSON
// ============================================================================

/// Serialized report document.
#[derive(Debug, Serialize)]
struct ReportDocument<'a> {
    /// Counts across every resource type.
    summary: SummaryDocument,
    /// True when the run was cut short.
    cancelled: bool,
    /// Per-resource-type sections.
    resources: Vec<ResourceDocument<'a>>,
}

/// Aggregate counts plus the scored total.
#[derive(Debug, Serialize)]
struct SummaryDocument {
    /// Per-status counts.
    #[serde(flatten)]
    counts: OutcomeCounts,
    /// Pass, fail, and error count; skips excluded.
    scored: usize,
}

impl From<OutcomeCounts> for SummaryDocument {
    fn from(counts: OutcomeCounts) -> Self {
        Self {
            counts,
            scored: counts.scored(),
        }
    }
}

/// One resource type section.
#[derive(Debug, Serialize)]
struct ResourceDocument<'a> {
    /// Resource type name.
    resource_type: &'a ResourceType,
    /// True when this type's run was cut short.
    cancelled: bool,
    /// Counts for this type.
    summary: SummaryDocument,
    /// Step outcomes in order.
    outcomes: &'a [StepOutcome],
}

/// Renders the report as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`serde_json::Error`] when serialization fails.
pub fn render_json(report: &ConformanceReport) -> Result<String, serde_json::Error> {
    let document = ReportDocument {
        summary: OutcomeCounts::for_report(report).into(),
        cancelled: report.cancelled,
        resources: report
            .resources
            .iter()
            .map(|resource| ResourceDocument {
                resource_type: &resource.resource_type,
                cancelled: resource.cancelled,
                summary: OutcomeCounts::for_resource(resource).into(),
                outcomes: &resource.outcomes,
            })
            .collect(),
    };
    serde_json::to_string_pretty(&document)
}

// ============================================================================
// SECTION: Markdown
// ============================================================================

/// Renders the report as Markdown tables.
#[must_use]
pub fn render_markdown(report: &ConformanceReport) -> String {
    let mut out = String::from("# Conformance Report\n\n");
    push_counts(&mut out, OutcomeCounts::for_report(report));
    if report.cancelled {
        out.push_str("\n_Run cancelled before completion._\n");
    }
    for resource in &report.resources {
        push_resource(&mut out, resource);
    }
    out
}

/// Appends one counts table.
fn push_counts(out: &mut String, counts: OutcomeCounts) {
    out.push_str("| Passed | Failed | Errors | Skipped | Scored |\n");
    out.push_str("|---|---|---|---|---|\n");
    let _ = writeln!(
        out,
        "| {} | {} | {} | {} | {} |",
        counts.passed,
        counts.failed,
        counts.errored,
        counts.skipped,
        counts.scored()
    );
}

/// Appends one resource type section.
fn push_resource(out: &mut String, resource: &ResourceReport) {
    let _ = writeln!(out, "\n## {}\n", resource.resource_type);
    push_counts(out, OutcomeCounts::for_resource(resource));
    if resource.cancelled {
        out.push_str("\n_Cancelled; remaining steps did not run._\n");
    }
    if resource.outcomes.is_empty() {
        return;
    }
    out.push_str("\n| Step | Title | Status | Message |\n|---|---|---|---|\n");
    for outcome in &resource.outcomes {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} |",
            outcome.step_id,
            escape_cell(&outcome.title),
            outcome.status.as_str().to_ascii_uppercase(),
            escape_cell(&outcome.message())
        );
    }
}

/// Escapes text for a Markdown table cell.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

// ============================================================================
// SECTION: Tests
// ============================================================================
