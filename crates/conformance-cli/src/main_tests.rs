// crates/conformance-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing and run helpers.
// Purpose: Pin exit-code mapping and resource type selection.
// Dependencies: conformance-cli main helpers
// ============================================================================

//! ## Overview
//! Covers the exit-code contract (`0` clean, `1` nonconformant, `2` harness)
//! and the `--resource-type` restriction against the configured catalog.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::process::ExitCode;

use clap::Parser;
use conformance_core::ConformanceReport;
use conformance_core::ResourceReport;
use conformance_core::ResourceType;
use conformance_core::StepId;
use conformance_core::StepOutcome;
use conformance_core::StepStatus;
use conformance_providers::StaticCatalog;

use super::Cli;
use super::Commands;
use super::FormatArg;
use super::exit_code_for;
use super::select_resource_types;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn report_with(statuses: &[StepStatus], cancelled: bool) -> ConformanceReport {
    let patient = ResourceType::new("Patient");
    let outcomes = statuses
        .iter()
        .map(|status| {
            StepOutcome::new(StepId::new("X000"), "title", patient.clone(), *status, "message")
        })
        .collect();
    ConformanceReport::from_resources(vec![ResourceReport {
        resource_type: patient,
        outcomes,
        cancelled,
    }])
}

fn catalog() -> StaticCatalog {
    StaticCatalog::new([
        (ResourceType::new("Patient"), true),
        (ResourceType::new("Dosage"), false),
        (ResourceType::new("Observation"), true),
    ])
    .unwrap()
}

// ============================================================================
// SECTION: Exit Codes
// ============================================================================

#[test]
fn passes_and_skips_exit_zero() {
    let report = report_with(&[StepStatus::Pass, StepStatus::Skip], false);
    assert_eq!(exit_code_for(&report), ExitCode::SUCCESS);
}

#[test]
fn failures_and_errors_exit_one() {
    let failed = report_with(&[StepStatus::Pass, StepStatus::Fail], false);
    assert_eq!(exit_code_for(&failed), ExitCode::from(1));
    let errored = report_with(&[StepStatus::Error], false);
    assert_eq!(exit_code_for(&errored), ExitCode::from(1));
}

#[test]
fn cancelled_run_exits_two() {
    let report = report_with(&[StepStatus::Pass], true);
    assert_eq!(exit_code_for(&report), ExitCode::from(2));
}

// ============================================================================
// SECTION: Resource Type Selection
// ============================================================================

#[test]
fn no_filter_selects_every_root_type() {
    let selected = select_resource_types(&catalog(), &[]).unwrap();
    assert_eq!(selected, vec![ResourceType::new("Patient"), ResourceType::new("Observation")]);
}

#[test]
fn filter_keeps_catalog_order() {
    let requested = vec!["Observation".to_string(), "Patient".to_string()];
    let selected = select_resource_types(&catalog(), &requested).unwrap();
    assert_eq!(selected, vec![ResourceType::new("Patient"), ResourceType::new("Observation")]);
}

#[test]
fn embedded_or_unknown_types_are_rejected() {
    let embedded = select_resource_types(&catalog(), &["Dosage".to_string()]).unwrap_err();
    assert!(embedded.to_string().contains("not configured as root: Dosage"));
    let unknown = select_resource_types(&catalog(), &["Nope".to_string()]).unwrap_err();
    assert!(unknown.to_string().contains("Nope"));
}

// ============================================================================
// SECTION: Argument Parsing
// ============================================================================

#[test]
fn run_arguments_parse() {
    let cli = Cli::try_parse_from([
        "conformance",
        "--log-json",
        "run",
        "--resource-type",
        "Patient",
        "--resource-type",
        "Observation",
        "--format",
        "markdown",
        "--parallelism",
        "4",
        "--deadline-ms",
        "500",
    ])
    .unwrap();
    assert!(cli.log_json);
    let Commands::Run(run) = cli.command else {
        panic!("expected run command");
    };
    assert_eq!(run.resource_types, vec!["Patient", "Observation"]);
    assert_eq!(run.format, Some(FormatArg::Markdown));
    assert_eq!(run.parallelism, Some(4));
    assert_eq!(run.deadline_ms, Some(500));
    assert!(run.config.is_none());
}

#[test]
fn unknown_format_is_rejected() {
    assert!(Cli::try_parse_from(["conformance", "run", "--format", "xml"]).is_err());
}
