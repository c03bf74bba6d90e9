// crates/conformance-core/src/core/outcome.rs
// ============================================================================
// Module: Resource Conformance Outcomes
// Description: Step outcomes and per-resource-type reports.
// Purpose: Capture the terminal result of every step with diagnostics.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! Every step invocation yields exactly one [`StepOutcome`]. Outcomes are
//! terminal: once a step returns its outcome to the sequencer it is never
//! mutated. Findings are accumulated while the outcome is being built, so a
//! step that detects several independent contract violations reports all of
//! them in a single `FAIL` outcome.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ResourceType;
use crate::core::identifiers::StepId;

// ============================================================================
// SECTION: Step Status
// ============================================================================

/// Terminal status of a step.
///
/// # Invariants
/// - `Fail` means the server under test violated an expected contract.
/// - `Skip` means the behavior was intentionally not exercised; it is never scored.
/// - `Error` means the harness could not complete the call (transport failure).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// The checked behavior conforms.
    Pass,
    /// The server violated the checked contract.
    Fail,
    /// The behavior was not exercised.
    Skip,
    /// The harness failed to complete the check.
    Error,
}

impl StepStatus {
    /// Returns true when the status counts toward pass/fail aggregates.
    #[must_use]
    pub const fn is_scored(self) -> bool {
        !matches!(self, Self::Skip)
    }

    /// Returns the stable lowercase label for the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Skip => "skip",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Step Outcome
// ============================================================================

/// Result produced by a single step invocation.
///
/// # Invariants
/// - `messages` is never empty.
/// - `raw_payload` is attached verbatim (server response or resource serialization).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    /// Step identifier from the step library.
    pub step_id: StepId,
    /// Human-readable description of the checked behavior.
    pub title: String,
    /// Resource type the step ran against.
    pub resource_type: ResourceType,
    /// Terminal status.
    pub status: StepStatus,
    /// Diagnostic lines, one per finding.
    pub messages: Vec<String>,
    /// Optional diagnostic body for later inspection.
    pub raw_payload: Option<String>,
}

impl StepOutcome {
    /// Creates an outcome with a single message and no payload.
    #[must_use]
    pub fn new(
        step_id: StepId,
        title: impl Into<String>,
        resource_type: ResourceType,
        status: StepStatus,
        message: impl Into<String>,
    ) -> Self {
        Self {
            step_id,
            title: title.into(),
            resource_type,
            status,
            messages: vec![message.into()],
            raw_payload: None,
        }
    }

    /// Attaches a raw diagnostic payload.
    #[must_use]
    pub fn with_payload(mut self, payload: Option<String>) -> Self {
        self.raw_payload = payload;
        self
    }

    /// Appends a further finding to the outcome.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.messages.push(message.into());
        self
    }

    /// Returns all findings joined into a single line.
    #[must_use]
    pub fn message(&self) -> String {
        self.messages.join(" ")
    }
}

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Ordered outcomes for one resource type.
///
/// # Invariants
/// - `outcomes` follow step library order.
/// - When `cancelled` is false, `outcomes` covers every step in the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceReport {
    /// Resource type the outcomes belong to.
    pub resource_type: ResourceType,
    /// One outcome per executed step.
    pub outcomes: Vec<StepOutcome>,
    /// True when the run was cancelled before all steps executed.
    pub cancelled: bool,
}

/// Outcomes for every resource type in a conformance run.
///
/// # Invariants
/// - `resources` follow discovery order regardless of execution parallelism.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConformanceReport {
    /// Per-resource-type reports.
    pub resources: Vec<ResourceReport>,
    /// True when any resource type run was cut short by cancellation.
    pub cancelled: bool,
}

impl ConformanceReport {
    /// Builds a report from per-type reports, deriving the cancelled flag.
    #[must_use]
    pub fn from_resources(resources: Vec<ResourceReport>) -> Self {
        let cancelled = resources.iter().any(|report| report.cancelled);
        Self {
            resources,
            cancelled,
        }
    }
}
