// crates/conformance-providers/src/diagnostics.rs
// ============================================================================
// Module: OperationOutcome Diagnostics
// Description: Parses server error payloads into issue lists.
// Purpose: Give failing steps readable diagnostic text.
// Dependencies: conformance-core, serde_json
// ============================================================================

//! ## Overview
//! Error responses from a resource server usually carry an
//! `OperationOutcome` with an `issue[]` array. [`OperationOutcomeParser`]
//! reads `severity`, `code`, and either `diagnostics` or `details.text` from
//! each issue. Any payload it cannot read still yields one synthetic issue,
//! so a failing step always has a message.

// ============================================================================
// SECTION: Imports
// ============================================================================

use conformance_core::DiagnosticsParser;
use conformance_core::Issue;
use conformance_core::OperationOutcome;
use serde_json::Value;

use crate::bundle::resource_type_of;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Resource type name of an error payload.
const OPERATION_OUTCOME_TYPE: &str = "OperationOutcome";
/// Severity used for synthetic issues.
const SYNTHETIC_SEVERITY: &str = "error";
/// Issue code used for synthetic issues.
const SYNTHETIC_CODE: &str = "processing";

// ============================================================================
// SECTION: Parser
// ============================================================================

/// Parser for `OperationOutcome` error payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct OperationOutcomeParser;

impl DiagnosticsParser for OperationOutcomeParser {
    fn parse_error_payload(&self, raw: Option<&str>) -> OperationOutcome {
        let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return synthetic("Server returned no error payload.");
        };
        let Ok(payload) = serde_json::from_str::<Value>(raw) else {
            return synthetic("Server returned an error payload that is not JSON.");
        };
        if resource_type_of(&payload) != Some(OPERATION_OUTCOME_TYPE) {
            return synthetic("Server returned an error payload that is not an OperationOutcome.");
        }
        let issues: Vec<Issue> = payload
            .get("issue")
            .and_then(Value::as_array)
            .map(|issues| issues.iter().map(parse_issue).collect())
            .unwrap_or_default();
        if issues.is_empty() {
            return synthetic("Server returned an OperationOutcome without issues.");
        }
        OperationOutcome {
            issues,
        }
    }

    fn format_messages(&self, outcome: &OperationOutcome) -> String {
        outcome
            .issues
            .iter()
            .map(|issue| match &issue.details {
                Some(details) => format!("{}: {}: {details}", issue.severity, issue.code),
                None => format!("{}: {}", issue.severity, issue.code),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads one `issue[]` member.
fn parse_issue(issue: &Value) -> Issue {
    let text = |value: Option<&Value>| value.and_then(Value::as_str).map(str::to_string);
    Issue {
        severity: text(issue.get("severity")).unwrap_or_else(|| SYNTHETIC_SEVERITY.to_string()),
        code: text(issue.get("code")).unwrap_or_else(|| "unknown".to_string()),
        details: text(issue.get("diagnostics"))
            .or_else(|| text(issue.get("details").and_then(|details| details.get("text")))),
    }
}

/// Builds an outcome holding one issue that describes an unreadable payload.
fn synthetic(details: &str) -> OperationOutcome {
    OperationOutcome {
        issues: vec![Issue {
            severity: SYNTHETIC_SEVERITY.to_string(),
            code: SYNTHETIC_CODE.to_string(),
            details: Some(details.to_string()),
        }],
    }
}
