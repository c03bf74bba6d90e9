// crates/conformance-core/src/core/summary.rs
// ============================================================================
// Module: Resource Conformance Summaries
// Description: Aggregate outcome counts for reports.
// Purpose: Count outcomes by status while keeping skipped steps unscored.
// Dependencies: crate::core::outcome, serde
// ============================================================================

//! ## Overview
//! Summaries count outcomes per status. Skipped steps are counted for
//! visibility but never contribute to the scored total.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::outcome::ConformanceReport;
use crate::core::outcome::ResourceReport;
use crate::core::outcome::StepOutcome;
use crate::core::outcome::StepStatus;

// ============================================================================
// SECTION: Outcome Counts
// ============================================================================

/// Outcome counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    /// Number of passing steps.
    pub passed: usize,
    /// Number of failing steps.
    pub failed: usize,
    /// Number of skipped steps.
    pub skipped: usize,
    /// Number of harness errors.
    pub errored: usize,
}

impl OutcomeCounts {
    /// Counts the given outcomes.
    #[must_use]
    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a StepOutcome>) -> Self {
        let mut counts = Self::default();
        for outcome in outcomes {
            counts.record(outcome.status);
        }
        counts
    }

    /// Counts the outcomes of a single resource report.
    #[must_use]
    pub fn for_resource(report: &ResourceReport) -> Self {
        Self::from_outcomes(&report.outcomes)
    }

    /// Counts the outcomes across an entire conformance report.
    #[must_use]
    pub fn for_report(report: &ConformanceReport) -> Self {
        Self::from_outcomes(report.resources.iter().flat_map(|resource| &resource.outcomes))
    }

    /// Adds a single status to the counts.
    pub const fn record(&mut self, status: StepStatus) {
        match status {
            StepStatus::Pass => self.passed += 1,
            StepStatus::Fail => self.failed += 1,
            StepStatus::Skip => self.skipped += 1,
            StepStatus::Error => self.errored += 1,
        }
    }

    /// Returns the number of scored outcomes (everything except skips).
    #[must_use]
    pub const fn scored(&self) -> usize {
        self.passed + self.failed + self.errored
    }

    /// Returns true when nothing failed or errored.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.failed == 0 && self.errored == 0
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identifiers::ResourceType;
    use crate::core::identifiers::StepId;

    fn outcome(status: StepStatus) -> StepOutcome {
        StepOutcome::new(StepId::new("X000"), "t", ResourceType::new("Patient"), status, "m")
    }

    #[test]
    fn skips_are_excluded_from_scored_total() {
        let outcomes = [
            outcome(StepStatus::Pass),
            outcome(StepStatus::Skip),
            outcome(StepStatus::Skip),
            outcome(StepStatus::Fail),
        ];
        let counts = OutcomeCounts::from_outcomes(&outcomes);
        assert_eq!(counts.skipped, 2);
        assert_eq!(counts.scored(), 2);
        assert!(!counts.is_clean());
    }

    #[test]
    fn errors_are_scored_and_not_clean() {
        let counts = OutcomeCounts::from_outcomes(&[outcome(StepStatus::Error)]);
        assert_eq!(counts.scored(), 1);
        assert!(!counts.is_clean());
    }

    #[test]
    fn all_skips_are_clean() {
        let counts = OutcomeCounts::from_outcomes(&[outcome(StepStatus::Skip)]);
        assert_eq!(counts.scored(), 0);
        assert!(counts.is_clean());
    }
}
