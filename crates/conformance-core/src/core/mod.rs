// crates/conformance-core/src/core/mod.rs
// ============================================================================
// Module: Resource Conformance Core Types
// Description: Identifiers, outcomes, per-run context, and summaries.
// Purpose: Define the data model shared by steps, the sequencer, and reporters.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Core types are plain data: they carry no network behavior and are safe to
//! serialize into reports.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod context;
pub mod identifiers;
pub mod outcome;
pub mod summary;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use context::ContextError;
pub use context::ResourceBody;
pub use context::ResourceEntry;
pub use context::TestContext;
pub use identifiers::ResourceId;
pub use identifiers::ResourceType;
pub use identifiers::StepId;
pub use identifiers::VersionId;
pub use outcome::ConformanceReport;
pub use outcome::ResourceReport;
pub use outcome::StepOutcome;
pub use outcome::StepStatus;
pub use summary::OutcomeCounts;
