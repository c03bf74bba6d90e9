// crates/conformance-cli/src/lib.rs
// ============================================================================
// Module: Resource Conformance CLI Library
// Description: Report rendering and logging setup shared by the binary.
// Purpose: Keep output formats testable outside the entry point.
// Dependencies: conformance-core, serde_json, tracing-subscriber
// ============================================================================

//! ## Overview
//! Library half of the `conformance` binary: report renderers and the
//! tracing subscriber setup.

pub mod report;
pub mod telemetry;
