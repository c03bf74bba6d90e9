// crates/conformance-config/src/lib.rs
// ============================================================================
// Module: Resource Conformance Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for conformance.toml semantics.
// Dependencies: conformance-core, serde, toml, url
// ============================================================================

//! ## Overview
//! `conformance-config` defines the configuration for a conformance run:
//! the server under test, the resource types to exercise with their payload
//! templates, run limits, and report output. Loading is strict and fails
//! closed on unknown fields, oversized files, and out-of-range values.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
