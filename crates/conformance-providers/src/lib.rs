// crates/conformance-providers/src/lib.rs
// ============================================================================
// Module: Resource Conformance Providers
// Description: Built-in collaborators for the conformance sequencer.
// Purpose: Reach a REST resource server and feed the step library.
// Dependencies: conformance-core, reqwest, serde_json, url
// ============================================================================

//! ## Overview
//! This crate ships the collaborators the sequencer needs to test a live
//! server: an HTTP transport speaking the REST resource mapping, a parser for
//! `OperationOutcome` error payloads, a template-driven payload generator, and
//! a static catalog of resource types.
//! Invariants:
//! - Server responses are untrusted and read under a byte limit.
//! - Only root resource types registered in [`StaticCatalog`] are tested.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod bundle;
pub mod diagnostics;
pub mod generator;
pub mod http;
pub mod registry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use diagnostics::OperationOutcomeParser;
pub use generator::TemplateGenerator;
pub use http::HttpTransport;
pub use http::HttpTransportConfig;
pub use http::HttpTransportError;
pub use registry::RegistryError;
pub use registry::StaticCatalog;
