// crates/conformance-core/src/lib.rs
// ============================================================================
// Module: Resource Conformance Core Library
// Description: Public API surface for the conformance sequencing engine.
// Purpose: Expose outcome types, collaborator interfaces, and the sequencer.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Resource conformance core runs an ordered battery of lifecycle checks
//! (list, create, read, update, history, version read, delete, search,
//! validate) against one resource type at a time and reports a
//! pass/fail/skip/error outcome per check. Steps share a per-run
//! [`TestContext`] and fall back to data from earlier steps when a
//! predecessor failed. The crate is backend-agnostic: the network transport,
//! payload generation, error-payload parsing, and resource-type discovery
//! are supplied through [`interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::DiagnosticsParser;
pub use interfaces::GeneratorError;
pub use interfaces::InstanceReply;
pub use interfaces::Issue;
pub use interfaces::ListingReply;
pub use interfaces::OperationOutcome;
pub use interfaces::PayloadGenerator;
pub use interfaces::ResourceCatalog;
pub use interfaces::ResourceTransport;
pub use interfaces::TransportError;
pub use interfaces::VersionReply;
pub use runtime::ActiveResource;
pub use runtime::CancellationToken;
pub use runtime::LogObserver;
pub use runtime::NoopObserver;
pub use runtime::Resolution;
pub use runtime::ResolutionSource;
pub use runtime::RunObserver;
pub use runtime::STEP_LIBRARY;
pub use runtime::Sequencer;
pub use runtime::SequencerConfig;
pub use runtime::SequencerError;
pub use runtime::StepDefinition;
pub use runtime::StepEnv;
pub use runtime::StepError;
pub use runtime::UnresolvedReason;
