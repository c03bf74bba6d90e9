// crates/conformance-core/src/runtime/mod.rs
// ============================================================================
// Module: Resource Conformance Runtime
// Description: Fallback resolution, the step library, and the sequencer.
// Purpose: Execute the lifecycle battery against one or more resource types.
// Dependencies: crate::{core, interfaces}, tracing
// ============================================================================

//! ## Overview
//! Runtime modules execute steps strictly in library order for each resource
//! type. A step may consume state written by any earlier step but never the
//! reverse. Resource types are independent and may run on parallel workers.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod cancel;
pub mod observer;
pub mod resolver;
pub mod sequencer;
pub mod steps;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use cancel::CancellationToken;
pub use observer::LogObserver;
pub use observer::NoopObserver;
pub use observer::RunObserver;
pub use resolver::ActiveResource;
pub use resolver::Resolution;
pub use resolver::ResolutionSource;
pub use resolver::UnresolvedReason;
pub use sequencer::MAX_PARALLELISM;
pub use sequencer::Sequencer;
pub use sequencer::SequencerConfig;
pub use sequencer::SequencerError;
pub use steps::STEP_LIBRARY;
pub use steps::StepDefinition;
pub use steps::StepEnv;
pub use steps::StepError;
