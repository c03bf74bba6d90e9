// crates/conformance-core/src/runtime/cancel.rs
// ============================================================================
// Module: Run Cancellation
// Description: Shared cancellation flag checked between steps.
// Purpose: Stop a conformance run at a step boundary, never mid-step.
// Dependencies: std
// ============================================================================

//! ## Overview
//! A [`CancellationToken`] is cloned into whoever may abort the run. The
//! sequencer checks it before each step; a step already in flight always
//! completes. Server-side effects of completed steps are not rolled back.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

// ============================================================================
// SECTION: Cancellation Token
// ============================================================================

/// Cloneable cancellation flag shared between the sequencer and its caller.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    /// Set once cancellation is requested.
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation; idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
