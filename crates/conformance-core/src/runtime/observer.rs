// crates/conformance-core/src/runtime/observer.rs
// ============================================================================
// Module: Run Observers
// Description: Hooks notified as resource types and steps complete.
// Purpose: Stream progress records without coupling the sequencer to a sink.
// Dependencies: crate::core, serde_json, tracing
// ============================================================================

//! ## Overview
//! Observers receive progress callbacks from the sequencer. They cannot
//! influence the run: hooks return nothing and a failing sink only counts its
//! own write failures. [`LogObserver`] writes one JSON record per event.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use serde_json::Value;
use serde_json::json;
use tracing::warn;

use crate::core::OutcomeCounts;
use crate::core::ResourceReport;
use crate::core::ResourceType;
use crate::core::StepOutcome;

// ============================================================================
// SECTION: Observer Trait
// ============================================================================

/// Progress hooks invoked by the sequencer.
///
/// Hooks for one resource type arrive in step order; hooks for different
/// resource types may interleave when types run in parallel.
pub trait RunObserver: Send + Sync {
    /// Called before the first step of a resource type runs.
    fn on_resource_started(&self, _resource_type: &ResourceType) {}

    /// Called after each step outcome is produced.
    fn on_step_completed(&self, _outcome: &StepOutcome) {}

    /// Called once a resource type run ends, cancelled or not.
    fn on_resource_completed(&self, _report: &ResourceReport) {}
}

impl<O: RunObserver + ?Sized> RunObserver for Arc<O> {
    fn on_resource_started(&self, resource_type: &ResourceType) {
        (**self).on_resource_started(resource_type);
    }

    fn on_step_completed(&self, outcome: &StepOutcome) {
        (**self).on_step_completed(outcome);
    }

    fn on_resource_completed(&self, report: &ResourceReport) {
        (**self).on_resource_completed(report);
    }
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {}

// ============================================================================
// SECTION: Log Observer
// ============================================================================

/// Observer writing JSON-lines progress records.
pub struct LogObserver<W: Write + Send> {
    /// Output writer for log records.
    writer: Mutex<W>,
    /// Monotonic record counter.
    sequence: AtomicU64,
    /// Number of records that could not be written.
    failures: AtomicU64,
}

impl<W: Write + Send> LogObserver<W> {
    /// Creates a log observer over the writer.
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            sequence: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    /// Returns how many records failed to write.
    #[must_use]
    pub fn write_failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Writes one record, counting failures instead of propagating them.
    fn emit(&self, mut record: Value) {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        if let Value::Object(map) = &mut record {
            map.insert("seq".to_string(), Value::from(seq));
        }
        let result = self.write_record(&record);
        if let Err(error) = result {
            self.failures.fetch_add(1, Ordering::Relaxed);
            warn!(%error, seq, "progress record dropped");
        }
    }

    /// Serializes one record followed by a newline.
    fn write_record(&self, record: &Value) -> Result<(), String> {
        let mut guard =
            self.writer.lock().map_err(|_| "log writer mutex poisoned".to_string())?;
        serde_json::to_writer(&mut *guard, record).map_err(|err| err.to_string())?;
        guard.write_all(b"\n").map_err(|err| err.to_string())?;
        guard.flush().map_err(|err| err.to_string())
    }
}

impl<W: Write + Send> RunObserver for LogObserver<W> {
    fn on_resource_started(&self, resource_type: &ResourceType) {
        self.emit(json!({
            "event": "resource_started",
            "resource_type": resource_type,
        }));
    }

    fn on_step_completed(&self, outcome: &StepOutcome) {
        self.emit(json!({
            "event": "step_completed",
            "resource_type": outcome.resource_type,
            "step_id": outcome.step_id,
            "status": outcome.status,
            "message": outcome.message(),
        }));
    }

    fn on_resource_completed(&self, report: &ResourceReport) {
        let counts = OutcomeCounts::for_resource(report);
        self.emit(json!({
            "event": "resource_completed",
            "resource_type": report.resource_type,
            "cancelled": report.cancelled,
            "counts": counts,
        }));
    }
}
