// crates/conformance-core/src/runtime/sequencer.rs
// ============================================================================
// Module: Conformance Sequencer
// Description: Runs the step library for each resource type.
// Purpose: Produce one ordered outcome list per resource type.
// Dependencies: crate::{core, interfaces, runtime}, thiserror, tracing
// ============================================================================

//! ## Overview
//! The sequencer gives every resource type a fresh [`TestContext`] and runs
//! [`STEP_LIBRARY`] in order. A `FAIL` or `ERROR` never stops the sequence;
//! later steps apply their own fallback resolution. Step errors are caught
//! at the step boundary and reported as `ERROR` outcomes carrying the error
//! text.
//!
//! Resource types are independent. With `parallelism > 1` they are spread
//! over scoped worker threads; steps within one type stay sequential and the
//! report keeps discovery order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::thread;

use thiserror::Error;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::core::ConformanceReport;
use crate::core::ResourceReport;
use crate::core::ResourceType;
use crate::core::StepOutcome;
use crate::core::StepStatus;
use crate::core::TestContext;
use crate::interfaces::DiagnosticsParser;
use crate::interfaces::PayloadGenerator;
use crate::interfaces::ResourceCatalog;
use crate::interfaces::ResourceTransport;
use crate::runtime::cancel::CancellationToken;
use crate::runtime::observer::NoopObserver;
use crate::runtime::observer::RunObserver;
use crate::runtime::steps::STEP_LIBRARY;
use crate::runtime::steps::StepEnv;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Upper bound on parallel resource-type workers.
pub const MAX_PARALLELISM: usize = 64;

/// Sequencer configuration.
///
/// # Invariants
/// - `parallelism` is within `1..=MAX_PARALLELISM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencerConfig {
    /// Number of resource types run concurrently.
    pub parallelism: usize,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            parallelism: 1,
        }
    }
}

/// Sequencer construction errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequencerError {
    /// The configuration is out of range.
    #[error("invalid sequencer config: {0}")]
    InvalidConfig(String),
}

// ============================================================================
// SECTION: Sequencer
// ============================================================================

/// Runs the step library against resource types.
pub struct Sequencer<T, G, D> {
    /// Network client for the server under test.
    transport: T,
    /// Payload generator.
    generator: G,
    /// Error payload parser.
    diagnostics: D,
    /// Execution configuration.
    config: SequencerConfig,
    /// Cancellation flag checked between steps.
    cancel: CancellationToken,
    /// Progress observer.
    observer: Box<dyn RunObserver>,
}

impl<T, G, D> Sequencer<T, G, D>
where
    T: ResourceTransport,
    G: PayloadGenerator,
    D: DiagnosticsParser,
{
    /// Creates a sequencer over the collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::InvalidConfig`] when `parallelism` is out of range.
    pub fn new(
        transport: T,
        generator: G,
        diagnostics: D,
        config: SequencerConfig,
    ) -> Result<Self, SequencerError> {
        if config.parallelism == 0 || config.parallelism > MAX_PARALLELISM {
            return Err(SequencerError::InvalidConfig(format!(
                "parallelism must be within 1..={MAX_PARALLELISM}"
            )));
        }
        Ok(Self {
            transport,
            generator,
            diagnostics,
            config,
            cancel: CancellationToken::new(),
            observer: Box::new(NoopObserver),
        })
    }

    /// Replaces the progress observer.
    #[must_use]
    pub fn with_observer(mut self, observer: impl RunObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Replaces the cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Returns a handle that cancels this sequencer's runs.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Returns the transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Runs every resource type the catalog discovers.
    pub fn run_catalog(&self, catalog: &dyn ResourceCatalog) -> ConformanceReport {
        self.run_types(&catalog.resource_types())
    }

    /// Runs the given resource types, keeping their order in the report.
    pub fn run_types(&self, resource_types: &[ResourceType]) -> ConformanceReport {
        let workers = self.config.parallelism.min(resource_types.len());
        let resources = if workers <= 1 {
            resource_types.iter().map(|rt| self.run_resource_type(rt)).collect()
        } else {
            self.run_parallel(resource_types, workers)
        };
        ConformanceReport::from_resources(resources)
    }

    /// Runs the full step library for one resource type.
    pub fn run_resource_type(&self, resource_type: &ResourceType) -> ResourceReport {
        let mut ctx = TestContext::new();
        let mut outcomes = Vec::with_capacity(STEP_LIBRARY.len());
        let mut cancelled = false;
        self.observer.on_resource_started(resource_type);

        for step in &STEP_LIBRARY {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            let env = StepEnv {
                step,
                resource_type,
                transport: &self.transport,
                generator: &self.generator,
                diagnostics: &self.diagnostics,
            };
            let outcome = match (step.run)(&env, &mut ctx) {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!(
                        resource_type = %resource_type,
                        step = step.id,
                        error = %err,
                        "step error"
                    );
                    env.outcome(StepStatus::Error, err.to_string())
                }
            };
            debug!(
                resource_type = %resource_type,
                step = step.id,
                status = %outcome.status,
                "step completed"
            );
            self.observer.on_step_completed(&outcome);
            outcomes.push(outcome);
        }

        let report = ResourceReport {
            resource_type: resource_type.clone(),
            outcomes,
            cancelled,
        };
        info!(
            resource_type = %resource_type,
            steps = report.outcomes.len(),
            cancelled,
            "resource type completed"
        );
        self.observer.on_resource_completed(&report);
        report
    }

    /// Spreads resource types over scoped workers pulling from a shared cursor.
    fn run_parallel(
        &self,
        resource_types: &[ResourceType],
        workers: usize,
    ) -> Vec<ResourceReport> {
        let cursor = AtomicUsize::new(0);
        let slots: Vec<Mutex<Option<ResourceReport>>> =
            resource_types.iter().map(|_| Mutex::new(None)).collect();

        thread::scope(|scope| {
            for _ in 0 .. workers {
                scope.spawn(|| {
                    loop {
                        let index = cursor.fetch_add(1, Ordering::Relaxed);
                        let (Some(resource_type), Some(slot)) =
                            (resource_types.get(index), slots.get(index))
                        else {
                            break;
                        };
                        let report = self.run_resource_type(resource_type);
                        if let Ok(mut guard) = slot.lock() {
                            *guard = Some(report);
                        }
                    }
                });
            }
        });

        slots
            .into_iter()
            .zip(resource_types)
            .map(|(slot, resource_type)| {
                slot.into_inner().ok().flatten().unwrap_or_else(|| cancelled_report(resource_type))
            })
            .collect()
    }
}

/// Report for a resource type whose run never produced a result.
fn cancelled_report(resource_type: &ResourceType) -> ResourceReport {
    ResourceReport {
        resource_type: resource_type.clone(),
        outcomes: Vec::<StepOutcome>::new(),
        cancelled: true,
    }
}
