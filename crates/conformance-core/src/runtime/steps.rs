// crates/conformance-core/src/runtime/steps.rs
// ============================================================================
// Module: Step Library
// Description: Ordered lifecycle checks run against one resource type.
// Purpose: Exercise list, create, read, update, history, and version reads.
// Dependencies: crate::{core, interfaces, runtime::resolver}, thiserror, tracing
// ============================================================================

//! ## Overview
//! [`STEP_LIBRARY`] lists every step in execution order. Each step reads and
//! writes the shared [`TestContext`], calls the transport at most a few
//! times, and returns one [`StepOutcome`]. Transport and generator failures
//! propagate as [`StepError`]; the sequencer turns them into `ERROR`
//! outcomes. Missing prerequisite data is a `FAIL`, never an `ERROR`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;
use tracing::debug;

use crate::core::ContextError;
use crate::core::ResourceEntry;
use crate::core::ResourceType;
use crate::core::StepId;
use crate::core::StepOutcome;
use crate::core::StepStatus;
use crate::core::TestContext;
use crate::interfaces::DiagnosticsParser;
use crate::interfaces::GeneratorError;
use crate::interfaces::PayloadGenerator;
use crate::interfaces::ResourceTransport;
use crate::interfaces::TransportError;
use crate::runtime::resolver::ActiveResource;
use crate::runtime::resolver::Resolution;
use crate::runtime::resolver::resolve_current_version;
use crate::runtime::resolver::resolve_preexisting;
use crate::runtime::resolver::resolve_previous_version;

// ============================================================================
// SECTION: Status Codes
// ============================================================================

/// Status code a server returns for a successful update.
const UPDATE_SUCCESS_CODE: u16 = 200;
/// Status code a server returns for a successful create.
const CREATE_SUCCESS_CODE: u16 = 201;

// ============================================================================
// SECTION: Step Definitions
// ============================================================================

/// Errors that abort a single step; reported as `ERROR` outcomes.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    /// The transport could not complete a call.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The payload generator failed.
    #[error(transparent)]
    Generator(#[from] GeneratorError),
    /// A set-once context field was written twice.
    #[error(transparent)]
    Context(#[from] ContextError),
}

/// Signature shared by every step function.
pub type StepFn = fn(&StepEnv<'_>, &mut TestContext) -> Result<StepOutcome, StepError>;

/// Static description of one step.
#[derive(Debug)]
pub struct StepDefinition {
    /// Fixed step code; defines report order.
    pub id: &'static str,
    /// Title template; `{type}` is replaced by the resource type.
    pub title: &'static str,
    /// Step implementation.
    pub run: StepFn,
}

impl StepDefinition {
    /// Returns the step identifier.
    #[must_use]
    pub fn step_id(&self) -> StepId {
        StepId::new(self.id)
    }

    /// Returns the title for the given resource type.
    #[must_use]
    pub fn title_for(&self, resource_type: &ResourceType) -> String {
        self.title.replace("{type}", resource_type.as_str())
    }
}

/// Collaborators and identity available to a running step.
pub struct StepEnv<'a> {
    /// Step being executed.
    pub step: &'a StepDefinition,
    /// Resource type under test.
    pub resource_type: &'a ResourceType,
    /// Network client for the server under test.
    pub transport: &'a dyn ResourceTransport,
    /// Payload generator.
    pub generator: &'a dyn PayloadGenerator,
    /// Error payload parser.
    pub diagnostics: &'a dyn DiagnosticsParser,
}

impl StepEnv<'_> {
    /// Builds an outcome for the current step.
    #[must_use]
    pub fn outcome(&self, status: StepStatus, message: impl Into<String>) -> StepOutcome {
        StepOutcome::new(
            self.step.step_id(),
            self.step.title_for(self.resource_type),
            self.resource_type.clone(),
            status,
            message,
        )
    }

    /// Records which resource a step resolved before using it.
    fn note_resolved(&self, active: &ActiveResource) {
        debug!(
            step = self.step.id,
            resource_type = %self.resource_type,
            id = %active.entry.id,
            source = active.source.as_str(),
            "resource resolved"
        );
    }

    /// Builds a `FAIL` outcome from a server error payload.
    fn diagnostic_failure(&self, raw: Option<String>) -> StepOutcome {
        let parsed = self.diagnostics.parse_error_payload(raw.as_deref());
        let message = self.diagnostics.format_messages(&parsed);
        self.outcome(StepStatus::Fail, format!("{}: {message}", self.resource_type))
            .with_payload(raw)
    }
}

/// Every step, in execution order.
pub static STEP_LIBRARY: [StepDefinition; 10] = [
    StepDefinition {
        id: "X000",
        title: "Read Type",
        run: read_type,
    },
    StepDefinition {
        id: "X010",
        title: "Create new {type}",
        run: create,
    },
    StepDefinition {
        id: "X020",
        title: "Read existing {type} by ID",
        run: read,
    },
    StepDefinition {
        id: "X030",
        title: "Update existing {type} by ID",
        run: update,
    },
    StepDefinition {
        id: "X040",
        title: "Read history of existing {type} by ID",
        run: history,
    },
    StepDefinition {
        id: "X050",
        title: "Version read existing {type} by ID",
        run: version_read_current,
    },
    StepDefinition {
        id: "X055",
        title: "Previous version read existing {type} by ID",
        run: version_read_previous,
    },
    StepDefinition {
        id: "X060",
        title: "Delete existing {type}",
        run: delete,
    },
    StepDefinition {
        id: "X070",
        title: "Search for existing {type}",
        run: search,
    },
    StepDefinition {
        id: "X080",
        title: "Validate {type}",
        run: validate,
    },
];

// ============================================================================
// SECTION: Listing and Creation
// ============================================================================

/// Lists all instances of the type and records the listing.
fn read_type(env: &StepEnv<'_>, ctx: &mut TestContext) -> Result<StepOutcome, StepError> {
    let rt = env.resource_type;
    let reply = env.transport.list_type(rt)?;
    let Some(entries) = reply.entries else {
        return Ok(env
            .outcome(StepStatus::Fail, format!("{rt}: Service did not respond with bundle."))
            .with_payload(reply.raw));
    };
    ctx.record_listing(entries)?;
    Ok(env.outcome(StepStatus::Pass, "Service responded with bundle.").with_payload(reply.raw))
}

/// Creates a generated instance and records its identity.
fn create(env: &StepEnv<'_>, ctx: &mut TestContext) -> Result<StepOutcome, StepError> {
    let rt = env.resource_type;
    let body = env.generator.generate_default(rt)?;
    let reply = env.transport.create(rt, &body)?;

    if reply.code != CREATE_SUCCESS_CODE {
        ctx.clear_created();
        return Ok(env.diagnostic_failure(reply.raw));
    }
    let Some(id) = reply.id else {
        ctx.clear_created();
        return Ok(env
            .outcome(StepStatus::Fail, format!("Server created {rt} (201) but returned no id."))
            .with_payload(reply.raw));
    };
    ctx.record_created(ResourceEntry::new(id, reply.version, Some(body)));
    Ok(env.outcome(StepStatus::Pass, format!("New {rt} was created.")).with_payload(reply.raw))
}

// ============================================================================
// SECTION: Read and Update
// ============================================================================

/// Reads the preexisting resource by id.
fn read(env: &StepEnv<'_>, ctx: &mut TestContext) -> Result<StepOutcome, StepError> {
    let rt = env.resource_type;
    let active = match resolve_preexisting(ctx) {
        Resolution::Resolved(active) => active,
        Resolution::Unresolved(reason) => {
            return Ok(env.outcome(StepStatus::Fail, reason.message(rt)));
        }
    };
    env.note_resolved(&active);
    ctx.set_active(active.entry.clone());

    let reply = env.transport.read(rt, &active.entry.id)?;
    let Some(body) = reply.body else {
        return Ok(env
            .outcome(StepStatus::Fail, format!("Failed to read preexisting {rt}."))
            .with_payload(reply.raw));
    };
    let payload = body.to_string();
    let version = reply.version.or(active.entry.version);
    ctx.set_active(ResourceEntry::new(active.entry.id, version, Some(body)));
    Ok(env
        .outcome(StepStatus::Pass, format!("Successfully read preexisting {rt}."))
        .with_payload(Some(payload)))
}

/// Mutates and updates the preexisting resource.
fn update(env: &StepEnv<'_>, ctx: &mut TestContext) -> Result<StepOutcome, StepError> {
    let rt = env.resource_type;
    let entry = match resolve_preexisting(ctx) {
        Resolution::Resolved(active) => {
            env.note_resolved(&active);
            active.entry
        }
        Resolution::Unresolved(reason) => {
            return Ok(env.outcome(StepStatus::Fail, reason.message(rt)));
        }
    };
    ctx.set_active(entry.clone());

    let Some(mut body) = entry.body.clone() else {
        return Ok(env.outcome(
            StepStatus::Fail,
            format!("Unable to update -- no existing {rt} is available or could be created."),
        ));
    };
    env.generator.mutate_in_place(&mut body)?;
    let reply = env.transport.update(rt, &body, &entry.id)?;

    let mut findings = Vec::new();
    match reply.code {
        UPDATE_SUCCESS_CODE => {}
        CREATE_SUCCESS_CODE => {
            if reply.id.as_ref() == Some(&entry.id) {
                findings.push(format!(
                    "The {rt} was successfully updated, but the server responded with the wrong \
                     code (201, but should have been 200)."
                ));
            } else {
                let new_id = reply.id.as_ref().map_or("none", |id| id.as_str());
                findings.push(format!(
                    "Server created (201) new {rt} rather than update (200). A new ID \
                     ({new_id}) was also created (was {}).",
                    entry.id
                ));
            }
        }
        _ => return Ok(env.diagnostic_failure(reply.raw)),
    }

    if entry.version.is_some() && entry.version == reply.version {
        findings.push(format!(
            "The {rt} was successfully updated, but the server did not update the resource \
             version number."
        ));
    }

    let version = reply.version.or(entry.version);
    ctx.set_active(ResourceEntry::new(entry.id, version, Some(body)));

    let mut findings = findings.into_iter();
    let Some(first) = findings.next() else {
        return Ok(env
            .outcome(StepStatus::Pass, format!("Updated existing {rt}."))
            .with_payload(reply.raw));
    };
    let outcome = findings.fold(env.outcome(StepStatus::Fail, first), |outcome, finding| {
        outcome.with_message(finding)
    });
    Ok(outcome.with_payload(reply.raw))
}

// ============================================================================
// SECTION: History and Version Reads
// ============================================================================

/// Fetches the history of the active resource and records it.
fn history(env: &StepEnv<'_>, ctx: &mut TestContext) -> Result<StepOutcome, StepError> {
    let rt = env.resource_type;
    let Some(active) = ctx.active().cloned() else {
        return Ok(env.outcome(StepStatus::Fail, format!("Preexisting {rt} unknown.")));
    };
    let reply = env.transport.history_of_instance(rt, &active.id)?;
    let Some(entries) = reply.entries else {
        return Ok(env
            .outcome(StepStatus::Fail, format!("{rt}: Service did not respond with bundle."))
            .with_payload(reply.raw));
    };
    ctx.record_history(entries)?;
    Ok(env.outcome(StepStatus::Pass, "Service responded with bundle.").with_payload(reply.raw))
}

/// Reads the current version of the resource; the comparison is not implemented.
fn version_read_current(
    env: &StepEnv<'_>,
    ctx: &mut TestContext,
) -> Result<StepOutcome, StepError> {
    let resolution = resolve_current_version(ctx);
    version_read(env, ctx, resolution)
}

/// Reads the previous version of the resource; the comparison is not implemented.
fn version_read_previous(
    env: &StepEnv<'_>,
    ctx: &mut TestContext,
) -> Result<StepOutcome, StepError> {
    let resolution = resolve_previous_version(ctx);
    version_read(env, ctx, resolution)
}

/// Shared body of both version reads: resolve, issue the call, then skip.
fn version_read(
    env: &StepEnv<'_>,
    ctx: &mut TestContext,
    resolution: Resolution,
) -> Result<StepOutcome, StepError> {
    let rt = env.resource_type;
    let active = match resolution {
        Resolution::Resolved(active) => active,
        Resolution::Unresolved(reason) => {
            return Ok(env.outcome(StepStatus::Fail, reason.message(rt)));
        }
    };
    env.note_resolved(&active);
    ctx.set_active(active.entry.clone());
    let Some(version) = &active.entry.version else {
        return Ok(env.outcome(
            StepStatus::Skip,
            format!("Skipped version read preexisting {rt}: no version id known."),
        ));
    };
    let reply = env.transport.history_of_version(rt, &active.entry.id, version)?;
    Ok(env
        .outcome(StepStatus::Skip, format!("Skipped version read preexisting {rt}."))
        .with_payload(reply.raw))
}

// ============================================================================
// SECTION: Unimplemented Checks
// ============================================================================

/// Delete is not exercised.
fn delete(env: &StepEnv<'_>, _ctx: &mut TestContext) -> Result<StepOutcome, StepError> {
    Ok(env.outcome(StepStatus::Skip, format!("Delete of {} not exercised.", env.resource_type)))
}

/// Search is not exercised: modifiers, chaining, paging, and sorting are future work.
fn search(env: &StepEnv<'_>, _ctx: &mut TestContext) -> Result<StepOutcome, StepError> {
    Ok(env.outcome(StepStatus::Skip, format!("Search for {} not exercised.", env.resource_type)))
}

/// Validation is not exercised.
fn validate(env: &StepEnv<'_>, _ctx: &mut TestContext) -> Result<StepOutcome, StepError> {
    Ok(env.outcome(
        StepStatus::Skip,
        format!("Validation of {} not exercised.", env.resource_type),
    ))
}
