// crates/conformance-core/src/runtime/resolver.rs
// ============================================================================
// Module: Fallback Resolver
// Description: Selects the resource a step should operate on.
// Purpose: Keep the list-then-created fallback policy in one place.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Steps that need an existing resource call one of the pure functions below
//! before touching the transport. Data taken from a server listing is
//! preferred over the resource this run created, because it proves the
//! server persists and returns resources independently of this run.
//!
//! Index convention: "preexisting" and "current version" use the first
//! returned entry; "previous version" uses the second returned entry of the
//! instance history.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::core::ResourceEntry;
use crate::core::ResourceType;
use crate::core::TestContext;

// ============================================================================
// SECTION: Resolution Types
// ============================================================================

/// Where a resolved resource came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    /// First entry of the type-level listing.
    Listing,
    /// Resource created during this run.
    Created,
    /// Entry of the instance history.
    History,
}

impl ResolutionSource {
    /// Returns the stable label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Listing => "listing",
            Self::Created => "created",
            Self::History => "history",
        }
    }
}

/// Resource selected for the next step.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveResource {
    /// Selected identity, version, and body.
    pub entry: ResourceEntry,
    /// Source the entry was taken from.
    pub source: ResolutionSource,
}

/// Reason resolution found no usable data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// Neither a listing entry nor a created resource is available.
    PreexistingUnknown,
    /// The instance history has fewer than two entries.
    PreviousVersionUnavailable,
}

impl UnresolvedReason {
    /// Returns the failure message naming the resource type.
    #[must_use]
    pub fn message(self, resource_type: &ResourceType) -> String {
        match self {
            Self::PreexistingUnknown => format!("Preexisting {resource_type} unknown."),
            Self::PreviousVersionUnavailable => {
                format!("Previous version of {resource_type} unavailable.")
            }
        }
    }
}

/// Result of a resolution attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// A usable resource was found.
    Resolved(ActiveResource),
    /// No usable resource exists; the caller reports `FAIL`.
    Unresolved(UnresolvedReason),
}

// ============================================================================
// SECTION: Resolution Policies
// ============================================================================

/// Resolves the preexisting resource used by read and update.
///
/// Precedence: first listing entry, then the created resource.
#[must_use]
pub fn resolve_preexisting(ctx: &TestContext) -> Resolution {
    if let Some(first) = ctx.listing().and_then(<[ResourceEntry]>::first) {
        return resolved(first, ResolutionSource::Listing);
    }
    if let Some(created) = ctx.created() {
        return resolved(created, ResolutionSource::Created);
    }
    Resolution::Unresolved(UnresolvedReason::PreexistingUnknown)
}

/// Resolves the resource used by the current-version read.
///
/// Precedence: first history entry, then the created resource.
#[must_use]
pub fn resolve_current_version(ctx: &TestContext) -> Resolution {
    if let Some(first) = ctx.history().and_then(<[ResourceEntry]>::first) {
        return resolved(first, ResolutionSource::History);
    }
    if let Some(created) = ctx.created() {
        return resolved(created, ResolutionSource::Created);
    }
    Resolution::Unresolved(UnresolvedReason::PreexistingUnknown)
}

/// Resolves the resource used by the previous-version read.
///
/// Only the second history entry qualifies; there is no fallback.
#[must_use]
pub fn resolve_previous_version(ctx: &TestContext) -> Resolution {
    match ctx.history().and_then(|history| history.get(1)) {
        Some(previous) => resolved(previous, ResolutionSource::History),
        None => Resolution::Unresolved(UnresolvedReason::PreviousVersionUnavailable),
    }
}

/// Wraps a context entry into a resolution.
fn resolved(entry: &ResourceEntry, source: ResolutionSource) -> Resolution {
    Resolution::Resolved(ActiveResource {
        entry: entry.clone(),
        source,
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
