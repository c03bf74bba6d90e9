// crates/conformance-core/src/core/context.rs
// ============================================================================
// Module: Resource Conformance Test Context
// Description: Mutable state shared by the steps of one resource-type run.
// Purpose: Carry listings, created resources, and the active reference across steps.
// Dependencies: crate::core::identifiers, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A [`TestContext`] is created fresh for every resource type and owned by
//! the sequencer for that run. Steps record what they observed through the
//! narrow mutators below; cross-step reads go through the fallback resolver.
//! Invariants:
//! - `listing` and `history` are recorded at most once per run.
//! - A failed create leaves no created resource behind.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use thiserror::Error;

use crate::core::identifiers::ResourceId;
use crate::core::identifiers::VersionId;

// ============================================================================
// SECTION: Resource Entries
// ============================================================================

/// Serializable resource body exchanged with the transport.
pub type ResourceBody = Value;

/// Identity, version, and body of one resource instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceEntry {
    /// Logical id reported by the server.
    pub id: ResourceId,
    /// Version id reported by the server, when known.
    pub version: Option<VersionId>,
    /// Resource body, when available.
    pub body: Option<ResourceBody>,
}

impl ResourceEntry {
    /// Creates an entry from its parts.
    #[must_use]
    pub const fn new(
        id: ResourceId,
        version: Option<VersionId>,
        body: Option<ResourceBody>,
    ) -> Self {
        Self {
            id,
            version,
            body,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Context mutation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// A set-once field was recorded twice.
    #[error("{0} already recorded for this run")]
    AlreadyRecorded(&'static str),
}

// ============================================================================
// SECTION: Test Context
// ============================================================================

/// Shared state for one resource-type run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestContext {
    /// Type-level listing, fetched once by the read-type step.
    listing: Option<Vec<ResourceEntry>>,
    /// Instance history, fetched once by the history step.
    history: Option<Vec<ResourceEntry>>,
    /// Resource created during this run.
    created: Option<ResourceEntry>,
    /// Current working resource used by subsequent steps.
    active: Option<ResourceEntry>,
}

impl TestContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded listing.
    #[must_use]
    pub fn listing(&self) -> Option<&[ResourceEntry]> {
        self.listing.as_deref()
    }

    /// Returns the recorded instance history.
    #[must_use]
    pub fn history(&self) -> Option<&[ResourceEntry]> {
        self.history.as_deref()
    }

    /// Returns the resource created during this run.
    #[must_use]
    pub const fn created(&self) -> Option<&ResourceEntry> {
        self.created.as_ref()
    }

    /// Returns the active resource reference.
    #[must_use]
    pub const fn active(&self) -> Option<&ResourceEntry> {
        self.active.as_ref()
    }

    /// Records the type-level listing.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::AlreadyRecorded`] when a listing was already recorded.
    pub fn record_listing(&mut self, entries: Vec<ResourceEntry>) -> Result<(), ContextError> {
        if self.listing.is_some() {
            return Err(ContextError::AlreadyRecorded("listing"));
        }
        self.listing = Some(entries);
        Ok(())
    }

    /// Records the instance history.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::AlreadyRecorded`] when a history was already recorded.
    pub fn record_history(&mut self, entries: Vec<ResourceEntry>) -> Result<(), ContextError> {
        if self.history.is_some() {
            return Err(ContextError::AlreadyRecorded("history"));
        }
        self.history = Some(entries);
        Ok(())
    }

    /// Records the resource created during this run.
    pub fn record_created(&mut self, entry: ResourceEntry) {
        self.created = Some(entry);
    }

    /// Forgets any created resource after a non-success create.
    pub fn clear_created(&mut self) {
        self.created = None;
    }

    /// Replaces the active resource reference.
    pub fn set_active(&mut self, entry: ResourceEntry) {
        self.active = Some(entry);
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions use unwrap for clarity.")]

    use super::*;

    fn entry(id: &str) -> ResourceEntry {
        ResourceEntry::new(ResourceId::new(id), Some(VersionId::new("1")), None)
    }

    #[test]
    fn listing_is_recorded_once() {
        let mut ctx = TestContext::new();
        ctx.record_listing(vec![entry("a")]).unwrap();
        let err = ctx.record_listing(vec![entry("b")]).unwrap_err();
        assert_eq!(err, ContextError::AlreadyRecorded("listing"));
        assert_eq!(ctx.listing().unwrap()[0].id.as_str(), "a");
    }

    #[test]
    fn empty_listing_still_counts_as_recorded() {
        let mut ctx = TestContext::new();
        ctx.record_listing(Vec::new()).unwrap();
        assert!(ctx.record_listing(vec![entry("a")]).is_err());
        assert_eq!(ctx.listing().map(<[ResourceEntry]>::len), Some(0));
    }

    #[test]
    fn history_is_recorded_once() {
        let mut ctx = TestContext::new();
        ctx.record_history(vec![entry("a")]).unwrap();
        assert_eq!(
            ctx.record_history(Vec::new()).unwrap_err(),
            ContextError::AlreadyRecorded("history")
        );
    }

    #[test]
    fn clear_created_leaves_nothing_stale() {
        let mut ctx = TestContext::new();
        ctx.record_created(entry("7"));
        ctx.clear_created();
        assert!(ctx.created().is_none());
    }
}
