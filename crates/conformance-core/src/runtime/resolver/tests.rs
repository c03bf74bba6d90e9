// crates/conformance-core/src/runtime/resolver/tests.rs
// ============================================================================
// Module: Fallback Resolver Tests
// Description: Unit tests for listing, created, and history precedence.
// Purpose: Pin the selection order and index convention of each policy.
// Dependencies: conformance-core
// ============================================================================

//! ## Overview
//! Validates that listing data wins over created data, that the created
//! resource is the only fallback, and that the previous-version policy never
//! falls back to the first history entry.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::json;

use super::ResolutionSource;
use super::UnresolvedReason;
use super::resolve_current_version;
use super::resolve_preexisting;
use super::resolve_previous_version;
use crate::core::ResourceEntry;
use crate::core::ResourceId;
use crate::core::ResourceType;
use crate::core::TestContext;
use crate::core::VersionId;
use crate::runtime::ActiveResource;
use crate::runtime::Resolution;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn entry(id: &str, version: &str) -> ResourceEntry {
    ResourceEntry::new(
        ResourceId::new(id),
        Some(VersionId::new(version)),
        Some(json!({"resourceType": "Patient", "id": id})),
    )
}

fn expect_resolved(resolution: Resolution) -> ActiveResource {
    match resolution {
        Resolution::Resolved(active) => active,
        Resolution::Unresolved(reason) => panic!("expected resolution, got {reason:?}"),
    }
}

// ============================================================================
// SECTION: Preexisting Policy
// ============================================================================

#[test]
fn preexisting_prefers_listing_over_created() {
    let mut ctx = TestContext::new();
    ctx.record_listing(vec![entry("42", "1"), entry("43", "1")]).unwrap();
    ctx.record_created(entry("7", "1"));
    let active = expect_resolved(resolve_preexisting(&ctx));
    assert_eq!(active.entry.id.as_str(), "42");
    assert_eq!(active.source, ResolutionSource::Listing);
}

#[test]
fn preexisting_falls_back_to_created_when_listing_empty() {
    let mut ctx = TestContext::new();
    ctx.record_listing(Vec::new()).unwrap();
    ctx.record_created(entry("7", "1"));
    let active = expect_resolved(resolve_preexisting(&ctx));
    assert_eq!(active.entry.id.as_str(), "7");
    assert_eq!(active.source, ResolutionSource::Created);
}

#[test]
fn preexisting_falls_back_to_created_when_listing_missing() {
    let mut ctx = TestContext::new();
    ctx.record_created(entry("7", "3"));
    let active = expect_resolved(resolve_preexisting(&ctx));
    assert_eq!(active.entry.version, Some(VersionId::new("3")));
}

#[test]
fn preexisting_unresolved_without_data() {
    let mut ctx = TestContext::new();
    ctx.record_listing(Vec::new()).unwrap();
    assert_eq!(
        resolve_preexisting(&ctx),
        Resolution::Unresolved(UnresolvedReason::PreexistingUnknown)
    );
}

// ============================================================================
// SECTION: Version Policies
// ============================================================================

#[test]
fn current_version_uses_first_history_entry() {
    let mut ctx = TestContext::new();
    ctx.record_created(entry("7", "1"));
    ctx.record_history(vec![entry("7", "2"), entry("7", "1")]).unwrap();
    let active = expect_resolved(resolve_current_version(&ctx));
    assert_eq!(active.entry.version, Some(VersionId::new("2")));
    assert_eq!(active.source, ResolutionSource::History);
}

#[test]
fn current_version_falls_back_to_created_with_full_identity() {
    let mut ctx = TestContext::new();
    ctx.record_history(Vec::new()).unwrap();
    ctx.record_created(entry("7", "5"));
    let active = expect_resolved(resolve_current_version(&ctx));
    assert_eq!(active.entry, entry("7", "5"));
}

#[test]
fn current_version_ignores_listing() {
    let mut ctx = TestContext::new();
    ctx.record_listing(vec![entry("42", "1")]).unwrap();
    assert_eq!(
        resolve_current_version(&ctx),
        Resolution::Unresolved(UnresolvedReason::PreexistingUnknown)
    );
}

#[test]
fn previous_version_uses_second_history_entry() {
    let mut ctx = TestContext::new();
    ctx.record_history(vec![entry("7", "3"), entry("7", "2"), entry("7", "1")]).unwrap();
    let active = expect_resolved(resolve_previous_version(&ctx));
    assert_eq!(active.entry.version, Some(VersionId::new("2")));
}

#[test]
fn previous_version_requires_two_entries() {
    let mut ctx = TestContext::new();
    ctx.record_created(entry("7", "1"));
    ctx.record_history(vec![entry("7", "1")]).unwrap();
    assert_eq!(
        resolve_previous_version(&ctx),
        Resolution::Unresolved(UnresolvedReason::PreviousVersionUnavailable)
    );
}

#[test]
fn unresolved_messages_name_the_resource_type() {
    let resource_type = ResourceType::new("Observation");
    assert_eq!(
        UnresolvedReason::PreexistingUnknown.message(&resource_type),
        "Preexisting Observation unknown."
    );
    assert_eq!(
        UnresolvedReason::PreviousVersionUnavailable.message(&resource_type),
        "Previous version of Observation unavailable."
    );
}

#[test]
fn source_labels_match_serialized_names() {
    let sources = [ResolutionSource::Listing, ResolutionSource::Created, ResolutionSource::History];
    for source in sources {
        let serialized = serde_json::to_value(source).unwrap();
        assert_eq!(serialized, source.as_str());
    }
}
