// crates/conformance-providers/src/bundle.rs
// ============================================================================
// Module: Bundle Parsing
// Description: Extracts resource entries from listing and history bundles.
// Purpose: Turn server JSON into identity/version/body entries.
// Dependencies: conformance-core, serde_json
// ============================================================================

//! ## Overview
//! Listing and history responses arrive as `Bundle` resources whose
//! `entry[].resource` members carry the instances. Entries without an
//! embedded resource (deleted history entries) or without an `id` are
//! dropped; order is preserved.

// ============================================================================
// SECTION: Imports
// ============================================================================

use conformance_core::ResourceEntry;
use conformance_core::ResourceId;
use conformance_core::VersionId;
use serde_json::Value;

// ============================================================================
// SECTION: Bundle Parsing
// ============================================================================

/// Resource type name of a bundle.
const BUNDLE_TYPE: &str = "Bundle";

/// Parses a bundle into entries; `None` when the body is not a bundle.
#[must_use]
pub fn parse_bundle(body: &Value) -> Option<Vec<ResourceEntry>> {
    if resource_type_of(body) != Some(BUNDLE_TYPE) {
        return None;
    }
    let Some(entries) = body.get("entry") else {
        return Some(Vec::new());
    };
    let entries = entries.as_array()?;
    Some(
        entries
            .iter()
            .filter_map(|entry| entry.get("resource"))
            .filter_map(entry_from_resource)
            .collect(),
    )
}

/// Builds an entry from a single resource body.
#[must_use]
pub fn entry_from_resource(resource: &Value) -> Option<ResourceEntry> {
    let id = resource_id(resource)?;
    Some(ResourceEntry::new(id, version_id(resource), Some(resource.clone())))
}

// ============================================================================
// SECTION: Field Accessors
// ============================================================================

/// Returns the `resourceType` of a body.
#[must_use]
pub fn resource_type_of(body: &Value) -> Option<&str> {
    body.get("resourceType").and_then(Value::as_str)
}

/// Returns the logical `id` of a resource body.
#[must_use]
pub fn resource_id(resource: &Value) -> Option<ResourceId> {
    resource.get("id").and_then(Value::as_str).filter(|id| !id.is_empty()).map(ResourceId::new)
}

/// Returns `meta.versionId` of a resource body.
#[must_use]
pub fn version_id(resource: &Value) -> Option<VersionId> {
    resource
        .get("meta")
        .and_then(|meta| meta.get("versionId"))
        .and_then(Value::as_str)
        .filter(|version| !version.is_empty())
        .map(VersionId::new)
}
