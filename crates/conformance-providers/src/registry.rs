// crates/conformance-providers/src/registry.rs
// ============================================================================
// Module: Resource Type Registry
// Description: Static catalog of resource types to test.
// Purpose: Replace runtime discovery with an explicit, immutable list.
// Dependencies: conformance-core, thiserror
// ============================================================================

//! ## Overview
//! [`StaticCatalog`] is built once at startup from `(type, root)` entries.
//! Discovery returns root types in registration order; embedded (non-root)
//! types are registered for completeness but never tested.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use conformance_core::ResourceCatalog;
use conformance_core::ResourceType;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Registry construction errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A resource type was registered twice.
    #[error("resource type registered twice: {0}")]
    Duplicate(String),
    /// A resource type name is empty.
    #[error("resource type name must be non-empty")]
    EmptyName,
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// One registered resource type.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CatalogEntry {
    /// Resource type name.
    resource_type: ResourceType,
    /// True when the type can be read and written on its own endpoint.
    root: bool,
}

/// Immutable catalog of resource types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticCatalog {
    /// Entries in registration order.
    entries: Vec<CatalogEntry>,
}

impl StaticCatalog {
    /// Builds a catalog from `(type, root)` entries.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] on empty names or duplicate registrations.
    pub fn new(
        entries: impl IntoIterator<Item = (ResourceType, bool)>,
    ) -> Result<Self, RegistryError> {
        let mut seen = BTreeSet::new();
        let mut catalog = Vec::new();
        for (resource_type, root) in entries {
            if resource_type.as_str().trim().is_empty() {
                return Err(RegistryError::EmptyName);
            }
            if !seen.insert(resource_type.clone()) {
                return Err(RegistryError::Duplicate(resource_type.to_string()));
            }
            catalog.push(CatalogEntry {
                resource_type,
                root,
            });
        }
        Ok(Self {
            entries: catalog,
        })
    }

    /// Returns the number of registered types, root or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keeps only the named root types, in registration order.
    #[must_use]
    pub fn restricted_to(&self, names: &[ResourceType]) -> Vec<ResourceType> {
        self.resource_types().into_iter().filter(|rt| names.contains(rt)).collect()
    }
}

impl ResourceCatalog for StaticCatalog {
    fn resource_types(&self) -> Vec<ResourceType> {
        self.entries
            .iter()
            .filter(|entry| entry.root)
            .map(|entry| entry.resource_type.clone())
            .collect()
    }
}
