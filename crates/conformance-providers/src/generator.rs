// crates/conformance-providers/src/generator.rs
// ============================================================================
// Module: Template Payload Generator
// Description: Default and mutated resource bodies from JSON templates.
// Purpose: Supply creatable and updatable payloads to the step library.
// Dependencies: conformance-core, serde_json
// ============================================================================

//! ## Overview
//! [`TemplateGenerator`] returns a configured template for a resource type,
//! or a bare `{"resourceType": T}` body when none is configured. The
//! `resourceType` member is always forced to the requested type.
//!
//! Mutation writes a narrative `text` element carrying a marker that grows
//! with every call, so consecutive updates never send identical bodies.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use conformance_core::GeneratorError;
use conformance_core::PayloadGenerator;
use conformance_core::ResourceBody;
use conformance_core::ResourceType;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Generator
// ============================================================================

/// Template-driven payload generator.
#[derive(Debug, Default)]
pub struct TemplateGenerator {
    /// Template bodies keyed by resource type.
    templates: BTreeMap<ResourceType, Map<String, Value>>,
    /// Mutation counter.
    marker: AtomicU64,
}

impl TemplateGenerator {
    /// Creates a generator without templates.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a template body for a resource type.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::Unsupported`] when the template is not a JSON object.
    pub fn with_template(
        mut self,
        resource_type: ResourceType,
        template: Value,
    ) -> Result<Self, GeneratorError> {
        let Value::Object(template) = template else {
            return Err(GeneratorError::Unsupported(format!(
                "template for {resource_type} must be a JSON object"
            )));
        };
        self.templates.insert(resource_type, template);
        Ok(self)
    }
}

impl PayloadGenerator for TemplateGenerator {
    fn generate_default(
        &self,
        resource_type: &ResourceType,
    ) -> Result<ResourceBody, GeneratorError> {
        let mut body = self.templates.get(resource_type).cloned().unwrap_or_default();
        body.insert("resourceType".to_string(), Value::String(resource_type.to_string()));
        Ok(Value::Object(body))
    }

    fn mutate_in_place(&self, body: &mut ResourceBody) -> Result<(), GeneratorError> {
        let Value::Object(map) = body else {
            return Err(GeneratorError::Mutation("resource body is not a JSON object".to_string()));
        };
        let marker = self.marker.fetch_add(1, Ordering::Relaxed) + 1;
        map.insert(
            "text".to_string(),
            json!({
                "status": "generated",
                "div": format!(
                    "<div xmlns=\"http://www.w3.org/1999/xhtml\">Conformance update {marker}</div>"
                ),
            }),
        );
        Ok(())
    }
}
