// crates/conformance-core/src/interfaces/mod.rs
// ============================================================================
// Module: Resource Conformance Interfaces
// Description: Collaborator contracts for discovery, payloads, transport, and diagnostics.
// Purpose: Define the seams the sequencer uses to reach the server under test.
// Dependencies: crate::core, serde, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how the sequencer reaches external systems without
//! embedding backend-specific details. Transport calls are synchronous
//! request/response pairs. A transport-level failure is reported as
//! [`TransportError`] and is distinct from an application-level non-success
//! status code, which is carried in the reply.
//!
//! Implementations are shared across worker threads when resource types run
//! in parallel, so every trait is `Send + Sync`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::ResourceBody;
use crate::core::ResourceEntry;
use crate::core::ResourceId;
use crate::core::ResourceType;
use crate::core::VersionId;

// ============================================================================
// SECTION: Discovery
// ============================================================================

/// Source of the resource types to test.
pub trait ResourceCatalog: Send + Sync {
    /// Returns the resource types to test, in run order.
    fn resource_types(&self) -> Vec<ResourceType>;
}

impl ResourceCatalog for Vec<ResourceType> {
    fn resource_types(&self) -> Vec<ResourceType> {
        self.clone()
    }
}

// ============================================================================
// SECTION: Payload Generator
// ============================================================================

/// Payload generation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    /// No payload can be produced for the resource type.
    #[error("no payload available for resource type: {0}")]
    Unsupported(String),
    /// The body cannot be mutated.
    #[error("payload mutation failed: {0}")]
    Mutation(String),
}

/// Produces creatable and updatable payloads.
pub trait PayloadGenerator: Send + Sync {
    /// Generates a default body for the resource type.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError`] when no payload can be produced.
    fn generate_default(&self, resource_type: &ResourceType)
    -> Result<ResourceBody, GeneratorError>;

    /// Changes at least one field of the body so an update is observable.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError`] when the body cannot be mutated.
    fn mutate_in_place(&self, body: &mut ResourceBody) -> Result<(), GeneratorError>;
}

// ============================================================================
// SECTION: Transport
// ============================================================================

/// Transport-level failures (the call could not be completed).
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Never used for application-level non-success status codes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request could not be sent or the connection failed.
    #[error("request failed: {0}")]
    Request(String),
    /// The server response could not be interpreted.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    /// The response exceeded the configured size limit.
    #[error("response exceeds size limit ({actual} > {limit})")]
    ResponseTooLarge {
        /// Configured limit in bytes.
        limit: usize,
        /// Observed size in bytes.
        actual: usize,
    },
}

/// Reply to a listing call (type listing or instance history).
#[derive(Debug, Clone, PartialEq)]
pub struct ListingReply {
    /// HTTP-style status code.
    pub status: u16,
    /// Parsed entries; `None` when the server returned no listing.
    pub entries: Option<Vec<ResourceEntry>>,
    /// Raw response body.
    pub raw: Option<String>,
}

/// Reply to a single-instance call (create, read, update).
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceReply {
    /// HTTP-style status code.
    pub code: u16,
    /// Resource id reported by the server.
    pub id: Option<ResourceId>,
    /// Version id reported by the server.
    pub version: Option<VersionId>,
    /// Parsed resource body.
    pub body: Option<ResourceBody>,
    /// Raw response body.
    pub raw: Option<String>,
}

/// Reply to a version read call.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionReply {
    /// HTTP-style status code.
    pub status: u16,
    /// Parsed resource body.
    pub body: Option<ResourceBody>,
    /// Raw response body.
    pub raw: Option<String>,
}

/// Network client for the server under test.
pub trait ResourceTransport: Send + Sync {
    /// Lists instances of a resource type.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the call cannot be completed.
    fn list_type(&self, resource_type: &ResourceType) -> Result<ListingReply, TransportError>;

    /// Creates a new instance from the body.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the call cannot be completed.
    fn create(
        &self,
        resource_type: &ResourceType,
        body: &ResourceBody,
    ) -> Result<InstanceReply, TransportError>;

    /// Reads the current version of an instance.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the call cannot be completed.
    fn read(
        &self,
        resource_type: &ResourceType,
        id: &ResourceId,
    ) -> Result<InstanceReply, TransportError>;

    /// Replaces an instance with the body.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the call cannot be completed.
    fn update(
        &self,
        resource_type: &ResourceType,
        body: &ResourceBody,
        id: &ResourceId,
    ) -> Result<InstanceReply, TransportError>;

    /// Fetches the version history of an instance.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the call cannot be completed.
    fn history_of_instance(
        &self,
        resource_type: &ResourceType,
        id: &ResourceId,
    ) -> Result<ListingReply, TransportError>;

    /// Reads one specific version of an instance.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the call cannot be completed.
    fn history_of_version(
        &self,
        resource_type: &ResourceType,
        id: &ResourceId,
        version: &VersionId,
    ) -> Result<VersionReply, TransportError>;
}

// ============================================================================
// SECTION: Diagnostics
// ============================================================================

/// One issue reported by the server in an error payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Issue severity (for example `error`).
    pub severity: String,
    /// Issue type code (for example `invalid`).
    pub code: String,
    /// Human-readable detail.
    pub details: Option<String>,
}

/// Structured form of a server error payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationOutcome {
    /// Reported issues in payload order.
    pub issues: Vec<Issue>,
}

/// Turns server error payloads into diagnostic text.
pub trait DiagnosticsParser: Send + Sync {
    /// Parses a raw error payload; absent or unreadable payloads still yield an outcome.
    fn parse_error_payload(&self, raw: Option<&str>) -> OperationOutcome;

    /// Formats the structured outcome as a single diagnostic message.
    fn format_messages(&self, outcome: &OperationOutcome) -> String;
}
