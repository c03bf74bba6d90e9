// crates/conformance-core/tests/common/mod.rs
// ============================================================================
// Module: Conformance Core Test Support
// Description: Scripted transport, generator, and parser fakes.
// Purpose: Drive the sequencer without a server and record every call.
// ============================================================================

#![allow(dead_code, reason = "Each test binary uses a different subset of helpers.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only helpers use panic-based assertions."
)]

use std::sync::Mutex;

use conformance_core::CancellationToken;
use conformance_core::DiagnosticsParser;
use conformance_core::GeneratorError;
use conformance_core::InstanceReply;
use conformance_core::ListingReply;
use conformance_core::OperationOutcome;
use conformance_core::PayloadGenerator;
use conformance_core::ResourceBody;
use conformance_core::ResourceEntry;
use conformance_core::ResourceId;
use conformance_core::ResourceReport;
use conformance_core::ResourceTransport;
use conformance_core::ResourceType;
use conformance_core::Sequencer;
use conformance_core::SequencerConfig;
use conformance_core::StepOutcome;
use conformance_core::TransportError;
use conformance_core::VersionId;
use conformance_core::VersionReply;
use serde_json::json;

// ============================================================================
// SECTION: Calls
// ============================================================================

/// One transport call as observed by the fake.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List(String),
    Create(String),
    Read(String, String),
    Update(String, String),
    History(String, String),
    Version(String, String, String),
}

// ============================================================================
// SECTION: Script
// ============================================================================

/// Canned replies returned for every resource type.
#[derive(Debug, Clone)]
pub struct Script {
    pub listing: Result<ListingReply, TransportError>,
    pub create: Result<InstanceReply, TransportError>,
    pub read: Result<InstanceReply, TransportError>,
    pub update: Result<InstanceReply, TransportError>,
    pub history: Result<ListingReply, TransportError>,
    pub version: Result<VersionReply, TransportError>,
}

impl Default for Script {
    /// A well-behaved server with an empty listing and a two-entry history.
    fn default() -> Self {
        Self {
            listing: Ok(listing(Vec::new())),
            create: Ok(instance(201, Some("7"), Some("1"))),
            read: Ok(instance(200, Some("7"), Some("1"))),
            update: Ok(instance(200, Some("7"), Some("2"))),
            history: Ok(listing(vec![entry("7", "2"), entry("7", "1")])),
            version: Ok(VersionReply {
                status: 200,
                body: Some(json!({"resourceType": "Patient", "id": "7"})),
                raw: Some("{\"resourceType\":\"Patient\",\"id\":\"7\"}".to_string()),
            }),
        }
    }
}

pub fn entry(id: &str, version: &str) -> ResourceEntry {
    ResourceEntry::new(
        ResourceId::new(id),
        Some(VersionId::new(version)),
        Some(json!({"resourceType": "Patient", "id": id, "meta": {"versionId": version}})),
    )
}

pub fn listing(entries: Vec<ResourceEntry>) -> ListingReply {
    ListingReply {
        status: 200,
        entries: Some(entries),
        raw: Some("{\"resourceType\":\"Bundle\"}".to_string()),
    }
}

pub fn missing_listing() -> ListingReply {
    ListingReply {
        status: 404,
        entries: None,
        raw: None,
    }
}

pub fn instance(code: u16, id: Option<&str>, version: Option<&str>) -> InstanceReply {
    let body = id.map(|id| json!({"resourceType": "Patient", "id": id}));
    InstanceReply {
        code,
        id: id.map(ResourceId::new),
        version: version.map(VersionId::new),
        raw: body.as_ref().map(ToString::to_string),
        body,
    }
}

// ============================================================================
// SECTION: Fakes
// ============================================================================

/// Transport replaying a script and recording calls.
#[derive(Debug, Default)]
pub struct FakeTransport {
    script: Script,
    calls: Mutex<Vec<Call>>,
    cancel_on_create: Option<CancellationToken>,
}

impl FakeTransport {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            calls: Mutex::new(Vec::new()),
            cancel_on_create: None,
        }
    }

    /// Cancels the token while the create call is in flight.
    pub fn cancelling_on_create(mut self, token: CancellationToken) -> Self {
        self.cancel_on_create = Some(token);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn update_calls(&self) -> usize {
        self.calls().iter().filter(|call| matches!(call, Call::Update(..))).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl ResourceTransport for FakeTransport {
    fn list_type(&self, resource_type: &ResourceType) -> Result<ListingReply, TransportError> {
        self.record(Call::List(resource_type.to_string()));
        self.script.listing.clone()
    }

    fn create(
        &self,
        resource_type: &ResourceType,
        _body: &ResourceBody,
    ) -> Result<InstanceReply, TransportError> {
        self.record(Call::Create(resource_type.to_string()));
        if let Some(token) = &self.cancel_on_create {
            token.cancel();
        }
        self.script.create.clone()
    }

    fn read(
        &self,
        resource_type: &ResourceType,
        id: &ResourceId,
    ) -> Result<InstanceReply, TransportError> {
        self.record(Call::Read(resource_type.to_string(), id.to_string()));
        self.script.read.clone()
    }

    fn update(
        &self,
        resource_type: &ResourceType,
        _body: &ResourceBody,
        id: &ResourceId,
    ) -> Result<InstanceReply, TransportError> {
        self.record(Call::Update(resource_type.to_string(), id.to_string()));
        self.script.update.clone()
    }

    fn history_of_instance(
        &self,
        resource_type: &ResourceType,
        id: &ResourceId,
    ) -> Result<ListingReply, TransportError> {
        self.record(Call::History(resource_type.to_string(), id.to_string()));
        self.script.history.clone()
    }

    fn history_of_version(
        &self,
        resource_type: &ResourceType,
        id: &ResourceId,
        version: &VersionId,
    ) -> Result<VersionReply, TransportError> {
        self.record(Call::Version(resource_type.to_string(), id.to_string(), version.to_string()));
        self.script.version.clone()
    }
}

/// Generator producing a minimal body and stamping a marker on mutation.
#[derive(Debug, Default)]
pub struct FakeGenerator;

impl PayloadGenerator for FakeGenerator {
    fn generate_default(
        &self,
        resource_type: &ResourceType,
    ) -> Result<ResourceBody, GeneratorError> {
        Ok(json!({"resourceType": resource_type.as_str()}))
    }

    fn mutate_in_place(&self, body: &mut ResourceBody) -> Result<(), GeneratorError> {
        let object = body
            .as_object_mut()
            .ok_or_else(|| GeneratorError::Mutation("body is not an object".to_string()))?;
        object.insert("text".to_string(), json!("mutated"));
        Ok(())
    }
}

/// Parser that echoes the raw payload.
#[derive(Debug, Default)]
pub struct EchoParser;

impl DiagnosticsParser for EchoParser {
    fn parse_error_payload(&self, raw: Option<&str>) -> OperationOutcome {
        OperationOutcome {
            issues: vec![conformance_core::Issue {
                severity: "error".to_string(),
                code: "processing".to_string(),
                details: raw.map(str::to_string),
            }],
        }
    }

    fn format_messages(&self, outcome: &OperationOutcome) -> String {
        outcome
            .issues
            .iter()
            .map(|issue| {
                format!("{}: {}", issue.code, issue.details.as_deref().unwrap_or("no details"))
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// ============================================================================
// SECTION: Runners
// ============================================================================

pub type FakeSequencer = Sequencer<FakeTransport, FakeGenerator, EchoParser>;

pub fn sequencer(script: Script) -> FakeSequencer {
    let transport = FakeTransport::new(script);
    Sequencer::new(transport, FakeGenerator, EchoParser, SequencerConfig::default()).unwrap()
}

/// Runs one `Patient` type through the full step library.
pub fn run_patient(script: Script) -> (ResourceReport, Vec<Call>) {
    let sequencer = sequencer(script);
    let report = sequencer.run_resource_type(&ResourceType::new("Patient"));
    let calls = sequencer.transport().calls();
    (report, calls)
}

/// Returns the outcome for a step code.
pub fn outcome<'a>(report: &'a ResourceReport, step_id: &str) -> &'a StepOutcome {
    report
        .outcomes
        .iter()
        .find(|outcome| outcome.step_id.as_str() == step_id)
        .unwrap_or_else(|| panic!("missing outcome for {step_id}"))
}
