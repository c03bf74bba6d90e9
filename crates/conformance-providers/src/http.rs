// crates/conformance-providers/src/http.rs
// ============================================================================
// Module: HTTP Resource Transport
// Description: REST transport for the server under test.
// Purpose: Map transport calls onto resource endpoints with strict limits.
// Dependencies: conformance-core, reqwest, serde_json, tracing, url
// ============================================================================

//! ## Overview
//! [`HttpTransport`] issues blocking requests against a base URL:
//!
//! | Call | Request |
//! |---|---|
//! | list | `GET {base}/{type}` |
//! | create | `POST {base}/{type}` |
//! | read | `GET {base}/{type}/{id}` |
//! | update | `PUT {base}/{type}/{id}` |
//! | history | `GET {base}/{type}/{id}/_history` |
//! | version read | `GET {base}/{type}/{id}/_history/{vid}` |
//!
//! Non-success status codes are returned in the reply for the steps to
//! judge. Connection failures, oversized bodies, and unparseable success
//! bodies are [`TransportError`]s. Redirects are not followed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::time::Duration;

use conformance_core::InstanceReply;
use conformance_core::ListingReply;
use conformance_core::ResourceBody;
use conformance_core::ResourceId;
use conformance_core::ResourceTransport;
use conformance_core::ResourceType;
use conformance_core::TransportError;
use conformance_core::VersionId;
use conformance_core::VersionReply;
use reqwest::blocking::Client;
use reqwest::blocking::RequestBuilder;
use reqwest::blocking::Response;
use reqwest::header::ACCEPT;
use reqwest::header::CONTENT_LOCATION;
use reqwest::header::CONTENT_TYPE;
use reqwest::header::ETAG;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderName;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::bundle::parse_bundle;
use crate::bundle::resource_id;
use crate::bundle::version_id;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Media type for resource bodies.
pub const RESOURCE_MEDIA_TYPE: &str = "application/fhir+json";
/// Path segment naming the history interaction.
const HISTORY_SEGMENT: &str = "_history";

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the HTTP transport.
///
/// # Invariants
/// - `base_url` is an absolute `http` or `https` URL.
/// - `max_response_bytes` is a hard upper bound on response bodies.
/// - `timeout_ms` applies to the full request lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpTransportConfig {
    /// Base URL of the server under test.
    pub base_url: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum response size allowed, in bytes.
    pub max_response_bytes: usize,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/fhir".to_string(),
            timeout_ms: 30_000,
            max_response_bytes: 8 * 1024 * 1024,
            user_agent: "resource-conformance/0.1".to_string(),
        }
    }
}

/// Transport construction errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpTransportError {
    /// The base URL is unusable.
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
    /// The HTTP client could not be built.
    #[error("http client build failed: {0}")]
    Client(String),
}

// ============================================================================
// SECTION: Transport
// ============================================================================

/// REST transport for a resource server.
pub struct HttpTransport {
    /// Transport configuration, including limits.
    config: HttpTransportConfig,
    /// Parsed base URL.
    base: Url,
    /// HTTP client used for outbound requests.
    client: Client,
}

impl HttpTransport {
    /// Creates a transport with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HttpTransportError`] when the base URL is invalid or the
    /// client cannot be built.
    pub fn new(config: HttpTransportConfig) -> Result<Self, HttpTransportError> {
        let base = parse_base_url(&config.base_url)?;
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|err| HttpTransportError::Client(err.to_string()))?;
        Ok(Self {
            config,
            base,
            client,
        })
    }

    /// Builds an endpoint URL below the base.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| TransportError::Request("base url cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends a request and reads the response under the size limit.
    fn send(&self, method: &str, request: RequestBuilder) -> Result<RawReply, TransportError> {
        let mut response = request
            .header(ACCEPT, RESOURCE_MEDIA_TYPE)
            .send()
            .map_err(|err| TransportError::Request(err.to_string()))?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = read_response_limited(&mut response, self.config.max_response_bytes)?;
        debug!(method, url = %response.url(), status, bytes = body.len(), "response received");
        let raw = if body.is_empty() {
            None
        } else if (200..300).contains(&status) {
            let text = String::from_utf8(body).map_err(|_| {
                TransportError::MalformedResponse("body is not utf-8".to_string())
            })?;
            Some(text)
        } else {
            // Error pages are diagnostics only; keep them readable whatever their charset.
            Some(String::from_utf8_lossy(&body).into_owned())
        };
        Ok(RawReply {
            status,
            headers,
            raw,
        })
    }

    /// Sends a request whose reply is a listing bundle.
    fn fetch_listing(&self, url: Url) -> Result<ListingReply, TransportError> {
        let reply = self.send("GET", self.client.get(url))?;
        let entries = if reply.is_success() {
            reply.json()?.as_ref().and_then(parse_bundle)
        } else {
            None
        };
        Ok(ListingReply {
            status: reply.status,
            entries,
            raw: reply.raw,
        })
    }

    /// Sends a body-carrying request whose reply is a single instance.
    fn send_instance(
        &self,
        method: &str,
        request: RequestBuilder,
        body: &ResourceBody,
    ) -> Result<InstanceReply, TransportError> {
        let bytes = serde_json::to_vec(body)
            .map_err(|err| TransportError::Request(format!("body serialization failed: {err}")))?;
        let request = request.header(CONTENT_TYPE, RESOURCE_MEDIA_TYPE).body(bytes);
        instance_reply(self.send(method, request)?)
    }
}

impl ResourceTransport for HttpTransport {
    fn list_type(&self, resource_type: &ResourceType) -> Result<ListingReply, TransportError> {
        let url = self.endpoint(&[resource_type.as_str()])?;
        self.fetch_listing(url)
    }

    fn create(
        &self,
        resource_type: &ResourceType,
        body: &ResourceBody,
    ) -> Result<InstanceReply, TransportError> {
        let url = self.endpoint(&[resource_type.as_str()])?;
        self.send_instance("POST", self.client.post(url), body)
    }

    fn read(
        &self,
        resource_type: &ResourceType,
        id: &ResourceId,
    ) -> Result<InstanceReply, TransportError> {
        let url = self.endpoint(&[resource_type.as_str(), id.as_str()])?;
        instance_reply(self.send("GET", self.client.get(url))?)
    }

    fn update(
        &self,
        resource_type: &ResourceType,
        body: &ResourceBody,
        id: &ResourceId,
    ) -> Result<InstanceReply, TransportError> {
        let url = self.endpoint(&[resource_type.as_str(), id.as_str()])?;
        let mut body = body.clone();
        if let Value::Object(map) = &mut body {
            map.insert("id".to_string(), Value::String(id.to_string()));
        }
        self.send_instance("PUT", self.client.put(url), &body)
    }

    fn history_of_instance(
        &self,
        resource_type: &ResourceType,
        id: &ResourceId,
    ) -> Result<ListingReply, TransportError> {
        let url = self.endpoint(&[resource_type.as_str(), id.as_str(), HISTORY_SEGMENT])?;
        self.fetch_listing(url)
    }

    fn history_of_version(
        &self,
        resource_type: &ResourceType,
        id: &ResourceId,
        version: &VersionId,
    ) -> Result<VersionReply, TransportError> {
        let url = self.endpoint(&[
            resource_type.as_str(),
            id.as_str(),
            HISTORY_SEGMENT,
            version.as_str(),
        ])?;
        let reply = self.send("GET", self.client.get(url))?;
        let body = if reply.is_success() { reply.json()? } else { None };
        Ok(VersionReply {
            status: reply.status,
            body,
            raw: reply.raw,
        })
    }
}

// ============================================================================
// SECTION: Replies
// ============================================================================

/// Status, headers, and text body of one response.
struct RawReply {
    /// HTTP status code.
    status: u16,
    /// Response headers.
    headers: HeaderMap,
    /// Body text; `None` when empty.
    raw: Option<String>,
}

impl RawReply {
    /// Returns true for 2xx statuses.
    fn is_success(&self) -> bool {
        (200 .. 300).contains(&self.status)
    }

    /// Parses the body as JSON; an empty body is `None`.
    fn json(&self) -> Result<Option<Value>, TransportError> {
        self.raw
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|err| TransportError::MalformedResponse(format!("invalid json: {err}")))
    }

    /// Returns a header value as text.
    fn header(&self, name: &HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// Builds an instance reply, taking identity from headers before the body.
fn instance_reply(reply: RawReply) -> Result<InstanceReply, TransportError> {
    if !reply.is_success() {
        return Ok(InstanceReply {
            code: reply.status,
            id: None,
            version: None,
            body: None,
            raw: reply.raw,
        });
    }
    let body = reply.json()?;
    let (location_id, location_version) = reply
        .header(&LOCATION)
        .or_else(|| reply.header(&CONTENT_LOCATION))
        .map(parse_location)
        .unwrap_or_default();
    let id = location_id.or_else(|| body.as_ref().and_then(resource_id));
    let version = location_version
        .or_else(|| body.as_ref().and_then(version_id))
        .or_else(|| reply.header(&ETAG).and_then(parse_etag));
    Ok(InstanceReply {
        code: reply.status,
        id,
        version,
        body,
        raw: reply.raw,
    })
}

/// Extracts id and version from a `.../{type}/{id}/_history/{vid}` location.
fn parse_location(location: &str) -> (Option<ResourceId>, Option<VersionId>) {
    let path = location.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = path.split('/').filter(|segment| !segment.is_empty()).collect();
    match segments.iter().position(|segment| *segment == HISTORY_SEGMENT) {
        Some(index) => (
            index.checked_sub(1).and_then(|i| segments.get(i)).map(|id| ResourceId::new(*id)),
            segments.get(index + 1).map(|vid| VersionId::new(*vid)),
        ),
        None => (segments.last().map(|id| ResourceId::new(*id)), None),
    }
}

/// Extracts the version from a weak or strong `ETag`.
fn parse_etag(etag: &str) -> Option<VersionId> {
    let trimmed = etag.trim();
    let trimmed = trimmed.strip_prefix("W/").unwrap_or(trimmed);
    let version = trimmed.trim_matches('"');
    (!version.is_empty()).then(|| VersionId::new(version))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses and checks the configured base URL.
fn parse_base_url(raw: &str) -> Result<Url, HttpTransportError> {
    let url = Url::parse(raw).map_err(|err| HttpTransportError::InvalidBaseUrl(err.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(HttpTransportError::InvalidBaseUrl(format!("unsupported scheme: {other}")));
        }
    }
    if url.cannot_be_a_base() {
        return Err(HttpTransportError::InvalidBaseUrl("url cannot be a base".to_string()));
    }
    Ok(url)
}

/// Reads the response body while enforcing a byte limit.
fn read_response_limited(
    response: &mut Response,
    max_bytes: usize,
) -> Result<Vec<u8>, TransportError> {
    let max_bytes_u64 = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    if let Some(expected) = response.content_length()
        && expected > max_bytes_u64
    {
        return Err(TransportError::ResponseTooLarge {
            limit: max_bytes,
            actual: usize::try_from(expected).unwrap_or(usize::MAX),
        });
    }
    let mut buf = Vec::new();
    response
        .take(max_bytes_u64.saturating_add(1))
        .read_to_end(&mut buf)
        .map_err(|err| TransportError::Request(format!("failed to read response: {err}")))?;
    if buf.len() > max_bytes {
        return Err(TransportError::ResponseTooLarge {
            limit: max_bytes,
            actual: buf.len(),
        });
    }
    Ok(buf)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_with_history_yields_id_and_version() {
        let (id, version) = parse_location("http://host/fhir/Patient/12/_history/3");
        assert_eq!(id, Some(ResourceId::new("12")));
        assert_eq!(version, Some(VersionId::new("3")));
    }

    #[test]
    fn location_without_history_yields_id_only() {
        let (id, version) = parse_location("Patient/12?_format=json");
        assert_eq!(id, Some(ResourceId::new("12")));
        assert_eq!(version, None);
    }

    #[test]
    fn weak_etag_is_unwrapped() {
        assert_eq!(parse_etag("W/\"4\""), Some(VersionId::new("4")));
        assert_eq!(parse_etag("\"5\""), Some(VersionId::new("5")));
        assert_eq!(parse_etag("W/\"\""), None);
    }

    #[test]
    fn base_url_must_be_http() {
        assert!(parse_base_url("ftp://example.com/fhir").is_err());
        assert!(parse_base_url("not a url").is_err());
        assert!(parse_base_url("https://example.com/fhir/").is_ok());
    }
}
