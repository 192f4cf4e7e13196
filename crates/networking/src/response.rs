use std::collections::HashMap;

use bytes::Bytes;
use citadel_csp::Policy;

/// Where a per-response policy override is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideSlot {
    /// General override, applied to the enforced header
    Csp,
    /// Override for the report-only header
    CspReport,
}

/// Outgoing response passed through the CSP layer
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code
    status: u16,

    /// Response headers
    headers: HashMap<String, String>,

    /// Response body
    body: Bytes,

    /// Policy fragment contributed by the handler for the enforced header
    csp: Option<Policy>,

    /// Policy fragment contributed by the handler for the report-only header
    csp_report: Option<Policy>,
}

impl Response {
    /// Creates a new Response with an empty body
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Bytes::new(),
            csp: None,
            csp_report: None,
        }
    }

    /// Set the response body
    pub fn with_body<T: Into<Bytes>>(mut self, body: T) -> Self {
        self.body = body.into();
        self
    }

    /// Add a header to the response
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.set_header(name, value);
        self
    }

    /// Attach a general policy override
    pub fn with_csp(mut self, policy: Policy) -> Self {
        self.csp = Some(policy);
        self
    }

    /// Attach a report-only policy override
    pub fn with_csp_report(mut self, policy: Policy) -> Self {
        self.csp_report = Some(policy);
        self
    }

    /// Get the HTTP status code
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Get the response body as bytes
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Get all response headers
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Get a specific header value
    pub fn header(&self, name: &str) -> Option<&String> {
        let name_lower = name.to_lowercase();
        self.headers.iter()
            .find(|(k, _)| k.to_lowercase() == name_lower)
            .map(|(_, v)| v)
    }

    /// Check whether a header is already set, ignoring case
    pub fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }

    pub fn set_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name.to_string(), value.to_string());
    }

    /// Policy override attached to the given slot
    pub fn csp_override(&self, slot: OverrideSlot) -> Option<&Policy> {
        match slot {
            OverrideSlot::Csp => self.csp.as_ref(),
            OverrideSlot::CspReport => self.csp_report.as_ref(),
        }
    }
}
