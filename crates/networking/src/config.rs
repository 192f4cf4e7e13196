use citadel_csp::Policy;
use serde::Deserialize;

use crate::error::MiddlewareResult;
use crate::source::PolicySource;

/// Base policies for the CSP response layer
///
/// Either header may be left unset. A raw string is sent verbatim; a
/// structured policy is compiled per response.
#[derive(Debug, Clone, Default)]
pub struct CspConfig {
    /// Base policy for `Content-Security-Policy`
    pub enforced: Option<PolicySource>,
    /// Base policy for `Content-Security-Policy-Report-Only`
    pub report_only: Option<PolicySource>,
}

/// Policy as written in a configuration file
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ConfiguredPolicy {
    Raw(String),
    Structured(Policy),
}

impl From<ConfiguredPolicy> for PolicySource {
    fn from(configured: ConfiguredPolicy) -> Self {
        match configured {
            ConfiguredPolicy::Raw(header) => PolicySource::Raw(header),
            ConfiguredPolicy::Structured(policy) => PolicySource::Static(policy),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    enforced: Option<ConfiguredPolicy>,
    #[serde(default)]
    report_only: Option<ConfiguredPolicy>,
}

impl CspConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the enforced base policy
    pub fn with_enforced(mut self, source: impl Into<PolicySource>) -> Self {
        self.enforced = Some(source.into());
        self
    }

    /// Set the report-only base policy
    pub fn with_report_only(mut self, source: impl Into<PolicySource>) -> Self {
        self.report_only = Some(source.into());
        self
    }

    /// Load static base policies from JSON.
    ///
    /// ```json
    /// {
    ///     "enforced": {"default-src": ["self"], "report-uri": "/csp"},
    ///     "report_only": "default-src 'none'"
    /// }
    /// ```
    pub fn from_json_str(json: &str) -> MiddlewareResult<Self> {
        let file: ConfigFile = serde_json::from_str(json)?;
        Ok(Self {
            enforced: file.enforced.map(PolicySource::from),
            report_only: file.report_only.map(PolicySource::from),
        })
    }

    /// Whether at least one header has a non-empty base policy
    pub fn is_configured(&self) -> bool {
        [&self.enforced, &self.report_only]
            .iter()
            .any(|source| source.as_ref().map_or(false, PolicySource::is_configured))
    }
}
