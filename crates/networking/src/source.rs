//! Deferred policy values.
//!
//! A configured base policy may be fixed data or computed per response. Thunks
//! are resolved eagerly, before any merge or compile step runs.

use std::fmt;
use std::sync::Arc;

use citadel_csp::{DirectiveValue, Policy};

use crate::request::Request;
use crate::response::Response;

/// Computes a whole policy for a request/response pair
pub type PolicyThunk = Arc<dyn Fn(&Request, &Response) -> Policy + Send + Sync>;

/// Computes a single directive value for a request/response pair
pub type ValueThunk = Arc<dyn Fn(&Request, &Response) -> DirectiveValue + Send + Sync>;

/// A directive value that is either fixed or computed per response
#[derive(Clone)]
pub enum DirectiveSource {
    Value(DirectiveValue),
    Thunk(ValueThunk),
}

impl DirectiveSource {
    pub fn thunk<F>(f: F) -> Self
    where
        F: Fn(&Request, &Response) -> DirectiveValue + Send + Sync + 'static,
    {
        DirectiveSource::Thunk(Arc::new(f))
    }

    pub fn resolve(&self, request: &Request, response: &Response) -> DirectiveValue {
        match self {
            DirectiveSource::Value(value) => value.clone(),
            DirectiveSource::Thunk(thunk) => thunk(request, response),
        }
    }
}

impl From<DirectiveValue> for DirectiveSource {
    fn from(value: DirectiveValue) -> Self {
        DirectiveSource::Value(value)
    }
}

impl From<bool> for DirectiveSource {
    fn from(flag: bool) -> Self {
        DirectiveSource::Value(flag.into())
    }
}

impl From<&str> for DirectiveSource {
    fn from(value: &str) -> Self {
        DirectiveSource::Value(value.into())
    }
}

impl From<String> for DirectiveSource {
    fn from(value: String) -> Self {
        DirectiveSource::Value(value.into())
    }
}

impl From<Vec<&str>> for DirectiveSource {
    fn from(tokens: Vec<&str>) -> Self {
        DirectiveSource::Value(tokens.into())
    }
}

impl fmt::Debug for DirectiveSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectiveSource::Value(value) => f.debug_tuple("Value").field(value).finish(),
            DirectiveSource::Thunk(_) => f.write_str("Thunk(..)"),
        }
    }
}

/// A configured base policy
#[derive(Clone)]
pub enum PolicySource {
    /// Header value used verbatim, never compiled
    Raw(String),
    /// Fixed structured policy
    Static(Policy),
    /// Ordered directives, some of which may be computed per response
    PerDirective(Vec<(String, DirectiveSource)>),
    /// Whole policy computed per response
    Dynamic(PolicyThunk),
}

/// Outcome of resolving a [`PolicySource`] for one response
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedPolicy<'a> {
    Raw(&'a str),
    Structured(Policy),
}

impl PolicySource {
    pub fn raw(header: impl Into<String>) -> Self {
        PolicySource::Raw(header.into())
    }

    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn(&Request, &Response) -> Policy + Send + Sync + 'static,
    {
        PolicySource::Dynamic(Arc::new(f))
    }

    pub fn per_directive<I, K, V>(directives: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<DirectiveSource>,
    {
        PolicySource::PerDirective(
            directives
                .into_iter()
                .map(|(name, source)| (name.into(), source.into()))
                .collect(),
        )
    }

    /// Whether the source contributes anything; empty sources count as unset.
    pub fn is_configured(&self) -> bool {
        match self {
            PolicySource::Raw(header) => !header.is_empty(),
            PolicySource::Static(policy) => !policy.is_empty(),
            PolicySource::PerDirective(directives) => !directives.is_empty(),
            PolicySource::Dynamic(_) => true,
        }
    }

    /// Whether resolving this source calls back into user code
    pub fn is_deferred(&self) -> bool {
        match self {
            PolicySource::Dynamic(_) => true,
            PolicySource::PerDirective(directives) => directives
                .iter()
                .any(|(_, source)| matches!(source, DirectiveSource::Thunk(_))),
            PolicySource::Raw(_) | PolicySource::Static(_) => false,
        }
    }

    /// Resolve the source for one request/response pair.
    pub fn resolve(&self, request: &Request, response: &Response) -> ResolvedPolicy<'_> {
        match self {
            PolicySource::Raw(header) => ResolvedPolicy::Raw(header),
            PolicySource::Static(policy) => ResolvedPolicy::Structured(policy.clone()),
            PolicySource::PerDirective(directives) => ResolvedPolicy::Structured(
                directives
                    .iter()
                    .map(|(name, source)| (name.as_str(), source.resolve(request, response)))
                    .collect(),
            ),
            PolicySource::Dynamic(thunk) => ResolvedPolicy::Structured(thunk(request, response)),
        }
    }
}

impl From<Policy> for PolicySource {
    fn from(policy: Policy) -> Self {
        PolicySource::Static(policy)
    }
}

impl fmt::Debug for PolicySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicySource::Raw(header) => f.debug_tuple("Raw").field(header).finish(),
            PolicySource::Static(policy) => f.debug_tuple("Static").field(policy).finish(),
            PolicySource::PerDirective(directives) => {
                f.debug_tuple("PerDirective").field(directives).finish()
            }
            PolicySource::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}
