use std::collections::HashMap;

use url::Url;

use crate::error::MiddlewareError;

/// Common HTTP methods
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    GET,
    POST,
    PUT,
    DELETE,
    HEAD,
    OPTIONS,
    PATCH,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::GET => write!(f, "GET"),
            Method::POST => write!(f, "POST"),
            Method::PUT => write!(f, "PUT"),
            Method::DELETE => write!(f, "DELETE"),
            Method::HEAD => write!(f, "HEAD"),
            Method::OPTIONS => write!(f, "OPTIONS"),
            Method::PATCH => write!(f, "PATCH"),
        }
    }
}

/// Incoming request as seen by the CSP layer
///
/// Only what policy thunks and diagnostics need is kept: the method, the URL
/// and the headers.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method
    method: Method,

    /// Requested URL
    url: Url,

    /// Request headers
    headers: HashMap<String, String>,
}

impl Request {
    /// Create a new request with the specified method and URL
    pub fn new(method: Method, url: &str) -> Result<Self, MiddlewareError> {
        let url = Url::parse(url).map_err(MiddlewareError::UrlError)?;

        Ok(Self {
            method,
            url,
            headers: HashMap::new(),
        })
    }

    /// Add a header to the request
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    /// Get the HTTP method
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Get the URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Path plus query string, as logged in diagnostics
    pub fn full_path(&self) -> String {
        match self.url.query() {
            Some(query) => format!("{}?{}", self.url.path(), query),
            None => self.url.path().to_string(),
        }
    }

    /// Get a specific header value
    pub fn header(&self, name: &str) -> Option<&String> {
        let name_lower = name.to_lowercase();
        self.headers.iter()
            .find(|(k, _)| k.to_lowercase() == name_lower)
            .map(|(_, v)| v)
    }
}
