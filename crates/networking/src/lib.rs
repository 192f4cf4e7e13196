//! Citadel CSP response layer
//!
//! Framework-agnostic glue that decides which policy applies to a response,
//! compiles it with `citadel-csp` and attaches the resulting headers.

pub mod config;
pub mod error;
pub mod middleware;
pub mod request;
pub mod response;
pub mod source;

/// Re-export common types for easier usage
pub use config::CspConfig;
pub use error::{MiddlewareError, MiddlewareResult};
pub use middleware::CspMiddleware;
pub use request::{Method, Request};
pub use response::{OverrideSlot, Response};
pub use source::{DirectiveSource, PolicySource, ResolvedPolicy};

pub use citadel_csp::{CSP_HEADER, CSP_REPORT_ONLY_HEADER};
