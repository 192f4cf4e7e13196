//! Citadel CSP Crate
//!
//! This crate compiles structured Content Security Policies into header
//! values and merges per-response policy fragments into a base policy.

pub mod compiler;
pub mod error;
pub mod merge;
pub mod policy;
pub mod registry;

pub use compiler::{compile, PolicyCompiler};
pub use error::{CompileError, CompileResult};
pub use merge::{merge, resolve_override, OVERRIDE_KEY};
pub use policy::{DirectiveValue, Policy};
pub use registry::{directive_kind, DirectiveKind};

/// Header carrying an enforced policy
pub const CSP_HEADER: &str = "Content-Security-Policy";
/// Header carrying a policy whose violations are only reported
pub const CSP_REPORT_ONLY_HEADER: &str = "Content-Security-Policy-Report-Only";
