//! Policy compiler.
//!
//! Turns a [`Policy`] into a `Content-Security-Policy` header value. Every
//! directive is validated against its kind from the [`registry`]; the first
//! invalid directive aborts compilation and no partial header is produced.

use crate::error::{CompileError, CompileResult};
use crate::policy::{DirectiveValue, Policy};
use crate::registry::{self, DirectiveKind};

/// Separator placed between compiled directives.
pub const DIRECTIVE_SEPARATOR: &str = "; ";

/// Compiles a borrowed policy into a header value.
#[derive(Debug, Clone, Copy)]
pub struct PolicyCompiler<'a> {
    policy: &'a Policy,
}

impl<'a> PolicyCompiler<'a> {
    pub fn new(policy: &'a Policy) -> Self {
        Self { policy }
    }

    /// Compile the policy, preserving directive order.
    ///
    /// An empty policy compiles to the empty string.
    pub fn compile(&self) -> CompileResult<String> {
        let mut pieces = Vec::with_capacity(self.policy.len());
        for (name, value) in self.policy.iter() {
            if let Some(piece) = compile_directive(name, value)? {
                pieces.push(piece);
            }
        }

        log::trace!(
            "Compiled CSP with {} of {} directives emitted",
            pieces.len(),
            self.policy.len()
        );
        Ok(pieces.join(DIRECTIVE_SEPARATOR))
    }
}

/// Compile a policy into a header value.
pub fn compile(policy: &Policy) -> CompileResult<String> {
    PolicyCompiler::new(policy).compile()
}

/// Compile one directive; `Ok(None)` means it contributes nothing.
fn compile_directive(name: &str, value: &DirectiveValue) -> CompileResult<Option<String>> {
    match registry::directive_kind(name) {
        DirectiveKind::List => {
            let tokens = ensure_list(name, value)?;
            if tokens.is_empty() {
                return Ok(None);
            }
            let mut words = Vec::with_capacity(tokens.len() + 1);
            words.push(name.to_string());
            words.extend(tokens.into_iter().map(registry::quote_token));
            Ok(Some(words.join(" ")))
        }
        DirectiveKind::Boolean => Ok(value.is_truthy().then(|| name.to_string())),
        DirectiveKind::Sandbox => compile_sandbox(value).map(Some),
        DirectiveKind::ReportUri => {
            let uri = ensure_str(name, value)?;
            Ok(Some(format!("{} {}", name, uri)))
        }
        DirectiveKind::RequireSriFor => {
            let requirement = ensure_str(name, value)?;
            if !registry::is_sri_value(requirement) {
                return Err(CompileError::UnknownSriValue {
                    value: requirement.to_string(),
                });
            }
            Ok(Some(format!("{} {}", name, requirement)))
        }
        DirectiveKind::Unknown => Err(CompileError::UnknownDirective {
            name: name.to_string(),
        }),
    }
}

/// An empty token list still yields the bare `sandbox` directive, which is
/// the most restrictive sandbox.
fn compile_sandbox(value: &DirectiveValue) -> CompileResult<String> {
    let tokens = ensure_list(registry::SANDBOX_DIRECTIVE, value)?;
    if let Some(bad) = tokens.iter().find(|token| !registry::is_sandbox_token(token)) {
        return Err(CompileError::UnknownSandboxValue {
            value: bad.to_string(),
        });
    }

    let mut words = Vec::with_capacity(tokens.len() + 1);
    words.push(registry::SANDBOX_DIRECTIVE);
    words.extend(tokens);
    Ok(words.join(" "))
}

fn ensure_list<'v>(directive: &str, value: &'v DirectiveValue) -> CompileResult<Vec<&'v str>> {
    value.tokens().ok_or_else(|| CompileError::NotListLike {
        directive: directive.to_string(),
        found: value.type_name(),
    })
}

fn ensure_str<'v>(directive: &str, value: &'v DirectiveValue) -> CompileResult<&'v str> {
    value.as_str().ok_or_else(|| CompileError::NotString {
        directive: directive.to_string(),
        found: value.type_name(),
    })
}
