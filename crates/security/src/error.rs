//! Errors raised while compiling a Content Security Policy.

/// Validation failure for a single directive.
///
/// Compilation stops at the first of these, so the variant always names the
/// directive (or token) that made the whole policy invalid.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("Unknown directive: {name}")]
    UnknownDirective { name: String },

    #[error("Values for {directive} must be list-like, not {found}")]
    NotListLike {
        directive: String,
        found: &'static str,
    },

    #[error("Values for {directive} must be a string, not {found}")]
    NotString {
        directive: String,
        found: &'static str,
    },

    #[error("Unknown sandbox value: {value}")]
    UnknownSandboxValue { value: String },

    #[error("Unknown require-sri-for value: {value}")]
    UnknownSriValue { value: String },
}

impl CompileError {
    /// Name of the directive that failed validation.
    pub fn directive(&self) -> &str {
        match self {
            CompileError::UnknownDirective { name } => name,
            CompileError::NotListLike { directive, .. } => directive,
            CompileError::NotString { directive, .. } => directive,
            CompileError::UnknownSandboxValue { .. } => "sandbox",
            CompileError::UnknownSriValue { .. } => "require-sri-for",
        }
    }
}

/// Result type for policy compilation
pub type CompileResult<T> = Result<T, CompileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_names_directive() {
        let err = CompileError::NotListLike {
            directive: "script-src".to_string(),
            found: "string",
        };
        assert_eq!(err.directive(), "script-src");
        assert_eq!(err.to_string(), "Values for script-src must be list-like, not string");

        let err = CompileError::UnknownSandboxValue { value: "allow-invalid".to_string() };
        assert_eq!(err.directive(), "sandbox");
        assert_eq!(err.to_string(), "Unknown sandbox value: allow-invalid");
    }
}
