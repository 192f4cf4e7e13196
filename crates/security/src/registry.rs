//! Static tables describing every directive the compiler understands.
//!
//! A directive's kind is decided by its name alone. The tables are plain
//! `const` data, so lookups need no initialization and can be shared freely
//! between request handlers.

/// How a directive's value is validated and rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    /// Source list such as `script-src`; special tokens are quoted
    List,
    /// Flag directive such as `upgrade-insecure-requests`
    Boolean,
    /// `sandbox` with tokens drawn from a fixed allow-list
    Sandbox,
    /// `report-uri`, a single string emitted verbatim
    ReportUri,
    /// `require-sri-for`, a single string drawn from a fixed set
    RequireSriFor,
    /// Not a directive this compiler knows about
    Unknown,
}

/// Fetch, navigation and document directives taking a source list.
pub const LIST_DIRECTIVES: &[&str] = &[
    // Fetch directives
    "connect-src",
    "child-src",
    "default-src",
    "font-src",
    "frame-src",
    "img-src",
    "manifest-src",
    "media-src",
    "object-src",
    "script-src",
    "style-src",
    "worker-src",
    // Navigation directives
    "form-action",
    "frame-ancestors",
    // Document directives
    "base-uri",
    "plugin-types",
];

pub const BOOLEAN_DIRECTIVES: &[&str] = &["upgrade-insecure-requests", "block-all-mixed-content"];

pub const SANDBOX_DIRECTIVE: &str = "sandbox";
pub const REPORT_URI_DIRECTIVE: &str = "report-uri";
pub const REQUIRE_SRI_FOR_DIRECTIVE: &str = "require-sri-for";

/// Keywords that must be wrapped in single quotes inside a source list.
pub const QUOTED_KEYWORDS: &[&str] = &["self", "none", "unsafe-inline", "unsafe-eval", "strict-dynamic"];

/// Nonce and hash sources, also quoted.
pub const QUOTED_PREFIXES: &[&str] = &["nonce-", "sha256-", "sha384-", "sha512-"];

pub const SANDBOX_TOKENS: &[&str] = &[
    "allow-forms",
    "allow-modals",
    "allow-orientation-lock",
    "allow-pointer-lock",
    "allow-popups",
    "allow-popups-to-escape-sandbox",
    "allow-presentation",
    "allow-same-origin",
    "allow-scripts",
    "allow-top-navigation",
];

pub const REQUIRE_SRI_FOR_VALUES: &[&str] = &["script", "style", "script style"];

/// Look up the kind of a directive by name.
pub fn directive_kind(name: &str) -> DirectiveKind {
    if LIST_DIRECTIVES.contains(&name) {
        DirectiveKind::List
    } else if BOOLEAN_DIRECTIVES.contains(&name) {
        DirectiveKind::Boolean
    } else {
        match name {
            SANDBOX_DIRECTIVE => DirectiveKind::Sandbox,
            REPORT_URI_DIRECTIVE => DirectiveKind::ReportUri,
            REQUIRE_SRI_FOR_DIRECTIVE => DirectiveKind::RequireSriFor,
            _ => DirectiveKind::Unknown,
        }
    }
}

/// Check whether a source-list token has to be rendered in single quotes
pub fn is_quoted_token(token: &str) -> bool {
    QUOTED_KEYWORDS.contains(&token) || QUOTED_PREFIXES.iter().any(|prefix| token.starts_with(prefix))
}

/// Render a source-list token, quoting keywords, nonces and hashes.
pub fn quote_token(token: &str) -> String {
    if is_quoted_token(token) {
        format!("'{}'", token)
    } else {
        token.to_string()
    }
}

pub fn is_sandbox_token(token: &str) -> bool {
    SANDBOX_TOKENS.contains(&token)
}

pub fn is_sri_value(value: &str) -> bool {
    REQUIRE_SRI_FOR_VALUES.contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_kinds() {
        for name in LIST_DIRECTIVES {
            assert_eq!(directive_kind(name), DirectiveKind::List, "{}", name);
        }
        assert_eq!(directive_kind("upgrade-insecure-requests"), DirectiveKind::Boolean);
        assert_eq!(directive_kind("block-all-mixed-content"), DirectiveKind::Boolean);
        assert_eq!(directive_kind("sandbox"), DirectiveKind::Sandbox);
        assert_eq!(directive_kind("report-uri"), DirectiveKind::ReportUri);
        assert_eq!(directive_kind("require-sri-for"), DirectiveKind::RequireSriFor);
        assert_eq!(directive_kind("script-src-elem"), DirectiveKind::Unknown);
        // Lookups are case-sensitive
        assert_eq!(directive_kind("Script-Src"), DirectiveKind::Unknown);
    }

    #[test]
    fn test_token_quoting() {
        assert_eq!(quote_token("self"), "'self'");
        assert_eq!(quote_token("strict-dynamic"), "'strict-dynamic'");
        assert_eq!(quote_token("nonce-abc123"), "'nonce-abc123'");
        assert_eq!(quote_token("sha384-deadbeef"), "'sha384-deadbeef'");
        assert_eq!(quote_token("https://dmoj.ca"), "https://dmoj.ca");
        assert_eq!(quote_token("data:"), "data:");
        // Only an exact keyword is quoted
        assert!(!is_quoted_token("selfish"));
        assert!(!is_quoted_token("sha1-abc"));
    }

    #[test]
    fn test_allow_lists() {
        assert!(is_sandbox_token("allow-scripts"));
        assert!(!is_sandbox_token("allow-invalid"));
        assert!(is_sri_value("script style"));
        assert!(!is_sri_value("style script"));
    }
}
