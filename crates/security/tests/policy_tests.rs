//! Integration tests for policy compilation and merging
//!
//! These exercise the public API the way a response layer uses it: build a
//! base policy, fold in an override, compile the result.

use citadel_csp::{
    compile, merge, registry, resolve_override, CompileError, DirectiveValue, Policy, OVERRIDE_KEY,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_integration_order_is_preserved() {
    init_logging();

    let policy = Policy::new()
        .with("style-src", vec!["self"])
        .with("script-src", vec!["self", "https://dmoj.ca"])
        .with("frame-src", vec!["none"])
        .with("plugin-types", vec!["application/pdf"])
        .with("block-all-mixed-content", true)
        .with("upgrade-insecure-requests", false)
        .with("sandbox", vec!["allow-scripts"])
        .with("report-uri", "/dev/null");

    assert_eq!(
        compile(&policy).unwrap(),
        "style-src 'self'; script-src 'self' https://dmoj.ca; frame-src 'none'; \
         plugin-types application/pdf; block-all-mixed-content; sandbox allow-scripts; \
         report-uri /dev/null"
    );
}

#[test]
fn test_list_tokens_quoted_exactly_when_special() {
    let tokens = vec![
        "self",
        "none",
        "unsafe-inline",
        "unsafe-eval",
        "strict-dynamic",
        "nonce-r4nd0m",
        "sha256-abc",
        "sha384-def",
        "sha512-ghi",
        "https://cdn.example",
        "data:",
        "*.example.com",
        "blob:",
    ];

    for directive in registry::LIST_DIRECTIVES {
        let policy = Policy::new().with(*directive, tokens.clone());
        let header = compile(&policy).unwrap();
        let words: Vec<&str> = header.split(' ').collect();

        assert_eq!(words[0], *directive);
        assert_eq!(words.len(), tokens.len() + 1);
        for (word, token) in words[1..].iter().zip(&tokens) {
            if registry::is_quoted_token(token) {
                assert_eq!(*word, format!("'{}'", token));
            } else {
                assert_eq!(word, token);
            }
        }
    }
}

#[test]
fn test_compile_is_idempotent() {
    let policy = Policy::new()
        .with("default-src", DirectiveValue::set(["self", "https://a.example", "https://b.example"]))
        .with("require-sri-for", "script")
        .with("upgrade-insecure-requests", true);

    let first = compile(&policy).unwrap();
    let second = compile(&policy).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_first_error_wins() {
    let policy = Policy::new()
        .with("sandbox", vec!["allow-everything"])
        .with("report-uri", vec!["/csp"]);

    assert_eq!(
        compile(&policy).unwrap_err(),
        CompileError::UnknownSandboxValue {
            value: "allow-everything".to_string()
        }
    );
}

#[test]
fn test_merged_policy_compiles() {
    let base = Policy::new()
        .with("default-src", vec!["self"])
        .with("script-src", vec!["self"]);
    let overrides = Policy::new()
        .with("script-src", vec!["nonce-abc"])
        .with("report-uri", "/csp-report");

    let merged = merge(&base, &overrides);
    assert_eq!(
        compile(&merged).unwrap(),
        "default-src 'self'; script-src 'self' 'nonce-abc'; report-uri /csp-report"
    );
    assert_eq!(compile(&base).unwrap(), "default-src 'self'; script-src 'self'");
}

#[test]
fn test_end_to_end_override_marker() {
    let base = Policy::new().with("script-src", vec!["self"]);
    let overrides = Policy::new()
        .with("style-src", vec!["none"])
        .with(OVERRIDE_KEY, true);

    let resolved = resolve_override(&base, &overrides);
    assert_eq!(resolved, Policy::new().with("style-src", vec!["none"]));
    assert_eq!(compile(&resolved).unwrap(), "style-src 'none'");
}

#[test]
fn test_policy_from_json_config() {
    let policy: Policy = serde_json::from_str(
        r#"{
            "default-src": ["self"],
            "img-src": ["self", "data:"],
            "block-all-mixed-content": true,
            "require-sri-for": "script style"
        }"#,
    )
    .unwrap();

    assert_eq!(
        compile(&policy).unwrap(),
        "default-src 'self'; img-src 'self' data:; block-all-mixed-content; require-sri-for script style"
    );
}
