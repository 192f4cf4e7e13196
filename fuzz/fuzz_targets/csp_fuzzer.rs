#![no_main]
//! Content Security Policy compiler fuzzing
//!
//! Builds arbitrary policies (known and unknown directive names, arbitrary
//! tokens and value shapes) and checks that compilation and merging never
//! panic, never touch their inputs and compile deterministically.

use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;

use citadel_csp::{compile, merge, registry, resolve_override, DirectiveValue, Policy};

/// Shape of a fuzzed directive value
#[derive(Debug, Clone, Arbitrary)]
pub enum FuzzValue {
    Bool(bool),
    Str(String),
    List(Vec<String>),
    Set(Vec<String>),
    Tuple(Vec<String>),
}

impl From<FuzzValue> for DirectiveValue {
    fn from(value: FuzzValue) -> Self {
        match value {
            FuzzValue::Bool(flag) => DirectiveValue::Bool(flag),
            FuzzValue::Str(value) => DirectiveValue::Str(value),
            FuzzValue::List(tokens) => DirectiveValue::list(tokens),
            FuzzValue::Set(tokens) => DirectiveValue::set(tokens),
            FuzzValue::Tuple(tokens) => DirectiveValue::tuple(tokens),
        }
    }
}

/// Directive name, biased towards names the compiler knows
#[derive(Debug, Clone, Arbitrary)]
pub enum FuzzName {
    Known(u8),
    Raw(String),
}

impl FuzzName {
    fn resolve(&self) -> String {
        let known: Vec<&str> = registry::LIST_DIRECTIVES
            .iter()
            .chain(registry::BOOLEAN_DIRECTIVES)
            .copied()
            .chain([
                registry::SANDBOX_DIRECTIVE,
                registry::REPORT_URI_DIRECTIVE,
                registry::REQUIRE_SRI_FOR_DIRECTIVE,
            ])
            .collect();

        match self {
            FuzzName::Known(index) => known[*index as usize % known.len()].to_string(),
            FuzzName::Raw(name) => name.clone(),
        }
    }
}

#[derive(Debug, Clone, Arbitrary)]
pub struct PolicyFuzzInput {
    pub base: Vec<(FuzzName, FuzzValue)>,
    pub overrides: Vec<(FuzzName, FuzzValue)>,
    pub replace_base: bool,
}

fn build_policy(entries: &[(FuzzName, FuzzValue)]) -> Policy {
    entries
        .iter()
        .map(|(name, value)| (name.resolve(), DirectiveValue::from(value.clone())))
        .collect()
}

fuzz_target!(|data: &[u8]| {
    let mut unstructured = Unstructured::new(data);
    let input = match PolicyFuzzInput::arbitrary(&mut unstructured) {
        Ok(input) => input,
        Err(_) => return,
    };

    let base = build_policy(&input.base);
    let mut overrides = build_policy(&input.overrides);
    if input.replace_base {
        overrides.insert(citadel_csp::OVERRIDE_KEY, true);
    }

    let snapshot = base.clone();
    let merged = merge(&base, &overrides);
    assert_eq!(base, snapshot, "merge must not modify its base");
    assert!(merged.len() >= base.len());

    let resolved = resolve_override(&base, &overrides);
    if input.replace_base {
        assert!(!resolved.contains_key(citadel_csp::OVERRIDE_KEY));
        assert_eq!(resolved.len(), overrides.len() - 1);
    }

    if let Ok(header) = compile(&resolved) {
        assert!(resolved.len() > 0 || header.is_empty());
        assert_eq!(compile(&resolved).ok().as_deref(), Some(header.as_str()));
    }
});
