//! Combining a base policy with a per-response override.

use crate::policy::{DirectiveValue, Policy};

/// Reserved override key asking for the base policy to be discarded.
pub const OVERRIDE_KEY: &str = "override";

/// Merge `overrides` into a copy of `base`.
///
/// New keys are appended. For keys present in both, lists and tuples are
/// concatenated, sets are unioned and anything else is replaced by the
/// override value. Neither input is modified; combined containers are always
/// freshly allocated.
pub fn merge(base: &Policy, overrides: &Policy) -> Policy {
    let mut result = base.clone();
    for (name, value) in overrides.iter() {
        let merged = match result.get(name) {
            Some(existing) => merge_value(existing, value),
            None => value.clone(),
        };
        result.insert(name, merged);
    }
    result
}

fn merge_value(existing: &DirectiveValue, update: &DirectiveValue) -> DirectiveValue {
    let extra = match update.tokens() {
        Some(tokens) => tokens,
        // A scalar never extends a container
        None => return update.clone(),
    };

    match existing {
        DirectiveValue::List(tokens) => {
            DirectiveValue::List(tokens.iter().map(String::as_str).chain(extra).map(String::from).collect())
        }
        DirectiveValue::Tuple(tokens) => {
            DirectiveValue::Tuple(tokens.iter().map(String::as_str).chain(extra).map(String::from).collect())
        }
        DirectiveValue::Set(tokens) => {
            let mut union = tokens.clone();
            union.extend(extra.into_iter().map(String::from));
            DirectiveValue::Set(union)
        }
        DirectiveValue::Bool(_) | DirectiveValue::Str(_) => update.clone(),
    }
}

/// Apply an override the way a response layer does.
///
/// When `overrides` carries a truthy `override` marker, the result is the
/// override alone with the marker removed. Otherwise the marker (if any) is
/// dropped and the override is merged into `base`.
pub fn resolve_override(base: &Policy, overrides: &Policy) -> Policy {
    let mut overrides = overrides.clone();
    let replace = overrides
        .remove(OVERRIDE_KEY)
        .map(|marker| marker.is_truthy())
        .unwrap_or(false);

    if replace {
        log::debug!("CSP override replaces base policy ({} directives)", overrides.len());
        overrides
    } else {
        merge(base, &overrides)
    }
}
