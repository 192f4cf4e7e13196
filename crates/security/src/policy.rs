//! Structured policy representation.
//!
//! A [`Policy`] is an insertion-ordered mapping of directive name to
//! [`DirectiveValue`]. The order of entries is the order directives appear in
//! the compiled header.

use std::collections::BTreeSet;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Value attached to a directive.
///
/// Which representations a directive accepts is decided by the directive's
/// kind at compile time; the value itself carries no knowledge of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DirectiveValue {
    Bool(bool),
    Str(String),
    /// Ordered tokens, duplicates kept
    List(Vec<String>),
    /// Deduplicated tokens, iterated in sorted order
    Set(BTreeSet<String>),
    /// Fixed sequence of tokens
    Tuple(Vec<String>),
}

impl DirectiveValue {
    pub fn list<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DirectiveValue::List(tokens.into_iter().map(Into::into).collect())
    }

    pub fn set<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DirectiveValue::Set(tokens.into_iter().map(Into::into).collect())
    }

    pub fn tuple<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DirectiveValue::Tuple(tokens.into_iter().map(Into::into).collect())
    }

    /// Short name of the representation, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            DirectiveValue::Bool(_) => "bool",
            DirectiveValue::Str(_) => "string",
            DirectiveValue::List(_) => "list",
            DirectiveValue::Set(_) => "set",
            DirectiveValue::Tuple(_) => "tuple",
        }
    }

    /// Whether the value is a list, set or tuple.
    pub fn is_list_like(&self) -> bool {
        matches!(
            self,
            DirectiveValue::List(_) | DirectiveValue::Set(_) | DirectiveValue::Tuple(_)
        )
    }

    /// Tokens of a list-like value in iteration order, `None` for scalars.
    pub fn tokens(&self) -> Option<Vec<&str>> {
        match self {
            DirectiveValue::List(tokens) | DirectiveValue::Tuple(tokens) => {
                Some(tokens.iter().map(String::as_str).collect())
            }
            DirectiveValue::Set(tokens) => Some(tokens.iter().map(String::as_str).collect()),
            DirectiveValue::Bool(_) | DirectiveValue::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DirectiveValue::Str(value) => Some(value),
            _ => None,
        }
    }

    /// Truthiness: `false`, empty strings and empty containers are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            DirectiveValue::Bool(flag) => *flag,
            DirectiveValue::Str(value) => !value.is_empty(),
            DirectiveValue::List(tokens) | DirectiveValue::Tuple(tokens) => !tokens.is_empty(),
            DirectiveValue::Set(tokens) => !tokens.is_empty(),
        }
    }
}

impl From<bool> for DirectiveValue {
    fn from(flag: bool) -> Self {
        DirectiveValue::Bool(flag)
    }
}

impl From<&str> for DirectiveValue {
    fn from(value: &str) -> Self {
        DirectiveValue::Str(value.to_string())
    }
}

impl From<String> for DirectiveValue {
    fn from(value: String) -> Self {
        DirectiveValue::Str(value)
    }
}

impl From<Vec<String>> for DirectiveValue {
    fn from(tokens: Vec<String>) -> Self {
        DirectiveValue::List(tokens)
    }
}

impl From<Vec<&str>> for DirectiveValue {
    fn from(tokens: Vec<&str>) -> Self {
        DirectiveValue::list(tokens)
    }
}

impl From<BTreeSet<String>> for DirectiveValue {
    fn from(tokens: BTreeSet<String>) -> Self {
        DirectiveValue::Set(tokens)
    }
}

/// Insertion-ordered mapping of directive name to value.
///
/// Re-inserting an existing key replaces its value in place, keeping the
/// key's original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Policy {
    entries: Vec<(String, DirectiveValue)>,
}

impl Policy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a directive, returning the value it replaced.
    pub fn insert<K, V>(&mut self, name: K, value: V) -> Option<DirectiveValue>
    where
        K: Into<String>,
        V: Into<DirectiveValue>,
    {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|entry| entry.0 == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    /// Builder-style [`Policy::insert`].
    pub fn with<K, V>(mut self, name: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<DirectiveValue>,
    {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&DirectiveValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Remove a directive; the remaining entries keep their order.
    pub fn remove(&mut self, name: &str) -> Option<DirectiveValue> {
        let index = self.entries.iter().position(|(key, _)| key == name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DirectiveValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Policy
where
    K: Into<String>,
    V: Into<DirectiveValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut policy = Policy::new();
        for (name, value) in iter {
            policy.insert(name, value);
        }
        policy
    }
}

impl IntoIterator for Policy {
    type Item = (String, DirectiveValue);
    type IntoIter = std::vec::IntoIter<(String, DirectiveValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for Policy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

struct PolicyVisitor;

impl<'de> Visitor<'de> for PolicyVisitor {
    type Value = Policy;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map of directive names to values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Policy, A::Error> {
        let mut policy = Policy::new();
        while let Some((name, value)) = access.next_entry::<String, DirectiveValue>()? {
            policy.insert(name, value);
        }
        Ok(policy)
    }
}

impl<'de> Deserialize<'de> for Policy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(PolicyVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insert_keeps_position() {
        let mut policy = Policy::new()
            .with("style-src", vec!["self"])
            .with("script-src", vec!["self"]);

        let old = policy.insert("style-src", vec!["none"]);
        assert_eq!(old, Some(DirectiveValue::list(["self"])));
        assert_eq!(policy.keys().collect::<Vec<_>>(), vec!["style-src", "script-src"]);
        assert_eq!(policy.get("style-src"), Some(&DirectiveValue::list(["none"])));
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut policy: Policy = [("a", true), ("b", false), ("c", true)].into_iter().collect();
        assert_eq!(policy.remove("b"), Some(DirectiveValue::Bool(false)));
        assert_eq!(policy.remove("b"), None);
        assert_eq!(policy.keys().collect::<Vec<_>>(), vec!["a", "c"]);
    }

    #[test]
    fn test_truthiness() {
        assert!(DirectiveValue::Bool(true).is_truthy());
        assert!(!DirectiveValue::Bool(false).is_truthy());
        assert!(!DirectiveValue::from("").is_truthy());
        assert!(!DirectiveValue::List(Vec::new()).is_truthy());
        assert!(DirectiveValue::set(["allow-forms"]).is_truthy());
    }

    #[test]
    fn test_set_tokens_sorted_and_deduplicated() {
        let value = DirectiveValue::set(["b", "a", "b"]);
        assert_eq!(value.tokens(), Some(vec!["a", "b"]));
        assert_eq!(DirectiveValue::from("x").tokens(), None);
    }

    #[test]
    fn test_json_round_trip_keeps_order() {
        let json = r#"{"style-src":["self"],"script-src":["self","https://dmoj.ca"],"upgrade-insecure-requests":true,"report-uri":"/csp"}"#;
        let policy: Policy = serde_json::from_str(json).unwrap();

        assert_eq!(
            policy.keys().collect::<Vec<_>>(),
            vec!["style-src", "script-src", "upgrade-insecure-requests", "report-uri"]
        );
        assert_eq!(policy.get("report-uri"), Some(&DirectiveValue::from("/csp")));
        assert_eq!(serde_json::to_string(&policy).unwrap(), json);
    }
}
