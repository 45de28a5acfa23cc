//! Variable identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a variable in the state store.
///
/// Names are case-sensitive and are written `<Name>` in SCL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableName(String);

impl VariableName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// Serialized form, e.g. `<Foo>`
    pub fn serialize(&self) -> String {
        format!("<{}>", self.0)
    }

    /// Parse the `<Name>` form. Returns `None` when the brackets or the
    /// identifier are missing.
    pub fn try_parse(text: &str) -> Option<Self> {
        let inner = text.trim().strip_prefix('<')?.strip_suffix('>')?;
        let mut chars = inner.chars();
        let first = chars.next()?;
        if !(first.is_ascii_alphabetic() || first == '_') {
            return None;
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return None;
        }
        Some(Self(inner.to_string()))
    }
}

impl fmt::Display for VariableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

impl From<&str> for VariableName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_parse_bracketed_name() {
        assert_eq!(VariableName::try_parse("<Foo>"), Some(VariableName::new("Foo")));
        assert_eq!(VariableName::try_parse(" <foo_1> "), Some(VariableName::new("foo_1")));
    }

    #[test]
    fn test_try_parse_rejects_malformed() {
        assert_eq!(VariableName::try_parse("Foo"), None);
        assert_eq!(VariableName::try_parse("<>"), None);
        assert_eq!(VariableName::try_parse("<1abc>"), None);
        assert_eq!(VariableName::try_parse("<a b>"), None);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        assert_ne!(VariableName::new("foo"), VariableName::new("Foo"));
    }
}
