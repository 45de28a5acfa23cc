//! Enumerations usable as SCL constants (`MathOperator.Add`)
//!
//! Each enum is described by a static table of `(value, display)` pairs.
//! The display name is what compact serializers emit, e.g. `+` for
//! `MathOperator.Add`.

use std::collections::HashMap;
use std::sync::OnceLock;

/// A named enumeration with its declared members.
#[derive(Debug)]
pub struct EnumDefinition {
    pub name: &'static str,
    /// `(value name, display name)` in declaration order
    pub members: &'static [(&'static str, &'static str)],
    display_lookup: OnceLock<HashMap<&'static str, &'static str>>,
}

impl EnumDefinition {
    pub const fn new(name: &'static str, members: &'static [(&'static str, &'static str)]) -> Self {
        Self {
            name,
            members,
            display_lookup: OnceLock::new(),
        }
    }

    /// Find the declared value name, ignoring case.
    pub fn value(&self, name: &str) -> Option<&'static str> {
        self.members
            .iter()
            .find(|(value, _)| value.eq_ignore_ascii_case(name))
            .map(|(value, _)| *value)
    }

    pub fn display_name(&self, value: &str) -> Option<&'static str> {
        self.members
            .iter()
            .find(|(v, _)| v.eq_ignore_ascii_case(value))
            .map(|(_, display)| *display)
    }

    /// Inverse of [`display_name`](Self::display_name). Matching is
    /// case-sensitive after trimming.
    pub fn from_display(&self, display: &str) -> Option<&'static str> {
        self.display_lookup
            .get_or_init(|| self.members.iter().map(|(v, d)| (*d, *v)).collect())
            .get(display.trim())
            .copied()
    }

    pub fn value_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.members.iter().map(|(value, _)| *value)
    }
}

pub static MATH_OPERATOR: EnumDefinition = EnumDefinition::new(
    "MathOperator",
    &[
        ("Add", "+"),
        ("Subtract", "-"),
        ("Multiply", "*"),
        ("Divide", "/"),
        ("Modulo", "%"),
        ("Power", "^"),
    ],
);

pub static BOOLEAN_OPERATOR: EnumDefinition =
    EnumDefinition::new("BooleanOperator", &[("And", "&&"), ("Or", "||")]);

pub static COMPARE_OPERATOR: EnumDefinition = EnumDefinition::new(
    "CompareOperator",
    &[
        ("Equals", "=="),
        ("NotEquals", "!="),
        ("LessThan", "<"),
        ("LessThanOrEqual", "<="),
        ("GreaterThan", ">"),
        ("GreaterThanOrEqual", ">="),
    ],
);

/// All enums known to the standard library.
pub fn builtin_enums() -> [&'static EnumDefinition; 3] {
    [&MATH_OPERATOR, &BOOLEAN_OPERATOR, &COMPARE_OPERATOR]
}
