//! Declarative property tables
//!
//! Every step type lists its properties once, as a static slice of
//! [`PropertyDescriptor`]s. The binder in [`crate::freeze`] reads these
//! tables to decide how each incoming member is converted, checked and
//! stored.

use crate::freezable::MemberKind;
use crate::types::{ConstantValue, ExpectedType, VariableName};

/// Value used when an optional property is omitted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Variable(&'static str),
    Bool(bool),
    Int(i64),
    String(&'static str),
}

impl DefaultValue {
    pub fn to_constant(&self) -> Option<ConstantValue> {
        match self {
            DefaultValue::Variable(_) => None,
            DefaultValue::Bool(b) => Some(ConstantValue::Bool(*b)),
            DefaultValue::Int(i) => Some(ConstantValue::Int(*i)),
            DefaultValue::String(s) => Some(ConstantValue::String(s.to_string())),
        }
    }

    pub fn to_variable(&self) -> Option<VariableName> {
        match self {
            DefaultValue::Variable(name) => Some(VariableName::new(*name)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertyDescriptor {
    pub name: &'static str,
    pub kind: MemberKind,
    pub required: bool,
    /// Constraint on the output type of a bound step (or of each list element)
    pub expected: ExpectedType,
    pub aliases: &'static [&'static str],
    pub default: Option<DefaultValue>,
    pub summary: &'static str,
}

impl PropertyDescriptor {
    const fn new(name: &'static str, kind: MemberKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            expected: ExpectedType::Any,
            aliases: &[],
            default: None,
            summary: "",
        }
    }

    pub const fn variable(name: &'static str) -> Self {
        Self::new(name, MemberKind::VariableName)
    }

    pub const fn step(name: &'static str) -> Self {
        Self::new(name, MemberKind::Step)
    }

    pub const fn list(name: &'static str) -> Self {
        Self::new(name, MemberKind::StepList)
    }

    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    pub const fn of_type(self, expected: ExpectedType) -> Self {
        Self { expected, ..self }
    }

    pub const fn aliases(self, aliases: &'static [&'static str]) -> Self {
        Self { aliases, ..self }
    }

    pub const fn default_value(self, default: DefaultValue) -> Self {
        Self {
            default: Some(default),
            ..self
        }
    }

    pub const fn summary(self, summary: &'static str) -> Self {
        Self { summary, ..self }
    }

    /// Whether `name` refers to this property (by name or alias, ignoring case).
    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(name))
    }

    /// Declared name followed by the aliases
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(self.name).chain(self.aliases.iter().copied())
    }
}

/// Look up a property by name or alias.
pub fn find_property<'a>(
    properties: &'a [PropertyDescriptor],
    name: &str,
) -> Option<&'a PropertyDescriptor> {
    properties.iter().find(|p| p.matches(name))
}
