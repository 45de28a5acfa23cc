//! Compact serializers built from components
//!
//! The same component list drives both directions. Writing concatenates
//! each component's text. Reading concatenates each component's regex
//! fragment into one anchored pattern and maps the named captures back to
//! properties.

use super::{
    constant_of, serialize_member, serialize_operand, DeserializerBlock, DeserializerMapping, SerializerBlock,
    SerializerComponent,
};
use crate::errors::SclError;
use crate::factory::StepFactoryStore;
use crate::freezable::{FreezableStep, FreezableStepData, StepMember};
use crate::types::{ConstantValue, EnumValue, VariableName};
use regex::Regex;
use std::sync::OnceLock;

const VARIABLE_PATTERN: &str = r"<[A-Za-z_][A-Za-z0-9_]*>";
const INTEGER_PATTERN: &str = r"-?\d+";
const BOOLEAN_PATTERN: &str = r"(?i:true|false)";
/// Anything not starting with `=`, so `<A> == 1` is not read as `<A> = (= 1)`
const EXPRESSION_PATTERN: &str = r"[^=\s].*?";

/// A single SCL term: variable, number, bool, enum constant or string.
const TERM_PATTERN: &str = concat!(
    r"<[A-Za-z_][A-Za-z0-9_]*>",
    r"|-?\d+(?:\.\d+)?",
    r"|(?i:true|false)",
    r"|[A-Za-z_][A-Za-z0-9_]*\.[A-Za-z_][A-Za-z0-9_]*",
    r"|'[^']*'",
    r#"|"(?:[^"\\]|\\.)*""#,
);

#[derive(Debug)]
pub struct CustomSerializer {
    components: &'static [SerializerComponent],
    regex: OnceLock<Option<Regex>>,
}

impl CustomSerializer {
    pub const fn new(components: &'static [SerializerComponent]) -> Self {
        Self {
            components,
            regex: OnceLock::new(),
        }
    }

    pub fn components(&self) -> &'static [SerializerComponent] {
        self.components
    }

    pub fn is_infix(&self) -> bool {
        self.components
            .iter()
            .any(|c| matches!(c, SerializerComponent::Space))
    }

    pub fn serialize(&self, data: &FreezableStepData, store: &StepFactoryStore) -> Result<String, SclError> {
        let mut text = String::new();
        for component in self.components {
            text.push_str(&component.try_get_text(data, store)?);
        }
        Ok(text)
    }

    /// Capture group to property mappings, in component order
    pub fn mappings(&self) -> Vec<DeserializerMapping> {
        self.components
            .iter()
            .enumerate()
            .filter_map(|(index, component)| {
                component.property().map(|property| DeserializerMapping {
                    group: group_name(index),
                    property,
                    component: *component,
                })
            })
            .collect()
    }

    /// The anchored master pattern
    pub fn pattern(&self) -> String {
        let body: String = self
            .components
            .iter()
            .enumerate()
            .map(|(index, component)| component.regex_fragment(&group_name(index)))
            .collect();
        format!("^{}$", body)
    }

    fn regex(&self) -> Option<&Regex> {
        self.regex
            .get_or_init(|| {
                let pattern = self.pattern();
                match Regex::new(&pattern) {
                    Ok(regex) => Some(regex),
                    Err(err) => {
                        tracing::error!(%pattern, error = %err, "invalid compact serializer pattern");
                        None
                    }
                }
            })
            .as_ref()
    }

    pub fn matches(&self, text: &str) -> bool {
        self.regex().is_some_and(|regex| regex.is_match(text.trim()))
    }

    /// Read `text` back into step data. `None` when the text does not
    /// have this serializer's shape, including an expression slot that
    /// does not parse.
    pub fn try_deserialize(&self, text: &str) -> Option<Result<FreezableStepData, SclError>> {
        let captures = self.regex()?.captures(text.trim())?;
        let mut data = FreezableStepData::new();
        for mapping in self.mappings() {
            let Some(capture) = captures.name(&mapping.group) else {
                continue;
            };
            match mapping.component.member_from_text(capture.as_str()) {
                Ok(member) => {
                    data.insert(mapping.property, member);
                }
                Err(_) if matches!(mapping.component, SerializerComponent::Expression(_)) => {
                    return None;
                }
                Err(err) => return Some(Err(err)),
            }
        }
        Some(Ok(data))
    }
}

fn group_name(index: usize) -> String {
    format!("c{}", index)
}

fn cannot_serialize(property: &str, expected: &str) -> SclError {
    SclError::CannotSerialize {
        property: property.to_string(),
        expected: expected.to_string(),
    }
}

/// Primitive slots accept a matching constant or a compound step without
/// configuration, written in its own form.
fn primitive_text(
    member: &StepMember,
    property: &str,
    expected: &str,
    store: &StepFactoryStore,
    literal: impl Fn(&ConstantValue) -> Option<String>,
) -> Result<String, SclError> {
    if let Some(constant) = constant_of(member) {
        return literal(constant).ok_or_else(|| cannot_serialize(property, expected));
    }
    match member {
        StepMember::Argument(step) => match step.as_ref() {
            FreezableStep::Compound(compound) if compound.configuration.is_none() => {
                serialize_operand(member, store)
            }
            _ => Err(cannot_serialize(property, expected)),
        },
        _ => Err(cannot_serialize(property, expected)),
    }
}

impl SerializerBlock for SerializerComponent {
    fn try_get_text(&self, data: &FreezableStepData, store: &StepFactoryStore) -> Result<String, SclError> {
        let lookup = |property: &str, expected: &str| {
            data.get(property)
                .ok_or_else(|| cannot_serialize(property, expected))
        };

        match self {
            SerializerComponent::Space => Ok(" ".to_string()),
            SerializerComponent::Fixed(text) => Ok(text.to_string()),
            SerializerComponent::Boolean(property) => {
                let member = lookup(property, "Bool")?;
                primitive_text(member, property, "Bool", store, |c| match c {
                    ConstantValue::Bool(b) => Some(b.to_string()),
                    _ => None,
                })
            }
            SerializerComponent::Integer(property) => {
                let member = lookup(property, "Int")?;
                primitive_text(member, property, "Int", store, |c| match c {
                    ConstantValue::Int(i) => Some(i.to_string()),
                    _ => None,
                })
            }
            SerializerComponent::EnumDisplay(property, definition) => {
                let member = lookup(property, definition.name)?;
                match constant_of(member) {
                    Some(ConstantValue::Enum(value))
                        if value.enum_type.eq_ignore_ascii_case(definition.name) =>
                    {
                        definition
                            .display_name(&value.value)
                            .map(str::to_string)
                            .ok_or_else(|| cannot_serialize(property, definition.name))
                    }
                    _ => Err(cannot_serialize(property, definition.name)),
                }
            }
            SerializerComponent::Variable(property) => match lookup(property, "a variable name")? {
                StepMember::Variable(name) => Ok(name.serialize()),
                _ => Err(cannot_serialize(property, "a variable name")),
            },
            SerializerComponent::Step(property) => {
                let member = lookup(property, "a step")?;
                serialize_operand(member, store)
            }
            SerializerComponent::Expression(property) => {
                let member = lookup(property, "a step")?;
                serialize_member(member, store)
            }
        }
    }
}

impl DeserializerBlock for SerializerComponent {
    fn regex_fragment(&self, group: &str) -> String {
        match self {
            SerializerComponent::Space => r"\s*".to_string(),
            SerializerComponent::Fixed(text) => regex::escape(text),
            SerializerComponent::Boolean(_) => format!("(?P<{}>{})", group, BOOLEAN_PATTERN),
            SerializerComponent::Integer(_) => format!("(?P<{}>{})", group, INTEGER_PATTERN),
            SerializerComponent::EnumDisplay(_, definition) => {
                // Longest first so `<=` is preferred over `<`
                let mut displays: Vec<&str> = definition.members.iter().map(|(_, d)| *d).collect();
                displays.sort_by_key(|d| std::cmp::Reverse(d.len()));
                let alternatives: Vec<String> = displays.into_iter().map(regex::escape).collect();
                format!("(?P<{}>{})", group, alternatives.join("|"))
            }
            SerializerComponent::Variable(_) => format!("(?P<{}>{})", group, VARIABLE_PATTERN),
            SerializerComponent::Step(_) => format!("(?P<{}>{})", group, TERM_PATTERN),
            SerializerComponent::Expression(_) => format!("(?P<{}>{})", group, EXPRESSION_PATTERN),
        }
    }

    fn property(&self) -> Option<&'static str> {
        match self {
            SerializerComponent::Space | SerializerComponent::Fixed(_) => None,
            SerializerComponent::Boolean(property)
            | SerializerComponent::Integer(property)
            | SerializerComponent::EnumDisplay(property, _)
            | SerializerComponent::Variable(property)
            | SerializerComponent::Step(property)
            | SerializerComponent::Expression(property) => Some(*property),
        }
    }

    fn member_from_text(&self, text: &str) -> Result<StepMember, SclError> {
        let invalid = |message: &str| SclError::InvalidLiteral {
            fragment: text.to_string(),
            message: message.to_string(),
        };
        let constant = |value: ConstantValue| StepMember::argument(FreezableStep::Constant(value));

        match self {
            SerializerComponent::Space | SerializerComponent::Fixed(_) => {
                Err(invalid("fixed text does not bind a property"))
            }
            SerializerComponent::Boolean(_) => match text.to_ascii_lowercase().as_str() {
                "true" => Ok(constant(ConstantValue::Bool(true))),
                "false" => Ok(constant(ConstantValue::Bool(false))),
                _ => Err(invalid("expected true or false")),
            },
            SerializerComponent::Integer(_) => text
                .parse::<i64>()
                .map(|i| constant(ConstantValue::Int(i)))
                .map_err(|e| invalid(&e.to_string())),
            SerializerComponent::EnumDisplay(_, definition) => definition
                .from_display(text)
                .map(|value| constant(ConstantValue::Enum(EnumValue::new(definition.name, value))))
                .ok_or_else(|| SclError::UnknownEnumValue {
                    enum_type: definition.name.to_string(),
                    value: text.to_string(),
                }),
            SerializerComponent::Variable(_) => VariableName::try_parse(text)
                .map(StepMember::Variable)
                .ok_or_else(|| invalid("expected a variable name like <Name>")),
            SerializerComponent::Step(_) | SerializerComponent::Expression(_) => {
                crate::parser::parse_member(text)
            }
        }
    }
}
