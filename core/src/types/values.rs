//! Constant and runtime value types

use super::type_reference::{ActualType, GenericKind, TypeReference};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A member of a registered enumeration, e.g. `MathOperator.Add`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumValue {
    pub enum_type: String,
    pub value: String,
}

impl EnumValue {
    pub fn new(enum_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            enum_type: enum_type.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.enum_type, self.value)
    }
}

/// Literal carried by a constant freezable step.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    Enum(EnumValue),
}

impl ConstantValue {
    pub fn actual_type(&self) -> ActualType {
        match self {
            ConstantValue::Bool(_) => ActualType::Bool,
            ConstantValue::Int(_) => ActualType::Int,
            ConstantValue::Double(_) => ActualType::Double,
            ConstantValue::String(_) => ActualType::String,
            ConstantValue::Enum(e) => ActualType::Enum(e.enum_type.clone()),
        }
    }

    /// SCL literal text for this constant
    pub fn serialize(&self) -> String {
        match self {
            ConstantValue::Bool(b) => b.to_string(),
            ConstantValue::Int(i) => i.to_string(),
            ConstantValue::Double(d) => format_double(*d),
            ConstantValue::String(s) => quote_string(s),
            ConstantValue::Enum(e) => e.to_string(),
        }
    }
}

impl From<ConstantValue> for Value {
    fn from(constant: ConstantValue) -> Self {
        match constant {
            ConstantValue::Bool(b) => Value::Bool(b),
            ConstantValue::Int(i) => Value::Int(i),
            ConstantValue::Double(d) => Value::Double(d),
            ConstantValue::String(s) => Value::String(s),
            ConstantValue::Enum(e) => Value::Enum(e),
        }
    }
}

/// Doubles always keep a fractional part so they re-parse as doubles.
pub fn format_double(d: f64) -> String {
    if d.is_finite() && d.fract() == 0.0 {
        format!("{:.1}", d)
    } else {
        d.to_string()
    }
}

/// Quote a string for SCL. Single quotes are used unless the text contains
/// characters that need escaping.
pub fn quote_string(s: &str) -> String {
    let needs_escape = s
        .chars()
        .any(|c| matches!(c, '\'' | '"' | '\\' | '\n' | '\r' | '\t'));
    if !needs_escape {
        return format!("'{}'", s);
    }

    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

/// Runtime value produced by executing a step
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Unit,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    Enum(EnumValue),
    Array(Vec<Value>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Unit => "Unit",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Double(_) => "Double",
            Value::String(_) => "String",
            Value::Enum(_) => "Enum",
            Value::Array(_) => "Array",
        }
    }

    /// Best-effort type reference for a value read from the state store.
    pub fn type_reference(&self) -> TypeReference {
        match self {
            Value::Unit => TypeReference::Actual(ActualType::Unit),
            Value::Bool(_) => TypeReference::Actual(ActualType::Bool),
            Value::Int(_) => TypeReference::Actual(ActualType::Int),
            Value::Double(_) => TypeReference::Actual(ActualType::Double),
            Value::String(_) => TypeReference::Actual(ActualType::String),
            Value::Enum(e) => TypeReference::Actual(ActualType::Enum(e.enum_type.clone())),
            Value::Array(items) => TypeReference::Generic(
                GenericKind::Array,
                vec![items
                    .first()
                    .map(Value::type_reference)
                    .unwrap_or(TypeReference::Actual(ActualType::Any))],
            ),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Unit => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Double(d) => serde_json::Value::from(*d),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Enum(e) => serde_json::Value::String(e.to_string()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "Unit"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Double(d) => write!(f, "{}", format_double(*d)),
            Value::String(s) => write!(f, "{}", s),
            Value::Enum(e) => write!(f, "{}", e),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}
