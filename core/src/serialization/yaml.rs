//! The YAML form of a step graph
//!
//! YAML is read into a small [`YamlNode`] tree first, where the reserved
//! `Do` and `Config` keys are real fields, and only then converted into
//! freezable steps. Writing goes the other way. Steps without
//! configuration whose compact form can be read back are written as plain
//! strings.

use super::{serialize_step, StepSerializer};
use crate::errors::SclError;
use crate::factory::StepFactoryStore;
use crate::freezable::{Configuration, FreezableStep, FreezableStepData, StepMember};
use crate::parser;
use crate::steps;
use crate::types::values::quote_string;
use crate::types::{ConstantValue, EnumValue, VariableName};
use indexmap::IndexMap;
use serde_yaml::{Mapping, Number, Value};

const DO_KEY: &str = "Do";
const CONFIG_KEY: &str = "Config";

#[derive(Debug, Clone, PartialEq)]
pub enum YamlNode {
    /// A bool, number or string
    Scalar(Value),
    Sequence(Vec<YamlNode>),
    Step(YamlStep),
}

/// A mapping with a `Do` key
#[derive(Debug, Clone, PartialEq)]
pub struct YamlStep {
    pub step_name: String,
    pub config: Option<Configuration>,
    pub properties: IndexMap<String, YamlNode>,
}

impl YamlNode {
    pub fn from_value(value: Value) -> Result<Self, SclError> {
        match value {
            Value::Null => Err(SclError::Yaml("unexpected null value".to_string())),
            Value::Bool(_) | Value::Number(_) | Value::String(_) => Ok(YamlNode::Scalar(value)),
            Value::Sequence(items) => items
                .into_iter()
                .map(YamlNode::from_value)
                .collect::<Result<Vec<_>, _>>()
                .map(YamlNode::Sequence),
            Value::Mapping(mapping) => YamlStep::from_mapping(mapping).map(YamlNode::Step),
            Value::Tagged(tagged) => YamlNode::from_value(tagged.value),
        }
    }

    pub fn into_value(self) -> Result<Value, SclError> {
        match self {
            YamlNode::Scalar(value) => Ok(value),
            YamlNode::Sequence(items) => items
                .into_iter()
                .map(YamlNode::into_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Sequence),
            YamlNode::Step(step) => step.into_value(),
        }
    }
}

impl YamlStep {
    fn from_mapping(mapping: Mapping) -> Result<Self, SclError> {
        let mut step_name = None;
        let mut config = None;
        let mut properties = IndexMap::new();

        for (key, value) in mapping {
            let key = match key {
                Value::String(key) => key,
                other => {
                    return Err(SclError::Yaml(format!(
                        "mapping keys must be strings, found {:?}",
                        other
                    )))
                }
            };

            if key.eq_ignore_ascii_case(DO_KEY) {
                match value {
                    Value::String(name) => step_name = Some(name),
                    _ => return Err(SclError::Yaml("'Do' must be a step name".to_string())),
                }
            } else if key.eq_ignore_ascii_case(CONFIG_KEY) {
                config = Some(serde_yaml::from_value::<Configuration>(value)?);
            } else {
                properties.insert(key, YamlNode::from_value(value)?);
            }
        }

        let step_name = step_name
            .ok_or_else(|| SclError::Yaml("a step mapping must have a 'Do' key".to_string()))?;

        Ok(Self {
            step_name,
            config,
            properties,
        })
    }

    fn into_value(self) -> Result<Value, SclError> {
        let mut mapping = Mapping::new();
        mapping.insert(Value::from(DO_KEY), Value::from(self.step_name));
        if let Some(config) = self.config {
            mapping.insert(Value::from(CONFIG_KEY), serde_yaml::to_value(config)?);
        }
        for (key, node) in self.properties {
            mapping.insert(Value::from(key), node.into_value()?);
        }
        Ok(Value::Mapping(mapping))
    }
}

/* ===================== reading ===================== */

/// Read a YAML document into a freezable step.
///
/// A top-level sequence becomes a `Sequence` of its items and a top-level
/// string is read as an SCL program.
pub fn deserialize_yaml(text: &str, store: &StepFactoryStore) -> Result<FreezableStep, SclError> {
    let value: Value = serde_yaml::from_str(text)?;
    match YamlNode::from_value(value)? {
        YamlNode::Sequence(items) => {
            let steps = items
                .into_iter()
                .map(|item| node_to_step(item, store))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(FreezableStep::compound(
                steps::sequence::NAME,
                FreezableStepData::new().with("InitialSteps", StepMember::ArgumentList(steps)),
            ))
        }
        YamlNode::Scalar(Value::String(program)) => parser::parse_program(&program),
        node => node_to_step(node, store),
    }
}

fn node_to_step(node: YamlNode, store: &StepFactoryStore) -> Result<FreezableStep, SclError> {
    node_to_member(node, store).map(StepMember::into_step)
}

fn node_to_member(node: YamlNode, store: &StepFactoryStore) -> Result<StepMember, SclError> {
    match node {
        YamlNode::Scalar(value) => scalar_to_member(value, store),
        YamlNode::Sequence(items) => items
            .into_iter()
            .map(|item| node_to_step(item, store))
            .collect::<Result<Vec<_>, _>>()
            .map(StepMember::ArgumentList),
        YamlNode::Step(step) => {
            let mut data = FreezableStepData::new();
            for (key, node) in step.properties {
                data.insert(key, node_to_member(node, store)?);
            }
            let freezable = FreezableStep::compound(step.step_name, data);
            Ok(StepMember::argument(match step.config {
                Some(config) => freezable.with_configuration(config),
                None => freezable,
            }))
        }
    }
}

fn scalar_to_member(value: Value, store: &StepFactoryStore) -> Result<StepMember, SclError> {
    let constant = |value: ConstantValue| Ok(StepMember::argument(FreezableStep::Constant(value)));

    match value {
        Value::Bool(b) => constant(ConstantValue::Bool(b)),
        Value::Number(number) => constant(number_constant(&number)?),
        Value::String(text) => string_to_member(text, store),
        other => Err(SclError::Yaml(format!("expected a scalar, found {:?}", other))),
    }
}

fn number_constant(number: &Number) -> Result<ConstantValue, SclError> {
    if let Some(i) = number.as_i64() {
        Ok(ConstantValue::Int(i))
    } else if let Some(d) = number.as_f64() {
        Ok(ConstantValue::Double(d))
    } else {
        Err(SclError::InvalidLiteral {
            fragment: number.to_string(),
            message: "number out of range".to_string(),
        })
    }
}

/// A quoted SCL string first, then `<Name>`, then compact step forms, then
/// `Type.Value` for a registered enum. Anything else is a plain string.
fn string_to_member(text: String, store: &StepFactoryStore) -> Result<StepMember, SclError> {
    if let Some(quoted) = quoted_string(&text) {
        return Ok(StepMember::argument(FreezableStep::Constant(ConstantValue::String(quoted))));
    }

    if let Some(name) = VariableName::try_parse(&text) {
        return Ok(StepMember::Variable(name));
    }

    for factory in store.factories() {
        let Some(custom) = factory.serializer().as_custom() else {
            continue;
        };
        if let Some(data) = custom.try_deserialize(&text) {
            return Ok(StepMember::argument(FreezableStep::compound(factory.name(), data?)));
        }
    }

    if let Some((enum_type, value)) = text.split_once('.') {
        if let Some(definition) = store.enum_definition(enum_type) {
            if let Some(member) = definition.value(value) {
                return Ok(StepMember::argument(FreezableStep::Constant(ConstantValue::Enum(
                    EnumValue::new(definition.name, member),
                ))));
            }
        }
    }

    Ok(StepMember::argument(FreezableStep::Constant(ConstantValue::String(text))))
}

/// The contents of a scalar that is exactly one quoted SCL string literal
fn quoted_string(text: &str) -> Option<String> {
    if !(text.starts_with('\'') || text.starts_with('"')) {
        return None;
    }
    match parser::parse_member(text) {
        Ok(StepMember::Argument(step)) => match *step {
            FreezableStep::Constant(ConstantValue::String(s)) => Some(s),
            _ => None,
        },
        _ => None,
    }
}

/* ===================== writing ===================== */

/// Write a step as a YAML document.
pub fn serialize_yaml(step: &FreezableStep, store: &StepFactoryStore) -> Result<String, SclError> {
    let value = top_level_node(step, store)?.into_value()?;
    Ok(serde_yaml::to_string(&value)?)
}

fn top_level_node(step: &FreezableStep, store: &StepFactoryStore) -> Result<YamlNode, SclError> {
    if let FreezableStep::Compound(compound) = step {
        let is_plain_sequence = compound.configuration.is_none()
            && compound.data.len() == 1
            && store
                .get(&compound.step_name)
                .is_some_and(|f| f.name() == steps::sequence::NAME);
        if is_plain_sequence {
            if let Some(StepMember::ArgumentList(items)) = compound.data.get("InitialSteps") {
                return items
                    .iter()
                    .map(|item| step_to_node(item, store))
                    .collect::<Result<Vec<_>, _>>()
                    .map(YamlNode::Sequence);
            }
        }
    }
    step_to_node(step, store)
}

pub fn step_to_node(step: &FreezableStep, store: &StepFactoryStore) -> Result<YamlNode, SclError> {
    let compound = match step {
        FreezableStep::Constant(value) => return Ok(YamlNode::Scalar(constant_to_value(value, store))),
        FreezableStep::Compound(compound) => compound,
    };
    let factory = store.get(&compound.step_name);

    if compound.configuration.is_none() {
        if let Some(factory) = factory {
            if let Some(compact) = compact_node(factory.serializer(), factory.name(), &compound.data, store) {
                return Ok(compact);
            }
        }
    }

    let mut properties = IndexMap::new();
    for (name, member) in compound.data.sorted() {
        properties.insert(name.to_string(), member_to_node(member, store)?);
    }

    Ok(YamlNode::Step(YamlStep {
        step_name: factory
            .map(|f| f.name().to_string())
            .unwrap_or_else(|| compound.step_name.clone()),
        config: compound.configuration.clone(),
        properties,
    }))
}

/// A string for regex-readable compact forms, a sequence for arrays.
fn compact_node(
    serializer: &StepSerializer,
    name: &str,
    data: &FreezableStepData,
    store: &StepFactoryStore,
) -> Option<YamlNode> {
    match serializer {
        StepSerializer::Custom(custom) => {
            let text = serialize_step(&FreezableStep::compound(name, data.clone()), store).ok()?;
            custom
                .matches(&text)
                .then(|| YamlNode::Scalar(Value::String(text)))
        }
        StepSerializer::Array => match data.get("Elements") {
            Some(StepMember::ArgumentList(elements)) if data.len() == 1 => elements
                .iter()
                .map(|element| step_to_node(element, store))
                .collect::<Result<Vec<_>, _>>()
                .ok()
                .map(YamlNode::Sequence),
            _ => None,
        },
        StepSerializer::Function => None,
    }
}

fn member_to_node(member: &StepMember, store: &StepFactoryStore) -> Result<YamlNode, SclError> {
    match member {
        StepMember::Variable(name) => Ok(YamlNode::Scalar(Value::String(name.serialize()))),
        StepMember::Argument(step) => step_to_node(step, store),
        StepMember::ArgumentList(steps) => steps
            .iter()
            .map(|step| step_to_node(step, store))
            .collect::<Result<Vec<_>, _>>()
            .map(YamlNode::Sequence),
    }
}

fn constant_to_value(value: &ConstantValue, store: &StepFactoryStore) -> Value {
    match value {
        ConstantValue::Bool(b) => Value::Bool(*b),
        ConstantValue::Int(i) => Value::Number(Number::from(*i)),
        ConstantValue::Double(d) => Value::Number(Number::from(*d)),
        ConstantValue::String(s) if reads_back_as_string(s, store) => Value::String(s.clone()),
        ConstantValue::String(s) => Value::String(quote_string(s)),
        ConstantValue::Enum(e) => Value::String(e.to_string()),
    }
}

/// Whether a bare scalar holding `text` is read as that same string.
fn reads_back_as_string(text: &str, store: &StepFactoryStore) -> bool {
    match string_to_member(text.to_string(), store) {
        Ok(StepMember::Argument(step)) => {
            matches!(*step, FreezableStep::Constant(ConstantValue::String(ref s)) if s == text)
        }
        _ => false,
    }
}
