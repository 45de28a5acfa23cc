//! Turning step graphs back into text
//!
//! Every step type has a [`StepSerializer`]. Most use the function form
//! `Name(A = 1, B = 2)`; a few have a compact form assembled from
//! [`SerializerComponent`]s, which can also be read back with a single
//! regex match. Steps carrying configuration have no textual form and are
//! written as YAML instead (see [`yaml`]).

pub mod custom;
pub mod function;
pub mod yaml;

#[cfg(test)]
mod tests;

pub use custom::CustomSerializer;

use crate::errors::SclError;
use crate::factory::StepFactoryStore;
use crate::freezable::{FreezableStep, FreezableStepData, StepMember};
use crate::step::Step;
use crate::types::{ConstantValue, EnumDefinition};

/// One piece of a compact serializer, in declared order.
#[derive(Debug, Clone, Copy)]
pub enum SerializerComponent {
    /// A single space; matches any run of whitespace
    Space,
    /// A literal token such as `not(` or `=`
    Fixed(&'static str),
    Boolean(&'static str),
    Integer(&'static str),
    /// An enum constant written with its display name, e.g. `+`
    EnumDisplay(&'static str, &'static EnumDefinition),
    /// A variable name slot written as `<Name>`
    Variable(&'static str),
    /// Any step, written in its own compact form
    Step(&'static str),
    /// Any step in a delimited slot, written without brackets
    Expression(&'static str),
}

/// Contributes text to a serialized step.
pub trait SerializerBlock {
    fn try_get_text(&self, data: &FreezableStepData, store: &StepFactoryStore) -> Result<String, SclError>;
}

/// Contributes a regex fragment, and optionally a property, to a compact
/// deserializer.
pub trait DeserializerBlock {
    /// Regex fragment for this component. Capturing components name their
    /// group `group`.
    fn regex_fragment(&self, group: &str) -> String;

    /// The property filled from this component's capture
    fn property(&self) -> Option<&'static str>;

    fn member_from_text(&self, text: &str) -> Result<StepMember, SclError>;
}

/// Maps a named capture group of a master regex to a property slot.
#[derive(Debug, Clone)]
pub struct DeserializerMapping {
    pub group: String,
    pub property: &'static str,
    pub component: SerializerComponent,
}

#[derive(Debug)]
pub enum StepSerializer {
    Function,
    /// `[a, b, c]` built from the `Elements` list
    Array,
    Custom(CustomSerializer),
}

pub static FUNCTION_SERIALIZER: StepSerializer = StepSerializer::Function;

impl StepSerializer {
    pub fn serialize(
        &self,
        step_name: &str,
        data: &FreezableStepData,
        store: &StepFactoryStore,
    ) -> Result<String, SclError> {
        match self {
            StepSerializer::Function => function::serialize(step_name, data, store),
            StepSerializer::Array => match data.get("Elements") {
                Some(StepMember::ArgumentList(elements)) => serialize_list(elements, store),
                _ => Err(SclError::CannotSerialize {
                    property: "Elements".to_string(),
                    expected: "a list of steps".to_string(),
                }),
            },
            StepSerializer::Custom(custom) => custom.serialize(data, store),
        }
    }

    pub fn as_custom(&self) -> Option<&CustomSerializer> {
        match self {
            StepSerializer::Custom(custom) => Some(custom),
            _ => None,
        }
    }

    /// Whether the compact form is an infix expression that needs
    /// parentheses when used as an operand.
    pub fn is_infix(&self) -> bool {
        self.as_custom().map(CustomSerializer::is_infix).unwrap_or(false)
    }
}

/// Serialize a step as SCL text.
///
/// A step whose compact form cannot be produced is written in function
/// form. Configuration anywhere in the graph is an error, since the text
/// grammar cannot express it.
pub fn serialize_step(step: &FreezableStep, store: &StepFactoryStore) -> Result<String, SclError> {
    let compound = match step {
        FreezableStep::Constant(value) => return Ok(value.serialize()),
        FreezableStep::Compound(compound) => compound,
    };

    let factory = store.get(&compound.step_name);
    if compound.configuration.is_some() {
        return Err(SclError::HasConfiguration {
            step: compound.step_name.clone(),
        });
    }

    let name = factory.map(|f| f.name()).unwrap_or(compound.step_name.as_str());
    let serializer = factory.map(|f| f.serializer()).unwrap_or(&FUNCTION_SERIALIZER);

    match serializer.serialize(name, &compound.data, store) {
        Ok(text) => Ok(text),
        Err(err @ SclError::HasConfiguration { .. }) => Err(err),
        Err(err) => {
            tracing::debug!(step = name, error = %err, "compact form unavailable, using function form");
            function::serialize(name, &compound.data, store)
        }
    }
}

/// Serialize a step as SCL text, or as YAML when it carries configuration.
pub fn to_text(step: &FreezableStep, store: &StepFactoryStore) -> Result<String, SclError> {
    match serialize_step(step, store) {
        Err(SclError::HasConfiguration { step: name }) => {
            tracing::warn!(step = %name, "step has configuration, writing YAML");
            yaml::serialize_yaml(step, store)
        }
        other => other,
    }
}

impl Step {
    /// SCL text for this step
    pub fn serialize(&self, store: &StepFactoryStore) -> Result<String, SclError> {
        serialize_step(&self.unfreeze(), store)
    }
}

/// Text for a property value in a delimited position (function argument,
/// array element).
pub fn serialize_member(member: &StepMember, store: &StepFactoryStore) -> Result<String, SclError> {
    match member {
        StepMember::Variable(name) => Ok(name.serialize()),
        StepMember::Argument(step) => serialize_step(step, store),
        StepMember::ArgumentList(steps) => serialize_list(steps, store),
    }
}

/// Text for a property value used as an operand of an infix form.
/// Nested infix forms are wrapped in parentheses.
pub(crate) fn serialize_operand(member: &StepMember, store: &StepFactoryStore) -> Result<String, SclError> {
    if let StepMember::Argument(step) = member {
        if let FreezableStep::Compound(compound) = step.as_ref() {
            let factory = store.get(&compound.step_name);
            if let Some(factory) = factory.filter(|f| f.serializer().is_infix()) {
                if compound.configuration.is_none() {
                    if let Ok(text) = factory.serializer().serialize(factory.name(), &compound.data, store) {
                        return Ok(format!("({})", text));
                    }
                }
            }
        }
    }
    serialize_member(member, store)
}

fn serialize_list(steps: &[FreezableStep], store: &StepFactoryStore) -> Result<String, SclError> {
    let elements = steps
        .iter()
        .map(|step| serialize_step(step, store))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("[{}]", elements.join(", ")))
}

/// The constant held by a member, if it is one.
pub(crate) fn constant_of(member: &StepMember) -> Option<&ConstantValue> {
    match member {
        StepMember::Argument(step) => match step.as_ref() {
            FreezableStep::Constant(value) => Some(value),
            FreezableStep::Compound(_) => None,
        },
        _ => None,
    }
}
