//! `SetVariable` - `<Name> = value`

use crate::errors::{ErrorList, RunError};
use crate::factory::{PropertyDescriptor, StepFactory};
use crate::freezable::FreezableStepData;
use crate::freeze::{required_property_type, variable_property, StepContext};
use crate::serialization::{CustomSerializer, SerializerComponent, StepSerializer};
use crate::state::StateMonad;
use crate::step::CompoundStep;
use crate::types::{TypeReference, Value, VariableName};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

pub const NAME: &str = "SetVariable";

const PROPERTIES: &[PropertyDescriptor] = &[
    PropertyDescriptor::variable("Variable")
        .required()
        .aliases(&["VariableName"])
        .summary("The variable to set"),
    PropertyDescriptor::step("Value")
        .required()
        .summary("The value to store"),
];

static SERIALIZER: StepSerializer = StepSerializer::Custom(CustomSerializer::new(&[
    SerializerComponent::Variable("Variable"),
    SerializerComponent::Space,
    SerializerComponent::Fixed("="),
    SerializerComponent::Space,
    SerializerComponent::Expression("Value"),
]));

#[derive(Debug)]
pub struct SetVariableFactory;

pub static SET_VARIABLE: SetVariableFactory = SetVariableFactory;

#[async_trait]
impl StepFactory for SetVariableFactory {
    fn name(&self) -> &'static str {
        NAME
    }

    fn summary(&self) -> &'static str {
        "Sets the value of a variable"
    }

    fn properties(&self) -> &'static [PropertyDescriptor] {
        PROPERTIES
    }

    fn output_type_reference(
        &self,
        _data: &FreezableStepData,
        _context: &StepContext<'_>,
    ) -> Result<TypeReference, ErrorList> {
        Ok(TypeReference::UNIT)
    }

    fn variables_set(
        &self,
        data: &FreezableStepData,
        context: &StepContext<'_>,
    ) -> Result<Vec<(VariableName, TypeReference)>, ErrorList> {
        let name = variable_property(self, data, "Variable")?;
        let value_type = required_property_type(self, data, "Value", context)?;
        Ok(vec![(name, value_type)])
    }

    fn serializer(&self) -> &'static StepSerializer {
        &SERIALIZER
    }

    async fn execute(
        &self,
        step: &CompoundStep,
        state: &mut StateMonad,
        cancel: &CancellationToken,
    ) -> Result<Value, RunError> {
        let name = step.require_variable("Variable")?;
        let value = step.evaluate("Value", state, cancel).await?;
        state.set_variable(name, value);
        Ok(Value::Unit)
    }
}
