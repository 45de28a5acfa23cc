//! `GetVariable` - read a variable from the state

use crate::errors::{ErrorList, RunError};
use crate::factory::{PropertyDescriptor, StepFactory};
use crate::freezable::FreezableStepData;
use crate::freeze::{variable_property, StepContext};
use crate::serialization::{CustomSerializer, SerializerComponent, StepSerializer};
use crate::state::StateMonad;
use crate::step::CompoundStep;
use crate::types::{TypeReference, Value};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

pub const NAME: &str = "GetVariable";

const PROPERTIES: &[PropertyDescriptor] = &[PropertyDescriptor::variable("Variable")
    .required()
    .summary("The variable to read")];

static SERIALIZER: StepSerializer =
    StepSerializer::Custom(CustomSerializer::new(&[SerializerComponent::Variable("Variable")]));

#[derive(Debug)]
pub struct GetVariableFactory;

pub static GET_VARIABLE: GetVariableFactory = GetVariableFactory;

#[async_trait]
impl StepFactory for GetVariableFactory {
    fn name(&self) -> &'static str {
        NAME
    }

    fn summary(&self) -> &'static str {
        "Gets the value of a variable"
    }

    fn properties(&self) -> &'static [PropertyDescriptor] {
        PROPERTIES
    }

    fn output_type_reference(
        &self,
        data: &FreezableStepData,
        _context: &StepContext<'_>,
    ) -> Result<TypeReference, ErrorList> {
        variable_property(self, data, "Variable").map(TypeReference::Variable)
    }

    fn serializer(&self) -> &'static StepSerializer {
        &SERIALIZER
    }

    async fn execute(
        &self,
        step: &CompoundStep,
        state: &mut StateMonad,
        _cancel: &CancellationToken,
    ) -> Result<Value, RunError> {
        let name = step.require_variable("Variable")?;
        state.get_variable(&name).cloned()
    }
}
