//! `Not` - `not(<Flag>)`

use crate::errors::{ErrorList, RunError};
use crate::factory::{PropertyDescriptor, StepFactory};
use crate::freezable::FreezableStepData;
use crate::freeze::StepContext;
use crate::serialization::{CustomSerializer, SerializerComponent, StepSerializer};
use crate::state::StateMonad;
use crate::step::CompoundStep;
use crate::types::{ExpectedType, TypeReference, Value};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

pub const NAME: &str = "Not";

const PROPERTIES: &[PropertyDescriptor] = &[PropertyDescriptor::step("Boolean")
    .required()
    .of_type(ExpectedType::Bool)];

static SERIALIZER: StepSerializer = StepSerializer::Custom(CustomSerializer::new(&[
    SerializerComponent::Fixed("not("),
    SerializerComponent::Expression("Boolean"),
    SerializerComponent::Fixed(")"),
]));

#[derive(Debug)]
pub struct NotFactory;

pub static NOT: NotFactory = NotFactory;

#[async_trait]
impl StepFactory for NotFactory {
    fn name(&self) -> &'static str {
        NAME
    }

    fn summary(&self) -> &'static str {
        "Negates a boolean"
    }

    fn properties(&self) -> &'static [PropertyDescriptor] {
        PROPERTIES
    }

    fn output_type_reference(
        &self,
        _data: &FreezableStepData,
        _context: &StepContext<'_>,
    ) -> Result<TypeReference, ErrorList> {
        Ok(TypeReference::BOOL)
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
        let value = step.evaluate_as::<bool>("Boolean", state, cancel).await?;
        Ok(Value::Bool(!value))
    }
}
