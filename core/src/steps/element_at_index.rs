//! `ElementAtIndex` - `<Array>[1]`

use crate::errors::{ErrorList, RunError};
use crate::factory::{PropertyDescriptor, StepFactory};
use crate::freezable::FreezableStepData;
use crate::freeze::{generic_member_type, StepContext};
use crate::serialization::{CustomSerializer, SerializerComponent, StepSerializer};
use crate::state::StateMonad;
use crate::step::CompoundStep;
use crate::types::{ExpectedType, TypeReference, Value};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

pub const NAME: &str = "ElementAtIndex";

const PROPERTIES: &[PropertyDescriptor] = &[
    PropertyDescriptor::step("Array")
        .required()
        .of_type(ExpectedType::Array),
    PropertyDescriptor::step("Index")
        .required()
        .of_type(ExpectedType::Int)
        .summary("Zero-based index"),
];

static SERIALIZER: StepSerializer = StepSerializer::Custom(CustomSerializer::new(&[
    SerializerComponent::Step("Array"),
    SerializerComponent::Fixed("["),
    SerializerComponent::Integer("Index"),
    SerializerComponent::Fixed("]"),
]));

#[derive(Debug)]
pub struct ElementAtIndexFactory;

pub static ELEMENT_AT_INDEX: ElementAtIndexFactory = ElementAtIndexFactory;

#[async_trait]
impl StepFactory for ElementAtIndexFactory {
    fn name(&self) -> &'static str {
        NAME
    }

    fn summary(&self) -> &'static str {
        "Gets the element at an index of an array"
    }

    fn properties(&self) -> &'static [PropertyDescriptor] {
        PROPERTIES
    }

    fn output_type_reference(
        &self,
        data: &FreezableStepData,
        context: &StepContext<'_>,
    ) -> Result<TypeReference, ErrorList> {
        generic_member_type(self, data, "Array", context)
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
        let array = step.evaluate_as::<Vec<Value>>("Array", state, cancel).await?;
        let index = step.evaluate_as::<i64>("Index", state, cancel).await?;

        usize::try_from(index)
            .ok()
            .and_then(|i| array.get(i).cloned())
            .ok_or(RunError::IndexOutOfRange {
                index,
                length: array.len(),
            })
    }
}
