//! `ElementCount` - number of elements in an array

use crate::errors::{ErrorList, RunError};
use crate::factory::{PropertyDescriptor, StepFactory};
use crate::freezable::FreezableStepData;
use crate::freeze::StepContext;
use crate::state::StateMonad;
use crate::step::CompoundStep;
use crate::types::{ExpectedType, TypeReference, Value};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

pub const NAME: &str = "ElementCount";

const PROPERTIES: &[PropertyDescriptor] = &[PropertyDescriptor::step("Array")
    .required()
    .of_type(ExpectedType::Array)];

#[derive(Debug)]
pub struct ElementCountFactory;

pub static ELEMENT_COUNT: ElementCountFactory = ElementCountFactory;

#[async_trait]
impl StepFactory for ElementCountFactory {
    fn name(&self) -> &'static str {
        NAME
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["ArrayLength"]
    }

    fn summary(&self) -> &'static str {
        "Counts the elements in an array"
    }

    fn properties(&self) -> &'static [PropertyDescriptor] {
        PROPERTIES
    }

    fn output_type_reference(
        &self,
        _data: &FreezableStepData,
        _context: &StepContext<'_>,
    ) -> Result<TypeReference, ErrorList> {
        Ok(TypeReference::INT)
    }

    async fn execute(
        &self,
        step: &CompoundStep,
        state: &mut StateMonad,
        cancel: &CancellationToken,
    ) -> Result<Value, RunError> {
        let array = step.evaluate_as::<Vec<Value>>("Array", state, cancel).await?;
        Ok(Value::Int(array.len() as i64))
    }
}
