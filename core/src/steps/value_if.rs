//! `ValueIf` - choose between two values

use crate::errors::{ErrorList, RunError};
use crate::factory::{PropertyDescriptor, StepFactory};
use crate::freezable::FreezableStepData;
use crate::freeze::{required_property_type, StepContext};
use crate::state::StateMonad;
use crate::step::CompoundStep;
use crate::types::{ExpectedType, TypeReference, Value};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

pub const NAME: &str = "ValueIf";

const PROPERTIES: &[PropertyDescriptor] = &[
    PropertyDescriptor::step("Condition")
        .required()
        .of_type(ExpectedType::Bool),
    PropertyDescriptor::step("Then").required(),
    PropertyDescriptor::step("Else").required(),
];

#[derive(Debug)]
pub struct ValueIfFactory;

pub static VALUE_IF: ValueIfFactory = ValueIfFactory;

#[async_trait]
impl StepFactory for ValueIfFactory {
    fn name(&self) -> &'static str {
        NAME
    }

    fn summary(&self) -> &'static str {
        "Returns Then if the condition is true, otherwise Else"
    }

    fn properties(&self) -> &'static [PropertyDescriptor] {
        PROPERTIES
    }

    /// Both branches must have the same type.
    fn output_type_reference(
        &self,
        data: &FreezableStepData,
        context: &StepContext<'_>,
    ) -> Result<TypeReference, ErrorList> {
        let then = required_property_type(self, data, "Then", context)?;
        let otherwise = required_property_type(self, data, "Else", context)?;
        Ok(TypeReference::multiple([then, otherwise]))
    }

    async fn execute(
        &self,
        step: &CompoundStep,
        state: &mut StateMonad,
        cancel: &CancellationToken,
    ) -> Result<Value, RunError> {
        let condition = step.evaluate_as::<bool>("Condition", state, cancel).await?;
        let branch = if condition { "Then" } else { "Else" };
        step.evaluate(branch, state, cancel).await
    }
}
