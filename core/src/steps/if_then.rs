//! `If` - run `Then` or `Else` depending on a condition

use crate::errors::{ErrorList, RunError};
use crate::factory::{PropertyDescriptor, StepFactory};
use crate::freezable::FreezableStepData;
use crate::freeze::StepContext;
use crate::state::StateMonad;
use crate::step::CompoundStep;
use crate::types::{ExpectedType, TypeReference, Value};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

pub const NAME: &str = "If";

const PROPERTIES: &[PropertyDescriptor] = &[
    PropertyDescriptor::step("Condition")
        .required()
        .of_type(ExpectedType::Bool),
    PropertyDescriptor::step("Then").required(),
    PropertyDescriptor::step("Else"),
];

#[derive(Debug)]
pub struct IfFactory;

pub static IF: IfFactory = IfFactory;

#[async_trait]
impl StepFactory for IfFactory {
    fn name(&self) -> &'static str {
        NAME
    }

    fn summary(&self) -> &'static str {
        "Runs Then if the condition is true, otherwise Else"
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

    async fn execute(
        &self,
        step: &CompoundStep,
        state: &mut StateMonad,
        cancel: &CancellationToken,
    ) -> Result<Value, RunError> {
        let condition = step.evaluate_as::<bool>("Condition", state, cancel).await?;
        let branch = if condition { step.step("Then") } else { step.step("Else") };
        if let Some(branch) = branch {
            branch.run(state, cancel).await?;
        }
        Ok(Value::Unit)
    }
}
