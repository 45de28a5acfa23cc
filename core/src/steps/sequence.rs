//! `Sequence` - run steps in order

use super::combine::combine_steps;
use crate::errors::{ErrorList, RunError};
use crate::factory::{PropertyDescriptor, StepFactory};
use crate::freezable::FreezableStepData;
use crate::freeze::{property_type, StepContext};
use crate::state::StateMonad;
use crate::step::CompoundStep;
use crate::types::{TypeReference, Value};
use async_trait::async_trait;
use std::borrow::Cow;
use tokio_util::sync::CancellationToken;

pub const NAME: &str = "Sequence";

const PROPERTIES: &[PropertyDescriptor] = &[
    PropertyDescriptor::list("InitialSteps").summary("Steps run in order"),
    PropertyDescriptor::step("FinalStep").summary("Runs last; its value is the result"),
];

#[derive(Debug)]
pub struct SequenceFactory;

pub static SEQUENCE: SequenceFactory = SequenceFactory;

#[async_trait]
impl StepFactory for SequenceFactory {
    fn name(&self) -> &'static str {
        NAME
    }

    fn summary(&self) -> &'static str {
        "Runs each step in turn"
    }

    fn properties(&self) -> &'static [PropertyDescriptor] {
        PROPERTIES
    }

    fn output_type_reference(
        &self,
        data: &FreezableStepData,
        context: &StepContext<'_>,
    ) -> Result<TypeReference, ErrorList> {
        Ok(property_type(self, data, "FinalStep", context)?.unwrap_or(TypeReference::UNIT))
    }

    async fn execute(
        &self,
        step: &CompoundStep,
        state: &mut StateMonad,
        cancel: &CancellationToken,
    ) -> Result<Value, RunError> {
        let initial = step.steps("InitialSteps");
        let initial: Cow<'_, [_]> = if state.settings().combine_steps {
            Cow::Owned(combine_steps(initial))
        } else {
            Cow::Borrowed(initial)
        };

        for child in initial.iter() {
            child.run(state, cancel).await?;
        }

        match step.step("FinalStep") {
            Some(last) => last.run(state, cancel).await,
            None => Ok(Value::Unit),
        }
    }
}
