//! `ForEach` - run an action once per array element
//!
//! The element is stored in `Variable` (default `<Element>`) while the
//! action runs. Whatever the variable held before the loop is put back
//! afterwards, on success or failure.

use crate::errors::{ErrorList, RunError};
use crate::factory::{DefaultValue, PropertyDescriptor, StepFactory};
use crate::freezable::FreezableStepData;
use crate::freeze::{generic_member_type, variable_property, StepContext};
use crate::state::StateMonad;
use crate::step::{CompoundStep, Step};
use crate::types::{ExpectedType, TypeReference, Value, VariableName};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

pub const NAME: &str = "ForEach";

const PROPERTIES: &[PropertyDescriptor] = &[
    PropertyDescriptor::step("Array")
        .required()
        .of_type(ExpectedType::Array),
    PropertyDescriptor::variable("Variable")
        .default_value(DefaultValue::Variable("Element"))
        .summary("Holds the current element"),
    PropertyDescriptor::step("Action").required(),
];

#[derive(Debug)]
pub struct ForEachFactory;

pub static FOR_EACH: ForEachFactory = ForEachFactory;

#[async_trait]
impl StepFactory for ForEachFactory {
    fn name(&self) -> &'static str {
        NAME
    }

    fn summary(&self) -> &'static str {
        "Runs an action for each element of an array"
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
        let element_type = generic_member_type(self, data, "Array", context)?;
        Ok(vec![(name, element_type)])
    }

    async fn execute(
        &self,
        step: &CompoundStep,
        state: &mut StateMonad,
        cancel: &CancellationToken,
    ) -> Result<Value, RunError> {
        let array = step.evaluate_as::<Vec<Value>>("Array", state, cancel).await?;
        let variable = step.require_variable("Variable")?;
        let action = step.step("Action");

        let previous = state.remove_variable(&variable);
        let result = run_elements(array, &variable, action, state, cancel).await;
        match previous {
            Some(value) => state.set_variable(variable, value),
            None => {
                state.remove_variable(&variable);
            }
        }
        result.map(|_| Value::Unit)
    }
}

async fn run_elements(
    array: Vec<Value>,
    variable: &VariableName,
    action: Option<&Step>,
    state: &mut StateMonad,
    cancel: &CancellationToken,
) -> Result<(), RunError> {
    for element in array {
        if cancel.is_cancelled() {
            return Err(RunError::Cancelled);
        }
        state.set_variable(variable.clone(), element);
        if let Some(action) = action {
            action.run(state, cancel).await?;
        }
    }
    Ok(())
}
