//! `Print` - write a value to the output

use crate::errors::{ErrorList, RunError};
use crate::factory::{PropertyDescriptor, StepFactory};
use crate::freezable::FreezableStepData;
use crate::freeze::StepContext;
use crate::state::StateMonad;
use crate::step::CompoundStep;
use crate::types::{TypeReference, Value};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

pub const NAME: &str = "Print";

const PROPERTIES: &[PropertyDescriptor] = &[PropertyDescriptor::step("Value").required()];

#[derive(Debug)]
pub struct PrintFactory;

pub static PRINT: PrintFactory = PrintFactory;

#[async_trait]
impl StepFactory for PrintFactory {
    fn name(&self) -> &'static str {
        NAME
    }

    fn summary(&self) -> &'static str {
        "Prints a value"
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
        let value = step.evaluate("Value", state, cancel).await?;
        state.print(value.to_string());
        Ok(Value::Unit)
    }
}
