//! `AppendString` - add text to the end of a string variable

use super::combine::StepCombiner;
use crate::errors::{ErrorList, RunError};
use crate::factory::{PropertyDescriptor, StepFactory};
use crate::freezable::FreezableStepData;
use crate::freeze::{variable_property, StepContext};
use crate::state::StateMonad;
use crate::step::{BoundMember, CompoundStep, Step};
use crate::types::{ConstantValue, ExpectedType, TypeReference, Value, VariableName};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

pub const NAME: &str = "AppendString";

const PROPERTIES: &[PropertyDescriptor] = &[
    PropertyDescriptor::variable("Variable").required(),
    PropertyDescriptor::step("String")
        .required()
        .of_type(ExpectedType::String),
];

#[derive(Debug)]
pub struct AppendStringFactory;

pub static APPEND_STRING: AppendStringFactory = AppendStringFactory;

#[async_trait]
impl StepFactory for AppendStringFactory {
    fn name(&self) -> &'static str {
        NAME
    }

    fn summary(&self) -> &'static str {
        "Appends a string to a variable, creating it if needed"
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
        _context: &StepContext<'_>,
    ) -> Result<Vec<(VariableName, TypeReference)>, ErrorList> {
        let name = variable_property(self, data, "Variable")?;
        Ok(vec![(name, TypeReference::STRING)])
    }

    fn combiners(&self) -> &'static [&'static dyn StepCombiner] {
        &COMBINERS
    }

    async fn execute(
        &self,
        step: &CompoundStep,
        state: &mut StateMonad,
        cancel: &CancellationToken,
    ) -> Result<Value, RunError> {
        let name = step.require_variable("Variable")?;
        let suffix = step.evaluate_as::<String>("String", state, cancel).await?;

        let mut text = match state.get_variable(&name) {
            Ok(_) => state.get::<String>(&name)?,
            Err(RunError::VariableNotSet(_)) => String::new(),
            Err(err) => return Err(err),
        };
        text.push_str(&suffix);
        state.set_variable(name, Value::String(text));
        Ok(Value::Unit)
    }
}

/// Two appends of constant text to the same variable become one.
#[derive(Debug)]
pub struct AppendConstantsCombiner;

static COMBINERS: [&dyn StepCombiner; 1] = [&AppendConstantsCombiner];

impl StepCombiner for AppendConstantsCombiner {
    fn try_combine(&self, first: &Step, second: &Step) -> Option<Step> {
        let (first, second) = (first.as_compound()?, second.as_compound()?);
        if first.factory().name() != NAME || second.factory().name() != NAME {
            return None;
        }
        if first.variable("Variable")? != second.variable("Variable")? {
            return None;
        }

        let head = constant_text(first)?;
        let tail = constant_text(second)?;
        let merged = Step::Constant(ConstantValue::String(format!("{}{}", head, tail)));
        Some(Step::Compound(
            first.with_property("String", BoundMember::Step(Box::new(merged))),
        ))
    }
}

fn constant_text(step: &CompoundStep) -> Option<&str> {
    match step.step("String")?.as_constant()? {
        ConstantValue::String(text) => Some(text),
        _ => None,
    }
}
