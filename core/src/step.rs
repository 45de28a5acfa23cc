//! The frozen, runnable step tree
//!
//! A [`Step`] is produced by freezing a [`FreezableStep`]. Every property has
//! been bound to a declared slot and type-checked, and the step's output
//! type is known. Steps can be run any number of times and unfrozen back to
//! their freezable form for re-serialization.

use crate::errors::RunError;
use crate::factory::{find_property, StepFactory};
use crate::freezable::{Configuration, FreezableStep, FreezableStepData, StepMember};
use crate::state::{FromValue, StateMonad};
use crate::types::{ConstantValue, TypeReference, Value, VariableName};
use indexmap::IndexMap;
use std::future::Future;
use std::pin::Pin;
use tokio_util::sync::CancellationToken;

pub type StepFuture<'a> = Pin<Box<dyn Future<Output = Result<Value, RunError>> + Send + 'a>>;

/// A property value after binding
#[derive(Debug, Clone, PartialEq)]
pub enum BoundMember {
    Variable(VariableName),
    Step(Box<Step>),
    List(Vec<Step>),
}

impl BoundMember {
    fn unfreeze(&self) -> StepMember {
        match self {
            BoundMember::Variable(name) => StepMember::Variable(name.clone()),
            BoundMember::Step(step) => StepMember::argument(step.unfreeze()),
            BoundMember::List(steps) => {
                StepMember::ArgumentList(steps.iter().map(Step::unfreeze).collect())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Constant(ConstantValue),
    Compound(CompoundStep),
}

impl Step {
    pub fn name(&self) -> String {
        match self {
            Step::Constant(value) => value.actual_type().to_string(),
            Step::Compound(compound) => compound.factory.name().to_string(),
        }
    }

    pub fn output_type(&self) -> TypeReference {
        match self {
            Step::Constant(value) => TypeReference::Actual(value.actual_type()),
            Step::Compound(compound) => compound.output_type.clone(),
        }
    }

    pub fn as_compound(&self) -> Option<&CompoundStep> {
        match self {
            Step::Compound(compound) => Some(compound),
            Step::Constant(_) => None,
        }
    }

    pub fn as_constant(&self) -> Option<&ConstantValue> {
        match self {
            Step::Constant(value) => Some(value),
            Step::Compound(_) => None,
        }
    }

    /// Convert back to the unresolved form.
    pub fn unfreeze(&self) -> FreezableStep {
        match self {
            Step::Constant(value) => FreezableStep::Constant(value.clone()),
            Step::Compound(compound) => compound.unfreeze(),
        }
    }

    /// Execute the step against `state`.
    ///
    /// Compound steps check `cancel` before they start.
    pub fn run<'a>(
        &'a self,
        state: &'a mut StateMonad,
        cancel: &'a CancellationToken,
    ) -> StepFuture<'a> {
        Box::pin(async move {
            match self {
                Step::Constant(value) => Ok(Value::from(value.clone())),
                Step::Compound(compound) => {
                    if cancel.is_cancelled() {
                        return Err(RunError::Cancelled);
                    }
                    compound.factory.execute(compound, state, cancel).await
                }
            }
        })
    }
}

/// A frozen step with bound properties
#[derive(Debug, Clone)]
pub struct CompoundStep {
    factory: &'static dyn StepFactory,
    properties: IndexMap<&'static str, BoundMember>,
    output_type: TypeReference,
    configuration: Option<Configuration>,
}

impl PartialEq for CompoundStep {
    fn eq(&self, other: &Self) -> bool {
        self.factory.name() == other.factory.name()
            && self.properties == other.properties
            && self.output_type == other.output_type
            && self.configuration == other.configuration
    }
}

impl CompoundStep {
    pub fn new(
        factory: &'static dyn StepFactory,
        properties: IndexMap<&'static str, BoundMember>,
        output_type: TypeReference,
        configuration: Option<Configuration>,
    ) -> Self {
        Self {
            factory,
            properties,
            output_type,
            configuration,
        }
    }

    pub fn factory(&self) -> &'static dyn StepFactory {
        self.factory
    }

    pub fn output_type(&self) -> &TypeReference {
        &self.output_type
    }

    pub fn configuration(&self) -> Option<&Configuration> {
        self.configuration.as_ref()
    }

    pub fn properties(&self) -> impl Iterator<Item = (&'static str, &BoundMember)> {
        self.properties.iter().map(|(name, member)| (*name, member))
    }

    pub fn property(&self, name: &str) -> Option<&BoundMember> {
        self.properties
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, member)| member)
    }

    /// Copy of this step with one property replaced
    pub fn with_property(&self, name: &'static str, member: BoundMember) -> Self {
        let mut copy = self.clone();
        copy.properties.insert(name, member);
        copy
    }

    pub fn step(&self, name: &str) -> Option<&Step> {
        match self.property(name) {
            Some(BoundMember::Step(step)) => Some(step),
            _ => None,
        }
    }

    pub fn steps(&self, name: &str) -> &[Step] {
        match self.property(name) {
            Some(BoundMember::List(steps)) => steps,
            _ => &[],
        }
    }

    /// The bound variable name, or the property's declared default
    pub fn variable(&self, name: &str) -> Option<VariableName> {
        match self.property(name) {
            Some(BoundMember::Variable(variable)) => Some(variable.clone()),
            _ => find_property(self.factory.properties(), name)
                .and_then(|p| p.default)
                .and_then(|d| d.to_variable()),
        }
    }

    pub fn require_variable(&self, name: &str) -> Result<VariableName, RunError> {
        self.variable(name).ok_or_else(|| self.missing(name))
    }

    /// Run the step bound to `name`, falling back to the declared default.
    pub async fn evaluate(
        &self,
        name: &str,
        state: &mut StateMonad,
        cancel: &CancellationToken,
    ) -> Result<Value, RunError> {
        match self.step(name) {
            Some(step) => step.run(state, cancel).await,
            None => find_property(self.factory.properties(), name)
                .and_then(|p| p.default)
                .and_then(|d| d.to_constant())
                .map(Value::from)
                .ok_or_else(|| self.missing(name)),
        }
    }

    /// Run the step bound to `name` and convert the result.
    pub async fn evaluate_as<T: FromValue>(
        &self,
        name: &str,
        state: &mut StateMonad,
        cancel: &CancellationToken,
    ) -> Result<T, RunError> {
        let value = self.evaluate(name, state, cancel).await?;
        T::from_value(&value).ok_or_else(|| RunError::WrongValueType {
            step: self.factory.name().to_string(),
            expected: T::TYPE_NAME,
            actual: value.type_name(),
        })
    }

    fn missing(&self, name: &str) -> RunError {
        RunError::MissingProperty {
            step: self.factory.name().to_string(),
            property: name.to_string(),
        }
    }

    pub fn unfreeze(&self) -> FreezableStep {
        let data: FreezableStepData = self
            .properties
            .iter()
            .map(|(name, member)| (*name, member.unfreeze()))
            .collect();
        let step = FreezableStep::compound(self.factory.name(), data);
        match &self.configuration {
            Some(configuration) => step.with_configuration(configuration.clone()),
            None => step,
        }
    }
}
