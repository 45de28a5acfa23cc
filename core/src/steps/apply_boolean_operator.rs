//! `ApplyBooleanOperator` - `<A> && <B>`, `<A> || <B>`

use crate::errors::{ErrorList, RunError};
use crate::factory::{PropertyDescriptor, StepFactory};
use crate::freezable::FreezableStepData;
use crate::freeze::StepContext;
use crate::serialization::{CustomSerializer, SerializerComponent, StepSerializer};
use crate::state::StateMonad;
use crate::step::CompoundStep;
use crate::types::enums::BOOLEAN_OPERATOR;
use crate::types::{EnumValue, ExpectedType, TypeReference, Value};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

pub const NAME: &str = "ApplyBooleanOperator";

const PROPERTIES: &[PropertyDescriptor] = &[
    PropertyDescriptor::step("Left")
        .required()
        .of_type(ExpectedType::Bool),
    PropertyDescriptor::step("Operator")
        .required()
        .of_type(ExpectedType::Enum("BooleanOperator")),
    PropertyDescriptor::step("Right")
        .required()
        .of_type(ExpectedType::Bool),
];

static COMPONENTS: [SerializerComponent; 5] = [
    SerializerComponent::Step("Left"),
    SerializerComponent::Space,
    SerializerComponent::EnumDisplay("Operator", &BOOLEAN_OPERATOR),
    SerializerComponent::Space,
    SerializerComponent::Step("Right"),
];

static SERIALIZER: StepSerializer = StepSerializer::Custom(CustomSerializer::new(&COMPONENTS));

#[derive(Debug)]
pub struct ApplyBooleanOperatorFactory;

pub static APPLY_BOOLEAN_OPERATOR: ApplyBooleanOperatorFactory = ApplyBooleanOperatorFactory;

#[async_trait]
impl StepFactory for ApplyBooleanOperatorFactory {
    fn name(&self) -> &'static str {
        NAME
    }

    fn summary(&self) -> &'static str {
        "Combines two booleans with And or Or"
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

    /// `Right` is only evaluated when `Left` does not decide the result.
    async fn execute(
        &self,
        step: &CompoundStep,
        state: &mut StateMonad,
        cancel: &CancellationToken,
    ) -> Result<Value, RunError> {
        let left = step.evaluate_as::<bool>("Left", state, cancel).await?;
        let operator = step.evaluate_as::<EnumValue>("Operator", state, cancel).await?;

        let result = match (operator.value.as_str(), left) {
            ("And", false) => false,
            ("Or", true) => true,
            _ => step.evaluate_as::<bool>("Right", state, cancel).await?,
        };
        Ok(Value::Bool(result))
    }
}
