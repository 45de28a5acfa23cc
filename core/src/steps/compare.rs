//! `Compare` - `<A> == <B>`, `<A> < <B>`, ...

use super::wrong_value;
use crate::errors::{ErrorList, RunError};
use crate::factory::{PropertyDescriptor, StepFactory};
use crate::freezable::FreezableStepData;
use crate::freeze::{required_property_type, StepContext};
use crate::serialization::{CustomSerializer, SerializerComponent, StepSerializer};
use crate::state::StateMonad;
use crate::step::CompoundStep;
use crate::types::enums::COMPARE_OPERATOR;
use crate::types::{EnumValue, ExpectedType, TypeReference, Value};
use async_trait::async_trait;
use std::cmp::Ordering;
use tokio_util::sync::CancellationToken;

pub const NAME: &str = "Compare";

const PROPERTIES: &[PropertyDescriptor] = &[
    PropertyDescriptor::step("Left").required(),
    PropertyDescriptor::step("Operator")
        .required()
        .of_type(ExpectedType::Enum("CompareOperator")),
    PropertyDescriptor::step("Right").required(),
];

static COMPONENTS: [SerializerComponent; 5] = [
    SerializerComponent::Step("Left"),
    SerializerComponent::Space,
    SerializerComponent::EnumDisplay("Operator", &COMPARE_OPERATOR),
    SerializerComponent::Space,
    SerializerComponent::Step("Right"),
];

static SERIALIZER: StepSerializer = StepSerializer::Custom(CustomSerializer::new(&COMPONENTS));

#[derive(Debug)]
pub struct CompareFactory;

pub static COMPARE: CompareFactory = CompareFactory;

#[async_trait]
impl StepFactory for CompareFactory {
    fn name(&self) -> &'static str {
        NAME
    }

    fn summary(&self) -> &'static str {
        "Compares two values of the same type"
    }

    fn properties(&self) -> &'static [PropertyDescriptor] {
        PROPERTIES
    }

    /// Always Bool, but the operands must agree on a type.
    fn output_type_reference(
        &self,
        data: &FreezableStepData,
        context: &StepContext<'_>,
    ) -> Result<TypeReference, ErrorList> {
        let left = required_property_type(self, data, "Left", context)?;
        let right = required_property_type(self, data, "Right", context)?;
        context.resolve(&TypeReference::multiple([left, right]))?;
        Ok(TypeReference::BOOL)
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
        let left = step.evaluate("Left", state, cancel).await?;
        let operator = step.evaluate_as::<EnumValue>("Operator", state, cancel).await?;
        let right = step.evaluate("Right", state, cancel).await?;

        let result = match operator.value.as_str() {
            "Equals" => values_equal(&left, &right),
            "NotEquals" => !values_equal(&left, &right),
            other => {
                let ordering = order(&left, &right)?;
                match other {
                    "LessThan" => ordering == Ordering::Less,
                    "LessThanOrEqual" => ordering != Ordering::Greater,
                    "GreaterThan" => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                }
            }
        };
        Ok(Value::Bool(result))
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Int(l), Value::Double(r)) | (Value::Double(r), Value::Int(l)) => (*l as f64) == *r,
        _ => left == right,
    }
}

fn order(left: &Value, right: &Value) -> Result<Ordering, RunError> {
    let ordering = match (left, right) {
        (Value::Int(l), Value::Int(r)) => Some(l.cmp(r)),
        (Value::Int(l), Value::Double(r)) => (*l as f64).partial_cmp(r),
        (Value::Double(l), Value::Int(r)) => l.partial_cmp(&(*r as f64)),
        (Value::Double(l), Value::Double(r)) => l.partial_cmp(r),
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        (Value::Bool(l), Value::Bool(r)) => Some(l.cmp(r)),
        _ => None,
    };
    ordering.ok_or_else(|| wrong_value(NAME, "comparable value", right))
}
