//! `ApplyMathOperator` - `<A> + <B>` and friends
//!
//! Both operands must have the same numeric type. Integer arithmetic is
//! checked; overflow and division by zero are run errors.

use super::wrong_value;
use crate::errors::{ErrorList, RunError};
use crate::factory::{PropertyDescriptor, StepFactory};
use crate::freezable::FreezableStepData;
use crate::freeze::{required_property_type, StepContext};
use crate::serialization::{CustomSerializer, SerializerComponent, StepSerializer};
use crate::state::StateMonad;
use crate::step::CompoundStep;
use crate::types::enums::MATH_OPERATOR;
use crate::types::{EnumValue, ExpectedType, TypeReference, Value};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

pub const NAME: &str = "ApplyMathOperator";

const PROPERTIES: &[PropertyDescriptor] = &[
    PropertyDescriptor::step("Left")
        .required()
        .of_type(ExpectedType::Number),
    PropertyDescriptor::step("Operator")
        .required()
        .of_type(ExpectedType::Enum("MathOperator")),
    PropertyDescriptor::step("Right")
        .required()
        .of_type(ExpectedType::Number),
];

static COMPONENTS: [SerializerComponent; 5] = [
    SerializerComponent::Step("Left"),
    SerializerComponent::Space,
    SerializerComponent::EnumDisplay("Operator", &MATH_OPERATOR),
    SerializerComponent::Space,
    SerializerComponent::Step("Right"),
];

static SERIALIZER: StepSerializer = StepSerializer::Custom(CustomSerializer::new(&COMPONENTS));

#[derive(Debug)]
pub struct ApplyMathOperatorFactory;

pub static APPLY_MATH_OPERATOR: ApplyMathOperatorFactory = ApplyMathOperatorFactory;

#[async_trait]
impl StepFactory for ApplyMathOperatorFactory {
    fn name(&self) -> &'static str {
        NAME
    }

    fn summary(&self) -> &'static str {
        "Applies a math operator to two numbers"
    }

    fn properties(&self) -> &'static [PropertyDescriptor] {
        PROPERTIES
    }

    fn output_type_reference(
        &self,
        data: &FreezableStepData,
        context: &StepContext<'_>,
    ) -> Result<TypeReference, ErrorList> {
        let left = required_property_type(self, data, "Left", context);
        let right = required_property_type(self, data, "Right", context);
        match (left, right) {
            (Ok(left), Ok(right)) => Ok(TypeReference::multiple([left, right])),
            (Err(mut errors), Err(more)) => {
                errors.extend_unique(more);
                Err(errors)
            }
            (Err(errors), _) | (_, Err(errors)) => Err(errors),
        }
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
        apply(&operator.value, left, right)
    }
}

fn apply(operator: &str, left: Value, right: Value) -> Result<Value, RunError> {
    match (left, right) {
        (Value::Int(l), Value::Int(r)) => apply_int(operator, l, r).map(Value::Int),
        (Value::Int(l), Value::Double(r)) => apply_double(operator, l as f64, r),
        (Value::Double(l), Value::Int(r)) => apply_double(operator, l, r as f64),
        (Value::Double(l), Value::Double(r)) => apply_double(operator, l, r),
        (Value::Int(_) | Value::Double(_), other) | (other, _) => {
            Err(wrong_value(NAME, "number", &other))
        }
    }
}

fn apply_int(operator: &str, l: i64, r: i64) -> Result<i64, RunError> {
    let overflow = || RunError::Overflow(format!("{} {} {}", l, operator, r));

    match operator {
        "Add" => l.checked_add(r).ok_or_else(overflow),
        "Subtract" => l.checked_sub(r).ok_or_else(overflow),
        "Multiply" => l.checked_mul(r).ok_or_else(overflow),
        "Divide" if r == 0 => Err(RunError::DivideByZero),
        "Divide" => l.checked_div(r).ok_or_else(overflow),
        "Modulo" if r == 0 => Err(RunError::DivideByZero),
        "Modulo" => l.checked_rem(r).ok_or_else(overflow),
        "Power" => u32::try_from(r)
            .ok()
            .and_then(|exponent| l.checked_pow(exponent))
            .ok_or_else(overflow),
        other => Err(unknown_operator(other)),
    }
}

fn apply_double(operator: &str, l: f64, r: f64) -> Result<Value, RunError> {
    let result = match operator {
        "Add" => l + r,
        "Subtract" => l - r,
        "Multiply" => l * r,
        "Divide" if r == 0.0 => return Err(RunError::DivideByZero),
        "Divide" => l / r,
        "Modulo" if r == 0.0 => return Err(RunError::DivideByZero),
        "Modulo" => l % r,
        "Power" => l.powf(r),
        other => return Err(unknown_operator(other)),
    };
    Ok(Value::Double(result))
}

fn unknown_operator(operator: &str) -> RunError {
    RunError::WrongValueType {
        step: format!("{} ({})", NAME, operator),
        expected: "MathOperator",
        actual: "Enum",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_arithmetic() {
        assert_eq!(apply("Add", Value::Int(5), Value::Int(3)), Ok(Value::Int(8)));
        assert_eq!(apply("Power", Value::Int(2), Value::Int(10)), Ok(Value::Int(1024)));
        assert_eq!(apply("Modulo", Value::Int(7), Value::Int(4)), Ok(Value::Int(3)));
    }

    #[test]
    fn test_divide_by_zero() {
        assert_eq!(apply("Divide", Value::Int(1), Value::Int(0)), Err(RunError::DivideByZero));
        assert_eq!(
            apply("Divide", Value::Double(1.0), Value::Double(0.0)),
            Err(RunError::DivideByZero)
        );
    }

    #[test]
    fn test_overflow_is_an_error() {
        assert!(matches!(
            apply("Multiply", Value::Int(i64::MAX), Value::Int(2)),
            Err(RunError::Overflow(_))
        ));
        assert!(matches!(
            apply("Power", Value::Int(2), Value::Int(-1)),
            Err(RunError::Overflow(_))
        ));
    }

    #[test]
    fn test_mixed_operands_use_double() {
        assert_eq!(apply("Add", Value::Int(1), Value::Double(0.5)), Ok(Value::Double(1.5)));
    }
}
