//! Rule: Division By Zero
//!
//! `ApplyMathOperator` with `/` or `%` and a literal zero on the right
//! always fails at run time.

use crate::factory::StepFactoryStore;
use crate::freezable::{FreezableStep, StepMember};
use crate::steps::apply_math_operator;
use crate::types::ConstantValue;

use super::super::{canonical_name, member, walk, ValidationError, ValidationRule};

pub struct DivisionByZeroRule;

impl ValidationRule for DivisionByZeroRule {
    fn id(&self) -> &'static str {
        "division-by-zero"
    }

    fn description(&self) -> &'static str {
        "Division and modulo by a literal zero"
    }

    fn validate(&self, step: &FreezableStep, store: &StepFactoryStore) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        walk(step, &mut |compound, location| {
            if canonical_name(compound, store) != Some(apply_math_operator::NAME) {
                return;
            }

            let operator = match member(compound, "Operator", store) {
                Some(StepMember::Argument(step)) => match step.as_ref() {
                    FreezableStep::Constant(ConstantValue::Enum(e)) => e.value.clone(),
                    _ => return,
                },
                _ => return,
            };
            if !(operator.eq_ignore_ascii_case("Divide") || operator.eq_ignore_ascii_case("Modulo")) {
                return;
            }

            let zero = match member(compound, "Right", store) {
                Some(StepMember::Argument(step)) => matches!(
                    step.as_ref(),
                    FreezableStep::Constant(ConstantValue::Int(0))
                ) || matches!(
                    step.as_ref(),
                    FreezableStep::Constant(ConstantValue::Double(d)) if *d == 0.0
                ),
                _ => false,
            };

            if zero {
                errors.push(ValidationError::error(
                    location,
                    format!("{} by zero", operator),
                    self.id(),
                ));
            }
        });

        errors
    }
}
