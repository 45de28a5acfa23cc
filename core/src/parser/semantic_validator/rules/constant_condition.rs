//! Rule: Constant Condition
//!
//! Hints when `If` or `ValueIf` is given a literal `true` or `false`, so
//! one branch can never run.

use crate::factory::StepFactoryStore;
use crate::freezable::{FreezableStep, StepMember};
use crate::steps::{if_then, value_if};
use crate::types::ConstantValue;

use super::super::{canonical_name, member, walk, ValidationError, ValidationRule};

pub struct ConstantConditionRule;

impl ValidationRule for ConstantConditionRule {
    fn id(&self) -> &'static str {
        "constant-condition"
    }

    fn description(&self) -> &'static str {
        "Branch conditions should not be literals"
    }

    fn validate(&self, step: &FreezableStep, store: &StepFactoryStore) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        walk(step, &mut |compound, location| {
            if !matches!(
                canonical_name(compound, store),
                Some(if_then::NAME) | Some(value_if::NAME)
            ) {
                return;
            }
            let Some(StepMember::Argument(condition)) = member(compound, "Condition", store) else {
                return;
            };
            if let FreezableStep::Constant(ConstantValue::Bool(value)) = condition.as_ref() {
                errors.push(ValidationError::hint(
                    location,
                    format!("Condition is always {}", value),
                    self.id(),
                ));
            }
        });

        errors
    }
}
