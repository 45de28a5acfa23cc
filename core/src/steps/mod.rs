//! Built-in steps
//!
//! Each step type lives in its own module with a `NAME` constant, a
//! property table and a unit-struct factory registered by
//! [`all_factories`].

pub mod append_string;
pub mod apply_boolean_operator;
pub mod apply_math_operator;
pub mod array;
pub mod combine;
pub mod compare;
pub mod element_at_index;
pub mod element_count;
pub mod for_each;
pub mod get_variable;
pub mod if_then;
pub mod not;
pub mod print;
pub mod sequence;
pub mod set_variable;
pub mod value_if;

#[cfg(test)]
mod tests;

use crate::errors::RunError;
use crate::factory::StepFactory;
use crate::types::Value;

/// Every built-in step factory
pub fn all_factories() -> [&'static dyn StepFactory; 15] {
    [
        &sequence::SEQUENCE,
        &set_variable::SET_VARIABLE,
        &get_variable::GET_VARIABLE,
        &not::NOT,
        &apply_math_operator::APPLY_MATH_OPERATOR,
        &apply_boolean_operator::APPLY_BOOLEAN_OPERATOR,
        &compare::COMPARE,
        &array::ARRAY,
        &element_count::ELEMENT_COUNT,
        &element_at_index::ELEMENT_AT_INDEX,
        &if_then::IF,
        &value_if::VALUE_IF,
        &for_each::FOR_EACH,
        &print::PRINT,
        &append_string::APPEND_STRING,
    ]
}

/// A value of the wrong runtime type reached `step`.
pub(crate) fn wrong_value(step: &str, expected: &'static str, actual: &Value) -> RunError {
    RunError::WrongValueType {
        step: step.to_string(),
        expected,
        actual: actual.type_name(),
    }
}
