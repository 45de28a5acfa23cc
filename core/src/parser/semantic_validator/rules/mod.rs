//! Validation Rules
//!
//! Each file in this module contains one validation rule:
//!
//! - `division_by_zero.rs` - Dividing by a literal zero
//! - `unused_variable.rs` - Variables set but never read
//! - `constant_condition.rs` - Branches whose condition is a literal

mod constant_condition;
mod division_by_zero;
mod unused_variable;

pub use constant_condition::ConstantConditionRule;
pub use division_by_zero::DivisionByZeroRule;
pub use unused_variable::UnusedVariableRule;
