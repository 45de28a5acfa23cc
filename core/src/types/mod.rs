//! Core value and type model
//!
//! - Variable names
//! - Type references and unification
//! - Constant and runtime values
//! - Enum tables

pub mod enums;
pub mod type_reference;
pub mod values;
pub mod variable_name;

pub use enums::EnumDefinition;
pub use type_reference::{unify, ActualType, ExpectedType, GenericKind, TypeReference, VariableTypes};
pub use values::{ConstantValue, EnumValue, Value};
pub use variable_name::VariableName;
