//! Error types
//!
//! Parse errors are returned one at a time. Type-resolution, binding and
//! serialization errors are collected into an [`ErrorList`] so that every
//! problem in a step graph is reported in one pass.

use crate::types::VariableName;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SclError {
    /* ---------- parse ---------- */
    #[error("Syntax error at line {line}, col {col}: could not parse '{fragment}'")]
    Syntax {
        fragment: String,
        line: usize,
        col: usize,
    },

    #[error("Invalid literal '{fragment}': {message}")]
    InvalidLiteral { fragment: String, message: String },

    /* ---------- type resolution ---------- */
    #[error("'{0}' is not the name of a step")]
    UnknownStep(String),

    #[error("'{0}' is not a recognized enum type")]
    UnknownEnumType(String),

    #[error("'{value}' is not a member of enum '{enum_type}'")]
    UnknownEnumValue { enum_type: String, value: String },

    #[error("Could not infer type: children have different types ({first} and {second})")]
    TypesDisagree { first: String, second: String },

    #[error("Could not resolve the type of variable {0}")]
    UnresolvedVariable(VariableName),

    #[error("Variable {variable} is assigned both {first} and {second}")]
    ConflictingVariableTypes {
        variable: VariableName,
        first: String,
        second: String,
    },

    #[error("Property '{property}' of '{step}' must be generic, but has type {actual}")]
    NotGeneric {
        step: String,
        property: String,
        actual: String,
    },

    #[error("Property '{property}' of '{step}' should have type {expected}, but has type {actual}")]
    WrongType {
        step: String,
        property: String,
        expected: String,
        actual: String,
    },

    /* ---------- binding ---------- */
    #[error("Property '{property}' does not exist on step '{step}'")]
    UnexpectedProperty { step: String, property: String },

    #[error("Property '{property}' of '{step}' was not set")]
    MissingProperty { step: String, property: String },

    #[error("Property '{property}' of '{step}' was set more than once")]
    DuplicateProperty { step: String, property: String },

    #[error("Property '{property}' of '{step}' should be {expected}, not {actual}")]
    WrongMemberKind {
        step: String,
        property: String,
        expected: String,
        actual: String,
    },

    /* ---------- serialization ---------- */
    #[error("Cannot serialize property '{property}' as {expected}")]
    CannotSerialize { property: String, expected: String },

    #[error("Step '{step}' has configuration and cannot use its compact form")]
    HasConfiguration { step: String },

    #[error("'{text}' does not match the compact form of '{step}'")]
    CannotDeserialize { step: String, text: String },

    #[error("YAML error: {0}")]
    Yaml(String),
}

impl From<serde_yaml::Error> for SclError {
    fn from(err: serde_yaml::Error) -> Self {
        SclError::Yaml(err.to_string())
    }
}

/// One or more errors collected while processing a step graph.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorList(Vec<SclError>);

impl ErrorList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, error: SclError) {
        self.0.push(error);
    }

    /// Record an error unless an identical one is already present. Output
    /// type computation and binding can both notice the same problem.
    pub fn push_unique(&mut self, error: SclError) {
        if !self.0.contains(&error) {
            self.0.push(error);
        }
    }

    pub fn extend_unique(&mut self, errors: impl IntoIterator<Item = SclError>) {
        for error in errors {
            self.push_unique(error);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn errors(&self) -> &[SclError] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SclError> {
        self.0.iter()
    }

    /// `Ok(value)` when no errors were recorded
    pub fn into_result<T>(self, value: T) -> Result<T, ErrorList> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorList {}

impl From<SclError> for ErrorList {
    fn from(error: SclError) -> Self {
        Self(vec![error])
    }
}

impl FromIterator<SclError> for ErrorList {
    fn from_iter<I: IntoIterator<Item = SclError>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<SclError> for ErrorList {
    fn extend<I: IntoIterator<Item = SclError>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for ErrorList {
    type Item = SclError;
    type IntoIter = std::vec::IntoIter<SclError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Failure while executing a frozen step
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RunError {
    #[error("Variable {0} has not been set")]
    VariableNotSet(VariableName),

    #[error("Step '{step}' expected a {expected} but got a {actual}")]
    WrongValueType {
        step: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Step '{step}' is missing property '{property}'")]
    MissingProperty { step: String, property: String },

    #[error("Division by zero")]
    DivideByZero,

    #[error("Index {index} is out of range for an array of length {length}")]
    IndexOutOfRange { index: i64, length: usize },

    #[error("Arithmetic overflow in '{0}'")]
    Overflow(String),

    #[error("Execution was cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_list_display_one_per_line() {
        let errors: ErrorList = vec![
            SclError::UnknownStep("Foo".to_string()),
            SclError::MissingProperty {
                step: "Print".to_string(),
                property: "Value".to_string(),
            },
        ]
        .into_iter()
        .collect();

        let text = errors.to_string();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("'Foo' is not the name of a step"));
        assert!(text.contains("'Value' of 'Print' was not set"));
    }

    #[test]
    fn test_into_result() {
        assert_eq!(ErrorList::new().into_result(5), Ok(5));
        let err = ErrorList::from(SclError::UnknownEnumType("Colour".to_string()));
        assert!(err.into_result(5).is_err());
    }
}
