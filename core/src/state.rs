//! Variable store and run settings used while executing steps

use crate::errors::RunError;
use crate::types::{EnumValue, Value, VariableName};
use std::collections::BTreeMap;

/// Options that change how a frozen tree is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSettings {
    /// Merge adjacent steps in sequences before running them
    pub combine_steps: bool,
    /// Echo `Print` output to stdout
    pub echo_output: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            combine_steps: true,
            echo_output: false,
        }
    }
}

/// Conversion from a runtime value to a Rust type
pub trait FromValue: Sized {
    const TYPE_NAME: &'static str;

    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for Value {
    const TYPE_NAME: &'static str = "Value";

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for bool {
    const TYPE_NAME: &'static str = "Bool";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    const TYPE_NAME: &'static str = "Int";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    const TYPE_NAME: &'static str = "Double";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Double(d) => Some(*d),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl FromValue for String {
    const TYPE_NAME: &'static str = "String";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromValue for EnumValue {
    const TYPE_NAME: &'static str = "Enum";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Enum(e) => Some(e.clone()),
            _ => None,
        }
    }
}

impl FromValue for Vec<Value> {
    const TYPE_NAME: &'static str = "Array";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => Some(items.clone()),
            _ => None,
        }
    }
}

/// Mutable state threaded through a run: variables and captured output.
#[derive(Debug, Default)]
pub struct StateMonad {
    variables: BTreeMap<VariableName, Value>,
    output: Vec<String>,
    settings: RunSettings,
}

impl StateMonad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: RunSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    pub fn get_variable(&self, name: &VariableName) -> Result<&Value, RunError> {
        self.variables
            .get(name)
            .ok_or_else(|| RunError::VariableNotSet(name.clone()))
    }

    /// Read a variable as a specific type.
    pub fn get<T: FromValue>(&self, name: &VariableName) -> Result<T, RunError> {
        let value = self.get_variable(name)?;
        T::from_value(value).ok_or_else(|| RunError::WrongValueType {
            step: name.to_string(),
            expected: T::TYPE_NAME,
            actual: value.type_name(),
        })
    }

    pub fn set_variable(&mut self, name: VariableName, value: Value) {
        tracing::trace!(variable = %name, %value, "set variable");
        self.variables.insert(name, value);
    }

    pub fn remove_variable(&mut self, name: &VariableName) -> Option<Value> {
        self.variables.remove(name)
    }

    /// All variables, ordered by name
    pub fn variables(&self) -> &BTreeMap<VariableName, Value> {
        &self.variables
    }

    /// Record a line of output.
    pub fn print(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::info!(target: "scl::print", "{}", line);
        if self.settings.echo_output {
            println!("{}", line);
        }
        self.output.push(line);
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// Variables as a JSON object
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .variables
            .iter()
            .map(|(name, value)| (name.name().to_string(), value.to_json()))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_get() {
        let mut state = StateMonad::new();
        state.set_variable(VariableName::new("X"), Value::Int(5));

        assert_eq!(state.get::<i64>(&VariableName::new("X")), Ok(5));
        assert_eq!(state.get::<f64>(&VariableName::new("X")), Ok(5.0));
        assert!(matches!(
            state.get::<String>(&VariableName::new("X")),
            Err(RunError::WrongValueType { expected: "String", .. })
        ));
        assert_eq!(
            state.get::<i64>(&VariableName::new("Y")),
            Err(RunError::VariableNotSet(VariableName::new("Y")))
        );
    }

    #[test]
    fn test_state_as_json() {
        let mut state = StateMonad::new();
        state.set_variable(VariableName::new("b"), Value::Bool(true));
        state.set_variable(VariableName::new("a"), Value::Array(vec![Value::Int(1)]));
        assert_eq!(state.to_json(), serde_json::json!({"a": [1], "b": true}));
    }
}
