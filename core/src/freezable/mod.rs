//! The unresolved step graph
//!
//! A [`FreezableStep`] is what the parser and the YAML reader produce: a
//! constant, or the name of a step type plus its untyped property map.
//! Nothing here is checked against the step registry; that happens when
//! the graph is frozen.

pub mod data;
pub mod member;

pub use data::FreezableStepData;
pub use member::{MemberKind, StepMember};

use crate::steps;
use crate::types::{ConstantValue, VariableName};
use serde::{Deserialize, Serialize};

/// Scheduling hints attached to a step. Configuration cannot be written in
/// the compact grammar, so a configured step is always serialized as YAML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Configuration {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub target_machine_tags: Vec<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub do_not_split: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
}

/// An unfrozen step with a step type name and its properties.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundFreezableStep {
    pub step_name: String,
    pub data: FreezableStepData,
    pub configuration: Option<Configuration>,
}

impl CompoundFreezableStep {
    pub fn new(step_name: impl Into<String>, data: FreezableStepData) -> Self {
        Self {
            step_name: step_name.into(),
            data,
            configuration: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FreezableStep {
    Constant(ConstantValue),
    Compound(CompoundFreezableStep),
}

impl FreezableStep {
    pub fn constant(value: ConstantValue) -> Self {
        FreezableStep::Constant(value)
    }

    pub fn compound(step_name: impl Into<String>, data: FreezableStepData) -> Self {
        FreezableStep::Compound(CompoundFreezableStep::new(step_name, data))
    }

    pub fn get_variable(name: VariableName) -> Self {
        Self::compound(
            steps::get_variable::NAME,
            FreezableStepData::new().with("Variable", StepMember::Variable(name)),
        )
    }

    pub fn array(elements: Vec<FreezableStep>) -> Self {
        Self::compound(
            steps::array::NAME,
            FreezableStepData::new().with("Elements", StepMember::ArgumentList(elements)),
        )
    }

    /// Wrap top-level steps in a `Sequence`. A single step is returned as-is.
    pub fn sequence(mut steps: Vec<FreezableStep>) -> Self {
        if steps.len() == 1 {
            return steps.remove(0);
        }
        Self::compound(
            steps::sequence::NAME,
            FreezableStepData::new().with("InitialSteps", StepMember::ArgumentList(steps)),
        )
    }

    pub fn with_configuration(self, configuration: Configuration) -> Self {
        match self {
            FreezableStep::Compound(mut compound) => {
                compound.configuration = Some(configuration);
                FreezableStep::Compound(compound)
            }
            constant => constant,
        }
    }

    /// Step type name, or the constant's type for constants
    pub fn step_name(&self) -> String {
        match self {
            FreezableStep::Constant(value) => value.actual_type().to_string(),
            FreezableStep::Compound(compound) => compound.step_name.clone(),
        }
    }
}
