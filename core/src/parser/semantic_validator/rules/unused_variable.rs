//! Rule: Unused Variable
//!
//! Reports a warning when a variable is assigned but never read.
//!
//! ```scl
//! <Total> = 5        # warning: <Total> is set but never read
//! Print(Value = 1)
//! ```
//!
//! Names starting with `_` are exempt. `AppendString` reads the variable it
//! appends to, so it counts as a use.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::factory::StepFactoryStore;
use crate::freezable::{FreezableStep, StepMember};
use crate::steps::{for_each, set_variable};
use crate::types::VariableName;

use super::super::{canonical_name, member, walk, ValidationError, ValidationRule};

pub struct UnusedVariableRule;

impl ValidationRule for UnusedVariableRule {
    fn id(&self) -> &'static str {
        "unused-variable"
    }

    fn description(&self) -> &'static str {
        "Variables should be read after they are set"
    }

    fn validate(&self, step: &FreezableStep, store: &StepFactoryStore) -> Vec<ValidationError> {
        // First assignment wins the reported location
        let mut assignments: IndexMap<VariableName, String> = IndexMap::new();
        let mut reads: HashSet<VariableName> = HashSet::new();

        walk(step, &mut |compound, location| {
            let step_name = canonical_name(compound, store);
            let declared = match step_name {
                Some(set_variable::NAME) | Some(for_each::NAME) => member(compound, "Variable", store),
                _ => None,
            };

            match declared {
                Some(StepMember::Variable(name)) => {
                    assignments
                        .entry(name.clone())
                        .or_insert_with(|| location.to_string());
                }
                None if step_name == Some(for_each::NAME) => {
                    assignments
                        .entry(VariableName::new("Element"))
                        .or_insert_with(|| location.to_string());
                }
                _ => {}
            }

            for (_, value) in compound.data.iter() {
                if let StepMember::Variable(name) = value {
                    if !declared.is_some_and(|d| std::ptr::eq(d, value)) {
                        reads.insert(name.clone());
                    }
                }
            }
        });

        assignments
            .into_iter()
            .filter(|(name, _)| !name.name().starts_with('_') && !reads.contains(name))
            .map(|(name, location)| {
                ValidationError::warning(
                    location,
                    format!("Variable {} is set but never read", name),
                    self.id(),
                )
            })
            .collect()
    }
}
