//! Variable type inference for a step graph
//!
//! Before anything is frozen, the whole graph is scanned for steps that
//! assign variables. Each assignment's type reference is resolved against
//! the types found so far, repeating until nothing changes, so that
//! `<Y> = <X>` resolves regardless of the order the steps appear in.

use crate::errors::{ErrorList, SclError};
use crate::factory::{StepFactory, StepFactoryStore};
use crate::freezable::{FreezableStep, FreezableStepData, StepMember};
use crate::types::{unify, TypeReference, VariableName, VariableTypes};
use std::collections::HashMap;

/// Store plus the resolved type of every variable assigned in the graph.
#[derive(Debug, Clone)]
pub struct StepContext<'a> {
    store: &'a StepFactoryStore,
    variables: HashMap<VariableName, TypeReference>,
}

impl VariableTypes for StepContext<'_> {
    fn variable_type(&self, name: &VariableName) -> Option<TypeReference> {
        self.variables.get(name).cloned()
    }
}

impl<'a> StepContext<'a> {
    /// A context with no known variables
    pub fn new(store: &'a StepFactoryStore) -> Self {
        Self {
            store,
            variables: HashMap::new(),
        }
    }

    /// Declare a variable that is set outside the graph.
    pub fn with_variable(mut self, name: VariableName, reference: TypeReference) -> Self {
        self.variables.insert(name, reference);
        self
    }

    /// Scan `step` for variable assignments and resolve their types.
    pub fn try_create(store: &'a StepFactoryStore, step: &FreezableStep) -> Result<Self, ErrorList> {
        let (context, errors) = Self::new(store).infer_variables(step);
        errors.into_result(context)
    }

    pub fn store(&self) -> &'a StepFactoryStore {
        self.store
    }

    pub fn variable_types(&self) -> &HashMap<VariableName, TypeReference> {
        &self.variables
    }

    pub fn resolve(&self, reference: &TypeReference) -> Result<TypeReference, SclError> {
        reference.try_resolve(self)
    }

    /// Add the variables assigned inside `step` to this context. Conflicting
    /// assignments are returned as errors; the first type seen is kept.
    pub fn infer_variables(mut self, step: &FreezableStep) -> (Self, ErrorList) {
        let mut nodes = Vec::new();
        collect_compound_nodes(self.store, step, &mut nodes);

        let mut errors = ErrorList::new();
        let mut settled = vec![false; nodes.len()];

        // At most one pass per node
        for _ in 0..=nodes.len() {
            let mut progress = false;

            for (index, (factory, data)) in nodes.iter().enumerate() {
                if settled[index] {
                    continue;
                }

                let assignments = match factory.variables_set(data, &self) {
                    Ok(assignments) => assignments,
                    Err(list) if list.iter().all(is_unresolved) => continue,
                    Err(_) => {
                        // Reported again, with context, when the step is frozen
                        settled[index] = true;
                        continue;
                    }
                };

                let mut complete = true;
                for (name, reference) in assignments {
                    match self.resolve(&reference) {
                        Ok(resolved) => progress |= self.assign(name, resolved, &mut errors),
                        Err(SclError::UnresolvedVariable(_)) => complete = false,
                        Err(_) => {}
                    }
                }

                if complete {
                    settled[index] = true;
                    progress = true;
                }
            }

            if !progress {
                break;
            }
        }

        (self, errors)
    }

    /// Record a resolved type. Returns whether the context changed.
    fn assign(&mut self, name: VariableName, resolved: TypeReference, errors: &mut ErrorList) -> bool {
        match self.variables.get(&name) {
            None => {
                tracing::debug!(variable = %name, r#type = %resolved, "inferred variable type");
                self.variables.insert(name, resolved);
                true
            }
            Some(existing) => match unify(&[existing.clone(), resolved.clone()]) {
                Ok(unified) if &unified == existing => false,
                Ok(unified) => {
                    tracing::debug!(variable = %name, r#type = %unified, "refined variable type");
                    self.variables.insert(name, unified);
                    true
                }
                Err(_) => {
                    errors.push_unique(SclError::ConflictingVariableTypes {
                        variable: name,
                        first: existing.to_string(),
                        second: resolved.to_string(),
                    });
                    false
                }
            },
        }
    }
}

fn is_unresolved(error: &SclError) -> bool {
    matches!(error, SclError::UnresolvedVariable(_))
}

/// Every compound node in the graph whose step type is registered.
fn collect_compound_nodes<'s>(
    store: &StepFactoryStore,
    step: &'s FreezableStep,
    nodes: &mut Vec<(&'static dyn StepFactory, &'s FreezableStepData)>,
) {
    let FreezableStep::Compound(compound) = step else {
        return;
    };

    if let Some(factory) = store.get(&compound.step_name) {
        nodes.push((factory, &compound.data));
    }

    for (_, member) in compound.data.iter() {
        match member {
            StepMember::Variable(_) => {}
            StepMember::Argument(child) => collect_compound_nodes(store, child, nodes),
            StepMember::ArgumentList(children) => {
                for child in children {
                    collect_compound_nodes(store, child, nodes);
                }
            }
        }
    }
}
