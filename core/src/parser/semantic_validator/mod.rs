//! Semantic validation for SCL workflows
//!
//! Freezing reports everything that makes a workflow impossible to run.
//! The rules here look for workflows that freeze fine but are probably
//! wrong: a variable that is set and never read, a condition that is
//! always true, a division by a literal zero.
//!
//! # Usage
//!
//! ```ignore
//! use scl_core::parser::{parse_program, semantic_validator::validate_step};
//!
//! let step = parse_program(source)?;
//! for finding in validate_step(&step, StepFactoryStore::shared()) {
//!     eprintln!("{}", finding);
//! }
//! ```
//!
//! # Adding a New Rule
//!
//! 1. Create a new file in `semantic_validator/rules/`
//! 2. Implement `ValidationRule` for your struct
//! 3. Add it to the `Validator::new()` constructor

pub mod rules;

use crate::factory::{find_property, StepFactoryStore};
use crate::freezable::{CompoundFreezableStep, FreezableStep, StepMember};

// ============================================================================
// Validation Error Types
// ============================================================================

/// A finding produced by semantic analysis.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Path to the offending step, e.g. `Sequence.InitialSteps[1].Value`
    pub location: String,
    pub message: String,
    pub severity: Severity,
    /// Which rule produced this error
    pub rule_id: &'static str,
}

/// Severity levels for validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Must be fixed - the workflow will fail
    Error,
    /// Should probably be fixed - potential bug
    Warning,
    /// Suggestion for improvement
    Hint,
}

impl ValidationError {
    pub fn error(location: impl Into<String>, message: impl Into<String>, rule_id: &'static str) -> Self {
        Self::with_severity(Severity::Error, location, message, rule_id)
    }

    pub fn warning(location: impl Into<String>, message: impl Into<String>, rule_id: &'static str) -> Self {
        Self::with_severity(Severity::Warning, location, message, rule_id)
    }

    pub fn hint(location: impl Into<String>, message: impl Into<String>, rule_id: &'static str) -> Self {
        Self::with_severity(Severity::Hint, location, message, rule_id)
    }

    fn with_severity(
        severity: Severity,
        location: impl Into<String>,
        message: impl Into<String>,
        rule_id: &'static str,
    ) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
            severity,
            rule_id,
        }
    }

    /// Check if this is an error (not a warning or hint)
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Hint => "hint",
        };
        write!(
            f,
            "{} at {}: {} [{}]",
            severity, self.location, self.message, self.rule_id
        )
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// ValidationRule Trait
// ============================================================================

/// Trait that all validation rules must implement.
///
/// Rules see the unfrozen graph, so steps may still be unknown or carry
/// properties of the wrong kind. Rules skip what they don't understand.
pub trait ValidationRule: Send + Sync {
    /// Unique identifier for this rule (e.g., "unused-variable")
    fn id(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn validate(&self, step: &FreezableStep, store: &StepFactoryStore) -> Vec<ValidationError>;
}

// ============================================================================
// Validator - Runs All Rules
// ============================================================================

pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    /// Create a new validator with all built-in rules.
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(rules::DivisionByZeroRule),
                Box::new(rules::UnusedVariableRule),
                Box::new(rules::ConstantConditionRule),
            ],
        }
    }

    pub fn validate(&self, step: &FreezableStep, store: &StepFactoryStore) -> Vec<ValidationError> {
        self.rules
            .iter()
            .flat_map(|rule| rule.validate(step, store))
            .collect()
    }

    /// Registered rules as `(id, description)`
    pub fn rules(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.rules.iter().map(|r| (r.id(), r.description()))
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Graph Walking
// ============================================================================

/// Call `visit` for every compound step in the graph, depth first, with
/// its path from the root (`Sequence.InitialSteps[1].Value`).
pub(crate) fn walk(step: &FreezableStep, visit: &mut dyn FnMut(&CompoundFreezableStep, &str)) {
    if let FreezableStep::Compound(compound) = step {
        walk_from(step, &compound.step_name, visit);
    }
}

fn walk_from(
    step: &FreezableStep,
    location: &str,
    visit: &mut dyn FnMut(&CompoundFreezableStep, &str),
) {
    let FreezableStep::Compound(compound) = step else {
        return;
    };
    visit(compound, location);

    for (property, member) in compound.data.iter() {
        let here = format!("{}.{}", location, property);
        match member {
            StepMember::Variable(_) => {}
            StepMember::Argument(inner) => walk_from(inner, &here, visit),
            StepMember::ArgumentList(elements) => {
                for (index, element) in elements.iter().enumerate() {
                    walk_from(element, &format!("{}[{}]", here, index), visit);
                }
            }
        }
    }
}

/// The member a compound step supplies for `property`, resolving the
/// property's aliases through the registry.
pub(crate) fn member<'a>(
    compound: &'a CompoundFreezableStep,
    property: &str,
    store: &StepFactoryStore,
) -> Option<&'a StepMember> {
    let factory = store.get(&compound.step_name)?;
    let descriptor = find_property(factory.properties(), property)?;
    descriptor.names().find_map(|name| compound.data.get(name))
}

/// Canonical step name, or `None` for steps the registry doesn't know
pub(crate) fn canonical_name(compound: &CompoundFreezableStep, store: &StepFactoryStore) -> Option<&'static str> {
    store.get(&compound.step_name).map(|factory| factory.name())
}

// ============================================================================
// Public API
// ============================================================================

/// Run every built-in rule against an unfrozen step graph.
pub fn validate_step(step: &FreezableStep, store: &StepFactoryStore) -> Vec<ValidationError> {
    Validator::new().validate(step, store)
}

/// Check if a workflow has any validation errors (not just warnings).
pub fn has_errors(step: &FreezableStep, store: &StepFactoryStore) -> bool {
    validate_step(step, store).iter().any(|e| e.is_error())
}
