//! Test helpers for step execution tests
//!
//! Common utilities for parsing, freezing and running programs

use crate::errors::RunError;
use crate::factory::StepFactoryStore;
use crate::freeze::freeze;
use crate::parser::parse_program;
use crate::state::{RunSettings, StateMonad};
use crate::step::Step;
use crate::types::{Value, VariableName};
use tokio_util::sync::CancellationToken;

/// Parse and freeze a program, panicking with every freeze error.
pub fn freeze_program(source: &str) -> Step {
    let step = parse_program(source).expect("Parse program failed");
    freeze(&step, StepFactoryStore::shared())
        .unwrap_or_else(|errors| panic!("Freeze failed:\n{}", errors))
}

/// Run a program with default settings, returning the result and the
/// final state.
pub async fn run_program(source: &str) -> (Result<Value, RunError>, StateMonad) {
    run_with_settings(source, RunSettings::default()).await
}

pub async fn run_with_settings(
    source: &str,
    settings: RunSettings,
) -> (Result<Value, RunError>, StateMonad) {
    let step = freeze_program(source);
    let mut state = StateMonad::with_settings(settings);
    let result = step.run(&mut state, &CancellationToken::new()).await;
    (result, state)
}

/// Run a program that must succeed and return its value.
pub async fn eval(source: &str) -> Value {
    let (result, _) = run_program(source).await;
    result.unwrap_or_else(|e| panic!("Run of {:?} failed: {}", source, e))
}

pub fn var(name: &str) -> VariableName {
    VariableName::new(name)
}
