//! Tests for sequences, branches, loops and cancellation

use super::helpers::{eval, freeze_program, run_program, var};
use crate::errors::RunError;
use crate::state::StateMonad;
use crate::types::Value;
use tokio_util::sync::CancellationToken;

/* ===================== Sequence ===================== */

#[tokio::test]
async fn test_sequence_returns_final_step() {
    let source = "Sequence(InitialSteps = [<X> = 1, <X> = <X> + 1], FinalStep = <X> * 10)";
    assert_eq!(eval(source).await, Value::Int(20));
}

#[tokio::test]
async fn test_sequence_without_final_step_is_unit() {
    assert_eq!(eval("<X> = 1\n<Y> = 2").await, Value::Unit);
}

#[tokio::test]
async fn test_sequence_stops_at_first_error() {
    let (result, state) = run_program("<X> = 1\n<Y> = 1 / 0\n<Z> = 3").await;
    assert_eq!(result, Err(RunError::DivideByZero));
    assert_eq!(state.get::<i64>(&var("X")), Ok(1));
    assert!(state.get_variable(&var("Z")).is_err());
}

/* ===================== If / ValueIf ===================== */

#[tokio::test]
async fn test_if_runs_one_branch() {
    let source = "If(Condition = 1 < 2, Then = Print(Value = 'yes'), Else = Print(Value = 'no'))";
    let (_, state) = run_program(source).await;
    assert_eq!(state.output(), ["yes"]);

    let source = "If(Condition = 1 > 2, Then = Print(Value = 'yes'))";
    let (result, state) = run_program(source).await;
    assert_eq!(result, Ok(Value::Unit));
    assert!(state.output().is_empty());
}

#[tokio::test]
async fn test_value_if() {
    assert_eq!(eval("ValueIf(Condition = false, Then = 1, Else = 2)").await, Value::Int(2));
    assert_eq!(
        eval("ValueIf(Condition = 'a' == 'a', Then = 'same', Else = 'different')").await,
        Value::String("same".to_string())
    );
}

/* ===================== ForEach ===================== */

#[tokio::test]
async fn test_for_each_accumulates() {
    let source = r#"
<Total> = 0
ForEach(Array = [1, 2, 3], Action = <Total> = <Total> + <Element>)
"#;
    let (result, state) = run_program(source).await;
    assert_eq!(result, Ok(Value::Unit));
    assert_eq!(state.get::<i64>(&var("Total")), Ok(6));
    // The loop variable does not outlive the loop
    assert!(state.get_variable(&var("Element")).is_err());
}

#[tokio::test]
async fn test_for_each_custom_variable() {
    let source = "ForEach(Array = ['a', 'b'], Variable = <Letter>, Action = Print(Value = <Letter>))";
    let (_, state) = run_program(source).await;
    assert_eq!(state.output(), ["a", "b"]);
}

#[tokio::test]
async fn test_for_each_error_stops_loop() {
    let source = "ForEach(Array = [1, 0, 2], Action = Print(Value = 10 / <Element>))";
    let (result, state) = run_program(source).await;
    assert_eq!(result, Err(RunError::DivideByZero));
    assert_eq!(state.output(), ["10"]);
}

#[tokio::test]
async fn test_for_each_restores_outer_variable() {
    let source = r#"
<Element> = 100
<Total> = 0
ForEach(Array = [1, 2], Action = <Total> = <Total> + <Element>)
"#;
    let (result, state) = run_program(source).await;
    assert_eq!(result, Ok(Value::Unit));
    assert_eq!(state.get::<i64>(&var("Total")), Ok(3));
    assert_eq!(state.get::<i64>(&var("Element")), Ok(100));

    let source = r#"
<Element> = 7
ForEach(Array = [1, 0], Action = Print(Value = 10 / <Element>))
"#;
    let (result, state) = run_program(source).await;
    assert_eq!(result, Err(RunError::DivideByZero));
    assert_eq!(state.get::<i64>(&var("Element")), Ok(7));
}

/* ===================== Cancellation ===================== */

#[tokio::test]
async fn test_cancelled_before_start() {
    let step = freeze_program("Print(Value = 1)");
    let cancel = CancellationToken::new();
    cancel.cancel();

    let mut state = StateMonad::new();
    let result = step.run(&mut state, &cancel).await;
    assert_eq!(result, Err(RunError::Cancelled));
    assert!(state.output().is_empty());
}

#[test]
fn test_constant_ignores_cancellation() {
    let step = freeze_program("42");
    let cancel = CancellationToken::new();
    cancel.cancel();

    let mut state = StateMonad::new();
    let result = tokio_test::block_on(step.run(&mut state, &cancel));
    assert_eq!(result, Ok(Value::Int(42)));
}

#[test]
fn test_steps_can_run_twice() {
    let step = freeze_program("<X> = 2 * 21");
    let cancel = CancellationToken::new();

    for _ in 0..2 {
        let mut state = StateMonad::new();
        tokio_test::block_on(step.run(&mut state, &cancel)).unwrap();
        assert_eq!(state.get::<i64>(&var("X")), Ok(42));
    }
}
