//! Tests for variable steps, arrays and printing

use super::helpers::{eval, run_program, var};
use crate::errors::RunError;
use crate::factory::StepFactoryStore;
use crate::freeze::freeze;
use crate::serialization::yaml::deserialize_yaml;
use crate::state::StateMonad;
use crate::types::Value;
use maplit::btreemap;
use tokio_util::sync::CancellationToken;

/* ===================== SetVariable / GetVariable ===================== */

#[tokio::test]
async fn test_set_then_get() {
    let (result, state) = run_program("<X> = 5\n<Y> = <X> * 2").await;
    assert_eq!(result, Ok(Value::Unit));
    assert_eq!(
        *state.variables(),
        btreemap! {
            var("X") => Value::Int(5),
            var("Y") => Value::Int(10),
        }
    );
}

#[tokio::test]
async fn test_yaml_set_variable_with_alias() {
    let store = StepFactoryStore::shared();
    let step = deserialize_yaml("Do: SetVariable\nVariableName: <X>\nValue: 5\n", store).unwrap();
    let frozen = freeze(&step, store).unwrap();

    let mut state = StateMonad::new();
    let result = frozen.run(&mut state, &CancellationToken::new()).await;

    assert_eq!(result, Ok(Value::Unit));
    assert_eq!(*state.variables(), btreemap! { var("X") => Value::Int(5) });
    assert_eq!(state.to_json(), serde_json::json!({ "X": 5 }));
}

#[tokio::test]
async fn test_reassignment_keeps_last_value() {
    let (_, state) = run_program("<X> = 1\n<X> = <X> + 1\n<X> = <X> + 1").await;
    assert_eq!(state.get::<i64>(&var("X")), Ok(3));
}

/* ===================== Arrays ===================== */

#[tokio::test]
async fn test_array_and_count() {
    assert_eq!(
        eval("[1, 2, 3]").await,
        Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
    );
    assert_eq!(eval("ElementCount(Array = [1, 2, 3])").await, Value::Int(3));
    assert_eq!(eval("ArrayLength(Array = [])").await, Value::Int(0));
}

#[tokio::test]
async fn test_element_at_index() {
    assert_eq!(eval("[10, 20, 30][1]").await, Value::Int(20));
    assert_eq!(eval("[[1, 2], [3]][0][1]").await, Value::Int(2));

    let (_, state) = run_program("<L> = ['a', 'b']\n<S> = <L>[1]").await;
    assert_eq!(state.get::<String>(&var("S")), Ok("b".to_string()));
}

#[tokio::test]
async fn test_element_at_index_out_of_range() {
    let (result, _) = run_program("[1][3]").await;
    assert_eq!(result, Err(RunError::IndexOutOfRange { index: 3, length: 1 }));

    let (result, _) = run_program("[1][-1]").await;
    assert_eq!(result, Err(RunError::IndexOutOfRange { index: -1, length: 1 }));
}

/* ===================== Print / AppendString ===================== */

#[tokio::test]
async fn test_print_captures_output() {
    let (_, state) = run_program("Print(Value = 'hello')\nPrint(Value = 1 + 1)\nPrint(Value = [1, 2])").await;
    assert_eq!(state.output(), ["hello", "2", "[1, 2]"]);
}

#[tokio::test]
async fn test_append_string_starts_empty() {
    let source = r#"
AppendString(Variable = <Log>, String = 'a')
AppendString(Variable = <Log>, String = 'b')
"#;
    let (_, state) = run_program(source).await;
    assert_eq!(state.get::<String>(&var("Log")), Ok("ab".to_string()));
}

#[tokio::test]
async fn test_append_string_to_existing_value() {
    let source = r#"
<Log> = 'start:'
AppendString(Variable = <Log>, String = 'x')
"#;
    let (_, state) = run_program(source).await;
    assert_eq!(state.get::<String>(&var("Log")), Ok("start:x".to_string()));
}
