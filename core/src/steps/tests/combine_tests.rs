//! Tests for merging adjacent steps in sequences

use super::helpers::{freeze_program, run_with_settings, var};
use crate::state::RunSettings;
use crate::step::Step;
use crate::steps::combine::combine_steps;
use crate::types::ConstantValue;

fn initial_steps(step: &Step) -> &[Step] {
    step.as_compound()
        .expect("program should be a sequence")
        .steps("InitialSteps")
}

fn appended_text(step: &Step) -> Option<&str> {
    match step.as_compound()?.step("String")?.as_constant()? {
        ConstantValue::String(text) => Some(text),
        _ => None,
    }
}

#[test]
fn test_constant_appends_are_merged() {
    let step = freeze_program(
        "AppendString(Variable = <Log>, String = 'a')\n\
         AppendString(Variable = <Log>, String = 'b')\n\
         AppendString(Variable = <Log>, String = 'c')",
    );

    let combined = combine_steps(initial_steps(&step));
    assert_eq!(combined.len(), 1);
    assert_eq!(appended_text(&combined[0]), Some("abc"));
}

#[test]
fn test_appends_to_different_variables_are_kept() {
    let step = freeze_program(
        "AppendString(Variable = <A>, String = 'a')\n\
         AppendString(Variable = <B>, String = 'b')",
    );
    assert_eq!(combine_steps(initial_steps(&step)).len(), 2);
}

#[test]
fn test_other_steps_break_runs() {
    let step = freeze_program(
        "AppendString(Variable = <Log>, String = 'a')\n\
         Print(Value = 1)\n\
         AppendString(Variable = <Log>, String = 'b')\n\
         AppendString(Variable = <Log>, String = 'c')",
    );

    let combined = combine_steps(initial_steps(&step));
    assert_eq!(combined.len(), 3);
    assert_eq!(appended_text(&combined[0]), Some("a"));
    assert_eq!(appended_text(&combined[2]), Some("bc"));
}

#[test]
fn test_non_constant_appends_are_kept() {
    let step = freeze_program(
        "<Suffix> = 'x'\n\
         AppendString(Variable = <Log>, String = <Suffix>)\n\
         AppendString(Variable = <Log>, String = 'b')",
    );
    assert_eq!(combine_steps(initial_steps(&step)).len(), 3);
}

#[tokio::test]
async fn test_combining_does_not_change_results() {
    let source = "AppendString(Variable = <Log>, String = 'a')\n\
                  AppendString(Variable = <Log>, String = 'b')\n\
                  Print(Value = <Log>)";

    for combine in [true, false] {
        let settings = RunSettings {
            combine_steps: combine,
            ..RunSettings::default()
        };
        let (_, state) = run_with_settings(source, settings).await;
        assert_eq!(state.get::<String>(&var("Log")), Ok("ab".to_string()));
        assert_eq!(state.output(), ["ab"]);
    }
}
