//! Serializer tests

use super::yaml::{deserialize_yaml, serialize_yaml};
use super::*;
use crate::freezable::Configuration;
use crate::freeze::freeze;
use crate::parser::{parse_program, parse_step};
use crate::types::{EnumValue, VariableName};

fn store() -> &'static StepFactoryStore {
    StepFactoryStore::shared()
}

fn int(i: i64) -> StepMember {
    StepMember::argument(FreezableStep::Constant(ConstantValue::Int(i)))
}

/// Parse, serialize, and check the text comes back unchanged.
fn assert_round_trip(text: &str) {
    let step = parse_step(text).unwrap();
    assert_eq!(serialize_step(&step, store()).unwrap(), text);
}

// ============================================================================
// Function form
// ============================================================================

#[test]
fn test_function_form_sorts_properties() {
    let data = FreezableStepData::new().with("B", int(2)).with("A", int(1));
    let step = FreezableStep::compound("Mystery", data);
    assert_eq!(serialize_step(&step, store()).unwrap(), "Mystery(A = 1, B = 2)");
}

#[test]
fn test_function_form_nested_values() {
    assert_round_trip("Print(Value = 'hello')");
    assert_round_trip("Print(Value = <X> + 1)");
    assert_round_trip("ForEach(Action = Print(Value = <Element>), Array = [1, 2])");
}

#[test]
fn test_strings_needing_escapes_use_double_quotes() {
    let step = FreezableStep::Constant(ConstantValue::String("it's\n".to_string()));
    assert_eq!(serialize_step(&step, store()).unwrap(), r#""it's\n""#);
}

#[test]
fn test_canonical_name_is_written_for_aliases() {
    let step = parse_step("arraylength(Array = [1])").unwrap();
    assert_eq!(serialize_step(&step, store()).unwrap(), "ElementCount(Array = [1])");
}

// ============================================================================
// Compact forms
// ============================================================================

#[test]
fn test_compact_forms_round_trip() {
    assert_round_trip("<X>");
    assert_round_trip("<X> = 5");
    assert_round_trip("<A> + 1");
    assert_round_trip("<A> <= 3");
    assert_round_trip("<A> && true");
    assert_round_trip("not(<Flag>)");
    assert_round_trip("<List>[2]");
    assert_round_trip("[1, 'two', <Three>]");
}

#[test]
fn test_nested_infix_operands_are_parenthesised() {
    assert_round_trip("(1 + 2) * 3");
    assert_round_trip("1 - (2 - 3)");
    assert_round_trip("<Total> = 2 ^ 8");
    assert_round_trip("not(<A> == <B>)");
}

#[test]
fn test_compact_failure_falls_back_to_function_form() {
    let step = FreezableStep::compound(
        "ApplyMathOperator",
        FreezableStepData::new()
            .with("Left", int(1))
            .with("Operator", StepMember::Variable(VariableName::new("Op")))
            .with("Right", int(2)),
    );
    assert_eq!(
        serialize_step(&step, store()).unwrap(),
        "ApplyMathOperator(Left = 1, Operator = <Op>, Right = 2)"
    );
}

#[test]
fn test_frozen_step_serializes() {
    let step = parse_program("<Total> = 1 + 2").unwrap();
    let frozen = freeze(&step, store()).unwrap();
    assert_eq!(frozen.serialize(store()).unwrap(), "<Total> = 1 + 2");
}

#[test]
fn test_custom_deserializer_reads_compact_text() {
    let custom = store()
        .get("ApplyMathOperator")
        .and_then(|f| f.serializer().as_custom())
        .unwrap();

    let data = custom.try_deserialize("<A> + 3").unwrap().unwrap();
    assert_eq!(data.get("Left"), Some(&StepMember::Variable(VariableName::new("A"))));
    assert_eq!(
        data.get("Operator"),
        Some(&StepMember::argument(FreezableStep::Constant(ConstantValue::Enum(
            EnumValue::new("MathOperator", "Add")
        ))))
    );
    assert_eq!(data.get("Right"), Some(&int(3)));

    assert!(custom.try_deserialize("Print(Value = 1)").is_none());
}

static FLAG: CustomSerializer = CustomSerializer::new(&[
    SerializerComponent::Fixed("flag("),
    SerializerComponent::Boolean("Enabled"),
    SerializerComponent::Fixed(")"),
]);

fn enabled(member: StepMember) -> FreezableStepData {
    FreezableStepData::new().with("Enabled", member)
}

#[test]
fn test_boolean_component_constants() {
    let data = enabled(StepMember::argument(FreezableStep::Constant(ConstantValue::Bool(true))));
    assert_eq!(FLAG.serialize(&data, store()).unwrap(), "flag(true)");

    let read = FLAG.try_deserialize("flag(FALSE)").unwrap().unwrap();
    assert_eq!(
        read.get("Enabled"),
        Some(&StepMember::argument(FreezableStep::Constant(ConstantValue::Bool(false))))
    );
    assert!(FLAG.try_deserialize("flag(yes)").is_none());
}

#[test]
fn test_boolean_component_accepts_compound_steps() {
    let data = enabled(StepMember::argument(parse_step("<A> == 1").unwrap()));
    assert_eq!(FLAG.serialize(&data, store()).unwrap(), "flag((<A> == 1))");
}

#[test]
fn test_boolean_component_rejects_other_members() {
    let list = enabled(StepMember::ArgumentList(vec![FreezableStep::Constant(
        ConstantValue::Bool(true),
    )]));
    let err = FLAG.serialize(&list, store()).unwrap_err();
    assert!(matches!(err, SclError::CannotSerialize { ref property, .. } if property == "Enabled"));

    let number = enabled(int(1));
    assert!(matches!(
        FLAG.serialize(&number, store()),
        Err(SclError::CannotSerialize { .. })
    ));
}

#[test]
fn test_custom_deserializer_prefers_longest_operator() {
    let custom = store()
        .get("Compare")
        .and_then(|f| f.serializer().as_custom())
        .unwrap();
    let data = custom.try_deserialize("<A> <= 3").unwrap().unwrap();
    assert_eq!(
        data.get("Operator"),
        Some(&StepMember::argument(FreezableStep::Constant(ConstantValue::Enum(
            EnumValue::new("CompareOperator", "LessThanOrEqual")
        ))))
    );
}

#[test]
fn test_infix_detection() {
    let infix = |name: &str| store().get(name).unwrap().serializer().is_infix();
    assert!(infix("ApplyMathOperator"));
    assert!(infix("SetVariable"));
    assert!(!infix("Not"));
    assert!(!infix("Print"));
}

// ============================================================================
// Configuration
// ============================================================================

fn configured_print() -> FreezableStep {
    parse_step("Print(Value = 'hi')")
        .unwrap()
        .with_configuration(Configuration {
            priority: Some(3),
            ..Configuration::default()
        })
}

#[test]
fn test_configuration_blocks_text_form() {
    let err = serialize_step(&configured_print(), store()).unwrap_err();
    assert!(matches!(err, SclError::HasConfiguration { .. }));
}

#[test]
fn test_to_text_falls_back_to_yaml() {
    let text = to_text(&configured_print(), store()).unwrap();
    assert!(text.contains("Do: Print"), "{}", text);
    assert!(text.contains("Priority: 3"), "{}", text);
}

// ============================================================================
// YAML
// ============================================================================

#[test]
fn test_yaml_step_with_alias_property() {
    let step = deserialize_yaml("Do: SetVariable\nVariableName: <X>\nValue: 5\n", store()).unwrap();
    let expected = FreezableStep::compound(
        "SetVariable",
        FreezableStepData::new()
            .with("VariableName", StepMember::Variable(VariableName::new("X")))
            .with("Value", int(5)),
    );
    assert_eq!(step, expected);
    assert!(freeze(&step, store()).is_ok());
}

#[test]
fn test_yaml_reserved_keys_ignore_case() {
    let step = deserialize_yaml("do: Print\nconfig:\n  Priority: 2\nValue: 1\n", store()).unwrap();
    match step {
        FreezableStep::Compound(compound) => {
            assert_eq!(compound.step_name, "Print");
            assert_eq!(compound.configuration.and_then(|c| c.priority), Some(2));
            assert_eq!(compound.data.get("Value"), Some(&int(1)));
        }
        other => panic!("expected a step, got {:?}", other),
    }
}

#[test]
fn test_yaml_top_level_sequence_and_compact_strings() {
    let text = "- <X> = 2\n- Do: Print\n  Value: <X> * 3\n";
    let step = deserialize_yaml(text, store()).unwrap();
    let FreezableStep::Compound(sequence) = &step else {
        panic!("expected a sequence");
    };
    assert_eq!(sequence.step_name, "Sequence");
    let Some(StepMember::ArgumentList(items)) = sequence.data.get("InitialSteps") else {
        panic!("expected InitialSteps");
    };
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].step_name(), "SetVariable");
    assert!(freeze(&step, store()).is_ok());
}

#[test]
fn test_yaml_enum_and_plain_strings() {
    let text = "Do: ApplyMathOperator\nLeft: 1\nOperator: MathOperator.Multiply\nRight: 2\n";
    let step = deserialize_yaml(text, store()).unwrap();
    let FreezableStep::Compound(compound) = &step else {
        panic!("expected a step");
    };
    assert_eq!(
        compound.data.get("Operator"),
        Some(&StepMember::argument(FreezableStep::Constant(ConstantValue::Enum(
            EnumValue::new("MathOperator", "Multiply")
        ))))
    );

    let step = deserialize_yaml("Do: Print\nValue: hello there\n", store()).unwrap();
    let FreezableStep::Compound(compound) = &step else {
        panic!("expected a step");
    };
    assert_eq!(
        compound.data.get("Value"),
        Some(&StepMember::argument(FreezableStep::Constant(ConstantValue::String(
            "hello there".to_string()
        ))))
    );
}

#[test]
fn test_yaml_strings_that_look_like_steps_stay_strings() {
    for literal in ["<X>", "1 + 2", "MathOperator.Add", "'quoted'", "plain words"] {
        let value = FreezableStep::Constant(ConstantValue::String(literal.to_string()));
        let step = FreezableStep::compound(
            "Print",
            FreezableStepData::new().with("Value", StepMember::argument(value)),
        );
        let text = serialize_yaml(&step, store()).unwrap();
        assert_eq!(deserialize_yaml(&text, store()).unwrap(), step, "{}", text);
    }
}

#[test]
fn test_yaml_quoted_scalar_is_a_string() {
    let step = deserialize_yaml("Do: Print\nValue: \"'<X>'\"\n", store()).unwrap();
    let FreezableStep::Compound(compound) = &step else {
        panic!("expected a step");
    };
    assert_eq!(
        compound.data.get("Value"),
        Some(&StepMember::argument(FreezableStep::Constant(ConstantValue::String(
            "<X>".to_string()
        ))))
    );
}

#[test]
fn test_yaml_top_level_string_is_a_program() {
    let step = deserialize_yaml("\"<X> = 1\"", store()).unwrap();
    assert_eq!(step, parse_step("<X> = 1").unwrap());
}

#[test]
fn test_yaml_mapping_without_do_is_an_error() {
    let err = deserialize_yaml("Value: 1\n", store()).unwrap_err();
    assert!(matches!(err, SclError::Yaml(_)));
}

#[test]
fn test_yaml_written_program_reads_back() {
    let step = parse_program("<X> = 5\nPrint(Value = <X>)").unwrap();
    let text = serialize_yaml(&step, store()).unwrap();
    assert!(text.starts_with("- "), "{}", text);
    assert!(text.contains("Do: Print"), "{}", text);
    assert_eq!(deserialize_yaml(&text, store()).unwrap(), step);
}

#[test]
fn test_yaml_writes_arrays_as_sequences() {
    let step = parse_step("Print(Value = [1, 2])").unwrap();
    let value: serde_yaml::Value = serde_yaml::from_str(&serialize_yaml(&step, store()).unwrap()).unwrap();
    assert_eq!(value["Value"], serde_yaml::from_str::<serde_yaml::Value>("[1, 2]").unwrap());
}
