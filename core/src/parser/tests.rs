//! Parser tests

use super::*;
use crate::freezable::CompoundFreezableStep;

// ============================================================================
// Helpers
// ============================================================================

fn parse(source: &str) -> FreezableStep {
    parse_step(source).unwrap_or_else(|e| panic!("failed to parse {:?}: {}", source, e))
}

fn constant(value: ConstantValue) -> FreezableStep {
    FreezableStep::Constant(value)
}

fn int(i: i64) -> StepMember {
    StepMember::argument(constant(ConstantValue::Int(i)))
}

fn operator(definition: &EnumDefinition, value: &str) -> StepMember {
    StepMember::argument(constant(ConstantValue::Enum(EnumValue::new(
        definition.name,
        value,
    ))))
}

fn variable(name: &str) -> StepMember {
    StepMember::argument(FreezableStep::get_variable(VariableName::new(name)))
}

fn compound(step: &FreezableStep) -> &CompoundFreezableStep {
    match step {
        FreezableStep::Compound(compound) => compound,
        other => panic!("expected a compound step, got {:?}", other),
    }
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_numbers() {
    assert_eq!(parse("42"), constant(ConstantValue::Int(42)));
    assert_eq!(parse("-7"), constant(ConstantValue::Int(-7)));
    assert_eq!(parse("2.5"), constant(ConstantValue::Double(2.5)));
}

#[test]
fn test_integer_overflow_is_invalid_literal() {
    let err = parse_step("99999999999999999999").unwrap_err();
    assert!(matches!(err, SclError::InvalidLiteral { .. }));
}

#[test]
fn test_booleans_ignore_case() {
    assert_eq!(parse("true"), constant(ConstantValue::Bool(true)));
    assert_eq!(parse("FALSE"), constant(ConstantValue::Bool(false)));
}

#[test]
fn test_single_quoted_string_is_verbatim() {
    assert_eq!(
        parse(r"'a\nb'"),
        constant(ConstantValue::String(r"a\nb".to_string()))
    );
}

#[test]
fn test_double_quoted_string_unescapes() {
    assert_eq!(
        parse(r#""line\none \"quoted\"""#),
        constant(ConstantValue::String("line\none \"quoted\"".to_string()))
    );
}

#[test]
fn test_bad_escape_is_invalid_literal() {
    let err = parse_step(r#""\q""#).unwrap_err();
    assert!(matches!(err, SclError::InvalidLiteral { .. }));
}

#[test]
fn test_enum_constant() {
    assert_eq!(
        parse("MathOperator.Add"),
        constant(ConstantValue::Enum(EnumValue::new("MathOperator", "Add")))
    );
}

// ============================================================================
// Variables and assignment
// ============================================================================

#[test]
fn test_bare_variable_is_get_variable() {
    assert_eq!(parse("<Foo>"), FreezableStep::get_variable(VariableName::new("Foo")));
}

#[test]
fn test_member_keeps_variable_reference() {
    assert_eq!(
        parse_member("<Foo>").unwrap(),
        StepMember::Variable(VariableName::new("Foo"))
    );
}

#[test]
fn test_assignment() {
    let step = parse("<Total> = 5");
    let expected = FreezableStep::compound(
        "SetVariable",
        FreezableStepData::new()
            .with("Variable", StepMember::Variable(VariableName::new("Total")))
            .with("Value", int(5)),
    );
    assert_eq!(step, expected);
}

#[test]
fn test_assignment_is_not_equality() {
    let step = parse("<Total> == 5");
    assert_eq!(compound(&step).step_name, "Compare");
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_math_operator() {
    let step = parse("5 + 3");
    let expected = FreezableStep::compound(
        "ApplyMathOperator",
        FreezableStepData::new()
            .with("Left", int(5))
            .with("Operator", operator(&MATH_OPERATOR, "Add"))
            .with("Right", int(3)),
    );
    assert_eq!(step, expected);
}

#[test]
fn test_operand_variables_become_steps() {
    let step = parse("<A> && <B>");
    let data = &compound(&step).data;
    assert_eq!(compound(&step).step_name, "ApplyBooleanOperator");
    assert_eq!(data.get("Left"), Some(&variable("A")));
    assert_eq!(data.get("Operator"), Some(&operator(&BOOLEAN_OPERATOR, "And")));
    assert_eq!(data.get("Right"), Some(&variable("B")));
}

#[test]
fn test_every_compare_operator() {
    for (text, value) in [
        ("==", "Equals"),
        ("!=", "NotEquals"),
        ("<", "LessThan"),
        ("<=", "LessThanOrEqual"),
        (">", "GreaterThan"),
        (">=", "GreaterThanOrEqual"),
    ] {
        let step = parse(&format!("1 {} 2", text));
        assert_eq!(
            compound(&step).data.get("Operator"),
            Some(&operator(&COMPARE_OPERATOR, value)),
            "operator {}",
            text
        );
    }
}

#[test]
fn test_chained_operators_are_rejected() {
    let err = parse_step("1 + 2 + 3").unwrap_err();
    match err {
        SclError::Syntax { fragment, line, .. } => {
            assert_eq!(line, 1);
            assert!(fragment.contains("+ 3"), "fragment was {:?}", fragment);
        }
        other => panic!("expected a syntax error, got {:?}", other),
    }
}

#[test]
fn test_parentheses_group_operands() {
    let step = parse("(1 + 2) * 3");
    let data = &compound(&step).data;
    assert_eq!(compound(&step).step_name, "ApplyMathOperator");
    assert_eq!(data.get("Operator"), Some(&operator(&MATH_OPERATOR, "Multiply")));

    let Some(StepMember::Argument(left)) = data.get("Left") else {
        panic!("left operand should be a step");
    };
    assert_eq!(compound(left).data.get("Operator"), Some(&operator(&MATH_OPERATOR, "Add")));
}

#[test]
fn test_not() {
    let step = parse("not(<Flag>)");
    let expected = FreezableStep::compound(
        "Not",
        FreezableStepData::new().with("Boolean", variable("Flag")),
    );
    assert_eq!(step, expected);
    assert_eq!(parse("NOT(<Flag>)"), expected);
}

// ============================================================================
// Arrays and indexing
// ============================================================================

#[test]
fn test_array_literal() {
    let step = parse("[1, 2, 3]");
    let expected = FreezableStep::array(vec![
        constant(ConstantValue::Int(1)),
        constant(ConstantValue::Int(2)),
        constant(ConstantValue::Int(3)),
    ]);
    assert_eq!(step, expected);
}

#[test]
fn test_empty_array() {
    assert_eq!(parse("[]"), FreezableStep::array(vec![]));
    assert_eq!(parse_member("[]").unwrap(), StepMember::ArgumentList(vec![]));
}

#[test]
fn test_array_elements_are_steps() {
    let step = parse("[<A>, 1 + 1]");
    let Some(StepMember::ArgumentList(elements)) = compound(&step).data.get("Elements") else {
        panic!("array should hold a list");
    };
    assert_eq!(elements[0], FreezableStep::get_variable(VariableName::new("A")));
    assert_eq!(compound(&elements[1]).step_name, "ApplyMathOperator");
}

#[test]
fn test_element_at_index() {
    let step = parse("<List>[1]");
    let expected = FreezableStep::compound(
        "ElementAtIndex",
        FreezableStepData::new()
            .with("Array", variable("List"))
            .with("Index", int(1)),
    );
    assert_eq!(step, expected);
}

#[test]
fn test_element_at_index_nests_left_to_right() {
    let step = parse("[[1, 2], [3]][0][1]");
    let outer = compound(&step);
    assert_eq!(outer.step_name, "ElementAtIndex");
    assert_eq!(outer.data.get("Index"), Some(&int(1)));

    let Some(StepMember::Argument(inner)) = outer.data.get("Array") else {
        panic!("array should be a step");
    };
    assert_eq!(compound(inner).step_name, "ElementAtIndex");
    assert_eq!(compound(inner).data.get("Index"), Some(&int(0)));
}

// ============================================================================
// Function calls
// ============================================================================

#[test]
fn test_function_call_keeps_raw_members() {
    let step = parse("Print(Value = <X>, Other = [1])");
    let compound = compound(&step);
    assert_eq!(compound.step_name, "Print");
    assert_eq!(
        compound.data.get("Value"),
        Some(&StepMember::Variable(VariableName::new("X")))
    );
    assert_eq!(
        compound.data.get("Other"),
        Some(&StepMember::ArgumentList(vec![constant(ConstantValue::Int(1))]))
    );
}

#[test]
fn test_function_call_without_arguments() {
    assert_eq!(parse("Nothing()"), FreezableStep::compound("Nothing", FreezableStepData::new()));
}

#[test]
fn test_unknown_step_names_are_accepted() {
    let step = parse("UnknownStep(A = 1)");
    assert_eq!(compound(&step).step_name, "UnknownStep");
}

#[test]
fn test_nested_calls_and_operators_in_arguments() {
    let step = parse("If(Condition = <A> > 2, Then = Print(Value = 'big'))");
    let data = &compound(&step).data;
    let Some(StepMember::Argument(condition)) = data.get("Condition") else {
        panic!("condition should be a step");
    };
    assert_eq!(compound(condition).step_name, "Compare");
    let Some(StepMember::Argument(then)) = data.get("Then") else {
        panic!("then should be a step");
    };
    assert_eq!(compound(then).step_name, "Print");
}

// ============================================================================
// Programs
// ============================================================================

#[test]
fn test_program_single_line_is_not_wrapped() {
    assert_eq!(parse_program("5 + 3").unwrap(), parse("5 + 3"));
}

#[test]
fn test_program_lines_become_sequence() {
    let source = r#"
# set up
<X> = 1

Print(Value = <X>)
"#;
    let step = parse_program(source).unwrap();
    let sequence = compound(&step);
    assert_eq!(sequence.step_name, "Sequence");
    let Some(StepMember::ArgumentList(steps)) = sequence.data.get("InitialSteps") else {
        panic!("sequence should hold InitialSteps");
    };
    assert_eq!(steps.len(), 2);
    assert_eq!(compound(&steps[0]).step_name, "SetVariable");
    assert_eq!(compound(&steps[1]).step_name, "Print");
}

#[test]
fn test_program_syntax_error_reports_line() {
    let source = "Print(Value = 1)\nPrint(Value = )";
    match parse_program(source).unwrap_err() {
        SclError::Syntax { line, fragment, .. } => {
            assert_eq!(line, 2);
            assert!(fragment.contains(')'));
        }
        other => panic!("expected a syntax error, got {:?}", other),
    }
}

#[test]
fn test_empty_program_is_an_error() {
    match parse_program("\n# only a comment\n").unwrap_err() {
        SclError::Syntax { fragment, .. } => assert_eq!(fragment, "end of input"),
        other => panic!("expected a syntax error, got {:?}", other),
    }
}

#[test]
fn test_unterminated_call() {
    assert!(matches!(
        parse_step("Print(Value = 1"),
        Err(SclError::Syntax { line: 1, .. })
    ));
}
