//! SCL parser - pest grammar plus a builder producing freezable steps
//!
//! The parser knows nothing about the step registry. Function calls become
//! compound steps with whatever name was written, and all checking of step
//! names, property names and types happens when the result is frozen.

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::errors::SclError;
use crate::freezable::{FreezableStep, FreezableStepData, StepMember};
use crate::steps;
use crate::types::enums::{BOOLEAN_OPERATOR, COMPARE_OPERATOR, MATH_OPERATOR};
use crate::types::{ConstantValue, EnumDefinition, EnumValue, VariableName};

pub mod semantic_validator;

#[cfg(test)]
mod tests;

/* ===================== PEST Parser ===================== */

#[derive(Parser)]
#[grammar = "parser/scl.pest"]
struct SclParser;

pub type ParseResult<T> = Result<T, SclError>;

/// Build a syntax error at `offset` in `source`, echoing the rest of the
/// offending line.
fn syntax_error(source: &str, offset: usize, line_offset: usize) -> SclError {
    let offset = offset.min(source.len());
    let (line, col) = offset_to_line_col(source, offset);
    let fragment = source[offset..].lines().next().unwrap_or("").trim_end();
    SclError::Syntax {
        fragment: if fragment.is_empty() {
            "end of input".to_string()
        } else {
            fragment.to_string()
        },
        line: line + line_offset + 1,
        col: col + 1,
    }
}

fn from_pest(err: pest::error::Error<Rule>, source: &str, line_offset: usize) -> SclError {
    let offset = match err.location {
        pest::error::InputLocation::Pos(pos) => pos,
        pest::error::InputLocation::Span((start, _)) => start,
    };
    syntax_error(source, offset, line_offset)
}

/// Convert byte offset to (line, column) - 0-indexed
fn offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 0;
    let mut col = 0;
    let mut current_offset = 0;

    for ch in source.chars() {
        if current_offset >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 0;
        } else {
            col += 1;
        }
        current_offset += ch.len_utf8();
    }

    (line, col)
}

/* ===================== Public API ===================== */

/// Parse a single step into a property value.
///
/// A bare `<Name>` stays a variable reference and an array literal stays a
/// list, so that the binder can convert them to whatever the property
/// expects.
pub fn parse_member(source: &str) -> ParseResult<StepMember> {
    parse_member_at(source, 0)
}

/// Parse a single step.
pub fn parse_step(source: &str) -> ParseResult<FreezableStep> {
    parse_member(source).map(StepMember::into_step)
}

/// Parse a program with one step per line.
///
/// Blank lines and lines starting with `#` are skipped. More than one step
/// becomes a `Sequence`.
pub fn parse_program(source: &str) -> ParseResult<FreezableStep> {
    let mut steps = Vec::new();
    for (index, line) in source.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        steps.push(parse_member_at(line, index)?.into_step());
    }

    if steps.is_empty() {
        return Err(syntax_error(source, source.len(), 0));
    }
    Ok(FreezableStep::sequence(steps))
}

fn parse_member_at(source: &str, line_offset: usize) -> ParseResult<StepMember> {
    let mut pairs = SclParser::parse(Rule::scl, source).map_err(|e| from_pest(e, source, line_offset))?;
    let builder = Builder { source, line_offset };

    let scl = builder.next(&mut pairs, 0)?;
    let mut inner = scl.into_inner();
    let step = builder.next(&mut inner, 0)?;
    builder.build_member(step)
}

/* ===================== Builder ===================== */

struct Builder<'s> {
    source: &'s str,
    line_offset: usize,
}

impl<'s> Builder<'s> {
    /// Next child pair. The grammar guarantees the shapes the builder asks
    /// for, so a missing pair is reported as a syntax error at `offset`.
    fn next<'i>(
        &self,
        pairs: &mut pest::iterators::Pairs<'i, Rule>,
        offset: usize,
    ) -> ParseResult<Pair<'i, Rule>> {
        pairs
            .next()
            .ok_or_else(|| syntax_error(self.source, offset, self.line_offset))
    }

    fn build_member(&self, pair: Pair<'_, Rule>) -> ParseResult<StepMember> {
        tracing::trace!(rule = ?pair.as_rule(), text = pair.as_str(), "building");
        let offset = pair.as_span().start();

        match pair.as_rule() {
            Rule::variable => Ok(StepMember::Variable(self.build_variable(&pair)?)),
            Rule::array => {
                let elements = pair
                    .into_inner()
                    .map(|element| self.build_member(element).map(StepMember::into_step))
                    .collect::<ParseResult<Vec<_>>>()?;
                Ok(StepMember::ArgumentList(elements))
            }
            Rule::group => {
                let mut inner = pair.into_inner();
                self.build_member(self.next(&mut inner, offset)?)
            }
            _ => self.build_step(pair).map(StepMember::argument),
        }
    }

    /// A member in a position that always takes a step
    fn build_operand(&self, pair: Pair<'_, Rule>) -> ParseResult<StepMember> {
        self.build_member(pair)
            .map(|member| StepMember::argument(member.into_step()))
    }

    fn build_step(&self, pair: Pair<'_, Rule>) -> ParseResult<FreezableStep> {
        let offset = pair.as_span().start();

        match pair.as_rule() {
            Rule::number => self.build_number(&pair).map(FreezableStep::Constant),
            Rule::boolean => Ok(FreezableStep::Constant(ConstantValue::Bool(
                pair.as_str().eq_ignore_ascii_case("true"),
            ))),
            Rule::enum_value => {
                let (enum_type, value) = pair
                    .as_str()
                    .split_once('.')
                    .ok_or_else(|| syntax_error(self.source, offset, self.line_offset))?;
                Ok(FreezableStep::Constant(ConstantValue::Enum(EnumValue::new(
                    enum_type, value,
                ))))
            }
            Rule::string => {
                let mut inner = pair.into_inner();
                let quoted = self.next(&mut inner, offset)?;
                self.build_string(&quoted).map(FreezableStep::Constant)
            }
            Rule::variable => Ok(FreezableStep::get_variable(self.build_variable(&pair)?)),
            Rule::array | Rule::group => self.build_member(pair).map(StepMember::into_step),
            Rule::assignment => {
                let mut inner = pair.into_inner();
                let variable = self.build_variable(&self.next(&mut inner, offset)?)?;
                let value = self.build_operand(self.next(&mut inner, offset)?)?;
                Ok(FreezableStep::compound(
                    steps::set_variable::NAME,
                    FreezableStepData::new()
                        .with("Variable", StepMember::Variable(variable))
                        .with("Value", value),
                ))
            }
            Rule::binary => self.build_binary(pair),
            Rule::not_call => {
                let mut inner = pair.into_inner();
                let operand = self.build_operand(self.next(&mut inner, offset)?)?;
                Ok(FreezableStep::compound(
                    steps::not::NAME,
                    FreezableStepData::new().with("Boolean", operand),
                ))
            }
            Rule::element_at => {
                let mut inner = pair.into_inner();
                let mut array = self.build_operand(self.next(&mut inner, offset)?)?;
                for index in inner {
                    let index_offset = index.as_span().start();
                    let mut parts = index.into_inner();
                    let index = self.build_operand(self.next(&mut parts, index_offset)?)?;
                    array = StepMember::argument(FreezableStep::compound(
                        steps::element_at_index::NAME,
                        FreezableStepData::new()
                            .with("Array", array)
                            .with("Index", index),
                    ));
                }
                Ok(array.into_step())
            }
            Rule::function_call => {
                let mut inner = pair.into_inner();
                let name = self.next(&mut inner, offset)?.as_str().to_string();
                let mut data = FreezableStepData::new();
                for argument in inner {
                    let argument_offset = argument.as_span().start();
                    let mut parts = argument.into_inner();
                    let key = self.next(&mut parts, argument_offset)?.as_str().to_string();
                    let value = self.build_member(self.next(&mut parts, argument_offset)?)?;
                    data.insert(key, value);
                }
                Ok(FreezableStep::compound(name, data))
            }
            _ => Err(syntax_error(self.source, offset, self.line_offset)),
        }
    }

    fn build_binary(&self, pair: Pair<'_, Rule>) -> ParseResult<FreezableStep> {
        let offset = pair.as_span().start();
        let mut inner = pair.into_inner();
        let left = self.build_operand(self.next(&mut inner, offset)?)?;
        let operator = self.next(&mut inner, offset)?;
        let right = self.build_operand(self.next(&mut inner, offset)?)?;

        let (step_name, definition): (&str, &EnumDefinition) = match operator.as_rule() {
            Rule::math_op => (steps::apply_math_operator::NAME, &MATH_OPERATOR),
            Rule::boolean_op => (steps::apply_boolean_operator::NAME, &BOOLEAN_OPERATOR),
            Rule::compare_op => (steps::compare::NAME, &COMPARE_OPERATOR),
            _ => return Err(syntax_error(self.source, offset, self.line_offset)),
        };

        let operator_offset = operator.as_span().start();
        let value = definition
            .from_display(operator.as_str())
            .ok_or_else(|| syntax_error(self.source, operator_offset, self.line_offset))?;
        let operator = StepMember::argument(FreezableStep::Constant(ConstantValue::Enum(
            EnumValue::new(definition.name, value),
        )));

        Ok(FreezableStep::compound(
            step_name,
            FreezableStepData::new()
                .with("Left", left)
                .with("Operator", operator)
                .with("Right", right),
        ))
    }

    fn build_variable(&self, pair: &Pair<'_, Rule>) -> ParseResult<VariableName> {
        VariableName::try_parse(pair.as_str())
            .ok_or_else(|| syntax_error(self.source, pair.as_span().start(), self.line_offset))
    }

    fn build_number(&self, pair: &Pair<'_, Rule>) -> ParseResult<ConstantValue> {
        let text = pair.as_str();
        let invalid = |message: String| SclError::InvalidLiteral {
            fragment: text.to_string(),
            message,
        };

        if text.contains('.') {
            text.parse::<f64>()
                .map(ConstantValue::Double)
                .map_err(|e| invalid(e.to_string()))
        } else {
            text.parse::<i64>()
                .map(ConstantValue::Int)
                .map_err(|e| invalid(e.to_string()))
        }
    }

    fn build_string(&self, pair: &Pair<'_, Rule>) -> ParseResult<ConstantValue> {
        let text = pair.as_str();
        let body = &text[1..text.len() - 1];

        match pair.as_rule() {
            Rule::single_quoted => Ok(ConstantValue::String(body.to_string())),
            _ => unescape(body)
                .map(ConstantValue::String)
                .ok_or_else(|| SclError::InvalidLiteral {
                    fragment: text.to_string(),
                    message: "invalid escape sequence".to_string(),
                }),
        }
    }
}

/// Resolve `\n`, `\t`, `\r`, `\\`, `\"` and `\'` in a double-quoted string.
fn unescape(body: &str) -> Option<String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            '\'' => out.push('\''),
            _ => return None,
        }
    }
    Some(out)
}
