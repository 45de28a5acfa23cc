//! Property values of an unfrozen step

use super::FreezableStep;
use crate::types::VariableName;
use std::fmt;

/// Declared shape of a step property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    VariableName,
    Step,
    StepList,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKind::VariableName => write!(f, "a variable name"),
            MemberKind::Step => write!(f, "a step"),
            MemberKind::StepList => write!(f, "a list of steps"),
        }
    }
}

/// One bound property value: a variable reference, a nested step or a list
/// of nested steps.
#[derive(Debug, Clone, PartialEq)]
pub enum StepMember {
    Variable(VariableName),
    Argument(Box<FreezableStep>),
    ArgumentList(Vec<FreezableStep>),
}

impl StepMember {
    pub fn argument(step: FreezableStep) -> Self {
        StepMember::Argument(Box::new(step))
    }

    pub fn kind(&self) -> MemberKind {
        match self {
            StepMember::Variable(_) => MemberKind::VariableName,
            StepMember::Argument(_) => MemberKind::Step,
            StepMember::ArgumentList(_) => MemberKind::StepList,
        }
    }

    /// Convert to the target kind where a lossless conversion exists:
    ///
    /// - a variable reference becomes a `GetVariable` step
    /// - a list of steps becomes an `Array` step
    /// - a single step becomes a one-element list
    ///
    /// Anything else is returned unchanged in `Err`.
    pub fn try_convert(self, target: MemberKind) -> Result<StepMember, StepMember> {
        match (self, target) {
            (member, target) if member.kind() == target => Ok(member),
            (StepMember::Variable(name), MemberKind::Step) => {
                Ok(StepMember::argument(FreezableStep::get_variable(name)))
            }
            (StepMember::ArgumentList(elements), MemberKind::Step) => {
                Ok(StepMember::argument(FreezableStep::array(elements)))
            }
            (StepMember::Argument(step), MemberKind::StepList) => {
                Ok(StepMember::ArgumentList(vec![*step]))
            }
            (member, _) => Err(member),
        }
    }

    /// Convert to a step, e.g. for an element of an array literal.
    pub fn into_step(self) -> FreezableStep {
        match self {
            StepMember::Variable(name) => FreezableStep::get_variable(name),
            StepMember::Argument(step) => *step,
            StepMember::ArgumentList(elements) => FreezableStep::array(elements),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ConstantValue;

    #[test]
    fn test_variable_converts_to_get_variable() {
        let member = StepMember::Variable(VariableName::new("Flag"));
        let converted = member.try_convert(MemberKind::Step).unwrap();
        assert_eq!(
            converted,
            StepMember::argument(FreezableStep::get_variable(VariableName::new("Flag")))
        );
    }

    #[test]
    fn test_list_converts_to_array_step() {
        let member = StepMember::ArgumentList(vec![FreezableStep::constant(ConstantValue::Int(1))]);
        let StepMember::Argument(step) = member.try_convert(MemberKind::Step).unwrap() else {
            panic!("expected an argument");
        };
        assert_eq!(step.step_name(), "Array");
    }

    #[test]
    fn test_single_step_converts_to_list() {
        let one = FreezableStep::constant(ConstantValue::Int(1));
        let member = StepMember::argument(one.clone());
        assert_eq!(
            member.try_convert(MemberKind::StepList).unwrap(),
            StepMember::ArgumentList(vec![one])
        );
    }

    #[test]
    fn test_step_cannot_become_variable_name() {
        let member = StepMember::argument(FreezableStep::constant(ConstantValue::Int(1)));
        let err = member.clone().try_convert(MemberKind::VariableName).unwrap_err();
        assert_eq!(err, member);

        let list = StepMember::ArgumentList(vec![]);
        assert!(list.try_convert(MemberKind::VariableName).is_err());
    }
}
