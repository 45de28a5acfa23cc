//! Symbolic type references and their resolution
//!
//! A [`TypeReference`] describes the output type of a step before the step
//! has been frozen. References can point at a variable ("whatever `<X>` is
//! bound to"), wrap other references in a generic (array of T), or hold
//! several candidates that must agree (both branches of a conditional).
//! Resolution turns a reference into one built only from `Actual` and
//! `Generic` nodes.

use super::variable_name::VariableName;
use crate::errors::SclError;
use std::collections::HashMap;
use std::fmt;

/// A concrete, non-generic type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActualType {
    /// Permissive placeholder, compatible with every other type
    Any,
    Unit,
    Bool,
    Int,
    Double,
    String,
    Enum(String),
}

impl fmt::Display for ActualType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActualType::Any => write!(f, "Any"),
            ActualType::Unit => write!(f, "Unit"),
            ActualType::Bool => write!(f, "Bool"),
            ActualType::Int => write!(f, "Int"),
            ActualType::Double => write!(f, "Double"),
            ActualType::String => write!(f, "String"),
            ActualType::Enum(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenericKind {
    Array,
}

impl fmt::Display for GenericKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenericKind::Array => write!(f, "Array"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeReference {
    Actual(ActualType),
    /// The type bound to a variable at this point of the graph
    Variable(VariableName),
    Generic(GenericKind, Vec<TypeReference>),
    /// Candidates that must unify. Build with [`TypeReference::multiple`].
    Multiple(Vec<TypeReference>),
}

/// Source of variable types during resolution.
pub trait VariableTypes {
    fn variable_type(&self, name: &VariableName) -> Option<TypeReference>;
}

impl VariableTypes for HashMap<VariableName, TypeReference> {
    fn variable_type(&self, name: &VariableName) -> Option<TypeReference> {
        self.get(name).cloned()
    }
}

impl TypeReference {
    pub const ANY: TypeReference = TypeReference::Actual(ActualType::Any);
    pub const UNIT: TypeReference = TypeReference::Actual(ActualType::Unit);
    pub const BOOL: TypeReference = TypeReference::Actual(ActualType::Bool);
    pub const INT: TypeReference = TypeReference::Actual(ActualType::Int);
    pub const STRING: TypeReference = TypeReference::Actual(ActualType::String);

    pub fn array(member: TypeReference) -> Self {
        TypeReference::Generic(GenericKind::Array, vec![member])
    }

    /// Combine candidate references. Duplicates are dropped and a single
    /// remaining candidate is returned as-is.
    pub fn multiple(candidates: impl IntoIterator<Item = TypeReference>) -> Self {
        let mut unique: Vec<TypeReference> = Vec::new();
        for candidate in candidates {
            let flattened = match candidate {
                TypeReference::Multiple(inner) => inner,
                other => vec![other],
            };
            for c in flattened {
                if !unique.contains(&c) {
                    unique.push(c);
                }
            }
        }
        match unique.len() {
            0 => TypeReference::ANY,
            1 => unique.remove(0),
            _ => TypeReference::Multiple(unique),
        }
    }

    /// Child type of a `Generic` reference with exactly one argument.
    pub fn single_child(&self) -> Option<&TypeReference> {
        match self {
            TypeReference::Generic(_, children) if children.len() == 1 => children.first(),
            _ => None,
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, TypeReference::Actual(ActualType::Any))
    }

    /// Whether the reference still mentions a variable or unresolved candidates.
    pub fn is_resolved(&self) -> bool {
        match self {
            TypeReference::Actual(_) => true,
            TypeReference::Variable(_) | TypeReference::Multiple(_) => false,
            TypeReference::Generic(_, children) => children.iter().all(Self::is_resolved),
        }
    }

    /// Replace variables with their bound types and collapse candidate sets.
    ///
    /// Fails with [`SclError::UnresolvedVariable`] when a variable has no
    /// known type yet, and [`SclError::TypesDisagree`] when candidates
    /// cannot be unified.
    pub fn try_resolve(&self, variables: &dyn VariableTypes) -> Result<TypeReference, SclError> {
        self.resolve_within(variables, &mut Vec::new())
    }

    /// `expanding` holds the variables whose bound types are being resolved,
    /// so a chain that leads back to one of them is reported, not followed.
    fn resolve_within(
        &self,
        variables: &dyn VariableTypes,
        expanding: &mut Vec<VariableName>,
    ) -> Result<TypeReference, SclError> {
        match self {
            TypeReference::Actual(_) => Ok(self.clone()),
            TypeReference::Variable(name) => {
                if expanding.contains(name) {
                    return Err(SclError::UnresolvedVariable(name.clone()));
                }
                let bound = variables
                    .variable_type(name)
                    .ok_or_else(|| SclError::UnresolvedVariable(name.clone()))?;
                expanding.push(name.clone());
                let resolved = bound.resolve_within(variables, expanding);
                expanding.pop();
                resolved
            }
            TypeReference::Generic(kind, children) => {
                let resolved = children
                    .iter()
                    .map(|c| c.resolve_within(variables, expanding))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(TypeReference::Generic(*kind, resolved))
            }
            TypeReference::Multiple(candidates) => {
                let resolved = candidates
                    .iter()
                    .map(|c| c.resolve_within(variables, expanding))
                    .collect::<Result<Vec<_>, _>>()?;
                unify(&resolved)
            }
        }
    }
}

/// Unify resolved references into one.
///
/// `Any` candidates are ignored; zero remaining candidates unify to `Any`.
pub fn unify(candidates: &[TypeReference]) -> Result<TypeReference, SclError> {
    let mut result: Option<TypeReference> = None;
    for candidate in candidates {
        if candidate.is_any() {
            continue;
        }
        result = Some(match result {
            None => candidate.clone(),
            Some(current) => unify_pair(&current, candidate)?,
        });
    }
    Ok(result.unwrap_or(TypeReference::ANY))
}

fn unify_pair(a: &TypeReference, b: &TypeReference) -> Result<TypeReference, SclError> {
    if a == b || b.is_any() {
        return Ok(a.clone());
    }
    if a.is_any() {
        return Ok(b.clone());
    }
    match (a, b) {
        (TypeReference::Generic(ka, ca), TypeReference::Generic(kb, cb))
            if ka == kb && ca.len() == cb.len() =>
        {
            let children = ca
                .iter()
                .zip(cb)
                .map(|(x, y)| unify_pair(x, y))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(TypeReference::Generic(*ka, children))
        }
        _ => Err(SclError::TypesDisagree {
            first: a.to_string(),
            second: b.to_string(),
        }),
    }
}

impl fmt::Display for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeReference::Actual(t) => write!(f, "{}", t),
            TypeReference::Variable(v) => write!(f, "typeof {}", v),
            TypeReference::Generic(kind, children) => {
                write!(f, "{}<", kind)?;
                for (i, c) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", c)?;
                }
                write!(f, ">")
            }
            TypeReference::Multiple(candidates) => {
                write!(f, "one of (")?;
                for (i, c) in candidates.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{}", c)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Constraint a property places on the output type of the step bound to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedType {
    Any,
    Bool,
    Int,
    /// Int or Double
    Number,
    String,
    Enum(&'static str),
    Array,
}

impl ExpectedType {
    /// Check a resolved reference. `Any` references are always accepted.
    pub fn accepts(&self, reference: &TypeReference) -> bool {
        if reference.is_any() {
            return true;
        }
        match (self, reference) {
            (ExpectedType::Any, _) => true,
            (ExpectedType::Bool, TypeReference::Actual(ActualType::Bool)) => true,
            (ExpectedType::Int, TypeReference::Actual(ActualType::Int)) => true,
            (
                ExpectedType::Number,
                TypeReference::Actual(ActualType::Int | ActualType::Double),
            ) => true,
            (ExpectedType::String, TypeReference::Actual(ActualType::String)) => true,
            (ExpectedType::Enum(name), TypeReference::Actual(ActualType::Enum(actual))) => {
                name.eq_ignore_ascii_case(actual)
            }
            (ExpectedType::Array, TypeReference::Generic(GenericKind::Array, _)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ExpectedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedType::Any => write!(f, "Any"),
            ExpectedType::Bool => write!(f, "Bool"),
            ExpectedType::Int => write!(f, "Int"),
            ExpectedType::Number => write!(f, "Int or Double"),
            ExpectedType::String => write!(f, "String"),
            ExpectedType::Enum(name) => write!(f, "{}", name),
            ExpectedType::Array => write!(f, "Array"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int() -> TypeReference {
        TypeReference::INT
    }

    fn string() -> TypeReference {
        TypeReference::STRING
    }

    fn no_variables() -> HashMap<VariableName, TypeReference> {
        HashMap::new()
    }

    #[test]
    fn test_multiple_of_equal_types_unifies() {
        let multiple = TypeReference::Multiple(vec![int(), int()]);
        let resolved = multiple.try_resolve(&no_variables()).unwrap();
        assert_eq!(resolved, int());
    }

    #[test]
    fn test_multiple_of_different_actuals_fails_naming_both() {
        let multiple = TypeReference::Multiple(vec![int(), string()]);
        let err = multiple.try_resolve(&no_variables()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Int"), "{}", message);
        assert!(message.contains("String"), "{}", message);
    }

    #[test]
    fn test_zero_candidates_unify_to_any() {
        assert_eq!(unify(&[]).unwrap(), TypeReference::ANY);
        assert_eq!(TypeReference::multiple(vec![]), TypeReference::ANY);
    }

    #[test]
    fn test_multiple_constructor_collapses_duplicates() {
        assert_eq!(TypeReference::multiple(vec![int(), int()]), int());
        assert_eq!(
            TypeReference::multiple(vec![int(), string(), int()]),
            TypeReference::Multiple(vec![int(), string()])
        );
    }

    #[test]
    fn test_any_is_ignored_when_unifying() {
        assert_eq!(unify(&[TypeReference::ANY, int()]).unwrap(), int());
        let arrays = [
            TypeReference::array(TypeReference::ANY),
            TypeReference::array(string()),
        ];
        assert_eq!(unify(&arrays).unwrap(), TypeReference::array(string()));
    }

    #[test]
    fn test_variable_resolution() {
        let mut variables = HashMap::new();
        variables.insert(VariableName::new("X"), int());
        variables.insert(
            VariableName::new("Y"),
            TypeReference::array(TypeReference::Variable(VariableName::new("X"))),
        );

        let y = TypeReference::Variable(VariableName::new("Y"));
        assert_eq!(y.try_resolve(&variables).unwrap(), TypeReference::array(int()));

        let z = TypeReference::Variable(VariableName::new("Z"));
        assert_eq!(
            z.try_resolve(&variables).unwrap_err(),
            SclError::UnresolvedVariable(VariableName::new("Z"))
        );
    }

    #[test]
    fn test_variable_cycles_are_unresolved() {
        let x = VariableName::new("X");
        let y = VariableName::new("Y");
        let mut variables = HashMap::new();
        variables.insert(x.clone(), TypeReference::Variable(y.clone()));
        variables.insert(y.clone(), TypeReference::array(TypeReference::Variable(x.clone())));

        let err = TypeReference::Variable(x.clone()).try_resolve(&variables).unwrap_err();
        assert_eq!(err, SclError::UnresolvedVariable(x.clone()));

        // The same variable twice side by side is not a cycle
        variables.insert(y.clone(), int());
        let pair = TypeReference::Multiple(vec![
            TypeReference::Variable(y.clone()),
            TypeReference::Variable(y),
        ]);
        assert_eq!(pair.try_resolve(&variables).unwrap(), int());
    }

    #[test]
    fn test_expected_type_accepts() {
        assert!(ExpectedType::Number.accepts(&TypeReference::Actual(ActualType::Double)));
        assert!(!ExpectedType::Bool.accepts(&int()));
        assert!(ExpectedType::Bool.accepts(&TypeReference::ANY));
        assert!(ExpectedType::Array.accepts(&TypeReference::array(int())));
        assert!(ExpectedType::Enum("MathOperator")
            .accepts(&TypeReference::Actual(ActualType::Enum("MathOperator".into()))));
    }
}
