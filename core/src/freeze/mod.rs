//! Freezing: turning an unresolved step graph into a runnable one
//!
//! Freezing looks up each step's factory, computes its output type, binds
//! every supplied property to a declared slot, recursively freezes the
//! children and checks their types. Errors from every level are collected
//! and returned together.

pub mod context;


pub use context::StepContext;

use crate::errors::{ErrorList, SclError};
use crate::factory::{find_property, PropertyDescriptor, StepFactory, StepFactoryStore};
use crate::freezable::{Configuration, FreezableStep, FreezableStepData, MemberKind, StepMember};
use crate::step::{BoundMember, CompoundStep, Step};
use crate::types::{ConstantValue, EnumValue, TypeReference, VariableName};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Infer variable types for `step` and freeze it.
pub fn freeze(step: &FreezableStep, store: &StepFactoryStore) -> Result<Step, ErrorList> {
    let (context, mut errors) = StepContext::new(store).infer_variables(step);
    match context.freeze(step) {
        Ok(frozen) => errors.into_result(frozen),
        Err(freeze_errors) => {
            errors.extend_unique(freeze_errors);
            Err(errors)
        }
    }
}

impl StepContext<'_> {
    /// Freeze a step against the variable types already in this context.
    pub fn freeze(&self, step: &FreezableStep) -> Result<Step, ErrorList> {
        match step {
            FreezableStep::Constant(value) => self.freeze_constant(value).map_err(ErrorList::from),
            FreezableStep::Compound(compound) => {
                let factory = self
                    .store()
                    .get(&compound.step_name)
                    .ok_or_else(|| SclError::UnknownStep(compound.step_name.clone()))?;
                try_freeze(factory, self, &compound.data, compound.configuration.as_ref())
            }
        }
    }

    /// Enum constants are checked against the registry and normalized to
    /// the declared spelling.
    fn freeze_constant(&self, value: &ConstantValue) -> Result<Step, SclError> {
        let ConstantValue::Enum(enum_value) = value else {
            return Ok(Step::Constant(value.clone()));
        };

        let definition = self
            .store()
            .enum_definition(&enum_value.enum_type)
            .ok_or_else(|| SclError::UnknownEnumType(enum_value.enum_type.clone()))?;
        let member = definition
            .value(&enum_value.value)
            .ok_or_else(|| SclError::UnknownEnumValue {
                enum_type: definition.name.to_string(),
                value: enum_value.value.clone(),
            })?;

        Ok(Step::Constant(ConstantValue::Enum(EnumValue::new(
            definition.name,
            member,
        ))))
    }
}

/// Bind `data` to the slots declared by `factory` and freeze the children.
///
/// This is the one binder shared by every step type. It never stops at the
/// first problem: unknown properties, wrong member kinds, child errors,
/// type mismatches and missing required properties are all reported.
pub fn try_freeze(
    factory: &'static dyn StepFactory,
    context: &StepContext<'_>,
    data: &FreezableStepData,
    configuration: Option<&Configuration>,
) -> Result<Step, ErrorList> {
    let mut errors = ErrorList::new();

    let output_type = match factory
        .output_type_reference(data, context)
        .and_then(|reference| context.resolve(&reference).map_err(ErrorList::from))
    {
        Ok(resolved) => Some(resolved),
        Err(list) => {
            errors.extend_unique(list);
            None
        }
    };

    let mut properties = IndexMap::new();
    let mut supplied = HashSet::new();

    for (name, member) in data.iter() {
        let Some(descriptor) = find_property(factory.properties(), name) else {
            errors.push_unique(SclError::UnexpectedProperty {
                step: factory.name().to_string(),
                property: name.to_string(),
            });
            continue;
        };
        if !supplied.insert(descriptor.name) {
            errors.push_unique(SclError::DuplicateProperty {
                step: factory.name().to_string(),
                property: descriptor.name.to_string(),
            });
            continue;
        }

        let member = match member.clone().try_convert(descriptor.kind) {
            Ok(member) => member,
            Err(original) => {
                errors.push_unique(SclError::WrongMemberKind {
                    step: factory.name().to_string(),
                    property: descriptor.name.to_string(),
                    expected: descriptor.kind.to_string(),
                    actual: original.kind().to_string(),
                });
                continue;
            }
        };

        match bind_member(factory, descriptor, member, context) {
            Ok(bound) => {
                properties.insert(descriptor.name, bound);
            }
            Err(list) => errors.extend_unique(list),
        }
    }

    for descriptor in factory.properties() {
        if descriptor.required && !supplied.contains(descriptor.name) {
            errors.push_unique(missing(factory, descriptor.name));
        }
    }

    match output_type {
        Some(output_type) if errors.is_empty() => {
            tracing::debug!(step = factory.name(), output = %output_type, "froze step");
            Ok(Step::Compound(CompoundStep::new(
                factory,
                properties,
                output_type,
                configuration.cloned(),
            )))
        }
        _ => Err(errors),
    }
}

fn bind_member(
    factory: &'static dyn StepFactory,
    descriptor: &PropertyDescriptor,
    member: StepMember,
    context: &StepContext<'_>,
) -> Result<BoundMember, ErrorList> {
    match member {
        StepMember::Variable(name) => Ok(BoundMember::Variable(name)),
        StepMember::Argument(child) => {
            let frozen = context.freeze(&child)?;
            check_type(factory, descriptor, &frozen)?;
            Ok(BoundMember::Step(Box::new(frozen)))
        }
        StepMember::ArgumentList(children) => {
            let mut errors = ErrorList::new();
            let mut frozen = Vec::with_capacity(children.len());
            for child in &children {
                match context
                    .freeze(child)
                    .and_then(|step| check_type(factory, descriptor, &step).map(|_| step))
                {
                    Ok(step) => frozen.push(step),
                    Err(list) => errors.extend_unique(list),
                }
            }
            errors.into_result(BoundMember::List(frozen))
        }
    }
}

/// Check a frozen child against the slot's expected type. For lists the
/// expectation applies to each element.
fn check_type(
    factory: &'static dyn StepFactory,
    descriptor: &PropertyDescriptor,
    child: &Step,
) -> Result<(), ErrorList> {
    let actual = child.output_type();
    if descriptor.expected.accepts(&actual) {
        return Ok(());
    }
    Err(SclError::WrongType {
        step: factory.name().to_string(),
        property: descriptor.name.to_string(),
        expected: descriptor.expected.to_string(),
        actual: actual.to_string(),
    }
    .into())
}

fn missing(factory: &dyn StepFactory, property: &str) -> SclError {
    SclError::MissingProperty {
        step: factory.name().to_string(),
        property: property.to_string(),
    }
}

impl FreezableStep {
    /// Output type of this step without freezing it.
    pub fn output_type_reference(&self, context: &StepContext<'_>) -> Result<TypeReference, ErrorList> {
        match self {
            FreezableStep::Constant(value) => Ok(TypeReference::Actual(value.actual_type())),
            FreezableStep::Compound(compound) => {
                let factory = context
                    .store()
                    .get(&compound.step_name)
                    .ok_or_else(|| SclError::UnknownStep(compound.step_name.clone()))?;
                factory.output_type_reference(&compound.data, context)
            }
        }
    }
}

impl StepMember {
    pub fn output_type_reference(&self, context: &StepContext<'_>) -> Result<TypeReference, ErrorList> {
        match self {
            StepMember::Variable(name) => Ok(TypeReference::Variable(name.clone())),
            StepMember::Argument(step) => step.output_type_reference(context),
            StepMember::ArgumentList(steps) => {
                let mut errors = ErrorList::new();
                let mut members = Vec::with_capacity(steps.len());
                for step in steps {
                    match step.output_type_reference(context) {
                        Ok(reference) => members.push(reference),
                        Err(list) => errors.extend_unique(list),
                    }
                }
                errors.into_result(TypeReference::array(TypeReference::multiple(members)))
            }
        }
    }
}

/* ===================== helpers for step factories ===================== */

/// Output type of the step bound to `property`, or `None` when the
/// property was not supplied. Variables and lists are converted to steps
/// first, the same way the binder converts them.
pub fn property_type(
    factory: &dyn StepFactory,
    data: &FreezableStepData,
    property: &str,
    context: &StepContext<'_>,
) -> Result<Option<TypeReference>, ErrorList> {
    let Some(descriptor) = find_property(factory.properties(), property) else {
        return Ok(None);
    };
    let Some(member) = descriptor
        .names()
        .find_map(|name| data.get(name))
    else {
        return Ok(None);
    };

    match member.clone().try_convert(MemberKind::Step) {
        Ok(converted) => converted.output_type_reference(context).map(Some),
        Err(original) => Err(SclError::WrongMemberKind {
            step: factory.name().to_string(),
            property: descriptor.name.to_string(),
            expected: MemberKind::Step.to_string(),
            actual: original.kind().to_string(),
        }
        .into()),
    }
}

/// Like [`property_type`] but the property must be present.
pub fn required_property_type(
    factory: &dyn StepFactory,
    data: &FreezableStepData,
    property: &str,
    context: &StepContext<'_>,
) -> Result<TypeReference, ErrorList> {
    property_type(factory, data, property, context)?.ok_or_else(|| missing(factory, property).into())
}

/// The element type of a generic property, e.g. `T` for an `Array<T>`.
///
/// The property's type is resolved first; a resolved type that is not a
/// single-argument generic fails with [`SclError::NotGeneric`]. `Any` is
/// treated as an array of `Any`.
pub fn generic_member_type(
    factory: &dyn StepFactory,
    data: &FreezableStepData,
    property: &str,
    context: &StepContext<'_>,
) -> Result<TypeReference, ErrorList> {
    let reference = required_property_type(factory, data, property, context)?;
    let resolved = context.resolve(&reference)?;
    if resolved.is_any() {
        return Ok(TypeReference::ANY);
    }
    resolved.single_child().cloned().ok_or_else(|| {
        SclError::NotGeneric {
            step: factory.name().to_string(),
            property: property.to_string(),
            actual: resolved.to_string(),
        }
        .into()
    })
}

/// The variable name bound to `property`, falling back to the declared
/// default.
pub fn variable_property(
    factory: &dyn StepFactory,
    data: &FreezableStepData,
    property: &str,
) -> Result<VariableName, ErrorList> {
    let descriptor = find_property(factory.properties(), property);
    let member = descriptor.and_then(|d| d.names().find_map(|name| data.get(name)));

    match member {
        Some(StepMember::Variable(name)) => Ok(name.clone()),
        Some(other) => Err(SclError::WrongMemberKind {
            step: factory.name().to_string(),
            property: property.to_string(),
            expected: MemberKind::VariableName.to_string(),
            actual: other.kind().to_string(),
        }
        .into()),
        None => descriptor
            .and_then(|d| d.default)
            .and_then(|d| d.to_variable())
            .ok_or_else(|| missing(factory, property).into()),
    }
}
