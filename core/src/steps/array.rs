//! `Array` - `[a, b, c]`

use crate::errors::{ErrorList, RunError, SclError};
use crate::factory::{PropertyDescriptor, StepFactory};
use crate::freezable::{FreezableStepData, MemberKind};
use crate::freeze::StepContext;
use crate::serialization::StepSerializer;
use crate::state::StateMonad;
use crate::step::CompoundStep;
use crate::types::{TypeReference, Value};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

pub const NAME: &str = "Array";

const PROPERTIES: &[PropertyDescriptor] = &[PropertyDescriptor::list("Elements").required()];

static SERIALIZER: StepSerializer = StepSerializer::Array;

#[derive(Debug)]
pub struct ArrayFactory;

pub static ARRAY: ArrayFactory = ArrayFactory;

#[async_trait]
impl StepFactory for ArrayFactory {
    fn name(&self) -> &'static str {
        NAME
    }

    fn summary(&self) -> &'static str {
        "Creates an array from its elements"
    }

    fn properties(&self) -> &'static [PropertyDescriptor] {
        PROPERTIES
    }

    /// `Array<T>` where `T` unifies the element types; empty arrays are
    /// `Array<Any>`.
    fn output_type_reference(
        &self,
        data: &FreezableStepData,
        context: &StepContext<'_>,
    ) -> Result<TypeReference, ErrorList> {
        let member = data.get("Elements").ok_or_else(|| SclError::MissingProperty {
            step: NAME.to_string(),
            property: "Elements".to_string(),
        })?;
        match member.clone().try_convert(MemberKind::StepList) {
            Ok(list) => list.output_type_reference(context),
            Err(original) => Err(SclError::WrongMemberKind {
                step: NAME.to_string(),
                property: "Elements".to_string(),
                expected: MemberKind::StepList.to_string(),
                actual: original.kind().to_string(),
            }
            .into()),
        }
    }

    fn serializer(&self) -> &'static StepSerializer {
        &SERIALIZER
    }

    async fn execute(
        &self,
        step: &CompoundStep,
        state: &mut StateMonad,
        cancel: &CancellationToken,
    ) -> Result<Value, RunError> {
        let mut values = Vec::new();
        for element in step.steps("Elements") {
            values.push(element.run(state, cancel).await?);
        }
        Ok(Value::Array(values))
    }
}
