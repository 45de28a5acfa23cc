//! The function form: `Name(A = 1, B = 2)`

use super::serialize_member;
use crate::errors::SclError;
use crate::factory::StepFactoryStore;
use crate::freezable::FreezableStepData;

/// Properties are written sorted by name so output is stable.
pub fn serialize(step_name: &str, data: &FreezableStepData, store: &StepFactoryStore) -> Result<String, SclError> {
    let arguments = data
        .sorted()
        .into_iter()
        .map(|(name, member)| Ok(format!("{} = {}", name, serialize_member(member, store)?)))
        .collect::<Result<Vec<String>, SclError>>()?;

    Ok(format!("{}({})", step_name, arguments.join(", ")))
}
