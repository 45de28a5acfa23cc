//! Name-keyed property map of an unfrozen step

use super::StepMember;
use indexmap::IndexMap;
use std::hash::{Hash, Hasher};

/// Property name compared without regard to ASCII case. The original
/// spelling is kept for serialization.
#[derive(Debug, Clone)]
struct PropertyKey(String);

impl PartialEq for PropertyKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for PropertyKey {}

impl Hash for PropertyKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.0.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
    }
}

/// Insertion-ordered map from property name to [`StepMember`].
///
/// Keys are case-insensitive. Equality is structural and ignores order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FreezableStepData {
    members: IndexMap<PropertyKey, StepMember>,
}

impl FreezableStepData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a member. A key differing only in case replaces the existing
    /// entry in place.
    pub fn insert(&mut self, name: impl Into<String>, member: StepMember) -> Option<StepMember> {
        self.members.insert(PropertyKey(name.into()), member)
    }

    pub fn with(mut self, name: impl Into<String>, member: StepMember) -> Self {
        self.insert(name, member);
        self
    }

    pub fn get(&self, name: &str) -> Option<&StepMember> {
        self.members.get(&PropertyKey(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<StepMember> {
        self.members.shift_remove(&PropertyKey(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StepMember)> {
        self.members.iter().map(|(k, v)| (k.0.as_str(), v))
    }

    /// Entries sorted by property name, for deterministic output
    pub fn sorted(&self) -> Vec<(&str, &StepMember)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|(a, _), (b, _)| {
            a.to_ascii_lowercase()
                .cmp(&b.to_ascii_lowercase())
                .then_with(|| a.cmp(b))
        });
        entries
    }
}

impl<S: Into<String>> FromIterator<(S, StepMember)> for FreezableStepData {
    fn from_iter<I: IntoIterator<Item = (S, StepMember)>>(iter: I) -> Self {
        let mut data = FreezableStepData::new();
        for (name, member) in iter {
            data.insert(name, member);
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::freezable::FreezableStep;
    use crate::types::{ConstantValue, VariableName};

    fn int(i: i64) -> StepMember {
        StepMember::argument(FreezableStep::constant(ConstantValue::Int(i)))
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let mut data = FreezableStepData::new();
        data.insert("Value", int(1));
        assert!(data.contains("value"));
        assert!(data.contains("VALUE"));

        data.insert("VALUE", int(2));
        assert_eq!(data.len(), 1);
        assert_eq!(data.get("Value"), Some(&int(2)));
    }

    #[test]
    fn test_equality_ignores_order() {
        let a: FreezableStepData = vec![("A", int(1)), ("B", int(2))].into_iter().collect();
        let b: FreezableStepData = vec![("B", int(2)), ("A", int(1))].into_iter().collect();
        assert_eq!(a, b);

        let c = b.clone().with("C", StepMember::Variable(VariableName::new("X")));
        assert_ne!(a, c);
    }

    #[test]
    fn test_sorted_is_alphabetical() {
        let data: FreezableStepData = vec![("b", int(2)), ("A", int(1)), ("C", int(3))]
            .into_iter()
            .collect();
        let names: Vec<_> = data.sorted().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["A", "b", "C"]);
    }
}
