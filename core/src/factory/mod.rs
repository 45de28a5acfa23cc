//! Step factories and the registry that holds them
//!
//! A [`StepFactory`] is a stateless singleton describing one step type: its
//! property table, how its output type is computed, which variables it
//! assigns, how it serializes and how it runs. Factories are registered in
//! a [`StepFactoryStore`] once at startup and only read afterwards.

pub mod descriptor;

pub use descriptor::{find_property, DefaultValue, PropertyDescriptor};

use crate::errors::{ErrorList, RunError};
use crate::freezable::FreezableStepData;
use crate::freeze::StepContext;
use crate::serialization::{StepSerializer, FUNCTION_SERIALIZER};
use crate::state::StateMonad;
use crate::step::CompoundStep;
use crate::steps::combine::StepCombiner;
use crate::types::{EnumDefinition, TypeReference, Value, VariableName};
use async_trait::async_trait;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;
use tokio_util::sync::CancellationToken;

#[async_trait]
pub trait StepFactory: Send + Sync + fmt::Debug {
    /// Step type name as written in SCL and YAML
    fn name(&self) -> &'static str;

    /// Alternative names accepted by the registry
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    fn summary(&self) -> &'static str {
        ""
    }

    fn properties(&self) -> &'static [PropertyDescriptor];

    /// Output type of a step built from `data`, before freezing.
    fn output_type_reference(
        &self,
        data: &FreezableStepData,
        context: &StepContext<'_>,
    ) -> Result<TypeReference, ErrorList>;

    /// Variables assigned by a step built from `data`, with their types.
    fn variables_set(
        &self,
        _data: &FreezableStepData,
        _context: &StepContext<'_>,
    ) -> Result<Vec<(VariableName, TypeReference)>, ErrorList> {
        Ok(Vec::new())
    }

    fn serializer(&self) -> &'static StepSerializer {
        &FUNCTION_SERIALIZER
    }

    /// Rules for merging this step with the step that follows it in a sequence
    fn combiners(&self) -> &'static [&'static dyn StepCombiner] {
        &[]
    }

    async fn execute(
        &self,
        step: &CompoundStep,
        state: &mut StateMonad,
        cancel: &CancellationToken,
    ) -> Result<Value, RunError>;
}

/// Registry of step factories (by name and alias) and enum types.
#[derive(Debug, Default)]
pub struct StepFactoryStore {
    /// Keyed by lowercased name or alias
    factories: IndexMap<String, &'static dyn StepFactory>,
    enums: HashMap<String, &'static EnumDefinition>,
}

static SHARED_STORE: OnceLock<StepFactoryStore> = OnceLock::new();

impl StepFactoryStore {
    /// An empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding every built-in step and enum
    pub fn builtin() -> Self {
        let mut store = Self::new();
        for factory in crate::steps::all_factories() {
            store.register(factory);
        }
        for definition in crate::types::enums::builtin_enums() {
            store.register_enum(definition);
        }
        store
    }

    /// Process-wide built-in store, created on first use
    pub fn shared() -> &'static StepFactoryStore {
        SHARED_STORE.get_or_init(Self::builtin)
    }

    pub fn register(&mut self, factory: &'static dyn StepFactory) {
        self.factories
            .insert(factory.name().to_ascii_lowercase(), factory);
        for alias in factory.aliases() {
            self.factories.insert(alias.to_ascii_lowercase(), factory);
        }
    }

    pub fn register_enum(&mut self, definition: &'static EnumDefinition) {
        self.enums
            .insert(definition.name.to_ascii_lowercase(), definition);
    }

    /// Look up a factory by name or alias, ignoring case.
    pub fn get(&self, name: &str) -> Option<&'static dyn StepFactory> {
        self.factories.get(&name.to_ascii_lowercase()).copied()
    }

    pub fn enum_definition(&self, name: &str) -> Option<&'static EnumDefinition> {
        self.enums.get(&name.to_ascii_lowercase()).copied()
    }

    /// Each registered factory once, in registration order
    pub fn factories(&self) -> impl Iterator<Item = &'static dyn StepFactory> + '_ {
        self.factories
            .iter()
            .filter(|(key, factory)| factory.name().eq_ignore_ascii_case(key))
            .map(|(_, factory)| *factory)
    }

    /// Human-readable listing of steps and their properties
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for factory in self.factories() {
            out.push_str(factory.name());
            if !factory.aliases().is_empty() {
                out.push_str(&format!(" (alias: {})", factory.aliases().join(", ")));
            }
            if !factory.summary().is_empty() {
                out.push_str(&format!(" - {}", factory.summary()));
            }
            out.push('\n');
            for property in factory.properties() {
                let requirement = if property.required { "required" } else { "optional" };
                out.push_str(&format!(
                    "    {:<14} {:<16} {:<9} {}\n",
                    property.name,
                    property.kind.to_string(),
                    requirement,
                    property.expected
                ));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup_ignores_case_and_accepts_aliases() {
        let store = StepFactoryStore::builtin();
        assert_eq!(store.get("setvariable").map(|f| f.name()), Some("SetVariable"));
        assert_eq!(store.get("ArrayLength").map(|f| f.name()), Some("ElementCount"));
        assert!(store.get("UnknownStep").is_none());
    }

    #[test]
    fn test_factories_are_listed_once() {
        let store = StepFactoryStore::builtin();
        let count = store.factories().filter(|f| f.name() == "ElementCount").count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_enum_lookup() {
        let store = StepFactoryStore::shared();
        let math = store.enum_definition("mathoperator").unwrap();
        assert_eq!(math.value("add"), Some("Add"));
        assert!(store.enum_definition("Colour").is_none());
    }

    #[test]
    fn test_describe_lists_properties() {
        let text = StepFactoryStore::builtin().describe();
        assert!(text.contains("SetVariable"));
        assert!(text.contains("Variable"));
        assert!(text.contains("required"));
    }
}
