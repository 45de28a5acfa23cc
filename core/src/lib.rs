pub mod cli;
pub mod config;
pub mod errors;
pub mod factory;
pub mod freezable;
pub mod freeze;
pub mod parser;
pub mod serialization;
pub mod state;
pub mod step;
pub mod steps;
pub mod types;

// Re-export the main entry points
pub use errors::{ErrorList, RunError, SclError};
pub use factory::{StepFactory, StepFactoryStore};
pub use freezable::{FreezableStep, FreezableStepData, StepMember};
pub use freeze::{freeze, StepContext};
pub use parser::{parse_program, parse_step};
pub use state::{RunSettings, StateMonad};
pub use step::Step;
pub use types::*;
