//! Merging adjacent steps in a sequence
//!
//! Some step types can fold the step after them into themselves, e.g. two
//! appends of constant text to the same variable. The pass walks the
//! sequence from the end with a stack so each merged step is immediately
//! tried against the next one again.

use crate::step::Step;
use crate::types::TypeReference;
use std::fmt;

pub trait StepCombiner: Send + Sync + fmt::Debug {
    /// A single step equivalent to running `first` then `second`, if this
    /// rule applies.
    fn try_combine(&self, first: &Step, second: &Step) -> Option<Step>;
}

/// Combine adjacent Unit steps where a combiner applies.
pub fn combine_steps(steps: &[Step]) -> Vec<Step> {
    let mut stack: Vec<Step> = Vec::with_capacity(steps.len());

    for step in steps.iter().rev() {
        let mut current = step.clone();
        while let Some(next) = stack.pop() {
            match try_combine_pair(&current, &next) {
                Some(combined) => {
                    tracing::debug!(step = %current.name(), "combined with following step");
                    current = combined;
                }
                None => {
                    stack.push(next);
                    break;
                }
            }
        }
        stack.push(current);
    }

    stack.reverse();
    stack
}

fn try_combine_pair(first: &Step, second: &Step) -> Option<Step> {
    if first.output_type() != TypeReference::UNIT || second.output_type() != TypeReference::UNIT {
        return None;
    }
    first
        .as_compound()?
        .factory()
        .combiners()
        .iter()
        .find_map(|combiner| combiner.try_combine(first, second))
}
