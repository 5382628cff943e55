use std::borrow::Cow;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::fact::{Fact, FactKey, FactValue};
use crate::state::FactSet;

/// Declarative action template: what an action promises to the planner.
///
/// A spec is fixed at configuration time and shared read-only between
/// agents. Runtime execution state (targets, timers, completion) lives in
/// the per-plan instance the host simulation wraps around a spec, so
/// concurrent agents never share mutable state through a template.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ActionSpec {
    name: Cow<'static, str>,
    cost: f64,
    preconditions: FactSet,
    effects: FactSet,
}

impl ActionSpec {
    /// `cost` must be positive; zero-cost actions would make "cheapest plan"
    /// degenerate.
    pub fn new(name: impl Into<Cow<'static, str>>, cost: f64) -> Self {
        debug_assert!(cost > 0.0, "action cost must be positive");
        Self {
            name: name.into(),
            cost,
            preconditions: FactSet::new(),
            effects: FactSet::new(),
        }
    }

    pub fn with_precondition(
        mut self,
        key: impl Into<FactKey>,
        value: impl Into<FactValue>,
    ) -> Self {
        self.preconditions.apply(Fact::new(key, value));
        self
    }

    pub fn with_effect(mut self, key: impl Into<FactKey>, value: impl Into<FactValue>) -> Self {
        self.effects.apply(Fact::new(key, value));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn preconditions(&self) -> &FactSet {
        &self.preconditions
    }

    pub fn effects(&self) -> &FactSet {
        &self.effects
    }

    /// True when every declared precondition is literally present in `state`.
    pub fn applicable_in(&self, state: &FactSet) -> bool {
        state.satisfies(&self.preconditions)
    }

    /// The state reached by applying this action's effects to `state`.
    pub fn apply_to(&self, state: &FactSet) -> FactSet {
        state.applying(&self.effects)
    }
}
