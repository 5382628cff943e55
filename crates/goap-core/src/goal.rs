use std::borrow::Cow;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::fact::{Fact, FactKey, FactValue};
use crate::state::FactSet;

/// A named, prioritized target fact-set an agent may be assigned to pursue.
///
/// `preconditions` gate whether the goal may be offered at all; `desired` is
/// the fact-set the planner must reach. Goals are static configuration and
/// read-only at runtime.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Goal {
    name: Cow<'static, str>,
    priority: i32,
    preconditions: FactSet,
    desired: FactSet,
}

impl Goal {
    pub fn new(name: impl Into<Cow<'static, str>>, priority: i32) -> Self {
        Self {
            name: name.into(),
            priority,
            preconditions: FactSet::new(),
            desired: FactSet::new(),
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

    pub fn with_desired(mut self, key: impl Into<FactKey>, value: impl Into<FactValue>) -> Self {
        self.desired.apply(Fact::new(key, value));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn preconditions(&self) -> &FactSet {
        &self.preconditions
    }

    pub fn desired(&self) -> &FactSet {
        &self.desired
    }

    /// True when the goal may be offered under `state`.
    pub fn offerable_in(&self, state: &FactSet) -> bool {
        state.satisfies(&self.preconditions)
    }

    /// True when `state` already meets everything this goal asks for.
    pub fn satisfied_in(&self, state: &FactSet) -> bool {
        state.satisfies(&self.desired)
    }
}
