#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::action::ActionSpec;

/// An ordered action sequence expected to transform the start state into one
/// satisfying a goal. Consumed front-to-back by the executor.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Plan {
    steps: Vec<ActionSpec>,
    total_cost: f64,
}

impl Plan {
    pub fn new(steps: Vec<ActionSpec>) -> Self {
        let total_cost = steps.iter().map(ActionSpec::cost).sum();
        Self { steps, total_cost }
    }

    pub fn steps(&self) -> &[ActionSpec] {
        &self.steps
    }

    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
