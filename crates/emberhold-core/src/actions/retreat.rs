use goap_core::FactKey;

use super::{ActionBehavior, ActionStatus};
use crate::agent::AgentState;
use crate::world::{Colony, Position};

/// Agent-overlay fact raised when a retreat completes and cleared whenever
/// the agent takes damage.
pub const IS_SAFE: FactKey = FactKey::from_static("is_safe");

/// Flee directly away from the nearest threat. The designated survival
/// action: the emergency interrupt never aborts it.
pub struct RetreatBehavior {
    distance: f32,
    target: Option<Position>,
}

impl RetreatBehavior {
    pub fn new(distance: f32) -> Self {
        Self {
            distance,
            target: None,
        }
    }
}

impl ActionBehavior for RetreatBehavior {
    fn reset(&mut self, _world: &mut Colony, _agent: &mut AgentState) {
        self.target = None;
    }

    fn check(&self, world: &Colony, agent: &AgentState) -> bool {
        agent.in_danger(world)
    }

    fn setup(&mut self, world: &mut Colony, agent: &mut AgentState) -> bool {
        let Some(threat) = world.nearest_threat(agent.position) else {
            return false;
        };
        self.target = Some(agent.position.away_from(threat, self.distance));
        true
    }

    fn perform(&mut self, _world: &mut Colony, agent: &mut AgentState) -> ActionStatus {
        // Only called once the agent reached the retreat point.
        agent.facts.set(IS_SAFE, true);
        ActionStatus::Complete
    }

    fn requires_in_range(&self) -> bool {
        true
    }

    fn target(&self) -> Option<Position> {
        self.target
    }

    fn is_survival(&self) -> bool {
        true
    }
}
