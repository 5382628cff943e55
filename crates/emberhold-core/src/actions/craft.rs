use goap_core::FactKey;

use super::{ActionBehavior, ActionStatus};
use crate::agent::AgentState;
use crate::world::{Colony, Position};

/// Consume stockpiled resources at the build site and raise the crafted
/// flag.
///
/// Numeric thresholds live here, in the procedural check, not in the
/// declarative fact-sets: the planner cannot compare counters, so "enough in
/// the pile" is a live query against the stockpile facts.
pub struct CraftBehavior {
    crafted_key: FactKey,
    costs: Vec<(FactKey, i64)>,
    work_ticks: u32,
    remaining: u32,
    target: Option<Position>,
}

impl CraftBehavior {
    pub fn new(crafted_key: FactKey, costs: Vec<(FactKey, i64)>, work_ticks: u32) -> Self {
        Self {
            crafted_key,
            costs,
            work_ticks,
            remaining: work_ticks,
            target: None,
        }
    }

    fn stock_covers_costs(&self, world: &Colony) -> bool {
        self.costs
            .iter()
            .all(|(key, amount)| world.facts.int(key) >= *amount)
    }
}

impl ActionBehavior for CraftBehavior {
    fn reset(&mut self, _world: &mut Colony, _agent: &mut AgentState) {
        self.remaining = self.work_ticks;
        self.target = None;
    }

    fn check(&self, world: &Colony, _agent: &AgentState) -> bool {
        !world.facts.is_true(&self.crafted_key) && self.stock_covers_costs(world)
    }

    fn setup(&mut self, world: &mut Colony, _agent: &mut AgentState) -> bool {
        self.target = Some(world.build_site());
        true
    }

    fn perform(&mut self, world: &mut Colony, agent: &mut AgentState) -> ActionStatus {
        if self.remaining > 0 {
            self.remaining -= 1;
            return ActionStatus::Running;
        }

        // Another crafter may have drained the pile while we worked.
        if !self.stock_covers_costs(world) {
            return ActionStatus::Failed;
        }

        for (key, amount) in &self.costs {
            world.facts.increment(key.clone(), -amount);
        }
        world.facts.set(self.crafted_key.clone(), true);
        tracing::info!(agent = %agent.name, item = %self.crafted_key, "Crafted item");
        ActionStatus::Complete
    }

    fn requires_in_range(&self) -> bool {
        true
    }

    fn target(&self) -> Option<Position> {
        self.target
    }
}
