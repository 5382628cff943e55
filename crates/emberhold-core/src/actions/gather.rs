use super::{ActionBehavior, ActionStatus};
use crate::agent::AgentState;
use crate::resources::{ClaimTarget, NodeId, ResourceKeys, ResourceKind};
use crate::world::{Colony, Position};

/// Harvest one unit from the nearest unclaimed source node and drop it as a
/// ground pickup for delivery.
pub struct GatherBehavior {
    kind: ResourceKind,
    keys: ResourceKeys,
    collect_ticks: u32,
    remaining: u32,
    node: Option<NodeId>,
    target: Option<Position>,
}

impl GatherBehavior {
    pub fn new(kind: ResourceKind, collect_ticks: u32) -> Self {
        let keys = ResourceKeys::for_kind(&kind);
        Self {
            kind,
            keys,
            collect_ticks,
            remaining: collect_ticks,
            node: None,
            target: None,
        }
    }
}

impl ActionBehavior for GatherBehavior {
    fn reset(&mut self, world: &mut Colony, agent: &mut AgentState) {
        if let Some(node) = self.node.take() {
            world.resources.release(ClaimTarget::Node(node), agent.id);
        }
        self.target = None;
        self.remaining = self.collect_ticks;
    }

    fn check(&self, world: &Colony, agent: &AgentState) -> bool {
        world
            .resources
            .nearest_available_node(&self.kind, agent.position)
            .is_some()
    }

    fn setup(&mut self, world: &mut Colony, agent: &mut AgentState) -> bool {
        let Some(node) = world
            .resources
            .nearest_available_node(&self.kind, agent.position)
        else {
            return false;
        };
        if !world.resources.try_claim(ClaimTarget::Node(node), agent.id) {
            return false;
        }
        self.target = world.resources.node(node).map(|n| n.position);
        self.node = Some(node);
        self.target.is_some()
    }

    fn perform(&mut self, world: &mut Colony, agent: &mut AgentState) -> ActionStatus {
        let Some(node) = self.node else {
            return ActionStatus::Failed;
        };

        if self.remaining > 0 {
            self.remaining -= 1;
            return ActionStatus::Running;
        }

        // The node may have been emptied or destroyed underneath us.
        let Some(left) = world.resources.deplete_node(node, 1) else {
            return ActionStatus::Failed;
        };

        world
            .resources
            .spawn_pickup(self.kind.clone(), 1, agent.position);
        world.facts.set(self.keys.ready.clone(), true);
        world.facts.set(self.keys.stocked.clone(), false);

        if left == 0 {
            world.resources.remove_node(node);
        } else {
            world.resources.release(ClaimTarget::Node(node), agent.id);
        }
        self.node = None;
        ActionStatus::Complete
    }

    fn requires_in_range(&self) -> bool {
        true
    }

    fn target(&self) -> Option<Position> {
        self.target
    }
}
