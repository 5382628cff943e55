use super::{ActionBehavior, ActionStatus};
use crate::agent::AgentState;
use crate::resources::{ClaimTarget, PickupId, ResourceKeys, ResourceKind};
use crate::world::{Colony, Position};

/// Claim the nearest ground pickup, carry it to the build site, and bank it
/// in the stockpile.
pub struct DeliverBehavior {
    kind: ResourceKind,
    keys: ResourceKeys,
    pickup: Option<PickupId>,
    carrying: Option<i64>,
    target: Option<Position>,
}

impl DeliverBehavior {
    pub fn new(kind: ResourceKind) -> Self {
        let keys = ResourceKeys::for_kind(&kind);
        Self {
            kind,
            keys,
            pickup: None,
            carrying: None,
            target: None,
        }
    }
}

impl ActionBehavior for DeliverBehavior {
    fn reset(&mut self, world: &mut Colony, agent: &mut AgentState) {
        if let Some(pickup) = self.pickup.take() {
            world.resources.release(ClaimTarget::Pickup(pickup), agent.id);
        }
        if let Some(amount) = self.carrying.take() {
            // Carried goods don't survive an abort.
            tracing::debug!(agent = %agent.name, amount, kind = %self.kind, "Dropped carried resource");
        }
        self.target = None;
    }

    fn check(&self, _world: &Colony, _agent: &AgentState) -> bool {
        // Nothing live to probe at plan time: the ready fact promises the
        // pickup declaratively, and the concrete one is resolved at setup.
        true
    }

    fn setup(&mut self, world: &mut Colony, agent: &mut AgentState) -> bool {
        let Some(pickup) = world
            .resources
            .nearest_available_pickup(&self.kind, agent.position)
        else {
            return false;
        };
        if !world.resources.try_claim(ClaimTarget::Pickup(pickup), agent.id) {
            return false;
        }
        self.target = world.resources.pickup(pickup).map(|p| p.position);
        self.pickup = Some(pickup);
        self.target.is_some()
    }

    fn perform(&mut self, world: &mut Colony, _agent: &mut AgentState) -> ActionStatus {
        if let Some(amount) = self.carrying.take() {
            // Standing at the build site with the goods.
            world.facts.increment(self.keys.stockpile.clone(), amount);
            world.facts.set(self.keys.stocked.clone(), true);
            return ActionStatus::Complete;
        }

        let Some(pickup) = self.pickup.take() else {
            return ActionStatus::Failed;
        };
        let Some(found) = world.resources.remove_pickup(pickup) else {
            // Taken or destroyed while we walked over.
            return ActionStatus::Failed;
        };

        self.carrying = Some(found.amount);
        if world.resources.ground_amount(&self.kind) == 0 {
            world.facts.set(self.keys.ready.clone(), false);
        }
        self.target = Some(world.build_site());
        ActionStatus::Running
    }

    fn requires_in_range(&self) -> bool {
        true
    }

    fn target(&self) -> Option<Position> {
        self.target
    }
}
