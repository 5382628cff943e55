//! Gatherable resources, ground pickups, and the claim table that arbitrates
//! them between agents.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use goap_core::FactKey;

use crate::world::Position;

/// Stable identifier of one agent, ordered so per-tick iteration is
/// deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent:{}", self.0)
    }
}

/// Configuration-driven name of a contested resource class (logs, iron, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceKind(Cow<'static, str>);

impl ResourceKind {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for ResourceKind {
    fn from(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }
}

impl From<String> for ResourceKind {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// World-fact keys derived from a resource kind. Keeping the derivation in
/// one place means behaviors, arbitration, and configuration all agree on
/// the vocabulary.
#[derive(Debug, Clone)]
pub struct ResourceKeys {
    pub ready: FactKey,
    pub stocked: FactKey,
    pub stockpile: FactKey,
}

impl ResourceKeys {
    pub fn for_kind(kind: &ResourceKind) -> Self {
        Self {
            ready: FactKey::new(format!("{kind}_ready_for_pickup")),
            stocked: FactKey::new(format!("{kind}_stocked")),
            stockpile: FactKey::new(format!("{kind}_in_stockpile")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PickupId(pub u64);

/// Key into the claim table: anything an agent can hold exclusively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClaimTarget {
    Node(NodeId),
    Pickup(PickupId),
}

/// A gatherable node in the world (a tree, a mine face, a crystal seam).
#[derive(Debug, Clone)]
pub struct SourceNode {
    pub id: NodeId,
    pub kind: ResourceKind,
    pub position: Position,
    pub quantity: u32,
}

/// A prepared unit dropped on the ground, awaiting delivery.
#[derive(Debug, Clone)]
pub struct Pickup {
    pub id: PickupId,
    pub kind: ResourceKind,
    pub position: Position,
    pub amount: i64,
}

/// Registry of source nodes, ground pickups, and the single ownership table
/// arbitrating exclusive access to them.
///
/// The claim table is the only mutual-exclusion mechanism: `setup` claims,
/// `reset`/consumption releases, and a losing agent simply finds no eligible
/// target on its next procedural check. There is no retry or backoff.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    nodes: BTreeMap<NodeId, SourceNode>,
    pickups: BTreeMap<PickupId, Pickup>,
    claims: BTreeMap<ClaimTarget, AgentId>,
    next_node: u64,
    next_pickup: u64,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, kind: ResourceKind, position: Position, quantity: u32) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        self.nodes.insert(
            id,
            SourceNode {
                id,
                kind,
                position,
                quantity,
            },
        );
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&SourceNode> {
        self.nodes.get(&id)
    }

    /// Take `amount` units out of a node. `None` when the node no longer
    /// exists or holds too little; `Some(remaining)` otherwise.
    pub fn deplete_node(&mut self, id: NodeId, amount: u32) -> Option<u32> {
        let node = self.nodes.get_mut(&id)?;
        if node.quantity < amount {
            return None;
        }
        node.quantity -= amount;
        Some(node.quantity)
    }

    /// Remove a node outright (depleted, or destroyed by the scenario),
    /// dropping any claim on it.
    pub fn remove_node(&mut self, id: NodeId) -> Option<SourceNode> {
        self.claims.remove(&ClaimTarget::Node(id));
        self.nodes.remove(&id)
    }

    pub fn spawn_pickup(&mut self, kind: ResourceKind, amount: i64, position: Position) -> PickupId {
        let id = PickupId(self.next_pickup);
        self.next_pickup += 1;
        self.pickups.insert(
            id,
            Pickup {
                id,
                kind,
                position,
                amount,
            },
        );
        id
    }

    pub fn pickup(&self, id: PickupId) -> Option<&Pickup> {
        self.pickups.get(&id)
    }

    /// Remove a pickup from the ground (it is being carried), dropping any
    /// claim on it.
    pub fn remove_pickup(&mut self, id: PickupId) -> Option<Pickup> {
        self.claims.remove(&ClaimTarget::Pickup(id));
        self.pickups.remove(&id)
    }

    /// Claim `target` for `agent`. Fails when another agent already holds
    /// it; re-claiming one's own target succeeds.
    pub fn try_claim(&mut self, target: ClaimTarget, agent: AgentId) -> bool {
        match self.claims.get(&target) {
            Some(owner) => *owner == agent,
            None => {
                self.claims.insert(target, agent);
                true
            }
        }
    }

    /// Release a claim. Only the claimant can release; anyone else's call is
    /// ignored, which keeps a double release from freeing someone's claim.
    pub fn release(&mut self, target: ClaimTarget, agent: AgentId) {
        if self.claims.get(&target) == Some(&agent) {
            self.claims.remove(&target);
        }
    }

    pub fn claimant(&self, target: ClaimTarget) -> Option<AgentId> {
        self.claims.get(&target).copied()
    }

    fn node_available(&self, node: &SourceNode) -> bool {
        node.quantity > 0 && !self.claims.contains_key(&ClaimTarget::Node(node.id))
    }

    /// Nearest unclaimed, non-empty node of `kind`. Distance ties break
    /// toward the lower id so concurrent agents see one answer.
    pub fn nearest_available_node(&self, kind: &ResourceKind, from: Position) -> Option<NodeId> {
        self.nodes
            .values()
            .filter(|node| node.kind == *kind && self.node_available(node))
            .min_by(|a, b| {
                from.distance_squared(a.position)
                    .total_cmp(&from.distance_squared(b.position))
                    .then(a.id.cmp(&b.id))
            })
            .map(|node| node.id)
    }

    pub fn available_node_count(&self, kind: &ResourceKind) -> usize {
        self.nodes
            .values()
            .filter(|node| node.kind == *kind && self.node_available(node))
            .count()
    }

    /// Nearest unclaimed pickup of `kind`.
    pub fn nearest_available_pickup(&self, kind: &ResourceKind, from: Position) -> Option<PickupId> {
        self.pickups
            .values()
            .filter(|pickup| {
                pickup.kind == *kind && !self.claims.contains_key(&ClaimTarget::Pickup(pickup.id))
            })
            .min_by(|a, b| {
                from.distance_squared(a.position)
                    .total_cmp(&from.distance_squared(b.position))
                    .then(a.id.cmp(&b.id))
            })
            .map(|pickup| pickup.id)
    }

    /// Units of `kind` lying on the ground, claimed or not. Feeds the demand
    /// accounting: a claimed pickup is still on its way to the stockpile.
    pub fn ground_amount(&self, kind: &ResourceKind) -> i64 {
        self.pickups
            .values()
            .filter(|pickup| pickup.kind == *kind)
            .map(|pickup| pickup.amount)
            .sum()
    }
}
