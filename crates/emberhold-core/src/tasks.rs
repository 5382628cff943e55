//! Task arbitration: the single authority deciding which goal an idle agent
//! pursues, with demand accounting over contested resources.

use std::collections::BTreeMap;

use goap_core::{FactKey, Goal};
use goap_tools::{TraceEvent, TraceSink};

use crate::actions::Capability;
use crate::agent::AgentState;
use crate::resources::{ResourceKeys, ResourceKind};
use crate::world::Colony;

/// One resource line of a recipe.
#[derive(Debug, Clone)]
pub struct ResourceCost {
    pub kind: ResourceKind,
    pub amount: i64,
}

/// A crafting recipe: what gets built and what it drains from the
/// stockpile. Recipes whose crafted flag is already true stop contributing
/// to demand.
#[derive(Debug, Clone)]
pub struct Recipe {
    pub name: String,
    pub crafted_key: FactKey,
    pub costs: Vec<ResourceCost>,
}

/// A goal on offer, with its arbitration metadata.
#[derive(Debug, Clone)]
pub struct TaskEntry {
    goal: Goal,
    provides: Option<ResourceKind>,
    survival: bool,
}

impl TaskEntry {
    pub fn new(goal: Goal) -> Self {
        Self {
            goal,
            provides: None,
            survival: false,
        }
    }

    /// Mark this as a resource-gathering goal producing `kind`; it is
    /// offered only while demand for the resource is uncovered, and each
    /// grant is tracked in the demand ledger.
    pub fn providing(mut self, kind: ResourceKind) -> Self {
        self.provides = Some(kind);
        self
    }

    /// Survival goals are offered only through the danger override.
    pub fn survival(mut self) -> Self {
        self.survival = true;
        self
    }

    pub fn goal(&self) -> &Goal {
        &self.goal
    }

    pub fn provides(&self) -> Option<&ResourceKind> {
        self.provides.as_ref()
    }

    pub fn is_survival(&self) -> bool {
        self.survival
    }
}

/// The shared scheduler. Hands out goals by priority, prevents
/// over-assignment of resource goals via the demand ledger, and stops
/// assigning everything once the win-condition fact is true.
#[derive(Debug)]
pub struct TaskBoard {
    entries: Vec<TaskEntry>,
    recipes: Vec<Recipe>,
    ledger: BTreeMap<ResourceKind, u32>,
    win_key: FactKey,
}

impl TaskBoard {
    pub fn new(mut entries: Vec<TaskEntry>, recipes: Vec<Recipe>, win_key: FactKey) -> Self {
        // Stable sort: equal priorities keep their configuration order.
        entries.sort_by(|a, b| b.goal.priority().cmp(&a.goal.priority()));
        Self {
            entries,
            recipes,
            ledger: BTreeMap::new(),
            win_key,
        }
    }

    pub fn win_condition(&self) -> &FactKey {
        &self.win_key
    }

    pub fn entries(&self) -> &[TaskEntry] {
        &self.entries
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn goal_named(&self, name: &str) -> Option<&Goal> {
        self.entries
            .iter()
            .find(|entry| entry.goal.name() == name)
            .map(TaskEntry::goal)
    }

    /// Assigned-but-unsettled grants for `kind`.
    pub fn in_progress(&self, kind: &ResourceKind) -> u32 {
        self.ledger.get(kind).copied().unwrap_or(0)
    }

    /// Pick a goal for an idle agent, or `None` to send it home.
    pub fn request_task(
        &mut self,
        tick: u64,
        agent: &AgentState,
        capabilities: &[Capability],
        world: &Colony,
        trace: &mut dyn TraceSink,
    ) -> Option<Goal> {
        // Global stop once the colony has won.
        if world.facts.is_true(&self.win_key) {
            return None;
        }

        let snapshot = world.facts.snapshot();

        // Danger override: an endangered agent gets a survival goal before
        // anything else, capability permitting.
        let mut granted: Option<(Goal, Option<ResourceKind>)> = None;
        if agent.in_danger(world) {
            granted = self
                .entries
                .iter()
                .filter(|entry| entry.survival)
                .find(|entry| Self::agent_can_contribute(capabilities, &entry.goal))
                .map(|entry| (entry.goal.clone(), None));
        }

        if granted.is_none() {
            for entry in self.entries.iter().filter(|entry| !entry.survival) {
                match &entry.provides {
                    Some(kind) => {
                        if !self.resource_still_needed(kind, world) {
                            continue;
                        }
                    }
                    None => {
                        if entry.goal.satisfied_in(&snapshot) {
                            continue;
                        }
                    }
                }
                if !entry.goal.offerable_in(&snapshot) {
                    continue;
                }
                if !Self::agent_can_contribute(capabilities, &entry.goal) {
                    continue;
                }
                granted = Some((entry.goal.clone(), entry.provides.clone()));
                break;
            }
        }

        let (goal, provides) = granted?;
        if let Some(kind) = provides {
            *self.ledger.entry(kind).or_insert(0) += 1;
        }
        trace.record(TraceEvent::new(tick, "task.assign").with_agent(agent.id.0));
        Some(goal)
    }

    pub fn complete_task(&mut self, tick: u64, goal: &Goal, trace: &mut dyn TraceSink) {
        tracing::info!(goal = goal.name(), "Task completed");
        trace.record(TraceEvent::new(tick, "task.complete"));
        self.settle(goal);
    }

    pub fn fail_task(&mut self, tick: u64, goal: &Goal, trace: &mut dyn TraceSink) {
        tracing::debug!(goal = goal.name(), "Task failed");
        trace.record(TraceEvent::new(tick, "task.fail"));
        self.settle(goal);
    }

    /// A resource goal is needed while committed stock, units on the
    /// ground, and in-flight assignments together cover less than the total
    /// demand of the unbuilt recipes.
    pub fn resource_still_needed(&self, kind: &ResourceKind, world: &Colony) -> bool {
        let demand = self.total_demand(kind, world);
        if demand == 0 {
            return false;
        }
        let keys = ResourceKeys::for_kind(kind);
        let stock = world.facts.int(&keys.stockpile);
        let on_ground = world.resources.ground_amount(kind);
        let in_flight = i64::from(self.in_progress(kind));
        stock + on_ground + in_flight < demand
    }

    fn total_demand(&self, kind: &ResourceKind, world: &Colony) -> i64 {
        self.recipes
            .iter()
            .filter(|recipe| !world.facts.is_true(&recipe.crafted_key))
            .flat_map(|recipe| &recipe.costs)
            .filter(|cost| cost.kind == *kind)
            .map(|cost| cost.amount)
            .sum()
    }

    /// Capability match: some action's declared effects overlap the goal's
    /// desired facts.
    fn agent_can_contribute(capabilities: &[Capability], goal: &Goal) -> bool {
        capabilities.iter().any(|capability| {
            capability
                .spec()
                .effects()
                .iter()
                .any(|fact| goal.desired().contains(&fact))
        })
    }

    /// Both completion and failure release the grant. The ledger never goes
    /// negative, so settling the same goal twice is harmless.
    fn settle(&mut self, goal: &Goal) {
        let Some(entry) = self
            .entries
            .iter()
            .find(|entry| entry.goal.name() == goal.name())
        else {
            return;
        };
        let Some(kind) = &entry.provides else {
            return;
        };
        if let Some(count) = self.ledger.get_mut(kind) {
            *count = count.saturating_sub(1);
        }
    }
}
