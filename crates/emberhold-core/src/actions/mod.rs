//! Runtime action protocol: one declarative spec plus one behavior
//! implementation per capability, instantiated fresh for every plan.

mod craft;
mod deliver;
mod gather;
mod retreat;

pub use craft::CraftBehavior;
pub use deliver::DeliverBehavior;
pub use gather::GatherBehavior;
pub use retreat::{RetreatBehavior, IS_SAFE};

use goap_core::{ActionSpec, FactKey};

use crate::agent::AgentState;
use crate::resources::ResourceKind;
use crate::world::{Colony, Position};

/// Outcome of one `perform` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStatus {
    Running,
    Complete,
    Failed,
}

/// The execution half of an action.
///
/// `check` is the procedural precondition: a live, non-mutating query run
/// when filtering usable actions before planning, for conditions the
/// declarative fact-sets cannot promise (an unclaimed node nearby, stock
/// actually in the pile). `setup` commits to a concrete target and may claim
/// it; `reset` undoes that commitment, releasing whatever was claimed.
pub trait ActionBehavior {
    fn reset(&mut self, world: &mut Colony, agent: &mut AgentState);

    fn check(&self, world: &Colony, agent: &AgentState) -> bool;

    /// Returns false when no committable target exists, which aborts the
    /// plan.
    fn setup(&mut self, world: &mut Colony, agent: &mut AgentState) -> bool;

    fn perform(&mut self, world: &mut Colony, agent: &mut AgentState) -> ActionStatus;

    /// Whether the agent must stand near `target` before `perform` runs.
    fn requires_in_range(&self) -> bool;

    fn target(&self) -> Option<Position>;

    /// Survival actions are exempt from the emergency interrupt.
    fn is_survival(&self) -> bool {
        false
    }
}

/// Behavior construction data, declared in configuration alongside the
/// action's declarative fact-sets.
#[derive(Debug, Clone)]
pub enum BehaviorSpec {
    Gather {
        resource: ResourceKind,
        collect_ticks: u32,
    },
    Deliver {
        resource: ResourceKind,
    },
    Craft {
        crafted_key: FactKey,
        costs: Vec<(FactKey, i64)>,
        work_ticks: u32,
    },
    Retreat {
        distance: f32,
    },
}

impl BehaviorSpec {
    pub fn instantiate(&self) -> Box<dyn ActionBehavior> {
        match self {
            BehaviorSpec::Gather {
                resource,
                collect_ticks,
            } => Box::new(GatherBehavior::new(resource.clone(), *collect_ticks)),
            BehaviorSpec::Deliver { resource } => Box::new(DeliverBehavior::new(resource.clone())),
            BehaviorSpec::Craft {
                crafted_key,
                costs,
                work_ticks,
            } => Box::new(CraftBehavior::new(
                crafted_key.clone(),
                costs.clone(),
                *work_ticks,
            )),
            BehaviorSpec::Retreat { distance } => Box::new(RetreatBehavior::new(*distance)),
        }
    }
}

/// One unit of capability: the planner-facing spec and the behavior that
/// realizes it.
#[derive(Debug, Clone)]
pub struct Capability {
    spec: ActionSpec,
    behavior: BehaviorSpec,
}

impl Capability {
    pub fn new(spec: ActionSpec, behavior: BehaviorSpec) -> Self {
        Self { spec, behavior }
    }

    pub fn spec(&self) -> &ActionSpec {
        &self.spec
    }

    /// Run the procedural precondition with a fresh, throwaway behavior.
    /// Re-run before every planning attempt; availability shifts from tick
    /// to tick.
    pub fn check(&self, world: &Colony, agent: &AgentState) -> bool {
        self.behavior.instantiate().check(world, agent)
    }

    /// A fresh runtime copy bound to one plan.
    pub fn instantiate(&self) -> ActionInstance {
        ActionInstance::new(self.spec.clone(), self.behavior.instantiate())
    }
}

/// An action bound to one agent for the lifetime of one plan. Execution
/// state (target, timers, completion) is private to this instance; the
/// template it came from is never mutated.
pub struct ActionInstance {
    spec: ActionSpec,
    behavior: Box<dyn ActionBehavior>,
    done: bool,
    set_up: bool,
}

impl ActionInstance {
    pub fn new(spec: ActionSpec, behavior: Box<dyn ActionBehavior>) -> Self {
        Self {
            spec,
            behavior,
            done: false,
            set_up: false,
        }
    }

    pub fn name(&self) -> &str {
        self.spec.name()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn was_set_up(&self) -> bool {
        self.set_up
    }

    pub fn requires_in_range(&self) -> bool {
        self.behavior.requires_in_range()
    }

    pub fn target(&self) -> Option<Position> {
        self.behavior.target()
    }

    pub fn is_survival(&self) -> bool {
        self.behavior.is_survival()
    }

    pub fn setup(&mut self, world: &mut Colony, agent: &mut AgentState) -> bool {
        self.set_up = self.behavior.setup(world, agent);
        self.set_up
    }

    pub fn perform(&mut self, world: &mut Colony, agent: &mut AgentState) -> ActionStatus {
        let status = self.behavior.perform(world, agent);
        if status == ActionStatus::Complete {
            self.done = true;
        }
        status
    }

    /// Return to the pre-setup state, releasing any claims the behavior
    /// holds. Called when a plan aborts; actions that were never set up hold
    /// nothing and are simply dropped.
    pub fn reset(&mut self, world: &mut Colony, agent: &mut AgentState) {
        self.behavior.reset(world, agent);
        self.done = false;
        self.set_up = false;
    }
}
