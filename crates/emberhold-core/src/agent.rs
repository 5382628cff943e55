//! Per-agent execution: vitals, movement, and the state machine that turns
//! assigned goals into plans and plans into work.

use std::collections::VecDeque;

use goap_core::{ActionSpec, FactSet, FactStore, Goal, Plan};
use goap_planner::Planner;
use goap_tools::{TraceEvent, TraceSink};

use crate::actions::{ActionInstance, ActionStatus, Capability, IS_SAFE};
use crate::resources::AgentId;
use crate::tasks::TaskBoard;
use crate::world::{Colony, Position};

/// Health and the under-attack alarm, the combat-signal collaborator.
#[derive(Debug, Clone)]
pub struct Vitals {
    max_health: i32,
    health: i32,
    under_attack_ticks: u32,
    danger_fraction: f64,
}

impl Vitals {
    /// `danger_fraction` is the health fraction below which the agent
    /// counts as endangered while threats are active.
    pub fn new(max_health: i32, danger_fraction: f64) -> Self {
        Self {
            max_health,
            health: max_health,
            under_attack_ticks: 0,
            danger_fraction,
        }
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn health_fraction(&self) -> f64 {
        if self.max_health <= 0 {
            return 0.0;
        }
        f64::from(self.health) / f64::from(self.max_health)
    }

    pub fn is_under_attack(&self) -> bool {
        self.under_attack_ticks > 0
    }

    pub fn danger_fraction(&self) -> f64 {
        self.danger_fraction
    }

    /// Take a hit; the agent feels under attack for `linger_ticks` more
    /// ticks.
    pub fn apply_damage(&mut self, amount: i32, linger_ticks: u32) {
        self.health = (self.health - amount).max(0);
        self.under_attack_ticks = self.under_attack_ticks.max(linger_ticks);
    }

    /// Advance the under-attack alarm by one tick.
    pub fn decay_alarm(&mut self) {
        self.under_attack_ticks = self.under_attack_ticks.saturating_sub(1);
    }
}

/// The movement collaborator: accepts a destination, reports arrival. The
/// simulation advances positions one step per tick.
#[derive(Debug, Clone)]
pub struct Mover {
    destination: Option<Position>,
    speed: f32,
}

impl Mover {
    pub fn new(speed: f32) -> Self {
        Self {
            destination: None,
            speed,
        }
    }

    pub fn set_destination(&mut self, destination: Position) {
        self.destination = Some(destination);
    }

    pub fn stop(&mut self) {
        self.destination = None;
    }

    pub fn has_arrived(&self, position: Position) -> bool {
        match self.destination {
            Some(destination) => position == destination,
            None => true,
        }
    }

    /// Where one tick of walking from `position` ends up; `None` when there
    /// is nowhere to go.
    pub fn next_position(&self, position: Position) -> Option<Position> {
        let destination = self.destination?;
        Some(position.moved_toward(destination, self.speed))
    }
}

/// The body-and-memory half of an agent, handed to action behaviors.
#[derive(Debug)]
pub struct AgentState {
    pub id: AgentId,
    pub name: String,
    pub position: Position,
    pub home: Position,
    pub vitals: Vitals,
    /// Agent-private facts overlaid on the world snapshot when planning.
    pub facts: FactStore,
}

impl AgentState {
    /// The emergency predicate: under attack, or wounded while the world
    /// still holds active threats.
    pub fn in_danger(&self, world: &Colony) -> bool {
        self.vitals.is_under_attack()
            || (self.vitals.health_fraction() < self.vitals.danger_fraction()
                && world.has_threats())
    }
}

/// One autonomous agent: capabilities, the active goal and plan, and the
/// per-tick state machine driving them.
pub struct Agent {
    state: AgentState,
    mover: Mover,
    capabilities: Vec<Capability>,
    planner: Planner,
    goal: Option<Goal>,
    plan: VecDeque<ActionInstance>,
    cooldown: u32,
    plan_cooldown_ticks: u32,
    proximity_radius: f32,
}

impl Agent {
    pub fn new(id: AgentId, name: impl Into<String>, home: Position, vitals: Vitals) -> Self {
        let mut facts = FactStore::new();
        facts.set(IS_SAFE, true);
        Self {
            state: AgentState {
                id,
                name: name.into(),
                position: home,
                home,
                vitals,
                facts,
            },
            mover: Mover::new(1.0),
            capabilities: Vec::new(),
            planner: Planner::new(),
            goal: None,
            plan: VecDeque::new(),
            cooldown: 0,
            plan_cooldown_ticks: 8,
            proximity_radius: 5.0,
        }
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.mover = Mover::new(speed);
        self
    }

    pub fn with_plan_cooldown(mut self, ticks: u32) -> Self {
        self.plan_cooldown_ticks = ticks;
        self
    }

    pub fn with_proximity_radius(mut self, radius: f32) -> Self {
        self.proximity_radius = radius;
        self
    }

    pub fn id(&self) -> AgentId {
        self.state.id
    }

    pub fn name(&self) -> &str {
        &self.state.name
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn position(&self) -> Position {
        self.state.position
    }

    pub fn current_goal(&self) -> Option<&Goal> {
        self.goal.as_ref()
    }

    pub fn plan_len(&self) -> usize {
        self.plan.len()
    }

    pub fn is_idle(&self) -> bool {
        self.goal.is_none() && self.plan.is_empty()
    }

    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    /// One state-machine step. Movement is applied separately by the
    /// simulation so every agent decides against the same world state.
    pub fn tick(
        &mut self,
        tick: u64,
        world: &mut Colony,
        tasks: &mut TaskBoard,
        trace: &mut dyn TraceSink,
    ) {
        // Emergency interrupt first, even mid-execution. Survival actions
        // are exempt, otherwise the retreat would abort itself.
        if self.should_interrupt(world) {
            self.abort_plan(tick, "emergency interrupt", world, tasks, trace);
        }

        if self.cooldown > 0 {
            self.cooldown -= 1;
        }

        if self.goal.is_none() && self.cooldown == 0 {
            self.cooldown = self.plan_cooldown_ticks;
            match tasks.request_task(tick, &self.state, &self.capabilities, world, trace) {
                Some(goal) => {
                    tracing::info!(agent = %self.state.name, goal = goal.name(), "Assigned goal");
                    self.goal = Some(goal);
                    self.find_plan(tick, world, tasks, trace);
                }
                None => {
                    self.mover.set_destination(self.state.home);
                }
            }
        }

        self.execute_step(tick, world, tasks, trace);
    }

    /// Advance the body toward the mover's destination.
    pub fn apply_movement(&mut self) {
        if self.mover.has_arrived(self.state.position) {
            return;
        }
        if let Some(next) = self.mover.next_position(self.state.position) {
            self.state.position = next;
        }
    }

    /// Advance per-tick vitals bookkeeping.
    pub fn decay_alarm(&mut self) {
        self.state.vitals.decay_alarm();
    }

    /// A raid landed on this agent.
    pub fn suffer_attack(&mut self, damage: i32, linger_ticks: u32) {
        self.state.vitals.apply_damage(damage, linger_ticks);
        self.state.facts.set(IS_SAFE, false);
    }

    /// The plan the agent would commit to for `goal` right now, without
    /// executing anything.
    pub fn plan_preview(&self, world: &Colony, goal: &Goal) -> Option<Plan> {
        let (usable, snapshot) = self.planning_inputs(world);
        self.planner.plan(&usable, &snapshot, goal.desired())
    }

    fn should_interrupt(&self, world: &Colony) -> bool {
        if !self.state.in_danger(world) {
            return false;
        }
        match self.plan.front() {
            Some(action) => !action.is_survival(),
            None => false,
        }
    }

    fn planning_inputs(&self, world: &Colony) -> (Vec<ActionSpec>, FactSet) {
        let usable = self
            .capabilities
            .iter()
            .filter(|capability| capability.check(world, &self.state))
            .map(|capability| capability.spec().clone())
            .collect();
        let snapshot = world
            .facts
            .snapshot()
            .merged_with(&self.state.facts.snapshot());
        (usable, snapshot)
    }

    fn find_plan(
        &mut self,
        tick: u64,
        world: &mut Colony,
        tasks: &mut TaskBoard,
        trace: &mut dyn TraceSink,
    ) {
        let Some(goal) = self.goal.clone() else {
            return;
        };

        let (usable, snapshot) = self.planning_inputs(world);
        let plan = self.planner.plan(&usable, &snapshot, goal.desired());

        let instances = match plan {
            Some(plan) if !plan.is_empty() => self.instantiate(&plan),
            _ => None,
        };

        match instances {
            Some(instances) => {
                trace.record(
                    TraceEvent::new(tick, "plan.start")
                        .with_agent(self.state.id.0)
                        .with_data(instances.len() as u64),
                );
                tracing::debug!(
                    agent = %self.state.name,
                    goal = goal.name(),
                    steps = instances.len(),
                    "Found plan"
                );
                self.plan = instances;
                if !self.setup_front(world) {
                    self.abort_plan(tick, "first action setup failed", world, tasks, trace);
                }
            }
            None => {
                trace.record(TraceEvent::new(tick, "plan.none").with_agent(self.state.id.0));
                tracing::debug!(agent = %self.state.name, goal = goal.name(), "No plan found");
                if let Some(goal) = self.goal.take() {
                    tasks.fail_task(tick, &goal, trace);
                }
            }
        }
    }

    /// Fresh runtime copies of every step, so execution state stays private
    /// to this plan.
    fn instantiate(&self, plan: &Plan) -> Option<VecDeque<ActionInstance>> {
        let mut instances = VecDeque::with_capacity(plan.len());
        for step in plan.steps() {
            let capability = self
                .capabilities
                .iter()
                .find(|capability| capability.spec().name() == step.name())?;
            instances.push_back(capability.instantiate());
        }
        Some(instances)
    }

    fn setup_front(&mut self, world: &mut Colony) -> bool {
        let Self { plan, state, .. } = self;
        match plan.front_mut() {
            Some(action) => action.setup(world, state),
            None => true,
        }
    }

    fn execute_step(
        &mut self,
        tick: u64,
        world: &mut Colony,
        tasks: &mut TaskBoard,
        trace: &mut dyn TraceSink,
    ) {
        // A finished action is dequeued and the next one set up; an empty
        // queue means the plan is complete.
        if self.plan.front().is_some_and(ActionInstance::is_done) {
            self.plan.pop_front();
            if self.plan.is_empty() {
                if let Some(goal) = self.goal.take() {
                    tracing::info!(agent = %self.state.name, goal = goal.name(), "Plan complete");
                    trace.record(TraceEvent::new(tick, "plan.complete").with_agent(self.state.id.0));
                    tasks.complete_task(tick, &goal, trace);
                }
                self.mover.stop();
                return;
            }
            if !self.setup_front(world) {
                self.abort_plan(tick, "next action setup failed", world, tasks, trace);
                return;
            }
        }

        enum Step {
            Wait(Position),
            Perform,
            NoTarget,
        }

        let step = {
            let Some(action) = self.plan.front() else {
                return;
            };
            if action.requires_in_range() {
                match action.target() {
                    None => Step::NoTarget,
                    Some(target)
                        if self.state.position.distance_to(target) > self.proximity_radius =>
                    {
                        Step::Wait(target)
                    }
                    Some(_) => Step::Perform,
                }
            } else {
                Step::Perform
            }
        };

        match step {
            Step::NoTarget => {
                self.abort_plan(tick, "action requires a target but has none", world, tasks, trace);
            }
            Step::Wait(target) => {
                self.mover.set_destination(target);
            }
            Step::Perform => {
                let status = {
                    let Self { plan, state, .. } = self;
                    match plan.front_mut() {
                        Some(action) => action.perform(world, state),
                        None => return,
                    }
                };
                if status == ActionStatus::Failed {
                    self.abort_plan(tick, "action failed to perform", world, tasks, trace);
                }
            }
        }
    }

    /// Tear down the current plan: release the active action's claims,
    /// return the goal to the arbitrator as failed, stop moving. Queued
    /// actions that were never set up hold no claims and are just dropped.
    pub fn abort_plan(
        &mut self,
        tick: u64,
        reason: &str,
        world: &mut Colony,
        tasks: &mut TaskBoard,
        trace: &mut dyn TraceSink,
    ) {
        if self.plan.is_empty() && self.goal.is_none() {
            return;
        }

        let active = self
            .plan
            .front()
            .map(|action| action.name().to_string())
            .unwrap_or_else(|| "none".to_string());
        tracing::warn!(agent = %self.state.name, action = %active, reason, "Aborting plan");
        trace.record(TraceEvent::new(tick, "plan.abort").with_agent(self.state.id.0));

        {
            let Self { plan, state, .. } = self;
            if let Some(action) = plan.front_mut() {
                if action.was_set_up() {
                    action.reset(world, state);
                }
            }
        }
        self.plan.clear();

        if let Some(goal) = self.goal.take() {
            tasks.fail_task(tick, &goal, trace);
        }
        self.mover.stop();
    }
}
