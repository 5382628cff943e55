//! The top-level tick loop: scripted raids, agent stepping, movement, and
//! threat decay, all against explicitly owned context objects.

use goap_tools::{TraceEvent, TraceLog, TraceSink};

use crate::agent::Agent;
use crate::resources::AgentId;
use crate::tasks::TaskBoard;
use crate::world::{Colony, Position};

/// A scripted attack: deterministic threat injection in place of live
/// combat, which stays outside this core.
#[derive(Debug, Clone)]
pub struct Raid {
    pub tick: u64,
    pub target: AgentId,
    pub damage: i32,
    pub position: Position,
}

/// Owns the world, the task board, and the agents, and advances them one
/// cooperative tick at a time. Agents are stepped in stable id order, so a
/// run is a pure function of its configuration.
pub struct Simulation {
    colony: Colony,
    tasks: TaskBoard,
    agents: Vec<Agent>,
    raids: Vec<Raid>,
    under_attack_linger: u32,
    tick: u64,
    trace: TraceLog,
}

impl Simulation {
    pub fn new(
        colony: Colony,
        tasks: TaskBoard,
        mut agents: Vec<Agent>,
        mut raids: Vec<Raid>,
        under_attack_linger: u32,
    ) -> Self {
        agents.sort_by_key(Agent::id);
        raids.sort_by_key(|raid| raid.tick);
        Self {
            colony,
            tasks,
            agents,
            raids,
            under_attack_linger,
            tick: 0,
            trace: TraceLog::new(),
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn colony(&self) -> &Colony {
        &self.colony
    }

    pub fn colony_mut(&mut self) -> &mut Colony {
        &mut self.colony
    }

    pub fn tasks(&self) -> &TaskBoard {
        &self.tasks
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn trace(&self) -> &TraceLog {
        &self.trace
    }

    pub fn is_won(&self) -> bool {
        self.colony.facts.is_true(self.tasks.win_condition())
    }

    /// Advance one tick. Raids land first so the emergency interrupt sees
    /// them in the same tick's agent step.
    pub fn step(&mut self) {
        let tick = self.tick;

        for raid in self.raids.iter().filter(|raid| raid.tick == tick) {
            let Some(agent) = self.agents.iter_mut().find(|a| a.id() == raid.target) else {
                continue;
            };
            tracing::warn!(agent = %agent.name(), damage = raid.damage, "Raid landed");
            self.trace.record(
                TraceEvent::new(tick, "raid")
                    .with_agent(agent.id().0)
                    .with_data(raid.damage.unsigned_abs() as u64),
            );
            agent.suffer_attack(raid.damage, self.under_attack_linger);
            self.colony.add_threat(raid.position, self.under_attack_linger);
        }

        for agent in &mut self.agents {
            agent.tick(tick, &mut self.colony, &mut self.tasks, &mut self.trace);
        }

        for agent in &mut self.agents {
            agent.apply_movement();
            agent.decay_alarm();
        }
        self.colony.decay_threats();

        self.tick += 1;
    }

    /// Run up to `ticks` more ticks, stopping early on a win. Returns the
    /// tick count afterwards.
    pub fn run_for(&mut self, ticks: u64) -> u64 {
        for _ in 0..ticks {
            if self.is_won() {
                break;
            }
            self.step();
        }
        self.tick
    }
}
