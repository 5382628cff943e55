//! Emberhold simulation core.
//!
//! Autonomous agents plan with `goap-planner` over the shared fact store,
//! execute those plans through per-agent state machines, and receive their
//! goals from a shared task board that tracks demand for contested
//! resources. Rendering, pathfinding, and persistence stay outside; the
//! mover and spatial queries here are the minimal deterministic stand-ins
//! the core contracts need.

#![forbid(unsafe_code)]

pub mod actions;
pub mod agent;
pub mod config;
pub mod error;
pub mod resources;
pub mod sim;
pub mod tasks;
pub mod world;

pub use actions::{
    ActionBehavior, ActionInstance, ActionStatus, BehaviorSpec, Capability, CraftBehavior,
    DeliverBehavior, GatherBehavior, RetreatBehavior, IS_SAFE,
};
pub use agent::{Agent, AgentState, Mover, Vitals};
pub use config::ColonyConfig;
pub use error::ConfigError;
pub use resources::{
    AgentId, ClaimTarget, NodeId, PickupId, ResourceKeys, ResourceKind, ResourceRegistry,
    SourceNode,
};
pub use sim::{Raid, Simulation};
pub use tasks::{Recipe, ResourceCost, TaskBoard, TaskEntry};
pub use world::{Colony, Position};
