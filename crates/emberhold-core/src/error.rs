use thiserror::Error;

/// Scenario configuration problems caught while building a simulation.
///
/// Runtime setbacks (failed plans, lost claims, interrupted actions) are not
/// errors; they flow through the agent state machine and the task board.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("recipe '{recipe}' references unknown resource '{resource}'")]
    UnknownResource { recipe: String, resource: String },

    #[error("agent '{agent}' references unknown resource '{resource}'")]
    UnknownAgentResource { agent: String, resource: String },

    #[error("agent '{agent}' references unknown recipe '{recipe}'")]
    UnknownRecipe { agent: String, recipe: String },

    #[error("agent '{agent}' declares action '{action}' more than once")]
    DuplicateAction { agent: String, action: String },

    #[error("goal '{goal}' references unknown resource '{resource}'")]
    UnknownGoalResource { goal: String, resource: String },

    #[error("no agent has an action contributing to goal '{goal}'")]
    NoCapableAgent { goal: String },

    #[error("raid at tick {tick} targets unknown agent '{target}'")]
    UnknownRaidTarget { tick: u64, target: String },
}
