//! Scenario configuration loading and simulation assembly.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use goap_core::{ActionSpec, FactKey, FactValue, Goal};

use crate::actions::{BehaviorSpec, Capability};
use crate::agent::{Agent, Vitals};
use crate::error::ConfigError;
use crate::resources::{AgentId, ResourceKeys, ResourceKind};
use crate::sim::{Raid, Simulation};
use crate::tasks::{Recipe, ResourceCost, TaskBoard, TaskEntry};
use crate::world::{Colony, Position};

/// Scenario configuration, loaded from colony.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColonyConfig {
    /// How close an agent must stand to an action target to work on it
    #[serde(default = "default_proximity_radius")]
    pub proximity_radius: f32,

    /// Ticks between task requests when idle or after a failed plan
    #[serde(default = "default_plan_cooldown")]
    pub plan_cooldown_ticks: u32,

    /// Ticks an agent stays alarmed after taking a hit
    #[serde(default = "default_attack_linger")]
    pub under_attack_linger_ticks: u32,

    /// World fact that stops all assignment once true
    #[serde(default = "default_win_condition")]
    pub win_condition: String,

    /// Where deliveries and crafting happen
    pub build_site: Position,

    /// Contested resource classes and their gatherable nodes
    pub resources: Vec<ResourceConfig>,

    /// Recipes drive both crafting actions and demand accounting
    pub recipes: Vec<RecipeConfig>,

    /// Goals on offer, in priority order
    pub goals: Vec<GoalConfig>,

    /// Agent roster
    pub agents: Vec<AgentConfig>,

    /// Scripted raids for deterministic threat injection
    pub raids: Vec<RaidConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub kind: String,
    #[serde(default)]
    pub nodes: Vec<NodeConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    pub position: Position,
    #[serde(default = "default_node_quantity")]
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeConfig {
    pub name: String,
    pub crafted_key: String,
    #[serde(default)]
    pub costs: Vec<CostConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostConfig {
    pub resource: String,
    pub amount: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalConfig {
    pub name: String,
    #[serde(default = "default_goal_priority")]
    pub priority: i32,
    /// Resource this goal produces, if it is a gathering goal
    #[serde(default)]
    pub provides: Option<String>,
    #[serde(default)]
    pub survival: bool,
    #[serde(default)]
    pub preconditions: BTreeMap<String, FactValue>,
    #[serde(default)]
    pub desired: BTreeMap<String, FactValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub name: String,
    pub home: Position,
    #[serde(default = "default_max_health")]
    pub max_health: i32,
    /// Health fraction below which the agent counts as endangered
    #[serde(default = "default_danger_fraction")]
    pub danger_health_fraction: f64,
    #[serde(default = "default_agent_speed")]
    pub speed: f32,
    pub actions: Vec<ActionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionConfig {
    pub name: String,
    #[serde(default = "default_action_cost")]
    pub cost: f64,
    #[serde(default)]
    pub preconditions: BTreeMap<String, FactValue>,
    #[serde(default)]
    pub effects: BTreeMap<String, FactValue>,
    pub behavior: BehaviorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BehaviorConfig {
    Gather {
        resource: String,
        #[serde(default = "default_collect_ticks")]
        collect_ticks: u32,
    },
    Deliver {
        resource: String,
    },
    Craft {
        recipe: String,
        #[serde(default = "default_work_ticks")]
        work_ticks: u32,
    },
    Retreat {
        #[serde(default = "default_retreat_distance")]
        distance: f32,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaidConfig {
    pub tick: u64,
    pub target: String,
    #[serde(default = "default_raid_damage")]
    pub damage: i32,
    pub position: Position,
}

fn default_proximity_radius() -> f32 {
    5.0
}
fn default_plan_cooldown() -> u32 {
    8
}
fn default_attack_linger() -> u32 {
    20
}
fn default_win_condition() -> String {
    "combined_artifact_built".to_string()
}
fn default_node_quantity() -> u32 {
    1
}
fn default_goal_priority() -> i32 {
    10
}
fn default_max_health() -> i32 {
    100
}
fn default_danger_fraction() -> f64 {
    0.3
}
fn default_agent_speed() -> f32 {
    2.0
}
fn default_action_cost() -> f64 {
    1.0
}
fn default_collect_ticks() -> u32 {
    2
}
fn default_work_ticks() -> u32 {
    3
}
fn default_retreat_distance() -> f32 {
    12.0
}
fn default_raid_damage() -> i32 {
    40
}

impl ColonyConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        Ok(config)
    }

    /// Assemble a runnable simulation, rejecting dangling references.
    pub fn build(&self) -> std::result::Result<Simulation, ConfigError> {
        let kinds: BTreeSet<&str> = self.resources.iter().map(|r| r.kind.as_str()).collect();

        let mut colony = Colony::new(self.build_site);
        for resource in &self.resources {
            let kind = ResourceKind::from(resource.kind.clone());
            let keys = ResourceKeys::for_kind(&kind);
            colony.facts.set(keys.stockpile, 0);
            colony.facts.set(keys.ready, false);
            colony.facts.set(keys.stocked, false);
            for node in &resource.nodes {
                colony
                    .resources
                    .add_node(kind.clone(), node.position, node.quantity);
            }
        }

        let mut recipes = Vec::with_capacity(self.recipes.len());
        for recipe in &self.recipes {
            let mut costs = Vec::with_capacity(recipe.costs.len());
            for cost in &recipe.costs {
                if !kinds.contains(cost.resource.as_str()) {
                    return Err(ConfigError::UnknownResource {
                        recipe: recipe.name.clone(),
                        resource: cost.resource.clone(),
                    });
                }
                costs.push(ResourceCost {
                    kind: ResourceKind::from(cost.resource.clone()),
                    amount: cost.amount,
                });
            }
            let crafted_key = FactKey::new(recipe.crafted_key.clone());
            colony.facts.set(crafted_key.clone(), false);
            recipes.push(Recipe {
                name: recipe.name.clone(),
                crafted_key,
                costs,
            });
        }

        let mut entries = Vec::with_capacity(self.goals.len());
        for goal_config in &self.goals {
            let mut goal = Goal::new(goal_config.name.clone(), goal_config.priority);
            for (key, value) in &goal_config.preconditions {
                goal = goal.with_precondition(key.clone(), *value);
            }
            for (key, value) in &goal_config.desired {
                goal = goal.with_desired(key.clone(), *value);
            }
            let mut entry = TaskEntry::new(goal);
            if let Some(provides) = &goal_config.provides {
                if !kinds.contains(provides.as_str()) {
                    return Err(ConfigError::UnknownGoalResource {
                        goal: goal_config.name.clone(),
                        resource: provides.clone(),
                    });
                }
                entry = entry.providing(ResourceKind::from(provides.clone()));
            }
            if goal_config.survival {
                entry = entry.survival();
            }
            entries.push(entry);
        }

        let mut agents = Vec::with_capacity(self.agents.len());
        for (index, agent_config) in self.agents.iter().enumerate() {
            let vitals = Vitals::new(agent_config.max_health, agent_config.danger_health_fraction);
            let mut agent = Agent::new(
                AgentId(index as u64),
                agent_config.name.clone(),
                agent_config.home,
                vitals,
            )
            .with_speed(agent_config.speed)
            .with_plan_cooldown(self.plan_cooldown_ticks)
            .with_proximity_radius(self.proximity_radius);

            let mut seen = BTreeSet::new();
            for action in &agent_config.actions {
                if !seen.insert(action.name.as_str()) {
                    return Err(ConfigError::DuplicateAction {
                        agent: agent_config.name.clone(),
                        action: action.name.clone(),
                    });
                }
                let behavior =
                    self.resolve_behavior(&agent_config.name, &action.behavior, &kinds, &recipes)?;
                let mut spec = ActionSpec::new(action.name.clone(), action.cost);
                for (key, value) in &action.preconditions {
                    spec = spec.with_precondition(key.clone(), *value);
                }
                for (key, value) in &action.effects {
                    spec = spec.with_effect(key.clone(), *value);
                }
                agent = agent.with_capability(Capability::new(spec, behavior));
            }
            agents.push(agent);
        }

        for entry in &entries {
            let covered = agents.iter().any(|agent| {
                agent.capabilities().iter().any(|capability| {
                    capability
                        .spec()
                        .effects()
                        .iter()
                        .any(|fact| entry.goal().desired().contains(&fact))
                })
            });
            if !covered {
                return Err(ConfigError::NoCapableAgent {
                    goal: entry.goal().name().to_string(),
                });
            }
        }

        let mut raids = Vec::with_capacity(self.raids.len());
        for raid in &self.raids {
            let Some(target) = agents.iter().find(|a| a.name() == raid.target) else {
                return Err(ConfigError::UnknownRaidTarget {
                    tick: raid.tick,
                    target: raid.target.clone(),
                });
            };
            raids.push(Raid {
                tick: raid.tick,
                target: target.id(),
                damage: raid.damage,
                position: raid.position,
            });
        }

        let tasks = TaskBoard::new(entries, recipes, FactKey::new(self.win_condition.clone()));
        Ok(Simulation::new(
            colony,
            tasks,
            agents,
            raids,
            self.under_attack_linger_ticks,
        ))
    }

    fn resolve_behavior(
        &self,
        agent: &str,
        behavior: &BehaviorConfig,
        kinds: &BTreeSet<&str>,
        recipes: &[Recipe],
    ) -> std::result::Result<BehaviorSpec, ConfigError> {
        match behavior {
            BehaviorConfig::Gather {
                resource,
                collect_ticks,
            } => {
                if !kinds.contains(resource.as_str()) {
                    return Err(ConfigError::UnknownAgentResource {
                        agent: agent.to_string(),
                        resource: resource.clone(),
                    });
                }
                Ok(BehaviorSpec::Gather {
                    resource: ResourceKind::from(resource.clone()),
                    collect_ticks: *collect_ticks,
                })
            }
            BehaviorConfig::Deliver { resource } => {
                if !kinds.contains(resource.as_str()) {
                    return Err(ConfigError::UnknownAgentResource {
                        agent: agent.to_string(),
                        resource: resource.clone(),
                    });
                }
                Ok(BehaviorSpec::Deliver {
                    resource: ResourceKind::from(resource.clone()),
                })
            }
            BehaviorConfig::Craft { recipe, work_ticks } => {
                let Some(found) = recipes.iter().find(|r| r.name == *recipe) else {
                    return Err(ConfigError::UnknownRecipe {
                        agent: agent.to_string(),
                        recipe: recipe.clone(),
                    });
                };
                let costs = found
                    .costs
                    .iter()
                    .map(|cost| {
                        (
                            ResourceKeys::for_kind(&cost.kind).stockpile,
                            cost.amount,
                        )
                    })
                    .collect();
                Ok(BehaviorSpec::Craft {
                    crafted_key: found.crafted_key.clone(),
                    costs,
                    work_ticks: *work_ticks,
                })
            }
            BehaviorConfig::Retreat { distance } => Ok(BehaviorSpec::Retreat {
                distance: *distance,
            }),
        }
    }
}

impl Default for ColonyConfig {
    /// The stock emberhold scenario: two villagers stock the pile, the mage
    /// crafts a staff and a shield and combines them into the artifact, and
    /// one scripted raid tests the survival path.
    fn default() -> Self {
        let gather_deliver = |resource: &str| -> Vec<ActionConfig> {
            vec![
                ActionConfig {
                    name: format!("gather_{resource}"),
                    cost: 1.0,
                    preconditions: BTreeMap::new(),
                    effects: BTreeMap::from([
                        (format!("{resource}_ready_for_pickup"), FactValue::Bool(true)),
                        (format!("{resource}_stocked"), FactValue::Bool(false)),
                    ]),
                    behavior: BehaviorConfig::Gather {
                        resource: resource.to_string(),
                        collect_ticks: default_collect_ticks(),
                    },
                },
                ActionConfig {
                    name: format!("deliver_{resource}"),
                    cost: 1.0,
                    preconditions: BTreeMap::from([(
                        format!("{resource}_ready_for_pickup"),
                        FactValue::Bool(true),
                    )]),
                    effects: BTreeMap::from([
                        (format!("{resource}_stocked"), FactValue::Bool(true)),
                        (format!("{resource}_ready_for_pickup"), FactValue::Bool(false)),
                    ]),
                    behavior: BehaviorConfig::Deliver {
                        resource: resource.to_string(),
                    },
                },
            ]
        };

        let retreat = ActionConfig {
            name: "retreat".to_string(),
            cost: 1.0,
            preconditions: BTreeMap::new(),
            effects: BTreeMap::from([("is_safe".to_string(), FactValue::Bool(true))]),
            behavior: BehaviorConfig::Retreat {
                distance: default_retreat_distance(),
            },
        };

        let craft_action = |name: &str, recipe: &str, crafted_key: &str,
                            preconditions: BTreeMap<String, FactValue>| ActionConfig {
            name: name.to_string(),
            cost: 2.0,
            preconditions,
            effects: BTreeMap::from([(crafted_key.to_string(), FactValue::Bool(true))]),
            behavior: BehaviorConfig::Craft {
                recipe: recipe.to_string(),
                work_ticks: default_work_ticks(),
            },
        };

        let stock_goal = |resource: &str| GoalConfig {
            name: format!("stock_{resource}"),
            priority: 10,
            provides: Some(resource.to_string()),
            survival: false,
            preconditions: BTreeMap::new(),
            desired: BTreeMap::from([(format!("{resource}_stocked"), FactValue::Bool(true))]),
        };

        // Cleanup goals for pickups stranded by aborted plans. Demand
        // accounting counts ground units as covered, so without these the
        // stranded unit would never reach the stockpile. Low priority keeps
        // them out of the way while stocking goals are on offer.
        let haul_goal = |resource: &str| GoalConfig {
            name: format!("haul_{resource}"),
            priority: 5,
            provides: None,
            survival: false,
            preconditions: BTreeMap::new(),
            desired: BTreeMap::from([(
                format!("{resource}_ready_for_pickup"),
                FactValue::Bool(false),
            )]),
        };

        let craft_goal = |name: &str, crafted_key: &str, priority: i32| GoalConfig {
            name: name.to_string(),
            priority,
            provides: None,
            survival: false,
            preconditions: BTreeMap::new(),
            desired: BTreeMap::from([(crafted_key.to_string(), FactValue::Bool(true))]),
        };

        let mut villager_actions = gather_deliver("logs");
        villager_actions.extend(gather_deliver("iron"));
        villager_actions.extend(gather_deliver("crystals"));
        villager_actions.push(retreat.clone());

        let mage_actions = vec![
            craft_action(
                "craft_enchanted_staff",
                "enchanted_staff",
                "enchanted_staff_built",
                BTreeMap::new(),
            ),
            craft_action(
                "craft_runed_shield",
                "runed_shield",
                "runed_shield_built",
                BTreeMap::new(),
            ),
            craft_action(
                "forge_artifact",
                "combined_artifact",
                "combined_artifact_built",
                BTreeMap::from([
                    ("enchanted_staff_built".to_string(), FactValue::Bool(true)),
                    ("runed_shield_built".to_string(), FactValue::Bool(true)),
                ]),
            ),
            retreat,
        ];

        let mut forge_goal = craft_goal("forge_artifact", "combined_artifact_built", 30);
        forge_goal.preconditions = BTreeMap::from([
            ("enchanted_staff_built".to_string(), FactValue::Bool(true)),
            ("runed_shield_built".to_string(), FactValue::Bool(true)),
        ]);

        Self {
            proximity_radius: default_proximity_radius(),
            plan_cooldown_ticks: default_plan_cooldown(),
            under_attack_linger_ticks: default_attack_linger(),
            win_condition: default_win_condition(),
            build_site: Position::new(0.0, 0.0),
            resources: vec![
                ResourceConfig {
                    kind: "logs".to_string(),
                    nodes: vec![
                        NodeConfig {
                            position: Position::new(14.0, 3.0),
                            quantity: 3,
                        },
                        NodeConfig {
                            position: Position::new(16.0, -4.0),
                            quantity: 3,
                        },
                    ],
                },
                ResourceConfig {
                    kind: "iron".to_string(),
                    nodes: vec![
                        NodeConfig {
                            position: Position::new(-12.0, 8.0),
                            quantity: 3,
                        },
                        NodeConfig {
                            position: Position::new(-15.0, 2.0),
                            quantity: 3,
                        },
                    ],
                },
                ResourceConfig {
                    kind: "crystals".to_string(),
                    nodes: vec![
                        NodeConfig {
                            position: Position::new(4.0, 18.0),
                            quantity: 3,
                        },
                        NodeConfig {
                            position: Position::new(-3.0, 20.0),
                            quantity: 3,
                        },
                    ],
                },
            ],
            recipes: vec![
                RecipeConfig {
                    name: "enchanted_staff".to_string(),
                    crafted_key: "enchanted_staff_built".to_string(),
                    costs: vec![
                        CostConfig {
                            resource: "logs".to_string(),
                            amount: 5,
                        },
                        CostConfig {
                            resource: "iron".to_string(),
                            amount: 3,
                        },
                    ],
                },
                RecipeConfig {
                    name: "runed_shield".to_string(),
                    crafted_key: "runed_shield_built".to_string(),
                    costs: vec![CostConfig {
                        resource: "iron".to_string(),
                        amount: 2,
                    }],
                },
                RecipeConfig {
                    name: "combined_artifact".to_string(),
                    crafted_key: "combined_artifact_built".to_string(),
                    costs: vec![CostConfig {
                        resource: "crystals".to_string(),
                        amount: 4,
                    }],
                },
            ],
            goals: vec![
                stock_goal("logs"),
                stock_goal("iron"),
                stock_goal("crystals"),
                haul_goal("logs"),
                haul_goal("iron"),
                haul_goal("crystals"),
                craft_goal("craft_enchanted_staff", "enchanted_staff_built", 20),
                craft_goal("craft_runed_shield", "runed_shield_built", 20),
                forge_goal,
                GoalConfig {
                    name: "retreat_to_safety".to_string(),
                    priority: 100,
                    provides: None,
                    survival: true,
                    preconditions: BTreeMap::new(),
                    desired: BTreeMap::from([("is_safe".to_string(), FactValue::Bool(true))]),
                },
            ],
            agents: vec![
                AgentConfig {
                    name: "villager_ash".to_string(),
                    home: Position::new(2.0, 2.0),
                    max_health: default_max_health(),
                    danger_health_fraction: default_danger_fraction(),
                    speed: default_agent_speed(),
                    actions: villager_actions.clone(),
                },
                AgentConfig {
                    name: "villager_bram".to_string(),
                    home: Position::new(-2.0, 2.0),
                    max_health: default_max_health(),
                    danger_health_fraction: default_danger_fraction(),
                    speed: default_agent_speed(),
                    actions: villager_actions,
                },
                AgentConfig {
                    name: "mage_elowen".to_string(),
                    home: Position::new(0.0, -3.0),
                    max_health: 80,
                    danger_health_fraction: 0.5,
                    speed: 1.5,
                    actions: mage_actions,
                },
            ],
            raids: vec![RaidConfig {
                tick: 60,
                target: "villager_ash".to_string(),
                damage: default_raid_damage(),
                position: Position::new(18.0, 6.0),
            }],
        }
    }
}
