//! Emberhold CLI - headless colony simulation.
//!
//! - `emberhold run` - run a scenario to completion (or a tick budget)
//! - `emberhold plan` - show the plan an agent would commit to for a goal

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use emberhold_core::{ColonyConfig, ResourceKind, Simulation};

#[derive(Parser)]
#[command(name = "emberhold")]
#[command(about = "Goal-driven colony simulation", version)]
struct Cli {
    /// Scenario file (YAML); the built-in scenario when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation headless
    Run {
        /// Maximum ticks to simulate
        #[arg(long, default_value = "2000")]
        ticks: u64,

        /// Dump the trace log as JSON afterwards
        #[arg(long)]
        trace: bool,
    },

    /// Show the plan an agent would commit to for a goal, without running
    Plan {
        /// Agent name from the roster
        #[arg(long)]
        agent: String,

        /// Goal name from the scenario
        #[arg(long)]
        goal: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    fmt().with_env_filter(filter).with_target(false).init();

    let config = match &cli.config {
        Some(path) => ColonyConfig::load(path)?,
        None => ColonyConfig::default(),
    };
    let simulation = config
        .build()
        .context("Scenario configuration is invalid")?;

    match cli.command {
        Commands::Run { ticks, trace } => run(simulation, &config, ticks, trace),
        Commands::Plan { agent, goal } => show_plan(&simulation, &agent, &goal),
    }
}

fn run(mut simulation: Simulation, config: &ColonyConfig, ticks: u64, dump_trace: bool) -> Result<()> {
    let ran = simulation.run_for(ticks);
    tracing::info!(ticks = ran, won = simulation.is_won(), "Simulation finished");

    println!();
    if simulation.is_won() {
        println!("Won after {ran} ticks: {} is true.", config.win_condition);
    } else {
        println!("Stopped after {ran} ticks without meeting {}.", config.win_condition);
    }

    println!();
    println!("World facts:");
    for fact in simulation.colony().facts.snapshot().iter() {
        println!("  {fact}");
    }

    println!();
    println!("Demand ledger:");
    for resource in &config.resources {
        let kind = ResourceKind::from(resource.kind.clone());
        println!(
            "  {kind}: in-progress {}, still needed: {}",
            simulation.tasks().in_progress(&kind),
            simulation
                .tasks()
                .resource_still_needed(&kind, simulation.colony()),
        );
    }

    println!();
    println!("Agents:");
    for agent in simulation.agents() {
        let position = agent.position();
        println!(
            "  {} at ({:.1}, {:.1}), health {}, {}",
            agent.name(),
            position.x,
            position.y,
            agent.state().vitals.health(),
            match agent.current_goal() {
                Some(goal) => format!("working on '{}'", goal.name()),
                None => "idle".to_string(),
            }
        );
    }

    if dump_trace {
        println!();
        println!("{}", serde_json::to_string_pretty(simulation.trace().events.as_slice())?);
    }

    Ok(())
}

fn show_plan(simulation: &Simulation, agent_name: &str, goal_name: &str) -> Result<()> {
    let Some(agent) = simulation.agents().iter().find(|a| a.name() == agent_name) else {
        bail!("no agent named '{agent_name}' in the roster");
    };
    let Some(goal) = simulation.tasks().goal_named(goal_name) else {
        println!("Goals in this scenario:");
        for entry in simulation.tasks().entries() {
            let mut notes = Vec::new();
            if let Some(kind) = entry.provides() {
                notes.push(format!("provides {kind}"));
            }
            if entry.is_survival() {
                notes.push("survival".to_string());
            }
            let notes = if notes.is_empty() {
                String::new()
            } else {
                format!(" ({})", notes.join(", "))
            };
            println!(
                "  {} [priority {}]{notes}",
                entry.goal().name(),
                entry.goal().priority()
            );
        }
        bail!("no goal named '{goal_name}' in the scenario");
    };

    match agent.plan_preview(simulation.colony(), goal) {
        Some(plan) => {
            println!(
                "{} would pursue '{}' in {} steps (cost {:.1}):",
                agent_name,
                goal_name,
                plan.len(),
                plan.total_cost()
            );
            for (index, step) in plan.steps().iter().enumerate() {
                println!("  {}. {} (cost {:.1})", index + 1, step.name(), step.cost());
            }
        }
        None => {
            println!("{agent_name} cannot reach '{goal_name}' with its current usable actions.");
        }
    }
    Ok(())
}
