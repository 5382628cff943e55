use emberhold_core::{
    Agent, AgentId, BehaviorSpec, Capability, Colony, Position, Recipe, ResourceCost,
    ResourceKind, TaskBoard, TaskEntry, Vitals,
};
use goap_core::{ActionSpec, FactKey, Goal};
use goap_tools::NullTraceSink;

fn logs() -> ResourceKind {
    ResourceKind::from("logs")
}

#[test]
fn resource_kinds_compare_by_name_across_borrowed_and_owned() {
    let configured = ResourceKind::from("logs".to_string());
    assert_eq!(configured, logs());
    assert_eq!(configured.as_str(), "logs");
    assert_eq!(configured.to_string(), "logs");
}

fn deliver_capability() -> Capability {
    Capability::new(
        ActionSpec::new("deliver_logs", 1.0)
            .with_precondition("logs_ready_for_pickup", true)
            .with_effect("logs_stocked", true)
            .with_effect("logs_ready_for_pickup", false),
        BehaviorSpec::Deliver { resource: logs() },
    )
}

fn gather_capability() -> Capability {
    Capability::new(
        ActionSpec::new("gather_logs", 1.0)
            .with_effect("logs_ready_for_pickup", true)
            .with_effect("logs_stocked", false),
        BehaviorSpec::Gather {
            resource: logs(),
            collect_ticks: 1,
        },
    )
}

fn retreat_capability() -> Capability {
    Capability::new(
        ActionSpec::new("retreat", 1.0).with_effect("is_safe", true),
        BehaviorSpec::Retreat { distance: 10.0 },
    )
}

fn stock_logs_goal() -> Goal {
    Goal::new("stock_logs", 10).with_desired("logs_stocked", true)
}

fn board_with_demand(demand: i64) -> TaskBoard {
    TaskBoard::new(
        vec![
            TaskEntry::new(stock_logs_goal()).providing(logs()),
            TaskEntry::new(Goal::new("retreat_to_safety", 100).with_desired("is_safe", true))
                .survival(),
        ],
        vec![Recipe {
            name: "artifact".to_string(),
            crafted_key: FactKey::from_static("artifact_built"),
            costs: vec![ResourceCost {
                kind: logs(),
                amount: demand,
            }],
        }],
        FactKey::from_static("artifact_built"),
    )
}

fn villager(id: u64) -> Agent {
    Agent::new(
        AgentId(id),
        format!("villager_{id}"),
        Position::default(),
        Vitals::new(100, 0.3),
    )
    .with_capability(gather_capability())
    .with_capability(deliver_capability())
    .with_capability(retreat_capability())
}

#[test]
fn ledger_counts_grants_minus_settlements_and_never_goes_negative() {
    let colony = Colony::new(Position::default());
    let mut board = board_with_demand(5);
    let mut sink = NullTraceSink;
    let worker_a = villager(0);
    let worker_b = villager(1);

    let goal_a = board
        .request_task(0, worker_a.state(), worker_a.capabilities(), &colony, &mut sink)
        .expect("goal for worker a");
    assert_eq!(board.in_progress(&logs()), 1);

    let goal_b = board
        .request_task(0, worker_b.state(), worker_b.capabilities(), &colony, &mut sink)
        .expect("goal for worker b");
    assert_eq!(board.in_progress(&logs()), 2);

    board.fail_task(1, &goal_a, &mut sink);
    assert_eq!(board.in_progress(&logs()), 1);

    board.complete_task(2, &goal_b, &mut sink);
    assert_eq!(board.in_progress(&logs()), 0);

    // Settling the same goal twice must not drive the count negative.
    board.fail_task(3, &goal_b, &mut sink);
    board.complete_task(4, &goal_b, &mut sink);
    assert_eq!(board.in_progress(&logs()), 0);
}

#[test]
fn covered_demand_stops_further_grants() {
    let colony = Colony::new(Position::default());
    let mut board = board_with_demand(2);
    let mut sink = NullTraceSink;
    let workers: Vec<Agent> = (0..3).map(villager).collect();

    assert!(board
        .request_task(0, workers[0].state(), workers[0].capabilities(), &colony, &mut sink)
        .is_some());
    assert!(board
        .request_task(0, workers[1].state(), workers[1].capabilities(), &colony, &mut sink)
        .is_some());

    // stock 0 + ground 0 + in-flight 2 covers the demand of 2.
    assert!(board
        .request_task(0, workers[2].state(), workers[2].capabilities(), &colony, &mut sink)
        .is_none());
}

#[test]
fn goal_stays_needed_until_stock_ground_and_in_flight_cover_demand() {
    let mut colony = Colony::new(Position::default());
    let mut board = board_with_demand(5);
    let mut sink = NullTraceSink;
    let worker = villager(0);

    let goal = board
        .request_task(0, worker.state(), worker.capabilities(), &colony, &mut sink)
        .expect("goal granted");
    assert_eq!(board.in_progress(&logs()), 1);

    // One log delivered, assignment settled: four still missing.
    colony.facts.increment("logs_in_stockpile", 1);
    board.complete_task(10, &goal, &mut sink);
    assert_eq!(board.in_progress(&logs()), 0);
    assert!(board.resource_still_needed(&logs(), &colony));

    colony.facts.increment("logs_in_stockpile", 3);
    assert!(board.resource_still_needed(&logs(), &colony));

    // A unit on the ground counts toward coverage too.
    colony
        .resources
        .spawn_pickup(logs(), 1, Position::default());
    assert!(!board.resource_still_needed(&logs(), &colony));
}

#[test]
fn built_recipes_stop_contributing_to_demand() {
    let mut colony = Colony::new(Position::default());
    let board = board_with_demand(5);

    assert!(board.resource_still_needed(&logs(), &colony));
    colony.facts.set("artifact_built", true);
    assert!(!board.resource_still_needed(&logs(), &colony));
}

#[test]
fn win_condition_stops_all_assignment() {
    let mut colony = Colony::new(Position::default());
    let mut board = board_with_demand(5);
    let mut sink = NullTraceSink;
    let worker = villager(0);

    colony.facts.set("artifact_built", true);
    assert!(board
        .request_task(0, worker.state(), worker.capabilities(), &colony, &mut sink)
        .is_none());
}

#[test]
fn capability_match_requires_an_effect_in_the_goal_state() {
    let colony = Colony::new(Position::default());
    let mut board = board_with_demand(5);
    let mut sink = NullTraceSink;

    // Gathering raises the ready flag, not the stocked flag the goal wants,
    // so a gather-only agent cannot contribute.
    let gatherer = Agent::new(AgentId(0), "gatherer", Position::default(), Vitals::new(100, 0.3))
        .with_capability(gather_capability());
    assert!(board
        .request_task(0, gatherer.state(), gatherer.capabilities(), &colony, &mut sink)
        .is_none());

    let hauler = Agent::new(AgentId(1), "hauler", Position::default(), Vitals::new(100, 0.3))
        .with_capability(deliver_capability());
    assert!(board
        .request_task(0, hauler.state(), hauler.capabilities(), &colony, &mut sink)
        .is_some());
}

#[test]
fn higher_priority_goals_are_offered_first() {
    let colony = Colony::new(Position::default());
    let mut sink = NullTraceSink;
    let mut board = TaskBoard::new(
        vec![
            TaskEntry::new(Goal::new("minor_chore", 1).with_desired("logs_stocked", true)),
            TaskEntry::new(Goal::new("urgent_chore", 50).with_desired("logs_ready_for_pickup", true)),
        ],
        Vec::new(),
        FactKey::from_static("artifact_built"),
    );
    let worker = villager(0);

    let goal = board
        .request_task(0, worker.state(), worker.capabilities(), &colony, &mut sink)
        .expect("goal granted");
    assert_eq!(goal.name(), "urgent_chore");
}

#[test]
fn endangered_agents_get_the_survival_goal_first() {
    let colony = Colony::new(Position::default());
    let mut board = board_with_demand(5);
    let mut sink = NullTraceSink;

    let mut worker = villager(0);
    worker.suffer_attack(10, 20);

    let goal = board
        .request_task(0, worker.state(), worker.capabilities(), &colony, &mut sink)
        .expect("survival goal granted");
    assert_eq!(goal.name(), "retreat_to_safety");
    // Survival grants are not resource assignments.
    assert_eq!(board.in_progress(&logs()), 0);
}

#[test]
fn survival_goals_are_not_offered_to_healthy_agents() {
    let colony = Colony::new(Position::default());
    let mut sink = NullTraceSink;
    let mut board = TaskBoard::new(
        vec![TaskEntry::new(
            Goal::new("retreat_to_safety", 100).with_desired("is_safe", true),
        )
        .survival()],
        Vec::new(),
        FactKey::from_static("artifact_built"),
    );
    let worker = villager(0);

    assert!(board
        .request_task(0, worker.state(), worker.capabilities(), &colony, &mut sink)
        .is_none());
}

#[test]
fn satisfied_goals_are_skipped() {
    let mut colony = Colony::new(Position::default());
    let mut sink = NullTraceSink;
    let mut board = TaskBoard::new(
        vec![TaskEntry::new(
            Goal::new("raise_ready_flag", 10).with_desired("logs_ready_for_pickup", true),
        )],
        Vec::new(),
        FactKey::from_static("artifact_built"),
    );
    let worker = villager(0);

    colony.facts.set("logs_ready_for_pickup", true);
    assert!(board
        .request_task(0, worker.state(), worker.capabilities(), &colony, &mut sink)
        .is_none());

    colony.facts.set("logs_ready_for_pickup", false);
    assert!(board
        .request_task(0, worker.state(), worker.capabilities(), &colony, &mut sink)
        .is_some());
}
