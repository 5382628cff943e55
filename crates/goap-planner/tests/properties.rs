use goap_core::{ActionSpec, Fact, FactSet, FactValue};
use goap_planner::Planner;
use proptest::prelude::*;

const KEYS: [&str; 5] = ["logs", "iron", "crystals", "staff_built", "shield_built"];

fn arb_value() -> impl Strategy<Value = FactValue> {
    prop_oneof![
        any::<bool>().prop_map(FactValue::Bool),
        (0i64..4).prop_map(FactValue::Int),
    ]
}

fn arb_fact() -> impl Strategy<Value = Fact> {
    (0..KEYS.len(), arb_value()).prop_map(|(key, value)| Fact::new(KEYS[key], value))
}

fn arb_fact_set(max: usize) -> impl Strategy<Value = FactSet> {
    prop::collection::vec(arb_fact(), 0..=max).prop_map(|facts| facts.into_iter().collect())
}

fn arb_actions() -> impl Strategy<Value = Vec<ActionSpec>> {
    prop::collection::vec((arb_fact_set(2), arb_fact_set(2), 1u8..=4), 1..=4).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(index, (pre, eff, cost))| {
                let mut action = ActionSpec::new(format!("action_{index}"), cost as f64);
                for fact in pre.iter() {
                    let (key, value) = fact.into_parts();
                    action = action.with_precondition(key, value);
                }
                for fact in eff.iter() {
                    let (key, value) = fact.into_parts();
                    action = action.with_effect(key, value);
                }
                action
            })
            .collect()
    })
}

/// Reference enumeration of every plan the no-reuse search can discover,
/// returning the cheapest cost if any ordering reaches the goal. Like the
/// planner, the goal is tested only on states derived by applying an action.
fn cheapest_by_brute_force(
    actions: &[ActionSpec],
    state: &FactSet,
    goal: &FactSet,
    used: &mut Vec<bool>,
    cost: f64,
) -> Option<f64> {
    let mut best: Option<f64> = None;
    for idx in 0..actions.len() {
        if used[idx] || !actions[idx].applicable_in(state) {
            continue;
        }
        used[idx] = true;
        let next = actions[idx].apply_to(state);
        let reached = cost + actions[idx].cost();
        let found = if next.satisfies(goal) {
            Some(reached)
        } else {
            cheapest_by_brute_force(actions, &next, goal, used, reached)
        };
        if let Some(found) = found {
            best = Some(match best {
                Some(current) => current.min(found),
                None => found,
            });
        }
        used[idx] = false;
    }
    best
}

proptest! {
    #[test]
    fn returned_plans_replay_to_the_goal(
        actions in arb_actions(),
        start in arb_fact_set(4),
        goal in arb_fact_set(2),
    ) {
        let planner = Planner::new();
        if let Some(plan) = planner.plan(&actions, &start, &goal) {
            let mut state = start.clone();
            for step in plan.steps() {
                prop_assert!(step.applicable_in(&state));
                state = step.apply_to(&state);
            }
            prop_assert!(state.satisfies(&goal));

            let expected: f64 = plan.steps().iter().map(|s| s.cost()).sum();
            prop_assert_eq!(plan.total_cost(), expected);
        }
    }

    #[test]
    fn returned_cost_matches_the_brute_force_minimum(
        actions in arb_actions(),
        start in arb_fact_set(4),
        goal in arb_fact_set(2),
    ) {
        let planner = Planner::new();
        let mut used = vec![false; actions.len()];
        let reference = cheapest_by_brute_force(&actions, &start, &goal, &mut used, 0.0);

        match planner.plan(&actions, &start, &goal) {
            Some(plan) => {
                let best = reference.expect("planner found a plan the reference missed");
                prop_assert_eq!(plan.total_cost(), best);
            }
            None => prop_assert!(reference.is_none(), "reference found a plan the planner missed"),
        }
    }

    #[test]
    fn states_never_hold_two_values_for_one_key(
        actions in arb_actions(),
        start in arb_fact_set(4),
    ) {
        let mut state = start;
        for action in &actions {
            state = action.apply_to(&state);
            let keys: Vec<_> = state.iter().map(|f| f.key().clone()).collect();
            let mut deduped = keys.clone();
            deduped.dedup();
            prop_assert_eq!(keys, deduped);
        }
    }
}
