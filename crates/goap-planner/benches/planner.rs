use criterion::{black_box, criterion_group, criterion_main, Criterion};
use goap_core::{ActionSpec, Fact, FactSet};
use goap_planner::Planner;

/// A gather/deliver/craft chain per resource, wide enough to make the search
/// consider real branching.
fn colony_actions(resources: usize) -> (Vec<ActionSpec>, FactSet, FactSet) {
    let mut actions = Vec::new();
    let mut goal = FactSet::new();

    for idx in 0..resources {
        let stocked = format!("resource_{idx}_stocked");
        let prepared = format!("resource_{idx}_prepared");
        let crafted = format!("item_{idx}_built");

        actions.push(
            ActionSpec::new(format!("gather_{idx}"), 1.0).with_effect(prepared.clone(), true),
        );
        actions.push(
            ActionSpec::new(format!("deliver_{idx}"), 1.0)
                .with_precondition(prepared.clone(), true)
                .with_effect(stocked.clone(), true),
        );
        actions.push(
            ActionSpec::new(format!("craft_{idx}"), 2.0)
                .with_precondition(stocked.clone(), true)
                .with_effect(crafted.clone(), true),
        );
        goal.apply(Fact::new(crafted, true));
    }

    (actions, FactSet::new(), goal)
}

fn bench_planner(c: &mut Criterion) {
    let planner = Planner::new();
    let (actions, start, goal) = colony_actions(3);

    c.bench_function("goap-planner/plan(resources=3)", |b| {
        b.iter(|| {
            let plan = planner.plan(&actions, &start, &goal).expect("plan");
            black_box(plan.len());
        })
    });
}

criterion_group!(benches, bench_planner);
criterion_main!(benches);
