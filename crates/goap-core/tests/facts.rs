use goap_core::{Fact, FactKey, FactSet, FactValue};

#[test]
fn fact_equality_is_structural_over_key_and_value() {
    let four = Fact::new("logs_in_stockpile", 4);
    let five = Fact::new("logs_in_stockpile", 5);
    let flag = Fact::new("staff_built", true);

    assert_ne!(four, five);
    assert_ne!(four, flag);
    assert_eq!(four, Fact::new("logs_in_stockpile", 4i64));
    assert_eq!(four.key().as_str(), "logs_in_stockpile");
    assert_eq!(flag.value(), FactValue::Bool(true));
    assert_eq!(flag.value().as_bool(), Some(true));
    assert_eq!(four.value().as_bool(), None);
    assert_eq!(four.value().as_int(), Some(4));
}

#[test]
fn set_membership_requires_both_components() {
    let state: FactSet = [Fact::new("logs_in_stockpile", 5)].into_iter().collect();

    assert!(state.contains(&Fact::new("logs_in_stockpile", 5)));
    assert!(!state.contains(&Fact::new("logs_in_stockpile", 4)));
    assert!(!state.contains(&Fact::new("iron_in_stockpile", 5)));
}

#[test]
fn satisfies_is_a_literal_subset_test() {
    let state: FactSet = [
        Fact::new("logs_in_stockpile", 5),
        Fact::new("staff_built", false),
        Fact::new("holding_resource", true),
    ]
    .into_iter()
    .collect();

    let met: FactSet = [
        Fact::new("logs_in_stockpile", 5),
        Fact::new("holding_resource", true),
    ]
    .into_iter()
    .collect();
    let unmet: FactSet = [Fact::new("staff_built", true)].into_iter().collect();

    assert!(state.satisfies(&met));
    assert!(!state.satisfies(&unmet));
    assert!(state.satisfies(&FactSet::new()), "empty requirement holds");
}

#[test]
fn apply_retires_the_previous_value_for_the_key() {
    let mut state = FactSet::new();
    state.apply(Fact::new("logs_in_stockpile", 0));
    state.apply(Fact::new("logs_in_stockpile", 5));

    assert_eq!(state.len(), 1);
    assert!(!state.contains(&Fact::new("logs_in_stockpile", 0)));
    assert_eq!(
        state.value_of(&FactKey::from_static("logs_in_stockpile")),
        Some(FactValue::Int(5))
    );
}

#[test]
fn applying_derives_without_touching_the_source() {
    let start: FactSet = [Fact::new("logs_in_stockpile", 0)].into_iter().collect();
    let effects: FactSet = [
        Fact::new("logs_in_stockpile", 5),
        Fact::new("holding_resource", true),
    ]
    .into_iter()
    .collect();

    let next = start.applying(&effects);

    assert_eq!(
        start.value_of(&FactKey::from_static("logs_in_stockpile")),
        Some(FactValue::Int(0))
    );
    assert_eq!(
        next.value_of(&FactKey::from_static("logs_in_stockpile")),
        Some(FactValue::Int(5))
    );
    assert!(next.contains(&Fact::new("holding_resource", true)));
}

#[test]
fn merged_overlay_wins_on_shared_keys() {
    let world: FactSet = [
        Fact::new("logs_in_stockpile", 5),
        Fact::new("is_safe", true),
    ]
    .into_iter()
    .collect();
    let agent: FactSet = [
        Fact::new("is_safe", false),
        Fact::new("holding_resource", true),
    ]
    .into_iter()
    .collect();

    let merged = world.merged_with(&agent);

    assert!(merged.contains(&Fact::new("is_safe", false)));
    assert!(merged.contains(&Fact::new("logs_in_stockpile", 5)));
    assert!(merged.contains(&Fact::new("holding_resource", true)));
    assert_eq!(merged.len(), 3);
}
