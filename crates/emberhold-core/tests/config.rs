use std::io::Write;

use emberhold_core::{ColonyConfig, ConfigError};

#[test]
fn default_scenario_builds() {
    let config = ColonyConfig::default();
    let simulation = config.build().expect("default scenario is valid");
    assert_eq!(simulation.agents().len(), 3);
    assert!(!simulation.is_won());
}

#[test]
fn scenario_survives_a_yaml_round_trip() {
    let config = ColonyConfig::default();
    let yaml = serde_yaml::to_string(&config).expect("serializes");

    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(yaml.as_bytes()).expect("write");

    let loaded = ColonyConfig::load(file.path()).expect("loads");
    assert_eq!(loaded.win_condition, config.win_condition);
    assert_eq!(loaded.agents.len(), config.agents.len());
    assert_eq!(loaded.goals.len(), config.goals.len());
    loaded.build().expect("round-tripped scenario still builds");
}

#[test]
fn load_reports_the_offending_path() {
    let error = ColonyConfig::load(std::path::Path::new("/definitely/not/here.yaml"))
        .expect_err("missing file");
    assert!(error.to_string().contains("/definitely/not/here.yaml"));
}

#[test]
fn recipe_with_unknown_resource_is_rejected() {
    let mut config = ColonyConfig::default();
    config.recipes[0].costs[0].resource = "adamantium".to_string();

    let error = config.build().err().expect("build must fail");
    match error {
        ConfigError::UnknownResource { recipe, resource } => {
            assert_eq!(recipe, "enchanted_staff");
            assert_eq!(resource, "adamantium");
        }
        other => panic!("expected UnknownResource, got {other}"),
    }
}

#[test]
fn duplicate_action_names_are_rejected() {
    let mut config = ColonyConfig::default();
    let duplicate = config.agents[0].actions[0].clone();
    config.agents[0].actions.push(duplicate);

    assert!(matches!(
        config.build(),
        Err(ConfigError::DuplicateAction { .. })
    ));
}

#[test]
fn raids_must_target_a_rostered_agent() {
    let mut config = ColonyConfig::default();
    config.raids[0].target = "nobody".to_string();

    assert!(matches!(
        config.build(),
        Err(ConfigError::UnknownRaidTarget { .. })
    ));
}

#[test]
fn goals_nobody_can_contribute_to_are_rejected() {
    let mut config = ColonyConfig::default();
    config.goals.push(crate_goal("summon_dragon", "dragon_summoned"));

    assert!(matches!(
        config.build(),
        Err(ConfigError::NoCapableAgent { .. })
    ));
}

fn crate_goal(name: &str, key: &str) -> emberhold_core::config::GoalConfig {
    emberhold_core::config::GoalConfig {
        name: name.to_string(),
        priority: 10,
        provides: None,
        survival: false,
        preconditions: Default::default(),
        desired: std::collections::BTreeMap::from([(
            key.to_string(),
            goap_core::FactValue::Bool(true),
        )]),
    }
}
