//! End-to-end tests of the headless runner over the shipped scenarios.

use std::path::PathBuf;

use prospect_headless::batch::{run_batch, verify_determinism, BatchConfig, BatchResults, RESULTS_FILE};
use prospect_headless::game_runner::{run_game, GameRunConfig};
use prospect_headless::metrics::GameOutcome;
use prospect_headless::scenario::{Scenario, ScenarioError};
use prospect_test_utils::determinism::verify_determinism as verify_repeatable;

fn scenario_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(name)
}

#[test]
fn test_shipped_scenarios_parse() {
    let default = Scenario::load(scenario_path("default.ron")).unwrap();
    assert_eq!(default.name, "Default");
    assert_eq!(default.seed, 42);
    assert_eq!(default.purchases.len(), 2);

    let tiny = Scenario::load(scenario_path("tiny.ron")).unwrap();
    assert_eq!((tiny.config.width, tiny.config.height), (6, 6));
    assert_eq!(tiny.config.starting_units.len(), 2);
}

#[test]
fn test_tiny_scenario_runs_to_an_outcome() {
    let scenario = Scenario::load(scenario_path("tiny.ron")).unwrap();
    let max_ticks = scenario.max_ticks;
    let result = run_game(&GameRunConfig::from_scenario(scenario)).unwrap();

    let metrics = &result.metrics;
    assert!(metrics.duration_ticks <= max_ticks);
    assert_eq!(metrics.final_state_hash, result.final_state_hash);
    match metrics.outcome {
        GameOutcome::Won => assert_eq!(metrics.remaining_resources, 0),
        GameOutcome::Lost => assert!(metrics.starvations > 0),
        GameOutcome::Timeout => assert_eq!(metrics.duration_ticks, max_ticks),
    }
}

#[test]
fn test_run_game_is_repeatable() {
    let scenario = Scenario::load(scenario_path("default.ron")).unwrap();
    let result = verify_repeatable(
        3,
        1,
        || GameRunConfig::from_scenario(scenario.clone()).with_max_ticks(150),
        |_| {},
        |config| run_game(config).map_or(0, |r| r.final_state_hash),
    );
    result.assert_deterministic();
}

#[test]
fn test_verify_determinism_on_default_scenario() {
    let scenario = Scenario::load(scenario_path("default.ron")).unwrap();
    assert!(verify_determinism(&scenario, 99, 3).unwrap());
}

#[test]
fn test_batch_writes_results_file() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = Scenario::load(scenario_path("tiny.ron")).unwrap();
    let config = BatchConfig::new(scenario, 8)
        .with_output(dir.path().to_path_buf())
        .with_seed(100);

    let results = run_batch(config);
    let path = dir.path().join(RESULTS_FILE);
    results.save(&path).unwrap();

    let loaded = BatchResults::load(&path).unwrap();
    assert_eq!(loaded.games.len(), 8);
    assert_eq!(loaded.summary.total_games, 8);
    assert_eq!(
        loaded.summary.won + loaded.summary.lost + loaded.summary.timeouts,
        8
    );
    assert_eq!(loaded.games[0].seed, 100);
    assert_eq!(loaded.config.scenario.name, "Tiny");
}

#[test]
fn test_malformed_scenario_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.ron");
    std::fs::write(&path, "Scenario(name: ").unwrap();
    assert!(matches!(
        Scenario::load(&path),
        Err(ScenarioError::ParseError(_))
    ));
}
