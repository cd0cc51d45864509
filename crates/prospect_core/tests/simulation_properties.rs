//! Whole-game properties of the simulation.
//!
//! These tests drive the public command surface (`advance_turn_*`,
//! `purchase_building`) over hand-built worlds and check the occupancy,
//! ledger and win/loss rules that must hold turn after turn.

use proptest::prelude::*;
use prospect_core::prelude::*;
use prospect_test_utils::determinism::{
    compute_hash, find_first_divergence, strategies, verify_simulation_determinism,
};
use prospect_test_utils::fixtures::{self, unit_with_tool};

// =============================================================================
// Helpers
// =============================================================================

/// Every unit sits on the cell that holds it and no group has fewer than two
/// members.
fn assert_occupancy(world: &WorldMap) {
    for cell in world.cells() {
        let Some(actor) = cell.occupant() else {
            continue;
        };
        assert!(!actor.is_empty(), "empty occupant at ({}, {})", cell.x(), cell.y());
        if let Actor::Group(group) = actor {
            assert!(group.len() >= 2, "degenerate group at ({}, {})", cell.x(), cell.y());
        }
        for unit in actor.units() {
            assert_eq!(unit.position(), (cell.x(), cell.y()));
        }
    }
}

fn occupant_len(world: &WorldMap, x: u32, y: u32) -> Option<usize> {
    world.cell(x, y).occupant().map(Actor::len)
}

fn mined_in(summary: &TickSummary) -> Vec<u32> {
    summary
        .events
        .iter()
        .filter_map(|event| match event {
            TickEvent::UnitMined { amount, .. } => Some(*amount),
            _ => None,
        })
        .collect()
}

// =============================================================================
// Win / loss
// =============================================================================

#[test]
fn test_single_vein_is_won_when_emptied() {
    let mut sim = fixtures::simulation(
        &["W2"],
        vec![unit_with_tool(0, 0, 0, 1, &[ResourceType::Wood])],
        &[(ResourceType::Food, 1_000)],
    );

    let first = sim.advance_turn_automatic().unwrap();
    assert_eq!(first.status, GameStatus::Running);
    assert_eq!(sim.cell(0, 0).amount(), 1);

    let second = sim.advance_turn_automatic().unwrap();
    assert_eq!(second.status, GameStatus::Won);
    assert_eq!(sim.cell(0, 0).amount(), 0);
    assert_eq!(sim.resource_amount(ResourceType::Wood), 2);

    assert!(matches!(
        sim.advance_turn_automatic(),
        Err(GameError::GameOver(GameStatus::Won))
    ));
}

#[test]
fn test_no_food_is_lost() {
    let mut sim = fixtures::simulation(
        &["W5 W5"],
        vec![
            unit_with_tool(0, 0, 0, 1, &[ResourceType::Wood]),
            unit_with_tool(1, 1, 0, 1, &[ResourceType::Wood]),
        ],
        &[],
    );

    let summary = sim.advance_turn_automatic().unwrap();
    assert_eq!(summary.status, GameStatus::Lost);
    assert_eq!(sim.world().remaining_resources(), 10);
    let starved = summary
        .events
        .iter()
        .filter(|e| matches!(e, TickEvent::UnitStarved { .. }))
        .count();
    assert_eq!(starved, 2);
}

#[test]
fn test_commands_rejected_after_game_over() {
    let mut sim = fixtures::simulation(&["W1"], vec![fixtures::unit(0, 0, 0)], &[]);
    sim.advance_turn_automatic().unwrap();
    assert_eq!(sim.status(), GameStatus::Lost);

    assert!(matches!(
        sim.advance_turn_manual(0, UnitAction::Mine),
        Err(GameError::GameOver(GameStatus::Lost))
    ));
    assert!(matches!(
        sim.purchase_building(BuildingKind::UnitFactory, None),
        Err(GameError::GameOver(GameStatus::Lost))
    ));
}

// =============================================================================
// Movement and groups
// =============================================================================

#[test]
fn test_unit_walks_to_nearest_vein_then_mines() {
    let mut sim = fixtures::simulation(
        &["R0 R0 R0 R0 W4"],
        vec![unit_with_tool(0, 0, 0, 2, &[ResourceType::Wood])],
        &[(ResourceType::Food, 50)],
    );

    // Speed 3 covers three of the four steps.
    sim.advance_turn_automatic().unwrap();
    assert_eq!(sim.units().next().map(Unit::position), Some((3, 0)));

    sim.advance_turn_automatic().unwrap();
    assert_eq!(sim.units().next().map(Unit::position), Some((4, 0)));

    let summary = sim.advance_turn_automatic().unwrap();
    assert_eq!(mined_in(&summary), vec![2]);
    assert_eq!(sim.cell(4, 0).amount(), 2);
}

#[test]
fn test_units_meeting_on_a_cell_form_one_flat_group() {
    let mut world = fixtures::grid(&["W1 W1 W1"]);
    world.insert(Actor::Unit(unit_with_tool(0, 1, 0, 1, &[ResourceType::Wood])));
    world.insert(Actor::Unit(unit_with_tool(1, 1, 0, 1, &[ResourceType::Wood])));
    let size = world.insert(Actor::Unit(unit_with_tool(2, 1, 0, 1, &[ResourceType::Wood])));

    assert_eq!(size, Some(3));
    match world.cell(1, 0).occupant() {
        Some(Actor::Group(group)) => {
            let ids: Vec<UnitId> = group.members().iter().map(Unit::id).collect();
            assert_eq!(ids, vec![UnitId(0), UnitId(1), UnitId(2)]);
        }
        other => panic!("expected a group, got {other:?}"),
    }
    assert_occupancy(&world);
}

#[test]
fn test_group_sheds_starving_member() {
    let mut world = fixtures::grid(&["W9 R0", "R0 R0"]);
    let config = fixtures::plain_config(2, 2);
    let rider = fixtures::unit_with_tool(1, 0, 0, 1, &[ResourceType::Wood])
        .with_modifiers(&[ModifierKind::Rider], &config.modifiers);
    world.insert(Actor::Unit(unit_with_tool(0, 0, 0, 1, &[ResourceType::Wood])));
    world.insert(Actor::Unit(rider));
    let mut sim = Simulation::from_parts(
        config,
        world,
        fixtures::inventory(&[(ResourceType::Food, 1)]),
        0,
    )
    .unwrap();

    // The first member eats the only food; the rider starves and leaves.
    let summary = sim.advance_turn_automatic().unwrap();
    assert!(summary
        .events
        .iter()
        .any(|e| matches!(e, TickEvent::GroupDissolved { x: 0, y: 0 })));
    assert!(matches!(sim.cell(0, 0).occupant(), Some(Actor::Unit(u)) if u.id() == UnitId(0)));
    assert!(matches!(sim.cell(1, 0).occupant(), Some(Actor::Unit(u)) if u.id() == UnitId(1)));
    assert_occupancy(sim.world());
}

#[test]
fn test_group_dissolves_when_every_member_walks_off() {
    let mut world = fixtures::grid(&["W9 R0 R9"]);
    world.insert(Actor::Unit(unit_with_tool(0, 1, 0, 1, &[ResourceType::Wood])));
    world.insert(Actor::Unit(unit_with_tool(1, 1, 0, 1, &[ResourceType::Rock])));
    assert_eq!(occupant_len(&world, 1, 0), Some(2));
    let mut sim = Simulation::from_parts(
        fixtures::plain_config(3, 1),
        world,
        fixtures::inventory(&[(ResourceType::Food, 100)]),
        0,
    )
    .unwrap();

    let summary = sim.advance_turn_automatic().unwrap();
    assert!(sim.cell(1, 0).occupant().is_none());
    assert!(summary
        .events
        .contains(&TickEvent::GroupDissolved { x: 1, y: 0 }));
    assert!(matches!(sim.cell(0, 0).occupant(), Some(Actor::Unit(u)) if u.id() == UnitId(0)));
    assert!(matches!(sim.cell(2, 0).occupant(), Some(Actor::Unit(u)) if u.id() == UnitId(1)));
    assert_occupancy(sim.world());
}

#[test]
fn test_starving_group_scatters_off_its_cell() {
    let mut world = fixtures::grid(&["R0 R0 R0", "R0 W9 R0"]);
    world.insert(Actor::Unit(unit_with_tool(0, 1, 1, 1, &[ResourceType::Wood])));
    world.insert(Actor::Unit(unit_with_tool(1, 1, 1, 1, &[ResourceType::Wood])));
    let mut sim = Simulation::from_parts(
        fixtures::plain_config(3, 2),
        world,
        fixtures::inventory(&[]),
        0,
    )
    .unwrap();

    let summary = sim.advance_turn_automatic().unwrap();
    let moves: Vec<(UnitId, (u32, u32), (u32, u32))> = summary
        .events
        .iter()
        .filter_map(|event| match event {
            TickEvent::UnitMoved { unit, from, to } => Some((*unit, *from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        moves,
        vec![(UnitId(0), (1, 1), (0, 1)), (UnitId(1), (1, 1), (2, 1))]
    );
    assert!(sim.cell(1, 1).occupant().is_none());
    assert!(summary
        .events
        .contains(&TickEvent::GroupDissolved { x: 1, y: 1 }));
    assert_occupancy(sim.world());
}

#[test]
fn test_starving_group_with_nowhere_to_go_stays_together() {
    let mut world = fixtures::grid(&["W9"]);
    world.insert(Actor::Unit(unit_with_tool(0, 0, 0, 1, &[ResourceType::Wood])));
    world.insert(Actor::Unit(unit_with_tool(1, 0, 0, 1, &[ResourceType::Wood])));
    let mut sim = Simulation::from_parts(
        fixtures::plain_config(1, 1),
        world,
        fixtures::inventory(&[]),
        0,
    )
    .unwrap();

    let summary = sim.advance_turn_automatic().unwrap();
    assert!(!summary.events.iter().any(|e| matches!(
        e,
        TickEvent::UnitMoved { .. } | TickEvent::GroupDissolved { .. }
    )));
    assert!(matches!(sim.cell(0, 0).occupant(), Some(Actor::Group(g)) if g.len() == 2));
    assert_occupancy(sim.world());
}

#[test]
fn test_group_multiplier_is_configurable() {
    let mut config = fixtures::plain_config(1, 1);
    let group = Actor::from_units(
        0,
        0,
        vec![
            unit_with_tool(0, 0, 0, 2, &[ResourceType::Wood]),
            unit_with_tool(1, 0, 0, 3, &[ResourceType::Wood]),
        ],
    )
    .unwrap();

    config.group_efficiency_multiplier = fixtures::fixed(1);
    assert_eq!(group.efficiency(ResourceType::Wood, &config), 5);

    // floor(5 * 1.5^2) = floor(11.25)
    config.group_efficiency_multiplier = fixtures::fixed_ratio(3, 2);
    assert_eq!(group.efficiency(ResourceType::Wood, &config), 11);
}

#[test]
fn test_group_efficiency_uses_multiplier_per_member() {
    let config = fixtures::plain_config(1, 1);
    let group = Actor::from_units(
        0,
        0,
        vec![
            unit_with_tool(0, 0, 0, 2, &[ResourceType::Wood]),
            unit_with_tool(1, 0, 0, 3, &[ResourceType::Wood]),
            unit_with_tool(2, 0, 0, 9, &[ResourceType::Rock]),
        ],
    )
    .unwrap();

    // floor(5 * 1.1^2) = floor(6.05)
    assert_eq!(group.efficiency(ResourceType::Wood, &config), 6);
    assert_eq!(group.efficiency(ResourceType::Food, &config), 0);
}

// =============================================================================
// Manual turns
// =============================================================================

#[test]
fn test_manual_move_then_others_play() {
    let mut sim = fixtures::simulation(
        &["W3 R0 R0 R0", "R0 R0 R0 R0"],
        vec![
            unit_with_tool(0, 0, 0, 1, &[ResourceType::Wood]),
            unit_with_tool(1, 0, 0, 1, &[ResourceType::Wood]),
        ],
        &[(ResourceType::Food, 20)],
    );

    let summary = sim
        .advance_turn_manual(1, UnitAction::Move { x: 99, y: -4 })
        .unwrap();

    // The target clamps to (3, 0); the unplayed member mines automatically.
    assert_eq!(mined_in(&summary), vec![1]);
    assert!(matches!(sim.cell(3, 0).occupant(), Some(Actor::Unit(u)) if u.id() == UnitId(1)));
    assert!(matches!(sim.cell(0, 0).occupant(), Some(Actor::Unit(u)) if u.id() == UnitId(0)));
    assert!(sim.units().all(|u| !u.has_played()));
}

#[test]
fn test_manual_index_out_of_range() {
    let mut sim = fixtures::simulation(&["W3"], vec![fixtures::unit(0, 0, 0)], &[]);
    assert!(matches!(
        sim.advance_turn_manual(3, UnitAction::Mine),
        Err(GameError::UnitIndexOutOfRange { index: 3, count: 1 })
    ));
    assert_eq!(sim.tick(), 0);
}

// =============================================================================
// Modifiers
// =============================================================================

#[test]
fn test_expert_doubles_output_after_threshold() {
    let config = fixtures::plain_config(1, 1);
    let expert = unit_with_tool(0, 0, 0, 11, &[ResourceType::Wood])
        .with_modifiers(&[ModifierKind::Expert], &config.modifiers);
    let mut world = fixtures::grid(&["W100"]);
    world.insert(Actor::Unit(expert));
    let mut sim = Simulation::from_parts(
        config,
        world,
        fixtures::inventory(&[(ResourceType::Food, 10)]),
        0,
    )
    .unwrap();

    let first = sim.advance_turn_automatic().unwrap();
    assert_eq!(mined_in(&first), vec![11]);
    assert!(sim.units().all(|u| u.modifiers()[0].is_active()));

    let second = sim.advance_turn_automatic().unwrap();
    assert_eq!(mined_in(&second), vec![22]);
    // One food before activation, two after.
    assert_eq!(sim.resource_amount(ResourceType::Food), 7);
}

// =============================================================================
// Buildings
// =============================================================================

#[test]
fn test_unit_factory_spawns_on_its_cadence() {
    let mut stock = vec![(ResourceType::Food, 40), (ResourceType::Gold, 11)];
    stock.push((ResourceType::Wood, 10));
    stock.push((ResourceType::Rock, 10));
    let mut sim = fixtures::simulation(
        &["W9 W9 W9", "W9 W9 W9", "W9 W9 W9"],
        vec![unit_with_tool(0, 0, 0, 1, &[ResourceType::Wood])],
        &stock,
    );

    sim.purchase_building(BuildingKind::UnitFactory, Some(Job::Lumberjack))
        .unwrap();
    assert_eq!(sim.resource_amount(ResourceType::Gold), 1);
    assert_eq!(sim.resource_amount(ResourceType::Food), 30);

    for _ in 0..2 {
        sim.advance_turn_automatic().unwrap();
        assert_eq!(sim.buildings()[0].status(), BuildingStatus::InProgress);
    }
    let summary = sim.advance_turn_automatic().unwrap();
    assert!(summary
        .events
        .iter()
        .any(|e| matches!(e, TickEvent::UnitSpawned { unit: UnitId(1), .. })));
    assert_eq!(sim.units().count(), 2);
    assert_eq!(sim.resource_amount(ResourceType::Gold), 0);
    assert_eq!(
        sim.building_descriptions(),
        vec!["Unit factory (Lumberjack): produced last turn".to_string()]
    );
    let spawned = sim.units().find(|u| u.id() == UnitId(1)).unwrap();
    assert_eq!(spawned.job_label(), "Lumberjack");
    assert_occupancy(sim.world());
}

#[test]
fn test_purchase_reports_first_shortfall() {
    let mut sim = fixtures::simulation(
        &["W1"],
        vec![fixtures::unit(0, 0, 0)],
        &[(ResourceType::Wood, 10), (ResourceType::Rock, 3)],
    );
    assert!(matches!(
        sim.purchase_building(BuildingKind::ToolFactory, Some(Job::Miner)),
        Err(GameError::InsufficientResources {
            resource: ResourceType::Rock,
            required: 10,
            available: 3,
        })
    ));
    assert_eq!(sim.resource_amount(ResourceType::Wood), 10);
    assert!(sim.buildings().is_empty());
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_partial_ron_config_keeps_defaults() {
    let config: GameConfig = ron::from_str("(width: 8, height: 5, initial_food: 3)").unwrap();
    assert_eq!((config.width, config.height), (8, 5));
    assert_eq!(config.initial_food, 3);
    assert_eq!(config.production_interval, GameConfig::default().production_interval);
    assert_eq!(config.starting_units.len(), 2);
    assert!(config.validate().is_ok());
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_mine_never_overdraws(
        resource in strategies::arb_resource(),
        vein in strategies::arb_vein(),
        request in strategies::arb_mine_amount(),
    ) {
        let mut cell = Cell::new(0, 0, resource, vein);
        let mined = cell.mine(request);
        prop_assert_eq!(mined, vein.min(request));
        prop_assert_eq!(cell.amount(), vein - mined);
    }

    #[test]
    fn prop_lookup_is_clamped(
        (width, height) in strategies::arb_dimensions(),
        x in strategies::arb_coordinate(),
        y in strategies::arb_coordinate(),
    ) {
        let world = WorldMap::from_fn(width, height, |_, _| (ResourceType::Food, 1));
        let cell = world.get_cell(x, y);
        prop_assert!(cell.x() < width && cell.y() < height);
        if (0..i64::from(width)).contains(&x) && (0..i64::from(height)).contains(&y) {
            prop_assert_eq!((i64::from(cell.x()), i64::from(cell.y())), (x, y));
        }
    }

    #[test]
    fn prop_games_are_deterministic(
        config in strategies::arb_small_config(),
        seed in strategies::arb_seed(),
    ) {
        prop_assert!(verify_simulation_determinism(
            || Simulation::new(config.clone(), seed).unwrap(),
            25,
        ));
        prop_assert_eq!(
            find_first_divergence(|| Simulation::new(config.clone(), seed).unwrap(), 25),
            None
        );
    }

    #[test]
    fn prop_generated_veins_respect_spawn_chance(
        chance in strategies::arb_chance(),
        seed in strategies::arb_seed(),
    ) {
        let mut config = fixtures::plain_config(8, 8);
        for spawn in config.resource_spawn.values_mut() {
            spawn.spawn_chance = chance;
        }
        let world = WorldMap::generate(&config, &mut SimRng::new(seed));
        for cell in world.cells() {
            let spawn = config.spawn_for(cell.resource());
            prop_assert!(cell.amount() <= spawn.max_vein_size.saturating_sub(1));
            if chance == Fixed::ZERO {
                prop_assert_eq!(cell.amount(), 0);
            }
        }

        let again = WorldMap::generate(&config, &mut SimRng::new(seed));
        prop_assert_eq!(compute_hash(&world), compute_hash(&again));
    }

    #[test]
    fn prop_unit_factory_trains_its_job(job in strategies::arb_job()) {
        let stock = [
            (ResourceType::Food, 40),
            (ResourceType::Gold, 11),
            (ResourceType::Wood, 10),
            (ResourceType::Rock, 10),
        ];
        let mut sim = fixtures::simulation(
            &["W9 W9 W9", "W9 W9 W9", "W9 W9 W9"],
            vec![unit_with_tool(0, 0, 0, 1, &[ResourceType::Wood])],
            &stock,
        );
        sim.purchase_building(BuildingKind::UnitFactory, Some(job)).unwrap();
        for _ in 0..3 {
            sim.advance_turn_automatic().unwrap();
        }

        let spawned = sim.units().find(|u| u.id() == UnitId(1));
        prop_assert!(spawned.is_some());
        if let Some(unit) = spawned {
            prop_assert_eq!(unit.job_label(), job.name());
        }
    }

    #[test]
    fn prop_ticks_preserve_occupancy_and_units(
        config in strategies::arb_small_config(),
        seed in strategies::arb_seed(),
        actions in prop::collection::vec(strategies::arb_action(), 1..15),
    ) {
        let mut sim = Simulation::new(config, seed).unwrap();
        let mut veins = sim.world().remaining_resources();
        for action in actions {
            let units_before = sim.units().count();
            if sim.advance_turn_manual(0, action).is_err() {
                break;
            }
            assert_occupancy(sim.world());
            prop_assert!(sim.units().count() >= units_before);
            let remaining = sim.world().remaining_resources();
            prop_assert!(remaining <= veins);
            veins = remaining;
        }
    }
}
