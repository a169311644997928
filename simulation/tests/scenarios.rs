use std::time::Duration;

use route_defence_core::{
    CellCoord, EconomySnapshot, Event, GameOverReport, PlacementError, SaveRecord, SimTime,
    TowerKind, UnitProfile, WaveIndex, WavePhase,
};
use route_defence_simulation::{
    CadenceConfig, EconomyConfig, Simulation, SimulationConfig, StartError, TaskId, WavesConfig,
};
use route_defence_world::{query, Layout};

const ROUTE: &str = "(10, 10)\n(30, 10)\n(50, 10)\n(70, 10)\n(90, 10)\n";

fn layout() -> Layout {
    Layout::load(ROUTE, None, 6, 6, 20.0).expect("layout")
}

fn config(units: UnitProfile, progression: Vec<u32>) -> SimulationConfig {
    SimulationConfig {
        units,
        waves: WavesConfig { progression },
        ..SimulationConfig::default()
    }
}

fn stationary(mut config: SimulationConfig) -> SimulationConfig {
    config.cadence = CadenceConfig {
        movement_ms: 1_000_000,
        ..CadenceConfig::default()
    };
    config
}

fn count(events: &[Event], predicate: impl Fn(&Event) -> bool) -> usize {
    events.iter().filter(|event| predicate(event)).count()
}

#[test]
fn unit_breaches_after_one_tick_per_waypoint() {
    let mut simulation = Simulation::new(
        layout(),
        config(
            UnitProfile {
                base_health: 40,
                entry_stagger: 0,
                ..UnitProfile::default()
            },
            vec![1],
        ),
    );
    assert_eq!(simulation.start_wave(), Ok(WaveIndex::new(1)));

    for _ in 0..4 {
        simulation.tick_movement();
    }
    assert_eq!(query::economy(simulation.world()).health, 100);
    assert_eq!(query::active_unit_count(simulation.world()), 1);

    simulation.tick_movement();
    assert_eq!(query::economy(simulation.world()).health, 80);
    assert_eq!(query::active_unit_count(simulation.world()), 0);
}

/// Runs with a sniper (30 damage, 2000 ms, unbounded range) against a 60 hp
/// unit, the catalog counterpart of a 25 damage, 1000 ms tower against 50 hp.
#[test]
fn unit_in_range_dies_after_cooldown_and_pays_once() {
    let mut simulation = Simulation::new(
        layout(),
        stationary(config(
            UnitProfile {
                base_health: 60,
                entry_stagger: 0,
                ..UnitProfile::default()
            },
            vec![1],
        )),
    );
    let _ = simulation
        .place_tower(CellCoord::new(3, 3), TowerKind::Sniper)
        .expect("sniper placed");
    let _ = simulation.start_wave().expect("wave starts");
    simulation.tick_movement();

    simulation.advance(Duration::from_millis(2_000));
    let health: Vec<u32> = query::unit_view(simulation.world())
        .iter()
        .map(|unit| unit.health.get())
        .collect();
    assert_eq!(health, vec![30]);
    assert_eq!(query::economy(simulation.world()).money, 450);

    simulation.advance(Duration::from_millis(100));
    let events = simulation.drain_events();
    assert_eq!(
        count(&events, |event| matches!(event, Event::UnitKilled { .. })),
        1
    );
    let economy = query::economy(simulation.world());
    assert_eq!(economy.money, 470);
    assert_eq!(economy.score, 100);
    assert_eq!(query::active_unit_count(simulation.world()), 0);

    simulation.advance(Duration::from_millis(3_000));
    assert_eq!(query::economy(simulation.world()).money, 470);
}

#[test]
fn placement_on_path_is_rejected_without_cost() {
    let mut simulation = Simulation::new(layout(), SimulationConfig::default());

    assert_eq!(
        simulation.place_tower(CellCoord::new(2, 0), TowerKind::Basic),
        Err(PlacementError::OnPath)
    );
    assert_eq!(query::economy(simulation.world()).money, 650);
    assert!(simulation.snapshot().towers.is_empty());
}

fn rejection_reasons(events: &[Event]) -> Vec<PlacementError> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::TowerPlacementRejected { reason, .. } => Some(*reason),
            _ => None,
        })
        .collect()
}

#[test]
fn placement_on_occupied_cell_is_rejected_without_cost() {
    let mut simulation = Simulation::new(layout(), SimulationConfig::default());
    let cell = CellCoord::new(3, 3);
    let _ = simulation
        .place_tower(cell, TowerKind::Basic)
        .expect("basic placed");
    let _ = simulation.drain_events();

    assert_eq!(
        simulation.place_tower(cell, TowerKind::Sniper),
        Err(PlacementError::Occupied)
    );
    assert_eq!(
        rejection_reasons(&simulation.drain_events()),
        vec![PlacementError::Occupied]
    );
    assert_eq!(query::economy(simulation.world()).money, 480);
    let towers = simulation.snapshot().towers;
    assert_eq!(towers.len(), 1);
    assert_eq!(towers[0].kind, TowerKind::Basic);
}

#[test]
fn unaffordable_placement_is_rejected_without_cost() {
    let mut simulation = Simulation::new(
        layout(),
        SimulationConfig {
            economy: EconomyConfig {
                money: 100,
                ..EconomyConfig::default()
            },
            ..SimulationConfig::default()
        },
    );

    assert_eq!(
        simulation.place_tower(CellCoord::new(3, 3), TowerKind::Sniper),
        Err(PlacementError::InsufficientFunds {
            cost: 200,
            available: 100,
        })
    );
    assert_eq!(
        rejection_reasons(&simulation.drain_events()),
        vec![PlacementError::InsufficientFunds {
            cost: 200,
            available: 100,
        }]
    );
    assert_eq!(query::economy(simulation.world()).money, 100);
    assert!(simulation.snapshot().towers.is_empty());
}

#[test]
fn placement_outside_grid_is_rejected_without_cost() {
    let mut simulation = Simulation::new(layout(), SimulationConfig::default());

    assert_eq!(
        simulation.place_tower(CellCoord::new(6, 0), TowerKind::Basic),
        Err(PlacementError::OutOfBounds)
    );
    assert_eq!(
        rejection_reasons(&simulation.drain_events()),
        vec![PlacementError::OutOfBounds]
    );
    assert_eq!(query::economy(simulation.world()).money, 650);
    assert!(simulation.snapshot().towers.is_empty());
}

#[test]
fn next_wave_waits_for_inter_wave_delay() {
    let mut simulation = Simulation::new(
        layout(),
        stationary(config(
            UnitProfile {
                base_health: 5,
                entry_stagger: 0,
                ..UnitProfile::default()
            },
            vec![5, 8],
        )),
    );
    let _ = simulation
        .place_tower(CellCoord::new(1, 1), TowerKind::MachineGun)
        .expect("machine gun placed");
    let _ = simulation.start_wave().expect("wave starts");
    simulation.tick_movement();
    let _ = simulation.drain_events();

    simulation.advance(Duration::from_millis(1_000));
    let events = simulation.drain_events();
    assert_eq!(
        count(&events, |event| matches!(event, Event::UnitKilled { .. })),
        5
    );
    assert_eq!(simulation.phase(), WavePhase::WaveComplete);
    assert_eq!(query::economy(simulation.world()).money, 500);

    simulation.advance(Duration::from_millis(850));
    let events = simulation.drain_events();
    assert_eq!(
        count(&events, |event| matches!(event, Event::UnitSpawned { .. })),
        0
    );
    assert_eq!(simulation.wave(), WaveIndex::new(1));

    simulation.advance(Duration::from_millis(100));
    let events = simulation.drain_events();
    assert_eq!(
        count(&events, |event| matches!(
            event,
            Event::UnitSpawned { wave, .. } if *wave == WaveIndex::new(2)
        )),
        8
    );
    assert_eq!(simulation.phase(), WavePhase::Monitoring);
    assert_eq!(simulation.now(), SimTime::from_millis(1_950));
}

#[test]
fn game_over_stops_tasks_and_is_reported_once() {
    let mut simulation = Simulation::new(
        layout(),
        SimulationConfig {
            economy: EconomyConfig {
                health: 20,
                ..EconomyConfig::default()
            },
            waves: WavesConfig {
                progression: vec![3],
            },
            ..SimulationConfig::default()
        },
    );
    let _ = simulation.start_wave().expect("wave starts");

    simulation.advance(Duration::from_secs(2));

    assert_eq!(
        simulation.take_game_over(),
        Some(GameOverReport {
            score: 0,
            wave: WaveIndex::new(1),
        })
    );
    assert_eq!(simulation.take_game_over(), None);
    for task in [
        TaskId::Movement,
        TaskId::Combat,
        TaskId::WaveMonitor,
        TaskId::InterWaveDelay,
    ] {
        assert!(!simulation.is_scheduled(task), "{task:?} still scheduled");
    }
    let events = simulation.drain_events();
    assert_eq!(
        count(&events, |event| matches!(event, Event::GameOver { .. })),
        1
    );
    assert_eq!(simulation.phase(), WavePhase::GameOver);
    assert_eq!(simulation.start_wave(), Err(StartError::GameOver));
    assert_eq!(
        simulation.place_tower(CellCoord::new(3, 3), TowerKind::Basic),
        Err(PlacementError::GameOver)
    );
    assert!(simulation.snapshot().game_over);
}

#[test]
fn save_record_rehydrates_without_charging() {
    let mut original = Simulation::new(layout(), SimulationConfig::default());
    let _ = original
        .place_tower(CellCoord::new(2, 2), TowerKind::Basic)
        .expect("basic placed");
    let _ = original
        .place_tower(CellCoord::new(3, 3), TowerKind::Sniper)
        .expect("sniper placed");
    let _ = original.start_wave().expect("wave starts");
    let record = original.save_record();
    assert_eq!(record.wave, WaveIndex::new(1));
    assert_eq!(
        record.economy,
        EconomySnapshot {
            money: 280,
            health: 100,
            score: 0,
        }
    );

    let mut restored = Simulation::new(layout(), SimulationConfig::default());
    restored.rehydrate(record.clone());

    assert_eq!(query::economy(restored.world()), record.economy);
    assert_eq!(query::saved_towers(restored.world()), record.towers);
    assert_eq!(restored.phase(), WavePhase::Idle);
    assert_eq!(restored.start_wave(), Ok(WaveIndex::new(1)));
}

#[test]
fn rehydrating_a_lost_game_reports_game_over() {
    let mut simulation = Simulation::new(layout(), SimulationConfig::default());

    simulation.rehydrate(SaveRecord {
        towers: Vec::new(),
        economy: EconomySnapshot {
            money: 40,
            health: 0,
            score: 900,
        },
        wave: WaveIndex::new(3),
    });

    assert_eq!(simulation.phase(), WavePhase::GameOver);
    assert_eq!(
        simulation.take_game_over(),
        Some(GameOverReport {
            score: 900,
            wave: WaveIndex::new(3),
        })
    );
    assert_eq!(simulation.take_game_over(), None);
    assert_eq!(simulation.start_wave(), Err(StartError::GameOver));
    assert!(simulation.snapshot().game_over);
}

#[test]
fn paused_simulation_ignores_advance() {
    let mut simulation = Simulation::new(layout(), SimulationConfig::default());
    let _ = simulation.start_wave().expect("wave starts");
    let _ = simulation.drain_events();

    simulation.pause();
    simulation.advance(Duration::from_secs(1));
    assert!(simulation.is_paused());
    assert_eq!(simulation.now(), SimTime::ZERO);
    assert!(simulation.drain_events().is_empty());

    simulation.resume();
    simulation.advance(Duration::from_millis(20));
    assert_eq!(simulation.now(), SimTime::from_millis(20));
    assert_eq!(
        simulation.drain_events().first(),
        Some(&Event::MovementTicked)
    );
}

#[test]
fn snapshot_lists_targets_of_towers_in_reach() {
    let mut simulation = Simulation::new(
        layout(),
        config(
            UnitProfile {
                entry_stagger: 0,
                ..UnitProfile::default()
            },
            vec![2],
        ),
    );
    let tower = simulation
        .place_tower(CellCoord::new(1, 1), TowerKind::Basic)
        .expect("tower placed");
    let _ = simulation.start_wave().expect("wave starts");
    assert!(simulation.snapshot().targets.is_empty());

    simulation.tick_movement();
    let snapshot = simulation.snapshot();

    assert_eq!(snapshot.units.len(), 2);
    assert_eq!(snapshot.targets.len(), 1);
    assert_eq!(snapshot.targets[0].tower, tower);
    assert_eq!(snapshot.wave, WaveIndex::new(1));
    assert_eq!(snapshot.phase, WavePhase::Monitoring);
}
