use route_defence_core::{CellCoord, Command, TowerKind, TowerTarget, UnitId, WaveIndex};
use route_defence_system_tower_targeting::TowerTargeting;
use route_defence_world::{self as world, query, Layout, World, WorldConfig};

const ROUTE: &str = "(10, 10)\n(30, 10)\n(50, 10)\n(70, 10)\n(90, 10)\n(110, 10)\n";

fn prepared_world() -> World {
    let layout = Layout::load(ROUTE, None, 6, 6, 20.0).expect("layout");
    let mut world = World::new(layout, WorldConfig::default());
    let mut events = Vec::new();
    for (kind, cell) in [
        (TowerKind::MachineGun, CellCoord::new(0, 2)),
        (TowerKind::Sniper, CellCoord::new(5, 5)),
    ] {
        world::apply(&mut world, Command::PlaceTower { kind, cell }, &mut events);
    }
    world::apply(
        &mut world,
        Command::SpawnWave {
            wave: WaveIndex::new(1),
            count: 1,
        },
        &mut events,
    );
    world
}

fn targets(world: &World) -> Vec<TowerTarget> {
    let mut system = TowerTargeting::new();
    let mut out = Vec::new();
    system.handle(&query::tower_view(world), &query::unit_view(world), &mut out);
    out
}

#[test]
fn staged_wave_produces_no_targets() {
    let world = prepared_world();

    assert_eq!(query::active_unit_count(&world), 1);
    assert!(targets(&world).is_empty());
}

#[test]
fn entering_unit_is_targeted_by_towers_in_reach() {
    let mut world = prepared_world();
    let mut events = Vec::new();
    world::apply(&mut world, Command::MovementTick, &mut events);
    world::apply(
        &mut world,
        Command::AdvanceUnit {
            unit: UnitId::new(0),
        },
        &mut events,
    );

    let assignments = targets(&world);

    let towers: Vec<u32> = assignments.iter().map(|target| target.tower.get()).collect();
    assert_eq!(towers, vec![0, 1]);
    assert!(assignments
        .iter()
        .all(|target| target.unit == UnitId::new(0)));
    assert!((assignments[0].distance - 40.0).abs() < 1.0e-4);
}

#[test]
fn targeting_is_repeatable() {
    let mut world = prepared_world();
    let mut events = Vec::new();
    world::apply(&mut world, Command::MovementTick, &mut events);
    world::apply(
        &mut world,
        Command::AdvanceUnit {
            unit: UnitId::new(0),
        },
        &mut events,
    );

    assert_eq!(targets(&world), targets(&world));
}
