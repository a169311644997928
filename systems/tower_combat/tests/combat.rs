use route_defence_core::{
    CellCoord, Command, Event, SimTime, TowerKind, UnitId, UnitProfile, WaveIndex,
};
use route_defence_system_tower_combat::TowerCombat;
use route_defence_world::{self as world, query, Layout, World, WorldConfig};

const ROUTE: &str = "(5, 5)\n(15, 5)\n(25, 5)\n(35, 5)\n(45, 5)\n";

fn world_with_unit(base_health: u32, towers: &[(TowerKind, CellCoord)]) -> World {
    let layout = Layout::load(ROUTE, None, 5, 4, 10.0).expect("layout");
    let mut world = World::new(
        layout,
        WorldConfig {
            units: UnitProfile {
                base_health,
                entry_stagger: 0,
                ..UnitProfile::default()
            },
            ..WorldConfig::default()
        },
    );
    let mut events = Vec::new();
    for &(kind, cell) in towers {
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
    world::apply(&mut world, Command::MovementTick, &mut events);
    world::apply(
        &mut world,
        Command::AdvanceUnit {
            unit: UnitId::new(0),
        },
        &mut events,
    );
    world
}

fn combat_tick(world: &mut World, combat: &mut TowerCombat, now: SimTime) -> Vec<Event> {
    let mut commands = Vec::new();
    combat.handle(
        now,
        &query::tower_view(world),
        &query::unit_view(world),
        &mut commands,
    );

    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

#[test]
fn unit_dies_after_cooldown_and_is_credited_once() {
    let mut world = world_with_unit(60, &[(TowerKind::Sniper, CellCoord::new(4, 3))]);
    let mut combat = TowerCombat::new();
    let money_before = query::economy(&world).money;

    let first = combat_tick(&mut world, &mut combat, SimTime::ZERO);
    assert_eq!(first.len(), 1);
    let remaining = query::unit_view(&world)
        .iter()
        .next()
        .map(|unit| unit.health.get());
    assert_eq!(remaining, Some(30));

    let cooling = combat_tick(&mut world, &mut combat, SimTime::from_millis(1_000));
    assert!(cooling.is_empty());

    let second = combat_tick(&mut world, &mut combat, SimTime::from_millis(2_000));
    let kills = second
        .iter()
        .filter(|event| matches!(event, Event::UnitKilled { .. }))
        .count();
    assert_eq!(kills, 1);
    assert_eq!(query::active_unit_count(&world), 0);
    assert_eq!(query::economy(&world).money, money_before + 20);
    assert_eq!(query::economy(&world).score, 100);

    let after = combat_tick(&mut world, &mut combat, SimTime::from_millis(4_000));
    assert!(after.is_empty());
    assert_eq!(query::economy(&world).money, money_before + 20);
}

#[test]
fn overkill_shots_are_not_planned() {
    let mut world = world_with_unit(
        10,
        &[
            (TowerKind::Sniper, CellCoord::new(0, 1)),
            (TowerKind::Basic, CellCoord::new(1, 1)),
        ],
    );
    let mut combat = TowerCombat::new();

    let events = combat_tick(&mut world, &mut combat, SimTime::ZERO);

    let shots = events
        .iter()
        .filter(|event| matches!(event, Event::TowerFired { .. }))
        .count();
    assert_eq!(shots, 1);
    let basic = query::tower_at(&world, CellCoord::new(1, 1)).expect("basic tower");
    assert!(basic.can_fire(SimTime::ZERO));
}
