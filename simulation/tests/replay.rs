use std::time::Duration;

use route_defence_core::{CellCoord, Event, SaveRecord, TowerKind};
use route_defence_simulation::{Simulation, SimulationConfig};
use route_defence_world::Layout;

const ROUTE: &str = "(0, 30)\n(40, 30)\n(80, 30)\n(120, 30)\n(160, 30)\n(200, 30)\n(240, 30)\n";

#[derive(Debug, PartialEq)]
struct ReplayOutcome {
    events: Vec<Event>,
    record: SaveRecord,
}

fn replay() -> ReplayOutcome {
    let layout = Layout::load(ROUTE, None, 13, 5, 20.0).expect("layout");
    let mut simulation = Simulation::new(layout, SimulationConfig::default());
    for (cell, kind) in [
        (CellCoord::new(2, 3), TowerKind::MachineGun),
        (CellCoord::new(6, 0), TowerKind::Basic),
        (CellCoord::new(9, 3), TowerKind::Sniper),
    ] {
        let _ = simulation.place_tower(cell, kind);
    }
    let _ = simulation.start_wave();

    let mut events = Vec::new();
    for _ in 0..120 {
        simulation.advance(Duration::from_millis(50));
        events.extend(simulation.drain_events());
    }

    ReplayOutcome {
        events,
        record: simulation.save_record(),
    }
}

#[test]
fn identical_sessions_produce_identical_histories() {
    let first = replay();
    let second = replay();

    assert!(first
        .events
        .iter()
        .any(|event| matches!(event, Event::TowerFired { .. })));
    assert_eq!(first, second, "replay diverged between runs");
}
