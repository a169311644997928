#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that plans tower shots for a single combat tick.

use route_defence_core::{Command, SimTime, TowerView, UnitSnapshot, UnitView};
use route_defence_system_tower_targeting::nearest_in_range;

/// Tower combat system that queues firing commands for ready towers.
///
/// Towers are resolved one after another in placement order against the unit
/// health projected from the shots already planned in the same pass. A tower
/// whose nearest unit would already be dead re-targets instead of wasting its
/// shot.
#[derive(Debug, Default)]
pub struct TowerCombat {
    projected: Vec<UnitSnapshot>,
    scratch: Vec<Command>,
}

impl TowerCombat {
    /// Creates a new tower combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::FireTower` entries for towers ready to fire at `now`.
    pub fn handle(
        &mut self,
        now: SimTime,
        towers: &TowerView,
        units: &UnitView,
        out: &mut Vec<Command>,
    ) {
        if units.is_empty() {
            return;
        }

        self.projected.clear();
        self.projected.extend(units.iter().copied());
        self.scratch.clear();

        for tower in towers.iter() {
            if !tower.can_fire(now) {
                continue;
            }

            let Some(target) = nearest_in_range(tower, &self.projected) else {
                continue;
            };

            if let Some(unit) = self
                .projected
                .iter_mut()
                .find(|unit| unit.id == target.unit)
            {
                unit.health = unit.health.saturating_sub(tower.kind.stats().damage);
            }

            self.scratch.push(Command::FireTower {
                tower: tower.id,
                target: target.unit,
                now,
            });
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}
