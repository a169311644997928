#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Route Defence.
//!
//! The world exclusively owns the active unit set, the tower registry and the
//! player economy. It is mutated only through [`apply`] and read through the
//! [`query`] module.

pub mod grid;
pub mod layout;
pub mod route;

mod economy;
mod placement;
mod towers;
mod units;

use route_defence_core::{
    Command, DamageOutcome, EconomySnapshot, Event, MoveOutcome, SimTime, TowerId, UnitId,
    UnitProfile, WELCOME_BANNER,
};
use tracing::{debug, info, warn};

pub use grid::{CellState, Grid};
pub use layout::{parse_cells, Layout, LayoutError};
pub use route::Route;

use economy::Economy;
use towers::TowerRegistry;
use units::Unit;

/// Starting conditions applied when the world is created.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WorldConfig {
    /// Economy counters at the start of a session.
    pub economy: EconomySnapshot,
    /// Parameters applied to every spawned unit.
    pub units: UnitProfile,
}

/// Represents the authoritative Route Defence world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    layout: Layout,
    profile: UnitProfile,
    units: Vec<Unit>,
    towers: TowerRegistry,
    economy: Economy,
    next_unit_id: u32,
}

impl World {
    /// Creates a world over the provided layout.
    #[must_use]
    pub fn new(layout: Layout, config: WorldConfig) -> Self {
        Self {
            banner: WELCOME_BANNER,
            layout,
            profile: config.units,
            units: Vec::new(),
            towers: TowerRegistry::new(),
            economy: Economy::new(config.economy),
            next_unit_id: 0,
        }
    }

    fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|unit| unit.id() == id)
    }

    fn check_game_over(&mut self, out_events: &mut Vec<Event>) {
        if self.economy.is_game_over() && !self.economy.is_frozen() {
            self.economy.freeze();
            let score = self.economy.snapshot().score;
            info!(score, "player health depleted, game over");
            out_events.push(Event::GameOver { score });
        }
    }

    fn sweep_terminated(&mut self) {
        self.units.retain(Unit::is_active);
    }

    fn advance_unit(&mut self, id: UnitId, out_events: &mut Vec<Event>) {
        let Some(unit) = self.unit_mut(id) else {
            debug!(unit = id.get(), "advance requested for absent unit");
            return;
        };
        if !unit.ready_for_step() {
            debug!(unit = id.get(), "advance requested before a full step accrued");
            return;
        }

        match unit.advance() {
            Ok(MoveOutcome::Advanced(waypoint)) => {
                out_events.push(Event::UnitAdvanced { unit: id, waypoint });
            }
            Ok(MoveOutcome::Breached) => {
                let damage = unit.breach_damage();
                self.economy.take_damage(damage);
                debug!(unit = id.get(), damage, "unit breached the exit");
                out_events.push(Event::UnitBreached { unit: id, damage });
                self.check_game_over(out_events);
            }
            Err(error) => warn!(%error, "dropping stale advance"),
        }
    }

    fn fire_tower(
        &mut self,
        tower: TowerId,
        target: UnitId,
        now: SimTime,
        out_events: &mut Vec<Event>,
    ) {
        let Some(state) = self.towers.get_mut(tower) else {
            warn!(tower = tower.get(), "fire requested for unknown tower");
            return;
        };
        if !state.can_fire(now) {
            debug!(tower = tower.get(), "tower still cooling down");
            return;
        }
        let Some(unit) = self.units.iter_mut().find(|unit| unit.id() == target) else {
            debug!(unit = target.get(), "target already left the field");
            return;
        };
        let Some(position) = unit.position() else {
            debug!(unit = target.get(), "target still staged");
            return;
        };
        if !state.kind.stats().range.reaches(state.anchor.distance(position)) {
            debug!(tower = tower.get(), unit = target.get(), "target out of range");
            return;
        }

        let damage = state.kind.stats().damage;
        match state.fire(unit, now) {
            Ok(DamageOutcome::Alive(_)) => {
                out_events.push(Event::TowerFired {
                    tower,
                    target,
                    damage,
                });
            }
            Ok(DamageOutcome::Killed) => {
                let reward = unit.reward();
                let score = unit.score();
                out_events.push(Event::TowerFired {
                    tower,
                    target,
                    damage,
                });
                self.economy.add_money(reward);
                self.economy.increase_score(score);
                debug!(unit = target.get(), tower = tower.get(), reward, "unit killed");
                out_events.push(Event::UnitKilled {
                    unit: target,
                    tower,
                    reward,
                    score,
                });
            }
            Err(error) => warn!(%error, "dropping stale shot"),
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Units terminated while processing the command are swept from the active
/// set before this function returns.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::MovementTick => {
            for unit in &mut world.units {
                unit.tick_movement();
            }
            out_events.push(Event::MovementTicked);
        }
        Command::AdvanceUnit { unit } => world.advance_unit(unit, out_events),
        Command::SpawnWave { wave, count } => {
            for release in 0..count {
                let id = UnitId::new(world.next_unit_id);
                world.next_unit_id = world.next_unit_id.saturating_add(1);
                let hold = release.saturating_mul(world.profile.entry_stagger);
                let unit = Unit::spawn(
                    id,
                    world.layout.route().clone(),
                    &world.profile,
                    wave,
                    hold,
                );
                out_events.push(Event::UnitSpawned {
                    unit: id,
                    wave,
                    health: unit.health(),
                });
                world.units.push(unit);
            }
            info!(wave = wave.get(), count, "wave spawned");
        }
        Command::PlaceTower { kind, cell } => {
            let placed = placement::validate(
                world.layout.grid(),
                &world.towers,
                &world.economy,
                cell,
                kind,
            )
            .and_then(|()| world.economy.deduct_money(kind.stats().cost));

            match placed {
                Ok(()) => {
                    let anchor = world.layout.grid().cell_center(cell);
                    let tower = world.towers.insert(kind, cell, anchor);
                    info!(tower = tower.get(), %kind, %cell, "tower placed");
                    out_events.push(Event::TowerPlaced { tower, kind, cell });
                }
                Err(reason) => {
                    debug!(%kind, %cell, %reason, "tower placement rejected");
                    out_events.push(Event::TowerPlacementRejected { kind, cell, reason });
                }
            }
        }
        Command::FireTower { tower, target, now } => {
            world.fire_tower(tower, target, now, out_events);
        }
        Command::Rehydrate { towers, economy } => {
            world.units.clear();
            world.towers.clear();
            world.economy.restore(economy);

            let grid = world.layout.grid();
            for saved in towers {
                if !grid.contains(saved.cell)
                    || grid.is_blocked(saved.cell)
                    || world.towers.occupant(saved.cell).is_some()
                {
                    warn!(kind = %saved.kind, cell = %saved.cell, "skipping invalid saved tower");
                    continue;
                }
                let _ = world
                    .towers
                    .insert(saved.kind, saved.cell, grid.cell_center(saved.cell));
            }

            let restored = world.towers.iter().count();
            info!(towers = restored, "world rehydrated");
            out_events.push(Event::Rehydrated { towers: restored });
            world.check_game_over(out_events);
        }
    }

    world.sweep_terminated();
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::sync::Arc;

    use route_defence_core::{
        CellCoord, EconomySnapshot, PlacementError, SavedTower, TowerKind, TowerSnapshot,
        TowerView, UnitView,
    };

    use super::{placement, Grid, Route, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Shared handle to the route every unit follows.
    #[must_use]
    pub fn route(world: &World) -> &Arc<Route> {
        world.layout.route()
    }

    /// Provides read-only access to the placement grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        world.layout.grid()
    }

    /// Captures a read-only view of the active units.
    #[must_use]
    pub fn unit_view(world: &World) -> UnitView {
        UnitView::from_snapshots(world.units.iter().map(|unit| unit.snapshot()).collect())
    }

    /// Captures a read-only view of the placed towers.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.iter().map(|tower| tower.snapshot()).collect())
    }

    /// Current economy counters.
    #[must_use]
    pub fn economy(world: &World) -> EconomySnapshot {
        world.economy.snapshot()
    }

    /// Reports whether the player's health is depleted.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.economy.is_game_over()
    }

    /// Number of units still on the field, staged units included.
    #[must_use]
    pub fn active_unit_count(world: &World) -> usize {
        world.units.len()
    }

    /// Tower occupying the provided cell, if any.
    #[must_use]
    pub fn tower_at(world: &World, cell: CellCoord) -> Option<TowerSnapshot> {
        world
            .towers
            .occupant(cell)
            .and_then(|id| world.towers.get(id))
            .map(|tower| tower.snapshot())
    }

    /// Runs placement validation without mutating the world.
    pub fn validate_placement(
        world: &World,
        cell: CellCoord,
        kind: TowerKind,
    ) -> Result<(), PlacementError> {
        placement::validate(world.layout.grid(), &world.towers, &world.economy, cell, kind)
    }

    /// Towers in placement order, as stored in a save record.
    #[must_use]
    pub fn saved_towers(world: &World) -> Vec<SavedTower> {
        world.towers.saved()
    }
}
