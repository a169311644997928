//! Authoritative tower state management utilities.

use std::collections::BTreeMap;

use glam::Vec2;
use route_defence_core::{
    CellCoord, DamageOutcome, SavedTower, SimTime, TowerId, TowerKind, TowerSnapshot,
    UnitTerminated,
};

use crate::units::Unit;

/// Snapshot of a tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Kind of tower that was constructed.
    pub(crate) kind: TowerKind,
    /// Cell occupied by the tower.
    pub(crate) cell: CellCoord,
    /// Point distances are measured from.
    pub(crate) anchor: Vec2,
    /// Simulated time of the last successful shot.
    pub(crate) last_fired_at: Option<SimTime>,
}

impl TowerState {
    pub(crate) fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            anchor: self.anchor,
            last_fired_at: self.last_fired_at,
        }
    }

    pub(crate) fn can_fire(&self, now: SimTime) -> bool {
        self.snapshot().can_fire(now)
    }

    /// Damages the target and starts the cooldown.
    ///
    /// A terminated target is left untouched and the cooldown is not consumed.
    pub(crate) fn fire(
        &mut self,
        target: &mut Unit,
        now: SimTime,
    ) -> Result<DamageOutcome, UnitTerminated> {
        let outcome = target.take_damage(self.kind.stats().damage)?;
        self.last_fired_at = Some(now);
        Ok(outcome)
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    by_cell: BTreeMap<CellCoord, TowerId>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            by_cell: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Registers a tower, allocating the next identifier.
    pub(crate) fn insert(&mut self, kind: TowerKind, cell: CellCoord, anchor: Vec2) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().saturating_add(1));
        let _ = self.by_cell.insert(cell, id);
        let _ = self.entries.insert(
            id,
            TowerState {
                id,
                kind,
                cell,
                anchor,
                last_fired_at: None,
            },
        );
        id
    }

    pub(crate) fn get(&self, id: TowerId) -> Option<&TowerState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&id)
    }

    /// Tower occupying the provided cell, if any.
    pub(crate) fn occupant(&self, cell: CellCoord) -> Option<TowerId> {
        self.by_cell.get(&cell).copied()
    }

    /// Towers in placement order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }

    pub(crate) fn saved(&self) -> Vec<SavedTower> {
        self.iter()
            .map(|tower| SavedTower {
                kind: tower.kind,
                cell: tower.cell,
            })
            .collect()
    }

    /// Removes every tower and resets identifier allocation.
    pub(crate) fn clear(&mut self) {
        *self = Self::new();
    }
}
