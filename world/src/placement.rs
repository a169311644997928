//! Tower placement validation.

use route_defence_core::{CellCoord, PlacementError, TowerKind};

use crate::{economy::Economy, grid::Grid, towers::TowerRegistry};

/// Checks whether `kind` may be placed on `cell` without mutating anything.
///
/// Reasons are reported in a fixed order: a finished game first, then the
/// cell itself (bounds, path, occupancy) and finally affordability.
pub(crate) fn validate(
    grid: &Grid,
    towers: &TowerRegistry,
    economy: &Economy,
    cell: CellCoord,
    kind: TowerKind,
) -> Result<(), PlacementError> {
    if economy.is_frozen() {
        return Err(PlacementError::GameOver);
    }
    if !grid.contains(cell) {
        return Err(PlacementError::OutOfBounds);
    }
    if grid.is_blocked(cell) {
        return Err(PlacementError::OnPath);
    }
    if towers.occupant(cell).is_some() {
        return Err(PlacementError::Occupied);
    }
    economy.can_afford(kind.stats().cost)
}
