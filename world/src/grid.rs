//! Placement grid with buildable and blocked cells.

use glam::Vec2;
use route_defence_core::CellCoord;

use crate::{layout::LayoutError, route::Route};

/// Placement state of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellState {
    /// Towers may be placed on the cell.
    Buildable,
    /// The cell belongs to the unit path.
    Blocked,
}

/// Dense grid of cells overlaid on the world plane.
#[derive(Clone, Debug)]
pub struct Grid {
    columns: u32,
    rows: u32,
    cell_length: f32,
    cells: Vec<CellState>,
}

impl Grid {
    /// Creates a fully buildable grid.
    pub fn new(columns: u32, rows: u32, cell_length: f32) -> Result<Self, LayoutError> {
        if columns == 0 || rows == 0 || !cell_length.is_finite() || cell_length <= 0.0 {
            return Err(LayoutError::EmptyGrid);
        }

        let capacity = usize::try_from(u64::from(columns) * u64::from(rows))
            .map_err(|_| LayoutError::EmptyGrid)?;
        Ok(Self {
            columns,
            rows,
            cell_length,
            cells: vec![CellState::Buildable; capacity],
        })
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a single square cell expressed in world units.
    #[must_use]
    pub const fn cell_length(&self) -> f32 {
        self.cell_length
    }

    /// State of the provided cell, `None` when it lies outside the grid.
    #[must_use]
    pub fn state(&self, cell: CellCoord) -> Option<CellState> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.index(cell).is_some()
    }

    /// Reports whether the cell belongs to the unit path.
    #[must_use]
    pub fn is_blocked(&self, cell: CellCoord) -> bool {
        self.state(cell) == Some(CellState::Blocked)
    }

    /// Marks a cell as blocked. Returns `false` when the cell lies outside the grid.
    pub fn block(&mut self, cell: CellCoord) -> bool {
        match self.index(cell).and_then(|index| self.cells.get_mut(index)) {
            Some(slot) => {
                *slot = CellState::Blocked;
                true
            }
            None => false,
        }
    }

    /// Blocks every cell crossed by a segment of the route.
    ///
    /// Portions of the route outside the grid are ignored, which lets a route
    /// enter from beyond the visible field.
    pub fn block_route(&mut self, route: &Route) {
        for (from, to) in route.segments() {
            self.block_segment(from / self.cell_length, to / self.cell_length);
        }
    }

    /// Walks the cells crossed by a segment given in cell units.
    ///
    /// The segment is clipped to the grid first, so the walk visits at most
    /// `columns + rows` cells whatever the segment length. A segment passing
    /// exactly through a cell corner steps diagonally without blocking the two
    /// cells that only touch the corner.
    fn block_segment(&mut self, from: Vec2, to: Vec2) {
        let bounds = Vec2::new(self.columns as f32, self.rows as f32);
        let Some((start, end)) = clip_to_bounds(from, to, bounds) else {
            return;
        };

        let delta = end - start;
        let mut column = clamp_cell(start.x, self.columns);
        let mut row = clamp_cell(start.y, self.rows);
        let last_column = clamp_cell(end.x, self.columns);
        let last_row = clamp_cell(end.y, self.rows);

        let (step_column, mut next_x, delta_x) = axis_walk(start.x, delta.x, column);
        let (step_row, mut next_y, delta_y) = axis_walk(start.y, delta.y, row);

        let max_steps = u64::from(self.columns) + u64::from(self.rows);
        for _ in 0..=max_steps {
            let _ = self.block(CellCoord::new(column, row));
            if (column, row) == (last_column, last_row) || next_x.min(next_y) > 1.0 {
                return;
            }

            let cross_x = next_x <= next_y;
            let cross_y = next_y <= next_x;
            if cross_x {
                match column.checked_add_signed(step_column) {
                    Some(next) if next < self.columns => column = next,
                    _ => return,
                }
                next_x += delta_x;
            }
            if cross_y {
                match row.checked_add_signed(step_row) {
                    Some(next) if next < self.rows => row = next,
                    _ => return,
                }
                next_y += delta_y;
            }
        }
    }

    /// Cell containing the provided world position.
    #[must_use]
    pub fn cell_at(&self, point: Vec2) -> Option<CellCoord> {
        if !point.is_finite() || point.x < 0.0 || point.y < 0.0 {
            return None;
        }

        let column = (point.x / self.cell_length).floor() as u32;
        let row = (point.y / self.cell_length).floor() as u32;
        let cell = CellCoord::new(column, row);
        self.contains(cell).then_some(cell)
    }

    /// World position of the centre of the provided cell.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> Vec2 {
        Vec2::new(
            (cell.column() as f32 + 0.5) * self.cell_length,
            (cell.row() as f32 + 0.5) * self.cell_length,
        )
    }

    /// Blocked cells in row-major order.
    pub fn blocked_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        let columns = self.columns;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, state)| **state == CellState::Blocked)
            .filter_map(move |(index, _)| {
                let index = u32::try_from(index).ok()?;
                Some(CellCoord::new(index % columns, index / columns))
            })
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Clips a segment to the rectangle `[0, bounds]` (Liang-Barsky).
fn clip_to_bounds(from: Vec2, to: Vec2, bounds: Vec2) -> Option<(Vec2, Vec2)> {
    let delta = to - from;
    let mut enter = 0.0_f32;
    let mut exit = 1.0_f32;

    for (p, q) in [
        (-delta.x, from.x),
        (delta.x, bounds.x - from.x),
        (-delta.y, from.y),
        (delta.y, bounds.y - from.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            enter = enter.max(t);
        } else {
            exit = exit.min(t);
        }
    }

    (enter <= exit).then(|| (from + delta * enter, from + delta * exit))
}

/// Cell index along one axis, keeping points on the far edge inside the grid.
fn clamp_cell(coordinate: f32, cells: u32) -> u32 {
    (coordinate.max(0.0).floor() as u32).min(cells - 1)
}

/// Step direction, parameter of the first boundary crossing and parameter
/// spacing between crossings along one axis of a clipped segment.
fn axis_walk(start: f32, delta: f32, cell: u32) -> (i32, f32, f32) {
    if delta > 0.0 {
        let boundary = cell as f32 + 1.0;
        (1, (boundary - start) / delta, 1.0 / delta)
    } else if delta < 0.0 {
        let boundary = cell as f32;
        (-1, (start - boundary) / -delta, 1.0 / -delta)
    } else {
        (0, f32::INFINITY, f32::INFINITY)
    }
}
