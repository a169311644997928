//! Load-time construction of the route and the placement grid.

use std::sync::Arc;

use route_defence_core::CellCoord;
use thiserror::Error;

use crate::{grid::Grid, route::Route};

/// Reasons a route or grid description cannot be loaded.
///
/// Layout failures are fatal: the simulation never starts with a partial
/// layout, and the layout is immutable once loaded.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum LayoutError {
    /// A line did not contain a single `(x, y)` pair.
    #[error("line {line}: expected `(x, y)`, found `{content}`")]
    MalformedLine {
        /// One-based line number.
        line: usize,
        /// Raw line content.
        content: String,
    },
    /// A coordinate was infinite or NaN.
    #[error("line {line}: coordinates must be finite")]
    NonFiniteCoordinate {
        /// One-based line number.
        line: usize,
    },
    /// Fewer than two waypoints were provided.
    #[error("a route needs at least two waypoints, found {waypoints}")]
    RouteTooShort {
        /// Number of waypoints found.
        waypoints: usize,
    },
    /// The grid has no cells or a non-positive cell length.
    #[error("grid must have positive dimensions")]
    EmptyGrid,
    /// An explicit path cell lies outside the grid.
    #[error("path cell {cell} lies outside the grid")]
    CellOutOfBounds {
        /// Offending cell.
        cell: CellCoord,
    },
}

/// Route and grid pair consumed by the world.
#[derive(Clone, Debug)]
pub struct Layout {
    route: Arc<Route>,
    grid: Grid,
}

impl Layout {
    /// Builds a layout whose blocked cells are the rasterised route footprint.
    pub fn from_route(
        route: Route,
        columns: u32,
        rows: u32,
        cell_length: f32,
    ) -> Result<Self, LayoutError> {
        let mut grid = Grid::new(columns, rows, cell_length)?;
        grid.block_route(&route);
        Ok(Self {
            route: Arc::new(route),
            grid,
        })
    }

    /// Parses a route file and an optional explicit path-cell file.
    ///
    /// Cells listed in `path_cells` are blocked in addition to the route
    /// footprint.
    pub fn load(
        route_source: &str,
        path_cells: Option<&str>,
        columns: u32,
        rows: u32,
        cell_length: f32,
    ) -> Result<Self, LayoutError> {
        let route = Route::parse(route_source)?;
        let mut layout = Self::from_route(route, columns, rows, cell_length)?;
        if let Some(source) = path_cells {
            for cell in parse_cells(source)? {
                if !layout.grid.block(cell) {
                    return Err(LayoutError::CellOutOfBounds { cell });
                }
            }
        }
        Ok(layout)
    }

    /// Shared handle to the route.
    #[must_use]
    pub fn route(&self) -> &Arc<Route> {
        &self.route
    }

    /// Placement grid.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }
}

/// Parses one integer `(column, row)` pair per line. Blank lines are ignored.
pub fn parse_cells(source: &str) -> Result<Vec<CellCoord>, LayoutError> {
    let mut cells = Vec::new();
    for (index, line) in source.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let malformed = || LayoutError::MalformedLine {
            line: index + 1,
            content: line.to_owned(),
        };
        let (column, row) = split_pair(line).ok_or_else(malformed)?;
        let column: u32 = column.parse().map_err(|_| malformed())?;
        let row: u32 = row.parse().map_err(|_| malformed())?;
        cells.push(CellCoord::new(column, row));
    }
    Ok(cells)
}

/// Splits `(a, b)` (parentheses optional) into its two trimmed components.
pub(crate) fn split_pair(line: &str) -> Option<(&str, &str)> {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('(').unwrap_or(trimmed);
    let inner = inner.strip_suffix(')').unwrap_or(inner);
    let (first, second) = inner.split_once(',')?;
    if second.contains(',') {
        return None;
    }
    Some((first.trim(), second.trim()))
}
