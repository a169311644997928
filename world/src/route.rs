//! Immutable waypoint route shared by every unit.

use glam::Vec2;

use crate::layout::{split_pair, LayoutError};

/// Ordered, immutable sequence of waypoints units travel along.
///
/// A route always holds at least two waypoints: the entrance and the exit.
/// Units reference it through an `Arc` handed out by the world, never through
/// global state.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    waypoints: Vec<Vec2>,
}

impl Route {
    /// Creates a route from the provided waypoints.
    pub fn new(waypoints: Vec<Vec2>) -> Result<Self, LayoutError> {
        if waypoints.len() < 2 {
            return Err(LayoutError::RouteTooShort {
                waypoints: waypoints.len(),
            });
        }
        Ok(Self { waypoints })
    }

    /// Parses one `(x, y)` pair per line. Blank lines are ignored.
    pub fn parse(source: &str) -> Result<Self, LayoutError> {
        let mut waypoints = Vec::new();
        for (index, line) in source.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            let number = index + 1;
            let malformed = || LayoutError::MalformedLine {
                line: number,
                content: line.to_owned(),
            };
            let (x, y) = split_pair(line).ok_or_else(malformed)?;
            let x: f32 = x.parse().map_err(|_| malformed())?;
            let y: f32 = y.parse().map_err(|_| malformed())?;
            if !x.is_finite() || !y.is_finite() {
                return Err(LayoutError::NonFiniteCoordinate { line: number });
            }
            waypoints.push(Vec2::new(x, y));
        }
        Self::new(waypoints)
    }

    /// Number of waypoints in the route.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Always false; a route holds at least two waypoints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Index of the exit waypoint. Reaching it is a breach.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.waypoints.len() - 1
    }

    /// Waypoint at the provided index.
    #[must_use]
    pub fn point(&self, index: usize) -> Option<Vec2> {
        self.waypoints.get(index).copied()
    }

    /// Consecutive waypoint pairs.
    pub fn segments(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.waypoints.windows(2).map(|pair| (pair[0], pair[1]))
    }
}
