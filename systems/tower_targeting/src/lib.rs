#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.

use glam::Vec2;
use route_defence_core::{TowerSnapshot, TowerTarget, TowerView, UnitId, UnitSnapshot, UnitView};

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    unit_workspace: Vec<UnitCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the nearest in-range unit for every tower.
    ///
    /// The output buffer is cleared before populating it with the latest
    /// assignments. Towers are visited in placement order.
    pub fn handle(&mut self, towers: &TowerView, units: &UnitView, out: &mut Vec<TowerTarget>) {
        out.clear();

        if towers.iter().next().is_none() || units.is_empty() {
            return;
        }

        self.unit_workspace.clear();
        self.unit_workspace.reserve(units.len());
        self.unit_workspace
            .extend(units.iter().filter_map(UnitCandidate::from_snapshot));
        if self.unit_workspace.is_empty() {
            return;
        }

        for tower in towers.iter() {
            if let Some(target) = select(tower, self.unit_workspace.iter().copied()) {
                out.push(target);
            }
        }
    }
}

/// Selects the unit closest to the tower anchor that lies strictly within range.
///
/// Units still staged off the path are never eligible. Equal distances prefer
/// the smaller unit identifier.
pub fn nearest_in_range<'a, I>(tower: &TowerSnapshot, units: I) -> Option<TowerTarget>
where
    I: IntoIterator<Item = &'a UnitSnapshot>,
{
    select(
        tower,
        units.into_iter().filter_map(UnitCandidate::from_snapshot),
    )
}

fn select<I>(tower: &TowerSnapshot, candidates: I) -> Option<TowerTarget>
where
    I: Iterator<Item = UnitCandidate>,
{
    let range = tower.kind.stats().range;
    let mut best: Option<BestCandidate> = None;

    for candidate in candidates {
        let distance = tower.anchor.distance(candidate.position);
        if !range.reaches(distance) {
            continue;
        }

        let current = BestCandidate {
            distance,
            unit: candidate.id,
        };
        match &mut best {
            Some(existing) => {
                if current.precedes(existing) {
                    *existing = current;
                }
            }
            None => best = Some(current),
        }
    }

    best.map(|best| TowerTarget {
        tower: tower.id,
        unit: best.unit,
        distance: best.distance,
    })
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct UnitCandidate {
    id: UnitId,
    position: Vec2,
}

impl UnitCandidate {
    fn from_snapshot(snapshot: &UnitSnapshot) -> Option<Self> {
        if snapshot.health.is_zero() {
            return None;
        }
        snapshot.position.map(|position| Self {
            id: snapshot.id,
            position,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    distance: f32,
    unit: UnitId,
}

impl BestCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.distance != other.distance {
            return self.distance < other.distance;
        }

        self.unit < other.unit
    }
}
