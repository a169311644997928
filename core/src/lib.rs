#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Route Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. The controller submits [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! views, and respond exclusively with new command batches.

use std::{fmt, str::FromStr, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Route Defence.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Accrues one movement tick for every active unit.
    MovementTick,
    /// Requests that a unit step to its next waypoint.
    AdvanceUnit {
        /// Identifier of the unit attempting to move.
        unit: UnitId,
    },
    /// Requests that the world instantiate every unit of a wave.
    SpawnWave {
        /// Wave the units belong to.
        wave: WaveIndex,
        /// Number of units to create.
        count: u32,
    },
    /// Requests placement of a tower on the provided cell.
    PlaceTower {
        /// Archetype of tower to construct.
        kind: TowerKind,
        /// Cell the tower occupies.
        cell: CellCoord,
    },
    /// Requests that a tower fire a single shot at a unit.
    FireTower {
        /// Tower that fires.
        tower: TowerId,
        /// Unit selected as the target.
        target: UnitId,
        /// Simulated time at which the shot happens.
        now: SimTime,
    },
    /// Rebuilds towers and economy from a persisted record.
    Rehydrate {
        /// Towers to reconstruct, in their original placement order.
        towers: Vec<SavedTower>,
        /// Economy counters to restore.
        economy: EconomySnapshot,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that every active unit accrued one movement tick.
    MovementTicked,
    /// Confirms that a unit was created and staged at the path entrance.
    UnitSpawned {
        /// Identifier assigned to the new unit.
        unit: UnitId,
        /// Wave the unit belongs to.
        wave: WaveIndex,
        /// Starting health of the unit.
        health: Health,
    },
    /// Confirms that a unit stepped onto a waypoint.
    UnitAdvanced {
        /// Identifier of the unit that advanced.
        unit: UnitId,
        /// Waypoint index the unit occupies after the step.
        waypoint: usize,
    },
    /// Reports that a unit reached the final waypoint alive.
    UnitBreached {
        /// Identifier of the unit that breached.
        unit: UnitId,
        /// Health deducted from the player.
        damage: u32,
    },
    /// Confirms that a tower was placed into the world.
    TowerPlaced {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Archetype of the placed tower.
        kind: TowerKind,
        /// Cell occupied by the tower.
        cell: CellCoord,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Archetype requested for placement.
        kind: TowerKind,
        /// Cell provided in the placement request.
        cell: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower fired at a unit.
    TowerFired {
        /// Tower that fired.
        tower: TowerId,
        /// Unit that was hit.
        target: UnitId,
        /// Damage applied by the shot.
        damage: u32,
    },
    /// Reports that a unit was destroyed and credited to the player.
    UnitKilled {
        /// Identifier of the destroyed unit.
        unit: UnitId,
        /// Tower that landed the final shot.
        tower: TowerId,
        /// Money credited for the kill.
        reward: u32,
        /// Score credited for the kill.
        score: u32,
    },
    /// Reports that the player's health dropped to zero or below.
    GameOver {
        /// Final score at the moment the game ended.
        score: u64,
    },
    /// Confirms that towers and economy were rebuilt from a record.
    Rehydrated {
        /// Number of towers reconstructed.
        towers: usize,
    },
}

/// Simulated time measured in whole milliseconds since the simulation began.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SimTime(u64);

impl SimTime {
    /// The instant the simulation started.
    pub const ZERO: Self = Self(0);

    /// Creates a timestamp from elapsed milliseconds.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Milliseconds elapsed since the simulation began.
    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Returns the timestamp advanced by the provided duration.
    #[must_use]
    pub fn saturating_add(self, duration: Duration) -> Self {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        Self(self.0.saturating_add(millis))
    }

    /// Duration elapsed since an earlier timestamp, zero if `earlier` is later.
    #[must_use]
    pub fn duration_since(self, earlier: SimTime) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

/// Unique identifier assigned to a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
///
/// Identifiers are allocated in increasing order, so comparing two ids
/// compares their placement order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// One-based index of a wave. Zero means no wave has started yet.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct WaveIndex(u32);

impl WaveIndex {
    /// Index reported before the first wave starts.
    pub const NONE: Self = Self(0);

    /// Creates a wave index from its one-based value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the one-based wave number.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Index of the wave that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Index of the wave that precedes this one, saturating at [`WaveIndex::NONE`].
    #[must_use]
    pub const fn previous(self) -> Self {
        Self(self.0.saturating_sub(1))
    }
}

/// Hit points carried by a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Health(u32);

impl Health {
    /// Creates a new health value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the remaining hit points.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether no hit points remain.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Subtracts damage, clamping at zero.
    #[must_use]
    pub const fn saturating_sub(self, damage: u32) -> Self {
        Self(self.0.saturating_sub(damage))
    }
}

/// Result of stepping a unit along the route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The unit now occupies the contained waypoint index.
    Advanced(usize),
    /// The unit reached the final waypoint and left the field.
    Breached,
}

/// Result of applying damage to a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageOutcome {
    /// The unit survived with the contained health.
    Alive(Health),
    /// The unit's health reached zero.
    Killed,
}

/// Raised when a terminated unit receives another mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("unit {unit:?} already left the field")]
pub struct UnitTerminated {
    /// Identifier of the terminated unit.
    pub unit: UnitId,
}

/// Targeting reach of a tower archetype.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TowerRange {
    /// Every unit on the field is in reach.
    Unbounded,
    /// Units strictly closer than the radius (in world units) are in reach.
    Limited(f32),
}

impl TowerRange {
    /// Reports whether a unit at `distance` can be targeted.
    #[must_use]
    pub fn reaches(self, distance: f32) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Limited(radius) => distance < radius,
        }
    }
}

/// Fixed combat and price statistics of a tower archetype.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerStats {
    /// Targeting reach.
    pub range: TowerRange,
    /// Minimum simulated time between two shots.
    pub fire_cooldown: Duration,
    /// Damage applied by each shot.
    pub damage: u32,
    /// Money deducted when the tower is placed.
    pub cost: u32,
}

/// Types of towers that can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerKind {
    /// Balanced tower with medium range and fire rate.
    Basic,
    /// Slow tower with unbounded range and heavy shots.
    Sniper,
    /// Rapid tower with short range and light shots.
    MachineGun,
}

impl TowerKind {
    /// Every archetype in catalog order.
    pub const ALL: [TowerKind; 3] = [Self::Basic, Self::Sniper, Self::MachineGun];

    /// Returns the fixed statistics of the archetype.
    #[must_use]
    pub const fn stats(self) -> TowerStats {
        match self {
            Self::Basic => TowerStats {
                range: TowerRange::Limited(200.0),
                fire_cooldown: Duration::from_millis(1_000),
                damage: 10,
                cost: 170,
            },
            Self::Sniper => TowerStats {
                range: TowerRange::Unbounded,
                fire_cooldown: Duration::from_millis(2_000),
                damage: 30,
                cost: 200,
            },
            Self::MachineGun => TowerStats {
                range: TowerRange::Limited(100.0),
                fire_cooldown: Duration::from_millis(200),
                damage: 5,
                cost: 250,
            },
        }
    }

    /// Stable lowercase name used by adapters and save records.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Sniper => "sniper",
            Self::MachineGun => "machine_gun",
        }
    }
}

impl fmt::Display for TowerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raised when a tower archetype name is not part of the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown tower kind `{0}`")]
pub struct UnknownTowerKind(pub String);

impl FromStr for TowerKind {
    type Err = UnknownTowerKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == value)
            .ok_or_else(|| UnknownTowerKind(value.to_owned()))
    }
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The requested cell lies outside the grid.
    #[error("cell lies outside the grid")]
    OutOfBounds,
    /// The requested cell is part of the unit path.
    #[error("cannot place a tower over the path")]
    OnPath,
    /// Another tower already owns the requested cell.
    #[error("cannot place a tower onto another tower")]
    Occupied,
    /// The player cannot afford the archetype.
    #[error("tower costs {cost} but only {available} is available")]
    InsufficientFunds {
        /// Price of the requested archetype.
        cost: u32,
        /// Money held by the player.
        available: u32,
    },
    /// The game ended, so the economy no longer accepts mutations.
    #[error("the game is over")]
    GameOver,
}

/// Tunable parameters applied to every unit a wave creates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitProfile {
    /// Health of a first-wave unit.
    pub base_health: u32,
    /// Extra health granted per wave after the first.
    pub health_per_wave: u32,
    /// Movement ticks a unit needs to accrue per waypoint step.
    pub ticks_per_advance: u32,
    /// Movement ticks between the release of consecutive units of one wave.
    pub entry_stagger: u32,
    /// Money credited when the unit is killed.
    pub reward: u32,
    /// Score credited when the unit is killed.
    pub score: u32,
    /// Player health lost when the unit breaches.
    pub breach_damage: u32,
}

impl UnitProfile {
    /// Maximum health of units spawned for the provided wave.
    #[must_use]
    pub fn health_for(&self, wave: WaveIndex) -> Health {
        let tier = wave.get().saturating_sub(1);
        Health::new(
            self.base_health
                .saturating_add(self.health_per_wave.saturating_mul(tier)),
        )
    }
}

impl Default for UnitProfile {
    fn default() -> Self {
        Self {
            base_health: 100,
            health_per_wave: 0,
            ticks_per_advance: 1,
            entry_stagger: 20,
            reward: 20,
            score: 100,
            breach_damage: 20,
        }
    }
}

/// Player money, health and score captured at a single instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EconomySnapshot {
    /// Money available for placements.
    pub money: u32,
    /// Remaining player health; zero or below means the game is over.
    pub health: i32,
    /// Accumulated score.
    pub score: u64,
}

impl Default for EconomySnapshot {
    fn default() -> Self {
        Self {
            money: 650,
            health: 100,
            score: 0,
        }
    }
}

/// Immutable representation of a single unit's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitSnapshot {
    /// Unique identifier assigned to the unit.
    pub id: UnitId,
    /// Waypoint index occupied by the unit; `None` while staged off the path.
    pub waypoint: Option<usize>,
    /// World position of the occupied waypoint; `None` while staged.
    pub position: Option<Vec2>,
    /// Remaining health.
    pub health: Health,
    /// Health the unit spawned with.
    pub max_health: Health,
    /// Indicates whether the unit accrued enough ticks to advance.
    pub ready_for_step: bool,
}

impl UnitSnapshot {
    /// Remaining health as a fraction of the spawn health in `0.0..=1.0`.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        if self.max_health.is_zero() {
            return 0.0;
        }
        self.health.get() as f32 / self.max_health.get() as f32
    }
}

/// Read-only snapshot describing all active units.
#[derive(Clone, Debug, Default)]
pub struct UnitView {
    snapshots: Vec<UnitSnapshot>,
}

impl UnitView {
    /// Creates a new unit view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<UnitSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured unit snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots.iter()
    }

    /// Number of units captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<UnitSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Archetype of the tower.
    pub kind: TowerKind,
    /// Cell occupied by the tower.
    pub cell: CellCoord,
    /// World position distances are measured from.
    pub anchor: Vec2,
    /// Simulated time of the last shot, if the tower has fired.
    pub last_fired_at: Option<SimTime>,
}

impl TowerSnapshot {
    /// Time remaining until the tower may fire again.
    #[must_use]
    pub fn ready_in(&self, now: SimTime) -> Duration {
        match self.last_fired_at {
            None => Duration::ZERO,
            Some(fired) => self
                .kind
                .stats()
                .fire_cooldown
                .saturating_sub(now.duration_since(fired)),
        }
    }

    /// Reports whether the cooldown elapsed at `now`.
    #[must_use]
    pub fn can_fire(&self, now: SimTime) -> bool {
        self.ready_in(now).is_zero()
    }
}

/// Read-only snapshot describing all placed towers.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured towers in placement order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Target assignment computed by the targeting system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Tower that selected the target.
    pub tower: TowerId,
    /// Unit chosen as the target.
    pub unit: UnitId,
    /// Euclidean distance between the tower anchor and the unit.
    pub distance: f32,
}

/// States of the wave scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WavePhase {
    /// Waiting for an external start or resume trigger.
    Idle,
    /// Instantiating the units of the current wave.
    Spawning,
    /// Waiting for the active units of the current wave to leave the field.
    Monitoring,
    /// The wave was cleared; the inter-wave delay is running.
    WaveComplete,
    /// The player ran out of health. Terminal.
    GameOver,
}

/// Tower entry inside a [`SaveRecord`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SavedTower {
    /// Archetype of the tower.
    pub kind: TowerKind,
    /// Cell the tower occupied.
    pub cell: CellCoord,
}

/// Persisted progress that can rebuild a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRecord {
    /// Towers in placement order.
    pub towers: Vec<SavedTower>,
    /// Economy counters at save time.
    pub economy: EconomySnapshot,
    /// Wave in progress (or last completed) when the record was taken.
    pub wave: WaveIndex,
}

/// Final results handed to the leaderboard once the game ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameOverReport {
    /// Final score.
    pub score: u64,
    /// Wave during which the player lost.
    pub wave: WaveIndex,
}

/// Immutable state handed to the presentation layer once per tick.
#[derive(Clone, Debug)]
pub struct Snapshot {
    /// Simulated time of the snapshot.
    pub now: SimTime,
    /// Active units in identifier order.
    pub units: Vec<UnitSnapshot>,
    /// Towers in placement order.
    pub towers: Vec<TowerSnapshot>,
    /// Current target of every tower with a unit in reach.
    pub targets: Vec<TowerTarget>,
    /// Player economy.
    pub economy: EconomySnapshot,
    /// Current wave number.
    pub wave: WaveIndex,
    /// Current wave scheduler state.
    pub phase: WavePhase,
    /// Indicates whether the game has ended.
    pub game_over: bool,
}
