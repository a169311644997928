#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Simulation controller that owns the world, the systems and the clock.
//!
//! The presentation layer drives the controller either by single-stepping the
//! individual ticks or by advancing the clock, which runs every scheduled task
//! that falls due in time order. Every mutation flows through
//! `route_defence_world::apply`; the controller only routes commands and
//! events between the world and the pure systems.

pub mod config;
pub mod scheduler;

use std::time::Duration;

use route_defence_core::{
    CellCoord, Command, Event, GameOverReport, PlacementError, SaveRecord, SimTime, Snapshot,
    TowerId, TowerKind, WaveIndex, WavePhase,
};
use route_defence_system_movement::Movement;
use route_defence_system_tower_combat::TowerCombat;
use route_defence_system_tower_targeting::TowerTargeting;
use route_defence_system_waves::{Config as WaveConfig, WaveScheduler, WaveSignal};
use route_defence_world::{self as world, query, Layout, World, WorldConfig};
use tracing::{debug, info};

pub use config::{CadenceConfig, ConfigError, EconomyConfig, SimulationConfig, WavesConfig};
pub use route_defence_system_waves::StartError;
pub use scheduler::{Scheduler, TaskId};

/// Owns the authoritative world together with every system and the task scheduler.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    movement: Movement,
    targeting: TowerTargeting,
    combat: TowerCombat,
    waves: WaveScheduler,
    scheduler: Scheduler,
    cadence: CadenceConfig,
    paused: bool,
    events: Vec<Event>,
    game_over: Option<GameOverReport>,
}

impl Simulation {
    /// Creates an idle simulation over the provided layout.
    #[must_use]
    pub fn new(layout: Layout, config: SimulationConfig) -> Self {
        let world = World::new(
            layout,
            WorldConfig {
                economy: config.economy.start(),
                units: config.units,
            },
        );
        info!("{}", query::welcome_banner(&world));
        Self {
            world,
            movement: Movement::new(),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            waves: WaveScheduler::new(WaveConfig::new(config.waves.progression)),
            scheduler: Scheduler::new(),
            cadence: config.cadence,
            paused: false,
            events: Vec::new(),
            game_over: None,
        }
    }

    /// Read-only access to the world for queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Current simulated time.
    #[must_use]
    pub fn now(&self) -> SimTime {
        self.scheduler.now()
    }

    /// Wave most recently released.
    #[must_use]
    pub fn wave(&self) -> WaveIndex {
        self.waves.wave()
    }

    /// Current wave scheduler state.
    #[must_use]
    pub fn phase(&self) -> WavePhase {
        self.waves.phase()
    }

    /// Reports whether the named task is currently scheduled.
    #[must_use]
    pub fn is_scheduled(&self, task: TaskId) -> bool {
        self.scheduler.is_scheduled(task)
    }

    /// Places a tower, deducting its cost on success.
    pub fn place_tower(
        &mut self,
        cell: CellCoord,
        kind: TowerKind,
    ) -> Result<TowerId, PlacementError> {
        let start = self.events.len();
        self.execute(vec![Command::PlaceTower { kind, cell }]);
        let outcome = self.events[start..].iter().find_map(|event| match event {
            Event::TowerPlaced { tower, .. } => Some(Ok(*tower)),
            Event::TowerPlacementRejected { reason, .. } => Some(Err(*reason)),
            _ => None,
        });
        match outcome {
            Some(outcome) => outcome,
            None => unreachable!("the world answers every placement with an outcome event"),
        }
    }

    /// Releases the next wave and arms the periodic tasks.
    pub fn start_wave(&mut self) -> Result<WaveIndex, StartError> {
        if query::is_game_over(&self.world) {
            return Err(StartError::GameOver);
        }

        let mut commands = Vec::new();
        let wave = self.waves.start(&mut commands)?;
        self.execute(commands);

        self.scheduler.start(TaskId::Movement, self.cadence.movement());
        self.scheduler.start(TaskId::Combat, self.cadence.combat());
        self.scheduler
            .start(TaskId::WaveMonitor, self.cadence.wave_monitor());
        Ok(wave)
    }

    /// Accrues one movement tick and advances every unit that completed a step.
    pub fn tick_movement(&mut self) {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::MovementTick, &mut events);

        let mut commands = Vec::new();
        self.movement
            .handle(&events, &query::unit_view(&self.world), &mut commands);
        self.events.append(&mut events);
        self.execute(commands);

        if query::is_game_over(&self.world) {
            self.halt_combat();
        }
    }

    /// Resolves one combat tick at the current simulated time.
    pub fn tick_combat(&mut self) {
        let mut commands = Vec::new();
        self.combat.handle(
            self.scheduler.now(),
            &query::tower_view(&self.world),
            &query::unit_view(&self.world),
            &mut commands,
        );
        self.execute(commands);
    }

    /// Polls the wave scheduler.
    pub fn tick_wave_monitor(&mut self) {
        let signal = self.waves.poll(
            query::active_unit_count(&self.world),
            query::is_game_over(&self.world),
        );

        match signal {
            Some(WaveSignal::WaveCleared { wave }) => {
                debug!(wave = wave.get(), "arming inter-wave delay");
                self.scheduler
                    .arm_once(TaskId::InterWaveDelay, self.cadence.inter_wave_delay());
            }
            Some(WaveSignal::GameOver { wave }) => {
                self.halt_combat();
                let _ = self.scheduler.stop(TaskId::WaveMonitor);
                let _ = self.scheduler.stop(TaskId::InterWaveDelay);
                let score = query::economy(&self.world).score;
                info!(wave = wave.get(), score, "game over");
                self.game_over = Some(GameOverReport { score, wave });
            }
            None => {}
        }
    }

    /// Runs every task due within `dt` of simulated time. Ignored while paused.
    pub fn advance(&mut self, dt: Duration) {
        if self.paused {
            return;
        }

        let until = self.scheduler.now().saturating_add(dt);
        while let Some(task) = self.scheduler.pop_due(until) {
            match task {
                TaskId::Movement => self.tick_movement(),
                TaskId::Combat => self.tick_combat(),
                TaskId::WaveMonitor => self.tick_wave_monitor(),
                TaskId::InterWaveDelay => self.release_after_delay(),
            }
        }
        self.scheduler.settle(until);
    }

    /// Freezes the clock: subsequent calls to [`Simulation::advance`] do nothing.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Unfreezes the clock.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Reports whether the clock is frozen.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Captures the state handed to the presentation layer.
    pub fn snapshot(&mut self) -> Snapshot {
        let units = query::unit_view(&self.world);
        let towers = query::tower_view(&self.world);
        let mut targets = Vec::new();
        self.targeting.handle(&towers, &units, &mut targets);

        Snapshot {
            now: self.scheduler.now(),
            units: units.into_vec(),
            towers: towers.into_vec(),
            targets,
            economy: query::economy(&self.world),
            wave: self.waves.wave(),
            phase: self.waves.phase(),
            game_over: query::is_game_over(&self.world),
        }
    }

    /// Captures the persisted progress of the session.
    #[must_use]
    pub fn save_record(&self) -> SaveRecord {
        SaveRecord {
            towers: query::saved_towers(&self.world),
            economy: query::economy(&self.world),
            wave: self.waves.wave(),
        }
    }

    /// Rebuilds towers and economy from a record without charging tower costs.
    ///
    /// Every scheduled task is cancelled and the next [`Simulation::start_wave`]
    /// replays the saved wave. A record whose player health is already
    /// depleted restores a finished game and reports it through
    /// [`Simulation::take_game_over`].
    pub fn rehydrate(&mut self, record: SaveRecord) {
        self.scheduler.cancel_all();
        self.game_over = None;
        self.waves.rehydrate(record.wave);
        self.execute(vec![Command::Rehydrate {
            towers: record.towers,
            economy: record.economy,
        }]);

        if query::is_game_over(&self.world) {
            let _ = self.waves.poll(0, true);
            let score = query::economy(&self.world).score;
            info!(wave = record.wave.get(), score, "restored a finished game");
            self.game_over = Some(GameOverReport {
                score,
                wave: record.wave,
            });
        }
    }

    /// World events produced since the previous drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Final results, returned once after the game ends.
    pub fn take_game_over(&mut self) -> Option<GameOverReport> {
        self.game_over.take()
    }

    fn release_after_delay(&mut self) {
        let mut commands = Vec::new();
        if self.waves.resume_after_delay(&mut commands).is_some() {
            self.execute(commands);
        }
    }

    fn halt_combat(&mut self) {
        let _ = self.scheduler.stop(TaskId::Movement);
        let _ = self.scheduler.stop(TaskId::Combat);
    }

    fn execute(&mut self, commands: Vec<Command>) {
        for command in commands {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }
}
