#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave scheduler that decides when each wave of units is released.

use route_defence_core::{Command, WaveIndex, WavePhase};
use thiserror::Error;
use tracing::info;

/// Unit counts of the default wave progression.
pub const DEFAULT_PROGRESSION: [u32; 5] = [5, 8, 12, 16, 20];

/// Configuration parameters required to construct the wave scheduler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    progression: Vec<u32>,
}

impl Config {
    /// Creates a configuration from per-wave unit counts, first wave first.
    #[must_use]
    pub fn new(progression: Vec<u32>) -> Self {
        Self { progression }
    }

    /// Number of units released by the provided wave.
    ///
    /// Waves beyond the table repeat its last count. An empty table releases
    /// empty waves.
    #[must_use]
    pub fn count_for(&self, wave: WaveIndex) -> u32 {
        let index = usize::try_from(wave.get().saturating_sub(1)).unwrap_or(usize::MAX);
        self.progression
            .get(index)
            .or_else(|| self.progression.last())
            .copied()
            .unwrap_or(0)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESSION.to_vec())
    }
}

/// Reasons a wave cannot be started.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum StartError {
    /// A wave is already spawning, being monitored or waiting out its delay.
    #[error("a wave is already running")]
    AlreadyRunning,
    /// The player lost; no further waves are released.
    #[error("the game is over")]
    GameOver,
}

/// Transition reported by [`WaveScheduler::poll`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaveSignal {
    /// Every unit of the wave left the field; the inter-wave delay should start.
    WaveCleared {
        /// Wave that was cleared.
        wave: WaveIndex,
    },
    /// Player health is depleted. Reported once.
    GameOver {
        /// Wave during which the game ended.
        wave: WaveIndex,
    },
}

/// State machine driving `Idle → Spawning → Monitoring → WaveComplete → Spawning …`.
#[derive(Debug)]
pub struct WaveScheduler {
    config: Config,
    phase: WavePhase,
    wave: WaveIndex,
}

impl WaveScheduler {
    /// Creates an idle scheduler before the first wave.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            phase: WavePhase::Idle,
            wave: WaveIndex::NONE,
        }
    }

    /// Current state.
    #[must_use]
    pub fn phase(&self) -> WavePhase {
        self.phase
    }

    /// Wave most recently released, or [`WaveIndex::NONE`] before the first.
    #[must_use]
    pub fn wave(&self) -> WaveIndex {
        self.wave
    }

    /// Releases the next wave. Only valid while idle.
    pub fn start(&mut self, out: &mut Vec<Command>) -> Result<WaveIndex, StartError> {
        match self.phase {
            WavePhase::Idle => Ok(self.release_next(out)),
            WavePhase::GameOver => Err(StartError::GameOver),
            WavePhase::Spawning | WavePhase::Monitoring | WavePhase::WaveComplete => {
                Err(StartError::AlreadyRunning)
            }
        }
    }

    /// Observes the field and reports a transition, if any.
    ///
    /// Game over is checked first on every poll, whatever the current phase.
    /// A wave is cleared only while monitoring and only once the active set is
    /// empty.
    pub fn poll(&mut self, active_units: usize, game_over: bool) -> Option<WaveSignal> {
        if self.phase == WavePhase::GameOver {
            return None;
        }

        if game_over {
            self.phase = WavePhase::GameOver;
            info!(wave = self.wave.get(), "wave scheduler stopped by game over");
            return Some(WaveSignal::GameOver { wave: self.wave });
        }

        if self.phase == WavePhase::Monitoring && active_units == 0 {
            self.phase = WavePhase::WaveComplete;
            info!(wave = self.wave.get(), "wave cleared");
            return Some(WaveSignal::WaveCleared { wave: self.wave });
        }

        None
    }

    /// Releases the next wave once the inter-wave delay elapsed.
    ///
    /// Returns `None` unless the previous wave was cleared.
    pub fn resume_after_delay(&mut self, out: &mut Vec<Command>) -> Option<WaveIndex> {
        if self.phase != WavePhase::WaveComplete {
            return None;
        }
        Some(self.release_next(out))
    }

    /// Prepares to replay the saved wave: the next `start` releases `saved`.
    pub fn rehydrate(&mut self, saved: WaveIndex) {
        self.wave = saved.previous();
        self.phase = WavePhase::Idle;
    }

    fn release_next(&mut self, out: &mut Vec<Command>) -> WaveIndex {
        self.wave = self.wave.next();
        self.phase = WavePhase::Spawning;
        let count = self.config.count_for(self.wave);
        info!(wave = self.wave.get(), count, "releasing wave");
        out.push(Command::SpawnWave {
            wave: self.wave,
            count,
        });
        self.phase = WavePhase::Monitoring;
        self.wave
    }
}
