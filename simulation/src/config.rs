//! Tunable simulation parameters loaded from TOML.

use std::time::Duration;

use route_defence_core::{EconomySnapshot, UnitProfile};
use route_defence_system_waves::DEFAULT_PROGRESSION;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a [`SimulationConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid TOML or does not match the schema.
    #[error("failed to parse simulation config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A periodic task was configured with a zero period.
    #[error("cadence `{task}` must be greater than zero")]
    ZeroPeriod {
        /// Name of the offending cadence entry.
        task: &'static str,
    },
    /// Units must accrue at least one tick per waypoint.
    #[error("units.ticks_per_advance must be at least one")]
    ZeroTicksPerAdvance,
    /// The wave progression lists no waves.
    #[error("waves.progression must list at least one wave")]
    EmptyProgression,
    /// A wave releases fewer units than the wave before it.
    #[error("wave {wave} releases fewer units than the wave before it")]
    DecreasingProgression {
        /// One-based number of the offending wave.
        wave: usize,
    },
}

/// Complete set of simulation parameters. Every field has a default.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Periods of the scheduled tasks.
    pub cadence: CadenceConfig,
    /// Starting economy.
    pub economy: EconomyConfig,
    /// Parameters applied to every unit.
    pub units: UnitProfile,
    /// Wave sizes.
    pub waves: WavesConfig,
}

impl SimulationConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants the scheduler and wave table rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (task, period) in [
            ("movement_ms", self.cadence.movement_ms),
            ("combat_ms", self.cadence.combat_ms),
            ("wave_monitor_ms", self.cadence.wave_monitor_ms),
        ] {
            if period == 0 {
                return Err(ConfigError::ZeroPeriod { task });
            }
        }
        if self.units.ticks_per_advance == 0 {
            return Err(ConfigError::ZeroTicksPerAdvance);
        }
        if self.waves.progression.is_empty() {
            return Err(ConfigError::EmptyProgression);
        }
        if let Some(index) = self
            .waves
            .progression
            .windows(2)
            .position(|pair| pair[1] < pair[0])
        {
            return Err(ConfigError::DecreasingProgression { wave: index + 2 });
        }
        Ok(())
    }
}

/// Task periods in milliseconds of simulated time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CadenceConfig {
    /// Period of the movement tick.
    pub movement_ms: u64,
    /// Period of the combat tick.
    pub combat_ms: u64,
    /// Period of the wave monitor poll.
    pub wave_monitor_ms: u64,
    /// Delay between a cleared wave and the next spawn.
    pub inter_wave_delay_ms: u64,
}

impl CadenceConfig {
    /// Movement period as a duration.
    #[must_use]
    pub fn movement(&self) -> Duration {
        Duration::from_millis(self.movement_ms)
    }

    /// Combat period as a duration.
    #[must_use]
    pub fn combat(&self) -> Duration {
        Duration::from_millis(self.combat_ms)
    }

    /// Wave monitor period as a duration.
    #[must_use]
    pub fn wave_monitor(&self) -> Duration {
        Duration::from_millis(self.wave_monitor_ms)
    }

    /// Inter-wave delay as a duration.
    #[must_use]
    pub fn inter_wave_delay(&self) -> Duration {
        Duration::from_millis(self.inter_wave_delay_ms)
    }
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            movement_ms: 20,
            combat_ms: 100,
            wave_monitor_ms: 100,
            inter_wave_delay_ms: 1_000,
        }
    }
}

/// Money and health the player starts with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Starting money.
    pub money: u32,
    /// Starting health.
    pub health: i32,
}

impl EconomyConfig {
    /// Economy at the start of a session. Score always starts at zero.
    #[must_use]
    pub fn start(&self) -> EconomySnapshot {
        EconomySnapshot {
            money: self.money,
            health: self.health,
            score: 0,
        }
    }
}

impl Default for EconomyConfig {
    fn default() -> Self {
        let start = EconomySnapshot::default();
        Self {
            money: start.money,
            health: start.health,
        }
    }
}

/// Unit counts per wave.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WavesConfig {
    /// Units released by each wave, first wave first. Later waves repeat the last entry.
    pub progression: Vec<u32>,
}

impl Default for WavesConfig {
    fn default() -> Self {
        Self {
            progression: DEFAULT_PROGRESSION.to_vec(),
        }
    }
}
