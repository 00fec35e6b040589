//! Simulation configuration.
//!
//! All timing and balance knobs are loaded from a TOML file; every section
//! and field falls back to its default, so a partial file (or none at all)
//! is fine. Tests compress the timing section to run in milliseconds.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Complete simulation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Base random seed; per-agent generators are derived from it.
    pub seed: u64,
    /// Tick cadence and travel timing
    pub timing: TimingConfig,
    /// Hunger/thirst thresholds and restoration amounts
    pub survival: SurvivalConfig,
    /// Mailbox capacities
    pub mailbox: MailboxConfig,
    /// Movement probability and break-in penalty
    pub movement: MovementConfig,
}

impl SimConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// Tick cadence and travel timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Milliseconds between behavior ticks.
    pub tick_interval_ms: u64,
    /// Upper bound on the random startup delay, so agents don't lock-step.
    pub startup_jitter_ms: u64,
    /// Milliseconds of real time per unit of edge weight.
    pub travel_unit_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 500,
            startup_jitter_ms: 2000,
            travel_unit_ms: 1000,
        }
    }
}

/// Hunger/thirst pacing. Counters rise by one per tick; crossing a lethal
/// threshold queues the agent's own kill event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SurvivalConfig {
    /// Hunger value at which a person starves
    pub starvation_threshold: u32,
    /// Thirst value at which a person dies of dehydration
    pub dehydration_threshold: u32,
    /// Hunger value at which a zombie starves
    pub zombie_starvation_threshold: u32,
    /// Hunger value at which a person starts looking for food
    pub hungry_at: u32,
    /// Thirst value at which a person starts looking for water
    pub thirsty_at: u32,
    /// Hunger removed by eating an energy bar
    pub energy_bar_restore: u32,
    /// Thirst removed by drinking (source or bottle)
    pub water_restore: u32,
    /// Maximum items a person can carry
    pub inventory_capacity: usize,
}

impl Default for SurvivalConfig {
    fn default() -> Self {
        Self {
            starvation_threshold: 240,
            dehydration_threshold: 180,
            zombie_starvation_threshold: 400,
            hungry_at: 120,
            thirsty_at: 90,
            energy_bar_restore: 120,
            water_restore: 90,
            inventory_capacity: 8,
        }
    }
}

/// Per-agent mailbox capacities. Producers never block; overflow is dropped
/// with a warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailboxConfig {
    pub damage_capacity: usize,
    pub kill_capacity: usize,
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            damage_capacity: 64,
            kill_capacity: 16,
        }
    }
}

/// Movement behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Per-tick probability that an idle person wanders to a neighbor
    pub move_chance: f64,
    /// Multiplier on destination fortification added to a zombie's break-in
    /// delay when the destination is occupied
    pub breakin_factor: u32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            move_chance: 0.01,
            breakin_factor: 2,
        }
    }
}
