//! Configuration for an arena and everything that lives in it.
//!
//! All tunables are grouped into sections that deserialize independently, so
//! a TOML file only needs to mention the values it overrides:
//!
//! ```toml
//! seed = 7
//!
//! [arena]
//! width = 1024.0
//!
//! [clock]
//! cycle_secs = 120.0
//! ```
//!
//! Durations are written in seconds and converted to logical ticks through
//! [`TimingConfig::ticks_for`], so behavior stays tied to the simulation clock
//! rather than wall time.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::Bounds;

/// Complete arena configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Seed for the arena's random number generator.
    pub seed: u64,
    /// Dimensions and placement settings.
    pub arena: ArenaSection,
    /// Logical tick rate.
    pub timing: TimingConfig,
    /// Per-kind agent speeds, radius and animation.
    pub agents: AgentConfig,
    /// Sensor cone used by sensor-avoider agents.
    pub sensor: SensorConfig,
    /// Harvester timings and resource drop settings.
    pub harvest: HarvestConfig,
    /// Day/night cycle.
    pub clock: ClockConfig,
    /// Starting counters and threshold notices.
    pub economy: EconomyConfig,
    /// Trader catalog prices.
    pub shop: ShopConfig,
    /// Night-time enemy spawning.
    pub night: NightConfig,
    /// Initial population for [`Arena::seed_default_scenario`](crate::arena::Arena::seed_default_scenario).
    pub scenario: ScenarioConfig,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            arena: ArenaSection::default(),
            timing: TimingConfig::default(),
            agents: AgentConfig::default(),
            sensor: SensorConfig::default(),
            harvest: HarvestConfig::default(),
            clock: ClockConfig::default(),
            economy: EconomyConfig::default(),
            shop: ShopConfig::default(),
            night: NightConfig::default(),
            scenario: ScenarioConfig::default(),
        }
    }
}

impl ArenaConfig {
    /// Loads and validates configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, and the errors of
    /// [`ArenaConfig::from_toml_str`] otherwise.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] on malformed input and
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration as pretty TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TomlSerialize`] if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            (self.arena.width, "arena.width must be positive"),
            (self.arena.height, "arena.height must be positive"),
            (self.timing.tick_rate_hz, "timing.tick_rate_hz must be positive"),
            (self.agents.radius, "agents.radius must be positive"),
            (self.clock.cycle_secs, "clock.cycle_secs must be positive"),
            (self.sensor.ray_step_deg, "sensor.ray_step_deg must be positive"),
            (self.harvest.drop_scale, "harvest.drop_scale must be positive"),
            (self.scenario.obstacle_radius, "scenario.obstacle_radius must be positive"),
        ];
        for (value, message) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(message));
            }
        }
        if self.clock.hours_per_day == 0 {
            return Err(ConfigError::Invalid("clock.hours_per_day must be at least 1"));
        }
        if self.clock.start_hour >= self.clock.hours_per_day {
            return Err(ConfigError::Invalid("clock.start_hour must be below hours_per_day"));
        }
        if self.arena.max_placement_attempts == 0 {
            return Err(ConfigError::Invalid("arena.max_placement_attempts must be at least 1"));
        }
        if self.agents.frame_count == 0 {
            return Err(ConfigError::Invalid("agents.frame_count must be at least 1"));
        }
        Ok(())
    }

    /// Arena bounds derived from the `arena` section.
    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        Bounds::new(self.arena.width, self.arena.height)
    }
}

/// Arena dimensions and random placement settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaSection {
    /// Arena width.
    pub width: f32,
    /// Arena height.
    pub height: f32,
    /// Distance from each wall kept clear when sampling random positions.
    pub placement_margin: f32,
    /// Candidates tried before falling back to the last one.
    pub max_placement_attempts: u32,
}

impl Default for ArenaSection {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            placement_margin: 30.0,
            max_placement_attempts: 100,
        }
    }
}

/// Logical clock rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Ticks per simulated second at speed multiplier 1.
    pub tick_rate_hz: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self { tick_rate_hz: 60.0 }
    }
}

impl TimingConfig {
    /// Converts a duration in seconds into a whole number of ticks.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn ticks_for(&self, secs: f32) -> u64 {
        (secs * self.tick_rate_hz).round().max(0.0) as u64
    }
}

/// Movement and animation settings shared by mobile agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Radius of every robot, the player and the trader.
    pub radius: f32,
    /// Wanderer speed.
    pub basic_speed: f32,
    /// Sensor-avoider speed.
    pub smart_speed: f32,
    /// Pursuer speed.
    pub predator_speed: f32,
    /// Harvester speed.
    pub harvester_speed: f32,
    /// Player speed.
    pub player_speed: f32,
    /// Enemy speed.
    pub enemy_speed: f32,
    /// Seconds each animation frame is shown.
    pub frame_secs: f32,
    /// Frames in each walk cycle.
    pub frame_count: u8,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            radius: 20.0,
            basic_speed: 2.0,
            smart_speed: 2.0,
            predator_speed: 2.5,
            harvester_speed: 2.0,
            player_speed: 2.5,
            enemy_speed: 2.5,
            frame_secs: 0.2,
            frame_count: 4,
        }
    }
}

/// Forward sensor cone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Detection range.
    pub range: f32,
    /// Full cone angle in degrees.
    pub angle_deg: f32,
    /// Spacing of boundary sample rays in degrees.
    pub ray_step_deg: f32,
    /// Steering contribution of one detection in degrees.
    pub steer_deg: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            range: 150.0,
            angle_deg: 60.0,
            ray_step_deg: 5.0,
            steer_deg: 10.0,
        }
    }
}

/// Harvesting, resource drops and obstacle respawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Pause after each completed task.
    pub cooldown_secs: f32,
    /// Length of a perpendicular detour around a blocker.
    pub detour_secs: f32,
    /// Minimum age of a drop before it can be collected.
    pub resource_ready_secs: f32,
    /// Delay before a destroyed obstacle grows back.
    pub respawn_secs: f32,
    /// Drop radius as a multiple of the obstacle radius.
    pub drop_scale: f32,
    /// Bob distance per tick.
    pub bob_step: f32,
    /// Maximum bob offset from the anchor.
    pub bob_amplitude: f32,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: 1.0,
            detour_secs: 2.0,
            resource_ready_secs: 1.0,
            respawn_secs: 30.0,
            drop_scale: 1.5,
            bob_step: 0.1,
            bob_amplitude: 5.0,
        }
    }
}

/// Day/night cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Wall-clock length of a full day.
    pub cycle_secs: f32,
    /// Hours in one day.
    pub hours_per_day: u32,
    /// Hour the clock starts at.
    pub start_hour: u32,
    /// First night hour.
    pub night_start: u32,
    /// First day hour.
    pub day_start: u32,
    /// Darkness applied by the renderer at night, from 0 to 1.
    pub night_darkness: f32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            cycle_secs: 600.0,
            hours_per_day: 24,
            start_hour: 6,
            night_start: 18,
            day_start: 6,
            night_darkness: 0.5,
        }
    }
}

/// Starting counters and notification threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Wood held at the start.
    pub starting_wood: u32,
    /// Rock held at the start.
    pub starting_rock: u32,
    /// Wood total that triggers the one-shot notice.
    pub wood_threshold: u32,
    /// Rock total that triggers the one-shot notice.
    pub rock_threshold: u32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_wood: 5,
            starting_rock: 0,
            wood_threshold: 10,
            rock_threshold: 10,
        }
    }
}

/// Trader prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    /// Wood cost of a lumber robot.
    pub lumber_cost: u32,
    /// Wood cost of a miner robot.
    pub miner_cost: u32,
    /// Wood total at which the miner robot is added to the catalog.
    pub miner_unlock_wood: u32,
    /// Offset from the player where purchased robots appear.
    pub delivery_offset: [f32; 2],
    /// Extra reach beyond touching distance for trader interaction.
    pub interaction_margin: f32,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            lumber_cost: 5,
            miner_cost: 5,
            miner_unlock_wood: 10,
            delivery_offset: [50.0, 50.0],
            interaction_margin: 20.0,
        }
    }
}

/// Enemies brought in at nightfall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NightConfig {
    /// Enemies spawned on each day to night edge.
    pub enemy_count: u32,
}

impl Default for NightConfig {
    fn default() -> Self {
        Self { enemy_count: 3 }
    }
}

/// Initial population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Radius of trees and rocks.
    pub obstacle_radius: f32,
    /// Trees placed at start.
    pub trees: u32,
    /// Rocks placed at start.
    pub rocks: u32,
    /// Player spawn point.
    pub player_start: [f32; 2],
    /// Trader position.
    pub trader_position: [f32; 2],
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            obstacle_radius: 30.0,
            trees: 5,
            rocks: 5,
            player_start: [400.0, 300.0],
            trader_position: [700.0, 90.0],
        }
    }
}
