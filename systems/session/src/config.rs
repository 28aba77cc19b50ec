//! Tunable timing, lives and seeding for a game session.

use std::time::Duration;

use gem_maze_core::Direction;
use gem_maze_system_input::SamplerConfig;
use serde::{Deserialize, Serialize};

/// Settings shared by the tick loop and the input sampler.
///
/// Every field has a default, so a partial TOML table only overrides the
/// values it names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Delay between two ticks, in milliseconds.
    pub tick_delay_ms: u64,
    /// Length of the red alert shown after a hit, in milliseconds.
    pub hit_pause_ms: u64,
    /// Lives the player starts with.
    pub lives: u32,
    /// Pause after an accepted button press, in milliseconds.
    pub debounce_ms: u64,
    /// Pause between two button polling passes, in milliseconds.
    pub poll_interval_ms: u64,
    /// Seed for random enemies; entropy is used when absent.
    pub seed: Option<u64>,
    /// Heading of the player before any button is pressed.
    pub start_direction: Direction,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_delay_ms: 500,
            hit_pause_ms: 5000,
            lives: 3,
            debounce_ms: 100,
            poll_interval_ms: 5,
            seed: None,
            start_direction: Direction::Right,
        }
    }
}

impl GameConfig {
    /// Delay between two ticks.
    #[must_use]
    pub const fn tick_delay(&self) -> Duration {
        Duration::from_millis(self.tick_delay_ms)
    }

    /// Length of the red alert shown after a hit.
    #[must_use]
    pub const fn hit_pause(&self) -> Duration {
        Duration::from_millis(self.hit_pause_ms)
    }

    /// Timing for the button sampler.
    #[must_use]
    pub const fn sampler_config(&self) -> SamplerConfig {
        SamplerConfig {
            debounce: Duration::from_millis(self.debounce_ms),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }
}
