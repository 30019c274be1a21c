// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Game configuration with defaults and RON persistence
//!
//! Every section carries `#[serde(default)]`, so a config file only needs the
//! values it overrides. Durations are stored as whole milliseconds.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EngineError, Result};

/// Top-level game configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    /// Playfield dimensions.
    pub world: WorldConfig,
    /// Gravity and collision tuning.
    pub physics: PhysicsConfig,
    /// Player movement, jumping and shooting.
    pub player: PlayerConfig,
    /// Scrolling speed and boosts.
    pub scroll: ScrollConfig,
    /// Procedural level generation.
    pub level: LevelConfig,
    /// Rhythm scene timing.
    pub karaoke: KaraokeConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Playfield dimensions in pixels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// Playfield width.
    pub width: f64,
    /// Playfield height.
    pub height: f64,
}

/// Physics tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Velocity added each frame to airborne gravity-affected entities.
    pub gravity: f64,
    /// Margin added to every side of a shape when looking for overlaps.
    pub collision_padding: f64,
}

/// Player tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    /// Horizontal ground speed.
    pub speed: f64,
    /// Upward velocity applied every frame while jumping.
    pub jump_power: f64,
    /// Upper bound for jump power after collecting jump tokens.
    pub max_jump_power: f64,
    /// How long a jump pushes upward, in milliseconds.
    pub jump_duration_ms: u64,
    /// Minimum time between two shots, in milliseconds.
    pub shoot_cooldown_ms: u64,
    /// Horizontal bullet speed.
    pub bullet_speed: f64,
    /// Starting hit points.
    pub hp: f64,
    /// Invincibility window after taking damage, in milliseconds.
    pub invincibility_ms: u64,
    /// Spawn position `[x, y]`.
    pub spawn: [f64; 2],
}

/// Scroll tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScrollConfig {
    /// Horizontal scroll speed once scrolling begins (negative moves left).
    pub start_speed: f64,
    /// Player x position that starts the scroll.
    pub start_threshold: f64,
    /// Multiple of `start_speed` added by a speed token.
    pub boost_factor: f64,
    /// How long a speed token boost lasts, in milliseconds.
    pub boost_duration_ms: u64,
}

/// Level generation tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LevelConfig {
    /// Edge length of one building tile.
    pub tile_size: f64,
    /// Smallest gap between two consecutive blocks.
    pub min_gap: f64,
    /// Random extra gap added on top of `min_gap`.
    pub gap_jitter: f64,
    /// Largest gap the player can clear; generation never exceeds it.
    pub jumpable_gap: f64,
    /// Chance that a new block carries an enemy.
    pub enemy_chance: f64,
    /// Chance that a new block carries a token.
    pub token_chance: f64,
    /// Enemy patrol speed.
    pub enemy_speed: f64,
}

/// Rhythm scene tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KaraokeConfig {
    /// Background fade-in before the music starts, in milliseconds.
    pub start_fade_in_ms: u64,
    /// Hits closer than this score Perfect, in milliseconds.
    pub perfect_window_ms: u64,
    /// Hits closer than this score Great, in milliseconds.
    pub great_window_ms: u64,
    /// Hits closer than this score Good, in milliseconds.
    pub good_window_ms: u64,
    /// Note marker scroll speed in pixels per second.
    pub note_speed: f64,
    /// X coordinate of the hit line.
    pub hit_line_x: f64,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Start with the collider overlay enabled.
    pub show_colliders: bool,
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Time multiplier while the fast-forward input is held.
    pub fast_forward_factor: f64,
}

// --- Default implementations ---

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
        }
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 500.0,
            collision_padding: 2.5,
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 400.0,
            jump_power: 900.0,
            max_jump_power: 2000.0,
            jump_duration_ms: 1000,
            shoot_cooldown_ms: 250,
            bullet_speed: 750.0,
            hp: 3.0,
            invincibility_ms: 1000,
            spawn: [10.0, 100.0],
        }
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            start_speed: -100.5,
            start_threshold: 50.0,
            boost_factor: 4.0,
            boost_duration_ms: 2000,
        }
    }
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            tile_size: 32.0,
            min_gap: 60.0,
            gap_jitter: 40.0,
            jumpable_gap: 150.0,
            enemy_chance: 0.2,
            token_chance: 0.1,
            enemy_speed: 60.0,
        }
    }
}

impl Default for KaraokeConfig {
    fn default() -> Self {
        Self {
            start_fade_in_ms: 3000,
            perfect_window_ms: 250,
            great_window_ms: 500,
            good_window_ms: 1000,
            note_speed: 600.0,
            hit_line_x: 300.0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            show_colliders: false,
            log_level: "info".to_string(),
            fast_forward_factor: 5.0,
        }
    }
}

impl PlayerConfig {
    /// Jump duration as a [`Duration`]
    pub fn jump_duration(&self) -> Duration {
        Duration::from_millis(self.jump_duration_ms)
    }

    /// Shoot cooldown as a [`Duration`]
    pub fn shoot_cooldown(&self) -> Duration {
        Duration::from_millis(self.shoot_cooldown_ms)
    }

    /// Invincibility window as a [`Duration`]
    pub fn invincibility(&self) -> Duration {
        Duration::from_millis(self.invincibility_ms)
    }
}

impl ScrollConfig {
    /// Boost duration as a [`Duration`]
    pub fn boost_duration(&self) -> Duration {
        Duration::from_millis(self.boost_duration_ms)
    }
}

// --- Load / Save / Validate ---

impl GameConfig {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(EngineError::ConfigRead)?;
        let config: GameConfig = ron::from_str(&contents).map_err(EngineError::ConfigParse)?;
        config.validate()?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `path` if it exists, otherwise return the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config as pretty RON, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(EngineError::ConfigWrite)?;
        }

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(EngineError::ConfigSerialize)?;

        std::fs::write(path, serialized).map_err(EngineError::ConfigWrite)?;
        Ok(())
    }

    /// Reject values the game cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !(self.world.width > 0.0 && self.world.height > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "world size must be positive, got {}x{}",
                self.world.width, self.world.height
            )));
        }
        if !self.physics.gravity.is_finite() || self.physics.collision_padding < 0.0 {
            return Err(EngineError::InvalidConfig(
                "gravity must be finite and collision padding non-negative".to_string(),
            ));
        }

        let level = &self.level;
        if level.tile_size <= 0.0 || level.min_gap <= 0.0 || level.gap_jitter < 0.0 {
            return Err(EngineError::InvalidConfig(
                "tile size and minimum gap must be positive, jitter non-negative".to_string(),
            ));
        }
        if level.min_gap + level.gap_jitter > level.jumpable_gap {
            return Err(EngineError::InvalidConfig(format!(
                "gaps up to {} exceed the jumpable gap {}",
                level.min_gap + level.gap_jitter,
                level.jumpable_gap
            )));
        }
        for (name, chance) in [("enemy", level.enemy_chance), ("token", level.token_chance)] {
            if !(0.0..=1.0).contains(&chance) {
                return Err(EngineError::InvalidConfig(format!(
                    "{name} chance {chance} is not a probability"
                )));
            }
        }

        let k = &self.karaoke;
        if !(k.perfect_window_ms < k.great_window_ms && k.great_window_ms < k.good_window_ms) {
            return Err(EngineError::InvalidConfig(
                "karaoke hit windows must be strictly increasing".to_string(),
            ));
        }
        if self.debug.fast_forward_factor < 1.0 {
            return Err(EngineError::InvalidConfig(
                "fast forward factor must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
