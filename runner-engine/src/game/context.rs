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
//! Shared state of the main game scene

use std::sync::Arc;
use std::time::Duration;

use glam::DVec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::GameConfig;
use crate::physics::{PhysicsContext, Space};
use crate::platform::audio::{AudioBackend, HeadlessAudioBackend, SoundBank};
use crate::platform::input::InputSnapshot;

/// Scroll phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Waiting for the player to walk past the start threshold
    Starting,
    /// The world scrolls; never goes back
    Scrolling,
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    /// The player ran out of hit points
    Died,
    /// The player touched a kill box
    KillBox,
    /// The player fell below the world
    FellOut,
}

/// Scroll and generation state
#[derive(Debug, Clone, PartialEq)]
pub struct LevelState {
    /// X where the next ground block will be placed
    pub frontier: f64,
    /// World width
    pub width: f64,
    /// World height
    pub height: f64,
    /// Velocity added to every scrollable entity each frame
    pub scroll_speed: DVec2,
    /// Velocity added each frame to unsupported gravity bodies
    pub gravity: f64,
    /// Scroll phase
    pub phase: GamePhase,
    /// Time left on a speed token boost
    pub boost_remaining: Duration,
}

impl LevelState {
    /// Level state at the start of a run
    pub fn new(config: &GameConfig) -> Self {
        LevelState {
            frontier: 0.0,
            width: config.world.width,
            height: config.world.height,
            scroll_speed: DVec2::ZERO,
            gravity: config.physics.gravity,
            phase: GamePhase::Starting,
            boost_remaining: Duration::ZERO,
        }
    }
}

/// Context shared by every main game system
#[derive(Debug)]
pub struct GameContext {
    /// Active configuration
    pub config: GameConfig,
    /// Scroll and generation state
    pub level: LevelState,
    /// Collision shapes
    pub space: Space,
    /// Random source for level generation
    pub rng: StdRng,
    /// This frame's input
    pub input: InputSnapshot,
    /// Draw collider outlines
    pub show_colliders: bool,
    /// Set once the run is over
    pub outcome: Option<GameOutcome>,
    /// Game time since the run started
    pub elapsed: Duration,
    /// Sound effects and music
    pub sounds: Arc<SoundBank>,
    /// Opens players for `sounds`
    pub audio: Arc<dyn AudioBackend>,
}

impl GameContext {
    /// Fresh context for a run seeded with `seed`
    pub fn new(config: GameConfig, seed: u64) -> Self {
        GameContext {
            level: LevelState::new(&config),
            space: Space::new(),
            rng: StdRng::seed_from_u64(seed),
            input: InputSnapshot::new(),
            show_colliders: config.debug.show_colliders,
            outcome: None,
            elapsed: Duration::ZERO,
            sounds: Arc::new(SoundBank::new()),
            audio: Arc::new(HeadlessAudioBackend),
            config,
        }
    }

    /// Play sounds from `sounds` through `audio`
    pub fn with_audio(mut self, sounds: Arc<SoundBank>, audio: Arc<dyn AudioBackend>) -> Self {
        self.sounds = sounds;
        self.audio = audio;
        self
    }

    /// Record the end of the run; the first outcome wins
    pub fn end_run(&mut self, outcome: GameOutcome) {
        if self.outcome.is_none() {
            tracing::info!(?outcome, elapsed = ?self.elapsed, "run over");
            self.outcome = Some(outcome);
        }
    }
}

impl PhysicsContext for GameContext {
    fn space(&self) -> &Space {
        &self.space
    }

    fn space_mut(&mut self) -> &mut Space {
        &mut self.space
    }

    fn collision_padding(&self) -> f64 {
        self.config.physics.collision_padding
    }

    fn show_colliders(&self) -> bool {
        self.show_colliders
    }
}
