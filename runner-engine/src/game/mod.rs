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
//! Side-scrolling game rules
//!
//! Everything specific to the main game: the shared [`GameContext`], the
//! systems that drive the player, enemies, scrolling and level generation,
//! and factories for the entities they spawn.

mod animation;
mod context;
mod enemy;
pub mod entities;
mod input;
mod level;
mod life;
mod motion;
mod player;
mod rules;
mod sound;

pub use animation::AnimationSystem;
pub use context::{GameContext, GameOutcome, GamePhase, LevelState};
pub use enemy::EnemyPatrolSystem;
pub use input::InputSystem;
pub use level::{BlockPlan, LevelGenerator, TokenPlan};
pub use life::LifeSystem;
pub use motion::{ConstantSpeedSystem, DestroyBoundSystem};
pub use player::{step_player, BulletSpawn};
pub use rules::GameRuleSystem;
pub use sound::SoundSystem;

use std::sync::Arc;

use crate::ecs::Scheduler;
use crate::error::Result;
use crate::physics::{CollisionSystem, KinematicSystem, VelocitySystem};
use crate::render::{SpriteRenderSystem, TextRenderSystem};

/// System priorities; lower runs first in both passes
pub mod priority {
    /// Device input into movement intents
    pub const INPUT: i32 = 0;
    /// Scroll, gravity, player logic and generation
    pub const GAME_RULE: i32 = 10;
    /// Enemy walking
    pub const ENEMY: i32 = 20;
    /// Constant velocities
    pub const CONSTANT_SPEED: i32 = 30;
    /// Collidable integration
    pub const VELOCITY: i32 = 40;
    /// Non-collidable integration
    pub const KINEMATIC: i32 = 45;
    /// Shape lifecycle and collider overlay
    pub const COLLISION: i32 = 50;
    /// Damage and death
    pub const LIFE: i32 = 60;
    /// Out-of-bounds cleanup
    pub const DESTROY_BOUND: i32 = 70;
    /// Frame animation
    pub const ANIMATION: i32 = 80;
    /// Sound effects and music
    pub const SOUND: i32 = 85;
    /// Sprites
    pub const SPRITE_RENDER: i32 = 90;
    /// Text
    pub const TEXT_RENDER: i32 = 100;
}

/// Build the main game scheduler with every system registered
pub fn main_game_scheduler(ctx: &GameContext) -> Result<Scheduler<GameContext>> {
    let mut scheduler = Scheduler::new();
    scheduler.add_system(InputSystem);
    scheduler.add_system(GameRuleSystem::new(&ctx.config)?);
    scheduler.add_system(EnemyPatrolSystem);
    scheduler.add_system(ConstantSpeedSystem);
    scheduler.add_system(VelocitySystem);
    scheduler.add_system(KinematicSystem);
    scheduler.add_system(CollisionSystem::new());
    scheduler.add_system(LifeSystem);
    scheduler.add_system(DestroyBoundSystem);
    scheduler.add_system(AnimationSystem);
    scheduler.add_system(SoundSystem::new(Arc::clone(&ctx.sounds), Arc::clone(&ctx.audio)));
    scheduler.add_system(SpriteRenderSystem);
    scheduler.add_system(TextRenderSystem);
    Ok(scheduler)
}
