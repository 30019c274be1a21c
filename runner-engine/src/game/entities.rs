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
//! Entity factories
//!
//! Each factory returns an [`EntityBuilder`] so systems can hand it to
//! [`Commands::spawn`](crate::ecs::Commands::spawn) and scenes can build it
//! directly.

use std::time::Duration;

use glam::DVec2;

use crate::config::GameConfig;
use crate::ecs::components::{
    Animation, Bullet, Collision, ConstantSpeed, DestroyBound, Enemy, Gravity, Identity, Life,
    MainGamePlayer, Movement, PlayerInput, PlayerState, Scrollable, Sound, Sprite, Tag, Text,
    Transform, Velocity, Wrap,
};
use crate::ecs::EntityBuilder;
use crate::math::Rect;
use crate::platform::audio::Playback;
use crate::render::{Color, RenderLayer};

/// Player size
pub const PLAYER_SIZE: DVec2 = DVec2::new(64.0, 48.0);
/// Enemy size
pub const ENEMY_SIZE: DVec2 = DVec2::new(40.0, 32.0);
/// Token size
pub const TOKEN_SIZE: DVec2 = DVec2::new(24.0, 24.0);
/// Bullet size
pub const BULLET_SIZE: DVec2 = DVec2::new(12.0, 6.0);

/// Played when the player takes off
pub const JUMP_SOUND: &str = "jump";
/// Played when the player picks up a token
pub const COLLECT_SOUND: &str = "collect";
/// Main game music
pub const CITY_MUSIC: &str = "music/city";
/// Part of the city music heard only once
pub const CITY_MUSIC_INTRO: Duration = Duration::from_secs(8);

/// The input-driven player
pub fn player(config: &GameConfig) -> EntityBuilder {
    let [x, y] = config.player.spawn;
    let (frameset, frames, duration) = PlayerState::GroundIdling.animation();
    EntityBuilder::new()
        .with(Transform::new(DVec2::new(x, y), PLAYER_SIZE))
        .with(Velocity::default())
        .with(Collision::new())
        .with(Identity::new(&[Tag::Player]))
        .with(Gravity)
        .with(Life::new(config.player.hp, config.player.invincibility()))
        .with(MainGamePlayer::from_config(&config.player))
        .with(Movement::default())
        .with(PlayerInput)
        .with(Sound::new(JUMP_SOUND, Playback::Once))
        .with(Sprite::new(frameset, RenderLayer::Objects))
        .with(Animation::new(frameset, frames, duration))
}

/// Scrolling building the player walks on
pub fn ground_block(rect: Rect) -> EntityBuilder {
    EntityBuilder::new()
        .with(Transform::new(rect.position, rect.size))
        .with(Velocity::default())
        .with(Collision::new())
        .with(Identity::new(&[Tag::Ground]))
        .with(Scrollable::default())
        .with(Sprite::new("building/0", RenderLayer::Objects))
}

/// Enemy standing at `position`, walking at `speed`
pub fn enemy(position: DVec2, speed: f64) -> EntityBuilder {
    EntityBuilder::new()
        .with(Transform::new(position, ENEMY_SIZE))
        .with(Velocity::default())
        .with(Collision::new())
        .with(Identity::new(&[Tag::Enemy]))
        .with(Gravity)
        .with(Scrollable::default())
        .with(Enemy {
            speed,
            contact_damage: 1.0,
        })
        .with(Life::new(1.0, Duration::ZERO))
        .with(Sprite::new("biscuit/walk", RenderLayer::Objects))
        .with(Animation::new("biscuit/walk", 4, Duration::from_millis(100)))
}

/// Pickup carrying `tag` (`JumpToken` or `SpeedToken`)
pub fn token(tag: Tag, position: DVec2) -> EntityBuilder {
    let texture = match tag {
        Tag::SpeedToken => "token/speed",
        _ => "token/jump",
    };
    EntityBuilder::new()
        .with(Transform::new(position, TOKEN_SIZE))
        .with(Velocity::default())
        .with(Collision::new())
        .with(Identity::new(&[tag]))
        .with(Scrollable::default())
        .with(Sprite::new(texture, RenderLayer::Objects))
}

/// Player bullet flying at `speed` pixels per second
pub fn bullet(position: DVec2, speed: f64, damage: f64) -> EntityBuilder {
    let mut transform = Transform::new(position, BULLET_SIZE);
    transform.invert_x = speed < 0.0;
    EntityBuilder::new()
        .with(transform)
        .with(Velocity::default())
        .with(Collision::new())
        .with(Identity::new(&[Tag::Bullet]))
        .with(Bullet { damage })
        .with(ConstantSpeed {
            speed: DVec2::new(speed, 0.0),
        })
        .with(Sprite::new("bullet", RenderLayer::Effects))
}

/// Static shape that ends the run on contact
pub fn kill_box(rect: Rect) -> EntityBuilder {
    let mut collision = Collision::new();
    collision.active = false;
    EntityBuilder::new()
        .with(Transform::new(rect.position, rect.size))
        .with(collision)
        .with(Identity::new(&[Tag::KillBox]))
}

/// Parallax layer that scrolls at `modifier` times the world speed and
/// wraps at `threshold`
pub fn background(texture: &str, position: DVec2, size: DVec2, modifier: f64, threshold: f64) -> EntityBuilder {
    EntityBuilder::new()
        .with(Transform::new(position, size))
        .with(Velocity::default())
        .with(Scrollable { modifier })
        .with(Wrap { threshold })
        .with(Sprite::new(texture, RenderLayer::Background))
}

/// Looping background music
pub fn music(clip: &str, intro: Duration) -> EntityBuilder {
    EntityBuilder::new().with(Sound::music(clip, intro))
}

/// Text drifting at `velocity` until it leaves `bound`
pub fn floating_text(content: &str, position: DVec2, velocity: DVec2, color: Color, bound: Rect) -> EntityBuilder {
    let mut text = Text::new(content, 24.0);
    text.color = color;
    EntityBuilder::new()
        .with(Transform::new(position, DVec2::new(0.0, 24.0)))
        .with(Velocity::default())
        .with(ConstantSpeed { speed: velocity })
        .with(DestroyBound {
            min: DVec2::new(bound.left(), bound.top()),
            max: DVec2::new(bound.right(), bound.bottom()),
        })
        .with(text)
}
