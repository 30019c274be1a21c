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
//! Game component definitions
//!
//! Plain data attached to entities. Behaviour lives in the systems under
//! [`crate::game`], [`crate::physics`] and [`crate::render`].

use std::collections::BTreeSet;
use std::time::Duration;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::config::PlayerConfig;
use crate::ecs::{Component, Entity};
use crate::math::Rect;
use crate::physics::ShapeId;
use crate::platform::audio::{Playback, SoundId};
use crate::platform::input::{InputKind, InputSnapshot};
use crate::render::{colors, Color, RenderLayer, TextureId};

/// Position, size and orientation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Top-left corner
    pub position: DVec2,
    /// Width and height
    pub size: DVec2,
    /// Draw scale
    pub scale: DVec2,
    /// Mirror horizontally when drawn
    pub invert_x: bool,
    /// Mirror vertically when drawn
    pub invert_y: bool,
}

impl Transform {
    /// Transform at `position` with `size` and unit scale
    pub fn new(position: DVec2, size: DVec2) -> Self {
        Transform {
            position,
            size,
            scale: DVec2::ONE,
            invert_x: false,
            invert_y: false,
        }
    }

    /// Transform from scalar coordinates
    pub fn at(x: f64, y: f64, width: f64, height: f64) -> Self {
        Transform::new(DVec2::new(x, y), DVec2::new(width, height))
    }

    /// Bounding rectangle
    pub fn rect(&self) -> Rect {
        Rect::from_vectors(self.position, self.size)
    }
}

impl Component for Transform {}

/// Impulse-style velocity accumulator.
///
/// Systems add to it during the frame; physics integrates it once and then
/// zeroes it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity {
    /// Accumulated velocity in pixels per second
    pub value: DVec2,
}

impl Component for Velocity {}

/// Tags used by the spatial index and game rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tag {
    /// Solid ground other shapes resolve against
    Ground,
    /// The player
    Player,
    /// Hostile walkers
    Enemy,
    /// Player projectiles
    Bullet,
    /// Pickup raising jump power
    JumpToken,
    /// Pickup boosting scroll speed
    SpeedToken,
    /// Touching it ends the run
    KillBox,
}

/// Set of tags describing what an entity is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    /// Tags carried by the entity
    pub tags: BTreeSet<Tag>,
}

impl Identity {
    /// Identity carrying `tags`
    pub fn new(tags: &[Tag]) -> Self {
        Identity {
            tags: tags.iter().copied().collect(),
        }
    }

    /// Whether `tag` is present
    pub fn has(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }
}

impl Component for Identity {}

/// One overlap found by physics this frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollisionEvent {
    /// Owner of the other shape, if it belongs to an entity
    pub entity: Option<Entity>,
    /// Tags of the other shape
    pub tags: BTreeSet<Tag>,
}

/// Membership in the spatial index plus this frame's overlaps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    /// Inactive shapes still block others but collect no events
    pub active: bool,
    /// Handle in the spatial index, assigned when the entity joins it
    pub shape: Option<ShapeId>,
    /// Overlaps found during the last physics step
    pub events: Vec<CollisionEvent>,
}

impl Collision {
    /// Active collision component without a shape yet
    pub fn new() -> Self {
        Collision {
            active: true,
            shape: None,
            events: Vec::new(),
        }
    }

    /// Whether any event this frame carries `tag`
    pub fn colliding_with(&self, tag: Tag) -> bool {
        self.events.iter().any(|event| event.tags.contains(&tag))
    }

    /// Entities behind events carrying `tag`
    pub fn entities_with(&self, tag: Tag) -> impl Iterator<Item = Entity> + '_ {
        self.events
            .iter()
            .filter(move |event| event.tags.contains(&tag))
            .filter_map(|event| event.entity)
    }
}

impl Default for Collision {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Collision {}

/// Damage waiting to be applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageEvent {
    /// Hit points to remove
    pub amount: f64,
    /// Who dealt it
    pub source: Option<Entity>,
}

/// Hit points and damage bookkeeping
#[derive(Debug, Clone, PartialEq)]
pub struct Life {
    /// Remaining hit points; the entity dies at zero
    pub hp: f64,
    /// Invincibility window granted after each hit
    pub invincibility: Duration,
    /// Time left in the current window
    pub invincibility_remaining: Duration,
    /// Pending damage, cleared once per frame by the life system
    pub damage_events: Vec<DamageEvent>,
}

impl Life {
    /// Life with `hp` hit points
    pub fn new(hp: f64, invincibility: Duration) -> Self {
        Life {
            hp,
            invincibility,
            invincibility_remaining: Duration::ZERO,
            damage_events: Vec::new(),
        }
    }

    /// Queue damage
    pub fn damage(&mut self, amount: f64, source: Option<Entity>) {
        self.damage_events.push(DamageEvent { amount, source });
    }

    /// Whether an invincibility window is running
    pub fn is_invincible(&self) -> bool {
        !self.invincibility_remaining.is_zero()
    }
}

impl Component for Life {}

/// Player movement states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerState {
    /// Standing still on the ground
    GroundIdling,
    /// Walking on the ground
    GroundMoving,
    /// Crouching before take-off
    PrepareJumping,
    /// Pushing upward
    Jumping,
    /// Airborne after the push ends
    Flying,
}

impl PlayerState {
    /// Frameset, frame count and frame duration shown in this state
    pub fn animation(&self) -> (&'static str, usize, Duration) {
        match self {
            PlayerState::GroundIdling => ("whale/idle", 4, Duration::from_millis(50)),
            PlayerState::GroundMoving => ("whale/walk", 4, Duration::from_millis(50)),
            PlayerState::PrepareJumping => ("whale/jump", 4, Duration::from_millis(125)),
            PlayerState::Jumping => ("whale/air", 2, Duration::from_millis(50)),
            PlayerState::Flying => ("whale/fall", 2, Duration::from_millis(50)),
        }
    }

    /// Whether the state is airborne
    pub fn is_airborne(&self) -> bool {
        matches!(self, PlayerState::Jumping | PlayerState::Flying)
    }
}

/// Player tuning and state machine data
#[derive(Debug, Clone, PartialEq)]
pub struct MainGamePlayer {
    /// Current state
    pub state: PlayerState,
    /// Ground speed
    pub speed: f64,
    /// Jump power before any tokens
    pub base_jump_power: f64,
    /// Upward velocity applied every jumping frame
    pub jump_power: f64,
    /// Cap for `jump_power`
    pub max_jump_power: f64,
    /// Time spent in the current jump
    pub jump_time: Duration,
    /// Jump length before switching to flying
    pub jump_duration: Duration,
    /// Minimum time between shots
    pub shoot_cooldown: Duration,
    /// Time until the next shot is allowed
    pub shoot_cooldown_remaining: Duration,
    /// Bullet speed
    pub bullet_speed: f64,
    /// Facing left instead of right
    pub facing_left: bool,
}

impl MainGamePlayer {
    /// Fresh player from config
    pub fn from_config(config: &PlayerConfig) -> Self {
        MainGamePlayer {
            state: PlayerState::GroundIdling,
            speed: config.speed,
            base_jump_power: config.jump_power,
            jump_power: config.jump_power,
            max_jump_power: config.max_jump_power,
            jump_time: Duration::ZERO,
            jump_duration: config.jump_duration(),
            shoot_cooldown: config.shoot_cooldown(),
            shoot_cooldown_remaining: Duration::ZERO,
            bullet_speed: config.bullet_speed,
            facing_left: false,
        }
    }
}

impl Component for MainGamePlayer {}

/// Movement intents derived from input; reset every frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Intents {
    /// Jump or climb
    pub move_up: bool,
    /// Duck
    pub move_down: bool,
    /// Walk left
    pub move_left: bool,
    /// Walk right
    pub move_right: bool,
    /// Fire
    pub shoot: bool,
}

impl Intents {
    /// Whether any horizontal intent is set
    pub fn horizontal(&self) -> bool {
        self.move_left || self.move_right
    }
}

/// Input state and intents of an input-driven entity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Movement {
    /// This frame's intents
    pub intents: Intents,
    /// This frame's input, including press durations and edges
    pub input: InputSnapshot,
}

impl Movement {
    /// Frames `kind` has been held
    pub fn pressed_duration(&self, kind: InputKind) -> u32 {
        self.input.pressed_duration(kind)
    }

    /// Whether `kind` went down this frame
    pub fn just_pressed(&self, kind: InputKind) -> bool {
        self.input.just_pressed(kind)
    }

    /// Whether `kind` went up this frame
    pub fn just_released(&self, kind: InputKind) -> bool {
        self.input.just_released(kind)
    }

    /// Clear every intent
    pub fn reset_intents(&mut self) {
        self.intents = Intents::default();
    }
}

impl Component for Movement {}

/// Moves with the world scroll
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scrollable {
    /// Multiplier applied to the global scroll vector
    pub modifier: f64,
}

impl Default for Scrollable {
    fn default() -> Self {
        Scrollable { modifier: 1.0 }
    }
}

impl Component for Scrollable {}

/// Falls when not standing on ground
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Gravity;

impl Component for Gravity {}

/// Jumps back to `threshold` after scrolling past `-threshold`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wrap {
    /// Wrap distance
    pub threshold: f64,
}

impl Component for Wrap {}

/// Velocity added every frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConstantSpeed {
    /// Added velocity
    pub speed: DVec2,
}

impl Component for ConstantSpeed {}

/// Despawns the entity once its position leaves the box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DestroyBound {
    /// Top-left of the allowed box
    pub min: DVec2,
    /// Bottom-right of the allowed box
    pub max: DVec2,
}

impl DestroyBound {
    /// Whether `position` lies outside the box
    pub fn is_outside(&self, position: DVec2) -> bool {
        position.x < self.min.x
            || position.y < self.min.y
            || position.x > self.max.x
            || position.y > self.max.y
    }
}

impl Component for DestroyBound {}

/// Textured quad drawn at the entity's transform
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    /// Texture or frameset
    pub texture: TextureId,
    /// Draw layer
    pub layer: RenderLayer,
    /// Frame inside the frameset
    pub frame: usize,
    /// 0 is transparent, 1 is opaque
    pub opacity: f64,
    /// Draw with inverted colours
    pub invert_color: bool,
    /// Skip drawing when false
    pub visible: bool,
}

impl Sprite {
    /// Opaque, visible sprite on `layer`
    pub fn new(texture: impl Into<String>, layer: RenderLayer) -> Self {
        Sprite {
            texture: TextureId::new(texture),
            layer,
            frame: 0,
            opacity: 1.0,
            invert_color: false,
            visible: true,
        }
    }
}

impl Component for Sprite {}

/// Frame-based animation over a frameset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animation {
    /// Frameset being played
    pub frameset: TextureId,
    /// Frames in the frameset
    pub frame_count: usize,
    /// Time each frame stays on screen
    pub frame_duration: Duration,
    /// Time left on the current frame
    pub frame_remaining: Duration,
    /// Frame being shown
    pub current_frame: usize,
    /// Completed loops since the last frameset change
    pub cycles: u32,
}

impl Animation {
    /// Start `frameset` at frame 0
    pub fn new(frameset: impl Into<String>, frame_count: usize, frame_duration: Duration) -> Self {
        Animation {
            frameset: TextureId::new(frameset),
            frame_count,
            frame_duration,
            frame_remaining: frame_duration,
            current_frame: 0,
            cycles: 0,
        }
    }

    /// Swap the frameset, restarting frame, timer and cycle count
    pub fn change(&mut self, frameset: impl Into<String>, frame_count: usize, frame_duration: Duration) {
        *self = Animation::new(frameset, frame_count, frame_duration);
    }

    /// Advance by `dt`. Returns true when the animation wrapped to frame 0.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if self.frame_count == 0 {
            return false;
        }
        self.frame_remaining = self.frame_remaining.saturating_sub(dt);
        if !self.frame_remaining.is_zero() {
            return false;
        }

        self.frame_remaining = self.frame_duration;
        self.current_frame += 1;
        if self.current_frame >= self.frame_count {
            self.current_frame = 0;
            self.cycles += 1;
            return true;
        }
        false
    }
}

impl Component for Animation {}

/// Sound effect or music belonging to an entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sound {
    /// Sound to play
    pub clip: SoundId,
    /// One-shot or looping
    pub playback: Playback,
    /// Playing, or should start; cleared when a one-shot ends
    pub active: bool,
    /// Start over from the beginning on the next sound update
    pub restart: bool,
}

impl Sound {
    /// Silent until triggered
    pub fn new(clip: impl Into<SoundId>, playback: Playback) -> Self {
        Sound {
            clip: clip.into(),
            playback,
            active: false,
            restart: false,
        }
    }

    /// Music that starts right away and loops after `intro`
    pub fn music(clip: impl Into<SoundId>, intro: Duration) -> Self {
        Sound {
            active: true,
            ..Sound::new(clip, Playback::Loop { intro })
        }
    }

    /// Switch to `clip` and play it from the start
    pub fn trigger(&mut self, clip: impl Into<SoundId>) {
        self.clip = clip.into();
        self.active = true;
        self.restart = true;
    }
}

impl Component for Sound {}

/// Text drawn at the entity's transform
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    /// Text to draw
    pub content: String,
    /// Glyph height
    pub size: f64,
    /// Fill colour
    pub color: Color,
    /// Draw layer
    pub layer: RenderLayer,
}

impl Text {
    /// White text on the text layer
    pub fn new(content: impl Into<String>, size: f64) -> Self {
        Text {
            content: content.into(),
            size,
            color: colors::WHITE,
            layer: RenderLayer::Text,
        }
    }
}

impl Component for Text {}

/// Player projectile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bullet {
    /// Damage dealt on hit
    pub damage: f64,
}

impl Component for Bullet {}

/// Walking enemy; the sign of `speed` is its direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Enemy {
    /// Patrol speed
    pub speed: f64,
    /// Damage dealt on contact with the player
    pub contact_damage: f64,
}

impl Component for Enemy {}

/// Marks the entity that receives device input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerInput;

impl Component for PlayerInput {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_animation_wraps_after_frame_count_durations() {
        let step = Duration::from_millis(50);
        let mut anim = Animation::new("whale/idle", 4, step);

        for expected in 1..4 {
            assert!(!anim.advance(step));
            assert_eq!(anim.current_frame, expected);
            assert_eq!(anim.cycles, 0);
        }
        assert!(anim.advance(step));
        assert_eq!(anim.current_frame, 0);
        assert_eq!(anim.cycles, 1);
    }

    #[test]
    fn test_animation_partial_steps() {
        let mut anim = Animation::new("whale/walk", 2, Duration::from_millis(100));
        assert!(!anim.advance(Duration::from_millis(60)));
        assert_eq!(anim.current_frame, 0);
        anim.advance(Duration::from_millis(60));
        assert_eq!(anim.current_frame, 1);
        assert_eq!(anim.frame_remaining, Duration::from_millis(100));
    }

    #[test]
    fn test_animation_change_resets() {
        let step = Duration::from_millis(10);
        let mut anim = Animation::new("a", 1, step);
        anim.advance(step);
        assert_eq!(anim.cycles, 1);

        anim.change("b", 3, Duration::from_millis(20));
        assert_eq!(anim.cycles, 0);
        assert_eq!(anim.current_frame, 0);
        assert_eq!(anim.frame_remaining, Duration::from_millis(20));
        assert_eq!(anim.frameset.as_str(), "b");
    }

    #[test]
    fn test_collision_queries() {
        let other = Entity::from_raw(3);
        let mut collision = Collision::new();
        collision.events.push(CollisionEvent {
            entity: Some(other),
            tags: [Tag::Enemy].into_iter().collect(),
        });

        assert!(collision.colliding_with(Tag::Enemy));
        assert!(!collision.colliding_with(Tag::Ground));
        assert_eq!(collision.entities_with(Tag::Enemy).collect::<Vec<_>>(), vec![other]);
    }

    #[test]
    fn test_destroy_bound() {
        let bound = DestroyBound {
            min: DVec2::new(-10.0, -10.0),
            max: DVec2::new(100.0, 100.0),
        };
        assert!(!bound.is_outside(DVec2::new(50.0, 50.0)));
        assert!(bound.is_outside(DVec2::new(-11.0, 0.0)));
        assert!(bound.is_outside(DVec2::new(0.0, 101.0)));
    }
}
