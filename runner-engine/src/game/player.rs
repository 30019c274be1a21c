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
//! Player movement state machine
//!
//! ```text
//! GroundIdling --jump--> PrepareJumping --1 animation cycle--> Jumping
//!      ^  |                    ^                                  |
//!      |  walk                 jump                      jump time elapsed
//!      |  v                    |                                  v
//! GroundMoving ----------------+         GroundIdling <--ground-- Flying
//! ```

use std::time::Duration;

use glam::DVec2;
use tracing::debug;

use crate::ecs::components::{Animation, Intents, MainGamePlayer, PlayerState, Transform, Velocity};
use crate::game::entities::BULLET_SIZE;

/// Gap between the player's edge and a new bullet
const MUZZLE_GAP: f64 = 0.5;

/// Bullet requested by a player step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BulletSpawn {
    /// Top-left corner of the bullet
    pub position: DVec2,
    /// Horizontal speed; negative flies left
    pub speed: f64,
}

fn change_state(player: &mut MainGamePlayer, anim: &mut Animation, next: PlayerState) {
    debug!(from = ?player.state, to = ?next, "player state");
    player.state = next;
    let (frameset, frames, duration) = next.animation();
    anim.change(frameset, frames, duration);
}

/// Advance the player by one frame.
///
/// Reads the intents and ground contact, updates state, facing and
/// cooldowns, and writes the walking and jumping impulses into `velocity`.
/// Returns a bullet to spawn when the player fires.
pub fn step_player(
    player: &mut MainGamePlayer,
    intents: &Intents,
    on_ground: bool,
    anim: &mut Animation,
    transform: &mut Transform,
    velocity: &mut Velocity,
    dt: Duration,
) -> Option<BulletSpawn> {
    let mut horizontal_speed = player.speed;

    match player.state {
        PlayerState::GroundIdling => {
            if intents.move_up {
                change_state(player, anim, PlayerState::PrepareJumping);
            } else if intents.horizontal() {
                change_state(player, anim, PlayerState::GroundMoving);
            }
        }
        PlayerState::GroundMoving => {
            if intents.move_up {
                change_state(player, anim, PlayerState::PrepareJumping);
            } else if !intents.horizontal() {
                change_state(player, anim, PlayerState::GroundIdling);
            }
        }
        PlayerState::PrepareJumping => {
            horizontal_speed = 0.0;
            if anim.cycles >= 1 {
                player.jump_time = Duration::ZERO;
                change_state(player, anim, PlayerState::Jumping);
            }
        }
        PlayerState::Jumping => {
            horizontal_speed /= 2.0;
            velocity.value.y -= player.jump_power;
            player.jump_time += dt;
            if player.jump_time >= player.jump_duration {
                change_state(player, anim, PlayerState::Flying);
            }
        }
        PlayerState::Flying => {
            horizontal_speed /= 2.0;
            if on_ground {
                change_state(player, anim, PlayerState::GroundIdling);
            }
        }
    }

    if intents.move_left {
        velocity.value.x = -horizontal_speed;
        player.facing_left = true;
    } else if intents.move_right {
        velocity.value.x = horizontal_speed;
        player.facing_left = false;
    }
    transform.invert_x = player.facing_left;

    player.shoot_cooldown_remaining = player.shoot_cooldown_remaining.saturating_sub(dt);
    if !intents.shoot || !player.shoot_cooldown_remaining.is_zero() {
        return None;
    }
    player.shoot_cooldown_remaining = player.shoot_cooldown;

    let y = transform.position.y + (transform.size.y - BULLET_SIZE.y) / 2.0;
    let spawn = if player.facing_left {
        BulletSpawn {
            position: DVec2::new(transform.position.x - BULLET_SIZE.x - MUZZLE_GAP, y),
            speed: -player.bullet_speed,
        }
    } else {
        BulletSpawn {
            position: DVec2::new(transform.position.x + transform.size.x + MUZZLE_GAP, y),
            speed: player.bullet_speed,
        }
    };
    Some(spawn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerConfig;

    struct Rig {
        player: MainGamePlayer,
        anim: Animation,
        transform: Transform,
        velocity: Velocity,
    }

    impl Rig {
        fn new() -> Self {
            let (frameset, frames, duration) = PlayerState::GroundIdling.animation();
            Rig {
                player: MainGamePlayer::from_config(&PlayerConfig::default()),
                anim: Animation::new(frameset, frames, duration),
                transform: Transform::at(100.0, 100.0, 64.0, 48.0),
                velocity: Velocity::default(),
            }
        }

        fn step(&mut self, intents: Intents, on_ground: bool, dt: Duration) -> Option<BulletSpawn> {
            self.velocity = Velocity::default();
            step_player(
                &mut self.player,
                &intents,
                on_ground,
                &mut self.anim,
                &mut self.transform,
                &mut self.velocity,
                dt,
            )
        }
    }

    const FRAME: Duration = Duration::from_millis(16);

    fn jump() -> Intents {
        Intents {
            move_up: true,
            ..Intents::default()
        }
    }

    fn right() -> Intents {
        Intents {
            move_right: true,
            ..Intents::default()
        }
    }

    #[test]
    fn test_walk_and_stop() {
        let mut rig = Rig::new();
        rig.step(right(), true, FRAME);
        assert_eq!(rig.player.state, PlayerState::GroundMoving);
        assert_eq!(rig.velocity.value.x, 400.0);
        assert_eq!(rig.anim.frameset.as_str(), "whale/walk");

        rig.step(Intents::default(), true, FRAME);
        assert_eq!(rig.player.state, PlayerState::GroundIdling);
        assert_eq!(rig.velocity.value.x, 0.0);
    }

    #[test]
    fn test_prepare_jump_waits_for_one_cycle() {
        let mut rig = Rig::new();
        rig.step(jump(), true, FRAME);
        assert_eq!(rig.player.state, PlayerState::PrepareJumping);

        rig.step(right(), true, FRAME);
        assert_eq!(rig.player.state, PlayerState::PrepareJumping);
        assert_eq!(rig.velocity.value.x, 0.0);

        rig.anim.cycles = 1;
        rig.step(Intents::default(), true, FRAME);
        assert_eq!(rig.player.state, PlayerState::Jumping);
        assert_eq!(rig.anim.cycles, 0);
    }

    #[test]
    fn test_jumping_becomes_flying_after_jump_duration() {
        let mut rig = Rig::new();
        rig.player.state = PlayerState::Jumping;

        rig.step(right(), true, Duration::from_millis(500));
        assert_eq!(rig.player.state, PlayerState::Jumping);
        assert_eq!(rig.velocity.value, DVec2::new(200.0, -900.0));

        // Ground contact does not cut the jump short
        rig.step(Intents::default(), true, Duration::from_millis(499));
        assert_eq!(rig.player.state, PlayerState::Jumping);
        rig.step(Intents::default(), true, Duration::from_millis(1));
        assert_eq!(rig.player.state, PlayerState::Flying);
    }

    #[test]
    fn test_flying_lands_on_ground() {
        let mut rig = Rig::new();
        rig.player.state = PlayerState::Flying;

        rig.step(right(), false, FRAME);
        assert_eq!(rig.player.state, PlayerState::Flying);
        assert_eq!(rig.velocity.value.x, 200.0);

        rig.step(Intents::default(), true, FRAME);
        assert_eq!(rig.player.state, PlayerState::GroundIdling);
        assert_eq!(rig.anim.frameset.as_str(), "whale/idle");
    }

    #[test]
    fn test_shooting_respects_cooldown_and_facing() {
        let mut rig = Rig::new();
        let shoot = Intents {
            shoot: true,
            ..Intents::default()
        };

        let first = rig.step(shoot, true, FRAME).unwrap();
        assert_eq!(first.position, DVec2::new(164.5, 121.0));
        assert_eq!(first.speed, 750.0);
        assert!(rig.step(shoot, true, FRAME).is_none());

        rig.step(Intents { move_left: true, ..Intents::default() }, true, Duration::from_millis(300));
        let second = rig.step(shoot, true, FRAME).unwrap();
        assert_eq!(second.position.x, 100.0 - 12.0 - 0.5);
        assert_eq!(second.speed, -750.0);
        assert!(rig.transform.invert_x);
    }
}
