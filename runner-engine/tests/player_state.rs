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
//! Player state machine walkthroughs

use std::time::Duration;

use glam::DVec2;
use runner_engine::config::{GameConfig, PlayerConfig};
use runner_engine::ecs::components::{Animation, Intents, MainGamePlayer, Movement, PlayerState, Transform, Velocity};
use runner_engine::ecs::World;
use runner_engine::game::{entities, main_game_scheduler, step_player, GameContext};
use runner_engine::platform::input::{InputKind, InputSnapshot};

struct Player {
    player: MainGamePlayer,
    anim: Animation,
    transform: Transform,
    velocity: Velocity,
}

impl Player {
    fn new() -> Self {
        let (frameset, frames, duration) = PlayerState::GroundIdling.animation();
        Player {
            player: MainGamePlayer::from_config(&PlayerConfig::default()),
            anim: Animation::new(frameset, frames, duration),
            transform: Transform::at(100.0, 100.0, 64.0, 48.0),
            velocity: Velocity::default(),
        }
    }

    fn step(&mut self, intents: Intents, on_ground: bool, dt: Duration) -> Option<runner_engine::game::BulletSpawn> {
        self.velocity = Velocity::default();
        let spawn = step_player(
            &mut self.player,
            &intents,
            on_ground,
            &mut self.anim,
            &mut self.transform,
            &mut self.velocity,
            dt,
        );
        self.anim.advance(dt);
        spawn
    }
}

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

#[test]
fn test_full_jump_cycle() {
    let up = Intents {
        move_up: true,
        ..Intents::default()
    };
    let mut p = Player::new();

    p.step(up, true, ms(125));
    assert_eq!(p.player.state, PlayerState::PrepareJumping);
    assert_eq!(p.anim.frameset.as_str(), "whale/jump");

    // the crouch animation has to finish one loop before take-off
    for _ in 0..3 {
        p.step(Intents::default(), true, ms(125));
        assert_eq!(p.player.state, PlayerState::PrepareJumping);
    }
    p.step(Intents::default(), true, ms(125));
    assert_eq!(p.player.state, PlayerState::Jumping);

    let mut pushed = 0;
    while p.player.state == PlayerState::Jumping {
        p.step(Intents::default(), false, ms(100));
        assert!(p.velocity.value.y < 0.0);
        pushed += 1;
    }
    assert_eq!(pushed, 10);
    assert_eq!(p.player.state, PlayerState::Flying);

    p.step(Intents::default(), false, ms(100));
    assert_eq!(p.player.state, PlayerState::Flying);
    p.step(Intents::default(), true, ms(100));
    assert_eq!(p.player.state, PlayerState::GroundIdling);
}

#[test]
fn test_walking_sets_speed_and_facing() {
    let mut p = Player::new();
    let left = Intents {
        move_left: true,
        ..Intents::default()
    };

    p.step(left, true, ms(16));
    assert_eq!(p.player.state, PlayerState::GroundMoving);
    assert_eq!(p.velocity.value.x, -400.0);
    assert!(p.transform.invert_x);

    p.step(Intents::default(), true, ms(16));
    assert_eq!(p.player.state, PlayerState::GroundIdling);
    assert!(p.transform.invert_x);
}

#[test]
fn test_shooting_honours_cooldown() {
    let mut p = Player::new();
    let shoot = Intents {
        shoot: true,
        ..Intents::default()
    };

    let first = p.step(shoot, true, ms(16)).unwrap();
    assert_eq!(first.position, DVec2::new(100.0 + 64.0 + 0.5, 100.0 + 21.0));
    assert_eq!(first.speed, 750.0);

    assert!(p.step(shoot, true, ms(100)).is_none());
    assert!(p.step(shoot, true, ms(100)).is_none());
    assert!(p.step(shoot, true, ms(100)).is_some());
}

#[test]
fn test_bullet_leaves_from_the_left_edge_when_facing_left() {
    let mut p = Player::new();
    let intents = Intents {
        move_left: true,
        shoot: true,
        ..Intents::default()
    };
    let spawn = p.step(intents, true, ms(16)).unwrap();
    assert_eq!(spawn.position.x, 100.0 - 12.0 - 0.5);
    assert_eq!(spawn.speed, -750.0);
}

#[test]
fn test_intents_are_cleared_after_each_update() {
    let mut ctx = GameContext::new(GameConfig::default(), 5);
    ctx.level.frontier = 10_000.0;
    let mut scheduler = main_game_scheduler(&ctx).unwrap();
    let mut world = World::new();
    let player = entities::player(&ctx.config).build(&mut world).unwrap();

    ctx.input = InputSnapshot::pressed(&[
        InputKind::MoveLeft,
        InputKind::MoveRight,
        InputKind::Jump,
        InputKind::Shoot,
    ]);
    scheduler.update(&mut world, &mut ctx, 1.0 / 60.0).unwrap();

    let movement = world.get::<Movement>(player).unwrap();
    assert_eq!(movement.intents, Intents::default());
    // the raw input stays readable for the rest of the frame
    assert!(movement.just_pressed(InputKind::Shoot));
    // the intents were acted on before being cleared
    assert_eq!(world.get::<MainGamePlayer>(player).unwrap().state, PlayerState::PrepareJumping);
}
