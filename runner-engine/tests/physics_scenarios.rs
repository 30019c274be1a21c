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
//! Collision resolution scenarios
//!
//! Exercises the spatial index directly and through the physics systems.

use std::collections::BTreeSet;

use glam::DVec2;
use runner_engine::config::GameConfig;
use runner_engine::ecs::components::{
    Collision, Gravity, Identity, MainGamePlayer, PlayerState, Tag, Transform, Velocity,
};
use runner_engine::ecs::{EntityBuilder, Scheduler, World};
use runner_engine::game::{entities, main_game_scheduler, GameContext};
use runner_engine::math::Rect;
use runner_engine::physics::Space;
use runner_engine::platform::input::{InputKind, InputSnapshot};

fn ground() -> BTreeSet<Tag> {
    BTreeSet::from([Tag::Ground])
}

#[test]
fn test_falling_rect_stops_on_top_edge() {
    let mut space = Space::new();
    let floor = space.add(Rect::new(0.0, 500.0, 200.0, 100.0), ground(), None);

    let resolution = space
        .filter_by_tag(Tag::Ground)
        .resolve(Rect::new(10.0, 400.0, 20.0, 20.0), 0.0, 200.0, None);

    assert_eq!(resolution.position, DVec2::new(10.0, 480.0));
    assert_eq!(resolution.blocked_y, Some(floor));
    assert_eq!(resolution.blocked_x, None);
    assert!(resolution.colliding());
}

#[test]
fn test_wall_stops_x_and_y_still_moves() {
    let mut space = Space::new();
    let wall = space.add(Rect::new(100.0, 0.0, 20.0, 200.0), ground(), None);

    let resolution = space
        .filter_by_tag(Tag::Ground)
        .resolve(Rect::new(50.0, 50.0, 20.0, 20.0), 100.0, 30.0, None);

    assert_eq!(resolution.position, DVec2::new(80.0, 80.0));
    assert_eq!(resolution.blocked_x, Some(wall));
    assert_eq!(resolution.blocked_y, None);
}

#[test]
fn test_unobstructed_move_is_unchanged() {
    let mut space = Space::new();
    space.add(Rect::new(500.0, 500.0, 10.0, 10.0), ground(), None);

    let resolution = space
        .filter_by_tag(Tag::Ground)
        .resolve(Rect::new(0.0, 0.0, 10.0, 10.0), 25.0, -5.0, None);
    assert_eq!(resolution.delta, DVec2::new(25.0, -5.0));
    assert!(!resolution.colliding());
}

#[test]
fn test_padding_reports_near_misses() {
    let mut space = Space::new();
    let near = space.add(Rect::new(12.0, 0.0, 10.0, 10.0), BTreeSet::from([Tag::Enemy]), None);
    let area = Rect::new(0.0, 0.0, 10.0, 10.0);

    let hits: Vec<_> = space.query_overlap(area, 2.5, None).into_iter().map(|(id, _)| id).collect();
    assert_eq!(hits, vec![near]);
    assert!(space.query_overlap(area, 1.0, None).is_empty());
}

const FRAME: f64 = 1.0 / 60.0;

/// Main game loop with one block whose top edge is at y = 500
fn block_world() -> (World, Scheduler<GameContext>, GameContext) {
    let mut ctx = GameContext::new(GameConfig::default(), 3);
    ctx.level.frontier = 10_000.0;
    let scheduler = main_game_scheduler(&ctx).unwrap();
    let mut world = World::new();
    entities::ground_block(Rect::new(0.0, 500.0, 400.0, 100.0))
        .build(&mut world)
        .unwrap();
    (world, scheduler, ctx)
}

#[test]
fn test_gravity_bodies_settle_on_block_top_edge() {
    for start in [95.0, 300.0, 440.0, 449.0, 452.0] {
        let (mut world, mut scheduler, mut ctx) = block_world();
        let body = EntityBuilder::new()
            .with(Transform::at(10.0, start, 64.0, 48.0))
            .with(Velocity {
                value: DVec2::new(0.0, 300.0),
            })
            .with(Collision::new())
            .with(Identity::new(&[Tag::Player]))
            .with(Gravity)
            .build(&mut world)
            .unwrap();

        let mut settled_at = None;
        for frame in 0..240 {
            scheduler.update(&mut world, &mut ctx, FRAME).unwrap();
            let y = world.get::<Transform>(body).unwrap().position.y;
            match settled_at {
                Some(first) => assert_eq!(y, 452.0, "start {start}: left the block at frame {frame} after settling at {first}"),
                None if y == 452.0 => settled_at = Some(frame),
                None => assert!(y < 452.0, "start {start}: sank to {y}"),
            }
        }

        assert!(settled_at.is_some(), "start {start}: never settled");
        assert!(world.get::<Collision>(body).unwrap().colliding_with(Tag::Ground));
    }
}

#[test]
fn test_flying_player_lands_and_jumps_again() {
    let (mut world, mut scheduler, mut ctx) = block_world();
    let player = entities::player(&ctx.config).build(&mut world).unwrap();
    world.get_mut::<MainGamePlayer>(player).unwrap().state = PlayerState::Flying;

    for _ in 0..120 {
        scheduler.update(&mut world, &mut ctx, FRAME).unwrap();
    }
    assert_eq!(world.get::<Transform>(player).unwrap().position.y, 452.0);
    assert_eq!(world.get::<MainGamePlayer>(player).unwrap().state, PlayerState::GroundIdling);

    ctx.input = InputSnapshot::pressed(&[InputKind::Jump]);
    scheduler.update(&mut world, &mut ctx, FRAME).unwrap();
    assert_eq!(world.get::<MainGamePlayer>(player).unwrap().state, PlayerState::PrepareJumping);
}
