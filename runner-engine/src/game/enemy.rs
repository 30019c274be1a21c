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
//! Enemy patrol

use crate::ecs::components::{Collision, Enemy, Tag, Transform, Velocity};
use crate::ecs::{Capability, Frame, System};
use crate::error::Result;
use crate::game::{priority, GameContext};
use crate::math::Rect;
use crate::physics::{ShapeId, Space};

/// Whether the walker at `rect` may keep going in the direction of `speed`.
///
/// It may not when a wall blocks its next step, or when no ground lies
/// under its leading foot.
pub fn can_advance(space: &Space, rect: Rect, speed: f64, dt: f64, own: Option<ShapeId>) -> bool {
    let ground = space.filter_by_tag(Tag::Ground);
    if ground.resolve(rect, speed * dt, 0.0, own).blocked_x.is_some() {
        return false;
    }
    let foot_x = if speed >= 0.0 {
        rect.right()
    } else {
        rect.left() - 1.0
    };
    let foot = Rect::new(foot_x, rect.bottom() - 1.0, 1.0, 1.0);
    ground.resolve(foot, 0.0, 2.0, None).blocked_y.is_some()
}

/// Walks grounded enemies back and forth across their block
#[derive(Debug, Default)]
pub struct EnemyPatrolSystem;

impl System<GameContext> for EnemyPatrolSystem {
    fn name(&self) -> &str {
        "EnemyPatrolSystem"
    }

    fn priority(&self) -> i32 {
        priority::ENEMY
    }

    fn capability(&self) -> Capability {
        Capability::new()
            .with::<Enemy>()
            .with::<Transform>()
            .with::<Velocity>()
            .with::<Collision>()
    }

    fn update(&mut self, frame: Frame<'_, GameContext>) -> Result<()> {
        for &entity in frame.members {
            let collision = frame.world.get::<Collision>(entity)?;
            if !collision.colliding_with(Tag::Ground) {
                continue;
            }
            let rect = frame.world.get::<Transform>(entity)?.rect();
            let mut enemy = frame.world.get_mut::<Enemy>(entity)?;

            if !can_advance(&frame.ctx.space, rect, enemy.speed, frame.dt, collision.shape) {
                enemy.speed = -enemy.speed;
            }
            frame.world.get_mut::<Velocity>(entity)?.value.x += enemy.speed;
            frame.world.get_mut::<Transform>(entity)?.invert_x = enemy.speed < 0.0;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roof(space: &mut Space) {
        space.add(
            Rect::new(0.0, 100.0, 200.0, 100.0),
            [Tag::Ground].into_iter().collect(),
            None,
        );
    }

    #[test]
    fn test_turns_at_the_edge() {
        let mut space = Space::new();
        roof(&mut space);

        let middle = Rect::new(80.0, 68.0, 40.0, 32.0);
        assert!(can_advance(&space, middle, 60.0, 0.016, None));
        assert!(can_advance(&space, middle, -60.0, 0.016, None));

        let right_edge = Rect::new(160.0, 68.0, 40.0, 32.0);
        assert!(!can_advance(&space, right_edge, 60.0, 0.016, None));
        assert!(can_advance(&space, right_edge, -60.0, 0.016, None));

        let left_edge = Rect::new(0.0, 68.0, 40.0, 32.0);
        assert!(!can_advance(&space, left_edge, -60.0, 0.016, None));
    }

    #[test]
    fn test_turns_at_a_wall() {
        let mut space = Space::new();
        roof(&mut space);
        space.add(
            Rect::new(121.0, 0.0, 20.0, 100.0),
            [Tag::Ground].into_iter().collect(),
            None,
        );
        let walker = Rect::new(80.0, 68.0, 40.0, 32.0);
        assert!(!can_advance(&space, walker, 120.0, 0.016, None));
    }
}
