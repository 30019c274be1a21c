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
//! Velocity integration
//!
//! Velocities are impulses: systems add to them during the frame and
//! integration consumes them, leaving zero behind.

use glam::DVec2;
use tracing::warn;

use crate::ecs::components::{Collision, CollisionEvent, Identity, Tag, Transform, Velocity};
use crate::ecs::{Capability, Frame, System};
use crate::error::Result;
use crate::game::priority;
use crate::physics::{PhysicsContext, Space};

/// Integrate one collidable body.
///
/// Ground bodies move freely, since they are what everything else resolves
/// against. Other bodies resolve their move against ground shapes, X first,
/// then Y. Afterwards the shape mirrors the transform and, for active
/// non-ground bodies, this frame's collision events are collected with
/// `padding`. The velocity is always left at zero.
///
/// Returns false when the velocity was not finite and the move was dropped.
pub fn integrate_body(
    space: &mut Space,
    transform: &mut Transform,
    velocity: &mut Velocity,
    collision: &mut Collision,
    is_ground: bool,
    padding: f64,
    dt: f64,
) -> bool {
    let delta = velocity.value * dt;
    velocity.value = DVec2::ZERO;
    collision.events.clear();

    if !delta.is_finite() {
        warn!(?delta, "dropping non-finite movement");
        return false;
    }

    let Some(shape) = collision.shape else {
        transform.position += delta;
        return true;
    };

    if is_ground {
        transform.position += delta;
    } else {
        let resolution = space
            .filter_by_tag(Tag::Ground)
            .resolve(transform.rect(), delta.x, delta.y, Some(shape));
        transform.position = resolution.position;
    }
    space.set_rect(shape, transform.rect());

    if collision.active && !is_ground {
        collision.events = space
            .query_overlap(transform.rect(), padding, Some(shape))
            .into_iter()
            .map(|(_, other)| CollisionEvent {
                entity: other.owner,
                tags: other.tags.clone(),
            })
            .collect();
    }
    true
}

/// Integrates Transform + Velocity + Collision bodies against the space
#[derive(Debug, Default)]
pub struct VelocitySystem;

impl<C: PhysicsContext> System<C> for VelocitySystem {
    fn name(&self) -> &str {
        "VelocitySystem"
    }

    fn priority(&self) -> i32 {
        priority::VELOCITY
    }

    fn capability(&self) -> Capability {
        Capability::new()
            .with::<Transform>()
            .with::<Velocity>()
            .with::<Collision>()
    }

    fn update(&mut self, frame: Frame<'_, C>) -> Result<()> {
        let padding = frame.ctx.collision_padding();
        let space = frame.ctx.space_mut();

        for &entity in frame.members {
            let mut transform = frame.world.get_mut::<Transform>(entity)?;
            let mut velocity = frame.world.get_mut::<Velocity>(entity)?;
            let mut collision = frame.world.get_mut::<Collision>(entity)?;
            let is_ground = frame
                .world
                .get::<Identity>(entity)
                .map(|identity| identity.has(Tag::Ground))
                .unwrap_or(false);

            if !integrate_body(
                space,
                &mut transform,
                &mut velocity,
                &mut collision,
                is_ground,
                padding,
                frame.dt,
            ) {
                warn!(%entity, "skipped integration");
            }
        }
        Ok(())
    }
}

/// Integrates Transform + Velocity bodies that have no collision shape
#[derive(Debug, Default)]
pub struct KinematicSystem;

impl<C> System<C> for KinematicSystem {
    fn name(&self) -> &str {
        "KinematicSystem"
    }

    fn priority(&self) -> i32 {
        priority::KINEMATIC
    }

    fn capability(&self) -> Capability {
        Capability::new()
            .with::<Transform>()
            .with::<Velocity>()
            .without::<Collision>()
    }

    fn update(&mut self, frame: Frame<'_, C>) -> Result<()> {
        for &entity in frame.members {
            let mut transform = frame.world.get_mut::<Transform>(entity)?;
            let mut velocity = frame.world.get_mut::<Velocity>(entity)?;
            let delta = velocity.value * frame.dt;
            velocity.value = DVec2::ZERO;
            if delta.is_finite() {
                transform.position += delta;
            } else {
                warn!(%entity, "dropping non-finite movement");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Rect;

    fn ground(space: &mut Space) {
        space.add(
            Rect::new(0.0, 500.0, 300.0, 100.0),
            [Tag::Ground].into_iter().collect(),
            None,
        );
    }

    fn body(space: &mut Space, x: f64, y: f64) -> (Transform, Collision) {
        let transform = Transform::at(x, y, 20.0, 20.0);
        let mut collision = Collision::new();
        collision.shape = Some(space.add(transform.rect(), [Tag::Player].into_iter().collect(), None));
        (transform, collision)
    }

    #[test]
    fn test_velocity_is_cleared_after_integration() {
        let mut space = Space::new();
        let (mut transform, mut collision) = body(&mut space, 0.0, 0.0);
        let mut velocity = Velocity {
            value: DVec2::new(60.0, 0.0),
        };

        assert!(integrate_body(&mut space, &mut transform, &mut velocity, &mut collision, false, 2.5, 0.5));
        assert_eq!(transform.position, DVec2::new(30.0, 0.0));
        assert_eq!(velocity.value, DVec2::ZERO);
        assert_eq!(space.get(collision.shape.unwrap()).unwrap().rect.position, transform.position);
    }

    #[test]
    fn test_landing_reports_ground_event() {
        let mut space = Space::new();
        ground(&mut space);
        let (mut transform, mut collision) = body(&mut space, 10.0, 470.0);
        let mut velocity = Velocity {
            value: DVec2::new(0.0, 600.0),
        };

        integrate_body(&mut space, &mut transform, &mut velocity, &mut collision, false, 2.5, 0.1);
        assert_eq!(transform.position.y, 480.0);
        assert!(collision.colliding_with(Tag::Ground));
    }

    #[test]
    fn test_non_finite_velocity_is_dropped() {
        let mut space = Space::new();
        let (mut transform, mut collision) = body(&mut space, 5.0, 5.0);
        let mut velocity = Velocity {
            value: DVec2::new(f64::NAN, 0.0),
        };

        assert!(!integrate_body(&mut space, &mut transform, &mut velocity, &mut collision, false, 2.5, 0.1));
        assert_eq!(transform.position, DVec2::new(5.0, 5.0));
        assert_eq!(velocity.value, DVec2::ZERO);
    }

    #[test]
    fn test_ground_bodies_move_freely() {
        let mut space = Space::new();
        ground(&mut space);
        let mut transform = Transform::at(310.0, 500.0, 100.0, 100.0);
        let mut collision = Collision::new();
        collision.shape = Some(space.add(transform.rect(), [Tag::Ground].into_iter().collect(), None));
        let mut velocity = Velocity {
            value: DVec2::new(-100.0, 0.0),
        };

        integrate_body(&mut space, &mut transform, &mut velocity, &mut collision, true, 2.5, 0.5);
        assert_eq!(transform.position.x, 260.0);
        assert!(collision.events.is_empty());
    }
}
