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
//! Spatial index membership

use std::collections::BTreeMap;

use tracing::trace;

use crate::ecs::components::{Collision, Identity, Transform, Velocity};
use crate::ecs::{Capability, Entity, Frame, RenderFrame, System, World};
use crate::error::Result;
use crate::game::priority;
use crate::physics::{PhysicsContext, ShapeId};
use crate::render::{colors, Drawable, RenderLayer};

/// Adds a shape to the space for every Transform + Collision + Identity
/// entity and removes it again when the entity leaves.
///
/// Shapes of bodies without a velocity are re-synced each frame, so
/// teleported or resized static bodies stay accurate.
#[derive(Debug, Default)]
pub struct CollisionSystem {
    shapes: BTreeMap<Entity, ShapeId>,
}

impl CollisionSystem {
    /// Create the system
    pub fn new() -> Self {
        CollisionSystem::default()
    }

    /// Shape registered for `entity`
    pub fn shape_of(&self, entity: Entity) -> Option<ShapeId> {
        self.shapes.get(&entity).copied()
    }
}

impl<C: PhysicsContext> System<C> for CollisionSystem {
    fn name(&self) -> &str {
        "CollisionSystem"
    }

    fn priority(&self) -> i32 {
        priority::COLLISION
    }

    fn capability(&self) -> Capability {
        Capability::new()
            .with::<Transform>()
            .with::<Collision>()
            .with::<Identity>()
    }

    fn on_entity_added(&mut self, entity: Entity, world: &World, ctx: &mut C) -> Result<()> {
        let rect = world.get::<Transform>(entity)?.rect();
        let tags = world.get::<Identity>(entity)?.tags.clone();
        let shape = ctx.space_mut().add(rect, tags, Some(entity));
        world.get_mut::<Collision>(entity)?.shape = Some(shape);
        self.shapes.insert(entity, shape);
        trace!(%entity, shape = shape.raw(), "shape added");
        Ok(())
    }

    fn on_entity_removed(&mut self, entity: Entity, world: &World, ctx: &mut C) -> Result<()> {
        if let Some(shape) = self.shapes.remove(&entity) {
            ctx.space_mut().remove(shape);
            trace!(%entity, shape = shape.raw(), "shape removed");
        }
        if let Ok(mut collision) = world.get_mut::<Collision>(entity) {
            collision.shape = None;
            collision.events.clear();
        }
        Ok(())
    }

    fn update(&mut self, frame: Frame<'_, C>) -> Result<()> {
        let space = frame.ctx.space_mut();
        for &entity in frame.members {
            if frame.world.has::<Velocity>(entity) {
                continue;
            }
            if let Some(&shape) = self.shapes.get(&entity) {
                space.set_rect(shape, frame.world.get::<Transform>(entity)?.rect());
            }
        }
        Ok(())
    }

    fn render(&self, frame: RenderFrame<'_, C>) -> Result<()> {
        if !frame.ctx.show_colliders() {
            return Ok(());
        }
        for &entity in frame.members {
            if let Some(shape) = self.shapes.get(&entity).and_then(|&id| frame.ctx.space().get(id)) {
                frame.queue.push(
                    RenderLayer::Debug,
                    Drawable::Outline {
                        rect: shape.rect,
                        color: colors::RED,
                    },
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::Tag;
    use crate::ecs::{EntityBuilder, Scheduler};
    use crate::physics::Space;
    use crate::render::RenderQueue;

    #[derive(Default)]
    struct Ctx {
        space: Space,
        show: bool,
    }

    impl PhysicsContext for Ctx {
        fn space(&self) -> &Space {
            &self.space
        }
        fn space_mut(&mut self) -> &mut Space {
            &mut self.space
        }
        fn collision_padding(&self) -> f64 {
            2.5
        }
        fn show_colliders(&self) -> bool {
            self.show
        }
    }

    fn block(world: &mut World) -> Entity {
        EntityBuilder::new()
            .with(Transform::at(0.0, 100.0, 50.0, 10.0))
            .with(Collision::new())
            .with(Identity::new(&[Tag::Ground]))
            .build(world)
            .unwrap()
    }

    #[test]
    fn test_shape_follows_entity_lifetime() {
        let mut world = World::new();
        let mut ctx = Ctx::default();
        let mut scheduler = Scheduler::<Ctx>::new();
        scheduler.add_system(CollisionSystem::new());

        let entity = block(&mut world);
        scheduler.sync(&mut world, &mut ctx).unwrap();
        assert_eq!(ctx.space.len(), 1);
        let shape = world.get::<Collision>(entity).unwrap().shape.unwrap();
        assert_eq!(ctx.space.get(shape).unwrap().owner, Some(entity));
        assert_eq!(ctx.space.filter_by_tag(Tag::Ground).len(), 1);

        world.queue_despawn(entity);
        scheduler.sync(&mut world, &mut ctx).unwrap();
        assert!(ctx.space.is_empty());
    }

    #[test]
    fn test_static_shape_resynced() {
        let mut world = World::new();
        let mut ctx = Ctx::default();
        let mut scheduler = Scheduler::<Ctx>::new();
        scheduler.add_system(CollisionSystem::new());

        let entity = block(&mut world);
        scheduler.update(&mut world, &mut ctx, 0.016).unwrap();
        world.get_mut::<Transform>(entity).unwrap().position.x = 40.0;
        scheduler.update(&mut world, &mut ctx, 0.016).unwrap();

        let shape = world.get::<Collision>(entity).unwrap().shape.unwrap();
        assert_eq!(ctx.space.get(shape).unwrap().rect.position.x, 40.0);
    }

    #[test]
    fn test_outlines_only_when_enabled() {
        let mut world = World::new();
        let mut ctx = Ctx::default();
        let mut scheduler = Scheduler::<Ctx>::new();
        scheduler.add_system(CollisionSystem::new());
        block(&mut world);
        scheduler.sync(&mut world, &mut ctx).unwrap();

        let mut queue = RenderQueue::new();
        scheduler.render(&world, &ctx, &mut queue).unwrap();
        assert!(queue.is_empty());

        ctx.show = true;
        scheduler.render(&world, &ctx, &mut queue).unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.commands()[0].layer, RenderLayer::Debug);
    }
}
