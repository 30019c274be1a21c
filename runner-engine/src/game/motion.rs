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
//! Constant velocities and out-of-bounds cleanup

use crate::ecs::components::{ConstantSpeed, DestroyBound, Transform, Velocity};
use crate::ecs::{Capability, Frame, System};
use crate::error::Result;
use crate::game::priority;

/// Adds each entity's constant speed to its velocity every frame
#[derive(Debug, Default)]
pub struct ConstantSpeedSystem;

impl<C> System<C> for ConstantSpeedSystem {
    fn name(&self) -> &str {
        "ConstantSpeedSystem"
    }

    fn priority(&self) -> i32 {
        priority::CONSTANT_SPEED
    }

    fn capability(&self) -> Capability {
        Capability::new().with::<ConstantSpeed>().with::<Velocity>()
    }

    fn update(&mut self, frame: Frame<'_, C>) -> Result<()> {
        for &entity in frame.members {
            let speed = frame.world.get::<ConstantSpeed>(entity)?.speed;
            frame.world.get_mut::<Velocity>(entity)?.value += speed;
        }
        Ok(())
    }
}

/// Despawns entities whose position left their bound
#[derive(Debug, Default)]
pub struct DestroyBoundSystem;

impl<C> System<C> for DestroyBoundSystem {
    fn name(&self) -> &str {
        "DestroyBoundSystem"
    }

    fn priority(&self) -> i32 {
        priority::DESTROY_BOUND
    }

    fn capability(&self) -> Capability {
        Capability::new().with::<Transform>().with::<DestroyBound>()
    }

    fn update(&mut self, frame: Frame<'_, C>) -> Result<()> {
        for &entity in frame.members {
            let position = frame.world.get::<Transform>(entity)?.position;
            if frame.world.get::<DestroyBound>(entity)?.is_outside(position) {
                frame.commands.despawn(entity);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{EntityBuilder, Scheduler, World};
    use crate::physics::KinematicSystem;
    use glam::DVec2;

    #[test]
    fn test_drifting_entity_is_destroyed_outside_bound() {
        let mut world = World::new();
        let mut scheduler = Scheduler::<()>::new();
        scheduler.add_system(ConstantSpeedSystem);
        scheduler.add_system(KinematicSystem);
        scheduler.add_system(DestroyBoundSystem);

        let entity = EntityBuilder::new()
            .with(Transform::at(0.0, 0.0, 1.0, 1.0))
            .with(Velocity::default())
            .with(ConstantSpeed {
                speed: DVec2::new(0.0, -100.0),
            })
            .with(DestroyBound {
                min: DVec2::new(0.0, -15.0),
                max: DVec2::new(100.0, 100.0),
            })
            .build(&mut world)
            .unwrap();

        scheduler.update(&mut world, &mut (), 0.1).unwrap();
        assert_eq!(world.get::<Transform>(entity).unwrap().position.y, -10.0);
        assert_eq!(world.get::<Velocity>(entity).unwrap().value, DVec2::ZERO);

        scheduler.update(&mut world, &mut (), 0.1).unwrap();
        assert!(!world.is_entity_alive(entity));
    }
}
