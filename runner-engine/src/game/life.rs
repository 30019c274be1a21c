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
//! Damage, invincibility and death

use std::time::Duration;

use tracing::debug;

use crate::ecs::components::{Identity, Life, Sprite, Tag};
use crate::ecs::{Capability, Frame, System};
use crate::error::Result;
use crate::game::{priority, GameContext, GameOutcome};

/// Applies pending damage to every Life entity.
///
/// Damage received during an invincibility window is discarded. Each hit
/// that lands starts a new window, shown by inverting the sprite colours.
/// Entities at zero hit points are despawned; the player's death ends the
/// run.
#[derive(Debug, Default)]
pub struct LifeSystem;

impl System<GameContext> for LifeSystem {
    fn name(&self) -> &str {
        "LifeSystem"
    }

    fn priority(&self) -> i32 {
        priority::LIFE
    }

    fn capability(&self) -> Capability {
        Capability::new().with::<Life>()
    }

    fn update(&mut self, frame: Frame<'_, GameContext>) -> Result<()> {
        let dt = Duration::from_secs_f64(frame.dt.max(0.0));

        for &entity in frame.members {
            let mut life = frame.world.get_mut::<Life>(entity)?;
            let mut sprite = frame.world.get_mut::<Sprite>(entity).ok();

            if life.is_invincible() {
                life.invincibility_remaining = life.invincibility_remaining.saturating_sub(dt);
                life.damage_events.clear();
                if !life.is_invincible() {
                    if let Some(sprite) = sprite.as_mut() {
                        sprite.invert_color = false;
                    }
                }
                continue;
            }

            let damage: f64 = life.damage_events.drain(..).map(|event| event.amount).sum();
            if damage <= 0.0 {
                continue;
            }
            life.hp -= damage;
            debug!(%entity, damage, hp = life.hp, "damaged");

            if !life.invincibility.is_zero() {
                life.invincibility_remaining = life.invincibility;
                if let Some(sprite) = sprite.as_mut() {
                    sprite.invert_color = true;
                }
            }

            if life.hp <= 0.0 {
                frame.commands.despawn(entity);
                let is_player = frame
                    .world
                    .get::<Identity>(entity)
                    .map(|identity| identity.has(Tag::Player))
                    .unwrap_or(false);
                if is_player {
                    frame.ctx.end_run(GameOutcome::Died);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::ecs::{EntityBuilder, Scheduler, World};
    use crate::render::RenderLayer;

    fn setup() -> (World, Scheduler<GameContext>, GameContext) {
        let mut scheduler = Scheduler::new();
        scheduler.add_system(LifeSystem);
        (World::new(), scheduler, GameContext::new(GameConfig::default(), 1))
    }

    #[test]
    fn test_damage_starts_invincibility() {
        let (mut world, mut scheduler, mut ctx) = setup();
        let entity = EntityBuilder::new()
            .with(Life::new(3.0, Duration::from_millis(100)))
            .with(Sprite::new("whale/idle", RenderLayer::Objects))
            .build(&mut world)
            .unwrap();
        scheduler.sync(&mut world, &mut ctx).unwrap();

        world.get_mut::<Life>(entity).unwrap().damage(1.0, None);
        scheduler.update(&mut world, &mut ctx, 0.05).unwrap();
        assert_eq!(world.get::<Life>(entity).unwrap().hp, 2.0);
        assert!(world.get::<Sprite>(entity).unwrap().invert_color);

        // Ignored while invincible
        world.get_mut::<Life>(entity).unwrap().damage(1.0, None);
        scheduler.update(&mut world, &mut ctx, 0.05).unwrap();
        assert_eq!(world.get::<Life>(entity).unwrap().hp, 2.0);
        assert!(world.get::<Life>(entity).unwrap().damage_events.is_empty());

        scheduler.update(&mut world, &mut ctx, 0.05).unwrap();
        assert!(!world.get::<Life>(entity).unwrap().is_invincible());
        assert!(!world.get::<Sprite>(entity).unwrap().invert_color);

        world.get_mut::<Life>(entity).unwrap().damage(1.0, None);
        scheduler.update(&mut world, &mut ctx, 0.05).unwrap();
        assert_eq!(world.get::<Life>(entity).unwrap().hp, 1.0);
    }

    #[test]
    fn test_player_death_ends_run() {
        let (mut world, mut scheduler, mut ctx) = setup();
        let player = EntityBuilder::new()
            .with(Life::new(1.0, Duration::ZERO))
            .with(Identity::new(&[Tag::Player]))
            .build(&mut world)
            .unwrap();
        scheduler.sync(&mut world, &mut ctx).unwrap();

        world.get_mut::<Life>(player).unwrap().damage(2.0, None);
        scheduler.update(&mut world, &mut ctx, 0.016).unwrap();
        assert!(!world.is_entity_alive(player));
        assert_eq!(ctx.outcome, Some(GameOutcome::Died));
    }
}
