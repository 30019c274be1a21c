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
//! Scrolling, gravity, pickups and the player's frame
//!
//! The rule system runs right after input. It decides the scroll phase,
//! adds the scroll and gravity impulses, prunes what scrolled away, resolves
//! bullet and pickup contacts from the previous physics step, drives the
//! player state machine and keeps the level generated ahead of the frontier.

use std::collections::BTreeSet;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::GameConfig;
use crate::ecs::components::{
    Animation, Bullet, Collision, Enemy, Gravity, Life, MainGamePlayer, Movement, PlayerState,
    Scrollable, Sound, Tag, Transform, Velocity, Wrap,
};
use crate::ecs::{Capability, Commands, Entity, Frame, System, World};
use crate::error::Result;
use crate::game::entities;
use crate::game::{priority, step_player, GameContext, GameOutcome, GamePhase, LevelGenerator};
use crate::math::Rect;

/// Share of the base jump power a jump token adds
const JUMP_TOKEN_BONUS: f64 = 0.1;

/// Game rule and scroll system
#[derive(Debug)]
pub struct GameRuleSystem {
    generator: LevelGenerator,
}

impl GameRuleSystem {
    /// Rule system generating levels per `config`
    pub fn new(config: &GameConfig) -> Result<Self> {
        Ok(GameRuleSystem {
            generator: LevelGenerator::new(&config.level)?,
        })
    }

    fn update_phase(world: &World, players: &[Entity], ctx: &mut GameContext) -> Result<()> {
        if ctx.level.phase != GamePhase::Starting {
            return Ok(());
        }
        for &player in players {
            if world.get::<Transform>(player)?.position.x > ctx.config.scroll.start_threshold {
                ctx.level.phase = GamePhase::Scrolling;
                ctx.level.scroll_speed.x = ctx.config.scroll.start_speed;
                info!(speed = ctx.level.scroll_speed.x, "scrolling started");
                break;
            }
        }
        Ok(())
    }

    fn tick_boost(ctx: &mut GameContext, dt: Duration) {
        if ctx.level.boost_remaining.is_zero() {
            return;
        }
        ctx.level.boost_remaining = ctx.level.boost_remaining.saturating_sub(dt);
        if ctx.level.boost_remaining.is_zero() {
            ctx.level.scroll_speed.x = match ctx.level.phase {
                GamePhase::Scrolling => ctx.config.scroll.start_speed,
                GamePhase::Starting => 0.0,
            };
            debug!("speed boost over");
        }
    }

    /// Wrap, scroll impulse, gravity and pruning for one entity
    fn move_with_world(world: &World, entity: Entity, ctx: &GameContext, commands: &mut Commands, dt: f64) -> Result<()> {
        let wraps = world.has::<Wrap>(entity);
        if wraps {
            let threshold = world.get::<Wrap>(entity)?.threshold;
            let mut transform = world.get_mut::<Transform>(entity)?;
            if transform.position.x < -threshold {
                transform.position.x = threshold;
            }
        }

        let scrollable = world.has::<Scrollable>(entity);
        if scrollable && world.has::<Velocity>(entity) {
            let modifier = world.get::<Scrollable>(entity)?.modifier;
            world.get_mut::<Velocity>(entity)?.value += ctx.level.scroll_speed * modifier;
        }

        if world.has::<Gravity>(entity) && world.has::<Velocity>(entity) && world.has::<Collision>(entity) {
            let shape = world.get::<Collision>(entity)?.shape;
            if shape.is_some() {
                let rect = world.get::<Transform>(entity)?.rect();
                let below = ctx
                    .space
                    .filter_by_tag(Tag::Ground)
                    .resolve(rect, 0.0, ctx.level.gravity * dt, shape);
                if below.colliding() {
                    // Close the gap to the ground so the body rests on its top edge.
                    world.get_mut::<Transform>(entity)?.position.y = below.position.y;
                } else {
                    world.get_mut::<Velocity>(entity)?.value.y += ctx.level.gravity;
                }
            }
        }

        if scrollable && !wraps && world.get::<Transform>(entity)?.rect().right() < 0.0 {
            debug!(%entity, "scrolled off");
            commands.despawn(entity);
        }
        Ok(())
    }

    fn update_bullet(world: &World, entity: Entity, ctx: &GameContext, commands: &mut Commands) -> Result<()> {
        let rect = world.get::<Transform>(entity)?.rect();
        let bounds = Rect::new(0.0, 0.0, ctx.level.width, ctx.level.height);
        if !rect.overlaps(&bounds) {
            commands.despawn(entity);
            return Ok(());
        }

        let Ok(collision) = world.get::<Collision>(entity) else {
            return Ok(());
        };
        if collision.colliding_with(Tag::Ground) {
            commands.despawn(entity);
            return Ok(());
        }
        if let Some(enemy) = collision.entities_with(Tag::Enemy).next() {
            let damage = world.get::<Bullet>(entity)?.damage;
            if let Ok(mut life) = world.get_mut::<Life>(enemy) {
                life.damage(damage, Some(entity));
            }
            commands.despawn(entity);
        }
        Ok(())
    }

    fn update_player(world: &World, entity: Entity, ctx: &mut GameContext, commands: &mut Commands, dt: Duration) -> Result<()> {
        let collision = world.get::<Collision>(entity)?;
        let mut player = world.get_mut::<MainGamePlayer>(entity)?;

        let mut collected = BTreeSet::new();
        for token in collision.entities_with(Tag::JumpToken) {
            if collected.insert(token) {
                player.jump_power = (player.jump_power + player.base_jump_power * JUMP_TOKEN_BONUS).min(player.max_jump_power);
                debug!(jump_power = player.jump_power, "jump token");
                commands.despawn(token);
            }
        }
        for token in collision.entities_with(Tag::SpeedToken) {
            if collected.insert(token) {
                ctx.level.scroll_speed.x = ctx.config.scroll.start_speed * ctx.config.scroll.boost_factor;
                ctx.level.boost_remaining = ctx.config.scroll.boost_duration();
                debug!(speed = ctx.level.scroll_speed.x, "speed token");
                commands.despawn(token);
            }
        }

        if let Ok(mut life) = world.get_mut::<Life>(entity) {
            for enemy in collision.entities_with(Tag::Enemy) {
                if let Ok(stats) = world.get::<Enemy>(enemy) {
                    life.damage(stats.contact_damage, Some(enemy));
                }
            }
        }

        let mut transform = world.get_mut::<Transform>(entity)?;
        if collision.colliding_with(Tag::KillBox) {
            ctx.end_run(GameOutcome::KillBox);
        } else if transform.position.y > ctx.level.height {
            ctx.end_run(GameOutcome::FellOut);
        }

        let mut movement = world.get_mut::<Movement>(entity)?;
        let mut anim = world.get_mut::<Animation>(entity)?;
        let mut velocity = world.get_mut::<Velocity>(entity)?;
        let before = player.state;
        let spawn = step_player(
            &mut player,
            &movement.intents,
            collision.colliding_with(Tag::Ground),
            &mut anim,
            &mut transform,
            &mut velocity,
            dt,
        );
        if let Some(spawn) = spawn {
            commands.spawn(entities::bullet(spawn.position, spawn.speed, 1.0));
        }
        movement.reset_intents();

        let took_off = player.state == PlayerState::Jumping && before != PlayerState::Jumping;
        if took_off || !collected.is_empty() {
            if let Ok(mut sound) = world.get_mut::<Sound>(entity) {
                sound.trigger(if took_off { entities::JUMP_SOUND } else { entities::COLLECT_SOUND });
            }
        }
        Ok(())
    }

    fn generate(&self, ctx: &mut GameContext, commands: &mut Commands) {
        let (plans, frontier) = self.generator.plan_blocks(
            ctx.level.frontier,
            ctx.level.width,
            ctx.level.height,
            &mut ctx.rng,
        );
        ctx.level.frontier = frontier;

        for plan in plans {
            commands.spawn(entities::ground_block(plan.rect));
            if let Some(position) = plan.enemy {
                commands.spawn(entities::enemy(position, -ctx.config.level.enemy_speed));
            }
            if let Some(token) = plan.token {
                commands.spawn(entities::token(token.tag, token.position));
            }
        }
    }
}

impl System<GameContext> for GameRuleSystem {
    fn name(&self) -> &str {
        "GameRuleSystem"
    }

    fn priority(&self) -> i32 {
        priority::GAME_RULE
    }

    fn capability(&self) -> Capability {
        Capability::new().with::<Transform>()
    }

    fn update(&mut self, frame: Frame<'_, GameContext>) -> Result<()> {
        let Frame {
            world,
            members,
            commands,
            ctx,
            dt,
        } = frame;
        let step = Duration::from_secs_f64(dt.max(0.0));
        ctx.elapsed += step;

        let players: Vec<Entity> = members
            .iter()
            .copied()
            .filter(|&entity| world.has::<MainGamePlayer>(entity))
            .collect();

        Self::update_phase(world, &players, ctx)?;
        Self::tick_boost(ctx, step);

        for &entity in members {
            Self::move_with_world(world, entity, ctx, commands, dt)?;
            if world.has::<Bullet>(entity) {
                Self::update_bullet(world, entity, ctx, commands)?;
            }
        }
        for &player in &players {
            Self::update_player(world, player, ctx, commands, step)?;
        }

        ctx.level.frontier += ctx.level.scroll_speed.x * dt;
        self.generate(ctx, commands);
        Ok(())
    }
}
