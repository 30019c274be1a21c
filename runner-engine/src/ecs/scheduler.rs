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
//! Priority-ordered system scheduler
//!
//! Systems run in ascending priority, first the update pass and then the
//! render pass into one shared queue. Systems with equal priority keep their
//! registration order. After every system update the scheduler applies that
//! system's deferred commands and re-syncs memberships, so a despawn requested
//! by one system is never observed mid-iteration and is gone from every member
//! set before the next system runs.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::ecs::{Capability, Commands, Entity, Frame, RenderFrame, System, World};
use crate::error::Result;
use crate::render::RenderQueue;

/// A system with its resolved capability and current members
struct ScheduledSystem<C> {
    system: Box<dyn System<C>>,
    priority: i32,
    capability: Capability,
    members: BTreeSet<Entity>,
}

/// System scheduler
///
/// # Examples
///
/// ```
/// use runner_engine::ecs::{Capability, Frame, Scheduler, System, World};
///
/// struct Counter(u32);
/// impl System<()> for Counter {
///     fn priority(&self) -> i32 { 0 }
///     fn capability(&self) -> Capability { Capability::new() }
///     fn update(&mut self, _frame: Frame<'_, ()>) -> runner_engine::Result<()> {
///         self.0 += 1;
///         Ok(())
///     }
/// }
///
/// let mut scheduler = Scheduler::new();
/// scheduler.add_system(Counter(0));
/// let mut world = World::new();
/// scheduler.update(&mut world, &mut (), 1.0 / 60.0).unwrap();
/// ```
pub struct Scheduler<C> {
    systems: Vec<ScheduledSystem<C>>,
    commands: Commands,
}

impl<C> Scheduler<C> {
    /// Create a new scheduler
    pub fn new() -> Self {
        Scheduler {
            systems: Vec::new(),
            commands: Commands::new(),
        }
    }

    /// Register a system, keeping the list sorted by priority.
    ///
    /// Existing entities join on the next [`sync`](Self::sync).
    pub fn add_system<S: System<C> + 'static>(&mut self, system: S) {
        let priority = system.priority();
        let capability = system.capability();
        let index = self
            .systems
            .partition_point(|scheduled| scheduled.priority <= priority);
        debug!(system = system.name(), priority, "adding system");
        self.systems.insert(
            index,
            ScheduledSystem {
                system: Box::new(system),
                priority,
                capability,
                members: BTreeSet::new(),
            },
        );
    }

    /// Get the number of registered systems
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// System names in execution order
    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.system.name()).collect()
    }

    /// Members of the first system with the given name
    pub fn members_of(&self, name: &str) -> Option<&BTreeSet<Entity>> {
        self.systems
            .iter()
            .find(|s| s.system.name() == name)
            .map(|s| &s.members)
    }

    /// Whether any system currently holds `entity`
    pub fn is_member_anywhere(&self, entity: Entity) -> bool {
        self.systems.iter().any(|s| s.members.contains(&entity))
    }

    /// Bring every member set up to date with the world.
    ///
    /// Queued despawns are handled first: every system holding the entity is
    /// notified, then the entity is destroyed. Entities whose signature
    /// changed are then re-checked against each capability.
    pub fn sync(&mut self, world: &mut World, ctx: &mut C) -> Result<()> {
        loop {
            let despawns = world.take_pending_despawns();
            if despawns.is_empty() {
                break;
            }
            for entity in despawns {
                self.destroy_entity(world, ctx, entity)?;
            }
        }

        for entity in world.take_changed() {
            if !world.is_entity_alive(entity) {
                continue;
            }
            for scheduled in &mut self.systems {
                let matches = scheduled.capability.matches(world, entity);
                let present = scheduled.members.contains(&entity);
                if matches && !present {
                    scheduled.members.insert(entity);
                    scheduled.system.on_entity_added(entity, world, ctx)?;
                } else if !matches && present {
                    scheduled.members.remove(&entity);
                    scheduled.system.on_entity_removed(entity, world, ctx)?;
                }
            }
        }
        Ok(())
    }

    /// Notify every system holding `entity`, then destroy it.
    ///
    /// Returns `false` when the entity was already gone.
    pub fn destroy_entity(&mut self, world: &mut World, ctx: &mut C, entity: Entity) -> Result<bool> {
        if !world.is_entity_alive(entity) {
            return Ok(false);
        }
        for scheduled in &mut self.systems {
            if scheduled.members.remove(&entity) {
                scheduled.system.on_entity_removed(entity, world, ctx)?;
            }
        }
        world.destroy_entity(entity);
        trace!(%entity, "destroyed");
        Ok(true)
    }

    /// Run the update pass
    pub fn update(&mut self, world: &mut World, ctx: &mut C, dt: f64) -> Result<()> {
        self.sync(world, ctx)?;

        for index in 0..self.systems.len() {
            let ScheduledSystem {
                system, members, ..
            } = &mut self.systems[index];
            system.update(Frame {
                world: &*world,
                members: &*members,
                commands: &mut self.commands,
                ctx: &mut *ctx,
                dt,
            })?;

            self.commands.apply(world)?;
            self.sync(world, ctx)?;
        }
        Ok(())
    }

    /// Run the render pass into `queue`
    pub fn render(&self, world: &World, ctx: &C, queue: &mut RenderQueue) -> Result<()> {
        for scheduled in &self.systems {
            scheduled.system.render(RenderFrame {
                world,
                members: &scheduled.members,
                ctx,
                queue: &mut *queue,
            })?;
        }
        Ok(())
    }

    /// Destroy every entity, notifying systems, and leave the world empty
    pub fn shutdown(&mut self, world: &mut World, ctx: &mut C) -> Result<()> {
        let entities: Vec<Entity> = world.entities().collect();
        for entity in entities {
            self.destroy_entity(world, ctx, entity)?;
        }
        world.clear();
        Ok(())
    }
}

impl<C> Default for Scheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}
