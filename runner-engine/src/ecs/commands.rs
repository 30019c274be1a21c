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
//! Deferred structural changes
//!
//! Systems only see `&World` during their update, so spawning, attaching,
//! detaching and despawning go through a [`Commands`] buffer. The scheduler
//! applies the buffer right after the system that filled it returns.

use tracing::debug;

use crate::ecs::{Component, Entity, World};
use crate::error::{EngineError, Result};

type Insert = Box<dyn FnOnce(&mut World, Entity) -> Result<()>>;

/// A bundle of components to attach to a new entity
#[derive(Default)]
pub struct EntityBuilder {
    inserts: Vec<Insert>,
}

impl EntityBuilder {
    /// Start an empty bundle
    pub fn new() -> Self {
        EntityBuilder::default()
    }

    /// Add a component to the bundle
    pub fn with<T: Component>(mut self, component: T) -> Self {
        self.inserts.push(Box::new(move |world: &mut World, entity: Entity| {
            world.attach(entity, component)
        }));
        self
    }

    /// Add a component only when `component` is `Some`
    pub fn with_optional<T: Component>(self, component: Option<T>) -> Self {
        match component {
            Some(component) => self.with(component),
            None => self,
        }
    }

    /// Number of components in the bundle
    pub fn len(&self) -> usize {
        self.inserts.len()
    }

    /// Whether the bundle is empty
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty()
    }

    /// Create the entity immediately
    pub fn build(self, world: &mut World) -> Result<Entity> {
        let entity = world.create_entity();
        for insert in self.inserts {
            insert(world, entity)?;
        }
        Ok(entity)
    }
}

enum Command {
    Spawn(EntityBuilder),
    Edit(Entity, Insert),
    Despawn(Entity),
}

/// Buffer of structural changes recorded during a system update
#[derive(Default)]
pub struct Commands {
    queue: Vec<Command>,
}

impl Commands {
    /// Create an empty buffer
    pub fn new() -> Self {
        Commands::default()
    }

    /// Spawn an entity from a bundle
    pub fn spawn(&mut self, builder: EntityBuilder) {
        self.queue.push(Command::Spawn(builder));
    }

    /// Attach (or replace) a component on an existing entity
    pub fn insert<T: Component>(&mut self, entity: Entity, component: T) {
        self.queue.push(Command::Edit(
            entity,
            Box::new(move |world: &mut World, entity: Entity| {
                world.attach(entity, component)
            }),
        ));
    }

    /// Detach a component from an existing entity
    pub fn remove<T: Component>(&mut self, entity: Entity) {
        self.queue.push(Command::Edit(
            entity,
            Box::new(|world: &mut World, entity: Entity| {
                world.detach::<T>(entity).map(|_| ())
            }),
        ));
    }

    /// Destroy an entity once every system has been told
    pub fn despawn(&mut self, entity: Entity) {
        self.queue.push(Command::Despawn(entity));
    }

    /// Number of recorded commands
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is recorded
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Apply every recorded command in order.
    ///
    /// Edits aimed at entities that died earlier in the frame are dropped.
    pub fn apply(&mut self, world: &mut World) -> Result<()> {
        for command in self.queue.drain(..) {
            match command {
                Command::Spawn(builder) => {
                    let entity = builder.build(world)?;
                    debug!(%entity, "spawned");
                }
                Command::Edit(entity, edit) => match edit(world, entity) {
                    Err(EngineError::DeadEntity(_)) => {
                        debug!(%entity, "skipping edit on dead entity");
                    }
                    other => other?,
                },
                Command::Despawn(entity) => world.queue_despawn(entity),
            }
        }
        Ok(())
    }
}
