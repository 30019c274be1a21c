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
//! System execution framework
//!
//! Systems hold the logic that operates on entities and components. Each
//! system declares a [`Capability`], a fixed priority and optional lifecycle
//! hooks; the [`Scheduler`](crate::ecs::Scheduler) keeps its member set in sync.
//!
//! `C` is the context every system of a scene shares (level state, spatial
//! index, random source and so on).

use std::collections::BTreeSet;

use crate::ecs::{Capability, Commands, Entity, World};
use crate::error::Result;
use crate::render::RenderQueue;

/// Everything a system sees during its update
pub struct Frame<'a, C> {
    /// Component data; structural changes go through `commands`
    pub world: &'a World,
    /// Entities currently satisfying the system's capability
    pub members: &'a BTreeSet<Entity>,
    /// Deferred spawns, edits and despawns, applied after this update returns
    pub commands: &'a mut Commands,
    /// Shared scene context
    pub ctx: &'a mut C,
    /// Seconds since the previous frame
    pub dt: f64,
}

/// Everything a system sees during the render pass
pub struct RenderFrame<'a, C> {
    /// Component data
    pub world: &'a World,
    /// Entities currently satisfying the system's capability
    pub members: &'a BTreeSet<Entity>,
    /// Shared scene context
    pub ctx: &'a C,
    /// Queue shared by every render system this frame
    pub queue: &'a mut RenderQueue,
}

/// Trait for systems driven by the scheduler
pub trait System<C> {
    /// Get the name of this system for debugging
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Execution order; lower runs first in both passes
    fn priority(&self) -> i32;

    /// Component kinds an entity needs to become a member
    fn capability(&self) -> Capability;

    /// Called once when an entity starts satisfying the capability
    fn on_entity_added(&mut self, _entity: Entity, _world: &World, _ctx: &mut C) -> Result<()> {
        Ok(())
    }

    /// Called once when an entity stops satisfying the capability or is
    /// destroyed; its components are still readable
    fn on_entity_removed(&mut self, _entity: Entity, _world: &World, _ctx: &mut C) -> Result<()> {
        Ok(())
    }

    /// Per-frame logic
    fn update(&mut self, frame: Frame<'_, C>) -> Result<()>;

    /// Enqueue draw commands
    fn render(&self, _frame: RenderFrame<'_, C>) -> Result<()> {
        Ok(())
    }
}
