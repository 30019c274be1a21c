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
//! Entity Component System (ECS) core implementation
//!
//! This module provides:
//! - Entity management with never-reused ids
//! - Per-kind component storage behind a signature bitmask registry
//! - Capability queries kept current incrementally
//! - A priority-ordered scheduler with deferred structural changes

mod capability;
mod commands;
mod component;
mod entity;
mod scheduler;
mod system;
mod world;

/// Game component definitions
pub mod components;

pub use capability::Capability;
pub use commands::{Commands, EntityBuilder};
pub use component::{Component, ComponentStorage, HashMapStorage};
pub use entity::Entity;
pub use scheduler::Scheduler;
pub use system::{Frame, RenderFrame, System};
pub use world::{Signature, World, MAX_COMPONENT_KINDS};
