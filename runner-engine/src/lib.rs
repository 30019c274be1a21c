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
//! # Runner Engine
//!
//! Core of a 2D side-scrolling runner with a rhythm mini game, built on a
//! small ECS (Entity Component System) runtime.
//!
//! ## Features
//!
//! - **ECS Architecture**: entities, bitmask signatures and capability queries
//! - **Scheduler**: priority-ordered systems with deferred structural changes
//! - **Spatial Index**: tagged rectangles with swept X-then-Y collision resolution
//! - **Game Rules**: player state machine, scrolling, procedural level generation
//! - **Render Queue**: layered draw commands flushed back to front
//! - **Scenes**: title menu, main game and a karaoke rhythm scene
//! - **Parallelization**: optional Rayon pool for background asset decoding
//!
//! ## Example
//!
//! ```rust
//! use runner_engine::ecs::components::{Transform, Velocity};
//! use runner_engine::ecs::{EntityBuilder, Scheduler, World};
//! use runner_engine::physics::KinematicSystem;
//! use glam::DVec2;
//!
//! let mut world = World::new();
//! let mut scheduler = Scheduler::<()>::new();
//! scheduler.add_system(KinematicSystem);
//!
//! let entity = EntityBuilder::new()
//!     .with(Transform::at(0.0, 0.0, 10.0, 10.0))
//!     .with(Velocity { value: DVec2::new(60.0, 0.0) })
//!     .build(&mut world)
//!     .unwrap();
//!
//! scheduler.update(&mut world, &mut (), 0.5).unwrap();
//! assert_eq!(world.get::<Transform>(entity).unwrap().position.x, 30.0);
//! ```

#![warn(missing_docs)]

/// Game configuration loaded from RON
pub mod config;

/// Entity Component System implementation
pub mod ecs;

/// Error types
pub mod error;

/// Main game rules and systems
pub mod game;

/// Tracing subscriber setup
pub mod logging;

/// Rectangles and geometry helpers
pub mod math;

/// Spatial index and physics systems
pub mod physics;

/// Assets, audio, fonts and input devices
pub mod platform;

/// Render command queue and render systems
pub mod render;

/// Scenes and the scene controller
pub mod scene;

pub use ecs::{World, Entity};
pub use error::{EngineError, Result};
