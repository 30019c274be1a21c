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
//! Collision space and physics systems
//!
//! [`Space`] is the spatial index. [`VelocitySystem`] integrates impulse
//! velocities against it, [`KinematicSystem`] integrates bodies that take no
//! part in collisions, and [`CollisionSystem`] keeps the index in step with
//! entity lifetimes.

mod collision;
mod space;
mod velocity;

pub use collision::CollisionSystem;
pub use space::{Resolution, Shape, ShapeFilter, ShapeId, Space};
pub use velocity::{integrate_body, KinematicSystem, VelocitySystem};

/// What the physics systems need from a scene context
pub trait PhysicsContext {
    /// The scene's spatial index
    fn space(&self) -> &Space;

    /// Mutable access to the spatial index
    fn space_mut(&mut self) -> &mut Space;

    /// Margin added around shapes when collecting collision events
    fn collision_padding(&self) -> f64;

    /// Whether collider outlines should be drawn
    fn show_colliders(&self) -> bool {
        false
    }
}
