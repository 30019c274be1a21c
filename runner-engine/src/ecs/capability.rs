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
//! Capability queries
//!
//! A capability names the component kinds a system needs (and optionally the
//! kinds it refuses). The scheduler re-checks it only for entities whose
//! signature changed, so membership stays current without per-frame scans.

use std::any::TypeId;

use crate::ecs::world::Signature;
use crate::ecs::{Component, Entity, World};

/// Required and excluded component kinds
#[derive(Debug, Clone, Default)]
pub struct Capability {
    required: Vec<(TypeId, &'static str)>,
    excluded: Vec<(TypeId, &'static str)>,
}

impl Capability {
    /// A capability with no requirements; it matches no entity
    pub fn new() -> Self {
        Capability::default()
    }

    /// Require component `T`
    pub fn with<T: Component>(mut self) -> Self {
        self.required.push((TypeId::of::<T>(), T::component_name()));
        self
    }

    /// Exclude entities carrying component `T`
    pub fn without<T: Component>(mut self) -> Self {
        self.excluded.push((TypeId::of::<T>(), T::component_name()));
        self
    }

    /// Whether nothing is required
    pub fn is_empty(&self) -> bool {
        self.required.is_empty()
    }

    /// Names of the required kinds
    pub fn required_names(&self) -> Vec<&'static str> {
        self.required.iter().map(|(_, name)| *name).collect()
    }

    /// Resolve the kinds to signature masks for a given world.
    ///
    /// Returns `None` when a required kind was never registered, since no
    /// entity can carry it yet.
    fn masks(&self, world: &World) -> Option<(Signature, Signature)> {
        let mut required = Signature::EMPTY;
        for (type_id, _) in &self.required {
            required = required.with_bit(world.kind_bit(*type_id)?);
        }
        let excluded = self
            .excluded
            .iter()
            .filter_map(|(type_id, _)| world.kind_bit(*type_id))
            .fold(Signature::EMPTY, Signature::with_bit);
        Some((required, excluded))
    }

    /// Whether a live entity currently satisfies this capability
    pub fn matches(&self, world: &World, entity: Entity) -> bool {
        if self.is_empty() {
            return false;
        }
        let (Some(signature), Some((required, excluded))) =
            (world.signature(entity), self.masks(world))
        else {
            return false;
        };
        signature.contains_all(required) && !signature.intersects(excluded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct A;
    impl Component for A {}
    struct B;
    impl Component for B {}
    struct C;
    impl Component for C {}

    #[test]
    fn test_required_kinds() {
        let mut world = World::new();
        let e = world.create_entity();
        world.attach(e, A).unwrap();

        let cap = Capability::new().with::<A>().with::<B>();
        assert!(!cap.matches(&world, e));

        world.attach(e, B).unwrap();
        assert!(cap.matches(&world, e));
        assert_eq!(cap.required_names(), vec!["A", "B"]);
    }

    #[test]
    fn test_excluded_kinds() {
        let mut world = World::new();
        let e = world.create_entity();
        world.attach(e, A).unwrap();

        let cap = Capability::new().with::<A>().without::<C>();
        assert!(cap.matches(&world, e));

        world.attach(e, C).unwrap();
        assert!(!cap.matches(&world, e));
    }

    #[test]
    fn test_empty_capability_matches_nothing() {
        let mut world = World::new();
        let e = world.create_entity();
        world.attach(e, A).unwrap();
        assert!(!Capability::new().matches(&world, e));
    }

    #[test]
    fn test_unregistered_requirement() {
        let mut world = World::new();
        let e = world.create_entity();
        world.attach(e, A).unwrap();
        assert!(!Capability::new().with::<C>().matches(&world, e));
    }
}
