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
//! Component storage and management
//!
//! Components are data containers attached to entities, at most one instance
//! per (entity, kind). Each kind lives in its own [`HashMapStorage`]; the
//! world keeps the storages type-erased behind [`ErasedStorage`] and wraps
//! them in a `RefCell` so a system can borrow several kinds at once.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;

use crate::ecs::Entity;
use crate::error::{EngineError, Result};

/// Trait that all components must implement
///
/// Components should be plain data structures without behavior.
pub trait Component: 'static + Send + Sync {
    /// Short, human-readable name used in error messages
    fn component_name() -> &'static str
    where
        Self: Sized,
    {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }
}

/// Storage interface for components
pub trait ComponentStorage {
    /// The component type this storage manages
    type Component: Component;

    /// Insert a component for the given entity, returning the previous one
    fn insert(&mut self, entity: Entity, component: Self::Component) -> Option<Self::Component>;

    /// Remove a component for the given entity
    fn remove(&mut self, entity: Entity) -> Option<Self::Component>;

    /// Get a reference to a component for the given entity
    fn get(&self, entity: Entity) -> Option<&Self::Component>;

    /// Get a mutable reference to a component for the given entity
    fn get_mut(&mut self, entity: Entity) -> Option<&mut Self::Component>;

    /// Check if an entity has this component
    fn contains(&self, entity: Entity) -> bool;

    /// Clear all components
    fn clear(&mut self);
}

/// HashMap-based component storage
pub struct HashMapStorage<T: Component> {
    components: HashMap<Entity, T>,
}

impl<T: Component> HashMapStorage<T> {
    /// Create a new empty storage
    pub fn new() -> Self {
        HashMapStorage {
            components: HashMap::new(),
        }
    }

    /// Number of stored components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the storage holds nothing
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Like [`ComponentStorage::get`] but reports a missing component as an error
    pub fn fetch(&self, entity: Entity) -> Result<&T> {
        self.components
            .get(&entity)
            .ok_or(EngineError::MissingComponent {
                entity,
                component: T::component_name(),
            })
    }

    /// Like [`ComponentStorage::get_mut`] but reports a missing component as an error
    pub fn fetch_mut(&mut self, entity: Entity) -> Result<&mut T> {
        self.components
            .get_mut(&entity)
            .ok_or(EngineError::MissingComponent {
                entity,
                component: T::component_name(),
            })
    }

    /// Iterate over `(entity, component)` pairs in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.components.iter().map(|(e, c)| (*e, c))
    }
}

impl<T: Component> Default for HashMapStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> ComponentStorage for HashMapStorage<T> {
    type Component = T;

    fn insert(&mut self, entity: Entity, component: Self::Component) -> Option<Self::Component> {
        self.components.insert(entity, component)
    }

    fn remove(&mut self, entity: Entity) -> Option<Self::Component> {
        self.components.remove(&entity)
    }

    fn get(&self, entity: Entity) -> Option<&Self::Component> {
        self.components.get(&entity)
    }

    fn get_mut(&mut self, entity: Entity) -> Option<&mut Self::Component> {
        self.components.get_mut(&entity)
    }

    fn contains(&self, entity: Entity) -> bool {
        self.components.contains_key(&entity)
    }

    fn clear(&mut self) {
        self.components.clear();
    }
}

/// Type-erased view of one component storage, used by the world to drop
/// components of destroyed entities without knowing their type.
pub(crate) trait ErasedStorage {
    fn remove_entity(&mut self, entity: Entity) -> bool;
    fn clear_all(&mut self);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ErasedStorage for RefCell<HashMapStorage<T>> {
    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.get_mut().remove(entity).is_some()
    }

    fn clear_all(&mut self) {
        self.get_mut().clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
