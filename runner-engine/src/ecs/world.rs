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
//! World management
//!
//! The World owns every entity and component. Each live entity carries a
//! [`Signature`] bitmask with one bit per registered component kind, which
//! lets capability checks run without touching the storages.

use std::any::TypeId;
use std::cell::{Ref, RefCell, RefMut};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use crate::ecs::component::{ComponentStorage, ErasedStorage};
use crate::ecs::{Component, Entity, HashMapStorage};
use crate::error::{EngineError, Result};

/// Maximum number of distinct component kinds a world can register
pub const MAX_COMPONENT_KINDS: usize = 64;

/// Bitmask of the component kinds an entity carries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Signature(u64);

impl Signature {
    /// Signature with no bits set
    pub const EMPTY: Signature = Signature(0);

    /// Whether every bit of `other` is also set here
    pub fn contains_all(&self, other: Signature) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether any bit of `other` is also set here
    pub fn intersects(&self, other: Signature) -> bool {
        self.0 & other.0 != 0
    }

    /// Number of kinds in the signature
    pub fn count(&self) -> u32 {
        self.0.count_ones()
    }

    pub(crate) fn with_bit(self, bit: usize) -> Signature {
        Signature(self.0 | (1 << bit))
    }

    pub(crate) fn without_bit(self, bit: usize) -> Signature {
        Signature(self.0 & !(1 << bit))
    }
}

struct ComponentKind {
    bit: usize,
    name: &'static str,
}

/// The main ECS world container
///
/// World manages entity lifecycles and serves as the central
/// access point for all component data. Structural changes (attach, detach,
/// destroy) need `&mut World`; component reads and writes only need `&World`.
pub struct World {
    next_entity_id: u64,
    signatures: BTreeMap<Entity, Signature>,
    kinds: HashMap<TypeId, ComponentKind>,
    storages: HashMap<TypeId, Box<dyn ErasedStorage>>,
    changed: BTreeSet<Entity>,
    pending_despawn: Vec<Entity>,
}

impl World {
    /// Create a new empty world
    pub fn new() -> Self {
        World {
            next_entity_id: 0,
            signatures: BTreeMap::new(),
            kinds: HashMap::new(),
            storages: HashMap::new(),
            changed: BTreeSet::new(),
            pending_despawn: Vec::new(),
        }
    }

    /// Create a new entity with no components
    pub fn create_entity(&mut self) -> Entity {
        let entity = Entity::from_raw(self.next_entity_id);
        self.next_entity_id += 1;
        self.signatures.insert(entity, Signature::EMPTY);
        self.changed.insert(entity);
        entity
    }

    /// Register a component kind, assigning it a signature bit.
    ///
    /// Attaching a component registers its kind implicitly.
    pub fn register<T: Component>(&mut self) -> Result<()> {
        let type_id = TypeId::of::<T>();
        if self.kinds.contains_key(&type_id) {
            return Ok(());
        }
        let bit = self.kinds.len();
        if bit >= MAX_COMPONENT_KINDS {
            return Err(EngineError::TooManyComponentKinds(
                T::component_name(),
                MAX_COMPONENT_KINDS,
            ));
        }
        self.kinds.insert(
            type_id,
            ComponentKind {
                bit,
                name: T::component_name(),
            },
        );
        self.storages.insert(
            type_id,
            Box::new(RefCell::new(HashMapStorage::<T>::new())),
        );
        debug!(component = T::component_name(), bit, "registered component kind");
        Ok(())
    }

    /// Whether a component kind has been registered
    pub fn is_registered<T: Component>(&self) -> bool {
        self.kinds.contains_key(&TypeId::of::<T>())
    }

    /// Signature bit of a registered kind
    pub(crate) fn kind_bit(&self, type_id: TypeId) -> Option<usize> {
        self.kinds.get(&type_id).map(|kind| kind.bit)
    }

    /// Attach a component, replacing any previous instance of the same kind
    pub fn attach<T: Component>(&mut self, entity: Entity, component: T) -> Result<()> {
        if !self.is_entity_alive(entity) {
            return Err(EngineError::DeadEntity(entity));
        }
        self.register::<T>()?;
        let type_id = TypeId::of::<T>();
        let bit = self.kind_bit(type_id).ok_or(EngineError::UnregisteredComponent(
            T::component_name(),
        ))?;

        self.typed_storage_mut::<T>()?.insert(entity, component);

        if let Some(signature) = self.signatures.get_mut(&entity) {
            *signature = signature.with_bit(bit);
        }
        self.changed.insert(entity);
        Ok(())
    }

    /// Detach a component, returning it if the entity had one
    pub fn detach<T: Component>(&mut self, entity: Entity) -> Result<Option<T>> {
        if !self.is_entity_alive(entity) {
            return Err(EngineError::DeadEntity(entity));
        }
        let Some(bit) = self.kind_bit(TypeId::of::<T>()) else {
            return Ok(None);
        };

        let removed = self.typed_storage_mut::<T>()?.remove(entity);
        if removed.is_some() {
            if let Some(signature) = self.signatures.get_mut(&entity) {
                *signature = signature.without_bit(bit);
            }
            self.changed.insert(entity);
        }
        Ok(removed)
    }

    /// Check whether an entity carries a component kind
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        match (
            self.signatures.get(&entity),
            self.kind_bit(TypeId::of::<T>()),
        ) {
            (Some(signature), Some(bit)) => signature.contains_all(Signature::EMPTY.with_bit(bit)),
            _ => false,
        }
    }

    /// Borrow one component
    pub fn get<T: Component>(&self, entity: Entity) -> Result<Ref<'_, T>> {
        let missing = EngineError::MissingComponent {
            entity,
            component: T::component_name(),
        };
        let storage = match self.storage::<T>() {
            Ok(storage) => storage,
            Err(EngineError::UnregisteredComponent(_)) => return Err(missing),
            Err(err) => return Err(err),
        };
        Ref::filter_map(storage, |s| s.get(entity)).map_err(|_| missing)
    }

    /// Mutably borrow one component
    pub fn get_mut<T: Component>(&self, entity: Entity) -> Result<RefMut<'_, T>> {
        let missing = EngineError::MissingComponent {
            entity,
            component: T::component_name(),
        };
        let storage = match self.storage_mut::<T>() {
            Ok(storage) => storage,
            Err(EngineError::UnregisteredComponent(_)) => return Err(missing),
            Err(err) => return Err(err),
        };
        RefMut::filter_map(storage, |s| s.get_mut(entity)).map_err(|_| missing)
    }

    /// Borrow the whole storage of a component kind
    pub fn storage<T: Component>(&self) -> Result<Ref<'_, HashMapStorage<T>>> {
        self.cell::<T>()?
            .try_borrow()
            .map_err(|_| EngineError::StorageBorrowed(T::component_name()))
    }

    /// Mutably borrow the whole storage of a component kind
    pub fn storage_mut<T: Component>(&self) -> Result<RefMut<'_, HashMapStorage<T>>> {
        self.cell::<T>()?
            .try_borrow_mut()
            .map_err(|_| EngineError::StorageBorrowed(T::component_name()))
    }

    fn cell<T: Component>(&self) -> Result<&RefCell<HashMapStorage<T>>> {
        self.storages
            .get(&TypeId::of::<T>())
            .and_then(|s| s.as_any().downcast_ref::<RefCell<HashMapStorage<T>>>())
            .ok_or(EngineError::UnregisteredComponent(T::component_name()))
    }

    fn typed_storage_mut<T: Component>(&mut self) -> Result<&mut HashMapStorage<T>> {
        self.storages
            .get_mut(&TypeId::of::<T>())
            .and_then(|s| s.as_any_mut().downcast_mut::<RefCell<HashMapStorage<T>>>())
            .map(RefCell::get_mut)
            .ok_or(EngineError::UnregisteredComponent(T::component_name()))
    }

    /// Signature of a live entity
    pub fn signature(&self, entity: Entity) -> Option<Signature> {
        self.signatures.get(&entity).copied()
    }

    /// Names of the component kinds an entity carries, for diagnostics
    pub fn component_names(&self, entity: Entity) -> Vec<&'static str> {
        let Some(signature) = self.signature(entity) else {
            return Vec::new();
        };
        let mut names: Vec<_> = self
            .kinds
            .values()
            .filter(|kind| signature.contains_all(Signature::EMPTY.with_bit(kind.bit)))
            .map(|kind| (kind.bit, kind.name))
            .collect();
        names.sort_unstable();
        names.into_iter().map(|(_, name)| name).collect()
    }

    /// Ask for an entity to be destroyed at the scheduler's next sync point
    pub fn queue_despawn(&mut self, entity: Entity) {
        self.pending_despawn.push(entity);
    }

    pub(crate) fn take_pending_despawns(&mut self) -> Vec<Entity> {
        std::mem::take(&mut self.pending_despawn)
    }

    pub(crate) fn take_changed(&mut self) -> BTreeSet<Entity> {
        std::mem::take(&mut self.changed)
    }

    /// Remove an entity and all of its components.
    ///
    /// Systems are not notified; the scheduler calls this only after every
    /// system holding the entity has seen `on_entity_removed`.
    pub(crate) fn destroy_entity(&mut self, entity: Entity) -> bool {
        if self.signatures.remove(&entity).is_none() {
            return false;
        }
        for storage in self.storages.values_mut() {
            storage.remove_entity(entity);
        }
        self.changed.remove(&entity);
        true
    }

    /// Check if an entity is alive
    pub fn is_entity_alive(&self, entity: Entity) -> bool {
        self.signatures.contains_key(&entity)
    }

    /// Get the number of alive entities
    pub fn entity_count(&self) -> usize {
        self.signatures.len()
    }

    /// Iterate over alive entities in creation order
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.signatures.keys().copied()
    }

    /// Drop every entity and component, keeping registered kinds.
    ///
    /// Entity ids keep counting up so stale handles never alias new entities.
    pub(crate) fn clear(&mut self) {
        self.signatures.clear();
        for storage in self.storages.values_mut() {
            storage.clear_all();
        }
        self.changed.clear();
        self.pending_despawn.clear();
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
