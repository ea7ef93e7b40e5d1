//! ECS World implementation

use std::any::{type_name, TypeId};
use std::collections::HashMap;

use slotmap::SlotMap;

use super::storage::{ComponentColumn, ComponentStorage};
use super::{Component, EcsError, Entity};

/// ECS World containing all entities and components
///
/// Lookup by (component type, entity) is two hash/slot probes. A missing
/// component is reported as [`EcsError::MissingComponent`], which callers
/// treat as a programming error rather than a recoverable condition.
pub struct World {
    entities: SlotMap<Entity, ()>,
    component_storages: HashMap<TypeId, Box<dyn ComponentColumn>>,
}

impl World {
    /// Create a new world
    pub fn new() -> Self {
        Self {
            entities: SlotMap::with_key(),
            component_storages: HashMap::new(),
        }
    }

    /// Create a new entity
    pub fn create_entity(&mut self) -> Entity {
        self.entities.insert(())
    }

    /// Destroy an entity and drop all of its components
    pub fn destroy_entity(&mut self, entity: Entity) -> Result<(), EcsError> {
        self.entities
            .remove(entity)
            .ok_or(EcsError::DeadEntity(entity))?;
        for storage in self.component_storages.values_mut() {
            storage.remove_entity(entity);
        }
        Ok(())
    }

    /// Whether the entity exists
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.contains_key(entity)
    }

    /// Number of live entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Add a component to an entity, replacing any previous value
    pub fn add_component<T: Component>(&mut self, entity: Entity, component: T) -> Result<(), EcsError> {
        if !self.is_alive(entity) {
            return Err(EcsError::DeadEntity(entity));
        }
        self.storage_mut_or_insert::<T>()?.insert(entity, component);
        Ok(())
    }

    /// Whether the entity has a component of type `T`
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.storage::<T>().is_some_and(|storage| storage.contains(entity))
    }

    /// Get a component from an entity
    pub fn get_component<T: Component>(&self, entity: Entity) -> Result<&T, EcsError> {
        self.storage::<T>()
            .and_then(|storage| storage.get(entity))
            .ok_or_else(|| self.missing::<T>(entity))
    }

    /// Get a mutable component from an entity
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut T, EcsError> {
        let error = self.missing::<T>(entity);
        self.component_storages
            .get_mut(&TypeId::of::<T>())
            .and_then(|column| column.as_any_mut().downcast_mut::<ComponentStorage<T>>())
            .and_then(|storage| storage.get_mut(entity))
            .ok_or(error)
    }

    /// Iterate over every entity carrying a component of type `T`
    pub fn query<T: Component>(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.storage::<T>().into_iter().flat_map(|storage| storage.iter())
    }

    /// Get an iterator over all entities
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.keys()
    }

    fn missing<T: Component>(&self, entity: Entity) -> EcsError {
        if self.is_alive(entity) {
            EcsError::MissingComponent {
                entity,
                component: type_name::<T>(),
            }
        } else {
            EcsError::DeadEntity(entity)
        }
    }

    fn storage<T: Component>(&self) -> Option<&ComponentStorage<T>> {
        self.component_storages
            .get(&TypeId::of::<T>())
            .and_then(|column| column.as_any().downcast_ref::<ComponentStorage<T>>())
    }

    fn storage_mut_or_insert<T: Component>(&mut self) -> Result<&mut ComponentStorage<T>, EcsError> {
        self.component_storages
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(ComponentStorage::<T>::new()))
            .as_any_mut()
            .downcast_mut::<ComponentStorage<T>>()
            .ok_or(EcsError::ColumnMismatch {
                component: type_name::<T>(),
            })
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
