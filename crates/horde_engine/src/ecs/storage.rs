//! Component storage
//!
//! One column per component type, keyed by entity. Columns are type-erased
//! so the world can hold heterogeneous component types in a single map.

use std::any::Any;

use slotmap::SecondaryMap;

use super::{Component, Entity};

/// Type-erased view of a component column
pub trait ComponentColumn: Any + Send + Sync {
    /// Drop the component of a destroyed entity, if any
    fn remove_entity(&mut self, entity: Entity);

    /// Number of stored components
    fn len(&self) -> usize;

    /// Whether the column is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Upcast for downcasting to the concrete storage
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete storage
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Dense-by-slot storage of one component type
pub struct ComponentStorage<T: Component> {
    components: SecondaryMap<Entity, T>,
}

impl<T: Component> ComponentStorage<T> {
    /// Create an empty storage
    pub fn new() -> Self {
        Self {
            components: SecondaryMap::new(),
        }
    }

    /// Insert or replace the component of an entity
    pub fn insert(&mut self, entity: Entity, component: T) -> Option<T> {
        self.components.insert(entity, component)
    }

    /// Get a component by entity
    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.components.get(entity)
    }

    /// Get a mutable component by entity
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.components.get_mut(entity)
    }

    /// Whether the entity has this component
    pub fn contains(&self, entity: Entity) -> bool {
        self.components.contains_key(entity)
    }

    /// Iterate over all (entity, component) pairs
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.components.iter()
    }
}

impl<T: Component> Default for ComponentStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> ComponentColumn for ComponentStorage<T> {
    fn remove_entity(&mut self, entity: Entity) {
        self.components.remove(entity);
    }

    fn len(&self) -> usize {
        self.components.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[derive(Debug, PartialEq)]
    struct Marker(u32);
    impl Component for Marker {}

    #[test]
    fn test_insert_get_and_remove() {
        let mut keys: SlotMap<Entity, ()> = SlotMap::with_key();
        let a = keys.insert(());
        let b = keys.insert(());

        let mut storage = ComponentStorage::new();
        assert!(storage.insert(a, Marker(1)).is_none());
        assert_eq!(storage.insert(a, Marker(2)), Some(Marker(1)));

        assert_eq!(storage.get(a), Some(&Marker(2)));
        assert!(storage.get(b).is_none());
        assert!(storage.contains(a));

        storage.remove_entity(a);
        assert!(!storage.contains(a));
        assert!(ComponentColumn::is_empty(&storage));
    }
}
