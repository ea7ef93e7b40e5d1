//! Fixed-capacity entity pool
//!
//! Entities are created once and then cycle between an idle and an active
//! set. Release scans visit every active entity at most once per call, even
//! though entities leave the active set while the scan is in progress.

use std::convert::Infallible;

use super::{Entity, World};

/// Idle/active partition over a fixed set of entities
#[derive(Debug, Clone)]
pub struct EntityPool {
    idle: Vec<Entity>,
    active: Vec<Entity>,
}

impl EntityPool {
    /// Build a pool over existing entities, all initially idle
    pub fn from_entities(entities: Vec<Entity>) -> Self {
        let capacity = entities.len();
        Self {
            idle: entities,
            active: Vec::with_capacity(capacity),
        }
    }

    /// Create `capacity` fresh entities in `world` and run `init` on each
    pub fn create<E>(
        world: &mut World,
        capacity: usize,
        mut init: impl FnMut(&mut World, Entity) -> Result<(), E>,
    ) -> Result<Self, E> {
        let mut entities = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            let entity = world.create_entity();
            init(world, entity)?;
            entities.push(entity);
        }
        Ok(Self::from_entities(entities))
    }

    /// Total number of pooled entities
    pub fn capacity(&self) -> usize {
        self.idle.len() + self.active.len()
    }

    /// Entities waiting to be checked out
    pub fn idle(&self) -> &[Entity] {
        &self.idle
    }

    /// Entities currently live
    pub fn active(&self) -> &[Entity] {
        &self.active
    }

    /// Whether `entity` is currently live
    pub fn is_active(&self, entity: Entity) -> bool {
        self.active.contains(&entity)
    }

    /// Move one entity from idle to active
    ///
    /// `None` means the pool is exhausted; nothing changes in that case.
    pub fn checkout(&mut self) -> Option<Entity> {
        let entity = self.idle.pop()?;
        self.active.push(entity);
        Some(entity)
    }

    /// Release every active entity for which `predicate` returns true
    ///
    /// Returns the number of released entities.
    pub fn release_if(&mut self, mut predicate: impl FnMut(Entity) -> bool) -> usize {
        match self.try_release_if(|entity| Ok::<_, Infallible>(predicate(entity))) {
            Ok(released) => released,
            Err(never) => match never {},
        }
    }

    /// Fallible [`release_if`](Self::release_if)
    ///
    /// An error stops the scan; entities released before it stay released.
    pub fn try_release_if<E>(
        &mut self,
        mut predicate: impl FnMut(Entity) -> Result<bool, E>,
    ) -> Result<usize, E> {
        let mut released = 0;
        let mut index = 0;
        while index < self.active.len() {
            let entity = self.active[index];
            if predicate(entity)? {
                self.active.remove(index);
                self.idle.push(entity);
                released += 1;
            } else {
                index += 1;
            }
        }
        Ok(released)
    }

    /// Release the first active entity for which `predicate` returns true
    pub fn release_first_if(&mut self, mut predicate: impl FnMut(Entity) -> bool) -> Option<Entity> {
        match self.try_release_first_if(|entity| Ok::<_, Infallible>(predicate(entity))) {
            Ok(released) => released,
            Err(never) => match never {},
        }
    }

    /// Fallible [`release_first_if`](Self::release_first_if)
    pub fn try_release_first_if<E>(
        &mut self,
        mut predicate: impl FnMut(Entity) -> Result<bool, E>,
    ) -> Result<Option<Entity>, E> {
        for index in 0..self.active.len() {
            let entity = self.active[index];
            if predicate(entity)? {
                self.active.remove(index);
                self.idle.push(entity);
                return Ok(Some(entity));
            }
        }
        Ok(None)
    }

    /// First active entity for which `predicate` returns true; the pool is not modified
    pub fn find_first_if(&self, mut predicate: impl FnMut(Entity) -> bool) -> Option<Entity> {
        self.active.iter().copied().find(|&entity| predicate(entity))
    }

    /// Fallible [`find_first_if`](Self::find_first_if)
    pub fn try_find_first_if<E>(
        &self,
        mut predicate: impl FnMut(Entity) -> Result<bool, E>,
    ) -> Result<Option<Entity>, E> {
        for &entity in &self.active {
            if predicate(entity)? {
                return Ok(Some(entity));
            }
        }
        Ok(None)
    }
}
