//! Render pass kinds
//!
//! The pass set is closed, so dispatch is a table indexed by
//! [`RenderPassKind`] rather than a list of trait objects.

use std::ops::{Index, IndexMut};

/// Every render pass the game draws, in submission order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderPassKind {
    /// Ground plane
    Floor,
    /// Skinned player and gun
    Player,
    /// Instanced enemies
    Enemy,
    /// Instanced bullet quads
    Bullet,
}

impl RenderPassKind {
    /// All passes in submission order
    pub const ALL: [Self; 4] = [Self::Floor, Self::Player, Self::Enemy, Self::Bullet];

    const fn index(self) -> usize {
        self as usize
    }
}

/// One value per render pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassTable<T> {
    slots: [T; 4],
}

impl<T> PassTable<T> {
    /// Build a table by evaluating `init` for every pass
    pub fn from_fn(mut init: impl FnMut(RenderPassKind) -> T) -> Self {
        Self {
            slots: RenderPassKind::ALL.map(&mut init),
        }
    }

    /// Iterate in submission order
    pub fn iter(&self) -> impl Iterator<Item = (RenderPassKind, &T)> {
        RenderPassKind::ALL.into_iter().zip(self.slots.iter())
    }
}

impl<T> Index<RenderPassKind> for PassTable<T> {
    type Output = T;

    fn index(&self, kind: RenderPassKind) -> &T {
        &self.slots[kind.index()]
    }
}

impl<T> IndexMut<RenderPassKind> for PassTable<T> {
    fn index_mut(&mut self, kind: RenderPassKind) -> &mut T {
        &mut self.slots[kind.index()]
    }
}
