//! Entity-Component-System implementation
//!
//! A type-erased component store keyed by generational entity handles, and
//! fixed-capacity entity pools for high-churn objects.

pub mod world;
pub mod entity;
pub mod component;
pub mod storage;
pub mod pool;

pub use world::World;
pub use entity::Entity;
pub use component::Component;
pub use pool::EntityPool;

/// ECS access errors
///
/// Both variants indicate a logic defect in the caller.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// Component type was never attached to the entity
    #[error("{entity} has no {component} component")]
    MissingComponent {
        /// Entity that was queried
        entity: Entity,
        /// Rust type name of the requested component
        component: &'static str,
    },

    /// Entity was destroyed or never created by this world
    #[error("{0} is not alive")]
    DeadEntity(Entity),

    /// Column registered for a component type holds a different type
    #[error("component column for {component} holds another type")]
    ColumnMismatch {
        /// Rust type name of the requested component
        component: &'static str,
    },
}
