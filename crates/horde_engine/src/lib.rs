//! # Horde Engine
//!
//! Simulation plumbing for a top-down wave shooter.
//!
//! ## Features
//!
//! - **ECS**: type-erased component store with generational entity handles
//! - **Entity Pools**: fixed-capacity idle/active recycling with safe release-while-scanning
//! - **Capsule Collision**: point-segment and segment-segment distance queries
//! - **Render Interfaces**: injected buffer/texture services, instanced meshes, pass tables
//! - **Asset Import**: serde data model for skinned, animated scenes
//!
//! ## Quick Start
//!
//! ```rust
//! use horde_engine::prelude::*;
//!
//! let mut world = World::new();
//! let mut pool = EntityPool::create(&mut world, 4, |_, _| Ok::<_, EcsError>(())).unwrap();
//!
//! let bullet = pool.checkout().unwrap();
//! assert_eq!(pool.active(), &[bullet]);
//!
//! pool.release_if(|entity| entity == bullet);
//! assert_eq!(pool.idle().len(), 4);
//! ```

#![warn(missing_docs)]

pub mod foundation;
pub mod ecs;
pub mod physics;
pub mod render;
pub mod assets;
pub mod config;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        foundation::{
            math::{Mat4, Mat4Ext, Vec2, Vec3, Vec4},
            time::{FrameClock, FrameTime},
        },
        ecs::{Component, EcsError, Entity, EntityPool, World},
        physics::Capsule,
        render::{
            BufferHandle, BufferService, BufferServiceExt, Mesh, RenderError, RenderPassKind,
            RenderResources, TextureHandle, TextureService,
        },
        assets::{AssetError, ImportedScene, SceneImporter},
        config::{Config, ConfigError},
    };
}
