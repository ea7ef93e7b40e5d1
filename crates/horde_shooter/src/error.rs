//! Game error types
//!
//! [`SceneError`] aborts startup. [`SimulationError`] aborts the current
//! frame; every variant signals a logic defect, so nothing retries it.
//! Pool exhaustion is not an error anywhere.

use std::path::PathBuf;

use horde_engine::assets::AssetError;
use horde_engine::ecs::EcsError;
use horde_engine::render::RenderError;
use thiserror::Error;

use crate::systems::animation::AnimState;

/// Animation invariant violations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// Normalised weights do not sum to one
    #[error("Blend weights sum to {sum}, expected 1")]
    WeightsNotNormalized {
        /// Actual sum
        sum: f32,
    },

    /// Sampled tick left the state's clip range
    #[error("{state:?} tick {tick} outside [{min}, {max}]")]
    TickOutOfRange {
        /// Offending state
        state: AnimState,
        /// Computed tick
        tick: f32,
        /// Range start
        min: f32,
        /// Range end
        max: f32,
    },

    /// Scene mesh index with no matching game mesh
    #[error("No game mesh for scene mesh {0}")]
    InvalidMeshIndex(usize),

    /// Clip index not present in the scene
    #[error("Animation clip {0} does not exist")]
    MissingClip(usize),

    /// Skinned mesh was loaded without a position stream
    #[error("Skinned mesh {0} has no position buffer")]
    MissingPositionBuffer(usize),
}

/// Frame-fatal simulation errors
#[derive(Error, Debug)]
pub enum SimulationError {
    /// Component store misuse
    #[error("ECS error: {0}")]
    Ecs(#[from] EcsError),

    /// Buffer access failure
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Animation invariant broken
    #[error("Animation error: {0}")]
    Animation(#[from] AnimationError),
}

/// Startup-fatal scene construction errors
#[derive(Error, Debug)]
pub enum SceneError {
    /// Mesh/animation file failed to import
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    /// Buffer or texture creation failed
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Component store misuse during construction
    #[error("ECS error: {0}")]
    Ecs(#[from] EcsError),

    /// Scene lacks a required mesh
    #[error("{scene:?} has no mesh #{index}")]
    MissingMesh {
        /// Scene file
        scene: PathBuf,
        /// Required mesh
        index: usize,
    },

    /// Scene lacks the configured animation clip
    #[error("{scene:?} has no animation clip #{index}")]
    MissingClip {
        /// Scene file
        scene: PathBuf,
        /// Required clip
        index: usize,
    },

    /// Configured clip ends before the last animation state
    #[error("{scene:?} clip #{index} lasts {duration} ticks, needs {required}")]
    ClipTooShort {
        /// Scene file
        scene: PathBuf,
        /// Offending clip
        index: usize,
        /// Clip length in ticks
        duration: f32,
        /// Last tick any state samples
        required: f32,
    },
}
