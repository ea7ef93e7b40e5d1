//! Asset import
//!
//! The imported scene data model and the importer services that produce it.

pub mod scene_data;
pub mod importer;

use std::path::PathBuf;

pub use scene_data::{
    AnimationClip, Bone, ImportedScene, NodeChannel, QuatKey, SceneNode, SourceMesh, VectorKey, VertexWeight,
};
pub use importer::{MemorySceneImporter, RonSceneImporter, SceneImporter};

/// Asset loading errors
#[derive(thiserror::Error, Debug)]
pub enum AssetError {
    /// Asset not found
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// IO error during asset loading
    #[error("IO error reading {path:?}: {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File contents could not be decoded
    #[error("Failed to parse {path:?}: {reason}")]
    Parse {
        /// File being parsed
        path: PathBuf,
        /// Decoder message
        reason: String,
    },

    /// Decoded data is inconsistent
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A transform that must be inverted is singular
    #[error("Transform of node '{0}' is not invertible")]
    SingularTransform(String),
}
