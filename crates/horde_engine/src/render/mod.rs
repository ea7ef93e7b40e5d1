//! Render-facing interfaces
//!
//! The simulation does not draw. It owns handles to buffers and textures
//! provided by injected services, fills per-instance buffers, and tags
//! meshes with the pass that draws them. Whatever consumes a frame reads
//! those handles after all systems have run.

pub mod buffer;
pub mod texture;
pub mod mesh;
pub mod pass;
pub mod instancing;

use std::path::PathBuf;

pub use buffer::{BufferHandle, BufferService, BufferServiceExt, HostBufferService};
pub use texture::{ImageTextureService, TextureHandle, TextureInfo, TextureService};
pub use mesh::{Material, MaterialTexture, Mesh, VertexAttribute};
pub use pass::{PassTable, RenderPassKind};
pub use instancing::{InstanceBuffers, InstancedMesh, InstancedMeshId, InstancedMeshRegistry};

/// Rendering resource errors
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    /// Buffer handle not issued by this service
    #[error("Unknown buffer {0:?}")]
    UnknownBuffer(BufferHandle),

    /// Instanced mesh index not registered
    #[error("Unknown instanced mesh #{0}")]
    UnknownInstancedMesh(usize),

    /// Buffer contents cannot be viewed as the requested element type
    #[error("Cannot view buffer {handle:?}: {reason}")]
    View {
        /// Offending buffer
        handle: BufferHandle,
        /// Cast failure description
        reason: String,
    },

    /// More elements than the buffer holds
    #[error("Buffer {handle:?} holds {available} elements, {requested} requested")]
    Overflow {
        /// Target buffer
        handle: BufferHandle,
        /// Elements to write
        requested: usize,
        /// Elements that fit
        available: usize,
    },

    /// Image missing or undecodable
    #[error("Failed to load texture {path:?}: {source}")]
    TextureLoad {
        /// Image file
        path: PathBuf,
        /// Decoder error
        #[source]
        source: image::ImageError,
    },

    /// Handle space exhausted
    #[error("Out of resource handles")]
    OutOfHandles,
}

/// Services and registries the simulation renders through
///
/// Owned by the top-level orchestrator and passed down explicitly.
pub struct RenderResources {
    /// Buffer allocation service
    pub buffers: Box<dyn BufferService>,
    /// Texture creation service
    pub textures: Box<dyn TextureService>,
    /// Instanced meshes of the loaded scene
    pub instanced_meshes: InstancedMeshRegistry,
}

impl RenderResources {
    /// Bundle the given services with an empty instanced mesh registry
    pub fn new(buffers: Box<dyn BufferService>, textures: Box<dyn TextureService>) -> Self {
        Self {
            buffers,
            textures,
            instanced_meshes: InstancedMeshRegistry::new(),
        }
    }

    /// Host-memory buffers plus image-validating textures
    pub fn host() -> Self {
        Self::new(Box::new(HostBufferService::new()), Box::new(ImageTextureService::new()))
    }
}
