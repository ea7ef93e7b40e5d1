//! Mesh and material descriptors
//!
//! Plain handle bundles: the geometry itself lives in service-owned buffers.

use super::{BufferHandle, TextureHandle};

/// Per-vertex attribute streams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttribute {
    /// xyz positions, rewritten every frame for skinned meshes
    Position,
    /// xyz normals
    Normal,
    /// uv texture coordinates
    Uv,
}

impl VertexAttribute {
    /// Number of attribute streams
    pub const COUNT: usize = 3;

    /// Floats per vertex in this stream
    pub fn components(self) -> usize {
        match self {
            Self::Position | Self::Normal => 3,
            Self::Uv => 2,
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Texture slots of a material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialTexture {
    /// Albedo
    Diffuse,
    /// Normal map
    Normal,
    /// Specular/metalness map
    Specular,
}

impl MaterialTexture {
    /// Number of texture slots
    pub const COUNT: usize = 3;

    const fn index(self) -> usize {
        self as usize
    }
}

/// Texture bindings of a mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
    textures: [Option<TextureHandle>; MaterialTexture::COUNT],
}

impl Material {
    /// Create a material without textures
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style texture assignment
    #[must_use]
    pub fn with_texture(mut self, slot: MaterialTexture, texture: TextureHandle) -> Self {
        self.set_texture(slot, texture);
        self
    }

    /// Bind a texture to a slot
    pub fn set_texture(&mut self, slot: MaterialTexture, texture: TextureHandle) {
        self.textures[slot.index()] = Some(texture);
    }

    /// Texture bound to a slot
    pub fn texture(&self, slot: MaterialTexture) -> Option<TextureHandle> {
        self.textures[slot.index()]
    }
}

/// Renderer-visible geometry of one mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    vertex_buffers: [Option<BufferHandle>; VertexAttribute::COUNT],
    /// Number of vertices in each attribute stream
    pub vertex_count: usize,
    /// Index buffer, if the mesh is indexed
    pub index_buffer: Option<BufferHandle>,
    /// Number of indices
    pub index_count: usize,
    /// Texture bindings
    pub material: Material,
}

impl Mesh {
    /// Create an empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a vertex stream
    pub fn set_vertex_buffer(&mut self, attribute: VertexAttribute, buffer: BufferHandle) {
        self.vertex_buffers[attribute.index()] = Some(buffer);
    }

    /// Vertex stream for an attribute
    pub fn vertex_buffer(&self, attribute: VertexAttribute) -> Option<BufferHandle> {
        self.vertex_buffers[attribute.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_slots_are_independent() {
        let mut mesh = Mesh::new();
        mesh.set_vertex_buffer(VertexAttribute::Normal, BufferHandle(4));
        mesh.material = Material::new()
            .with_texture(MaterialTexture::Diffuse, TextureHandle(1))
            .with_texture(MaterialTexture::Specular, TextureHandle(2));

        assert_eq!(mesh.vertex_buffer(VertexAttribute::Normal), Some(BufferHandle(4)));
        assert_eq!(mesh.vertex_buffer(VertexAttribute::Position), None);
        assert_eq!(mesh.material.texture(MaterialTexture::Specular), Some(TextureHandle(2)));
        assert_eq!(mesh.material.texture(MaterialTexture::Normal), None);
    }

    #[test]
    fn test_attribute_widths() {
        assert_eq!(VertexAttribute::Position.components(), 3);
        assert_eq!(VertexAttribute::Uv.components(), 2);
    }
}
