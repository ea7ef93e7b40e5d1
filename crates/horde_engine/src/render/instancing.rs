//! Instanced mesh registry
//!
//! One shared mesh drawn many times. Each registered mesh owns per-instance
//! buffers sized for its maximum instance count; every frame the live
//! instances' matrices are packed into the front of those buffers.

use crate::foundation::math::Mat4;

use super::{BufferHandle, BufferService, BufferServiceExt, Mesh, RenderError, RenderPassKind};

/// Floats per packed 4x4 matrix
const MATRIX_FLOATS: usize = 16;

/// Index of an instanced mesh in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstancedMeshId(pub usize);

/// Per-instance buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceBuffers {
    /// Column-major model matrices
    pub transform: BufferHandle,
    /// Column-major rotation-only matrices, for meshes that need them
    pub aim_rotation: Option<BufferHandle>,
}

/// A shared mesh plus its per-instance state
#[derive(Debug, Clone)]
pub struct InstancedMesh {
    /// Shared geometry
    pub mesh: Mesh,
    /// Pass that draws this mesh
    pub pass: RenderPassKind,
    /// Instances written this frame
    pub count: usize,
    /// Capacity of the instance buffers
    pub max_count: usize,
    /// Instance buffers
    pub buffers: InstanceBuffers,
}

/// All instanced meshes of a scene
#[derive(Debug, Default)]
pub struct InstancedMeshRegistry {
    meshes: Vec<InstancedMesh>,
}

impl InstancedMeshRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate instance buffers for `max_count` instances and register the mesh
    pub fn register(
        &mut self,
        buffers: &mut dyn BufferService,
        mesh: Mesh,
        pass: RenderPassKind,
        max_count: usize,
        with_aim_rotation: bool,
    ) -> Result<InstancedMeshId, RenderError> {
        let matrix_bytes = max_count * MATRIX_FLOATS * std::mem::size_of::<f32>();
        let transform = buffers.create_buffer(matrix_bytes)?;
        let aim_rotation = if with_aim_rotation {
            Some(buffers.create_buffer(matrix_bytes)?)
        } else {
            None
        };

        let id = InstancedMeshId(self.meshes.len());
        self.meshes.push(InstancedMesh {
            mesh,
            pass,
            count: 0,
            max_count,
            buffers: InstanceBuffers { transform, aim_rotation },
        });
        log::debug!("Registered instanced mesh {:?} for {:?} pass, {} instances", id, pass, max_count);
        Ok(id)
    }

    /// Look up a mesh
    pub fn get(&self, id: InstancedMeshId) -> Result<&InstancedMesh, RenderError> {
        self.meshes.get(id.0).ok_or(RenderError::UnknownInstancedMesh(id.0))
    }

    /// Iterate over all meshes
    pub fn iter(&self) -> impl Iterator<Item = (InstancedMeshId, &InstancedMesh)> {
        self.meshes.iter().enumerate().map(|(index, mesh)| (InstancedMeshId(index), mesh))
    }

    /// Pack this frame's instances and update the instance count
    ///
    /// `rotations` is ignored for meshes registered without an aim-rotation buffer.
    pub fn write_instances(
        &mut self,
        buffers: &mut dyn BufferService,
        id: InstancedMeshId,
        transforms: &[Mat4],
        rotations: &[Mat4],
    ) -> Result<(), RenderError> {
        let mesh = self
            .meshes
            .get_mut(id.0)
            .ok_or(RenderError::UnknownInstancedMesh(id.0))?;
        if transforms.len() > mesh.max_count {
            return Err(RenderError::Overflow {
                handle: mesh.buffers.transform,
                requested: transforms.len(),
                available: mesh.max_count,
            });
        }

        write_matrices(buffers, mesh.buffers.transform, transforms)?;
        if let Some(aim_rotation) = mesh.buffers.aim_rotation {
            write_matrices(buffers, aim_rotation, rotations)?;
        }
        mesh.count = transforms.len();
        Ok(())
    }
}

fn write_matrices(buffers: &mut dyn BufferService, handle: BufferHandle, matrices: &[Mat4]) -> Result<(), RenderError> {
    let view = buffers.view_mut::<f32>(handle)?;
    let needed = matrices.len() * MATRIX_FLOATS;
    if needed > view.len() {
        return Err(RenderError::Overflow {
            handle,
            requested: matrices.len(),
            available: view.len() / MATRIX_FLOATS,
        });
    }
    for (chunk, matrix) in view.chunks_exact_mut(MATRIX_FLOATS).zip(matrices) {
        chunk.copy_from_slice(matrix.as_slice());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::render::HostBufferService;

    #[test]
    fn test_register_allocates_instance_buffers() {
        let mut buffers = HostBufferService::new();
        let mut registry = InstancedMeshRegistry::new();

        let id = registry
            .register(&mut buffers, Mesh::new(), RenderPassKind::Enemy, 16, true)
            .unwrap();
        let mesh = registry.get(id).unwrap();

        assert_eq!(mesh.max_count, 16);
        assert_eq!(mesh.count, 0);
        assert_eq!(buffers.buffer_size(mesh.buffers.transform).unwrap(), 16 * 64);
        assert!(mesh.buffers.aim_rotation.is_some());
    }

    #[test]
    fn test_write_instances_packs_column_major() {
        let mut buffers = HostBufferService::new();
        let mut registry = InstancedMeshRegistry::new();
        let id = registry
            .register(&mut buffers, Mesh::new(), RenderPassKind::Bullet, 2, false)
            .unwrap();

        let matrix = Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0));
        registry.write_instances(&mut buffers, id, &[matrix], &[]).unwrap();

        let mesh = registry.get(id).unwrap();
        assert_eq!(mesh.count, 1);
        let packed = buffers.view::<f32>(mesh.buffers.transform).unwrap();
        assert_eq!(&packed[12..16], &[1.0, 2.0, 3.0, 1.0]);
    }

    #[test]
    fn test_write_instances_rejects_overflow() {
        let mut buffers = HostBufferService::new();
        let mut registry = InstancedMeshRegistry::new();
        let id = registry
            .register(&mut buffers, Mesh::new(), RenderPassKind::Bullet, 1, false)
            .unwrap();

        let result = registry.write_instances(&mut buffers, id, &[Mat4::identity(), Mat4::identity()], &[]);
        assert!(matches!(result, Err(RenderError::Overflow { .. })));
        assert!(registry.get(InstancedMeshId(7)).is_err());
    }
}
