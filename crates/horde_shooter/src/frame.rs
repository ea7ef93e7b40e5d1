//! Frame packet handed to the render consumer
//!
//! Collected after every system has run, so everything it references is
//! current-frame state.

use std::collections::HashMap;

use horde_engine::ecs::Entity;
use horde_engine::foundation::math::{Mat4, Vec3};
use horde_engine::render::{InstancedMeshId, PassTable, RenderPassKind, RenderResources};

use crate::components::{Camera, InstancedMeshComponent, MeshComponent, Transform};
use crate::error::SimulationError;
use crate::scene::Scene;

/// One draw in a pass
#[derive(Debug, Clone, PartialEq)]
pub enum DrawItem {
    /// A single mesh; its handles live in the entity's [`MeshComponent`]
    Mesh {
        /// Entity owning the mesh
        entity: Entity,
        /// Model matrix
        model: Mat4,
    },
    /// A shared mesh whose instance buffers were filled this frame
    Instanced {
        /// Registered mesh
        mesh: InstancedMeshId,
        /// Instances written to its buffers
        count: usize,
    },
}

/// Camera matrices for the frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    /// Eye position
    pub position: Vec3,
    /// Projection matrix
    pub projection: Mat4,
    /// View matrix
    pub view: Mat4,
    /// `projection * view`
    pub projection_view: Mat4,
}

/// Everything the renderer reads for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FramePacket {
    /// Camera matrices
    pub camera: CameraFrame,
    /// Draws grouped by pass
    pub passes: PassTable<Vec<DrawItem>>,
}

impl FramePacket {
    /// Draws of `pass`
    pub fn draws(&self, pass: RenderPassKind) -> &[DrawItem] {
        &self.passes[pass]
    }

    /// Instances drawn for `mesh` this frame
    pub fn instance_count(&self, mesh: InstancedMeshId) -> usize {
        self.passes
            .iter()
            .flat_map(|(_, draws)| draws)
            .find_map(|draw| match draw {
                DrawItem::Instanced { mesh: id, count } if *id == mesh => Some(*count),
                _ => None,
            })
            .unwrap_or(0)
    }
}

#[derive(Default)]
struct InstanceData {
    transforms: Vec<Mat4>,
    rotations: Vec<Mat4>,
}

/// Build the frame packet and fill every instance buffer
pub fn collect_frame(scene: &Scene, resources: &mut RenderResources) -> Result<FramePacket, SimulationError> {
    let world = &scene.world;
    let camera = world.get_component::<Camera>(scene.camera())?;
    let mut passes = PassTable::from_fn(|_| Vec::new());

    for (entity, mesh) in world.query::<MeshComponent>() {
        if mesh.is_visible {
            let model = world.get_component::<Transform>(entity)?.model_matrix();
            passes[mesh.pass].push(DrawItem::Mesh { entity, model });
        }
    }

    let mut instances: HashMap<InstancedMeshId, InstanceData> = HashMap::new();
    for (entity, instance) in world.query::<InstancedMeshComponent>() {
        if instance.is_visible {
            let transform = world.get_component::<Transform>(entity)?;
            let data = instances.entry(instance.mesh).or_default();
            data.transforms.push(transform.model_matrix());
            data.rotations.push(transform.rotation_matrix());
        }
    }

    let registered: Vec<(InstancedMeshId, RenderPassKind)> =
        resources.instanced_meshes.iter().map(|(id, mesh)| (id, mesh.pass)).collect();
    for (id, pass) in registered {
        let data = instances.remove(&id).unwrap_or_default();
        resources
            .instanced_meshes
            .write_instances(&mut *resources.buffers, id, &data.transforms, &data.rotations)?;
        if !data.transforms.is_empty() {
            passes[pass].push(DrawItem::Instanced {
                mesh: id,
                count: data.transforms.len(),
            });
        }
    }

    Ok(FramePacket {
        camera: CameraFrame {
            position: camera.position,
            projection: camera.projection,
            view: camera.view,
            projection_view: camera.projection_view,
        },
        passes,
    })
}
