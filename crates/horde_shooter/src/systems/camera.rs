//! Follow camera

use horde_engine::foundation::math::{utils::deg_to_rad, Mat4, Mat4Ext, Vec3};

use crate::components::{Camera, Transform};
use crate::config::CameraConfig;
use crate::error::SimulationError;
use crate::scene::Scene;

/// Recomputes the camera from the player's position every frame
#[derive(Debug)]
pub struct CameraSystem {
    config: CameraConfig,
}

impl CameraSystem {
    /// Create the system
    pub fn new(config: &CameraConfig) -> Self {
        Self { config: config.clone() }
    }

    /// Place the camera at the follow offset, looking at the player
    pub fn update(&mut self, scene: &mut Scene, aspect: f32) -> Result<(), SimulationError> {
        let (player, camera) = (scene.player(), scene.camera());
        let target = scene.world.get_component::<Transform>(player)?.position;
        let config = &self.config;

        let camera = scene.world.get_component_mut::<Camera>(camera)?;
        camera.projection = Mat4::perspective(deg_to_rad(config.fov_y_degrees), aspect, config.near, config.far);
        camera.position = target + config.offset;
        camera.view = Mat4::look_at(camera.position, target, Vec3::y());
        camera.projection_view = camera.projection * camera.view;
        Ok(())
    }
}
