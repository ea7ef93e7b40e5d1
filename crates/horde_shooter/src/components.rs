//! Game-specific components
//!
//! Plain data. Every component is attached during scene load and only its
//! values change afterwards.

use std::sync::Arc;

use horde_engine::assets::ImportedScene;
use horde_engine::ecs::Component;
use horde_engine::foundation::math::{Mat4, Mat4Ext, Vec2, Vec3};
use horde_engine::physics::Capsule;
use horde_engine::render::{InstancedMeshId, Mesh, RenderPassKind};

/// World pose
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in world space
    pub position: Vec3,

    /// Per-axis scale
    pub scale: Vec3,

    /// Rotation angles in radians, applied Y then Z then X
    pub euler_angles: Vec3,
}

impl Component for Transform {}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            euler_angles: Vec3::zeros(),
        }
    }
}

impl Transform {
    /// Uniformly scaled transform at the origin
    pub fn with_scale(scale: f32) -> Self {
        Self {
            scale: Vec3::new(scale, scale, scale),
            ..Self::default()
        }
    }

    /// Translation, then scale, then rotation
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position) * Mat4::new_nonuniform_scaling(&self.scale) * self.rotation_matrix()
    }

    /// Rotation part of [`model_matrix`](Self::model_matrix)
    pub fn rotation_matrix(&self) -> Mat4 {
        Mat4::rotation_y(self.euler_angles.y)
            * Mat4::rotation_z(self.euler_angles.z)
            * Mat4::rotation_x(self.euler_angles.x)
    }
}

/// Planar velocity heading
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Movement {
    /// Units per second
    pub speed: f32,

    /// Heading on the XZ plane (x, z); not necessarily unit length
    pub direction: Vec2,
}

impl Component for Movement {}

impl Movement {
    /// Stationary movement with the given speed
    pub fn with_speed(speed: f32) -> Self {
        Self {
            speed,
            direction: Vec2::zeros(),
        }
    }

    /// Heading lifted onto the XZ plane
    pub fn direction_3d(&self) -> Vec3 {
        Vec3::new(self.direction.x, 0.0, self.direction.y)
    }
}

/// Capsule collider, aligned with the owner's movement direction at check time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    /// Capsule dimensions
    pub capsule: Capsule,
}

impl Component for Collider {}

/// Player health; zero means game over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    /// Remaining health
    pub health: u32,
}

impl Component for Health {}

impl Health {
    /// Whether health has reached zero
    pub fn is_dead(&self) -> bool {
        self.health == 0
    }
}

/// Raw per-frame player intent
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Input {
    /// Stick direction on the XZ plane
    pub direction: Vec2,

    /// Facing angle in radians
    pub theta: f32,

    /// Whether the stick is deflected
    pub is_moving: bool,

    /// Single-frame shot request
    pub is_shooting: bool,

    /// Single-frame restart request
    pub is_restarting: bool,
}

impl Component for Input {}

/// Last aim direction, independent of movement
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Look {
    /// Aim on the XZ plane
    pub direction: Vec2,
}

impl Component for Look {}

/// Kill counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Score {
    /// Enemies killed since the last restart
    pub value: u32,
}

impl Component for Score {}

/// Countdown in seconds
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Lifetime {
    /// Seconds left
    pub remaining: f32,
}

impl Component for Lifetime {}

/// One instance of a shared mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstancedMeshComponent {
    /// Shared mesh
    pub mesh: InstancedMeshId,

    /// Drawn this frame; must be false whenever the owner is idle in its pool
    pub is_visible: bool,
}

impl Component for InstancedMeshComponent {}

/// Non-instanced mesh
#[derive(Debug, Clone, PartialEq)]
pub struct MeshComponent {
    /// Renderer-visible geometry
    pub mesh: Mesh,

    /// Pass that draws it
    pub pass: RenderPassKind,

    /// Index into the owning scene's meshes, for skinned meshes
    pub source_mesh: Option<usize>,

    /// Drawn this frame
    pub is_visible: bool,
}

impl Component for MeshComponent {}

/// Carried-over weights of the looping states
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StateWeights {
    /// Standing still
    pub idle: f32,
    /// Strafing right
    pub right: f32,
    /// Running forward
    pub forward: f32,
    /// Running backward
    pub back: f32,
    /// Strafing left
    pub left: f32,
}

/// Skeletal animation state of the player
#[derive(Debug, Clone)]
pub struct Animation {
    /// Imported skeleton, meshes and clips
    pub scene: Arc<ImportedScene>,

    /// Clip holding all state tick ranges
    pub clip: usize,

    /// Inverse of the skeleton root transform
    pub global_inverse: Mat4,

    /// Seconds for a state weight to fade out
    pub transition_time: f32,

    /// Simulation time of the previous evaluation
    pub last_anim_time: f32,

    /// Simulation time of death; negative while alive
    pub death_time: f32,

    /// Weights carried across frames
    pub previous: StateWeights,
}

impl Component for Animation {}

impl Animation {
    /// Fresh animation state for `scene`
    pub fn new(scene: Arc<ImportedScene>, clip: usize, global_inverse: Mat4, transition_time: f32) -> Self {
        Self {
            scene,
            clip,
            global_inverse,
            transition_time,
            last_anim_time: 0.0,
            death_time: -1.0,
            previous: StateWeights::default(),
        }
    }

    /// Whether the death state has been triggered
    pub fn is_dead(&self) -> bool {
        self.death_time >= 0.0
    }
}

/// Follow camera matrices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Eye position
    pub position: Vec3,

    /// Projection matrix
    pub projection: Mat4,

    /// View matrix
    pub view: Mat4,

    /// `projection * view`
    pub projection_view: Mat4,
}

impl Component for Camera {}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            projection: Mat4::identity(),
            view: Mat4::identity(),
            projection_view: Mat4::identity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use horde_engine::foundation::math::{constants::PI, Vec4};

    #[test]
    fn test_model_matrix_order() {
        let transform = Transform {
            position: Vec3::new(1.0, 2.0, 3.0),
            scale: Vec3::new(2.0, 2.0, 2.0),
            euler_angles: Vec3::new(0.0, PI / 2.0, 0.0),
        };

        // Forward (+Z) is turned to +X, scaled, then translated.
        let tip = transform.model_matrix() * Vec4::new(0.0, 0.0, 1.0, 1.0);
        assert_relative_eq!(tip.xyz(), Vec3::new(3.0, 2.0, 3.0), epsilon = 1e-5);
    }

    #[test]
    fn test_rotation_matrix_has_no_translation() {
        let transform = Transform {
            position: Vec3::new(5.0, 0.0, 0.0),
            euler_angles: Vec3::new(PI / 2.0, 0.0, PI),
            ..Transform::default()
        };
        let rotation = transform.rotation_matrix();
        assert_relative_eq!(rotation.column(3).xyz(), Vec3::zeros());
        assert_relative_eq!(rotation.determinant(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_movement_direction_3d() {
        let movement = Movement {
            speed: 1.0,
            direction: Vec2::new(0.5, -1.0),
        };
        assert_eq!(movement.direction_3d(), Vec3::new(0.5, 0.0, -1.0));
    }
}
