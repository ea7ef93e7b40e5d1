//! Game configuration
//!
//! Every tunable of the simulation. Missing keys in a config file fall back
//! to the defaults below.

use std::path::PathBuf;

use horde_engine::config::Config;
use horde_engine::foundation::math::Vec3;
use horde_engine::physics::Capsule;
use serde::{Deserialize, Serialize};

/// Game configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Asset locations and pool sizes
    pub scene: SceneConfig,

    /// Player settings
    pub player: PlayerConfig,

    /// Enemy spawning and steering
    pub enemy: EnemyConfig,

    /// Bullet flight
    pub bullet: BulletConfig,

    /// Fire rate
    pub shooting: ShootingConfig,

    /// Follow camera
    pub camera: CameraConfig,

    /// Animation blending
    pub animation: AnimationConfig,

    /// Screen flow
    pub screens: ScreensConfig,
}

impl Config for GameConfig {}

/// Asset locations and pool sizes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Directory every asset path below is relative to
    pub asset_dir: PathBuf,

    /// Skinned player scene; mesh 0 is the body, mesh 1 the gun
    pub player_scene: PathBuf,

    /// Enemy scene; mesh 0 is drawn instanced
    pub enemy_scene: PathBuf,

    /// Texture files
    pub textures: TextureConfig,

    /// Enemy pool capacity
    pub enemy_pool_capacity: usize,

    /// Bullet pool capacity
    pub bullet_pool_capacity: usize,

    /// Edge length of the square floor
    pub floor_size: f32,

    /// Number of texture repeats across the floor
    pub floor_uv_repeat: f32,

    /// Floor rotation about Y in degrees
    pub floor_rotation_degrees: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from("assets"),
            player_scene: PathBuf::from("player.ron"),
            enemy_scene: PathBuf::from("enemy.ron"),
            textures: TextureConfig::default(),
            enemy_pool_capacity: 16,
            bullet_pool_capacity: 16,
            floor_size: 100.0,
            floor_uv_repeat: 100.0,
            floor_rotation_degrees: 45.0,
        }
    }
}

/// Texture files, relative to the asset directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    /// Player albedo
    pub player_diffuse: PathBuf,
    /// Player metalness
    pub player_specular: PathBuf,
    /// Gun albedo
    pub gun_diffuse: PathBuf,
    /// Gun metalness
    pub gun_specular: PathBuf,
    /// Floor albedo
    pub floor_diffuse: PathBuf,
    /// Floor normal map
    pub floor_normal: PathBuf,
    /// Floor metalness
    pub floor_specular: PathBuf,
    /// Enemy albedo
    pub enemy_diffuse: PathBuf,
    /// Bullet albedo
    pub bullet_diffuse: PathBuf,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            player_diffuse: PathBuf::from("Player_D.png"),
            player_specular: PathBuf::from("Player_M.png"),
            gun_diffuse: PathBuf::from("Gun_D.png"),
            gun_specular: PathBuf::from("Gun_M.png"),
            floor_diffuse: PathBuf::from("Floor_D.png"),
            floor_normal: PathBuf::from("Floor_N.png"),
            floor_specular: PathBuf::from("Floor_M.png"),
            enemy_diffuse: PathBuf::from("Enemy_D.png"),
            bullet_diffuse: PathBuf::from("Bullet_D.png"),
        }
    }
}

/// Player settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Movement speed in units per second
    pub speed: f32,

    /// Uniform scale of the player and gun models
    pub model_scale: f32,

    /// Health after load and after restart
    pub initial_health: u32,

    /// Height of the gun in model units; scaled by `model_scale` it gives the
    /// plane enemies walk on
    pub gun_height: f32,

    /// Muzzle position in model space
    pub muzzle_offset: Vec3,

    /// Radius of the player's collision sphere
    pub collision_radius: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 1.5,
            model_scale: 0.0044,
            initial_health: 100,
            gun_height: 120.0,
            muzzle_offset: Vec3::new(-20.0, 120.0, 100.0),
            collision_radius: 0.35,
        }
    }
}

/// Enemy spawning and steering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Seconds between spawn batches
    pub spawn_interval: f32,

    /// Enemies requested per batch
    pub spawns_per_interval: usize,

    /// Distance from the player at which enemies appear
    pub spawn_radius: f32,

    /// Walking speed in units per second
    pub speed: f32,

    /// Collider
    pub capsule: Capsule,

    /// Uniform model scale
    pub scale: f32,

    /// Model orientation in degrees (x, y, z)
    pub euler_degrees: Vec3,

    /// Seed of the spawn-angle generator
    pub seed: u64,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            spawn_interval: 1.0,
            spawns_per_interval: 1,
            spawn_radius: 10.0,
            speed: 0.6,
            capsule: Capsule::new(0.4, 0.08),
            scale: 0.01,
            euler_degrees: Vec3::new(90.0, 0.0, 180.0),
            seed: 0x5eed,
        }
    }
}

/// Bullet flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletConfig {
    /// Speed in units per second
    pub speed: f32,

    /// Seconds a bullet lives
    pub lifetime: f32,

    /// Collider
    pub capsule: Capsule,

    /// Uniform scale of the bullet quad
    pub scale: f32,
}

impl Default for BulletConfig {
    fn default() -> Self {
        Self {
            speed: 15.0,
            lifetime: 1.0,
            capsule: Capsule::new(0.3, 0.03),
            scale: 0.3,
        }
    }
}

/// Fire rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShootingConfig {
    /// Minimum seconds between shots
    pub fire_interval: f32,
}

impl Default for ShootingConfig {
    fn default() -> Self {
        Self { fire_interval: 0.1 }
    }
}

/// Follow camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Camera position relative to the player
    pub offset: Vec3,

    /// Vertical field of view in degrees
    pub fov_y_degrees: f32,

    /// Near clip plane
    pub near: f32,

    /// Far clip plane
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            offset: Vec3::new(-4.0, 4.3, 0.0),
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 10.0,
        }
    }
}

/// Animation blending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Seconds for a state weight to fade from 1 to 0
    pub transition_time: f32,

    /// Clip of the player scene holding every state's ticks
    pub clip: usize,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            transition_time: 0.2,
            clip: 0,
        }
    }
}

/// Screen flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreensConfig {
    /// Seconds the game-over screen ignores taps
    pub game_over_pause: f32,
}

impl Default for ScreensConfig {
    fn default() -> Self {
        Self { game_over_pause: 3.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::path::Path;

    #[test]
    fn test_shipped_config_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/default.toml");
        let loaded = GameConfig::load_from_file(path).unwrap();
        let defaults = GameConfig::default();

        assert_eq!(loaded.scene, defaults.scene);
        assert_eq!(loaded.player.initial_health, 100);
        assert_relative_eq!(loaded.player.model_scale, 0.0044);
        assert_relative_eq!(loaded.player.muzzle_offset, defaults.player.muzzle_offset);
        assert_eq!(loaded.enemy.spawns_per_interval, 1);
        assert_eq!(loaded.enemy.seed, defaults.enemy.seed);
        assert_relative_eq!(loaded.enemy.capsule.height, 0.4);
        assert_relative_eq!(loaded.bullet.speed, 15.0);
        assert_relative_eq!(loaded.shooting.fire_interval, 0.1);
        assert_relative_eq!(loaded.camera.offset, defaults.camera.offset);
        assert_relative_eq!(loaded.animation.transition_time, 0.2);
        assert_relative_eq!(loaded.screens.game_over_pause, 3.0);
    }

    #[test]
    fn test_partial_config_keeps_other_defaults() {
        let path = std::env::temp_dir().join(format!("horde_shooter_{}_partial.toml", std::process::id()));
        std::fs::write(&path, "[enemy]\nspawn_radius = 4.0\n").unwrap();

        let config = GameConfig::load_from_file(&path).unwrap();
        assert_relative_eq!(config.enemy.spawn_radius, 4.0);
        assert_relative_eq!(config.enemy.speed, 0.6);
        assert_eq!(config.scene.bullet_pool_capacity, 16);
        std::fs::remove_file(path).ok();
    }
}
