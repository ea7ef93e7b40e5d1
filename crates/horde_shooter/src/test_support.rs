//! Synthetic scenes for tests
//!
//! Compiled for this crate's unit tests and, behind the `test-support`
//! feature, for integration tests.

use std::path::Path;

use horde_engine::assets::{
    AnimationClip, Bone, ImportedScene, MemorySceneImporter, NodeChannel, QuatKey, SceneNode, SourceMesh, VectorKey,
    VertexWeight,
};
use horde_engine::foundation::math::{Mat4, Quat, Vec3};
use horde_engine::render::{HostBufferService, RenderError, RenderResources, TextureHandle, TextureService};

use crate::config::GameConfig;
use crate::error::SceneError;
use crate::scene::Scene;

/// Hands out handles without touching the filesystem
#[derive(Default)]
pub struct StubTextures {
    next: u32,
}

impl TextureService for StubTextures {
    fn create_texture(&mut self, _path: &Path) -> Result<TextureHandle, RenderError> {
        self.next += 1;
        Ok(TextureHandle(self.next - 1))
    }
}

fn triangle(name: &str, bones: Vec<Bone>) -> SourceMesh {
    SourceMesh {
        name: name.to_string(),
        positions: vec![Vec3::zeros(), Vec3::x(), Vec3::z()],
        normals: vec![Vec3::y(); 3],
        uvs: Vec::new(),
        faces: vec![[0, 1, 2]],
        bones,
    }
}

/// Body skinned to a "hips" node that every state lifts by one unit; rigid gun
pub fn player_scene() -> ImportedScene {
    let hips_bone = Bone {
        name: "hips".to_string(),
        offset: Mat4::identity(),
        weights: (0..3).map(|vertex| VertexWeight { vertex, weight: 1.0 }).collect(),
    };

    let mut body = SceneNode::new("body", Mat4::identity());
    body.meshes.push(0);
    let mut gun = SceneNode::new("gun", Mat4::identity());
    gun.meshes.push(1);
    let mut root = SceneNode::new("root", Mat4::identity());
    root.children = vec![SceneNode::new("hips", Mat4::identity()), body, gun];

    let clip = AnimationClip {
        name: "all".to_string(),
        ticks_per_second: 30.0,
        duration: 300.0,
        channels: vec![NodeChannel {
            node: "hips".to_string(),
            rotation_keys: vec![QuatKey {
                time: 300.0,
                value: Quat::identity(),
            }],
            position_keys: vec![VectorKey {
                time: 300.0,
                value: Vec3::new(0.0, 1.0, 0.0),
            }],
        }],
    };

    ImportedScene {
        root,
        meshes: vec![triangle("body", vec![hips_bone]), triangle("gun", Vec::new())],
        animations: vec![clip],
    }
}

/// One rigid enemy mesh
pub fn enemy_scene() -> ImportedScene {
    let mut root = SceneNode::new("enemy", Mat4::identity());
    root.meshes.push(0);
    ImportedScene {
        root,
        meshes: vec![triangle("enemy", Vec::new())],
        animations: Vec::new(),
    }
}

/// Importer serving both scenes at the default config paths
pub fn importer(config: &GameConfig) -> MemorySceneImporter {
    let dir = &config.scene.asset_dir;
    MemorySceneImporter::new()
        .with_scene(dir.join(&config.scene.player_scene), player_scene())
        .with_scene(dir.join(&config.scene.enemy_scene), enemy_scene())
}

/// Host buffers and stub textures
pub fn resources() -> RenderResources {
    RenderResources::new(Box::new(HostBufferService::new()), Box::new(StubTextures::default()))
}

/// Default-config scene and the resources it was loaded into
pub fn load_scene_with_resources() -> Result<(Scene, RenderResources), SceneError> {
    let config = GameConfig::default();
    let mut resources = resources();
    let scene = Scene::load(&config, &mut resources, &mut importer(&config))?;
    Ok((scene, resources))
}

/// Default-config scene
pub fn load_scene() -> Result<Scene, SceneError> {
    load_scene_with_resources().map(|(scene, _)| scene)
}
