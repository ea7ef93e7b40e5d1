//! Scene importers
//!
//! Importers are services: the game receives one at load time and never
//! reaches for a global instance.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::{AssetError, ImportedScene};

/// Produces [`ImportedScene`]s from some source
pub trait SceneImporter {
    /// Import and validate the scene at `path`
    fn import(&mut self, path: &Path) -> Result<ImportedScene, AssetError>;
}

/// Reads scenes serialised as RON
#[derive(Debug, Default)]
pub struct RonSceneImporter;

impl RonSceneImporter {
    /// Create an importer
    pub fn new() -> Self {
        Self
    }
}

impl SceneImporter for RonSceneImporter {
    fn import(&mut self, path: &Path) -> Result<ImportedScene, AssetError> {
        let contents = std::fs::read_to_string(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let scene: ImportedScene = ron::from_str(&contents).map_err(|e| AssetError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        scene.validate()?;

        log::info!(
            "Imported {:?}: {} meshes, {} animations",
            path,
            scene.meshes.len(),
            scene.animations.len()
        );
        Ok(scene)
    }
}

/// Serves scenes registered in memory, keyed by path
#[derive(Debug, Default)]
pub struct MemorySceneImporter {
    scenes: HashMap<PathBuf, ImportedScene>,
}

impl MemorySceneImporter {
    /// Create an empty importer
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scene under `path`
    pub fn insert(&mut self, path: impl Into<PathBuf>, scene: ImportedScene) {
        self.scenes.insert(path.into(), scene);
    }

    /// Builder-style [`insert`](Self::insert)
    #[must_use]
    pub fn with_scene(mut self, path: impl Into<PathBuf>, scene: ImportedScene) -> Self {
        self.insert(path, scene);
        self
    }
}

impl SceneImporter for MemorySceneImporter {
    fn import(&mut self, path: &Path) -> Result<ImportedScene, AssetError> {
        let scene = self
            .scenes
            .get(path)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(path.display().to_string()))?;
        scene.validate()?;
        Ok(scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{SceneNode, SourceMesh};
    use crate::foundation::math::{Mat4, Vec3};

    fn single_mesh_scene() -> ImportedScene {
        let mut root = SceneNode::new("root", Mat4::identity());
        root.meshes.push(0);
        ImportedScene {
            root,
            meshes: vec![SourceMesh {
                name: "quad".to_string(),
                positions: vec![Vec3::zeros(); 3],
                normals: vec![Vec3::y(); 3],
                uvs: Vec::new(),
                faces: vec![[0, 1, 2]],
                bones: Vec::new(),
            }],
            animations: Vec::new(),
        }
    }

    #[test]
    fn test_ron_round_trip_through_file() {
        let scene = single_mesh_scene();
        let path = std::env::temp_dir().join(format!("horde_engine_{}_scene.ron", std::process::id()));
        std::fs::write(&path, ron::ser::to_string(&scene).unwrap()).unwrap();

        let imported = RonSceneImporter::new().import(&path).unwrap();
        assert_eq!(imported, scene);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_ron_errors_are_reported() {
        let path = std::env::temp_dir().join(format!("horde_engine_{}_broken.ron", std::process::id()));
        std::fs::write(&path, "(root: oops)").unwrap();
        assert!(matches!(RonSceneImporter::new().import(&path), Err(AssetError::Parse { .. })));
        std::fs::remove_file(&path).ok();

        assert!(matches!(RonSceneImporter::new().import(&path), Err(AssetError::Io { .. })));
    }

    #[test]
    fn test_memory_importer_lookup() {
        let mut importer = MemorySceneImporter::new().with_scene("player.ron", single_mesh_scene());
        assert!(importer.import(Path::new("player.ron")).is_ok());
        assert!(matches!(importer.import(Path::new("enemy.ron")), Err(AssetError::NotFound(_))));
    }
}
