//! Imported scene data model
//!
//! The raw structure an importer hands to the simulation: a node tree with
//! local transforms, source meshes with bone weight tables, and animation
//! clips made of per-node keyframe channels. Keyframe times are in ticks.

use serde::{Deserialize, Serialize};

use super::AssetError;
use crate::foundation::math::{Mat4, Quat, Vec2, Vec3};

/// A node of the scene hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    /// Node name, matched against bone and channel names
    pub name: String,
    /// Rest transform relative to the parent
    pub transform: Mat4,
    /// Indices into [`ImportedScene::meshes`] drawn at this node
    #[serde(default)]
    pub meshes: Vec<usize>,
    /// Child nodes
    #[serde(default)]
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    /// Leaf node without meshes
    pub fn new(name: impl Into<String>, transform: Mat4) -> Self {
        Self {
            name: name.into(),
            transform,
            meshes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Depth-first visit of this node and its descendants
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a SceneNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// Influence of a bone on one vertex
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VertexWeight {
    /// Vertex index within the mesh
    pub vertex: u32,
    /// Influence weight
    pub weight: f32,
}

/// Skinning bone of a mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bone {
    /// Name of the node that animates this bone
    pub name: String,
    /// Mesh space to bone space
    pub offset: Mat4,
    /// Vertices influenced by this bone
    pub weights: Vec<VertexWeight>,
}

/// Geometry of one mesh as imported
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMesh {
    /// Mesh name
    pub name: String,
    /// Bind-pose vertex positions
    pub positions: Vec<Vec3>,
    /// Vertex normals
    pub normals: Vec<Vec3>,
    /// First UV channel, empty when the mesh has none
    #[serde(default)]
    pub uvs: Vec<Vec2>,
    /// Triangles
    pub faces: Vec<[u32; 3]>,
    /// Skinning bones, empty for rigid meshes
    #[serde(default)]
    pub bones: Vec<Bone>,
}

impl SourceMesh {
    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Flattened triangle indices
    pub fn indices(&self) -> Vec<u32> {
        self.faces.iter().flatten().copied().collect()
    }
}

/// Rotation keyframe
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuatKey {
    /// Time in ticks
    pub time: f32,
    /// Rotation at this key
    pub value: Quat,
}

/// Translation keyframe
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VectorKey {
    /// Time in ticks
    pub time: f32,
    /// Translation at this key
    pub value: Vec3,
}

/// Keyframes driving one node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeChannel {
    /// Animated node
    pub node: String,
    /// Rotation keys ordered by time
    #[serde(default)]
    pub rotation_keys: Vec<QuatKey>,
    /// Translation keys ordered by time
    #[serde(default)]
    pub position_keys: Vec<VectorKey>,
}

/// A named animation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    /// Clip name
    pub name: String,
    /// Playback rate
    pub ticks_per_second: f32,
    /// Length in ticks
    pub duration: f32,
    /// Per-node keyframes
    pub channels: Vec<NodeChannel>,
}

impl AnimationClip {
    /// Channel animating `node`, if any
    pub fn channel(&self, node: &str) -> Option<&NodeChannel> {
        self.channels.iter().find(|channel| channel.node == node)
    }
}

/// Everything an importer produces for one scene file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedScene {
    /// Hierarchy root
    pub root: SceneNode,
    /// Meshes referenced by nodes
    pub meshes: Vec<SourceMesh>,
    /// Animation clips
    #[serde(default)]
    pub animations: Vec<AnimationClip>,
}

impl ImportedScene {
    /// Check internal references so later per-frame code can index freely
    pub fn validate(&self) -> Result<(), AssetError> {
        if self.meshes.is_empty() {
            return Err(AssetError::InvalidData("scene has no meshes".to_string()));
        }

        let mut bad_node = None;
        self.root.walk(&mut |node| {
            if bad_node.is_none() && node.meshes.iter().any(|&index| index >= self.meshes.len()) {
                bad_node = Some(node.name.clone());
            }
        });
        if let Some(name) = bad_node {
            return Err(AssetError::InvalidData(format!("node '{name}' references a missing mesh")));
        }

        for mesh in &self.meshes {
            let count = mesh.vertex_count();
            if mesh.normals.len() != count || !(mesh.uvs.is_empty() || mesh.uvs.len() == count) {
                return Err(AssetError::InvalidData(format!(
                    "mesh '{}' has mismatched attribute lengths",
                    mesh.name
                )));
            }
            let out_of_range = |vertex: u32| vertex as usize >= count;
            if mesh.faces.iter().flatten().copied().any(out_of_range) {
                return Err(AssetError::InvalidData(format!("mesh '{}' has an out-of-range face index", mesh.name)));
            }
            if mesh.bones.iter().flat_map(|bone| &bone.weights).any(|w| out_of_range(w.vertex)) {
                return Err(AssetError::InvalidData(format!("mesh '{}' has an out-of-range bone weight", mesh.name)));
            }
        }

        for clip in &self.animations {
            if clip.ticks_per_second <= 0.0 {
                return Err(AssetError::InvalidData(format!("clip '{}' has no tick rate", clip.name)));
            }
        }
        Ok(())
    }

    /// Inverse of the root node transform
    pub fn root_inverse(&self) -> Result<Mat4, AssetError> {
        self.root.transform.try_inverse().ok_or(AssetError::SingularTransform(self.root.name.clone()))
    }

    /// Nodes that draw mesh `mesh_index`, depth first
    pub fn nodes_with_mesh(&self, mesh_index: usize) -> Vec<&SceneNode> {
        let mut found = Vec::new();
        self.root.walk(&mut |node| {
            if node.meshes.contains(&mesh_index) {
                found.push(node);
            }
        });
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn triangle_mesh(name: &str) -> SourceMesh {
        SourceMesh {
            name: name.to_string(),
            positions: vec![Vec3::zeros(), Vec3::x(), Vec3::z()],
            normals: vec![Vec3::y(); 3],
            uvs: Vec::new(),
            faces: vec![[0, 1, 2]],
            bones: Vec::new(),
        }
    }

    fn scene() -> ImportedScene {
        let mut child = SceneNode::new("body", Mat4::identity());
        child.meshes.push(0);
        let mut root = SceneNode::new("root", Mat4::new_scaling(2.0));
        root.children.push(child);
        ImportedScene {
            root,
            meshes: vec![triangle_mesh("body")],
            animations: Vec::new(),
        }
    }

    #[test]
    fn test_valid_scene_passes() {
        let scene = scene();
        scene.validate().unwrap();
        assert_eq!(scene.nodes_with_mesh(0).len(), 1);
        assert_eq!(scene.nodes_with_mesh(0)[0].name, "body");
        assert_eq!(scene.meshes[0].indices(), vec![0, 1, 2]);
    }

    #[test]
    fn test_root_inverse() {
        let inverse = scene().root_inverse().unwrap();
        assert_relative_eq!(inverse * Mat4::new_scaling(2.0), Mat4::identity(), epsilon = 1e-6);

        let mut singular = scene();
        singular.root.transform = Mat4::zeros();
        assert!(matches!(singular.root_inverse(), Err(AssetError::SingularTransform(_))));
    }

    #[test]
    fn test_rejects_dangling_references() {
        let mut scene = scene();
        scene.root.meshes.push(3);
        assert!(matches!(scene.validate(), Err(AssetError::InvalidData(_))));

        let mut scene = self::scene();
        scene.meshes[0].faces.push([0, 1, 9]);
        assert!(scene.validate().is_err());

        let mut scene = self::scene();
        scene.meshes[0].bones.push(Bone {
            name: "body".to_string(),
            offset: Mat4::identity(),
            weights: vec![VertexWeight { vertex: 5, weight: 1.0 }],
        });
        assert!(scene.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_scene() {
        let mut scene = scene();
        scene.meshes.clear();
        scene.root.children.clear();
        assert!(scene.validate().is_err());
    }
}
