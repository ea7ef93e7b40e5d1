//! Scene construction
//!
//! Everything the simulation touches is created here, once: the fixed
//! entities (camera, floor, player, gun), both entity pools, their
//! components, and every buffer and texture handle. Frames only mutate
//! component values afterwards.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use horde_engine::assets::{ImportedScene, SceneImporter, SourceMesh};
use horde_engine::ecs::{Entity, EntityPool, World};
use horde_engine::foundation::math::{utils::deg_to_rad, Vec2, Vec3};
use horde_engine::render::{
    BufferService, BufferServiceExt, InstancedMeshId, Material, MaterialTexture, Mesh, RenderPassKind,
    RenderResources, TextureHandle, VertexAttribute,
};

use crate::components::{
    Animation, Camera, Collider, Health, Input, InstancedMeshComponent, Lifetime, Look, MeshComponent, Movement,
    Score, Transform,
};
use crate::config::GameConfig;
use crate::error::SceneError;
use crate::systems::animation::AnimState;

/// Scene mesh index of the player body
pub const PLAYER_MESH: usize = 0;

/// Scene mesh index of the gun
pub const GUN_MESH: usize = 1;

/// Half extents of the bullet quad before scaling
const BULLET_HALF_WIDTH: f32 = 0.243;
const BULLET_HALF_LENGTH: f32 = 0.5;

/// Loaded scene: the component store, both pools and the fixed entities
pub struct Scene {
    /// Component store
    pub world: World,

    /// Recycled enemies
    pub enemy_pool: EntityPool,

    /// Recycled bullets
    pub bullet_pool: EntityPool,

    player: Entity,
    gun: Entity,
    camera: Entity,
    floor: Entity,
    enemy_mesh: InstancedMeshId,
    bullet_mesh: InstancedMeshId,
}

impl Scene {
    /// Build the scene, importing meshes and creating every resource
    ///
    /// Any missing or corrupt asset aborts the whole load.
    pub fn load(
        config: &GameConfig,
        resources: &mut RenderResources,
        importer: &mut dyn SceneImporter,
    ) -> Result<Self, SceneError> {
        let mut world = World::new();
        let mut loader = Loader {
            config,
            resources,
            asset_dir: &config.scene.asset_dir,
        };

        let camera = world.create_entity();
        world.add_component(camera, Camera::default())?;

        let floor = loader.load_floor(&mut world)?;
        let (player, gun) = loader.load_player(&mut world, importer)?;
        let (enemy_mesh, enemy_pool) = loader.load_enemies(&mut world, importer)?;
        let (bullet_mesh, bullet_pool) = loader.load_bullets(&mut world)?;

        log::info!(
            "Scene loaded: {} entities, {} enemy slots, {} bullet slots",
            world.entity_count(),
            enemy_pool.capacity(),
            bullet_pool.capacity()
        );

        Ok(Self {
            world,
            enemy_pool,
            bullet_pool,
            player,
            gun,
            camera,
            floor,
            enemy_mesh,
            bullet_mesh,
        })
    }

    /// The controlled character
    pub fn player(&self) -> Entity {
        self.player
    }

    /// The weapon attached to the player
    pub fn gun(&self) -> Entity {
        self.gun
    }

    /// The follow camera
    pub fn camera(&self) -> Entity {
        self.camera
    }

    /// The ground plane
    pub fn floor(&self) -> Entity {
        self.floor
    }

    /// Shared enemy mesh
    pub fn enemy_mesh(&self) -> InstancedMeshId {
        self.enemy_mesh
    }

    /// Shared bullet mesh
    pub fn bullet_mesh(&self) -> InstancedMeshId {
        self.bullet_mesh
    }

    /// Game mesh entity for a scene mesh index of the player scene
    pub fn skinned_mesh_entity(&self, mesh_index: usize) -> Option<Entity> {
        self.world
            .query::<MeshComponent>()
            .find(|(_, mesh)| mesh.source_mesh == Some(mesh_index))
            .map(|(entity, _)| entity)
    }
}

struct Loader<'a> {
    config: &'a GameConfig,
    resources: &'a mut RenderResources,
    asset_dir: &'a Path,
}

impl Loader<'_> {
    fn asset(&self, relative: &Path) -> PathBuf {
        self.asset_dir.join(relative)
    }

    fn texture(&mut self, relative: &Path) -> Result<TextureHandle, SceneError> {
        let path = self.asset(relative);
        Ok(self.resources.textures.create_texture(&path)?)
    }

    fn import(&self, importer: &mut dyn SceneImporter, relative: &Path) -> Result<(PathBuf, ImportedScene), SceneError> {
        let path = self.asset(relative);
        let scene = importer.import(&path)?;
        Ok((path, scene))
    }

    fn load_floor(&mut self, world: &mut World) -> Result<Entity, SceneError> {
        let config = self.config;
        let scene = &config.scene;
        let half = scene.floor_size / 2.0;
        let wraps = scene.floor_uv_repeat;

        let positions: [f32; 18] = [
            -half, 0.0, -half,
            -half, 0.0, half,
            half, 0.0, half,
            -half, 0.0, -half,
            half, 0.0, half,
            half, 0.0, -half,
        ];
        let uvs: [f32; 12] = [
            0.0, 0.0,
            wraps, 0.0,
            wraps, wraps,
            0.0, 0.0,
            wraps, wraps,
            0.0, wraps,
        ];
        let normals: Vec<f32> = std::iter::repeat([0.0, 1.0, 0.0]).take(6).flatten().collect();

        let buffers = &mut *self.resources.buffers;
        let mut mesh = Mesh::new();
        mesh.set_vertex_buffer(VertexAttribute::Position, buffers.create_buffer_from(&positions)?);
        mesh.set_vertex_buffer(VertexAttribute::Normal, buffers.create_buffer_from(&normals)?);
        mesh.set_vertex_buffer(VertexAttribute::Uv, buffers.create_buffer_from(&uvs)?);
        mesh.vertex_count = 6;

        let textures = &scene.textures;
        mesh.material = Material::new()
            .with_texture(MaterialTexture::Diffuse, self.texture(&textures.floor_diffuse)?)
            .with_texture(MaterialTexture::Normal, self.texture(&textures.floor_normal)?)
            .with_texture(MaterialTexture::Specular, self.texture(&textures.floor_specular)?);

        let floor = world.create_entity();
        world.add_component(
            floor,
            MeshComponent {
                mesh,
                pass: RenderPassKind::Floor,
                source_mesh: None,
                is_visible: true,
            },
        )?;
        world.add_component(
            floor,
            Transform {
                euler_angles: Vec3::new(0.0, deg_to_rad(scene.floor_rotation_degrees), 0.0),
                ..Transform::default()
            },
        )?;
        Ok(floor)
    }

    fn load_player(&mut self, world: &mut World, importer: &mut dyn SceneImporter) -> Result<(Entity, Entity), SceneError> {
        let config = self.config;
        let (path, imported) = self.import(importer, &config.scene.player_scene)?;
        for index in [PLAYER_MESH, GUN_MESH] {
            if index >= imported.meshes.len() {
                return Err(SceneError::MissingMesh { scene: path, index });
            }
        }
        let clip = config.animation.clip;
        if clip >= imported.animations.len() {
            return Err(SceneError::MissingClip { scene: path, index: clip });
        }
        let required = AnimState::ALL
            .iter()
            .map(|state| state.tick_range().1)
            .fold(0.0_f32, f32::max);
        let duration = imported.animations[clip].duration;
        if duration < required {
            return Err(SceneError::ClipTooShort {
                scene: path,
                index: clip,
                duration,
                required,
            });
        }
        let global_inverse = imported.root_inverse()?;
        let imported = Arc::new(imported);

        let player_cfg = &config.player;
        let textures = &config.scene.textures;

        let mut body = self.upload_source_mesh(&imported.meshes[PLAYER_MESH])?;
        body.material = Material::new()
            .with_texture(MaterialTexture::Diffuse, self.texture(&textures.player_diffuse)?)
            .with_texture(MaterialTexture::Specular, self.texture(&textures.player_specular)?);

        let mut gun_mesh = self.upload_source_mesh(&imported.meshes[GUN_MESH])?;
        gun_mesh.material = Material::new()
            .with_texture(MaterialTexture::Diffuse, self.texture(&textures.gun_diffuse)?)
            .with_texture(MaterialTexture::Specular, self.texture(&textures.gun_specular)?);

        let player = world.create_entity();
        world.add_component(player, Transform::with_scale(player_cfg.model_scale))?;
        world.add_component(player, Movement::with_speed(player_cfg.speed))?;
        world.add_component(player, Health { health: player_cfg.initial_health })?;
        world.add_component(player, Input::default())?;
        world.add_component(player, Look::default())?;
        world.add_component(player, Score::default())?;
        world.add_component(
            player,
            Animation::new(Arc::clone(&imported), clip, global_inverse, config.animation.transition_time),
        )?;
        world.add_component(
            player,
            MeshComponent {
                mesh: body,
                pass: RenderPassKind::Player,
                source_mesh: Some(PLAYER_MESH),
                is_visible: true,
            },
        )?;

        let gun = world.create_entity();
        world.add_component(gun, Transform::with_scale(player_cfg.model_scale))?;
        world.add_component(gun, Movement::with_speed(player_cfg.speed))?;
        world.add_component(
            gun,
            MeshComponent {
                mesh: gun_mesh,
                pass: RenderPassKind::Player,
                source_mesh: Some(GUN_MESH),
                is_visible: true,
            },
        )?;

        Ok((player, gun))
    }

    fn load_enemies(
        &mut self,
        world: &mut World,
        importer: &mut dyn SceneImporter,
    ) -> Result<(InstancedMeshId, EntityPool), SceneError> {
        let config = self.config;
        let (path, imported) = self.import(importer, &config.scene.enemy_scene)?;
        let source = imported
            .meshes
            .first()
            .ok_or_else(|| SceneError::MissingMesh { scene: path, index: 0 })?;

        let mut mesh = self.upload_source_mesh(source)?;
        mesh.material = Material::new().with_texture(MaterialTexture::Diffuse, self.texture(&config.scene.textures.enemy_diffuse)?);

        let capacity = config.scene.enemy_pool_capacity;
        let mesh_id = self.resources.instanced_meshes.register(
            &mut *self.resources.buffers,
            mesh,
            RenderPassKind::Enemy,
            capacity,
            true,
        )?;

        let enemy = &config.enemy;
        let euler = enemy.euler_degrees.map(deg_to_rad);
        let pool = EntityPool::create(world, capacity, |world, entity| {
            world.add_component(
                entity,
                Transform {
                    euler_angles: euler,
                    ..Transform::with_scale(enemy.scale)
                },
            )?;
            world.add_component(entity, Movement::with_speed(enemy.speed))?;
            world.add_component(entity, Collider { capsule: enemy.capsule })?;
            world.add_component(entity, InstancedMeshComponent { mesh: mesh_id, is_visible: false })?;
            Ok::<_, SceneError>(())
        })?;

        Ok((mesh_id, pool))
    }

    fn load_bullets(&mut self, world: &mut World) -> Result<(InstancedMeshId, EntityPool), SceneError> {
        let config = self.config;
        let bullet = &config.bullet;
        let w = bullet.scale * BULLET_HALF_WIDTH;
        let l = bullet.scale * BULLET_HALF_LENGTH;
        let positions: [f32; 12] = [
            -w, 0.0, -l,
            -w, 0.0, l,
            w, 0.0, l,
            w, 0.0, -l,
        ];
        let uvs: [f32; 8] = [1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let indices: [u32; 6] = [0, 1, 2, 0, 2, 3];

        let buffers = &mut *self.resources.buffers;
        let mut mesh = Mesh::new();
        mesh.set_vertex_buffer(VertexAttribute::Position, buffers.create_buffer_from(&positions)?);
        mesh.set_vertex_buffer(VertexAttribute::Uv, buffers.create_buffer_from(&uvs)?);
        mesh.index_buffer = Some(buffers.create_buffer_from(&indices)?);
        mesh.vertex_count = 4;
        mesh.index_count = indices.len();

        mesh.material = Material::new().with_texture(MaterialTexture::Diffuse, self.texture(&config.scene.textures.bullet_diffuse)?);

        let capacity = config.scene.bullet_pool_capacity;
        let mesh_id = self.resources.instanced_meshes.register(
            &mut *self.resources.buffers,
            mesh,
            RenderPassKind::Bullet,
            capacity,
            false,
        )?;

        let pool = EntityPool::create(world, capacity, |world, entity| {
            world.add_component(entity, Transform::default())?;
            world.add_component(entity, Movement::with_speed(bullet.speed))?;
            world.add_component(entity, Collider { capsule: bullet.capsule })?;
            world.add_component(entity, Lifetime::default())?;
            world.add_component(entity, InstancedMeshComponent { mesh: mesh_id, is_visible: false })?;
            Ok::<_, SceneError>(())
        })?;

        Ok((mesh_id, pool))
    }

    /// Upload every attribute stream of an imported mesh
    ///
    /// Positions start in bind pose; skinned meshes overwrite them per frame.
    fn upload_source_mesh(&mut self, source: &SourceMesh) -> Result<Mesh, SceneError> {
        let vertex_count = source.vertex_count();
        let positions: Vec<f32> = source.positions.iter().flat_map(|p| [p.x, p.y, p.z]).collect();
        let normals: Vec<f32> = source.normals.iter().flat_map(|n| [n.x, n.y, n.z]).collect();
        let uvs: Vec<f32> = if source.uvs.is_empty() {
            vec![0.0; vertex_count * VertexAttribute::Uv.components()]
        } else {
            source.uvs.iter().flat_map(|uv: &Vec2| [uv.x, uv.y]).collect()
        };
        let indices = source.indices();

        let buffers: &mut dyn BufferService = &mut *self.resources.buffers;
        let mut mesh = Mesh::new();
        mesh.set_vertex_buffer(VertexAttribute::Position, buffers.create_buffer_from(&positions)?);
        mesh.set_vertex_buffer(VertexAttribute::Normal, buffers.create_buffer_from(&normals)?);
        mesh.set_vertex_buffer(VertexAttribute::Uv, buffers.create_buffer_from(&uvs)?);
        mesh.index_buffer = Some(buffers.create_buffer_from(&indices)?);
        mesh.vertex_count = vertex_count;
        mesh.index_count = indices.len();
        Ok(mesh)
    }
}
