//! Game orchestrator
//!
//! Owns the scene, the render resources and every system, and drives one
//! frame at a time in a fixed order.

use horde_engine::assets::SceneImporter;
use horde_engine::foundation::math::Vec2;
use horde_engine::foundation::time::FrameTime;
use horde_engine::render::RenderResources;

use crate::components::{Health, Input, Score};
use crate::config::GameConfig;
use crate::error::{SceneError, SimulationError};
use crate::frame::{collect_frame, FramePacket};
use crate::scene::Scene;
use crate::screens::{ScoreLabel, ScreenState, Screens};
use crate::systems::animation::BlendWeights;
use crate::systems::{
    BulletSystem, CameraSystem, EnemySystem, PlayerAnimationSystem, PlayerInputSystem, RestartSystem, ShootingSystem,
};

/// Processed touch intent for one frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayerIntent {
    /// Stick direction on the XZ plane
    pub direction: Vec2,
    /// Facing angle in radians
    pub theta: f32,
    /// Whether the stick is deflected
    pub is_moving: bool,
    /// Fire this frame
    pub is_shooting: bool,
}

/// The running game
pub struct Game {
    config: GameConfig,
    scene: Scene,
    resources: RenderResources,
    input: PlayerInputSystem,
    enemies: EnemySystem,
    bullets: BulletSystem,
    shooting: ShootingSystem,
    animation: PlayerAnimationSystem,
    camera: CameraSystem,
    restart: RestartSystem,
    screens: Screens,
    score_label: ScoreLabel,
    tapped: bool,
}

impl Game {
    /// Load the scene and set up every system from `config`
    pub fn load(
        config: &GameConfig,
        mut resources: RenderResources,
        importer: &mut dyn SceneImporter,
    ) -> Result<Self, SceneError> {
        let scene = Scene::load(config, &mut resources, importer)?;
        Ok(Self {
            config: config.clone(),
            scene,
            resources,
            input: PlayerInputSystem::new(),
            enemies: EnemySystem::new(&config.enemy, &config.player),
            bullets: BulletSystem::new(),
            shooting: ShootingSystem::new(&config.shooting, &config.bullet, &config.player),
            animation: PlayerAnimationSystem::new(),
            camera: CameraSystem::new(&config.camera),
            restart: RestartSystem::new(&config.player, &config.animation),
            screens: Screens::new(&config.screens),
            score_label: ScoreLabel::new(),
            tapped: false,
        })
    }

    /// Settings the game was loaded with
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The simulated scene
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable scene access for hosts and tests
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Buffers, textures and instanced meshes
    pub fn resources(&self) -> &RenderResources {
        &self.resources
    }

    /// Current screen
    pub fn screen(&self) -> ScreenState {
        self.screens.state()
    }

    /// HUD score text
    pub fn score_label(&self) -> &str {
        self.score_label.as_str()
    }

    /// Animation weights of the last frame
    pub fn animation_weights(&self) -> BlendWeights {
        self.animation.weights()
    }

    /// Copy this frame's intent into the player's input
    ///
    /// A pending restart request is left untouched.
    pub fn apply_input(&mut self, intent: PlayerIntent) -> Result<(), SimulationError> {
        let player = self.scene.player();
        let input = self.scene.world.get_component_mut::<Input>(player)?;
        input.direction = intent.direction;
        input.theta = intent.theta;
        input.is_moving = intent.is_moving;
        input.is_shooting = intent.is_shooting;
        Ok(())
    }

    /// Record a tap for the screen flow
    pub fn tap(&mut self) {
        self.tapped = true;
    }

    /// Run one frame and collect what the renderer needs
    pub fn update(&mut self, time: FrameTime, aspect: f32) -> Result<FramePacket, SimulationError> {
        let scene = &mut self.scene;
        self.input.update(scene, time)?;
        self.enemies.update(scene, time)?;
        self.bullets.update(scene, time)?;
        self.shooting.update(scene, time)?;
        self.animation.update(scene, &mut *self.resources.buffers, time)?;
        self.camera.update(scene, aspect)?;
        let restarted = self.restart.update(scene)?;

        let player = scene.player();
        let dead = scene.world.get_component::<Health>(player)?.is_dead();
        let tapped = std::mem::take(&mut self.tapped);
        if self.screens.update(dead, restarted, time.delta, tapped) {
            scene.world.get_component_mut::<Input>(player)?.is_restarting = true;
        }
        self.score_label.update(scene.world.get_component::<Score>(player)?.value);

        collect_frame(&self.scene, &mut self.resources)
    }
}
