//! Game restart

use horde_engine::foundation::math::{Vec2, Vec3};

use crate::components::{
    Animation, Health, InstancedMeshComponent, Input, Lifetime, Look, Movement, Score, StateWeights, Transform,
};
use crate::config::{AnimationConfig, PlayerConfig};
use crate::error::SimulationError;
use crate::scene::Scene;

/// Rolls the scene back to its initial state when the player asks for it
///
/// Entities, components and resource handles are kept; only component
/// values change.
#[derive(Debug)]
pub struct RestartSystem {
    player: PlayerConfig,
    transition_time: f32,
}

impl RestartSystem {
    /// Create the system
    pub fn new(player: &PlayerConfig, animation: &AnimationConfig) -> Self {
        Self {
            player: player.clone(),
            transition_time: animation.transition_time,
        }
    }

    /// Reset the player, gun and both pools if a restart was requested
    ///
    /// Returns whether a restart happened.
    pub fn update(&mut self, scene: &mut Scene) -> Result<bool, SimulationError> {
        let player = scene.player();
        let input = scene.world.get_component_mut::<Input>(player)?;
        if !input.is_restarting {
            return Ok(false);
        }
        input.is_restarting = false;

        let animation = scene.world.get_component_mut::<Animation>(player)?;
        animation.transition_time = self.transition_time;
        animation.last_anim_time = 0.0;
        animation.death_time = -1.0;
        animation.previous = StateWeights::default();

        scene.world.get_component_mut::<Health>(player)?.health = self.player.initial_health;
        scene.world.get_component_mut::<Look>(player)?.direction = Vec2::zeros();
        scene.world.get_component_mut::<Score>(player)?.value = 0;

        for entity in [player, scene.gun()] {
            let movement = scene.world.get_component_mut::<Movement>(entity)?;
            movement.speed = self.player.speed;
            movement.direction = Vec2::zeros();

            let transform = scene.world.get_component_mut::<Transform>(entity)?;
            transform.position = Vec3::zeros();
            transform.euler_angles = Vec3::zeros();
        }

        let Scene {
            world,
            enemy_pool,
            bullet_pool,
            ..
        } = scene;

        let enemies = enemy_pool.try_release_if(|enemy| {
            world.get_component_mut::<InstancedMeshComponent>(enemy)?.is_visible = false;
            Ok::<_, SimulationError>(true)
        })?;
        let bullets = bullet_pool.try_release_if(|bullet| {
            world.get_component_mut::<Lifetime>(bullet)?.remaining = 0.0;
            world.get_component_mut::<InstancedMeshComponent>(bullet)?.is_visible = false;
            Ok::<_, SimulationError>(true)
        })?;

        log::info!("Restarted: released {} enemies and {} bullets", enemies, bullets);
        Ok(true)
    }
}
