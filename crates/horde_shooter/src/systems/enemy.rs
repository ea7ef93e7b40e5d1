//! Enemy spawning, steering and the lose condition

use horde_engine::foundation::math::{constants::PI, utils::deg_to_rad, Vec3};
use horde_engine::foundation::time::FrameTime;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::components::{Collider, Health, InstancedMeshComponent, Movement, Transform};
use crate::config::{EnemyConfig, PlayerConfig};
use crate::error::SimulationError;
use crate::scene::Scene;

use super::player_is_dead;

/// Spawns enemies around the player on a timer and walks them toward it
///
/// The countdown is advanced by adding the interval rather than resetting
/// it, so spawn times do not drift with frame jitter.
#[derive(Debug)]
pub struct EnemySystem {
    config: EnemyConfig,
    gun_height: f32,
    player_radius: f32,
    countdown: f32,
    rng: StdRng,
}

impl EnemySystem {
    /// Create the system; the first batch spawns one interval after start
    pub fn new(config: &EnemyConfig, player: &PlayerConfig) -> Self {
        Self {
            config: config.clone(),
            gun_height: player.gun_height,
            player_radius: player.collision_radius,
            countdown: config.spawn_interval,
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    /// Seconds until the next batch
    pub fn countdown(&self) -> f32 {
        self.countdown
    }

    /// Spawn due enemies, steer every active one and test it against the player
    pub fn update(&mut self, scene: &mut Scene, time: FrameTime) -> Result<(), SimulationError> {
        if player_is_dead(scene)? {
            return Ok(());
        }

        let player = scene.player();
        let player_transform = *scene.world.get_component::<Transform>(player)?;
        let player_position = player_transform.position;
        let monster_y = player_transform.scale.x * self.gun_height;

        self.countdown -= time.delta;
        if self.countdown <= 0.0 {
            self.spawn_batch(scene, player_position, monster_y)?;
            self.countdown += self.config.spawn_interval;
        }

        let target = Vec3::new(player_position.x, monster_y, player_position.z);
        let speed_step = self.config.speed * time.delta;
        let player_radius = self.player_radius;

        let world = &mut scene.world;
        let hit = scene.enemy_pool.try_find_first_if(|enemy| {
            let transform = world.get_component_mut::<Transform>(enemy)?;
            let mut to_player = player_position - transform.position;
            to_player.y = 0.0;
            let direction = to_player.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros);
            if direction != Vec3::zeros() {
                transform.position += direction * speed_step;
                transform.euler_angles.y = facing_angle(direction);
            }
            let position = transform.position;

            world.get_component_mut::<Movement>(enemy)?.direction = direction.xz();

            let capsule = world.get_component::<Collider>(enemy)?.capsule;
            Ok::<_, SimulationError>(capsule.touches_point(position, direction, target, player_radius))
        })?;

        if let Some(enemy) = hit {
            scene.world.get_component_mut::<Health>(player)?.health = 0;
            log::info!("Player caught by {} at {:.2?}", enemy, player_position);
        }
        Ok(())
    }

    fn spawn_batch(&mut self, scene: &mut Scene, around: Vec3, height: f32) -> Result<(), SimulationError> {
        for _ in 0..self.config.spawns_per_interval {
            let Some(enemy) = scene.enemy_pool.checkout() else {
                break;
            };

            let theta = deg_to_rad(f32::from(self.rng.gen_range(0_u16..360)));
            let position = Vec3::new(
                around.x + theta.sin() * self.config.spawn_radius,
                height,
                around.z + theta.cos() * self.config.spawn_radius,
            );
            scene.world.get_component_mut::<Transform>(enemy)?.position = position;
            scene.world.get_component_mut::<InstancedMeshComponent>(enemy)?.is_visible = true;
            log::debug!("Spawned {} at {:.2?}", enemy, position);
        }
        Ok(())
    }
}

/// Yaw that turns the enemy model toward `direction`
fn facing_angle(direction: Vec3) -> f32 {
    (direction.x / direction.z).atan() + if direction.z < 0.0 { 0.0 } else { PI }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::test_support::load_scene;
    use approx::assert_relative_eq;

    fn system() -> EnemySystem {
        let config = GameConfig::default();
        EnemySystem::new(&config.enemy, &config.player)
    }

    #[test]
    fn test_countdown_adds_interval() {
        let mut scene = load_scene().unwrap();
        let mut enemies = system();

        enemies.update(&mut scene, FrameTime::new(0.6, 0.6)).unwrap();
        assert!(scene.enemy_pool.active().is_empty());

        enemies.update(&mut scene, FrameTime::new(0.6, 1.2)).unwrap();
        assert_eq!(scene.enemy_pool.active().len(), 1);
        assert_relative_eq!(enemies.countdown(), 0.8, epsilon = 1e-5);
    }

    #[test]
    fn test_spawn_on_ring_at_gun_height() {
        let mut scene = load_scene().unwrap();
        let mut enemies = system();
        enemies.update(&mut scene, FrameTime::new(1.0, 1.0)).unwrap();

        let enemy = scene.enemy_pool.active()[0];
        let transform = scene.world.get_component::<Transform>(enemy).unwrap();
        let flat = Vec3::new(transform.position.x, 0.0, transform.position.z);

        // Spawned at radius 10, then stepped 0.6 toward the player.
        assert_relative_eq!(flat.magnitude(), 9.4, epsilon = 1e-3);
        assert_relative_eq!(transform.position.y, 0.0044 * 120.0, epsilon = 1e-5);
        assert!(scene.world.get_component::<InstancedMeshComponent>(enemy).unwrap().is_visible);
    }

    #[test]
    fn test_exhausted_pool_skips_spawn() {
        let mut scene = load_scene().unwrap();
        let mut enemies = system();
        while scene.enemy_pool.checkout().is_some() {}

        enemies.update(&mut scene, FrameTime::new(1.0, 1.0)).unwrap();
        assert_eq!(scene.enemy_pool.idle().len(), 0);
        assert_relative_eq!(enemies.countdown(), 1.0);
    }

    #[test]
    fn test_facing_angle_points_model_at_target() {
        assert_relative_eq!(facing_angle(Vec3::new(0.0, 0.0, -1.0)), 0.0);
        assert_relative_eq!(facing_angle(Vec3::new(0.0, 0.0, 1.0)), PI);
        assert_relative_eq!(facing_angle(Vec3::new(1.0, 0.0, 1.0)), PI / 4.0 + PI);
    }
}
