//! Bullet flight, expiry and hits

use horde_engine::foundation::time::FrameTime;

use crate::components::{Collider, InstancedMeshComponent, Lifetime, Movement, Score, Transform};
use crate::error::SimulationError;
use crate::scene::Scene;

use super::player_is_dead;

/// Advances bullets and resolves bullet-enemy hits
///
/// A bullet kills at most one enemy per frame, and an enemy leaves the
/// active set on its first hit, so no two bullets can claim it.
#[derive(Debug, Default)]
pub struct BulletSystem;

impl BulletSystem {
    /// Create the system
    pub fn new() -> Self {
        Self
    }

    /// Age, move and collide every active bullet
    pub fn update(&mut self, scene: &mut Scene, time: FrameTime) -> Result<(), SimulationError> {
        if player_is_dead(scene)? {
            return Ok(());
        }

        let player = scene.player();
        let Scene {
            world,
            enemy_pool,
            bullet_pool,
            ..
        } = scene;

        bullet_pool.try_release_if(|bullet| {
            let lifetime = world.get_component_mut::<Lifetime>(bullet)?;
            lifetime.remaining -= time.delta;
            if lifetime.remaining <= 0.0 {
                lifetime.remaining = 0.0;
                world.get_component_mut::<InstancedMeshComponent>(bullet)?.is_visible = false;
                return Ok(true);
            }

            let movement = *world.get_component::<Movement>(bullet)?;
            let direction = movement.direction_3d();
            let transform = world.get_component_mut::<Transform>(bullet)?;
            transform.position += direction * movement.speed * time.delta;
            let position = transform.position;
            let capsule = world.get_component::<Collider>(bullet)?.capsule;

            let hit = enemy_pool.try_release_first_if(|enemy| {
                let enemy_position = world.get_component::<Transform>(enemy)?.position;
                let enemy_direction = world.get_component::<Movement>(enemy)?.direction_3d();
                let enemy_capsule = world.get_component::<Collider>(enemy)?.capsule;
                Ok::<_, SimulationError>(capsule.touches_capsule(
                    position,
                    direction,
                    &enemy_capsule,
                    enemy_position,
                    enemy_direction,
                ))
            })?;

            let Some(enemy) = hit else {
                return Ok(false);
            };

            world.get_component_mut::<Lifetime>(bullet)?.remaining = 0.0;
            world.get_component_mut::<InstancedMeshComponent>(bullet)?.is_visible = false;
            world.get_component_mut::<InstancedMeshComponent>(enemy)?.is_visible = false;

            let score = world.get_component_mut::<Score>(player)?;
            score.value += 1;
            log::debug!("{} hit {}, score {}", bullet, enemy, score.value);
            Ok::<_, SimulationError>(true)
        })?;
        Ok(())
    }
}
