//! Fire-rate gated shooting

use horde_engine::foundation::math::{oriented_angle, Mat4, Mat4Ext, Vec3, Vec4};
use horde_engine::foundation::time::FrameTime;

use crate::components::{InstancedMeshComponent, Input, Lifetime, Look, Movement, Transform};
use crate::config::{BulletConfig, PlayerConfig, ShootingConfig};
use crate::error::SimulationError;
use crate::scene::Scene;

use super::player_is_dead;

/// Turns shot requests into bullets leaving the gun muzzle
///
/// A shot request lasts one frame: the flag is cleared on every update,
/// whether or not a bullet was fired.
#[derive(Debug)]
pub struct ShootingSystem {
    fire_interval: f32,
    bullet_lifetime: f32,
    muzzle_offset: Vec3,
    last_fire_time: f32,
}

impl ShootingSystem {
    /// Create the system
    pub fn new(shooting: &ShootingConfig, bullet: &BulletConfig, player: &PlayerConfig) -> Self {
        Self {
            fire_interval: shooting.fire_interval,
            bullet_lifetime: bullet.lifetime,
            muzzle_offset: player.muzzle_offset,
            last_fire_time: 0.0,
        }
    }

    /// Fire if requested and the interval has passed, then clear the request
    pub fn update(&mut self, scene: &mut Scene, time: FrameTime) -> Result<(), SimulationError> {
        let fired = self.try_fire(scene, time);
        let player = scene.player();
        scene.world.get_component_mut::<Input>(player)?.is_shooting = false;
        fired
    }

    fn try_fire(&mut self, scene: &mut Scene, time: FrameTime) -> Result<(), SimulationError> {
        if player_is_dead(scene)? {
            return Ok(());
        }

        let player = scene.player();
        let requested = scene.world.get_component::<Input>(player)?.is_shooting;
        if !requested || self.last_fire_time + self.fire_interval >= time.since_start {
            return Ok(());
        }
        self.last_fire_time = time.since_start;

        let Some(bullet) = scene.bullet_pool.checkout() else {
            return Ok(());
        };

        let player_transform = *scene.world.get_component::<Transform>(player)?;
        let look = scene.world.get_component::<Look>(player)?.direction;
        let muzzle = player_transform.model_matrix() * self.muzzle_offset.push(1.0);

        let transform = scene.world.get_component_mut::<Transform>(bullet)?;
        transform.position = muzzle.xyz();
        transform.euler_angles.y = player_transform.euler_angles.y;

        scene.world.get_component_mut::<InstancedMeshComponent>(bullet)?.is_visible = true;
        scene.world.get_component_mut::<Lifetime>(bullet)?.remaining = self.bullet_lifetime;

        let aim = aim_angle(Vec3::new(look.x, 0.0, look.y)).unwrap_or(player_transform.euler_angles.y);
        let heading = Mat4::rotation_y(aim) * Vec4::new(0.0, 0.0, 1.0, 1.0);
        scene.world.get_component_mut::<Movement>(bullet)?.direction = heading.xz();

        log::debug!("Fired {} from {:.2?}", bullet, muzzle.xyz());
        Ok(())
    }
}

/// Signed angle from world forward (+Z) to `look`, about +Y
///
/// `None` when there is no aim to measure.
fn aim_angle(look: Vec3) -> Option<f32> {
    let look = look.try_normalize(f32::EPSILON)?;
    Some(oriented_angle(&Vec3::z(), &look, &Vec3::y()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::test_support::load_scene;
    use approx::assert_relative_eq;
    use horde_engine::foundation::math::{constants::PI, Vec2};

    fn system() -> ShootingSystem {
        let config = GameConfig::default();
        ShootingSystem::new(&config.shooting, &config.bullet, &config.player)
    }

    fn request_shot(scene: &mut Scene, look: Vec2) {
        let player = scene.player();
        scene.world.get_component_mut::<Input>(player).unwrap().is_shooting = true;
        scene.world.get_component_mut::<Look>(player).unwrap().direction = look;
    }

    #[test]
    fn test_fires_along_look_direction() {
        let mut scene = load_scene().unwrap();
        let mut shooting = system();
        request_shot(&mut scene, Vec2::new(1.0, 0.0));

        shooting.update(&mut scene, FrameTime::new(0.016, 0.5)).unwrap();

        let bullet = scene.bullet_pool.active()[0];
        let movement = scene.world.get_component::<Movement>(bullet).unwrap();
        assert_relative_eq!(movement.direction, Vec2::new(1.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(scene.world.get_component::<Lifetime>(bullet).unwrap().remaining, 1.0);
        assert!(scene.world.get_component::<InstancedMeshComponent>(bullet).unwrap().is_visible);

        // Muzzle offset scaled by the player model scale.
        let position = scene.world.get_component::<Transform>(bullet).unwrap().position;
        assert_relative_eq!(position, Vec3::new(-20.0, 120.0, 100.0) * 0.0044, epsilon = 1e-5);
    }

    #[test]
    fn test_request_always_cleared() {
        let mut scene = load_scene().unwrap();
        let mut shooting = system();
        let player = scene.player();

        // Too early: gated by the fire interval.
        request_shot(&mut scene, Vec2::new(0.0, 1.0));
        shooting.update(&mut scene, FrameTime::new(0.016, 0.05)).unwrap();
        assert!(scene.bullet_pool.active().is_empty());
        assert!(!scene.world.get_component::<Input>(player).unwrap().is_shooting);

        // Dead: never fires.
        request_shot(&mut scene, Vec2::new(0.0, 1.0));
        scene.world.get_component_mut::<crate::components::Health>(player).unwrap().health = 0;
        shooting.update(&mut scene, FrameTime::new(0.016, 5.0)).unwrap();
        assert!(scene.bullet_pool.active().is_empty());
        assert!(!scene.world.get_component::<Input>(player).unwrap().is_shooting);
    }

    #[test]
    fn test_fire_interval() {
        let mut scene = load_scene().unwrap();
        let mut shooting = system();

        request_shot(&mut scene, Vec2::new(0.0, 1.0));
        shooting.update(&mut scene, FrameTime::new(0.016, 1.0)).unwrap();
        request_shot(&mut scene, Vec2::new(0.0, 1.0));
        shooting.update(&mut scene, FrameTime::new(0.016, 1.05)).unwrap();
        assert_eq!(scene.bullet_pool.active().len(), 1);

        request_shot(&mut scene, Vec2::new(0.0, 1.0));
        shooting.update(&mut scene, FrameTime::new(0.016, 1.2)).unwrap();
        assert_eq!(scene.bullet_pool.active().len(), 2);
    }

    #[test]
    fn test_aim_angle() {
        assert_relative_eq!(aim_angle(Vec3::new(1.0, 0.0, 0.0)).unwrap(), PI / 2.0);
        assert_relative_eq!(aim_angle(Vec3::new(-1.0, 0.0, 0.0)).unwrap(), -PI / 2.0);
        assert!(aim_angle(Vec3::zeros()).is_none());
    }
}
