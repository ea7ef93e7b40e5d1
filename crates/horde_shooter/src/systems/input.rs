//! Player input and movement

use horde_engine::foundation::math::Vec2;
use horde_engine::foundation::time::FrameTime;

use crate::components::{Input, Look, Movement, Transform};
use crate::error::SimulationError;
use crate::scene::Scene;

use super::player_is_dead;

/// Applies the player's stick intent to the player and the gun
#[derive(Debug, Default)]
pub struct PlayerInputSystem;

impl PlayerInputSystem {
    /// Create the system
    pub fn new() -> Self {
        Self
    }

    /// Copy aim into [`Look`], then turn and move the player and gun together
    pub fn update(&mut self, scene: &mut Scene, time: FrameTime) -> Result<(), SimulationError> {
        if player_is_dead(scene)? {
            return Ok(());
        }

        let player = scene.player();
        let input = *scene.world.get_component::<Input>(player)?;
        scene.world.get_component_mut::<Look>(player)?.direction = input.direction;

        for entity in [player, scene.gun()] {
            let movement = scene.world.get_component_mut::<Movement>(entity)?;
            movement.direction = if input.is_moving { input.direction } else { Vec2::zeros() };
            let step = movement.direction_3d() * movement.speed * time.delta;

            let transform = scene.world.get_component_mut::<Transform>(entity)?;
            transform.euler_angles.y = input.theta;
            if input.is_moving {
                transform.position += step;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::load_scene;
    use approx::assert_relative_eq;
    use horde_engine::foundation::math::Vec3;

    #[test]
    fn test_moving_input_moves_player_and_gun() {
        let mut scene = load_scene().unwrap();
        let player = scene.player();
        *scene.world.get_component_mut::<Input>(player).unwrap() = Input {
            direction: Vec2::new(1.0, 0.0),
            theta: 0.5,
            is_moving: true,
            ..Input::default()
        };

        PlayerInputSystem::new().update(&mut scene, FrameTime::new(0.5, 0.5)).unwrap();

        for entity in [player, scene.gun()] {
            let transform = scene.world.get_component::<Transform>(entity).unwrap();
            assert_relative_eq!(transform.position, Vec3::new(0.75, 0.0, 0.0));
            assert_relative_eq!(transform.euler_angles.y, 0.5);
        }
        assert_eq!(scene.world.get_component::<Look>(player).unwrap().direction, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_idle_input_turns_without_moving() {
        let mut scene = load_scene().unwrap();
        let player = scene.player();
        *scene.world.get_component_mut::<Input>(player).unwrap() = Input {
            direction: Vec2::new(0.0, 1.0),
            theta: 1.0,
            ..Input::default()
        };

        PlayerInputSystem::new().update(&mut scene, FrameTime::new(0.5, 0.5)).unwrap();

        let transform = scene.world.get_component::<Transform>(player).unwrap();
        assert_eq!(transform.position, Vec3::zeros());
        assert_relative_eq!(transform.euler_angles.y, 1.0);
        assert_eq!(scene.world.get_component::<Movement>(player).unwrap().direction, Vec2::zeros());
    }
}
