//! Per-frame gameplay systems
//!
//! Each system is a small struct holding only its own cross-frame state
//! (timers, random generator, tunables). All entity state lives in the
//! scene's component store and pools. Systems run on the simulation thread
//! in the order the [`Game`](crate::game::Game) drives them, and every one
//! receives the same [`FrameTime`](horde_engine::foundation::time::FrameTime).

pub mod input;
pub mod enemy;
pub mod bullet;
pub mod shooting;
pub mod animation;
pub mod camera;
pub mod restart;

pub use input::PlayerInputSystem;
pub use enemy::EnemySystem;
pub use bullet::BulletSystem;
pub use shooting::ShootingSystem;
pub use animation::{AnimState, PlayerAnimationSystem};
pub use camera::CameraSystem;
pub use restart::RestartSystem;

use crate::components::Health;
use crate::error::SimulationError;
use crate::scene::Scene;

/// Whether the player's health has reached zero
pub(crate) fn player_is_dead(scene: &Scene) -> Result<bool, SimulationError> {
    Ok(scene.world.get_component::<Health>(scene.player())?.is_dead())
}
