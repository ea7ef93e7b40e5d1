//! # Horde Shooter
//!
//! Gameplay simulation of a top-down wave shooter: the player runs and
//! shoots while enemies spawn around it and close in. Built on
//! [`horde_engine`].
//!
//! The [`Game`] loads a [`Scene`] once and then steps it frame by frame:
//!
//! 1. player input and movement
//! 2. enemy spawning, steering and the lose condition
//! 3. bullet flight and hits
//! 4. shooting
//! 5. player animation blending and skinning
//! 6. camera
//! 7. restart
//!
//! after which a [`FramePacket`] describes what to draw.

#![warn(missing_docs)]

pub mod components;
pub mod config;
pub mod error;
pub mod scene;
pub mod systems;
pub mod screens;
pub mod frame;
pub mod game;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::GameConfig;
pub use error::{AnimationError, SceneError, SimulationError};
pub use frame::{DrawItem, FramePacket};
pub use game::{Game, PlayerIntent};
pub use scene::Scene;
pub use screens::ScreenState;
