//! Physics module
//!
//! Capsule colliders and the segment distance queries behind them.

pub mod collision;

pub use collision::{Capsule, distance_point_to_segment, distance_segment_to_segment};
