//! Player animation blending and skinning
//!
//! All six player states live in one clip as fixed tick ranges. Every frame
//! the system:
//!
//! 1. computes a blend weight per state from health and movement, smoothed
//!    by decaying last frame's weights over the transition time;
//! 2. samples the node hierarchy once per state with a non-zero weight and
//!    sums the weighted global node transforms;
//! 3. re-skins the player and gun meshes from the summed transforms and
//!    writes the result into their position buffers.
//!
//! Keyframes are sampled at the first key at or after the target tick,
//! without interpolation.

use std::collections::HashMap;

use horde_engine::assets::{AnimationClip, ImportedScene, SceneNode, SourceMesh};
use horde_engine::foundation::math::{oriented_angle, Mat4, Mat4Ext, Vec2, Vec3, Vec4};
use horde_engine::foundation::time::FrameTime;
use horde_engine::render::{BufferService, BufferServiceExt, VertexAttribute};

use crate::components::{Animation, Health, MeshComponent, Movement, StateWeights, Transform};
use crate::error::{AnimationError, SimulationError};
use crate::scene::Scene;

/// Allowed deviation of the weight sum from one
const WEIGHT_TOLERANCE: f32 = 0.001;

/// Allowed overshoot of a sampled tick past its state's range
const TICK_TOLERANCE: f32 = 0.01;

/// Movement slower than this plays the idle state
const MOVING_THRESHOLD: f32 = 0.1;

/// Length of each locomotion state in ticks
const LOCOMOTION_TICKS: f32 = 20.0;

/// Player animation states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimState {
    /// Plays once from the moment health reaches zero
    Death,
    /// Standing still
    Idle,
    /// Running toward the facing direction
    Forward,
    /// Strafing right
    Right,
    /// Running backward
    Back,
    /// Strafing left
    Left,
}

impl AnimState {
    /// Every state, in evaluation order
    pub const ALL: [Self; 6] = [Self::Death, Self::Idle, Self::Forward, Self::Right, Self::Back, Self::Left];

    /// First and last tick of the state inside the shared clip
    pub fn tick_range(self) -> (f32, f32) {
        let start = match self {
            Self::Death => return (234.0, 293.0),
            Self::Idle => return (55.0, 130.0),
            Self::Forward => 134.0,
            Self::Right => 184.0,
            Self::Back => 159.0,
            Self::Left => 209.0,
        };
        (start, start + LOCOMOTION_TICKS)
    }

    /// Phase shift applied before wrapping
    pub fn tick_offset(self) -> f32 {
        match self {
            Self::Right | Self::Back => 10.0,
            _ => 0.0,
        }
    }
}

/// Normalised per-state weights of one frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BlendWeights {
    /// Death
    pub death: f32,
    /// Idle
    pub idle: f32,
    /// Right strafe
    pub right: f32,
    /// Forward run
    pub forward: f32,
    /// Back run
    pub back: f32,
    /// Left strafe
    pub left: f32,
}

impl BlendWeights {
    /// Weight of `state`
    pub fn get(&self, state: AnimState) -> f32 {
        match state {
            AnimState::Death => self.death,
            AnimState::Idle => self.idle,
            AnimState::Forward => self.forward,
            AnimState::Right => self.right,
            AnimState::Back => self.back,
            AnimState::Left => self.left,
        }
    }

    /// Sum over all states
    pub fn sum(&self) -> f32 {
        self.death + self.idle + self.right + self.forward + self.back + self.left
    }

    fn scaled(&self, factor: f32) -> Self {
        Self {
            death: self.death * factor,
            idle: self.idle * factor,
            right: self.right * factor,
            forward: self.forward * factor,
            back: self.back * factor,
            left: self.left * factor,
        }
    }
}

/// What the blend needs to know about the player this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendInput {
    /// Seconds since the previous evaluation
    pub delta: f32,
    /// Seconds for a carried weight to fade from 1 to 0
    pub transition_time: f32,
    /// Death has been triggered
    pub is_dead: bool,
    /// Planar movement heading
    pub movement: Vec2,
    /// Facing angle about +Y
    pub facing: f32,
}

/// Compute this frame's weights and fold them into the carried weights
///
/// Carried weights first decay linearly, then the instantaneous targets are
/// added on top. After normalisation each carried weight is raised to at
/// least its new value, so states ramp down over the transition time but
/// can ramp up at once.
pub fn blend_weights(previous: &mut StateWeights, input: &BlendInput) -> Result<BlendWeights, AnimationError> {
    let decay = input.delta / input.transition_time;
    for weight in [
        &mut previous.idle,
        &mut previous.right,
        &mut previous.forward,
        &mut previous.back,
        &mut previous.left,
    ] {
        *weight = (*weight - decay).max(0.0);
    }

    let is_moving = input.movement.magnitude() > MOVING_THRESHOLD;
    let heading = movement_heading(input.facing, input.movement);
    let moving = |amount: f32| if is_moving { amount.max(0.0) } else { 0.0 };

    let raw = BlendWeights {
        death: if input.is_dead { 1.0 } else { 0.0 },
        idle: previous.idle + if input.is_dead || is_moving { 0.0 } else { 1.0 },
        right: previous.right + moving(-heading.x),
        forward: previous.forward + moving(heading.y),
        back: previous.back + moving(-heading.y),
        left: previous.left + moving(heading.x),
    };
    let weights = raw.scaled(1.0 / raw.sum());

    previous.idle = previous.idle.max(weights.idle);
    previous.right = previous.right.max(weights.right);
    previous.forward = previous.forward.max(weights.forward);
    previous.back = previous.back.max(weights.back);
    previous.left = previous.left.max(weights.left);

    let sum = weights.sum();
    if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(AnimationError::WeightsNotNormalized { sum });
    }
    Ok(weights)
}

/// `(sin δ, cos δ)` where δ is the signed angle from the facing direction to
/// the movement direction; positive x means moving to the left
fn movement_heading(facing: f32, movement: Vec2) -> Vec2 {
    let forward = (Mat4::rotation_y(facing) * Vec4::new(0.0, 0.0, 1.0, 0.0)).xyz();
    let Some(direction) = Vec3::new(movement.x, 0.0, movement.y).try_normalize(f32::EPSILON) else {
        return Vec2::new(0.0, 1.0);
    };
    let delta = oriented_angle(&forward, &direction, &Vec3::y());
    Vec2::new(delta.sin(), delta.cos())
}

/// Tick inside `state`'s range at simulation time `time`
///
/// Looping states wrap; death plays once from `death_time` and holds its
/// last frame.
pub fn target_tick(state: AnimState, time: f32, ticks_per_second: f32, death_time: f32) -> Result<f32, AnimationError> {
    let (min, max) = state.tick_range();
    let span = max - min;
    let local = if state == AnimState::Death {
        ((time - death_time) * ticks_per_second + state.tick_offset()).min(span)
    } else {
        (time * ticks_per_second + state.tick_offset()) % span
    };

    let tick = min + local;
    if tick < min - TICK_TOLERANCE || tick > max + TICK_TOLERANCE {
        return Err(AnimationError::TickOutOfRange { state, tick, min, max });
    }
    Ok(tick)
}

type NodeTransforms = HashMap<String, Mat4>;

/// Global transform of every node at `tick`
fn sample_pose(clip: &AnimationClip, node: &SceneNode, parent: &Mat4, tick: f32, pose: &mut NodeTransforms) {
    let local = clip.channel(&node.name).map_or(node.transform, |channel| {
        let mut local = Mat4::identity();
        if let Some(key) = channel.rotation_keys.iter().find(|key| key.time >= tick) {
            local = key.value.to_homogeneous() * local;
        }
        if let Some(key) = channel.position_keys.iter().find(|key| key.time >= tick) {
            local[(0, 3)] += key.value.x;
            local[(1, 3)] += key.value.y;
            local[(2, 3)] += key.value.z;
        }
        local
    });

    let global = parent * local;
    pose.entry(node.name.clone()).or_insert(global);
    for child in &node.children {
        sample_pose(clip, child, &global, tick, pose);
    }
}

/// Evaluates the player's blend and skins the player and gun meshes
#[derive(Debug, Default)]
pub struct PlayerAnimationSystem {
    weights: BlendWeights,
}

impl PlayerAnimationSystem {
    /// Create the system
    pub fn new() -> Self {
        Self::default()
    }

    /// Weights used by the last update
    pub fn weights(&self) -> BlendWeights {
        self.weights
    }

    /// Blend, pose and skin for simulation time `time.since_start`
    pub fn update(
        &mut self,
        scene: &mut Scene,
        buffers: &mut dyn BufferService,
        time: FrameTime,
    ) -> Result<(), SimulationError> {
        let now = time.since_start;
        let player = scene.player();
        let is_dead_now = scene.world.get_component::<Health>(player)?.is_dead();
        let movement = scene.world.get_component::<Movement>(player)?.direction;
        let facing = scene.world.get_component::<Transform>(player)?.euler_angles.y;

        let animation = scene.world.get_component_mut::<Animation>(player)?;
        if is_dead_now && !animation.is_dead() {
            animation.death_time = now;
        }

        let input = BlendInput {
            delta: now - animation.last_anim_time,
            transition_time: animation.transition_time,
            is_dead: animation.is_dead(),
            movement,
            facing,
        };
        animation.last_anim_time = now;
        self.weights = blend_weights(&mut animation.previous, &input)?;
        log::trace!("Blend weights {:?}", self.weights);

        let animation = animation.clone();
        let clip = animation
            .scene
            .animations
            .get(animation.clip)
            .ok_or(AnimationError::MissingClip(animation.clip))?;

        let mut merged = NodeTransforms::new();
        for state in AnimState::ALL {
            let weight = self.weights.get(state);
            if weight == 0.0 {
                continue;
            }

            let tick = target_tick(state, now, clip.ticks_per_second, animation.death_time)?;
            let mut pose = NodeTransforms::new();
            sample_pose(clip, &animation.scene.root, &Mat4::identity(), tick, &mut pose);
            for (name, transform) in pose {
                *merged.entry(name).or_insert_with(Mat4::zeros) += transform * weight;
            }
        }

        self.skin_meshes(scene, buffers, &animation, &merged)
    }

    fn skin_meshes(
        &self,
        scene: &Scene,
        buffers: &mut dyn BufferService,
        animation: &Animation,
        merged: &NodeTransforms,
    ) -> Result<(), SimulationError> {
        let mut mesh_indices = Vec::new();
        animation.scene.root.walk(&mut |node| {
            for &index in &node.meshes {
                if !mesh_indices.contains(&index) {
                    mesh_indices.push(index);
                }
            }
        });

        for index in mesh_indices {
            let entity = scene
                .skinned_mesh_entity(index)
                .ok_or(AnimationError::InvalidMeshIndex(index))?;
            let handle = scene
                .world
                .get_component::<MeshComponent>(entity)?
                .mesh
                .vertex_buffer(VertexAttribute::Position)
                .ok_or(AnimationError::MissingPositionBuffer(index))?;
            let source = animation
                .scene
                .meshes
                .get(index)
                .ok_or(AnimationError::InvalidMeshIndex(index))?;

            let positions = skinned_positions(&animation.scene, index, source, &animation.global_inverse, merged);
            buffers.write(handle, &positions)?;
        }
        Ok(())
    }
}

/// Posed vertex positions of `source`, flattened xyz
fn skinned_positions(
    scene: &ImportedScene,
    mesh_index: usize,
    source: &SourceMesh,
    global_inverse: &Mat4,
    merged: &NodeTransforms,
) -> Vec<f32> {
    let node_transform = |name: &str| merged.get(name).copied().unwrap_or_else(Mat4::identity);

    let vertex_transforms: Vec<Mat4> = if source.bones.is_empty() {
        let rigid = scene
            .nodes_with_mesh(mesh_index)
            .into_iter()
            .fold(Mat4::identity(), |acc, node| acc * node_transform(&node.name));
        vec![rigid; source.vertex_count()]
    } else {
        let mut skin = vec![Mat4::zeros(); source.vertex_count()];
        for bone in &source.bones {
            let bone_transform = global_inverse * node_transform(&bone.name) * bone.offset;
            for weight in &bone.weights {
                skin[weight.vertex as usize] += bone_transform * weight.weight;
            }
        }
        skin
    };

    source
        .positions
        .iter()
        .zip(&vertex_transforms)
        .flat_map(|(position, transform)| {
            let posed = transform * position.push(1.0);
            [posed.x, posed.y, posed.z]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{GUN_MESH, PLAYER_MESH};
    use crate::test_support::load_scene_with_resources;
    use approx::assert_relative_eq;
    use horde_engine::foundation::math::constants::PI;

    fn input(movement: Vec2, facing: f32, is_dead: bool) -> BlendInput {
        BlendInput {
            delta: 0.016,
            transition_time: 0.2,
            is_dead,
            movement,
            facing,
        }
    }

    #[test]
    fn test_weights_always_normalised() {
        let mut previous = StateWeights::default();
        let cases = [
            input(Vec2::zeros(), 0.0, false),
            input(Vec2::new(1.0, 0.0), 0.0, false),
            input(Vec2::new(-0.3, 0.9), 1.2, false),
            input(Vec2::new(0.0, -1.0), PI, false),
            input(Vec2::new(0.7, 0.7), -2.0, true),
            input(Vec2::zeros(), 0.0, true),
        ];
        for case in &cases {
            let weights = blend_weights(&mut previous, case).unwrap();
            assert_relative_eq!(weights.sum(), 1.0, epsilon = WEIGHT_TOLERANCE);
            for state in AnimState::ALL {
                let weight = weights.get(state);
                assert!(weight >= 0.0 && weight <= 1.0 + 1e-6, "{state:?} = {weight}");
            }
        }
    }

    #[test]
    fn test_direction_selects_state() {
        // Facing +Z; +X is to the left.
        let weights = blend_weights(&mut StateWeights::default(), &input(Vec2::new(1.0, 0.0), 0.0, false)).unwrap();
        assert_relative_eq!(weights.left, 1.0, epsilon = 1e-5);

        let weights = blend_weights(&mut StateWeights::default(), &input(Vec2::new(0.0, 1.0), 0.0, false)).unwrap();
        assert_relative_eq!(weights.forward, 1.0, epsilon = 1e-5);

        let weights = blend_weights(&mut StateWeights::default(), &input(Vec2::new(0.0, 1.0), PI, false)).unwrap();
        assert_relative_eq!(weights.back, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_carried_weight_decays_over_transition() {
        let mut previous = StateWeights::default();
        blend_weights(&mut previous, &input(Vec2::zeros(), 0.0, false)).unwrap();
        assert_relative_eq!(previous.idle, 1.0);

        // Start running: idle fades over 0.2 s instead of dropping at once.
        let mut running = input(Vec2::new(0.0, 1.0), 0.0, false);
        running.delta = 0.1;
        let weights = blend_weights(&mut previous, &running).unwrap();
        assert_relative_eq!(weights.idle, 0.5 / 1.5, epsilon = 1e-5);
        assert_relative_eq!(weights.forward, 1.0 / 1.5, epsilon = 1e-5);

        running.delta = 0.2;
        let weights = blend_weights(&mut previous, &running).unwrap();
        assert_relative_eq!(weights.idle, 0.0);
    }

    #[test]
    fn test_death_weight_dominates_when_nothing_carried() {
        let mut previous = StateWeights::default();
        let mut dead = input(Vec2::zeros(), 0.0, true);
        dead.delta = 1.0;
        let weights = blend_weights(&mut previous, &dead).unwrap();
        assert_relative_eq!(weights.death, 1.0);
    }

    #[test]
    fn test_looping_tick_wraps() {
        let tick = target_tick(AnimState::Forward, 1.0, 30.0, -1.0).unwrap();
        assert_relative_eq!(tick, 134.0 + 10.0, epsilon = 1e-4);

        let tick = target_tick(AnimState::Right, 1.0, 30.0, -1.0).unwrap();
        assert_relative_eq!(tick, 184.0, epsilon = 1e-4);
    }

    #[test]
    fn test_death_tick_clamps_at_end() {
        let tick = target_tick(AnimState::Death, 2.0, 30.0, 1.5).unwrap();
        assert_relative_eq!(tick, 234.0 + 15.0, epsilon = 1e-4);

        let tick = target_tick(AnimState::Death, 100.0, 30.0, 1.5).unwrap();
        assert_relative_eq!(tick, 293.0);
    }

    #[test]
    fn test_tick_before_death_is_out_of_range() {
        let result = target_tick(AnimState::Death, 1.0, 30.0, 2.0);
        assert!(matches!(result, Err(AnimationError::TickOutOfRange { state: AnimState::Death, .. })));
    }

    #[test]
    fn test_source_meshes_map_to_their_entities() {
        let (scene, _) = load_scene_with_resources().unwrap();
        assert_eq!(scene.skinned_mesh_entity(PLAYER_MESH), Some(scene.player()));
        assert_eq!(scene.skinned_mesh_entity(GUN_MESH), Some(scene.gun()));
        // The floor is not part of the player scene.
        assert_eq!(scene.skinned_mesh_entity(GUN_MESH + 1), None);
    }

    #[test]
    fn test_update_skins_player_buffer() {
        let (mut scene, mut resources) = load_scene_with_resources().unwrap();
        let mut system = PlayerAnimationSystem::new();

        system.update(&mut scene, &mut *resources.buffers, FrameTime::new(0.016, 0.016)).unwrap();
        assert_relative_eq!(system.weights().idle, 1.0);

        let handle = scene
            .world
            .get_component::<MeshComponent>(scene.player())
            .unwrap()
            .mesh
            .vertex_buffer(VertexAttribute::Position)
            .unwrap();
        let posed = resources.buffers.view::<f32>(handle).unwrap();
        // The sampled pose lifts the skeleton by one unit.
        assert_relative_eq!(posed[1], 1.0, epsilon = 1e-5);
    }
}
