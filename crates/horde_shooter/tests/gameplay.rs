//! Whole-frame gameplay scenarios against a synthetic scene

use approx::assert_relative_eq;
use horde_engine::ecs::Entity;
use horde_engine::foundation::math::{Vec2, Vec3};
use horde_engine::foundation::time::FrameTime;
use horde_engine::physics::distance_point_to_segment;
use horde_shooter::components::{
    Collider, Health, InstancedMeshComponent, Input, Lifetime, Movement, Score, Transform,
};
use horde_shooter::test_support::{importer, resources};
use horde_shooter::{Game, GameConfig, PlayerIntent, ScreenState};

const DT: f32 = 1.0 / 60.0;

fn game() -> (Game, GameConfig) {
    let config = GameConfig::default();
    let game = Game::load(&config, resources(), &mut importer(&config)).unwrap();
    (game, config)
}

/// Height at which enemies walk and bullets fly
fn monster_y(config: &GameConfig) -> f32 {
    config.player.model_scale * config.player.gun_height
}

fn place_enemy(game: &mut Game, position: Vec3) -> Entity {
    let scene = game.scene_mut();
    let enemy = scene.enemy_pool.checkout().unwrap();
    scene.world.get_component_mut::<Transform>(enemy).unwrap().position = position;
    scene.world.get_component_mut::<InstancedMeshComponent>(enemy).unwrap().is_visible = true;
    enemy
}

fn set_health(game: &mut Game, health: u32) {
    let scene = game.scene_mut();
    let player = scene.player();
    scene.world.get_component_mut::<Health>(player).unwrap().health = health;
}

fn health(game: &Game) -> u32 {
    let scene = game.scene();
    scene.world.get_component::<Health>(scene.player()).unwrap().health
}

fn score(game: &Game) -> u32 {
    let scene = game.scene();
    scene.world.get_component::<Score>(scene.player()).unwrap().value
}

#[test]
fn test_restart_resets_pools_and_player() {
    let (mut game, config) = game();
    assert_eq!(game.config(), &config);
    for z in [4.0, 5.0, 6.0] {
        place_enemy(&mut game, Vec3::new(0.0, 0.5, z));
    }
    {
        let scene = game.scene_mut();
        for _ in 0..2 {
            let bullet = scene.bullet_pool.checkout().unwrap();
            scene.world.get_component_mut::<Lifetime>(bullet).unwrap().remaining = 0.5;
            scene.world.get_component_mut::<InstancedMeshComponent>(bullet).unwrap().is_visible = true;
        }
        let player = scene.player();
        scene.world.get_component_mut::<Score>(player).unwrap().value = 12;
        scene.world.get_component_mut::<Input>(player).unwrap().is_restarting = true;
    }
    set_health(&mut game, 0);

    game.update(FrameTime::new(DT, 1.0), 1.0).unwrap();

    let scene = game.scene();
    assert!(scene.enemy_pool.active().is_empty());
    assert_eq!(scene.enemy_pool.idle().len(), config.scene.enemy_pool_capacity);
    assert!(scene.bullet_pool.active().is_empty());
    assert_eq!(scene.bullet_pool.idle().len(), config.scene.bullet_pool_capacity);
    assert!(scene
        .world
        .query::<InstancedMeshComponent>()
        .all(|(_, instance)| !instance.is_visible));
    assert_eq!(health(&game), config.player.initial_health);
    assert_eq!(score(&game), 0);
    assert_eq!(game.score_label(), "SCORE 0");
    assert_eq!(game.screen(), ScreenState::Play);
}

/// Distance from the player's collision centre to the enemy's capsule core
fn enemy_gap(game: &Game, enemy: Entity, target: Vec3) -> f32 {
    let world = &game.scene().world;
    let position = world.get_component::<Transform>(enemy).unwrap().position;
    let heading = world.get_component::<Movement>(enemy).unwrap().direction;
    let capsule = world.get_component::<Collider>(enemy).unwrap().capsule;
    let (a, b) = capsule.segment(position, Vec3::new(heading.x, 0.0, heading.y));
    distance_point_to_segment(target, a, b)
}

#[test]
fn test_enemy_reaching_player_ends_the_run() {
    let (mut game, config) = game();
    let y = monster_y(&config);
    let enemy = place_enemy(&mut game, Vec3::new(0.0, y, 2.0));
    let capsule = game.scene().world.get_component::<Collider>(enemy).unwrap().capsule;
    let threshold = config.player.collision_radius + capsule.radius;
    let target = Vec3::new(0.0, y, 0.0);

    let mut approach_frames = 0;
    let mut caught = false;
    for frame in 1..400 {
        game.update(FrameTime::new(DT, frame as f32 * DT), 1.0).unwrap();
        if enemy_gap(&game, enemy, target) > threshold {
            assert!(health(&game) > 0, "dead at frame {frame} while still out of reach");
            approach_frames += 1;
        } else {
            assert_eq!(health(&game), 0, "alive at frame {frame} inside reach");
            caught = true;
            break;
        }
    }
    assert!(caught);
    assert!(approach_frames > 60);
    assert!(matches!(game.screen(), ScreenState::GameOver { .. }));

    // Everything freezes once the player is down.
    let frozen = game.scene().world.get_component::<Transform>(enemy).unwrap().position;
    let active = game.scene().enemy_pool.active().to_vec();
    for frame in 400..550 {
        game.update(FrameTime::new(DT, frame as f32 * DT), 1.0).unwrap();
    }
    let scene = game.scene();
    assert_eq!(scene.enemy_pool.active(), active.as_slice());
    assert_eq!(scene.world.get_component::<Transform>(enemy).unwrap().position, frozen);
}

#[test]
fn test_shot_kills_nearest_enemy_only() {
    let (mut game, config) = game();
    let y = monster_y(&config);
    let near = place_enemy(&mut game, Vec3::new(0.0, y, 3.0));
    let far = place_enemy(&mut game, Vec3::new(0.0, y, 9.0));

    game.apply_input(PlayerIntent {
        direction: Vec2::new(0.0, 1.0),
        theta: 0.0,
        is_moving: false,
        is_shooting: true,
    })
    .unwrap();
    game.update(FrameTime::new(DT, 1.0), 1.0).unwrap();
    let bullet = game.scene().bullet_pool.active()[0];

    let mut killed = false;
    for frame in 1..30 {
        game.update(FrameTime::new(DT, 1.0 + frame as f32 * DT), 1.0).unwrap();
        let scene = game.scene();
        let visible = |entity: Entity| scene.world.get_component::<InstancedMeshComponent>(entity).unwrap().is_visible;

        if scene.enemy_pool.active().len() == 2 {
            // Still in flight.
            assert_eq!(scene.bullet_pool.active(), &[bullet]);
            assert!(visible(bullet));
            assert_eq!(score(&game), 0);
            continue;
        }

        assert_eq!(scene.enemy_pool.active(), &[far]);
        assert!(scene.bullet_pool.active().is_empty());
        assert!(!visible(near));
        assert!(!visible(bullet));
        assert!(visible(far));
        assert_eq!(score(&game), 1);
        killed = true;
        break;
    }
    assert!(killed);

    // The spent bullet cannot score again.
    for frame in 30..40 {
        game.update(FrameTime::new(DT, 1.0 + frame as f32 * DT), 1.0).unwrap();
    }
    assert_eq!(score(&game), 1);
    assert_eq!(game.scene().enemy_pool.active(), &[far]);
}

#[test]
fn test_animation_weights_stay_normalized() {
    let (mut game, _) = game();
    let headings = [0.0_f32, 1.2, 2.5, -2.0, -0.7];

    // Facing stays fixed, so the stick sweeps through every locomotion state.
    for (frame, heading) in headings.iter().cycle().take(60).enumerate() {
        let direction = Vec2::new(heading.sin(), heading.cos());
        game.apply_input(PlayerIntent {
            direction,
            theta: 0.0,
            is_moving: frame % 7 != 0,
            is_shooting: false,
        })
        .unwrap();
        game.update(FrameTime::new(DT, (frame + 1) as f32 * DT), 1.0).unwrap();
        assert_relative_eq!(game.animation_weights().sum(), 1.0, epsilon = 1e-4);
    }
}

#[test]
fn test_shooting_flag_clears_after_frame() {
    let (mut game, _) = game();
    game.apply_input(PlayerIntent {
        direction: Vec2::new(1.0, 0.0),
        theta: 0.0,
        is_moving: false,
        is_shooting: true,
    })
    .unwrap();

    game.update(FrameTime::new(DT, 1.0), 1.0).unwrap();

    let scene = game.scene();
    assert!(!scene.world.get_component::<Input>(scene.player()).unwrap().is_shooting);
    assert_eq!(scene.bullet_pool.active().len(), 1);

    game.update(FrameTime::new(DT, 1.0 + DT), 1.0).unwrap();
    assert_eq!(game.scene().bullet_pool.active().len(), 1);
}

#[test]
fn test_tap_after_pause_restarts() {
    let (mut game, config) = game();
    set_health(&mut game, 0);

    game.update(FrameTime::new(DT, DT), 1.0).unwrap();
    assert_eq!(game.screen(), ScreenState::GameOver { elapsed: 0.0 });

    game.tap();
    game.update(FrameTime::new(1.0, 1.0), 1.0).unwrap();
    assert!(matches!(game.screen(), ScreenState::GameOver { .. }));

    game.tap();
    game.update(FrameTime::new(2.5, 3.5), 1.0).unwrap();
    let scene = game.scene();
    assert!(scene.world.get_component::<Input>(scene.player()).unwrap().is_restarting);

    game.update(FrameTime::new(DT, 3.5 + DT), 1.0).unwrap();
    assert_eq!(game.screen(), ScreenState::Play);
    assert_eq!(health(&game), config.player.initial_health);
}
