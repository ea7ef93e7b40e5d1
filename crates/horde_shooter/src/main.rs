//! Headless driver
//!
//! Loads the configured scene and runs a scripted session: the player
//! circles the origin while firing toward the nearest enemy, taps through
//! the game-over screen, and the final score is logged.
//!
//! Usage: `horde_shooter [config.toml] [frames]`
//!
//! No assets ship with the crate. `scene.asset_dir` in the config must
//! point at a directory holding the RON scenes and PNG textures named in
//! `[scene]`; with the default `assets` directory missing, startup fails
//! with an asset error.

use std::process::ExitCode;

use horde_engine::assets::RonSceneImporter;
use horde_engine::config::Config;
use horde_engine::foundation::logging;
use horde_engine::foundation::math::Vec2;
use horde_engine::foundation::time::FrameTime;
use horde_engine::render::RenderResources;
use horde_shooter::components::{Score, Transform};
use horde_shooter::{Game, GameConfig, PlayerIntent, ScreenState};

const DEFAULT_CONFIG: &str = "config/default.toml";
const DEFAULT_FRAMES: u32 = 3600;
const FRAME_DELTA: f32 = 1.0 / 60.0;
const ASPECT: f32 = 16.0 / 9.0;

fn main() -> ExitCode {
    logging::init();

    match run() {
        Ok(score) => {
            log::info!("Session finished with score {}", score);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<u32, Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let frames = match args.next() {
        Some(frames) => frames.parse()?,
        None => DEFAULT_FRAMES,
    };

    let config = GameConfig::load_or_default(&config_path)?;
    log::info!("Running {} frames with config {}", frames, config_path);

    let mut game = Game::load(&config, RenderResources::host(), &mut RonSceneImporter::new())?;
    let mut best = 0;

    for frame in 0..frames {
        let since_start = (frame + 1) as f32 * FRAME_DELTA;
        let intent = scripted_intent(&game, since_start);
        game.apply_input(intent)?;
        if game.screen() != ScreenState::Play {
            game.tap();
        }

        let packet = game.update(FrameTime::new(FRAME_DELTA, since_start), ASPECT)?;
        let scene = game.scene();
        best = best.max(scene.world.get_component::<Score>(scene.player())?.value);

        if frame % 600 == 0 {
            log::debug!(
                "Frame {}: {} | {:?} | {} enemies, {} bullets in flight",
                frame,
                game.score_label(),
                game.screen(),
                packet.instance_count(game.scene().enemy_mesh()),
                packet.instance_count(game.scene().bullet_mesh())
            );
        }
    }

    Ok(best)
}

/// Run in a circle and fire at the nearest active enemy
fn scripted_intent(game: &Game, since_start: f32) -> PlayerIntent {
    let heading = since_start * 0.5;
    let direction = Vec2::new(heading.cos(), heading.sin());
    let scene = game.scene();

    let player = scene
        .world
        .get_component::<Transform>(scene.player())
        .map(|transform| transform.position)
        .ok();
    let aim = player.and_then(|player| {
        scene
            .enemy_pool
            .active()
            .iter()
            .filter_map(|&enemy| scene.world.get_component::<Transform>(enemy).ok())
            .map(|enemy| Vec2::new(enemy.position.x - player.x, enemy.position.z - player.z))
            .filter(|aim| aim.magnitude() > f32::EPSILON)
            .min_by(|a, b| a.magnitude().total_cmp(&b.magnitude()))
    });

    match aim {
        Some(aim) => PlayerIntent {
            direction: aim.normalize(),
            theta: aim.x.atan2(aim.y),
            is_moving: false,
            is_shooting: true,
        },
        None => PlayerIntent {
            direction,
            theta: direction.x.atan2(direction.y),
            is_moving: true,
            is_shooting: false,
        },
    }
}
