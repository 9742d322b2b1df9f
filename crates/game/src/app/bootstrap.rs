use engine::{open_audio_output, resolve_app_paths, LoopConfig, StartupError, Vec2};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::assets::GameAssets;
use crate::audio::{load_sounds, BACKGROUND_MUSIC};
use crate::config::GameConfig;
use crate::level::LevelLoadError;
use crate::session::{DirectoryLevels, GameplayScene, SessionState};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("failed to load starting level: {0}")]
    Level(#[from] LevelLoadError),
}

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: GameplayScene,
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Samurai Dash Startup ===");

    let paths = resolve_app_paths()?;
    info!(root = %paths.root.display(), "project_root_resolved");
    let game_config = GameConfig::from_env(paths);
    info!(
        seed = game_config.seed,
        start_level = game_config.start_level,
        level_count = game_config.level_count,
        "game_config"
    );

    let loop_config = LoopConfig::default();
    let display_size = Vec2::new(
        loop_config.display_width as f32,
        loop_config.display_height as f32,
    );

    let assets = GameAssets::load(&game_config.paths.images_dir);
    let sounds_dir = game_config.paths.sounds_dir.clone();
    let mut audio = open_audio_output(|kira| load_sounds(kira, &sounds_dir));
    audio.play_music(BACKGROUND_MUSIC);

    let levels = DirectoryLevels::new(game_config.maps_dir());
    let session = SessionState::new(assets, Box::new(levels), &game_config, display_size)?;

    Ok(AppWiring {
        config: loop_config,
        scene: GameplayScene::new(session, audio),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
