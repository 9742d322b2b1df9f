//! Samurai Dash: a tile-based platformer on top of the `engine` crate.

pub mod animation;
pub mod app;
pub mod assets;
pub mod audio;
pub mod config;
pub mod effects;
pub mod entity;
pub mod events;
pub mod level;
pub mod session;

pub use assets::GameAssets;
pub use config::GameConfig;
pub use level::{LevelLoadError, LevelSaveError, MapFormatError, Tilemap};
pub use session::{GameplayScene, SessionState};
