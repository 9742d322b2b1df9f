mod atomic_io;
mod format;
mod tilemap;

pub use format::{
    LevelLoadError, LevelSaveError, MapFormatError, ENEMY_SPAWNER, PLAYER_SPAWNER,
};
pub use tilemap::{ExtractedTile, GridPos, OffgridTile, Tile, TileKind, Tilemap};
