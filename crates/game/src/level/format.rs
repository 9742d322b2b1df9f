use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine::Vec2;
use serde::{Deserialize, Serialize};
use serde_json::Number;
use thiserror::Error;
use tracing::{info, warn};

use super::atomic_io::write_text_atomic;
use super::tilemap::{GridPos, OffgridTile, Tile, TileKind, Tilemap};
use crate::assets::TileSet;

/// Spawner variant that places the player.
pub const PLAYER_SPAWNER: usize = 0;
/// Spawner variant that places an enemy.
pub const ENEMY_SPAWNER: usize = 1;

/// Structurally valid JSON that violates level rules.
#[derive(Debug, Error, PartialEq)]
pub enum MapFormatError {
    #[error("tile key {key:?} is not of the form \"x;y\"")]
    BadKey { key: String },
    #[error("tile key {key:?} does not match its stored position ({x}, {y})")]
    KeyMismatch { key: String, x: f64, y: f64 },
    #[error("on-grid tile {key:?} has a non-integral position ({x}, {y})")]
    NonIntegralPosition { key: String, x: f64, y: f64 },
    #[error("tile size must be positive, got {0}")]
    NonPositiveTileSize(i64),
    #[error("spawner at ({x}, {y}) has unknown variant {variant}")]
    UnknownSpawnerVariant { variant: usize, x: f32, y: f32 },
    #[error("level has no player spawner")]
    MissingPlayerSpawner,
    #[error("{kind} variant {variant} is out of range (only {available} loaded)")]
    VariantOutOfRange {
        kind: TileKind,
        variant: usize,
        available: usize,
    },
}

#[derive(Debug, Error)]
pub enum LevelLoadError {
    #[error("failed to read level {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse level {path} at {location}: {source}")]
    Parse {
        path: PathBuf,
        location: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("level {path} is malformed: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: MapFormatError,
    },
    #[error("level {0} not found")]
    NotFound(String),
}

#[derive(Debug, Error)]
pub enum LevelSaveError {
    #[error("failed to encode level: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("off-grid tile {index} has a non-finite position")]
    NonFinitePosition { index: usize },
    #[error("failed to write level {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct LevelDocument {
    tile_size: i64,
    #[serde(default)]
    tilemap: BTreeMap<String, TileRecord>,
    #[serde(default)]
    offgrid: Vec<OffgridRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TileRecord {
    #[serde(rename = "type")]
    kind: TileKind,
    variant: usize,
    pos: [Number; 2],
}

#[derive(Debug, Serialize, Deserialize)]
struct OffgridRecord {
    #[serde(rename = "type")]
    kind: TileKind,
    variant: usize,
    pos: Vec2,
}

fn number_pair(record: &TileRecord) -> (f64, f64) {
    let x = record.pos[0].as_f64().unwrap_or(f64::NAN);
    let y = record.pos[1].as_f64().unwrap_or(f64::NAN);
    (x, y)
}

impl TryFrom<LevelDocument> for Tilemap {
    type Error = MapFormatError;

    fn try_from(document: LevelDocument) -> Result<Self, Self::Error> {
        let tile_size = u32::try_from(document.tile_size)
            .ok()
            .filter(|size| *size > 0)
            .ok_or(MapFormatError::NonPositiveTileSize(document.tile_size))?;

        let mut tiles = BTreeMap::new();
        for (key, record) in document.tilemap {
            let grid = GridPos::parse_key(&key).ok_or_else(|| MapFormatError::BadKey {
                key: key.clone(),
            })?;
            let (x, y) = number_pair(&record);
            if x.fract() != 0.0 || y.fract() != 0.0 || !x.is_finite() || !y.is_finite() {
                return Err(MapFormatError::NonIntegralPosition { key, x, y });
            }
            if x != grid.x as f64 || y != grid.y as f64 {
                return Err(MapFormatError::KeyMismatch { key, x, y });
            }
            tiles.insert(
                grid,
                Tile {
                    kind: record.kind,
                    variant: record.variant,
                    pos: grid,
                },
            );
        }

        let offgrid = document
            .offgrid
            .into_iter()
            .map(|record| OffgridTile {
                kind: record.kind,
                variant: record.variant,
                pos: record.pos,
            })
            .collect();

        Ok(Tilemap::from_parts(tile_size, tiles, offgrid))
    }
}

impl Tilemap {
    pub fn from_json_str(raw: &str, origin: &Path) -> Result<Self, LevelLoadError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let document: LevelDocument = serde_path_to_error::deserialize(&mut deserializer)
            .map_err(|error| {
                let location = error.path().to_string();
                LevelLoadError::Parse {
                    path: origin.to_path_buf(),
                    location,
                    source: error.into_inner(),
                }
            })?;
        Tilemap::try_from(document).map_err(|source| LevelLoadError::Format {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn to_json_string(&self) -> Result<String, LevelSaveError> {
        let tilemap = self
            .tiles()
            .map(|tile| {
                (
                    tile.pos.key(),
                    TileRecord {
                        kind: tile.kind,
                        variant: tile.variant,
                        pos: [Number::from(tile.pos.x), Number::from(tile.pos.y)],
                    },
                )
            })
            .collect();

        let mut offgrid = Vec::with_capacity(self.offgrid_tiles().len());
        for (index, tile) in self.offgrid_tiles().iter().enumerate() {
            if !tile.pos.x.is_finite() || !tile.pos.y.is_finite() {
                return Err(LevelSaveError::NonFinitePosition { index });
            }
            offgrid.push(OffgridRecord {
                kind: tile.kind,
                variant: tile.variant,
                pos: tile.pos,
            });
        }

        let document = LevelDocument {
            tile_size: self.tile_size() as i64,
            tilemap,
            offgrid,
        };
        serde_json::to_string(&document).map_err(LevelSaveError::Encode)
    }

    /// Loads a level that must exist.
    pub fn load(path: &Path) -> Result<Self, LevelLoadError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Err(LevelLoadError::NotFound(path.display().to_string()));
            }
            Err(source) => {
                return Err(LevelLoadError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Tilemap::from_json_str(&raw, path)
    }

    /// Loads a level for editing; a missing file starts an empty map.
    pub fn load_or_empty(path: &Path, tile_size: u32) -> Result<Self, LevelLoadError> {
        match Tilemap::load(path) {
            Err(LevelLoadError::NotFound(_)) => {
                info!(path = %path.display(), tile_size, "level_missing_starting_empty");
                Ok(Tilemap::new(tile_size))
            }
            other => other,
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), LevelSaveError> {
        let json = self.to_json_string()?;
        write_text_atomic(path, &json).map_err(|source| LevelSaveError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!(
            path = %path.display(),
            tiles = self.tiles().count(),
            offgrid = self.offgrid_tiles().len(),
            "level_saved"
        );
        Ok(())
    }

    /// Checks spawner markers: only known variants, at least one player.
    pub fn check_spawners(&self) -> Result<(), MapFormatError> {
        let size = self.tile_size() as f32;
        let on_grid = self.tiles().map(|tile| {
            (
                tile.kind,
                tile.variant,
                Vec2::new(tile.pos.x as f32 * size, tile.pos.y as f32 * size),
            )
        });
        let off_grid = self
            .offgrid_tiles()
            .iter()
            .map(|tile| (tile.kind, tile.variant, tile.pos));

        let mut has_player = false;
        for (kind, variant, pos) in on_grid.chain(off_grid) {
            if kind != TileKind::Spawners {
                continue;
            }
            match variant {
                PLAYER_SPAWNER => has_player = true,
                ENEMY_SPAWNER => {}
                _ => {
                    return Err(MapFormatError::UnknownSpawnerVariant {
                        variant,
                        x: pos.x,
                        y: pos.y,
                    })
                }
            }
        }
        if has_player {
            Ok(())
        } else {
            Err(MapFormatError::MissingPlayerSpawner)
        }
    }

    /// Checks that every tile variant has a loaded sprite.
    pub fn check_variants(&self, tile_set: &TileSet) -> Result<(), MapFormatError> {
        let kinds = self
            .tiles()
            .map(|tile| (tile.kind, tile.variant))
            .chain(self.offgrid_tiles().iter().map(|tile| (tile.kind, tile.variant)));
        for (kind, variant) in kinds {
            let available = tile_set.variant_count(kind);
            if variant >= available {
                warn!(kind = kind.as_str(), variant, available, "tile_variant_out_of_range");
                return Err(MapFormatError::VariantOutOfRange {
                    kind,
                    variant,
                    available,
                });
            }
        }
        Ok(())
    }
}
