use std::path::PathBuf;

use crate::level::{LevelLoadError, Tilemap};

/// Where numbered levels come from.
pub trait LevelSource {
    fn load(&self, index: usize) -> Result<Tilemap, LevelLoadError>;

    /// Name used for this level in errors and logs.
    fn origin(&self, index: usize) -> PathBuf;
}

/// Levels stored as `<dir>/<index>.json`.
#[derive(Debug, Clone)]
pub struct DirectoryLevels {
    dir: PathBuf,
}

impl DirectoryLevels {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl LevelSource for DirectoryLevels {
    fn load(&self, index: usize) -> Result<Tilemap, LevelLoadError> {
        Tilemap::load(&self.origin(index))
    }

    fn origin(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{index}.json"))
    }
}

/// Levels held in memory; each load hands out a fresh copy.
#[derive(Debug, Clone, Default)]
pub struct MemoryLevels {
    levels: Vec<Tilemap>,
}

impl MemoryLevels {
    pub fn new(levels: Vec<Tilemap>) -> Self {
        Self { levels }
    }
}

impl LevelSource for MemoryLevels {
    fn load(&self, index: usize) -> Result<Tilemap, LevelLoadError> {
        self.levels
            .get(index)
            .cloned()
            .ok_or_else(|| LevelLoadError::NotFound(self.origin(index).display().to_string()))
    }

    fn origin(&self, index: usize) -> PathBuf {
        PathBuf::from(format!("memory/{index}"))
    }
}
