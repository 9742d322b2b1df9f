use std::env;
use std::path::Path;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use engine::AppPaths;
use tracing::warn;

pub const SEED_ENV_VAR: &str = "DASH_SEED";
pub const START_LEVEL_ENV_VAR: &str = "DASH_START_LEVEL";

pub const DEFAULT_LEVEL_COUNT: usize = 3;
pub const DEFAULT_CLOUD_COUNT: usize = 16;

/// Session settings resolved once at startup.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub paths: AppPaths,
    pub level_count: usize,
    pub start_level: usize,
    pub seed: u64,
    pub cloud_count: usize,
}

impl GameConfig {
    pub fn new(paths: AppPaths, seed: u64) -> Self {
        Self {
            paths,
            level_count: DEFAULT_LEVEL_COUNT,
            start_level: 0,
            seed,
            cloud_count: DEFAULT_CLOUD_COUNT,
        }
    }

    /// Defaults with `DASH_SEED` and `DASH_START_LEVEL` applied. Bad values
    /// are logged and ignored.
    pub fn from_env(paths: AppPaths) -> Self {
        let seed = read_override(SEED_ENV_VAR, clock_seed());
        let mut config = Self::new(paths, seed);
        let start_level = read_override(START_LEVEL_ENV_VAR, 0);
        config.start_level = clamp_start_level(start_level, config.level_count);
        config
    }

    pub fn maps_dir(&self) -> &Path {
        &self.paths.maps_dir
    }
}

fn clamp_start_level(requested: usize, level_count: usize) -> usize {
    if requested < level_count {
        return requested;
    }
    warn!(
        env_var = START_LEVEL_ENV_VAR,
        requested,
        level_count,
        "start level out of range; starting at level 0"
    );
    0
}

fn read_override<T: FromStr + Copy>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(value) => parse_override(name, &value, default),
        Err(env::VarError::NotPresent) => default,
        Err(err) => {
            warn!(env_var = name, error = %err, "unable to read env var; using default");
            default
        }
    }
}

fn parse_override<T: FromStr + Copy>(name: &str, value: &str, default: T) -> T {
    match value.trim().parse::<T>() {
        Ok(parsed) => parsed,
        Err(_) => {
            warn!(env_var = name, value, "invalid env var value; using default");
            default
        }
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}
