use std::path::Path;
use std::sync::Arc;

use engine::{load_image, load_images, Sprite};
use tracing::{info, warn};

use crate::animation::Animation;
use crate::level::TileKind;

/// Display size of entity frames; physics boxes are 16x16 and the frame is
/// drawn at [`crate::entity::ENTITY_RENDER_OFFSET`].
pub const ENTITY_FRAME_SIZE: (u32, u32) = (16, 19);
pub const CLOUD_SIZE: (u32, u32) = (50, 25);

const BLACK_KEY: Option<[u8; 3]> = Some([0, 0, 0]);
const WHITE_KEY: Option<[u8; 3]> = Some([255, 255, 255]);
const PLACEHOLDER_COLOR: [u8; 4] = [220, 220, 240, 255];

/// Where an animation's frames live and how they play.
struct AnimationSpec {
    dir: &'static str,
    frame_duration: f32,
    looping: bool,
    scale_to_entity: bool,
    placeholder_frames: usize,
}

const PLAYER_IDLE: AnimationSpec = AnimationSpec {
    dir: "Player/idle",
    frame_duration: 10.0,
    looping: true,
    scale_to_entity: true,
    placeholder_frames: 2,
};
const PLAYER_RUN: AnimationSpec = AnimationSpec {
    dir: "Player/run",
    frame_duration: 4.0,
    looping: true,
    scale_to_entity: true,
    placeholder_frames: 4,
};
const PLAYER_JUMP: AnimationSpec = AnimationSpec {
    dir: "Player/jump",
    frame_duration: 5.5,
    looping: true,
    scale_to_entity: true,
    placeholder_frames: 1,
};
const ENEMY_IDLE: AnimationSpec = AnimationSpec {
    dir: "Enemy/idle",
    frame_duration: 9.0,
    looping: true,
    scale_to_entity: true,
    placeholder_frames: 2,
};
const ENEMY_WALK: AnimationSpec = AnimationSpec {
    dir: "Enemy/walk",
    frame_duration: 4.0,
    looping: true,
    scale_to_entity: true,
    placeholder_frames: 4,
};
const LEAF: AnimationSpec = AnimationSpec {
    dir: "particles/leaf",
    frame_duration: 20.0,
    looping: false,
    scale_to_entity: false,
    placeholder_frames: 18,
};
const DUST: AnimationSpec = AnimationSpec {
    dir: "particles/particle",
    frame_duration: 6.0,
    looping: false,
    scale_to_entity: false,
    placeholder_frames: 4,
};

/// Sprites for every tile kind, indexed by variant.
#[derive(Debug, Clone)]
pub struct TileSet {
    variants: [Vec<Sprite>; 5],
}

impl TileSet {
    fn slot(kind: TileKind) -> usize {
        match kind {
            TileKind::Grass => 0,
            TileKind::Stone => 1,
            TileKind::Decor => 2,
            TileKind::LargeDecor => 3,
            TileKind::Spawners => 4,
        }
    }

    fn placeholder_count(kind: TileKind) -> usize {
        match kind {
            TileKind::Grass | TileKind::Stone => 9,
            TileKind::Decor => 4,
            TileKind::LargeDecor => 3,
            TileKind::Spawners => 2,
        }
    }

    pub fn placeholder() -> Self {
        let variants = TileKind::ALL.map(|kind| {
            vec![Sprite::solid(16, 16, PLACEHOLDER_COLOR); Self::placeholder_count(kind)]
        });
        Self { variants }
    }

    fn load(images_dir: &Path) -> Self {
        let variants = TileKind::ALL.map(|kind| {
            let dir = images_dir.join("tiles").join(kind.as_str());
            load_frames_or_placeholder(
                &dir,
                BLACK_KEY,
                Self::placeholder_count(kind),
                (16, 16),
            )
        });
        Self { variants }
    }

    pub fn sprite(&self, kind: TileKind, variant: usize) -> Option<&Sprite> {
        self.variants[Self::slot(kind)].get(variant)
    }

    pub fn variant_count(&self, kind: TileKind) -> usize {
        self.variants[Self::slot(kind)].len()
    }
}

/// Shared animation templates. Entities take fresh copies on action change.
#[derive(Debug, Clone)]
pub struct AnimationLibrary {
    pub player_idle: Animation,
    pub player_run: Animation,
    pub player_jump: Animation,
    pub enemy_idle: Animation,
    pub enemy_walk: Animation,
    pub leaf: Animation,
    pub dust: Animation,
}

impl AnimationLibrary {
    fn build(mut frames_for: impl FnMut(&AnimationSpec) -> Vec<Sprite>) -> Self {
        let mut make = |spec: &AnimationSpec| {
            let frames: Arc<[Sprite]> = frames_for(spec).into();
            Animation::new(frames, spec.frame_duration, spec.looping)
        };
        Self {
            player_idle: make(&PLAYER_IDLE),
            player_run: make(&PLAYER_RUN),
            player_jump: make(&PLAYER_JUMP),
            enemy_idle: make(&ENEMY_IDLE),
            enemy_walk: make(&ENEMY_WALK),
            leaf: make(&LEAF),
            dust: make(&DUST),
        }
    }

    pub fn placeholder() -> Self {
        Self::build(|spec| {
            let (w, h) = if spec.scale_to_entity {
                ENTITY_FRAME_SIZE
            } else {
                (3, 3)
            };
            vec![Sprite::solid(w, h, PLACEHOLDER_COLOR); spec.placeholder_frames]
        })
    }

    fn load(images_dir: &Path) -> Self {
        Self::build(|spec| {
            let dir = images_dir.join(spec.dir);
            let (w, h) = if spec.scale_to_entity {
                ENTITY_FRAME_SIZE
            } else {
                (3, 3)
            };
            let frames = load_frames_or_placeholder(&dir, BLACK_KEY, spec.placeholder_frames, (w, h));
            if spec.scale_to_entity {
                frames.iter().map(|frame| frame.scaled(w, h)).collect()
            } else {
                frames
            }
        })
    }
}

/// Every image the session draws.
#[derive(Debug, Clone)]
pub struct GameAssets {
    pub background: Sprite,
    pub clouds: Vec<Sprite>,
    pub projectile: Sprite,
    pub tiles: TileSet,
    pub animations: AnimationLibrary,
}

impl GameAssets {
    /// Loads from `images_dir`. Anything missing or undecodable is replaced by
    /// a solid placeholder and reported once.
    pub fn load(images_dir: &Path) -> Self {
        let background = load_image(&images_dir.join("Background").join("mountain.png"), WHITE_KEY)
            .unwrap_or_else(|error| {
                warn!(asset = "background", error = %error, "sprite_load_failed_using_placeholder");
                Sprite::solid(640, 480, [40, 48, 72, 255])
            });
        let projectile = load_image(
            &images_dir.join("tiles").join("projectile").join("blue.png"),
            WHITE_KEY,
        )
        .unwrap_or_else(|error| {
            warn!(asset = "projectile", error = %error, "sprite_load_failed_using_placeholder");
            Sprite::solid(6, 2, [120, 180, 255, 255])
        });
        let clouds = load_frames_or_placeholder(&images_dir.join("clouds"), BLACK_KEY, 2, CLOUD_SIZE)
            .iter()
            .map(|cloud| cloud.scaled(CLOUD_SIZE.0, CLOUD_SIZE.1))
            .collect();

        let assets = Self {
            background,
            clouds,
            projectile,
            tiles: TileSet::load(images_dir),
            animations: AnimationLibrary::load(images_dir),
        };
        info!(
            images_dir = %images_dir.display(),
            cloud_sprites = assets.clouds.len(),
            "assets_loaded"
        );
        assets
    }

    /// In-memory assets for headless runs and tests.
    pub fn placeholder() -> Self {
        Self {
            background: Sprite::solid(640, 480, [40, 48, 72, 255]),
            clouds: vec![Sprite::solid(CLOUD_SIZE.0, CLOUD_SIZE.1, [230, 230, 240, 255]); 2],
            projectile: Sprite::solid(6, 2, [120, 180, 255, 255]),
            tiles: TileSet::placeholder(),
            animations: AnimationLibrary::placeholder(),
        }
    }
}

fn load_frames_or_placeholder(
    dir: &Path,
    color_key: Option<[u8; 3]>,
    placeholder_frames: usize,
    placeholder_size: (u32, u32),
) -> Vec<Sprite> {
    match load_images(dir, color_key) {
        Ok(frames) if !frames.is_empty() => frames,
        Ok(_) => {
            warn!(dir = %dir.display(), "sprite_dir_empty_using_placeholder");
            placeholder_frames_of(placeholder_frames, placeholder_size)
        }
        Err(error) => {
            warn!(dir = %dir.display(), error = %error, "sprite_load_failed_using_placeholder");
            placeholder_frames_of(placeholder_frames, placeholder_size)
        }
    }
}

fn placeholder_frames_of(count: usize, (w, h): (u32, u32)) -> Vec<Sprite> {
    vec![Sprite::solid(w, h, PLACEHOLDER_COLOR); count.max(1)]
}
