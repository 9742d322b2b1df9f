//! The running game: one level's world plus the per-tick orchestration that
//! advances and draws it.

mod levels;
mod scene;
#[cfg(test)]
mod tests;

use std::f32::consts::PI;
use std::mem;
use std::ops::RangeInclusive;

use engine::{InputAction, InputSnapshot, Rect, Surface, Vec2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

pub use levels::{DirectoryLevels, LevelSource, MemoryLevels};
pub use scene::GameplayScene;

use crate::assets::GameAssets;
use crate::audio::SoundCue;
use crate::config::GameConfig;
use crate::effects::{
    impact_burst, spark_fan, Clouds, Particle, ParticleKind, Projectile, Spark,
};
use crate::entity::{
    Behavior, Enemy, Outcome, Player, PlayerView, UpdateContext, DASH_ATTACK_THRESHOLD,
};
use crate::events::GameEvent;
use crate::level::{LevelLoadError, TileKind, Tilemap, ENEMY_SPAWNER, PLAYER_SPAWNER};

/// Iris length in ticks; also the completion delay before the next level.
pub const TRANSITION_TICKS: i32 = 30;
/// Death ticks before the iris starts closing.
pub const DEATH_IRIS_TICK: u32 = 10;
/// Death ticks after which the level is reloaded.
pub const DEATH_RELOAD_TICK: u32 = 40;

const CAMERA_EASING: f32 = 20.0;
const IRIS_PIXELS_PER_TICK: f32 = 8.0;

const LEAF_TREE_VARIANT: usize = 2;
const LEAF_SPAWNER_INSET: Vec2 = Vec2::new(4.0, 4.0);
const LEAF_SPAWNER_SIZE: Vec2 = Vec2::new(23.0, 13.0);
/// A spawner emits when `rand * LEAF_SPAWN_ROLL < area`.
const LEAF_SPAWN_ROLL: f32 = 49_999.0;
const LEAF_VELOCITY: Vec2 = Vec2::new(-0.1, 0.3);
const LEAF_START_FRAMES: RangeInclusive<u32> = 0..=20;

const BLACK: [u8; 4] = [0, 0, 0, 255];
const WHITE: [u8; 4] = [255, 255, 255, 255];
const HUD_ORIGIN: (i32, i32) = (10, 10);
const HUD_SCALE: i32 = 2;
const WIN_TEXT: &str = "You Win!";
const WIN_TEXT_SCALE: i32 = 4;

/// Everything alive in the current level, owned in one place and advanced
/// in a fixed order by [`SessionState::tick`].
pub struct SessionState {
    assets: GameAssets,
    levels: Box<dyn LevelSource>,
    level_count: usize,
    level: usize,
    rng: ChaCha8Rng,
    tilemap: Tilemap,
    player: Player,
    enemies: Vec<Enemy>,
    total_enemies: usize,
    leaf_spawners: Vec<Rect>,
    projectiles: Vec<Projectile>,
    particles: Vec<Particle>,
    sparks: Vec<Spark>,
    clouds: Clouds,
    scroll: Vec2,
    dead: u32,
    transition: i32,
    /// Held horizontal input as `[left, right]`, sampled at the end of a tick.
    movement: [bool; 2],
    won: bool,
    pending_cues: Vec<SoundCue>,
    display_size: Vec2,
}

impl SessionState {
    /// Builds the session and loads `config.start_level`.
    pub fn new(
        assets: GameAssets,
        levels: Box<dyn LevelSource>,
        config: &GameConfig,
        display_size: Vec2,
    ) -> Result<Self, LevelLoadError> {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let clouds = Clouds::new(config.cloud_count, assets.clouds.len(), &mut rng);
        let player = Player::new(Vec2::ZERO, &assets.animations);
        let mut session = Self {
            assets,
            levels,
            level_count: config.level_count.max(1),
            level: config.start_level,
            rng,
            tilemap: Tilemap::new(Tilemap::DEFAULT_TILE_SIZE),
            player,
            enemies: Vec::new(),
            total_enemies: 0,
            leaf_spawners: Vec::new(),
            projectiles: Vec::new(),
            particles: Vec::new(),
            sparks: Vec::new(),
            clouds,
            scroll: Vec2::ZERO,
            dead: 0,
            transition: 0,
            movement: [false, false],
            won: false,
            pending_cues: Vec::new(),
            display_size,
        };
        session.load_level(config.start_level)?;
        Ok(session)
    }

    /// Replaces the world with level `index` and resets every population.
    pub fn load_level(&mut self, index: usize) -> Result<(), LevelLoadError> {
        let mut tilemap = self.levels.load(index)?;
        let origin = self.levels.origin(index);
        tilemap
            .check_variants(&self.assets.tiles)
            .and_then(|()| tilemap.check_spawners())
            .map_err(|source| LevelLoadError::Format {
                path: origin.clone(),
                source,
            })?;

        self.leaf_spawners = tilemap
            .extract(&[(TileKind::LargeDecor, LEAF_TREE_VARIANT)], true)
            .into_iter()
            .map(|tree| Rect::from_origin_size(tree.pos + LEAF_SPAWNER_INSET, LEAF_SPAWNER_SIZE))
            .collect();

        self.enemies.clear();
        let spawners = tilemap.extract(
            &[
                (TileKind::Spawners, PLAYER_SPAWNER),
                (TileKind::Spawners, ENEMY_SPAWNER),
            ],
            false,
        );
        for spawner in spawners {
            if spawner.variant == PLAYER_SPAWNER {
                self.player = Player::new(spawner.pos, &self.assets.animations);
            } else {
                self.enemies
                    .push(Enemy::new(spawner.pos, &self.assets.animations));
            }
        }
        self.total_enemies = self.enemies.len();

        self.tilemap = tilemap;
        self.level = index;
        self.projectiles.clear();
        self.particles.clear();
        self.sparks.clear();
        self.scroll = Vec2::ZERO;
        self.dead = 0;
        self.transition = -TRANSITION_TICKS;

        info!(
            level = index,
            origin = %origin.display(),
            enemy_count = self.total_enemies,
            leaf_spawners = self.leaf_spawners.len(),
            "level_loaded"
        );
        Ok(())
    }

    /// Advances the world by one fixed tick.
    ///
    /// Order: level bookkeeping, camera, ambient spawns, clouds, enemies,
    /// player, projectiles, sparks, particles, then input.
    pub fn tick(&mut self, input: &InputSnapshot) -> Result<(), LevelLoadError> {
        if self.won {
            return Ok(());
        }

        self.advance_transition()?;
        self.update_camera();
        self.spawn_leaves();
        self.clouds.update();

        let mut events = Vec::new();
        self.update_enemies(&mut events);
        self.apply_events(&mut events);

        if self.dead == 0 {
            self.update_player(&mut events);
            self.apply_events(&mut events);
        }

        self.update_projectiles(&mut events);
        self.apply_events(&mut events);

        self.sparks.retain_mut(Spark::update);
        self.particles.retain_mut(|particle| {
            let alive = particle.update();
            particle.apply_drift();
            alive
        });

        self.handle_input(input);
        Ok(())
    }

    fn advance_transition(&mut self) -> Result<(), LevelLoadError> {
        if self.enemies.is_empty() {
            self.transition += 1;
            if self.transition > TRANSITION_TICKS {
                if self.level + 1 < self.level_count {
                    info!(level = self.level, "level_completed");
                    self.load_level(self.level + 1)?;
                } else if !self.won {
                    info!(level = self.level, "game_won");
                    self.won = true;
                }
            }
        }
        if self.transition < 0 {
            self.transition += 1;
        }

        if self.dead > 0 {
            self.dead += 1;
            if self.dead >= DEATH_IRIS_TICK {
                self.transition = (self.transition + 1).min(TRANSITION_TICKS);
            }
            if self.dead > DEATH_RELOAD_TICK {
                info!(level = self.level, "level_reload");
                self.load_level(self.level)?;
            }
        }
        Ok(())
    }

    fn update_camera(&mut self) {
        let target = self.player.body.rect().center() - self.display_size * 0.5;
        self.scroll.x += (target.x - self.scroll.x) / CAMERA_EASING;
        self.scroll.y += (target.y - self.scroll.y) / CAMERA_EASING;
    }

    fn spawn_leaves(&mut self) {
        for rect in &self.leaf_spawners {
            if self.rng.gen::<f32>() * LEAF_SPAWN_ROLL < rect.area() {
                let pos = Vec2::new(
                    rect.x + self.rng.gen::<f32>() * rect.w,
                    rect.y + self.rng.gen::<f32>() * rect.h,
                );
                let frame = self.rng.gen_range(LEAF_START_FRAMES);
                self.particles.push(Particle::new(
                    ParticleKind::Leaf,
                    pos,
                    LEAF_VELOCITY,
                    frame,
                    &self.assets.animations,
                ));
            }
        }
    }

    fn player_view(&self) -> PlayerView {
        PlayerView {
            pos: self.player.body.pos,
            rect: self.player.body.rect(),
            dashing: self.player.dashing(),
        }
    }

    fn update_enemies(&mut self, events: &mut Vec<GameEvent>) {
        let player = self.player_view();
        let mut ctx = UpdateContext {
            tilemap: &self.tilemap,
            animations: &self.assets.animations,
            rng: &mut self.rng,
            player,
            events,
        };
        let mut enemies = mem::take(&mut self.enemies);
        let before = enemies.len();
        enemies.retain_mut(|enemy| enemy.on_update(&mut ctx, Vec2::ZERO) == Outcome::Alive);
        if enemies.len() < before {
            debug!(
                level = self.level,
                killed = before - enemies.len(),
                remaining = enemies.len(),
                "enemy_killed"
            );
        }
        self.enemies = enemies;
    }

    fn update_player(&mut self, events: &mut Vec<GameEvent>) {
        let [left, right] = self.movement;
        let intent = Vec2::new(f32::from(u8::from(right)) - f32::from(u8::from(left)), 0.0);
        let player = self.player_view();
        let mut ctx = UpdateContext {
            tilemap: &self.tilemap,
            animations: &self.assets.animations,
            rng: &mut self.rng,
            player,
            events,
        };
        self.player.on_update(&mut ctx, intent);
    }

    fn update_projectiles(&mut self, events: &mut Vec<GameEvent>) {
        let mut projectiles = mem::take(&mut self.projectiles);
        projectiles.retain_mut(|projectile| {
            projectile.advance();
            if self.tilemap.solid_check(projectile.pos) {
                let heading = if projectile.speed > 0.0 { PI } else { 0.0 };
                spark_fan(projectile.pos, heading, &mut self.rng, events);
                return false;
            }
            if projectile.is_expired() {
                return false;
            }
            let player_rect = self.player.body.rect();
            if self.player.dashing().abs() < DASH_ATTACK_THRESHOLD
                && player_rect.contains_point(projectile.pos)
            {
                if self.dead == 0 {
                    info!(level = self.level, cause = "projectile", "player_died");
                }
                self.dead += 1;
                events.push(GameEvent::Sound(SoundCue::Hit));
                impact_burst(
                    player_rect.center(),
                    &mut self.rng,
                    &self.assets.animations,
                    events,
                );
                return false;
            }
            true
        });
        self.projectiles = projectiles;
    }

    fn apply_events(&mut self, events: &mut Vec<GameEvent>) {
        for event in events.drain(..) {
            match event {
                GameEvent::Sound(cue) => self.pending_cues.push(cue),
                GameEvent::Spark(spark) => self.sparks.push(spark),
                GameEvent::Particle(particle) => self.particles.push(particle),
                GameEvent::Projectile(projectile) => self.projectiles.push(projectile),
                GameEvent::PlayerFell => {
                    if self.dead == 0 {
                        info!(level = self.level, cause = "fell", "player_died");
                    }
                    self.dead += 1;
                }
            }
        }
    }

    fn handle_input(&mut self, input: &InputSnapshot) {
        self.movement = [
            input.is_down(InputAction::MoveLeft),
            input.is_down(InputAction::MoveRight),
        ];
        if input.was_pressed(InputAction::Jump) && self.player.jump() {
            self.pending_cues.push(SoundCue::Jump);
        }
        if input.was_pressed(InputAction::Dash) && self.player.dash() {
            self.pending_cues.push(SoundCue::Dash);
        }
    }

    /// Sound cues raised since the last call, oldest first.
    pub fn drain_cues(&mut self) -> Vec<SoundCue> {
        mem::take(&mut self.pending_cues)
    }

    /// Camera offset in whole pixels.
    pub fn render_scroll(&self) -> Vec2 {
        Vec2::new(self.scroll.x.trunc(), self.scroll.y.trunc())
    }

    /// Draws the world back to front, then the iris and the HUD.
    pub fn render(&self, surface: &mut Surface) {
        if self.won {
            surface.fill(BLACK);
            let (text_w, text_h) = Surface::text_size(WIN_TEXT, WIN_TEXT_SCALE);
            let x = surface.width() as i32 / 2 - text_w / 2;
            let y = surface.height() as i32 / 2 - text_h / 2;
            surface.draw_text(x, y, WIN_TEXT, WIN_TEXT_SCALE, WHITE);
            return;
        }

        let offset = self.render_scroll();
        surface.blit(&self.assets.background, Vec2::ZERO);
        self.clouds.render(surface, offset, &self.assets.clouds);
        self.tilemap.render(surface, offset, &self.assets.tiles);
        for enemy in &self.enemies {
            enemy.render(surface, offset);
        }
        if self.dead == 0 {
            self.player.render(surface, offset);
        }
        for projectile in &self.projectiles {
            projectile.render(surface, offset, &self.assets.projectile);
        }
        for spark in &self.sparks {
            spark.render(surface, offset);
        }
        for particle in &self.particles {
            particle.render(surface, offset);
        }

        if self.transition != 0 {
            let radius = (TRANSITION_TICKS - self.transition.abs()) as f32 * IRIS_PIXELS_PER_TICK;
            let center = Vec2::new(
                (surface.width() / 2) as f32,
                (surface.height() / 2) as f32,
            );
            surface.cover_outside_circle(center, radius, BLACK);
        }

        let hud = format!("Enemies: {}/{}", self.enemies.len(), self.total_enemies);
        surface.draw_text(HUD_ORIGIN.0, HUD_ORIGIN.1, &hud, HUD_SCALE, WHITE);
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn level_count(&self) -> usize {
        self.level_count
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    pub fn dead(&self) -> u32 {
        self.dead
    }

    pub fn transition(&self) -> i32 {
        self.transition
    }

    pub fn scroll(&self) -> Vec2 {
        self.scroll
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn total_enemies(&self) -> usize {
        self.total_enemies
    }

    pub fn leaf_spawners(&self) -> &[Rect] {
        &self.leaf_spawners
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn sparks(&self) -> &[Spark] {
        &self.sparks
    }

    pub fn tilemap(&self) -> &Tilemap {
        &self.tilemap
    }
}
