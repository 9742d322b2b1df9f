//! Tile-colliding actors: a shared physics body plus per-kind behavior.

mod enemy;
mod player;

use engine::{Rect, Surface, Vec2};
use rand_chacha::ChaCha8Rng;

pub use enemy::Enemy;
pub use player::{Player, DASH_ATTACK_THRESHOLD, DASH_START, MAX_AIR_TIME, MAX_JUMPS};

use crate::animation::Animation;
use crate::assets::AnimationLibrary;
use crate::events::GameEvent;
use crate::level::Tilemap;

/// Frames are drawn up and left of the physics box.
pub const ENTITY_RENDER_OFFSET: Vec2 = Vec2::new(-3.0, -3.0);
pub const ENTITY_SIZE: Vec2 = Vec2::new(16.0, 16.0);
pub const GRAVITY: f32 = 0.1;
pub const MAX_FALL_SPEED: f32 = 5.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionFlags {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl CollisionFlags {
    pub fn horizontal(&self) -> bool {
        self.left || self.right
    }

    pub fn vertical(&self) -> bool {
        self.up || self.down
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorKind {
    Player,
    Enemy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Idle,
    Run,
    Jump,
    Walk,
}

fn animation_template(library: &AnimationLibrary, kind: ActorKind, action: Action) -> &Animation {
    match (kind, action) {
        (ActorKind::Player, Action::Idle) => &library.player_idle,
        (ActorKind::Player, Action::Run | Action::Walk) => &library.player_run,
        (ActorKind::Player, Action::Jump) => &library.player_jump,
        (ActorKind::Enemy, Action::Walk | Action::Run) => &library.enemy_walk,
        (ActorKind::Enemy, Action::Idle | Action::Jump) => &library.enemy_idle,
    }
}

/// Position, velocity and axis-separated tile collision shared by every actor.
#[derive(Debug, Clone)]
pub struct PhysicsEntity {
    pub kind: ActorKind,
    pub pos: Vec2,
    pub velocity: Vec2,
    pub size: Vec2,
    pub collisions: CollisionFlags,
    pub flip: bool,
    action: Action,
    animation: Animation,
}

impl PhysicsEntity {
    pub fn new(kind: ActorKind, pos: Vec2, size: Vec2, library: &AnimationLibrary) -> Self {
        Self {
            kind,
            pos,
            velocity: Vec2::ZERO,
            size,
            collisions: CollisionFlags::default(),
            flip: false,
            action: Action::Idle,
            animation: animation_template(library, kind, Action::Idle).restarted(),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.pos, self.size)
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    /// Switches animation only when the action actually changes.
    pub fn set_action(&mut self, action: Action, library: &AnimationLibrary) {
        if action != self.action {
            self.action = action;
            self.animation = animation_template(library, self.kind, action).restarted();
        }
    }

    /// One physics step: X pass, Y pass, facing, gravity, animation.
    ///
    /// A pass only flags a side when the box overlaps a tile after moving, so
    /// a zero displacement along an axis never sets that axis' flags.
    pub fn update(&mut self, tilemap: &Tilemap, movement: Vec2) {
        self.collisions = CollisionFlags::default();
        let frame_movement = movement + self.velocity;

        self.pos.x += frame_movement.x;
        let mut entity_rect = self.rect();
        for rect in tilemap.physics_rects_around(self.pos) {
            if entity_rect.overlaps(&rect) {
                if frame_movement.x > 0.0 {
                    entity_rect.set_right(rect.left());
                    self.collisions.right = true;
                }
                if frame_movement.x < 0.0 {
                    entity_rect.set_left(rect.right());
                    self.collisions.left = true;
                }
                self.pos.x = entity_rect.x;
            }
        }

        self.pos.y += frame_movement.y;
        let mut entity_rect = self.rect();
        for rect in tilemap.physics_rects_around(self.pos) {
            if entity_rect.overlaps(&rect) {
                if frame_movement.y > 0.0 {
                    entity_rect.set_bottom(rect.top());
                    self.collisions.down = true;
                }
                if frame_movement.y < 0.0 {
                    entity_rect.set_top(rect.bottom());
                    self.collisions.up = true;
                }
                self.pos.y = entity_rect.y;
            }
        }

        if movement.x > 0.0 {
            self.flip = false;
        }
        if movement.x < 0.0 {
            self.flip = true;
        }

        self.velocity.y = (self.velocity.y + GRAVITY).min(MAX_FALL_SPEED);
        if self.collisions.vertical() {
            self.velocity.y = 0.0;
        }

        self.animation.update();
    }

    pub fn render(&self, surface: &mut Surface, offset: Vec2) {
        if let Some(image) = self.animation.image() {
            surface.blit_ex(image, self.pos - offset + ENTITY_RENDER_OFFSET, self.flip);
        }
    }
}

/// What the rest of the level sees of the player during an actor update.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerView {
    pub pos: Vec2,
    pub rect: Rect,
    pub dashing: i32,
}

/// Shared, read-mostly state handed to each actor's update.
pub struct UpdateContext<'a> {
    pub tilemap: &'a Tilemap,
    pub animations: &'a AnimationLibrary,
    pub rng: &'a mut ChaCha8Rng,
    pub player: PlayerView,
    pub events: &'a mut Vec<GameEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Alive,
    Removed,
}

/// Per-kind policy layered over [`PhysicsEntity`].
pub trait Behavior {
    fn body(&self) -> &PhysicsEntity;

    /// Advances one tick with the given movement intent. Side effects go to
    /// `ctx.events`.
    fn on_update(&mut self, ctx: &mut UpdateContext<'_>, intent: Vec2) -> Outcome;

    fn render(&self, surface: &mut Surface, offset: Vec2) {
        self.body().render(surface, offset);
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{GridPos, TileKind};

    fn floor_map() -> Tilemap {
        let mut map = Tilemap::new(16);
        for x in -2..6 {
            map.insert(TileKind::Grass, 1, GridPos::new(x, 3));
        }
        map
    }

    fn body_at(pos: Vec2) -> PhysicsEntity {
        PhysicsEntity::new(ActorKind::Player, pos, ENTITY_SIZE, &AnimationLibrary::placeholder())
    }

    #[test]
    fn landing_snaps_to_floor_and_zeroes_fall_speed() {
        let map = floor_map();
        let mut body = body_at(Vec2::new(16.0, 31.0));
        body.velocity.y = 3.0;
        body.update(&map, Vec2::ZERO);

        assert!(body.collisions.down);
        assert_eq!(body.pos.y, 32.0);
        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn falling_accumulates_gravity_up_to_cap() {
        let map = Tilemap::new(16);
        let mut body = body_at(Vec2::ZERO);
        for _ in 0..10 {
            body.update(&map, Vec2::ZERO);
        }
        assert!((body.velocity.y - 1.0).abs() < 1e-5);
        for _ in 0..100 {
            body.update(&map, Vec2::ZERO);
        }
        assert_eq!(body.velocity.y, MAX_FALL_SPEED);
    }

    #[test]
    fn walking_into_wall_sets_side_flag_and_stops() {
        let mut map = floor_map();
        map.insert(TileKind::Stone, 0, GridPos::new(3, 2));
        let mut body = body_at(Vec2::new(30.0, 32.0));
        body.update(&map, Vec2::new(3.0, 0.0));

        assert!(body.collisions.right);
        assert!(!body.collisions.left);
        assert_eq!(body.pos.x, 32.0);
        assert!(!body.flip);
    }

    #[test]
    fn corner_stops_horizontal_motion_before_vertical() {
        let mut map = Tilemap::new(16);
        map.insert(TileKind::Stone, 0, GridPos::new(2, 1));
        map.insert(TileKind::Stone, 0, GridPos::new(1, 2));
        let mut body = body_at(Vec2::new(14.0, 14.0));
        body.update(&map, Vec2::new(3.0, 3.0));

        assert!(body.collisions.right);
        assert!(body.collisions.down);
        assert_eq!(body.pos, Vec2::new(16.0, 16.0));
    }

    #[test]
    fn diagonal_tile_is_resolved_as_a_landing() {
        // Only the Y pass sees the tile, so the body keeps its X motion.
        let mut map = Tilemap::new(16);
        map.insert(TileKind::Stone, 0, GridPos::new(2, 2));
        let mut body = body_at(Vec2::new(14.0, 14.0));
        body.update(&map, Vec2::new(3.0, 3.0));

        assert!(!body.collisions.right);
        assert!(body.collisions.down);
        assert_eq!(body.pos, Vec2::new(17.0, 16.0));
    }

    #[test]
    fn ceiling_hit_sets_up_flag() {
        let mut map = Tilemap::new(16);
        map.insert(TileKind::Stone, 0, GridPos::new(1, 0));
        let mut body = body_at(Vec2::new(16.0, 17.0));
        body.velocity.y = -3.0;
        body.update(&map, Vec2::ZERO);

        assert!(body.collisions.up);
        assert_eq!(body.pos.y, 16.0);
        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn decor_tiles_do_not_collide() {
        let mut map = Tilemap::new(16);
        map.insert(TileKind::Decor, 0, GridPos::new(1, 3));
        let mut body = body_at(Vec2::new(16.0, 31.0));
        body.velocity.y = 3.0;
        body.update(&map, Vec2::ZERO);
        assert!(!body.collisions.down);
        assert_eq!(body.pos.y, 34.0);
    }

    #[test]
    fn facing_follows_intent_and_holds_on_zero() {
        let map = floor_map();
        let mut body = body_at(Vec2::new(16.0, 32.0));
        body.update(&map, Vec2::new(-1.0, 0.0));
        assert!(body.flip);
        body.update(&map, Vec2::ZERO);
        assert!(body.flip);
        body.update(&map, Vec2::new(1.0, 0.0));
        assert!(!body.flip);
    }

    #[test]
    fn set_action_restarts_animation_only_on_change() {
        let library = AnimationLibrary::placeholder();
        let mut body = body_at(Vec2::ZERO);
        body.update(&Tilemap::new(16), Vec2::ZERO);
        assert_eq!(body.animation().frame(), 1);

        body.set_action(Action::Idle, &library);
        assert_eq!(body.animation().frame(), 1);

        body.set_action(Action::Run, &library);
        assert_eq!(body.action(), Action::Run);
        assert_eq!(body.animation().frame(), 0);
        assert!(body.animation().shares_frames_with(&library.player_run));
    }
}
