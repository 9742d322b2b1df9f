use std::f32::consts::TAU;

use engine::{Surface, Vec2};
use rand::Rng;

use super::{Action, ActorKind, Behavior, Outcome, PhysicsEntity, UpdateContext, ENTITY_SIZE};
use crate::assets::AnimationLibrary;
use crate::effects::{Particle, ParticleKind, DUST_START_FRAMES};
use crate::events::GameEvent;

pub const MAX_JUMPS: u8 = 2;
/// Airborne ticks after which the player counts as fallen out of the level.
pub const MAX_AIR_TIME: u32 = 120;
/// Air time forced by a jump so the jump animation starts on the next tick.
const JUMP_AIR_TIME: u32 = 5;
const JUMP_ACTION_AIR_TIME: u32 = 4;
const JUMP_VELOCITY: f32 = -3.0;

/// Dash counter magnitude right after a dash starts.
pub const DASH_START: i32 = 60;
/// Above this magnitude the dash is in its burst phase; at or above it the
/// player kills enemies on contact and projectiles pass through.
pub const DASH_ATTACK_THRESHOLD: i32 = 50;
const DASH_BRAKE_TICK: i32 = 51;
const DASH_SPEED: f32 = 8.0;
const DASH_BRAKE_FACTOR: f32 = 0.1;
const DASH_BURST_PARTICLES: usize = 20;
const HORIZONTAL_DRAG: f32 = 0.1;

/// The input-driven actor.
#[derive(Debug, Clone)]
pub struct Player {
    pub body: PhysicsEntity,
    air_time: u32,
    jumps: u8,
    dashing: i32,
}

impl Player {
    pub fn new(pos: Vec2, library: &AnimationLibrary) -> Self {
        Self {
            body: PhysicsEntity::new(ActorKind::Player, pos, ENTITY_SIZE, library),
            air_time: 0,
            jumps: MAX_JUMPS,
            dashing: 0,
        }
    }

    pub fn air_time(&self) -> u32 {
        self.air_time
    }

    pub fn jumps(&self) -> u8 {
        self.jumps
    }

    /// Signed dash counter; the sign is the dash direction.
    pub fn dashing(&self) -> i32 {
        self.dashing
    }

    pub fn is_dash_attacking(&self) -> bool {
        self.dashing.abs() >= DASH_ATTACK_THRESHOLD
    }

    /// Spends a jump charge. Returns `false` when none are left.
    pub fn jump(&mut self) -> bool {
        if self.jumps == 0 {
            return false;
        }
        self.body.velocity.y = JUMP_VELOCITY;
        self.jumps -= 1;
        self.air_time = JUMP_AIR_TIME;
        true
    }

    /// Starts a dash in the facing direction. Returns `false` while one is
    /// already running.
    pub fn dash(&mut self) -> bool {
        if self.dashing != 0 {
            return false;
        }
        self.dashing = if self.body.flip { -DASH_START } else { DASH_START };
        true
    }

    fn emit_dust(&self, ctx: &mut UpdateContext<'_>, velocity: Vec2) {
        let frame = ctx.rng.gen_range(DUST_START_FRAMES);
        ctx.events.push(GameEvent::Particle(Particle::new(
            ParticleKind::Dust,
            self.body.rect().center(),
            velocity,
            frame,
            ctx.animations,
        )));
    }
}

impl Behavior for Player {
    fn body(&self) -> &PhysicsEntity {
        &self.body
    }

    fn on_update(&mut self, ctx: &mut UpdateContext<'_>, intent: Vec2) -> Outcome {
        self.body.update(ctx.tilemap, intent);

        self.air_time += 1;
        if self.air_time > MAX_AIR_TIME {
            ctx.events.push(GameEvent::PlayerFell);
        }
        if self.body.collisions.down {
            self.air_time = 0;
            self.jumps = MAX_JUMPS;
        }

        let action = if self.air_time > JUMP_ACTION_AIR_TIME {
            Action::Jump
        } else if intent.x != 0.0 {
            Action::Run
        } else {
            Action::Idle
        };
        self.body.set_action(action, ctx.animations);

        let magnitude = self.dashing.abs();
        if magnitude == DASH_START || magnitude == DASH_ATTACK_THRESHOLD {
            for _ in 0..DASH_BURST_PARTICLES {
                let angle = ctx.rng.gen::<f32>() * TAU;
                let speed = ctx.rng.gen::<f32>() * 0.5 + 0.5;
                self.emit_dust(ctx, Vec2::from_angle(angle, speed));
            }
        }

        self.dashing -= self.dashing.signum();
        if self.dashing.abs() > DASH_ATTACK_THRESHOLD {
            let direction = self.dashing.signum() as f32;
            self.body.velocity.x = direction * DASH_SPEED;
            if self.dashing.abs() == DASH_BRAKE_TICK {
                self.body.velocity.x *= DASH_BRAKE_FACTOR;
            }
            let trail = Vec2::new(direction * ctx.rng.gen::<f32>() * 3.0, 0.0);
            self.emit_dust(ctx, trail);
        }

        if self.body.velocity.x > 0.0 {
            self.body.velocity.x = (self.body.velocity.x - HORIZONTAL_DRAG).max(0.0);
        } else {
            self.body.velocity.x = (self.body.velocity.x + HORIZONTAL_DRAG).min(0.0);
        }

        Outcome::Alive
    }

    /// Hidden during the burst phase of a dash.
    fn render(&self, surface: &mut Surface, offset: Vec2) {
        if self.dashing.abs() <= DASH_ATTACK_THRESHOLD {
            self.body.render(surface, offset);
        }
    }
}
