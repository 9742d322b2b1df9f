use std::f32::consts::PI;
use std::ops::RangeInclusive;

use engine::Vec2;
use rand::Rng;

use super::player::DASH_ATTACK_THRESHOLD;
use super::{Action, ActorKind, Behavior, Outcome, PhysicsEntity, UpdateContext, ENTITY_SIZE};
use crate::assets::AnimationLibrary;
use crate::audio::SoundCue;
use crate::effects::{impact_burst, spark_fan, Projectile, Spark, PROJECTILE_SPEED};
use crate::events::GameEvent;

const WALK_SPEED: f32 = 0.5;
/// Footing probe, relative to the box center (x) and top (y).
const LEDGE_PROBE_X: f32 = 7.0;
const LEDGE_PROBE_Y: f32 = 23.0;
const PATROL_START_CHANCE: f32 = 0.01;
const PATROL_TICKS: RangeInclusive<u32> = 30..=120;
/// Vertical distance within which the enemy will shoot at the player.
const SHOT_BAND: f32 = 16.0;
const MUZZLE_OFFSET: f32 = 7.0;

/// Patrolling shooter. `walking` counts down the current patrol; the tick it
/// reaches zero the enemy tries a shot.
#[derive(Debug, Clone)]
pub struct Enemy {
    pub body: PhysicsEntity,
    walking: u32,
}

impl Enemy {
    pub fn new(pos: Vec2, library: &AnimationLibrary) -> Self {
        Self {
            body: PhysicsEntity::new(ActorKind::Enemy, pos, ENTITY_SIZE, library),
            walking: 0,
        }
    }

    pub fn walking(&self) -> u32 {
        self.walking
    }

    fn patrol_step(&mut self, ctx: &mut UpdateContext<'_>, movement: &mut Vec2) {
        let center = self.body.rect().center();
        let reach = if self.body.flip { -LEDGE_PROBE_X } else { LEDGE_PROBE_X };
        let probe = Vec2::new(center.x + reach, self.body.pos.y + LEDGE_PROBE_Y);

        if ctx.tilemap.solid_check(probe) {
            if self.body.collisions.horizontal() {
                self.body.flip = !self.body.flip;
            } else {
                movement.x = if self.body.flip {
                    movement.x - WALK_SPEED
                } else {
                    WALK_SPEED
                };
            }
        } else {
            self.body.flip = !self.body.flip;
        }

        self.walking = self.walking.saturating_sub(1);
        if self.walking == 0 {
            self.try_shoot(ctx);
        }
    }

    fn try_shoot(&self, ctx: &mut UpdateContext<'_>) {
        let distance = ctx.player.pos - self.body.pos;
        if distance.y.abs() >= SHOT_BAND {
            return;
        }
        let (direction, heading) = match (self.body.flip, distance.x) {
            (true, dx) if dx < 0.0 => (-1.0, PI),
            (false, dx) if dx > 0.0 => (1.0, 0.0),
            _ => return,
        };

        ctx.events.push(GameEvent::Sound(SoundCue::Shoot));
        let center = self.body.rect().center();
        let muzzle = Vec2::new(center.x + direction * MUZZLE_OFFSET, center.y);
        ctx.events.push(GameEvent::Projectile(Projectile::new(
            muzzle,
            direction * PROJECTILE_SPEED,
        )));
        spark_fan(muzzle, heading, ctx.rng, ctx.events);
    }
}

impl Behavior for Enemy {
    fn body(&self) -> &PhysicsEntity {
        &self.body
    }

    fn on_update(&mut self, ctx: &mut UpdateContext<'_>, intent: Vec2) -> Outcome {
        let mut movement = intent;
        if self.walking > 0 {
            self.patrol_step(ctx, &mut movement);
        } else if ctx.rng.gen::<f32>() < PATROL_START_CHANCE {
            self.walking = ctx.rng.gen_range(PATROL_TICKS);
        }

        self.body.update(ctx.tilemap, movement);
        let action = if movement.x != 0.0 {
            Action::Walk
        } else {
            Action::Idle
        };
        self.body.set_action(action, ctx.animations);

        let rect = self.body.rect();
        if ctx.player.dashing.abs() >= DASH_ATTACK_THRESHOLD
            && rect.overlaps(&ctx.player.rect)
        {
            let center = rect.center();
            ctx.events.push(GameEvent::Sound(SoundCue::Hit));
            impact_burst(center, ctx.rng, ctx.animations, ctx.events);
            for _ in 0..2 {
                let speed = 5.0 + ctx.rng.gen::<f32>();
                ctx.events.push(GameEvent::Spark(Spark::new(center, 0.0, speed)));
            }
            return Outcome::Removed;
        }

        Outcome::Alive
    }
}
