//! Short-lived visual and gameplay populations owned by the session.

mod cloud;
mod particle;
mod projectile;
mod spark;

use std::f32::consts::{PI, TAU};

use engine::Vec2;
use rand::Rng;

pub use cloud::{Cloud, Clouds};
pub use particle::{Particle, ParticleKind};
pub use projectile::{Projectile, PROJECTILE_LIFETIME, PROJECTILE_SPEED};
pub use spark::Spark;

use crate::assets::AnimationLibrary;
use crate::events::GameEvent;

const IMPACT_PIECES: usize = 30;
/// Dust particles start somewhere in their first frames so bursts look uneven.
pub(crate) const DUST_START_FRAMES: std::ops::RangeInclusive<u32> = 0..=7;

/// Radial spark and dust explosion used for kills and player hits.
pub(crate) fn impact_burst(
    center: Vec2,
    rng: &mut impl Rng,
    library: &AnimationLibrary,
    events: &mut Vec<GameEvent>,
) {
    for _ in 0..IMPACT_PIECES {
        let angle = rng.gen::<f32>() * TAU;
        let speed = rng.gen::<f32>() * 5.0;
        events.push(GameEvent::Spark(Spark::new(
            center,
            angle,
            2.0 + rng.gen::<f32>(),
        )));
        events.push(GameEvent::Particle(Particle::new(
            ParticleKind::Dust,
            center,
            Vec2::from_angle(angle + PI, speed * 0.5),
            rng.gen_range(DUST_START_FRAMES),
            library,
        )));
    }
}

/// Four sparks fanned around `heading`, used at muzzles and wall hits.
pub(crate) fn spark_fan(center: Vec2, heading: f32, rng: &mut impl Rng, events: &mut Vec<GameEvent>) {
    for _ in 0..4 {
        let angle = rng.gen::<f32>() - 0.5 + heading;
        events.push(GameEvent::Spark(Spark::new(center, angle, 2.0 + rng.gen::<f32>())));
    }
}
