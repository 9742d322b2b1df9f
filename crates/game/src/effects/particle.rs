use engine::{Surface, Vec2};

use crate::animation::Animation;
use crate::assets::AnimationLibrary;

const LEAF_DRIFT_FREQUENCY: f32 = 0.035;
const LEAF_DRIFT_AMPLITUDE: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    Leaf,
    Dust,
}

/// Animated particle that lives until its one-shot animation finishes.
#[derive(Debug, Clone)]
pub struct Particle {
    pub kind: ParticleKind,
    pub pos: Vec2,
    pub velocity: Vec2,
    animation: Animation,
}

impl Particle {
    pub fn new(
        kind: ParticleKind,
        pos: Vec2,
        velocity: Vec2,
        start_frame: u32,
        library: &AnimationLibrary,
    ) -> Self {
        let template = match kind {
            ParticleKind::Leaf => &library.leaf,
            ParticleKind::Dust => &library.dust,
        };
        Self {
            kind,
            pos,
            velocity,
            animation: template.starting_at(start_frame),
        }
    }

    /// Returns `false` when the particle should be removed. The check happens
    /// before the step, so a particle still moves on the tick it expires.
    pub fn update(&mut self) -> bool {
        let expired = self.animation.is_done();
        self.pos += self.velocity;
        self.animation.update();
        !expired
    }

    /// Sideways sway for falling leaves, keyed on the animation tick.
    pub fn apply_drift(&mut self) {
        if self.kind == ParticleKind::Leaf {
            let phase = self.animation.frame() as f32 * LEAF_DRIFT_FREQUENCY;
            self.pos.x += phase.sin() * LEAF_DRIFT_AMPLITUDE;
        }
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    pub fn render(&self, surface: &mut Surface, offset: Vec2) {
        let Some(image) = self.animation.image() else {
            return;
        };
        let half = Vec2::new((image.width() / 2) as f32, (image.height() / 2) as f32);
        surface.blit(image, self.pos - offset - half);
    }
}
