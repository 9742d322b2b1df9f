use crate::audio::SoundCue;
use crate::effects::{Particle, Projectile, Spark};

/// Side effects produced while an actor updates. The session applies them
/// right after the actor that raised them, in order.
#[derive(Debug, Clone)]
pub enum GameEvent {
    Sound(SoundCue),
    Spark(Spark),
    Particle(Particle),
    Projectile(Projectile),
    /// The player has been airborne too long this tick.
    PlayerFell,
}
