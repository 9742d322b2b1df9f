use engine::{Sprite, Surface, Vec2};

/// Ticks a projectile survives without hitting anything.
pub const PROJECTILE_LIFETIME: u32 = 360;
pub const PROJECTILE_SPEED: f32 = 1.5;

/// Enemy shot travelling horizontally at a constant speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub pos: Vec2,
    pub speed: f32,
    pub age: u32,
}

impl Projectile {
    pub fn new(pos: Vec2, speed: f32) -> Self {
        Self { pos, speed, age: 0 }
    }

    pub fn advance(&mut self) {
        self.pos.x += self.speed;
        self.age += 1;
    }

    pub fn is_expired(&self) -> bool {
        self.age > PROJECTILE_LIFETIME
    }

    pub fn render(&self, surface: &mut Surface, offset: Vec2, sprite: &Sprite) {
        let half = sprite.size() * 0.5;
        surface.blit(sprite, self.pos - half - offset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projectile_expires_after_lifetime() {
        let mut projectile = Projectile::new(Vec2::ZERO, -PROJECTILE_SPEED);
        for _ in 0..PROJECTILE_LIFETIME {
            projectile.advance();
        }
        assert!(!projectile.is_expired());
        projectile.advance();
        assert!(projectile.is_expired());
        assert!((projectile.pos.x + 361.0 * PROJECTILE_SPEED).abs() < 1e-2);
    }
}
