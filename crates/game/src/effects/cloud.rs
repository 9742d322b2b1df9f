use engine::{Sprite, Surface, Vec2};
use rand::Rng;

const SPAWN_RANGE: f64 = 999_999.0;

/// Parallax cloud. Coordinates are `f64` because clouds spawn far from the
/// origin and drift by fractions of a pixel per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cloud {
    x: f64,
    y: f64,
    sprite: usize,
    speed: f64,
    depth: f64,
}

impl Cloud {
    pub fn depth(&self) -> f64 {
        self.depth
    }

    fn render(&self, surface: &mut Surface, offset: Vec2, sprite: &Sprite) {
        let span_x = f64::from(surface.width() + sprite.width());
        let span_y = f64::from(surface.height() + sprite.height());
        let x = self.x - f64::from(offset.x) * self.depth;
        let y = self.y - f64::from(offset.y) * self.depth;
        // Reduce in f64 first; blit_wrapped then applies the same modulus.
        let at = Vec2::new(x.rem_euclid(span_x) as f32, y.rem_euclid(span_y) as f32);
        surface.blit_wrapped(sprite, at);
    }
}

/// Depth-sorted cloud layer, far clouds first.
#[derive(Debug, Clone, Default)]
pub struct Clouds {
    clouds: Vec<Cloud>,
}

impl Clouds {
    pub fn new(count: usize, sprite_count: usize, rng: &mut impl Rng) -> Self {
        let mut clouds: Vec<Cloud> = (0..count)
            .map(|_| {
                let x = rng.gen::<f64>() * SPAWN_RANGE;
                let y = rng.gen::<f64>() * SPAWN_RANGE;
                let sprite = if sprite_count == 0 {
                    0
                } else {
                    rng.gen_range(0..sprite_count)
                };
                let speed = rng.gen::<f64>() * 0.05 + 0.05;
                let depth = rng.gen::<f64>() * 0.6 + 0.2;
                Cloud {
                    x,
                    y,
                    sprite,
                    speed,
                    depth,
                }
            })
            .collect();
        clouds.sort_by(|a, b| a.depth.total_cmp(&b.depth));
        Self { clouds }
    }

    pub fn clouds(&self) -> &[Cloud] {
        &self.clouds
    }

    pub fn update(&mut self) {
        for cloud in &mut self.clouds {
            cloud.x += cloud.speed;
        }
    }

    pub fn render(&self, surface: &mut Surface, offset: Vec2, sprites: &[Sprite]) {
        for cloud in &self.clouds {
            if let Some(sprite) = sprites.get(cloud.sprite) {
                cloud.render(surface, offset, sprite);
            }
        }
    }
}
