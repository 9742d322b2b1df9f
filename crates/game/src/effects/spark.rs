use std::f32::consts::{FRAC_PI_2, PI};

use engine::{Surface, Vec2};

const SPARK_COLOR: [u8; 4] = [255, 255, 255, 255];
const SPEED_DECAY: f32 = 0.1;

/// A short white streak that slows down along a fixed heading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spark {
    pub pos: Vec2,
    pub angle: f32,
    pub speed: f32,
}

impl Spark {
    pub fn new(pos: Vec2, angle: f32, speed: f32) -> Self {
        Self { pos, angle, speed }
    }

    /// Moves one step and slows. Returns `false` once the spark has stopped.
    pub fn update(&mut self) -> bool {
        self.pos += Vec2::from_angle(self.angle, self.speed);
        self.speed = (self.speed - SPEED_DECAY).max(0.0);
        self.speed != 0.0
    }

    pub fn render(&self, surface: &mut Surface, offset: Vec2) {
        let at = self.pos - offset;
        let points = [
            at + Vec2::from_angle(self.angle, self.speed * 3.0),
            at + Vec2::from_angle(self.angle + FRAC_PI_2, self.speed * 0.5),
            at + Vec2::from_angle(self.angle + PI, self.speed * 3.0),
            at + Vec2::from_angle(self.angle - FRAC_PI_2, self.speed * 0.5),
        ];
        surface.fill_polygon(&points, SPARK_COLOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spark_moves_along_heading_and_slows() {
        let mut spark = Spark::new(Vec2::new(10.0, 10.0), 0.0, 2.0);
        assert!(spark.update());
        assert!((spark.pos.x - 12.0).abs() < 1e-5);
        assert!((spark.pos.y - 10.0).abs() < 1e-5);
        assert!((spark.speed - 1.9).abs() < 1e-5);
    }

    #[test]
    fn spark_dies_when_speed_reaches_zero() {
        let mut spark = Spark::new(Vec2::ZERO, 1.0, 0.25);
        assert!(spark.update());
        assert!(spark.update());
        assert!(!spark.update());
        assert_eq!(spark.speed, 0.0);
    }

    #[test]
    fn render_draws_white_streak_at_position() {
        let mut surface = Surface::new(32, 32);
        let spark = Spark::new(Vec2::new(16.0, 16.0), 0.0, 3.0);
        spark.render(&mut surface, Vec2::ZERO);
        assert_eq!(surface.pixel(16, 16), Some(SPARK_COLOR));
        assert_eq!(surface.pixel(2, 2), Some([0, 0, 0, 0]));
    }
}
