use crate::app::Vec2;

use super::sprite::Sprite;
use super::text::{for_each_text_pixel, glyph_advance, glyph_height};

/// Software RGBA8 canvas. Every scene draws into one of these; the renderer
/// presents it scaled to the window.
///
/// All drawing is clipped to the surface bounds. Float positions are floored
/// to whole pixels.
#[derive(Debug, Clone)]
pub struct Surface {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rgba: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.rgba
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<[u8; 4]> {
        let offset = self.offset_of(x, y)?;
        let mut out = [0u8; 4];
        out.copy_from_slice(&self.rgba[offset..offset + 4]);
        Some(out)
    }

    pub fn fill(&mut self, color: [u8; 4]) {
        for chunk in self.rgba.chunks_exact_mut(4) {
            chunk.copy_from_slice(&color);
        }
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: [u8; 4]) {
        let start_x = x.max(0);
        let start_y = y.max(0);
        let end_x = x.saturating_add(w).min(self.width as i32);
        let end_y = y.saturating_add(h).min(self.height as i32);
        for py in start_y..end_y {
            for px in start_x..end_x {
                self.write_pixel(px, py, color);
            }
        }
    }

    pub fn blit(&mut self, sprite: &Sprite, position: Vec2) {
        self.blit_ex(sprite, position, false);
    }

    /// Draws `sprite` with its top-left corner at `position`, mirrored
    /// horizontally when `flip_x` is set.
    pub fn blit_ex(&mut self, sprite: &Sprite, position: Vec2, flip_x: bool) {
        let left = position.x.floor() as i32;
        let top = position.y.floor() as i32;
        let sprite_w = sprite.width() as i32;
        let sprite_h = sprite.height() as i32;

        let draw_left = left.max(0);
        let draw_top = top.max(0);
        let draw_right = left.saturating_add(sprite_w).min(self.width as i32);
        let draw_bottom = top.saturating_add(sprite_h).min(self.height as i32);
        if draw_left >= draw_right || draw_top >= draw_bottom {
            return;
        }

        let src = sprite.rgba();
        for out_y in draw_top..draw_bottom {
            let src_y = (out_y - top) as usize;
            for out_x in draw_left..draw_right {
                let dx = out_x - left;
                let src_x = if flip_x { sprite_w - 1 - dx } else { dx } as usize;
                let src_offset = (src_y * sprite_w as usize + src_x) * 4;
                if src[src_offset + 3] == 0 {
                    continue;
                }
                let mut color = [0u8; 4];
                color.copy_from_slice(&src[src_offset..src_offset + 4]);
                self.write_pixel(out_x, out_y, color);
            }
        }
    }

    /// Blits with both coordinates wrapped into
    /// `[-sprite_size, surface_size)` so a drifting sprite re-enters from the
    /// opposite edge.
    pub fn blit_wrapped(&mut self, sprite: &Sprite, position: Vec2) {
        let sprite_size = sprite.size();
        let span_x = self.width as f32 + sprite_size.x;
        let span_y = self.height as f32 + sprite_size.y;
        if span_x <= 0.0 || span_y <= 0.0 {
            return;
        }
        let wrapped = Vec2::new(
            position.x.rem_euclid(span_x) - sprite_size.x,
            position.y.rem_euclid(span_y) - sprite_size.y,
        );
        self.blit(sprite, wrapped);
    }

    /// Scanline fill of a simple polygon, sampling at pixel centers.
    pub fn fill_polygon(&mut self, points: &[Vec2], color: [u8; 4]) {
        if points.len() < 3 {
            return;
        }
        let min_y = points.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        let max_y = points.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
        let row_start = (min_y.floor() as i32).max(0);
        let row_end = (max_y.ceil() as i32).min(self.height as i32);

        let mut crossings: Vec<f32> = Vec::with_capacity(points.len());
        for row in row_start..row_end {
            let sample_y = row as f32 + 0.5;
            crossings.clear();
            for (index, a) in points.iter().enumerate() {
                let b = points[(index + 1) % points.len()];
                let (lo, hi) = if a.y <= b.y { (*a, b) } else { (b, *a) };
                if sample_y < lo.y || sample_y >= hi.y {
                    continue;
                }
                let t = (sample_y - lo.y) / (hi.y - lo.y);
                crossings.push(lo.x + t * (hi.x - lo.x));
            }
            crossings.sort_by(|a, b| a.total_cmp(b));
            for pair in crossings.chunks_exact(2) {
                let span_start = (pair[0] - 0.5).ceil() as i32;
                let span_end = (pair[1] - 0.5).floor() as i32;
                for x in span_start.max(0)..=span_end.min(self.width as i32 - 1) {
                    self.write_pixel(x, row, color);
                }
            }
        }
    }

    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: [u8; 4]) {
        if radius <= 0.0 {
            return;
        }
        let radius_sq = radius * radius;
        let start_y = ((center.y - radius).floor() as i32).max(0);
        let end_y = ((center.y + radius).ceil() as i32).min(self.height as i32);
        let start_x = ((center.x - radius).floor() as i32).max(0);
        let end_x = ((center.x + radius).ceil() as i32).min(self.width as i32);
        for y in start_y..end_y {
            for x in start_x..end_x {
                let dx = x as f32 + 0.5 - center.x;
                let dy = y as f32 + 0.5 - center.y;
                if dx * dx + dy * dy <= radius_sq {
                    self.write_pixel(x, y, color);
                }
            }
        }
    }

    /// Paints every pixel outside the circle. A non-positive radius covers the
    /// whole surface.
    pub fn cover_outside_circle(&mut self, center: Vec2, radius: f32, color: [u8; 4]) {
        if radius <= 0.0 {
            self.fill(color);
            return;
        }
        let radius_sq = radius * radius;
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let dx = x as f32 + 0.5 - center.x;
                let dy = y as f32 + 0.5 - center.y;
                if dx * dx + dy * dy > radius_sq {
                    self.write_pixel(x, y, color);
                }
            }
        }
    }

    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, scale: i32, color: [u8; 4]) {
        let mut lit = Vec::new();
        for_each_text_pixel(x, y, text, scale, |px, py| lit.push((px, py)));
        for (px, py) in lit {
            self.write_pixel(px, py, color);
        }
    }

    pub fn text_size(text: &str, scale: i32) -> (i32, i32) {
        let scale = scale.max(1);
        let chars = text.chars().count() as i32;
        (chars * glyph_advance(scale), glyph_height(scale))
    }

    fn offset_of(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 4)
    }

    fn write_pixel(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if let Some(offset) = self.offset_of(x, y) {
            self.rgba[offset..offset + 4].copy_from_slice(&color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLACK: [u8; 4] = [0, 0, 0, 255];

    #[test]
    fn blit_is_clipped_at_edges() {
        let mut surface = Surface::new(4, 4);
        surface.blit(&Sprite::solid(3, 3, RED), Vec2::new(-1.0, 2.0));
        assert_eq!(surface.pixel(0, 2), Some(RED));
        assert_eq!(surface.pixel(1, 3), Some(RED));
        assert_eq!(surface.pixel(2, 2), Some([0, 0, 0, 0]));
    }

    #[test]
    fn blit_skips_transparent_pixels() {
        let mut surface = Surface::new(2, 1);
        surface.fill(BLACK);
        let sprite = Sprite::from_rgba(2, 1, vec![255, 0, 0, 0, 0, 255, 0, 255]).expect("sprite");
        surface.blit(&sprite, Vec2::ZERO);
        assert_eq!(surface.pixel(0, 0), Some(BLACK));
        assert_eq!(surface.pixel(1, 0), Some([0, 255, 0, 255]));
    }

    #[test]
    fn flipped_blit_mirrors_columns() {
        let mut surface = Surface::new(2, 1);
        let sprite = Sprite::from_rgba(2, 1, vec![1, 0, 0, 255, 2, 0, 0, 255]).expect("sprite");
        surface.blit_ex(&sprite, Vec2::ZERO, true);
        assert_eq!(surface.pixel(0, 0), Some([2, 0, 0, 255]));
        assert_eq!(surface.pixel(1, 0), Some([1, 0, 0, 255]));
    }

    #[test]
    fn wrapped_blit_reenters_from_left() {
        let mut surface = Surface::new(10, 10);
        // span is 10 + 2 = 12; x = 13 wraps to 1 - 2 = -1
        surface.blit_wrapped(&Sprite::solid(2, 2, RED), Vec2::new(13.0, 2.0));
        assert_eq!(surface.pixel(0, 0), Some(RED));
        assert_eq!(surface.pixel(1, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn polygon_fill_covers_interior() {
        let mut surface = Surface::new(8, 8);
        let square = [
            Vec2::new(1.0, 1.0),
            Vec2::new(5.0, 1.0),
            Vec2::new(5.0, 5.0),
            Vec2::new(1.0, 5.0),
        ];
        surface.fill_polygon(&square, RED);
        assert_eq!(surface.pixel(3, 3), Some(RED));
        assert_eq!(surface.pixel(1, 1), Some(RED));
        assert_eq!(surface.pixel(5, 5), Some([0, 0, 0, 0]));
        assert_eq!(surface.pixel(0, 3), Some([0, 0, 0, 0]));
    }

    #[test]
    fn cover_outside_circle_keeps_center_clear() {
        let mut surface = Surface::new(20, 20);
        surface.cover_outside_circle(Vec2::new(10.0, 10.0), 5.0, BLACK);
        assert_eq!(surface.pixel(10, 10), Some([0, 0, 0, 0]));
        assert_eq!(surface.pixel(0, 0), Some(BLACK));
    }

    #[test]
    fn cover_outside_zero_radius_covers_everything() {
        let mut surface = Surface::new(4, 4);
        surface.cover_outside_circle(Vec2::new(2.0, 2.0), 0.0, BLACK);
        assert_eq!(surface.pixel(2, 2), Some(BLACK));
    }

    #[test]
    fn text_size_scales_with_length() {
        assert_eq!(Surface::text_size("ab", 2), (16, 10));
    }
}
