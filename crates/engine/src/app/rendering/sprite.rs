use crate::app::Vec2;

/// Decoded RGBA8 image. Pixels with alpha 0 are skipped when blitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Sprite {
    /// Returns `None` when `rgba` does not hold exactly `width * height` pixels.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return None;
        }
        Some(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..(width as usize * height as usize) {
            rgba.extend_from_slice(&color);
        }
        Self {
            width,
            height,
            rgba,
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

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let mut out = [0u8; 4];
        out.copy_from_slice(&self.rgba[offset..offset + 4]);
        Some(out)
    }

    /// Makes every pixel whose RGB equals `key` fully transparent.
    pub fn apply_color_key(&mut self, key: [u8; 3]) {
        for chunk in self.rgba.chunks_exact_mut(4) {
            if chunk[..3] == key {
                chunk[3] = 0;
            }
        }
    }

    /// Nearest-neighbor resize.
    pub fn scaled(&self, width: u32, height: u32) -> Sprite {
        if width == 0 || height == 0 || self.width == 0 || self.height == 0 {
            return Sprite::solid(width, height, [0, 0, 0, 0]);
        }
        let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
        for out_y in 0..height {
            let src_y = ((out_y as u64 * self.height as u64) / height as u64) as usize;
            let row_offset = src_y * self.width as usize * 4;
            for out_x in 0..width {
                let src_x = ((out_x as u64 * self.width as u64) / width as u64) as usize;
                let offset = row_offset + src_x * 4;
                rgba.extend_from_slice(&self.rgba[offset..offset + 4]);
            }
        }
        Sprite {
            width,
            height,
            rgba,
        }
    }

    pub(crate) fn rgba(&self) -> &[u8] {
        &self.rgba
    }
}
