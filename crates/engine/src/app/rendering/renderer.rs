use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture, TextureError};
use winit::window::Window;

use super::Surface;

/// Presents a fixed-size [`Surface`] in the window. The pixel buffer keeps the
/// display resolution while the surface texture tracks the window size, so the
/// frame is upscaled by `pixels`.
pub struct Renderer {
    pixels: Pixels<'static>,
    display_width: u32,
    display_height: u32,
}

impl Renderer {
    pub fn new(window: Arc<Window>, display_width: u32, display_height: u32) -> Result<Self, Error> {
        let size = window.inner_size();
        let surface_texture = SurfaceTexture::new(
            size.width.max(1),
            size.height.max(1),
            window,
        );
        let pixels = Pixels::new(display_width, display_height, surface_texture)?;
        Ok(Self {
            pixels,
            display_width,
            display_height,
        })
    }

    pub fn display_size(&self) -> (u32, u32) {
        (self.display_width, self.display_height)
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), TextureError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels.resize_surface(width, height)
    }

    pub fn present(&mut self, surface: &Surface) -> Result<(), Error> {
        let frame = self.pixels.frame_mut();
        copy_surface_into_frame(surface, frame);
        self.pixels.render()
    }
}

/// Copies as many rows as both buffers hold. A mismatch only happens while a
/// resize is in flight and is tolerated for one frame.
fn copy_surface_into_frame(surface: &Surface, frame: &mut [u8]) {
    let source = surface.pixels();
    let count = source.len().min(frame.len());
    frame[..count].copy_from_slice(&source[..count]);
}
