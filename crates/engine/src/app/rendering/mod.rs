mod renderer;
mod sprite;
mod surface;
mod text;

pub use renderer::Renderer;
pub use sprite::Sprite;
pub use surface::Surface;
