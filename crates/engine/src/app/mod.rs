mod geometry;
mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use geometry::{Rect, Vec2};
pub use input::InputAction;
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{Renderer, Sprite, Surface};
pub use scene::{InputSnapshot, Scene, SceneCommand};
