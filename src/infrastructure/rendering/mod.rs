pub mod canvas_renderer;
pub mod headless;

pub use canvas_renderer::CanvasBackend;
pub use headless::{BackendCall, HeadlessBackend, Journal};
