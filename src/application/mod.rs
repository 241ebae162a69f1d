pub mod chart_controller;
pub mod config;
pub mod live_feed;
pub mod render_surface;
pub mod resize;
pub mod use_cases;

pub use chart_controller::{ApplyOutcome, BackendFactory, ChartController};
pub use config::ChartConfig;
pub use live_feed::{FetchOutcome, FetchTicket, LiveFeed};
pub use render_surface::{RenderSurface, ResizeMailbox};
pub use resize::ResizeDebouncer;
pub use use_cases::{LiveSession, Scheduler, TaskSpawner};
