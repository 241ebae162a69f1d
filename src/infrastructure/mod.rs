pub mod dto;
pub mod http;
pub mod rendering;
pub mod services;

pub use http::SeriesHttpClient;
pub use services::{BrowserTimeProvider, ConsoleLogger, GlooScheduler, WasmSpawner};
