//! Browser implementations of the domain's platform ports.

use crate::application::use_cases::{Scheduler, TaskSpawner};
use crate::domain::logging::{LogEntry, LogLevel, Logger, TimeProvider};
use futures::future::{FutureExt, LocalBoxFuture};
use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::JsValue;

/// `console.*` sink with a minimum level.
pub struct ConsoleLogger {
    min_level: LogLevel,
}

impl ConsoleLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }

    pub fn new_production() -> Self {
        Self::new(LogLevel::Info)
    }

    pub fn new_development() -> Self {
        Self::new(LogLevel::Debug)
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, entry: LogEntry) {
        if entry.level < self.min_level {
            return;
        }
        let line = JsValue::from(entry.render());
        match entry.level {
            LogLevel::Debug => web_sys::console::debug_1(&line),
            LogLevel::Info => web_sys::console::info_1(&line),
            LogLevel::Warn => web_sys::console::warn_1(&line),
            LogLevel::Error => web_sys::console::error_1(&line),
        }
    }
}

/// Wall clock from `Date.now()`.
#[derive(Default)]
pub struct BrowserTimeProvider;

impl BrowserTimeProvider {
    pub fn new() -> Self {
        Self
    }
}

impl TimeProvider for BrowserTimeProvider {
    fn current_timestamp(&self) -> u64 {
        js_sys::Date::now() as u64
    }

    fn format_timestamp(&self, timestamp: u64) -> String {
        let date = js_sys::Date::new(&(timestamp as f64).into());
        format!(
            "{:02}:{:02}:{:02}.{:03}",
            date.get_hours(),
            date.get_minutes(),
            date.get_seconds(),
            date.get_milliseconds()
        )
    }
}

/// `setTimeout`-backed timers. The timeout is registered when `sleep` is called.
#[derive(Default)]
pub struct GlooScheduler;

impl Scheduler for GlooScheduler {
    fn sleep(&self, ms: u32) -> LocalBoxFuture<'static, ()> {
        TimeoutFuture::new(ms).boxed_local()
    }
}

/// Spawns onto the browser microtask queue.
#[derive(Default, Clone, Copy)]
pub struct WasmSpawner;

impl TaskSpawner for WasmSpawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}

/// Milliseconds from `performance.now()`, falling back to `Date.now()`.
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}
