use wasm_bindgen::prelude::*;

pub mod app;
pub mod application;
pub mod domain;
pub mod event_utils;
pub mod global_state;
pub mod infrastructure;
pub mod macros;
pub mod presentation;
pub mod view_state;

pub use presentation::PriceChart;

/// Installs the panic hook, console logger and browser clock.
#[wasm_bindgen(start)]
pub fn initialize() {
    console_error_panic_hook::set_once();
    let logger = if cfg!(debug_assertions) {
        infrastructure::services::ConsoleLogger::new_development()
    } else {
        infrastructure::services::ConsoleLogger::new_production()
    };
    domain::logging::init_logger(Box::new(logger));
    domain::logging::init_time_provider(Box::new(
        infrastructure::services::BrowserTimeProvider::new(),
    ));
    log_info!(
        domain::logging::LogComponent::Presentation("Initialize"),
        "Chart engine initialized"
    );
}

/// Mounts the LIVE badge and indicator legend under `<body>`.
#[wasm_bindgen(js_name = mountStatusBar)]
pub fn mount_status_bar() {
    app::mount_status_bar();
}
