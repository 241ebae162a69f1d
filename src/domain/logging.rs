use derive_more::Display;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
pub enum LogLevel {
    #[display(fmt = "DEBUG")]
    Debug = 1,
    #[display(fmt = " INFO")]
    Info = 2,
    #[display(fmt = " WARN")]
    Warn = 3,
    #[display(fmt = "ERROR")]
    Error = 4,
}

/// Layer and unit a log line originates from, e.g. `APP:ChartController`.
#[derive(Debug, Clone, Display)]
pub enum LogComponent {
    #[display(fmt = "DOM:{}", _0)]
    Domain(&'static str),
    #[display(fmt = "APP:{}", _0)]
    Application(&'static str),
    #[display(fmt = "INF:{}", _0)]
    Infrastructure(&'static str),
    #[display(fmt = "PRE:{}", _0)]
    Presentation(&'static str),
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: u64,
    pub level: LogLevel,
    pub component: LogComponent,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, component: LogComponent, message: &str) -> Self {
        Self {
            timestamp: get_time_provider().current_timestamp(),
            level,
            component,
            message: message.to_string(),
        }
    }

    /// Single-line rendering used by every sink.
    pub fn render(&self) -> String {
        format!(
            "[{}] {} {} | {}",
            get_time_provider().format_timestamp(self.timestamp),
            self.level,
            self.component,
            self.message
        )
    }
}

/// Clock abstraction so domain code never touches `js_sys` directly.
pub trait TimeProvider: Send + Sync {
    /// Milliseconds since the epoch (or a monotonic counter off-browser).
    fn current_timestamp(&self) -> u64;
    fn format_timestamp(&self, timestamp: u64) -> String;
}

pub trait Logger: Send + Sync {
    fn log(&self, entry: LogEntry);

    fn debug(&self, component: LogComponent, message: &str) {
        self.log(LogEntry::new(LogLevel::Debug, component, message));
    }

    fn info(&self, component: LogComponent, message: &str) {
        self.log(LogEntry::new(LogLevel::Info, component, message));
    }

    fn warn(&self, component: LogComponent, message: &str) {
        self.log(LogEntry::new(LogLevel::Warn, component, message));
    }

    fn error(&self, component: LogComponent, message: &str) {
        self.log(LogEntry::new(LogLevel::Error, component, message));
    }
}

static GLOBAL_LOGGER: OnceLock<Box<dyn Logger>> = OnceLock::new();
static GLOBAL_TIME_PROVIDER: OnceLock<Box<dyn TimeProvider>> = OnceLock::new();

/// Installs the process-wide logger. Later calls are ignored.
pub fn init_logger(logger: Box<dyn Logger>) {
    let _ = GLOBAL_LOGGER.set(logger);
}

pub fn init_time_provider(time_provider: Box<dyn TimeProvider>) {
    let _ = GLOBAL_TIME_PROVIDER.set(time_provider);
}

pub fn get_logger() -> &'static dyn Logger {
    GLOBAL_LOGGER
        .get()
        .map(|logger| logger.as_ref())
        .unwrap_or(&NoOpLogger)
}

pub fn get_time_provider() -> &'static dyn TimeProvider {
    GLOBAL_TIME_PROVIDER
        .get()
        .map(|provider| provider.as_ref())
        .unwrap_or(&CounterTimeProvider)
}

struct NoOpLogger;

impl Logger for NoOpLogger {
    fn log(&self, _entry: LogEntry) {}
}

/// Fallback clock for native builds: a strictly increasing counter.
struct CounterTimeProvider;

impl TimeProvider for CounterTimeProvider {
    fn current_timestamp(&self) -> u64 {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        COUNTER.fetch_add(1, Ordering::SeqCst)
    }

    fn format_timestamp(&self, timestamp: u64) -> String {
        format!("{:06}", timestamp)
    }
}

#[macro_export]
macro_rules! log_debug {
    ($component:expr, $($arg:tt)*) => {{
        #[cfg(debug_assertions)]
        {
            $crate::domain::logging::Logger::debug(
                $crate::domain::logging::get_logger(),
                $component,
                &format!($($arg)*),
            );
        }
    }};
}

#[macro_export]
macro_rules! log_info {
    ($component:expr, $($arg:tt)*) => {{
        $crate::domain::logging::Logger::info(
            $crate::domain::logging::get_logger(),
            $component,
            &format!($($arg)*),
        );
    }};
}

#[macro_export]
macro_rules! log_warn {
    ($component:expr, $($arg:tt)*) => {{
        $crate::domain::logging::Logger::warn(
            $crate::domain::logging::get_logger(),
            $component,
            &format!($($arg)*),
        );
    }};
}

#[macro_export]
macro_rules! log_error {
    ($component:expr, $($arg:tt)*) => {{
        $crate::domain::logging::Logger::error(
            $crate::domain::logging::get_logger(),
            $component,
            &format!($($arg)*),
        );
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_prefixes_layer() {
        assert_eq!(LogComponent::Application("LiveFeed").to_string(), "APP:LiveFeed");
        assert_eq!(LogComponent::Infrastructure("Http").to_string(), "INF:Http");
    }

    #[test]
    fn fallback_clock_is_monotonic() {
        let a = get_time_provider().current_timestamp();
        let b = get_time_provider().current_timestamp();
        assert!(b > a);
    }

    #[test]
    fn levels_order_by_severity() {
        assert!(LogLevel::Error > LogLevel::Warn);
        assert!(LogLevel::Info > LogLevel::Debug);
    }

    #[test]
    fn macros_expand_in_expression_position() {
        const COMPONENT: LogComponent = LogComponent::Domain("Logging");
        for result in [Ok(1), Err("boom")] {
            match result {
                Ok(n) => crate::log_debug!(COMPONENT, "got {}", n),
                Err(e) => crate::log_warn!(COMPONENT, "failed: {}", e),
            }
        }
        let _unit: () = crate::log_info!(COMPONENT, "done");
        let _unit: () = crate::log_error!(COMPONENT, "done");
    }
}
