//! Error taxonomy of the chart engine.
//!
//! Every category is recoverable: data errors keep the last snapshot, config errors are
//! returned to the caller, compute errors flag a single indicator, feed errors are retried on
//! the next tick, and render errors are logged.

use crate::domain::indicators::IndicatorKind;
use derive_more::{Display, From};

/// Malformed candle snapshot.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum DataError {
    #[display(fmt = "empty candle snapshot")]
    Empty,
    #[display(
        fmt = "time not increasing at index {}: {} after {}",
        index,
        current,
        previous
    )]
    NonIncreasingTime { index: usize, previous: u64, current: u64 },
    #[display(fmt = "non-finite OHLCV value at index {}", index)]
    NonFinite { index: usize },
}

impl std::error::Error for DataError {}

/// Rejected user or host configuration. Raised before any state changes.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum ConfigError {
    #[display(fmt = "{} expects {} parameter(s), got {}", kind, expected, got)]
    WrongParamCount {
        kind: IndicatorKind,
        expected: usize,
        got: usize,
    },
    #[display(fmt = "{} parameter #{} must be positive", kind, position)]
    NonPositiveParam { kind: IndicatorKind, position: usize },
    #[display(fmt = "MACD fast period {} must be below slow period {}", fast, slow)]
    FastNotBelowSlow { fast: u32, slow: u32 },
    #[display(fmt = "unknown indicator kind '{}'", _0)]
    UnknownKind(String),
    #[display(fmt = "unknown timeframe '{}'", _0)]
    UnknownTimeframe(String),
    #[display(fmt = "invalid symbol '{}'", _0)]
    InvalidSymbol(String),
    #[display(fmt = "invalid setting: {}", _0)]
    InvalidSetting(String),
}

impl std::error::Error for ConfigError {}

/// A strategy produced a value the renderer cannot plot.
#[derive(Debug, Clone, PartialEq, Display)]
#[display(fmt = "{} line '{}' is not finite at {}", kind, line, index)]
pub struct ComputeError {
    pub kind: IndicatorKind,
    pub line: &'static str,
    pub index: usize,
}

impl std::error::Error for ComputeError {}

/// Market-data fetch failure. Always retried on the next tick.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum FeedError {
    #[display(fmt = "HTTP {}", status)]
    Http { status: u16 },
    #[display(fmt = "transport failure: {}", _0)]
    Transport(String),
    #[display(fmt = "malformed body: {}", _0)]
    Malformed(String),
    #[display(fmt = "no response after {} ms", after_ms)]
    Timeout { after_ms: u32 },
}

impl std::error::Error for FeedError {}

#[derive(Debug, Clone, PartialEq, Display)]
pub enum RenderError {
    #[display(fmt = "render surface already disposed")]
    SurfaceDisposed,
    #[display(fmt = "backend failure: {}", _0)]
    Backend(String),
}

impl std::error::Error for RenderError {}

/// Umbrella error for the public API boundary.
#[derive(Debug, Clone, PartialEq, Display, From)]
pub enum EngineError {
    #[display(fmt = "data: {}", _0)]
    Data(DataError),
    #[display(fmt = "config: {}", _0)]
    Config(ConfigError),
    #[display(fmt = "compute: {}", _0)]
    Compute(ComputeError),
    #[display(fmt = "feed: {}", _0)]
    Feed(FeedError),
    #[display(fmt = "render: {}", _0)]
    Render(RenderError),
}

impl std::error::Error for EngineError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let err = ConfigError::FastNotBelowSlow { fast: 26, slow: 12 };
        assert_eq!(err.to_string(), "MACD fast period 26 must be below slow period 12");

        let err = DataError::NonIncreasingTime { index: 3, previous: 20, current: 10 };
        assert_eq!(err.to_string(), "time not increasing at index 3: 10 after 20");
    }

    #[test]
    fn engine_error_wraps_categories() {
        let err: EngineError = FeedError::Http { status: 503 }.into();
        assert_eq!(err.to_string(), "feed: HTTP 503");
    }
}
