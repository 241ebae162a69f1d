pub use super::value_objects::{OHLCV, Price, Timestamp, Volume};
use crate::domain::errors::DataError;
use crate::domain::market_data::services::validate_snapshot;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: Timestamp,
    pub ohlcv: OHLCV,
}

impl Candle {
    pub fn new(timestamp: Timestamp, ohlcv: OHLCV) -> Self {
        Self { timestamp, ohlcv }
    }

    pub fn close(&self) -> f64 {
        self.ohlcv.close.value()
    }

    pub fn is_bullish(&self) -> bool {
        self.ohlcv.is_bullish()
    }
}

/// Candle history for the active (symbol, timeframe).
///
/// Every refresh is a full snapshot. A rejected snapshot leaves the previous one in place so
/// the chart never blanks on a bad tick.
#[derive(Debug, Default)]
pub struct TimeSeriesStore {
    candles: Rc<[Candle]>,
    version: u64,
}

impl TimeSeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, candles: Vec<Candle>) -> Result<(), DataError> {
        validate_snapshot(&candles)?;
        self.candles = candles.into();
        self.version += 1;
        Ok(())
    }

    /// Shared view of the current snapshot. Cheap to clone.
    pub fn current(&self) -> Rc<[Candle]> {
        Rc::clone(&self.candles)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(Candle::close).collect()
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Bumped on every accepted replace and on invalidation.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Drops the snapshot after a symbol or timeframe change.
    pub fn invalidate(&mut self) {
        self.candles = Rc::from(Vec::new());
        self.version += 1;
    }
}
