use crate::domain::errors::ConfigError;
use derive_more::{Constructor, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use strum::{AsRefStr, Display as StrumDisplay, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, From, Into, Deref, Constructor, Serialize, Deserialize)]
pub struct Price(f64);

impl Price {
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl PartialOrd for Price {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, From, Into, Deref, Constructor, Serialize, Deserialize)]
pub struct Volume(f64);

impl Volume {
    pub fn value(&self) -> f64 {
        self.0
    }
}

/// Bucket open time in milliseconds since the epoch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into, Deref, Serialize, Deserialize,
)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn from_millis(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Constructor, Serialize, Deserialize)]
pub struct OHLCV {
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: Volume,
}

impl OHLCV {
    pub fn is_finite(&self) -> bool {
        [
            self.open.value(),
            self.high.value(),
            self.low.value(),
            self.close.value(),
            self.volume.value(),
        ]
        .iter()
        .all(|v| v.is_finite())
    }

    /// Up candles (close at or above open) are drawn green.
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }
}

/// Upper-cased ticker, never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[display(fmt = "{}", _0)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(symbol: &str) -> Result<Self, ConfigError> {
        let trimmed = symbol.trim();
        if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidSymbol(symbol.to_string()));
        }
        Ok(Self(trimmed.to_uppercase()))
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

/// Candle bucket sizes served by the market-data backend.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    StrumDisplay,
    EnumIter,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
pub enum Timeframe {
    #[strum(serialize = "5m")]
    #[serde(rename = "5m")]
    FiveMinutes,
    #[strum(serialize = "15m")]
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[strum(serialize = "30m")]
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[strum(serialize = "1h")]
    #[serde(rename = "1h")]
    OneHour,
    #[strum(serialize = "4h")]
    #[serde(rename = "4h")]
    FourHours,
    #[strum(serialize = "1d")]
    #[serde(rename = "1d")]
    OneDay,
    #[strum(serialize = "1w")]
    #[serde(rename = "1w")]
    OneWeek,
    #[strum(serialize = "1mo")]
    #[serde(rename = "1mo")]
    OneMonth,
}

impl Timeframe {
    /// Parses the wire form (`"1h"`, `"1d"`, ...).
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        value
            .parse()
            .map_err(|_| ConfigError::UnknownTimeframe(value.to_string()))
    }

    pub fn as_query(&self) -> &str {
        self.as_ref()
    }

    pub fn duration_ms(&self) -> u64 {
        const MINUTE: u64 = 60 * 1000;
        match self {
            Self::FiveMinutes => 5 * MINUTE,
            Self::FifteenMinutes => 15 * MINUTE,
            Self::ThirtyMinutes => 30 * MINUTE,
            Self::OneHour => 60 * MINUTE,
            Self::FourHours => 4 * 60 * MINUTE,
            Self::OneDay => 24 * 60 * MINUTE,
            Self::OneWeek => 7 * 24 * 60 * MINUTE,
            Self::OneMonth => 30 * 24 * 60 * MINUTE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn symbol_is_normalized() {
        assert_eq!(Symbol::new(" aapl ").unwrap().value(), "AAPL");
        assert!(Symbol::new("").is_err());
        assert!(Symbol::new("BR K").is_err());
    }

    #[test]
    fn timeframe_wire_forms_round_trip() {
        for tf in Timeframe::iter() {
            assert_eq!(Timeframe::parse(tf.as_query()).unwrap(), tf);
        }
        assert_eq!(
            Timeframe::parse("2h"),
            Err(ConfigError::UnknownTimeframe("2h".into()))
        );
    }
}
