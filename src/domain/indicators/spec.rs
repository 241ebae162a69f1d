use crate::domain::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{EnumIter, EnumString, IntoStaticStr};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum IndicatorKind {
    #[strum(serialize = "SMA")]
    #[serde(rename = "SMA")]
    Sma,
    #[strum(serialize = "EMA")]
    #[serde(rename = "EMA")]
    Ema,
    #[strum(serialize = "RSI")]
    #[serde(rename = "RSI")]
    Rsi,
    #[strum(serialize = "MACD")]
    #[serde(rename = "MACD")]
    Macd,
    #[strum(serialize = "StochRSI")]
    #[serde(rename = "StochRSI")]
    StochRsi,
}

impl IndicatorKind {
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        name.parse()
            .map_err(|_| ConfigError::UnknownKind(name.to_string()))
    }

    pub fn param_count(self) -> usize {
        match self {
            Self::Sma | Self::Ema | Self::Rsi => 1,
            Self::Macd => 3,
            Self::StochRsi => 2,
        }
    }

    /// Names of the output lines, in output order.
    pub fn line_names(self) -> &'static [&'static str] {
        match self {
            Self::Sma => &["sma"],
            Self::Ema => &["ema"],
            Self::Rsi => &["rsi"],
            Self::Macd => &["macd", "signal", "histogram"],
            Self::StochRsi => &["k", "d"],
        }
    }

    /// Number of rendered series an instance of this kind owns.
    pub fn series_count(self) -> usize {
        self.line_names().len()
    }

    /// Overlays share the price scale; everything else gets its own pane.
    pub fn is_overlay(self) -> bool {
        matches!(self, Self::Sma | Self::Ema)
    }
}

/// Validated, immutable indicator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct IndicatorSpec {
    kind: IndicatorKind,
    params: Vec<u32>,
}

impl IndicatorSpec {
    pub fn new(kind: IndicatorKind, params: &[u32]) -> Result<Self, ConfigError> {
        if params.len() != kind.param_count() {
            return Err(ConfigError::WrongParamCount {
                kind,
                expected: kind.param_count(),
                got: params.len(),
            });
        }
        if let Some(position) = params.iter().position(|&p| p == 0) {
            return Err(ConfigError::NonPositiveParam { kind, position });
        }
        if kind == IndicatorKind::Macd && params[0] >= params[1] {
            return Err(ConfigError::FastNotBelowSlow {
                fast: params[0],
                slow: params[1],
            });
        }
        Ok(Self {
            kind,
            params: params.to_vec(),
        })
    }

    /// Parameters the dashboard backend uses when none are given.
    pub fn default_for(kind: IndicatorKind) -> Self {
        let params: &[u32] = match kind {
            IndicatorKind::Sma | IndicatorKind::Ema => &[20],
            IndicatorKind::Rsi => &[14],
            IndicatorKind::Macd => &[12, 26, 9],
            IndicatorKind::StochRsi => &[14, 14],
        };
        Self {
            kind,
            params: params.to_vec(),
        }
    }

    pub fn kind(&self) -> IndicatorKind {
        self.kind
    }

    pub fn params(&self) -> &[u32] {
        &self.params
    }

    /// Leading samples consumed before the first output value.
    pub fn warm_up(&self) -> usize {
        let p: Vec<usize> = self.params.iter().map(|&v| v as usize).collect();
        match self.kind {
            IndicatorKind::Sma | IndicatorKind::Ema => p[0] - 1,
            IndicatorKind::Rsi => p[0],
            IndicatorKind::Macd => p[1] + p[2] - 2,
            IndicatorKind::StochRsi => p[0] + p[1] - 1 + 2 * (STOCH_SMOOTHING - 1),
        }
    }

    pub fn label(&self) -> String {
        self.to_string()
    }
}

/// Fixed %K / %D smoothing window of the stochastic RSI.
pub const STOCH_SMOOTHING: usize = 3;

impl fmt::Display for IndicatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params.iter().map(u32::to_string).collect();
        write!(f, "{}({})", self.kind, params.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macd_requires_fast_below_slow() {
        assert_eq!(
            IndicatorSpec::new(IndicatorKind::Macd, &[26, 12, 9]),
            Err(ConfigError::FastNotBelowSlow { fast: 26, slow: 12 })
        );
        assert!(IndicatorSpec::new(IndicatorKind::Macd, &[12, 12, 9]).is_err());
    }

    #[test]
    fn zero_period_is_rejected() {
        assert_eq!(
            IndicatorSpec::new(IndicatorKind::StochRsi, &[14, 0]),
            Err(ConfigError::NonPositiveParam {
                kind: IndicatorKind::StochRsi,
                position: 1
            })
        );
    }

    #[test]
    fn param_count_is_enforced() {
        assert!(matches!(
            IndicatorSpec::new(IndicatorKind::Rsi, &[14, 3]),
            Err(ConfigError::WrongParamCount { expected: 1, got: 2, .. })
        ));
    }

    #[test]
    fn warm_up_per_kind() {
        let w = |kind, params: &[u32]| IndicatorSpec::new(kind, params).unwrap().warm_up();
        assert_eq!(w(IndicatorKind::Sma, &[3]), 2);
        assert_eq!(w(IndicatorKind::Ema, &[9]), 8);
        assert_eq!(w(IndicatorKind::Rsi, &[14]), 14);
        assert_eq!(w(IndicatorKind::Macd, &[12, 26, 9]), 33);
        assert_eq!(w(IndicatorKind::StochRsi, &[14, 14]), 31);
    }

    #[test]
    fn kind_names_parse_case_insensitively() {
        assert_eq!(IndicatorKind::parse("stochrsi").unwrap(), IndicatorKind::StochRsi);
        assert_eq!(IndicatorKind::parse("macd").unwrap(), IndicatorKind::Macd);
        assert!(IndicatorKind::parse("bollinger").is_err());
    }
}
