use crate::domain::errors::DataError;
use crate::domain::market_data::Candle;

/// Checks a full candle snapshot before it may replace the store contents.
///
/// A snapshot is accepted only if it is non-empty, every OHLCV field is finite, and candle
/// times are strictly increasing (ascending and unique).
pub fn validate_snapshot(candles: &[Candle]) -> Result<(), DataError> {
    if candles.is_empty() {
        return Err(DataError::Empty);
    }

    for (index, candle) in candles.iter().enumerate() {
        if !candle.ohlcv.is_finite() {
            return Err(DataError::NonFinite { index });
        }
    }

    for (index, pair) in candles.windows(2).enumerate() {
        let (previous, current) = (pair[0].timestamp.value(), pair[1].timestamp.value());
        if current <= previous {
            return Err(DataError::NonIncreasingTime {
                index: index + 1,
                previous,
                current,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market_data::{OHLCV, Price, Timestamp, Volume};

    fn candle(t: u64, close: f64) -> Candle {
        Candle::new(
            Timestamp::from_millis(t),
            OHLCV::new(
                Price::from(close),
                Price::from(close),
                Price::from(close),
                Price::from(close),
                Volume::from(1.0),
            ),
        )
    }

    #[test]
    fn duplicate_time_is_rejected() {
        let snapshot = vec![candle(1, 1.0), candle(2, 1.0), candle(2, 1.0)];
        assert_eq!(
            validate_snapshot(&snapshot),
            Err(DataError::NonIncreasingTime { index: 2, previous: 2, current: 2 })
        );
    }

    #[test]
    fn nan_close_is_rejected() {
        let snapshot = vec![candle(1, 1.0), candle(2, f64::NAN)];
        assert_eq!(validate_snapshot(&snapshot), Err(DataError::NonFinite { index: 1 }));
    }

    #[test]
    fn ordered_snapshot_passes() {
        let snapshot: Vec<Candle> = (0..5).map(|i| candle(i * 60_000, 10.0)).collect();
        assert!(validate_snapshot(&snapshot).is_ok());
    }
}
