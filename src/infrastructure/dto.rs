use crate::domain::errors::FeedError;
use crate::domain::market_data::{Candle, OHLCV, Price, Timestamp, Volume};
use serde::Deserialize;

/// Wire form of one candle from `GET /series`.
#[derive(Debug, Clone, Deserialize)]
pub struct CandleDto {
    pub time: u64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl From<CandleDto> for Candle {
    fn from(dto: CandleDto) -> Self {
        Candle::new(
            Timestamp::from_millis(dto.time),
            OHLCV::new(
                Price::from(dto.open),
                Price::from(dto.high),
                Price::from(dto.low),
                Price::from(dto.close),
                Volume::from(dto.volume),
            ),
        )
    }
}

/// Parses a response body. Ordering is checked later by the store, not here.
pub fn parse_series(body: &str) -> Result<Vec<Candle>, FeedError> {
    let dtos: Vec<CandleDto> =
        serde_json::from_str(body).map_err(|e| FeedError::Malformed(e.to_string()))?;
    Ok(dtos.into_iter().map(Candle::from).collect())
}
