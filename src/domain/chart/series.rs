use super::value_objects::{Color, PriceScaleId, ScaleRegion, SeriesId, SurfaceSize};
use crate::domain::errors::RenderError;
use crate::domain::indicators::{IndicatorKind, TimePoint};
use crate::domain::market_data::{Candle, Timestamp};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    Candlestick,
    Histogram,
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStyle {
    pub kind: SeriesKind,
    pub scale: PriceScaleId,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBar {
    pub time: Timestamp,
    pub value: f64,
    pub color: Color,
}

/// Payload written into a series. Always a full replacement.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesData {
    Candles(Rc<[Candle]>),
    Bars(Vec<HistogramBar>),
    Points(Vec<TimePoint>),
}

impl SeriesData {
    pub fn len(&self) -> usize {
        match self {
            Self::Candles(c) => c.len(),
            Self::Bars(b) => b.len(),
            Self::Points(p) => p.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Drawing port the render surface drives.
///
/// Handles are plain ids chosen by the caller. A backend never invents or frees one on its own.
pub trait RenderBackend {
    fn create_series(&mut self, id: SeriesId, style: SeriesStyle) -> Result<(), RenderError>;
    fn set_data(&mut self, id: SeriesId, data: SeriesData) -> Result<(), RenderError>;
    fn remove_series(&mut self, id: SeriesId) -> Result<(), RenderError>;
    fn configure_scale(&mut self, scale: PriceScaleId, region: ScaleRegion) -> Result<(), RenderError>;
    fn resize(&mut self, size: SurfaceSize) -> Result<(), RenderError>;
    /// Re-fits the visible time range to the loaded data.
    fn fit_content(&mut self) -> Result<(), RenderError>;
    /// Releases the widget. Called exactly once, after every series is removed.
    fn dispose(&mut self);
}

/// Line colors per indicator kind, in output-line order.
pub fn indicator_style(kind: IndicatorKind, line: usize, scale: PriceScaleId) -> SeriesStyle {
    let (series_kind, color) = match (kind, line) {
        (IndicatorKind::Sma, _) => (SeriesKind::Line, Color("#f5c542")),
        (IndicatorKind::Ema, _) => (SeriesKind::Line, Color("#42a5f5")),
        (IndicatorKind::Rsi, _) => (SeriesKind::Line, Color("#ab47bc")),
        (IndicatorKind::Macd, 0) | (IndicatorKind::StochRsi, 0) => {
            (SeriesKind::Line, Color("#2962ff"))
        }
        (IndicatorKind::Macd, 1) | (IndicatorKind::StochRsi, _) => {
            (SeriesKind::Line, Color("#ff6d00"))
        }
        (IndicatorKind::Macd, _) => (SeriesKind::Histogram, Color("#787b86")),
    };
    SeriesStyle {
        kind: series_kind,
        scale,
        color,
    }
}
