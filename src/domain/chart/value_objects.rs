use derive_more::{Display, From};
use serde::Serialize;

/// Opaque handle of a rendered series. Only the render surface creates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Serialize)]
#[display(fmt = "series#{}", _0)]
pub struct SeriesId(u64);

impl SeriesId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Oscillator pane. Never reused once released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Serialize)]
#[display(fmt = "pane#{}", _0)]
pub struct PaneId(u64);

impl PaneId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Serialize)]
#[display(fmt = "{}", _0)]
pub struct IndicatorId(u64);

impl IndicatorId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[display(fmt = "{}x{}", width, height)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Collapsed containers (hidden tabs, zero-height flex items) are not laid out.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Vertical band of a price scale, as fractions of the chart height left free above and below.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaleRegion {
    pub top: f64,
    pub bottom: f64,
}

impl ScaleRegion {
    pub const MAIN: ScaleRegion = ScaleRegion { top: 0.1, bottom: 0.2 };
    pub const VOLUME: ScaleRegion = ScaleRegion { top: 0.8, bottom: 0.0 };
    pub const OSCILLATOR: ScaleRegion = ScaleRegion { top: 0.8, bottom: 0.0 };

    /// Pixel span `(y_top, y_bottom)` of this band on a surface of `height` pixels.
    pub fn span(&self, height: f64) -> (f64, f64) {
        (height * self.top, height * (1.0 - self.bottom))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
pub enum PriceScaleId {
    #[display(fmt = "main")]
    Main,
    #[display(fmt = "volume")]
    Volume,
    #[display(fmt = "{}", _0)]
    Pane(PaneId),
}

/// CSS color string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[display(fmt = "{}", _0)]
pub struct Color(pub &'static str);

impl Color {
    pub const UP: Color = Color("#26a69a");
    pub const DOWN: Color = Color("#ef5350");
    pub const UP_VOLUME: Color = Color("rgba(38, 166, 154, 0.5)");
    pub const DOWN_VOLUME: Color = Color("rgba(239, 83, 80, 0.5)");
    pub const BACKGROUND: Color = Color("#131722");

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}
