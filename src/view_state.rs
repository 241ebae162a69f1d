/// Horizontal layout of the time axis.
///
/// The newest candle is pinned to the right edge; `pixels_per_candle` decides how many older
/// candles fit to its left.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewState {
    pub pixels_per_candle: f64,
    pub min_ppc: f64,
    pub max_ppc: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(8.0, 1.0, 40.0)
    }
}

impl ViewState {
    pub fn new(pixels_per_candle: f64, min_ppc: f64, max_ppc: f64) -> Self {
        Self { pixels_per_candle, min_ppc, max_ppc }
    }

    /// Spreads `candle_count` candles over `width_px`, within the zoom limits.
    pub fn fit_content(&mut self, candle_count: usize, width_px: f64) {
        if candle_count == 0 || width_px <= 0.0 {
            return;
        }
        self.pixels_per_candle = (width_px / candle_count as f64).clamp(self.min_ppc, self.max_ppc);
    }

    /// `(start, len)` of the candles that fit on screen, newest last.
    pub fn visible_range(&self, candle_count: usize, width_px: f64) -> (usize, usize) {
        let visible = ((width_px / self.pixels_per_candle).floor() as usize).min(candle_count);
        (candle_count - visible, visible)
    }

    /// Center x of candle `index` given the visible range start.
    pub fn x_for_index(&self, index: usize, start: usize) -> f64 {
        (index.saturating_sub(start) as f64 + 0.5) * self.pixels_per_candle
    }
}
