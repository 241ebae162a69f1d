use crate::domain::{
    chart::{
        Color, PriceScaleId, RenderBackend, ScaleRegion, SeriesData, SeriesId, SeriesKind,
        SeriesStyle, SurfaceSize,
    },
    errors::RenderError,
    logging::LogComponent,
    market_data::{Candle, Timestamp},
};
use crate::log_debug;
use crate::view_state::ViewState;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// Right-hand gutter reserved for price labels.
const AXIS_WIDTH: f64 = 64.0;

/// Maps values of one price scale into its vertical band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFrame {
    top: f64,
    bottom: f64,
    min: f64,
    max: f64,
}

impl ScaleFrame {
    pub fn new(region: ScaleRegion, height: f64, min: f64, max: f64) -> Self {
        let (top, bottom) = region.span(height);
        Self { top, bottom, min, max }
    }

    /// Screen y of `value`; flat ranges sit in the middle of the band.
    pub fn y(&self, value: f64) -> f64 {
        let range = self.max - self.min;
        if range <= f64::EPSILON {
            return (self.top + self.bottom) / 2.0;
        }
        self.bottom - (value - self.min) / range * (self.bottom - self.top)
    }
}

/// Min and max over finite values, `None` when there are none.
pub fn value_range(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Canvas 2D implementation of the drawing port. Redraws the whole canvas on every change.
pub struct CanvasBackend {
    canvas_id: String,
    size: SurfaceSize,
    view: ViewState,
    series: BTreeMap<SeriesId, (SeriesStyle, SeriesData)>,
    scales: HashMap<PriceScaleId, ScaleRegion>,
    disposed: bool,
}

impl CanvasBackend {
    pub fn new(canvas_id: impl Into<String>) -> Self {
        Self {
            canvas_id: canvas_id.into(),
            size: SurfaceSize::new(0, 0),
            view: ViewState::default(),
            series: BTreeMap::new(),
            scales: HashMap::new(),
            disposed: false,
        }
    }

    fn context(&self) -> Result<(HtmlCanvasElement, CanvasRenderingContext2d), RenderError> {
        let missing = |what: &str| RenderError::Backend(format!("{} not available", what));
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| missing("document"))?;
        let canvas = document
            .get_element_by_id(&self.canvas_id)
            .ok_or_else(|| missing(&self.canvas_id))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| RenderError::Backend(format!("#{} is not a canvas", self.canvas_id)))?;
        let context = canvas
            .get_context("2d")
            .map_err(|_| missing("2d context"))?
            .ok_or_else(|| missing("2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| missing("2d context"))?;
        Ok((canvas, context))
    }

    fn candles(&self) -> Option<Rc<[Candle]>> {
        self.series.values().find_map(|(_, data)| match data {
            SeriesData::Candles(c) => Some(Rc::clone(c)),
            _ => None,
        })
    }

    fn plot_width(&self) -> f64 {
        (f64::from(self.size.width) - AXIS_WIDTH).max(0.0)
    }

    fn redraw(&self) -> Result<(), RenderError> {
        if self.disposed {
            return Err(RenderError::SurfaceDisposed);
        }
        let (_canvas, ctx) = self.context()?;
        let (width, height) = (f64::from(self.size.width), f64::from(self.size.height));
        ctx.set_fill_style(&JsValue::from(Color::BACKGROUND.as_str()));
        ctx.fill_rect(0.0, 0.0, width, height);

        let Some(candles) = self.candles() else {
            return Ok(());
        };
        let (start, len) = self.view.visible_range(candles.len(), self.plot_width());
        let visible = &candles[start..start + len];
        let index_of = |time: Timestamp| {
            visible
                .binary_search_by_key(&time, |c| c.timestamp)
                .ok()
        };

        let frames = self.frames(visible, &index_of, height);
        for kind in [SeriesKind::Histogram, SeriesKind::Candlestick, SeriesKind::Line] {
            for (style, data) in self.series.values().filter(|(s, _)| s.kind == kind) {
                let Some(frame) = frames.get(&style.scale) else {
                    continue;
                };
                match data {
                    SeriesData::Candles(_) => self.draw_candles(&ctx, visible, frame),
                    SeriesData::Bars(bars) => {
                        for bar in bars {
                            if let Some(i) = index_of(bar.time) {
                                self.draw_bar(&ctx, i, bar.value, bar.color, frame);
                            }
                        }
                    }
                    SeriesData::Points(points) => {
                        let path: Vec<(usize, f64)> = points
                            .iter()
                            .filter_map(|p| index_of(p.time).map(|i| (i, p.value)))
                            .collect();
                        self.draw_line(&ctx, &path, style.color, frame);
                    }
                }
            }
        }

        if let Some(last) = visible.last()
            && let Some(frame) = frames.get(&PriceScaleId::Main)
        {
            ctx.set_fill_style(&JsValue::from("#d1d4dc"));
            ctx.set_font("11px sans-serif");
            let y = frame.y(last.close());
            ctx.fill_text(&format!("{:.2}", last.close()), self.plot_width() + 6.0, y + 4.0)
                .map_err(|e| RenderError::Backend(format!("{:?}", e)))?;
        }
        Ok(())
    }

    /// Value range of every configured scale over the visible window.
    fn frames(
        &self,
        visible: &[Candle],
        index_of: &dyn Fn(Timestamp) -> Option<usize>,
        height: f64,
    ) -> HashMap<PriceScaleId, ScaleFrame> {
        let mut ranges: HashMap<PriceScaleId, (f64, f64)> = HashMap::new();
        let mut widen = |scale: PriceScaleId, range: Option<(f64, f64)>| {
            if let Some((lo, hi)) = range {
                let entry = ranges.entry(scale).or_insert((lo, hi));
                *entry = (entry.0.min(lo), entry.1.max(hi));
            }
        };

        for (style, data) in self.series.values() {
            let range = match data {
                SeriesData::Candles(_) => value_range(
                    visible
                        .iter()
                        .flat_map(|c| [c.ohlcv.low.value(), c.ohlcv.high.value()]),
                ),
                SeriesData::Bars(bars) => value_range(
                    bars.iter()
                        .filter(|b| index_of(b.time).is_some())
                        .map(|b| b.value)
                        .chain([0.0]),
                ),
                SeriesData::Points(points) => value_range(
                    points
                        .iter()
                        .filter(|p| index_of(p.time).is_some())
                        .map(|p| p.value),
                ),
            };
            widen(style.scale, range);
        }

        ranges
            .into_iter()
            .map(|(scale, (lo, hi))| {
                let region = self.scales.get(&scale).copied().unwrap_or(ScaleRegion::MAIN);
                (scale, ScaleFrame::new(region, height, lo, hi))
            })
            .collect()
    }

    fn draw_candles(&self, ctx: &CanvasRenderingContext2d, visible: &[Candle], frame: &ScaleFrame) {
        let body_width = (self.view.pixels_per_candle * 0.6).max(1.0);
        for (i, candle) in visible.iter().enumerate() {
            let x = self.view.x_for_index(i, 0);
            let color = if candle.is_bullish() { Color::UP } else { Color::DOWN };
            let (open_y, close_y) = (frame.y(candle.ohlcv.open.value()), frame.y(candle.close()));

            ctx.set_stroke_style(&JsValue::from(color.as_str()));
            ctx.set_line_width(1.0);
            ctx.begin_path();
            ctx.move_to(x, frame.y(candle.ohlcv.high.value()));
            ctx.line_to(x, frame.y(candle.ohlcv.low.value()));
            ctx.stroke();

            ctx.set_fill_style(&JsValue::from(color.as_str()));
            let top = open_y.min(close_y);
            let body_height = (open_y - close_y).abs().max(1.0);
            ctx.fill_rect(x - body_width / 2.0, top, body_width, body_height);
        }
    }

    fn draw_bar(&self, ctx: &CanvasRenderingContext2d, index: usize, value: f64, color: Color, frame: &ScaleFrame) {
        let x = self.view.x_for_index(index, 0);
        let width = (self.view.pixels_per_candle * 0.8).max(1.0);
        let (zero, y) = (frame.y(0.0), frame.y(value));
        ctx.set_fill_style(&JsValue::from(color.as_str()));
        ctx.fill_rect(x - width / 2.0, zero.min(y), width, (zero - y).abs());
    }

    fn draw_line(&self, ctx: &CanvasRenderingContext2d, path: &[(usize, f64)], color: Color, frame: &ScaleFrame) {
        if path.len() < 2 {
            return;
        }
        ctx.set_stroke_style(&JsValue::from(color.as_str()));
        ctx.set_line_width(1.5);
        ctx.begin_path();
        for (n, &(i, value)) in path.iter().enumerate() {
            let (x, y) = (self.view.x_for_index(i, 0), frame.y(value));
            if n == 0 {
                ctx.move_to(x, y);
            } else {
                ctx.line_to(x, y);
            }
        }
        ctx.stroke();
    }
}

impl RenderBackend for CanvasBackend {
    fn create_series(&mut self, id: SeriesId, style: SeriesStyle) -> Result<(), RenderError> {
        self.series.insert(id, (style, SeriesData::Points(Vec::new())));
        Ok(())
    }

    fn set_data(&mut self, id: SeriesId, data: SeriesData) -> Result<(), RenderError> {
        let entry = self
            .series
            .get_mut(&id)
            .ok_or_else(|| RenderError::Backend(format!("{} does not exist", id)))?;
        entry.1 = data;
        self.redraw()
    }

    fn remove_series(&mut self, id: SeriesId) -> Result<(), RenderError> {
        self.series.remove(&id);
        self.redraw()
    }

    fn configure_scale(&mut self, scale: PriceScaleId, region: ScaleRegion) -> Result<(), RenderError> {
        self.scales.insert(scale, region);
        Ok(())
    }

    fn resize(&mut self, size: SurfaceSize) -> Result<(), RenderError> {
        let (canvas, _) = self.context()?;
        canvas.set_width(size.width);
        canvas.set_height(size.height);
        self.size = size;
        log_debug!(LogComponent::Infrastructure("CanvasBackend"), "Canvas resized to {}", size);
        Ok(())
    }

    fn fit_content(&mut self) -> Result<(), RenderError> {
        let count = self.candles().map_or(0, |c| c.len());
        self.view.fit_content(count, self.plot_width());
        self.redraw()
    }

    fn dispose(&mut self) {
        self.series.clear();
        self.scales.clear();
        if let Ok((_, ctx)) = self.context() {
            ctx.clear_rect(0.0, 0.0, f64::from(self.size.width), f64::from(self.size.height));
        }
        self.disposed = true;
    }
}
