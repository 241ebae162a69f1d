use crate::domain::{
    chart::{
        Color, HistogramBar, PriceScaleId, RenderBackend, ScaleRegion, SeriesData, SeriesId,
        SeriesKind, SeriesStyle, SurfaceSize,
    },
    errors::RenderError,
    indicators::TimePoint,
    logging::{LogComponent, get_logger},
    market_data::Candle,
};
use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Latest container size, written by the resize listener at any time and drained by the
/// surface only between pushes.
#[derive(Debug, Clone, Default)]
pub struct ResizeMailbox(Rc<Cell<Option<SurfaceSize>>>);

impl ResizeMailbox {
    pub fn post(&self, size: SurfaceSize) {
        self.0.set(Some(size));
    }

    fn take(&self) -> Option<SurfaceSize> {
        self.0.take()
    }

    pub fn is_pending(&self) -> bool {
        let size = self.0.get();
        size.is_some()
    }
}

/// Owner of the drawing widget and every series on it.
///
/// The candle and volume series live for the whole surface lifetime. Indicator series are
/// attached and released on request; callers only ever hold their ids.
pub struct RenderSurface<B: RenderBackend> {
    backend: Option<B>,
    size: SurfaceSize,
    next_series: u64,
    candle_series: SeriesId,
    volume_series: SeriesId,
    owned: BTreeMap<SeriesId, SeriesStyle>,
    resize_mailbox: ResizeMailbox,
    pushing: bool,
    needs_fit: bool,
}

impl<B: RenderBackend> RenderSurface<B> {
    pub fn mount(mut backend: B, size: SurfaceSize) -> Result<Self, RenderError> {
        backend.resize(size)?;
        backend.configure_scale(PriceScaleId::Main, ScaleRegion::MAIN)?;
        backend.configure_scale(PriceScaleId::Volume, ScaleRegion::VOLUME)?;

        let mut surface = Self {
            backend: Some(backend),
            size,
            next_series: 0,
            candle_series: SeriesId::from(0),
            volume_series: SeriesId::from(0),
            owned: BTreeMap::new(),
            resize_mailbox: ResizeMailbox::default(),
            pushing: false,
            needs_fit: true,
        };
        surface.candle_series = surface.create(SeriesStyle {
            kind: SeriesKind::Candlestick,
            scale: PriceScaleId::Main,
            color: Color::UP,
        })?;
        surface.volume_series = surface.create(SeriesStyle {
            kind: SeriesKind::Histogram,
            scale: PriceScaleId::Volume,
            color: Color::UP_VOLUME,
        })?;

        get_logger().info(
            LogComponent::Application("RenderSurface"),
            &format!("Mounted surface {}", size),
        );
        Ok(surface)
    }

    fn backend(&mut self) -> Result<&mut B, RenderError> {
        self.backend.as_mut().ok_or(RenderError::SurfaceDisposed)
    }

    fn create(&mut self, style: SeriesStyle) -> Result<SeriesId, RenderError> {
        self.next_series += 1;
        let id = SeriesId::from(self.next_series);
        self.backend()?.create_series(id, style)?;
        self.owned.insert(id, style);
        Ok(id)
    }

    /// Writes a snapshot into the candle and volume series as one update.
    ///
    /// A resize posted while the push runs is applied right after it.
    pub fn push_candles(&mut self, candles: Rc<[Candle]>) -> Result<(), RenderError> {
        let (candle_series, volume_series) = (self.candle_series, self.volume_series);
        let bars = volume_bars(&candles);
        let backend = self.backend.as_mut().ok_or(RenderError::SurfaceDisposed)?;

        self.pushing = true;
        let written = backend
            .set_data(candle_series, SeriesData::Candles(candles))
            .and_then(|_| backend.set_data(volume_series, SeriesData::Bars(bars)));
        self.pushing = false;
        written?;

        if self.needs_fit {
            self.needs_fit = false;
            self.backend()?.fit_content()?;
        }
        self.flush_resize()
    }

    /// Requests a reflow to `size`. Deferred while a push is in progress.
    pub fn request_resize(&mut self, size: SurfaceSize) -> Result<(), RenderError> {
        self.resize_mailbox.post(size);
        if self.pushing {
            return Ok(());
        }
        self.flush_resize()
    }

    /// Applies a posted resize, if any, and re-fits the time range.
    pub fn flush_resize(&mut self) -> Result<(), RenderError> {
        if self.pushing {
            return Ok(());
        }
        let Some(size) = self.resize_mailbox.take() else {
            return Ok(());
        };
        if size.is_empty() || size == self.size {
            return Ok(());
        }
        let backend = self.backend()?;
        backend.resize(size)?;
        backend.fit_content()?;
        self.size = size;
        Ok(())
    }

    /// Creates an indicator series, configuring its pane scale first when given a region.
    pub fn attach_series(
        &mut self,
        style: SeriesStyle,
        region: Option<ScaleRegion>,
    ) -> Result<SeriesId, RenderError> {
        if let Some(region) = region {
            self.backend()?.configure_scale(style.scale, region)?;
        }
        self.create(style)
    }

    /// Replaces the points of an indicator series. Ids this surface does not own are ignored.
    pub fn set_points(&mut self, id: SeriesId, points: Vec<TimePoint>) -> Result<(), RenderError> {
        let Some(style) = self.owned.get(&id).copied() else {
            get_logger().warn(
                LogComponent::Application("RenderSurface"),
                &format!("Ignoring data for foreign {}", id),
            );
            return Ok(());
        };
        let data = match style.kind {
            SeriesKind::Histogram => SeriesData::Bars(
                points
                    .into_iter()
                    .map(|p| HistogramBar {
                        time: p.time,
                        value: p.value,
                        color: if p.value >= 0.0 { Color::UP } else { Color::DOWN },
                    })
                    .collect(),
            ),
            _ => SeriesData::Points(points),
        };
        self.backend()?.set_data(id, data)
    }

    /// Removes an indicator series. Base series and unknown ids are left alone.
    pub fn release_series(&mut self, id: SeriesId) -> Result<bool, RenderError> {
        if id == self.candle_series || id == self.volume_series || !self.owned.contains_key(&id) {
            return Ok(false);
        }
        self.backend()?.remove_series(id)?;
        self.owned.remove(&id);
        Ok(true)
    }

    /// Re-fits on the next push, e.g. after the snapshot was invalidated.
    pub fn refit_on_next_push(&mut self) {
        self.needs_fit = true;
    }

    /// Releases every series and then the widget. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        let Some(mut backend) = self.backend.take() else {
            return;
        };
        let ids: Vec<SeriesId> = self.owned.keys().rev().copied().collect();
        for id in ids {
            if let Err(e) = backend.remove_series(id) {
                get_logger().warn(
                    LogComponent::Application("RenderSurface"),
                    &format!("Failed to remove {} during dispose: {}", id, e),
                );
            }
        }
        self.owned.clear();
        backend.dispose();
        get_logger().info(LogComponent::Application("RenderSurface"), "Surface disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.backend.is_none()
    }

    pub fn resize_mailbox(&self) -> ResizeMailbox {
        self.resize_mailbox.clone()
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Number of live series, base series included.
    pub fn series_count(&self) -> usize {
        self.owned.len()
    }

    pub fn base_series(&self) -> (SeriesId, SeriesId) {
        (self.candle_series, self.volume_series)
    }

    pub fn backend_ref(&self) -> Option<&B> {
        self.backend.as_ref()
    }
}

impl<B: RenderBackend> Drop for RenderSurface<B> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Volume histogram colored by candle direction.
pub fn volume_bars(candles: &[Candle]) -> Vec<HistogramBar> {
    candles
        .iter()
        .map(|c| HistogramBar {
            time: c.timestamp,
            value: c.ohlcv.volume.value(),
            color: if c.is_bullish() {
                Color::UP_VOLUME
            } else {
                Color::DOWN_VOLUME
            },
        })
        .collect()
}
