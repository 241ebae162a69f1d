use crate::application::config::ChartConfig;
use crate::application::live_feed::{FetchOutcome, FetchTicket, LiveFeed};
use crate::application::render_surface::{RenderSurface, ResizeMailbox};
use crate::domain::{
    chart::{
        IndicatorId, IndicatorInstance, IndicatorReading, IndicatorSummary, PaneAllocator,
        RenderBackend, SurfaceSize, series::indicator_style,
    },
    errors::{ComputeError, ConfigError, DataError, FeedError, RenderError},
    events::{ChartEvent, EventDispatcher, InMemoryEventDispatcher, MarketDataEvent},
    indicators::{IndicatorEngine, IndicatorKind, IndicatorOutput, IndicatorSpec, align},
    logging::LogComponent,
    market_data::{Candle, Symbol, Timeframe, TimeSeriesStore},
    state::{ChartState, StateTrigger},
};
use crate::{log_debug, log_info, log_warn};
use std::rc::Rc;

/// Builds a fresh drawing backend for a surface of the given size.
pub type BackendFactory<B> = Box<dyn Fn(SurfaceSize) -> Result<B, RenderError>>;

/// What happened to a completed fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    Applied { candles: usize },
    Stale,
    Rejected(DataError),
    Failed(FeedError),
    /// The snapshot was stored but no surface could be mounted to draw it.
    Unrendered(RenderError),
}

const COMPONENT: LogComponent = LogComponent::Application("ChartController");

/// Top-level orchestrator of one chart session.
///
/// Owns the candle store, feed bookkeeping, indicator engine, pane allocator and render
/// surface. All mutation goes through here, one call at a time.
pub struct ChartController<B: RenderBackend> {
    config: ChartConfig,
    state: ChartState,
    store: TimeSeriesStore,
    feed: LiveFeed,
    engine: IndicatorEngine,
    panes: PaneAllocator,
    surface: Option<RenderSurface<B>>,
    factory: BackendFactory<B>,
    size: SurfaceSize,
    indicators: Vec<IndicatorInstance>,
    next_indicator: u64,
    events: InMemoryEventDispatcher,
    disposed: bool,
}

impl<B: RenderBackend> ChartController<B> {
    pub fn new(
        config: ChartConfig,
        symbol: Symbol,
        timeframe: Timeframe,
        factory: BackendFactory<B>,
    ) -> Result<Self, RenderError> {
        let size = config.initial_size();
        let surface = RenderSurface::mount(factory(size)?, size)?;
        let feed = LiveFeed::new(symbol, timeframe, config.poll_interval_ms);
        log_info!(COMPONENT, "Chart created for {} {}", feed.symbol(), timeframe);

        Ok(Self {
            config,
            state: ChartState::Idle,
            store: TimeSeriesStore::new(),
            feed,
            engine: IndicatorEngine::new(),
            panes: PaneAllocator::new(),
            surface: Some(surface),
            factory,
            size,
            indicators: Vec::new(),
            next_indicator: 0,
            events: InMemoryEventDispatcher::new(),
            disposed: false,
        })
    }

    /// Starts the first session. Returns the ticket for the immediate fetch.
    pub fn begin_session(&mut self) -> FetchTicket {
        let ticket = self
            .feed
            .retarget(self.feed.symbol().clone(), self.feed.timeframe());
        self.transition(StateTrigger::SessionStarted);
        ticket
    }

    /// Ticket for the next periodic fetch. `None` once disposed.
    pub fn next_tick(&self) -> Option<FetchTicket> {
        (!self.disposed).then(|| self.feed.ticket())
    }

    /// Switches the timeframe. Indicators stay and are recomputed when data arrives.
    pub fn set_timeframe(&mut self, timeframe: Timeframe) -> FetchTicket {
        if self.disposed {
            return self.feed.ticket();
        }
        log_info!(COMPONENT, "Timeframe {} -> {}", self.feed.timeframe(), timeframe);
        let ticket = self.feed.retarget(self.feed.symbol().clone(), timeframe);
        self.invalidate_series();
        self.transition(StateTrigger::ParametersChanged);
        ticket
    }

    /// Switches the symbol on a rebuilt surface. Indicators are re-attached to it.
    pub fn set_symbol(&mut self, symbol: Symbol) -> FetchTicket {
        if self.disposed {
            return self.feed.ticket();
        }
        log_info!(COMPONENT, "Symbol {} -> {}", self.feed.symbol(), symbol);
        let ticket = self.feed.retarget(symbol.clone(), self.feed.timeframe());
        self.store.invalidate();
        if let Err(e) = self.rebuild_surface() {
            log_warn!(COMPONENT, "Surface rebuild failed: {}", e);
        } else {
            self.events
                .publish_chart_event(ChartEvent::SurfaceRebuilt { symbol });
        }
        self.render_all();
        self.transition(StateTrigger::ParametersChanged);
        ticket
    }

    fn invalidate_series(&mut self) {
        self.store.invalidate();
        if let Some(surface) = self.surface.as_mut() {
            surface.refit_on_next_push();
        }
        self.render_all();
    }

    /// Disposes the current surface, then mounts a new one and re-attaches indicator series.
    fn rebuild_surface(&mut self) -> Result<(), RenderError> {
        if let Some(mut old) = self.surface.take() {
            old.dispose();
        }
        for instance in &mut self.indicators {
            instance.series.clear();
        }

        let mut surface = RenderSurface::mount((self.factory)(self.size)?, self.size)?;
        let attached = self
            .indicators
            .iter_mut()
            .try_for_each(|instance| attach_instance(&mut surface, &self.panes, instance));
        if let Err(e) = attached {
            for instance in &mut self.indicators {
                instance.series.clear();
            }
            surface.dispose();
            return Err(e);
        }
        self.surface = Some(surface);
        Ok(())
    }

    /// Mounts a surface if the last rebuild failed. Indicators get their series back.
    fn ensure_surface(&mut self) -> Result<(), RenderError> {
        if self.surface.is_some() {
            return Ok(());
        }
        self.rebuild_surface()?;
        log_info!(COMPONENT, "Surface remounted for {}", self.feed.symbol());
        self.events.publish_chart_event(ChartEvent::SurfaceRebuilt {
            symbol: self.feed.symbol().clone(),
        });
        Ok(())
    }

    /// Adds an indicator. Invalid parameters are rejected before anything changes.
    pub fn add_indicator(
        &mut self,
        kind: IndicatorKind,
        params: &[u32],
    ) -> Result<IndicatorId, ConfigError> {
        let spec = IndicatorSpec::new(kind, params)?;
        Ok(self.add_indicator_spec(spec))
    }

    pub fn add_indicator_spec(&mut self, spec: IndicatorSpec) -> IndicatorId {
        self.next_indicator += 1;
        let id = IndicatorId::from(self.next_indicator);
        let placement = self.panes.place(spec.kind());
        let mut instance = IndicatorInstance::new(id, spec, placement);

        if let Some(surface) = self.surface.as_mut()
            && let Err(e) = attach_instance(surface, &self.panes, &mut instance)
        {
            log_warn!(COMPONENT, "Could not attach series for {}: {}", instance.spec, e);
        }

        let candles = self.store.current();
        let closes = self.store.closes();
        let failure = render_instance(
            &mut self.engine,
            self.surface.as_mut(),
            self.store.version(),
            &candles,
            &closes,
            &mut instance,
        );

        log_info!(COMPONENT, "Added indicator {} as {:?}", instance.spec, placement);
        self.events.publish_chart_event(ChartEvent::IndicatorAdded {
            id,
            label: instance.spec.label(),
        });
        if let Some(e) = failure {
            self.publish_failure(id, &e);
        }
        self.indicators.push(instance);
        id
    }

    /// Removes an indicator and everything it rendered. Unknown ids are a no-op.
    pub fn remove_indicator(&mut self, id: IndicatorId) -> bool {
        let Some(index) = self.indicators.iter().position(|i| i.id == id) else {
            log_debug!(COMPONENT, "remove_indicator: no indicator {}", id);
            return false;
        };
        let instance = self.indicators.remove(index);
        if let Some(surface) = self.surface.as_mut() {
            for series in &instance.series {
                if let Err(e) = surface.release_series(*series) {
                    log_warn!(COMPONENT, "Failed to release {}: {}", series, e);
                }
            }
        }
        if let Some(pane) = instance.placement.pane() {
            self.panes.release(pane);
        }
        log_info!(COMPONENT, "Removed indicator {} ({})", id, instance.spec);
        self.events
            .publish_chart_event(ChartEvent::IndicatorRemoved { id });
        true
    }

    pub fn list_indicators(&self) -> Vec<IndicatorSummary> {
        self.indicators.iter().map(IndicatorInstance::summary).collect()
    }

    pub fn indicator(&self, id: IndicatorId) -> Option<&IndicatorInstance> {
        self.indicators.iter().find(|i| i.id == id)
    }

    /// Applies a completed fetch if its ticket is still current.
    pub fn apply_fetch(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Vec<Candle>, FeedError>,
    ) -> ApplyOutcome {
        if self.disposed {
            return ApplyOutcome::Stale;
        }
        match self.feed.accept(ticket, result) {
            FetchOutcome::Stale => {
                log_debug!(
                    COMPONENT,
                    "Discarding stale response for {} {}",
                    ticket.symbol,
                    ticket.timeframe
                );
                self.events
                    .publish_market_data_event(MarketDataEvent::StaleResponseDiscarded {
                        symbol: ticket.symbol.clone(),
                        timeframe: ticket.timeframe,
                    });
                ApplyOutcome::Stale
            }
            FetchOutcome::Failed(e) => {
                log_warn!(COMPONENT, "Fetch failed: {}", e);
                self.feed.mark_lost();
                self.events
                    .publish_market_data_event(MarketDataEvent::ConnectionLost {
                        symbol: ticket.symbol.clone(),
                        reason: e.to_string(),
                    });
                self.transition(StateTrigger::FetchFailed);
                ApplyOutcome::Failed(e)
            }
            FetchOutcome::Fresh(candles) => {
                let count = candles.len();
                if let Err(e) = self.store.replace(candles) {
                    log_warn!(COMPONENT, "Snapshot rejected: {}", e);
                    self.feed.mark_lost();
                    self.events
                        .publish_market_data_event(MarketDataEvent::SnapshotRejected {
                            symbol: ticket.symbol.clone(),
                            reason: e.to_string(),
                        });
                    self.transition(StateTrigger::FetchFailed);
                    return ApplyOutcome::Rejected(e);
                }
                if let Err(e) = self.ensure_surface() {
                    log_warn!(COMPONENT, "No surface to draw on: {}", e);
                    self.feed.mark_lost();
                    self.transition(StateTrigger::FetchFailed);
                    return ApplyOutcome::Unrendered(e);
                }
                self.render_all();
                self.feed.mark_live();
                self.events
                    .publish_market_data_event(MarketDataEvent::SnapshotLoaded {
                        symbol: ticket.symbol.clone(),
                        timeframe: ticket.timeframe,
                        candle_count: count,
                    });
                self.transition(StateTrigger::FetchSucceeded);
                ApplyOutcome::Applied { candles: count }
            }
        }
    }

    /// Pushes the store into the base series and recomputes every indicator.
    fn render_all(&mut self) {
        let candles = self.store.current();
        if let Some(surface) = self.surface.as_mut()
            && let Err(e) = surface.push_candles(Rc::clone(&candles))
        {
            log_warn!(COMPONENT, "Candle push failed: {}", e);
        }

        let closes = self.store.closes();
        let version = self.store.version();
        let mut failures = Vec::new();
        for instance in &mut self.indicators {
            let had_failed = instance.failure.is_some();
            if let Some(e) = render_instance(
                &mut self.engine,
                self.surface.as_mut(),
                version,
                &candles,
                &closes,
                instance,
            ) && !had_failed
            {
                failures.push((instance.id, e));
            }
        }
        for (id, e) in failures {
            self.publish_failure(id, &e);
        }
    }

    fn publish_failure(&self, id: IndicatorId, e: &ComputeError) {
        log_warn!(COMPONENT, "Indicator {} failed: {}", id, e);
        self.events.publish_chart_event(ChartEvent::IndicatorFailed {
            id,
            reason: e.to_string(),
        });
    }

    /// Most recent value of every line of every indicator, on the newest candle.
    pub fn latest_readings(&self) -> Vec<IndicatorReading> {
        let Some(last) = self.store.current().last().copied() else {
            return Vec::new();
        };
        self.indicators
            .iter()
            .flat_map(|instance| {
                instance.output.lines.iter().filter_map(move |line| {
                    line.values.last().map(|&value| IndicatorReading {
                        id: instance.id.value(),
                        label: instance.spec.label(),
                        line: line.name,
                        time: last.timestamp.value(),
                        value,
                    })
                })
            })
            .collect()
    }

    /// Queues a reflow. Applied immediately unless a push is running.
    pub fn resize(&mut self, size: SurfaceSize) {
        self.size = size;
        if let Some(surface) = self.surface.as_mut() {
            if let Err(e) = surface.request_resize(size) {
                log_warn!(COMPONENT, "Resize to {} failed: {}", size, e);
                return;
            }
            self.events
                .publish_chart_event(ChartEvent::Resized { size: surface.size() });
        }
    }

    /// Applies whatever the resize listener posted since the last call.
    pub fn flush_resize(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            let before = surface.size();
            match surface.flush_resize() {
                Ok(()) if surface.size() != before => {
                    self.size = surface.size();
                    self.events
                        .publish_chart_event(ChartEvent::Resized { size: self.size });
                }
                Ok(()) => {}
                Err(e) => log_warn!(COMPONENT, "Deferred resize failed: {}", e),
            }
        }
    }

    pub fn resize_mailbox(&self) -> Option<ResizeMailbox> {
        self.surface.as_ref().map(RenderSurface::resize_mailbox)
    }

    /// Tears the chart down: outstanding tickets turn stale, indicators and panes are
    /// released, then the surface. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.feed.close();
        for instance in std::mem::take(&mut self.indicators) {
            if let Some(pane) = instance.placement.pane() {
                self.panes.release(pane);
            }
        }
        if let Some(mut surface) = self.surface.take() {
            surface.dispose();
        }
        self.transition(StateTrigger::Disposed);
        log_info!(COMPONENT, "Chart disposed");
    }

    fn transition(&mut self, trigger: StateTrigger) {
        let from = self.state;
        self.state = from.next(trigger);
        if from != self.state {
            log_debug!(COMPONENT, "State {} -> {}", from, self.state);
        }
        self.events.publish_chart_event(ChartEvent::StateChanged {
            from,
            to: self.state,
            live: self.feed.is_live(),
        });
    }

    pub fn state(&self) -> ChartState {
        self.state
    }

    pub fn is_live(&self) -> bool {
        self.feed.is_live()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn symbol(&self) -> &Symbol {
        self.feed.symbol()
    }

    pub fn timeframe(&self) -> Timeframe {
        self.feed.timeframe()
    }

    pub fn candles(&self) -> Rc<[Candle]> {
        self.store.current()
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn surface(&self) -> Option<&RenderSurface<B>> {
        self.surface.as_ref()
    }

    pub fn active_panes(&self) -> usize {
        self.panes.active_panes().len()
    }

    pub fn events_mut(&mut self) -> &mut InMemoryEventDispatcher {
        &mut self.events
    }
}

/// Creates one series per output line, configuring the oscillator pane with the first.
fn attach_instance<B: RenderBackend>(
    surface: &mut RenderSurface<B>,
    panes: &PaneAllocator,
    instance: &mut IndicatorInstance,
) -> Result<(), RenderError> {
    let kind = instance.kind();
    let scale = instance.placement.scale();
    let mut region = panes.region(instance.placement);
    for line in 0..kind.series_count() {
        let id = surface.attach_series(indicator_style(kind, line, scale), region.take())?;
        instance.series.push(id);
    }
    Ok(())
}

/// Recomputes one instance and writes its aligned lines. Returns the error when the
/// computation failed; the instance then renders nothing.
fn render_instance<B: RenderBackend>(
    engine: &mut IndicatorEngine,
    mut surface: Option<&mut RenderSurface<B>>,
    version: u64,
    candles: &[Candle],
    closes: &[f64],
    instance: &mut IndicatorInstance,
) -> Option<ComputeError> {
    let (output, failure) = match engine.compute(version, closes, &instance.spec) {
        Ok(output) => (output, None),
        Err(e) => (IndicatorOutput::default(), Some(e)),
    };

    if let Some(surface) = surface.as_deref_mut() {
        for (index, series) in instance.series.iter().enumerate() {
            let points = output
                .lines
                .get(index)
                .map(|line| align(candles, &line.values))
                .unwrap_or_default();
            if let Err(e) = surface.set_points(*series, points) {
                log_warn!(COMPONENT, "Failed to draw {}: {}", instance.spec, e);
            }
        }
    }

    instance.output = output;
    instance.failure = failure.clone();
    failure
}
