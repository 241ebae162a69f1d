use crate::application::{BackendFactory, ChartConfig, ChartController, LiveSession};
use crate::domain::{
    chart::{IndicatorId, RenderBackend, SurfaceSize},
    events::{ChartEvent, InMemoryEventDispatcher, MarketDataEvent},
    indicators::{IndicatorKind, IndicatorSpec},
    logging::LogComponent,
    market_data::{Symbol, Timeframe},
};
use crate::event_utils::{ContainerWatch, watch_container_resize};
use crate::global_state::globals;
use crate::infrastructure::{
    GlooScheduler, SeriesHttpClient, WasmSpawner, rendering::CanvasBackend,
};
use crate::log_info;
use leptos::SignalSet;
use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

const COMPONENT: LogComponent = LogComponent::Presentation("PriceChart");

type Controller = ChartController<CanvasBackend>;
type Session = LiveSession<CanvasBackend, SeriesHttpClient, GlooScheduler, WasmSpawner>;

fn to_js(e: impl Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Live candlestick chart bound to a `<canvas>` element.
#[wasm_bindgen]
pub struct PriceChart {
    canvas_id: String,
    controller: Rc<RefCell<Controller>>,
    session: Session,
    resize_watch: Option<ContainerWatch>,
}

#[wasm_bindgen]
impl PriceChart {
    /// `configJson` is an optional JSON object with any of `baseUrl`, `pollIntervalMs`,
    /// `fetchTimeoutMs`, `resizeDebounceMs`, `width`, `height`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas_id: String,
        symbol: String,
        timeframe: String,
        config_json: Option<String>,
    ) -> Result<PriceChart, JsValue> {
        let config = match config_json.as_deref() {
            Some(json) => ChartConfig::from_json(json).map_err(to_js)?,
            None => ChartConfig::default(),
        };
        let symbol = Symbol::new(&symbol).map_err(to_js)?;
        let timeframe = Timeframe::parse(&timeframe).map_err(to_js)?;

        let id = canvas_id.clone();
        let factory: BackendFactory<CanvasBackend> =
            Box::new(move |_size| Ok(CanvasBackend::new(id.clone())));
        let mut controller =
            ChartController::new(config.clone(), symbol, timeframe, factory).map_err(to_js)?;
        bind_signals(controller.events_mut());
        publish_parameters(&controller);

        let controller = Rc::new(RefCell::new(controller));
        let session = LiveSession::new(
            Rc::clone(&controller),
            Rc::new(SeriesHttpClient::new(&config)),
            Rc::new(GlooScheduler),
            WasmSpawner,
        );

        log_info!(COMPONENT, "PriceChart bound to #{}", canvas_id);
        Ok(PriceChart {
            canvas_id,
            controller,
            session,
            resize_watch: None,
        })
    }

    /// Starts polling and follows container resizes.
    pub fn start(&mut self) {
        self.session.start();
        if self.resize_watch.is_none() {
            let controller = Rc::clone(&self.controller);
            let debounce = self.controller.borrow().config().resize_debounce_ms;
            self.resize_watch = Some(watch_container_resize(
                &self.canvas_id,
                debounce,
                move |size| apply_resize(&controller, size),
            ));
        }
    }

    #[wasm_bindgen(js_name = setSymbol)]
    pub fn set_symbol(&mut self, symbol: String) -> Result<(), JsValue> {
        let symbol = Symbol::new(&symbol).map_err(to_js)?;
        self.session.set_symbol(symbol);
        publish_parameters(&self.controller.borrow());
        Ok(())
    }

    #[wasm_bindgen(js_name = setTimeframe)]
    pub fn set_timeframe(&mut self, timeframe: String) -> Result<(), JsValue> {
        let timeframe = Timeframe::parse(&timeframe).map_err(to_js)?;
        self.session.set_timeframe(timeframe);
        publish_parameters(&self.controller.borrow());
        Ok(())
    }

    /// Adds an indicator and returns its id. An empty `params` uses the kind's defaults.
    #[wasm_bindgen(js_name = addIndicator)]
    pub fn add_indicator(&mut self, kind: String, params: Vec<u32>) -> Result<f64, JsValue> {
        let kind = IndicatorKind::parse(&kind).map_err(to_js)?;
        let spec = if params.is_empty() {
            IndicatorSpec::default_for(kind)
        } else {
            IndicatorSpec::new(kind, &params).map_err(to_js)?
        };
        let mut controller = self.controller.borrow_mut();
        let id = controller.add_indicator_spec(spec);
        publish_indicators(&controller);
        Ok(id.value() as f64)
    }

    /// Returns `false` for unknown ids.
    #[wasm_bindgen(js_name = removeIndicator)]
    pub fn remove_indicator(&mut self, id: f64) -> bool {
        let mut controller = self.controller.borrow_mut();
        let removed = controller.remove_indicator(IndicatorId::from(id as u64));
        publish_indicators(&controller);
        removed
    }

    #[wasm_bindgen(js_name = listIndicators)]
    pub fn list_indicators(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.controller.borrow().list_indicators()).map_err(to_js)
    }

    #[wasm_bindgen(js_name = latestReadings)]
    pub fn latest_readings(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.controller.borrow().latest_readings()).map_err(to_js)
    }

    #[wasm_bindgen(js_name = isLive)]
    pub fn is_live(&self) -> bool {
        self.controller.borrow().is_live()
    }

    /// One of `idle`, `loading`, `live`, `reconnecting`.
    pub fn state(&self) -> String {
        self.controller.borrow().state().to_string()
    }

    /// Stops polling, disconnects the resize observer and releases the canvas. Idempotent.
    pub fn dispose(&mut self) {
        if let Some(watch) = self.resize_watch.take() {
            watch.stop();
        }
        self.session.dispose();
    }
}

/// Resizes unless the controller is mid-update. Returns whether the size was taken.
fn apply_resize<B: RenderBackend>(controller: &RefCell<ChartController<B>>, size: SurfaceSize) -> bool {
    match controller.try_borrow_mut() {
        Ok(mut controller) => {
            if !controller.is_disposed() {
                controller.resize(size);
            }
            true
        }
        Err(_) => false,
    }
}

/// Mirrors controller events into the status bar signals.
fn bind_signals(events: &mut InMemoryEventDispatcher) {
    events.subscribe_to_chart_events(|event| {
        if let ChartEvent::StateChanged { to, live, .. } = event {
            globals().chart_state.set(*to);
            globals().is_live.set(*live);
        }
    });
    events.subscribe_to_market_data_events(|event| match event {
        MarketDataEvent::SnapshotLoaded { candle_count, .. } => {
            globals().candle_count.set(*candle_count);
            globals().last_error.set(None);
        }
        MarketDataEvent::SnapshotRejected { reason, .. }
        | MarketDataEvent::ConnectionLost { reason, .. } => {
            globals().last_error.set(Some(reason.clone()));
        }
        MarketDataEvent::StaleResponseDiscarded { .. } => {}
    });
}

fn publish_parameters<B: RenderBackend>(controller: &ChartController<B>) {
    globals().symbol.set(controller.symbol().to_string());
    globals().timeframe.set(controller.timeframe().to_string());
    globals().candle_count.set(controller.candles().len());
    publish_indicators(controller);
}

fn publish_indicators<B: RenderBackend>(controller: &ChartController<B>) {
    let labels = controller
        .list_indicators()
        .into_iter()
        .map(|summary| summary.label)
        .collect();
    globals().indicator_labels.set(labels);
}
