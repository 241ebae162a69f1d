#![cfg(target_arch = "wasm32")]

use price_chart_engine::PriceChart;
use price_chart_engine::application::RenderSurface;
use price_chart_engine::domain::chart::SurfaceSize;
use price_chart_engine::domain::market_data::{Candle, OHLCV, Price, Timestamp, Volume};
use price_chart_engine::event_utils::{ContainerWatch, watch_container_resize};
use price_chart_engine::infrastructure::rendering::CanvasBackend;
use gloo_timers::future::TimeoutFuture;
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn mount_canvas(id: &str) {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas = document
        .create_element("canvas")
        .unwrap()
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .unwrap();
    canvas.set_id(id);
    document.body().unwrap().append_child(&canvas).unwrap();
}

fn candles(n: u64) -> Rc<[Candle]> {
    (0..n)
        .map(|i| {
            let close = 100.0 + (i % 7) as f64;
            Candle::new(
                Timestamp::from_millis(i * 60_000),
                OHLCV::new(
                    Price::from(close - 1.0),
                    Price::from(close + 2.0),
                    Price::from(close - 2.0),
                    Price::from(close),
                    Volume::from(5.0),
                ),
            )
        })
        .collect()
}

#[wasm_bindgen_test]
fn canvas_backend_draws_and_resizes() {
    mount_canvas("smoke-canvas");
    let mut surface =
        RenderSurface::mount(CanvasBackend::new("smoke-canvas"), SurfaceSize::new(300, 200))
            .unwrap();
    surface.push_candles(candles(50)).unwrap();
    surface.request_resize(SurfaceSize::new(400, 250)).unwrap();
    assert_eq!(surface.size(), SurfaceSize::new(400, 250));

    surface.dispose();
    assert!(surface.is_disposed());
}

#[wasm_bindgen_test]
fn price_chart_rejects_bad_arguments() {
    mount_canvas("api-canvas");
    assert!(PriceChart::new("api-canvas".into(), " ".into(), "1h".into(), None).is_err());
    assert!(PriceChart::new("api-canvas".into(), "BTCUSDT".into(), "7m".into(), None).is_err());

    let mut chart =
        PriceChart::new("api-canvas".into(), "BTCUSDT".into(), "1h".into(), None).unwrap();
    assert!(chart.add_indicator("MACD".into(), vec![26, 12, 9]).is_err());
    let id = chart.add_indicator("rsi".into(), vec![]).unwrap();
    assert!(chart.list_indicators().unwrap().contains("RSI(14)"));
    assert!(chart.remove_indicator(id));
    assert_eq!(chart.state(), "idle");
    chart.dispose();
}

#[wasm_bindgen_test]
async fn container_layout_change_reflows_without_window_resize() {
    let document = web_sys::window().unwrap().document().unwrap();
    let container = document.create_element("div").unwrap();
    container.set_attribute("style", "width:480px;height:180px").unwrap();
    document.body().unwrap().append_child(&container).unwrap();
    let canvas = document.create_element("canvas").unwrap();
    canvas.set_id("observed-canvas");
    container.append_child(&canvas).unwrap();

    let settled = Rc::new(Cell::new(None));
    let sink = Rc::clone(&settled);
    let watch = watch_container_resize("observed-canvas", 20, move |size| {
        sink.set(Some(size));
        true
    });
    assert!(matches!(watch, ContainerWatch::Observer { .. }));

    container.set_attribute("style", "width:320px;height:180px").unwrap();
    TimeoutFuture::new(250).await;
    assert_eq!(settled.get(), Some(SurfaceSize::new(320, 180)));

    watch.stop();
    container.set_attribute("style", "width:200px;height:180px").unwrap();
    TimeoutFuture::new(250).await;
    assert_eq!(settled.get(), Some(SurfaceSize::new(320, 180)));
}
