#![allow(dead_code)]

use price_chart_engine::application::{BackendFactory, ChartConfig, ChartController};
use price_chart_engine::domain::market_data::{
    Candle, OHLCV, Price, Symbol, Timeframe, Timestamp, Volume,
};
use price_chart_engine::infrastructure::rendering::{HeadlessBackend, Journal};
use std::cell::Cell;
use std::rc::Rc;

pub const MINUTE_MS: u64 = 60_000;

pub fn make_candle(i: u64, close: f64) -> Candle {
    Candle::new(
        Timestamp::from_millis((i + 1) * MINUTE_MS),
        OHLCV::new(
            Price::from(close - 0.5),
            Price::from(close + 1.0),
            Price::from(close - 1.0),
            Price::from(close),
            Volume::from(10.0 + i as f64),
        ),
    )
}

pub fn candles_from(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_candle(i as u64, c))
        .collect()
}

/// Closes 10, 11, ... for `n` candles.
pub fn rising(n: usize) -> Vec<Candle> {
    let closes: Vec<f64> = (0..n).map(|i| 10.0 + i as f64).collect();
    candles_from(&closes)
}

pub fn btc() -> Symbol {
    Symbol::new("BTCUSDT").unwrap()
}

/// Factory whose backends number themselves 1, 2, ... and share one journal.
pub fn journaled_factory(journal: &Journal) -> BackendFactory<HeadlessBackend> {
    let journal = Rc::clone(journal);
    let counter = Rc::new(Cell::new(0));
    Box::new(move |_size| {
        counter.set(counter.get() + 1);
        Ok(HeadlessBackend::new(counter.get(), Rc::clone(&journal)))
    })
}

pub fn headless_controller() -> (ChartController<HeadlessBackend>, Journal) {
    let journal = Journal::default();
    let controller = ChartController::new(
        ChartConfig::default(),
        btc(),
        Timeframe::OneHour,
        journaled_factory(&journal),
    )
    .unwrap();
    (controller, journal)
}

/// Starts a session and applies `candles` as its first snapshot.
pub fn loaded_controller(candles: Vec<Candle>) -> (ChartController<HeadlessBackend>, Journal) {
    let (mut controller, journal) = headless_controller();
    let ticket = controller.begin_session();
    controller.apply_fetch(&ticket, Ok(candles));
    (controller, journal)
}
