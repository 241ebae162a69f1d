mod common;

use common::{candles_from, loaded_controller, rising};
use price_chart_engine::domain::chart::{Placement, PriceScaleId, SeriesData};
use price_chart_engine::domain::errors::ConfigError;
use price_chart_engine::domain::events::ChartEvent;
use price_chart_engine::domain::state::ChartState;
use price_chart_engine::domain::indicators::IndicatorKind;
use price_chart_engine::infrastructure::rendering::BackendCall;
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn macd_with_fast_above_slow_is_rejected_without_side_effects() {
    let (mut controller, journal) = loaded_controller(rising(50));
    controller.add_indicator(IndicatorKind::Sma, &[5]).unwrap();
    let before = controller.list_indicators();
    let calls_before = journal.borrow().len();

    let err = controller
        .add_indicator(IndicatorKind::Macd, &[26, 12, 9])
        .unwrap_err();

    assert_eq!(err, ConfigError::FastNotBelowSlow { fast: 26, slow: 12 });
    assert_eq!(controller.list_indicators(), before);
    assert_eq!(journal.borrow().len(), calls_before);
    assert_eq!(controller.active_panes(), 0);
}

#[test]
fn wrong_parameter_count_is_rejected() {
    let (mut controller, _) = loaded_controller(rising(50));
    let err = controller.add_indicator(IndicatorKind::StochRsi, &[14]).unwrap_err();
    assert_eq!(
        err,
        ConfigError::WrongParamCount {
            kind: IndicatorKind::StochRsi,
            expected: 2,
            got: 1
        }
    );
    assert!(controller.list_indicators().is_empty());
}

#[test]
fn warming_up_indicator_is_listed_with_no_points() {
    let (mut controller, _) = loaded_controller(rising(10));
    let id = controller.add_indicator(IndicatorKind::Rsi, &[14]).unwrap();

    let listed = controller.list_indicators();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, id.value());
    assert_eq!(listed[0].points, 0);
    assert_eq!(listed[0].failure, None);

    let instance = controller.indicator(id).unwrap();
    let surface = controller.surface().unwrap();
    let data = surface.backend_ref().unwrap().data(instance.series[0]).unwrap();
    assert!(data.is_empty());
}

#[test]
fn each_oscillator_gets_its_own_pane() {
    let (mut controller, _) = loaded_controller(rising(60));
    let first = controller.add_indicator(IndicatorKind::Rsi, &[14]).unwrap();
    let second = controller.add_indicator(IndicatorKind::Rsi, &[14]).unwrap();
    let overlay = controller.add_indicator(IndicatorKind::Ema, &[9]).unwrap();

    let placement = |id| controller.indicator(id).unwrap().placement;
    let (Placement::Oscillator(a), Placement::Oscillator(b)) = (placement(first), placement(second))
    else {
        panic!("RSI must be placed in a pane");
    };
    assert_ne!(a, b);
    assert_eq!(placement(overlay), Placement::Overlay);
    assert_eq!(controller.active_panes(), 2);

    let backend = controller.surface().unwrap().backend_ref().unwrap();
    let scale_of = |id| {
        let series = controller.indicator(id).unwrap().series[0];
        backend.style(series).unwrap().scale
    };
    assert_eq!(scale_of(first), PriceScaleId::Pane(a));
    assert_eq!(scale_of(second), PriceScaleId::Pane(b));
    assert_eq!(scale_of(overlay), PriceScaleId::Main);
}

#[test]
fn removing_one_rsi_leaves_the_other_drawn() {
    let (mut controller, journal) = loaded_controller(rising(60));
    let first = controller.add_indicator(IndicatorKind::Rsi, &[14]).unwrap();
    let second = controller.add_indicator(IndicatorKind::Rsi, &[14]).unwrap();
    let removed_series = controller.indicator(first).unwrap().series.clone();
    let kept_series = controller.indicator(second).unwrap().series[0];

    assert!(controller.remove_indicator(first));

    let calls = journal.borrow();
    for id in &removed_series {
        assert!(calls.contains(&BackendCall::Remove { surface: 1, id: *id }));
    }
    assert!(!calls.contains(&BackendCall::Remove { surface: 1, id: kept_series }));
    drop(calls);

    let backend = controller.surface().unwrap().backend_ref().unwrap();
    assert!(!backend.data(kept_series).unwrap().is_empty());
    assert_eq!(controller.active_panes(), 1);
    assert_eq!(controller.list_indicators().len(), 1);
}

#[test]
fn removing_unknown_indicator_is_a_no_op() {
    let (mut controller, journal) = loaded_controller(rising(30));
    let id = controller.add_indicator(IndicatorKind::Sma, &[3]).unwrap();
    assert!(controller.remove_indicator(id));
    let calls = journal.borrow().len();

    assert!(!controller.remove_indicator(id));
    assert_eq!(journal.borrow().len(), calls);
}

#[test]
fn macd_histogram_is_drawn_as_bars() {
    let (mut controller, _) = loaded_controller(rising(80));
    let id = controller.add_indicator(IndicatorKind::Macd, &[12, 26, 9]).unwrap();
    let instance = controller.indicator(id).unwrap();
    assert_eq!(instance.series.len(), 3);

    let backend = controller.surface().unwrap().backend_ref().unwrap();
    match backend.data(instance.series[2]).unwrap() {
        SeriesData::Bars(bars) => assert_eq!(bars.len(), 80 - 33),
        other => panic!("expected bars, got {:?}", other),
    }
    assert!(matches!(
        backend.data(instance.series[0]).unwrap(),
        SeriesData::Points(p) if p.len() == 80 - 33
    ));
}

#[test]
fn readings_report_the_newest_value_per_line() {
    let (mut controller, _) = loaded_controller(rising(20));
    controller.add_indicator(IndicatorKind::Sma, &[3]).unwrap();
    controller.add_indicator(IndicatorKind::StochRsi, &[3, 3]).unwrap();

    let readings = controller.latest_readings();
    let last_time = controller.candles().last().unwrap().timestamp.value();
    assert!(readings.iter().all(|r| r.time == last_time));

    let sma = readings.iter().find(|r| r.line == "sma").unwrap();
    assert_eq!(sma.value, 28.0);
    assert_eq!(sma.label, "SMA(3)");
    let lines: Vec<&str> = readings.iter().map(|r| r.line).collect();
    assert_eq!(lines, ["sma", "k", "d"]);
}

#[test]
fn indicator_labels_snapshot() {
    let (mut controller, _) = loaded_controller(rising(40));
    controller.add_indicator(IndicatorKind::Sma, &[20]).unwrap();
    controller.add_indicator(IndicatorKind::Macd, &[12, 26, 9]).unwrap();
    controller.add_indicator(IndicatorKind::StochRsi, &[14, 14]).unwrap();

    let labels: Vec<String> = controller
        .list_indicators()
        .into_iter()
        .map(|s| s.label)
        .collect();
    insta::assert_json_snapshot!(labels, @r###"
    [
      "SMA(20)",
      "MACD(12, 26, 9)",
      "StochRSI(14, 14)"
    ]
    "###);
}

#[test]
fn overflowing_indicator_fails_alone() {
    let (mut controller, _) = loaded_controller(candles_from(&[1e308; 4]));
    let failed = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&failed);
    controller.events_mut().subscribe_to_chart_events(move |event| {
        if let ChartEvent::IndicatorFailed { id, .. } = event {
            sink.borrow_mut().push(*id);
        }
    });

    let broken = controller.add_indicator(IndicatorKind::Sma, &[2]).unwrap();
    let healthy = controller.add_indicator(IndicatorKind::Sma, &[1]).unwrap();

    let summaries = controller.list_indicators();
    assert!(summaries[0].failure.as_deref().unwrap().contains("not finite"));
    assert_eq!(summaries[0].points, 0);
    assert_eq!(summaries[1].failure, None);
    assert_eq!(summaries[1].points, 4);
    assert_eq!(*failed.borrow(), vec![broken]);

    let surface = controller.surface().unwrap();
    let backend = surface.backend_ref().unwrap();
    let healthy_series = controller.indicator(healthy).unwrap().series[0];
    let broken_series = controller.indicator(broken).unwrap().series[0];
    assert_eq!(backend.data(healthy_series).unwrap().len(), 4);
    assert!(backend.data(broken_series).unwrap().is_empty());
    assert_eq!(backend.data(surface.base_series().0).unwrap().len(), 4);
    assert_eq!(controller.state(), ChartState::Live);

    let ticket = controller.next_tick().unwrap();
    controller.apply_fetch(&ticket, Ok(candles_from(&[1e308; 5])));
    assert_eq!(*failed.borrow(), vec![broken]);
    assert_eq!(controller.list_indicators()[1].points, 5);

    let ticket = controller.next_tick().unwrap();
    controller.apply_fetch(&ticket, Ok(rising(6)));
    assert_eq!(controller.list_indicators()[0].failure, None);
    assert_eq!(controller.list_indicators()[0].points, 5);
}
