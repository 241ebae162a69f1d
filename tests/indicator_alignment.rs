mod common;

use common::{MINUTE_MS, candles_from, rising};
use price_chart_engine::domain::indicators::{
    IndicatorKind, IndicatorSpec, align, compute,
};
use quickcheck_macros::quickcheck;

#[test]
fn sma_points_land_on_the_latest_candles() {
    let candles = rising(10);
    let closes: Vec<f64> = candles.iter().map(|c| c.close()).collect();
    let spec = IndicatorSpec::new(IndicatorKind::Sma, &[3]).unwrap();

    let output = compute(&closes, &spec).unwrap();
    let points = align(&candles, &output.lines[0].values);

    assert_eq!(points.len(), 8);
    assert_eq!(points[0].time.value(), 3 * MINUTE_MS);
    assert_eq!(points[0].value, 11.0);
    assert_eq!(points[7].time, candles[9].timestamp);
    assert_eq!(points[7].value, 18.0);
}

#[test]
fn macd_lines_share_the_last_timestamp() {
    let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
    let candles = candles_from(&closes);
    let spec = IndicatorSpec::default_for(IndicatorKind::Macd);

    let output = compute(&closes, &spec).unwrap();
    assert_eq!(output.len(), 60 - spec.warm_up());
    for line in &output.lines {
        let points = align(&candles, &line.values);
        assert_eq!(points.last().unwrap().time, candles[59].timestamp);
        assert_eq!(points.first().unwrap().time, candles[spec.warm_up()].timestamp);
    }
}

#[test]
fn short_series_yields_empty_output() {
    let closes = [1.0, 2.0, 3.0];
    for kind in [IndicatorKind::Rsi, IndicatorKind::Macd, IndicatorKind::StochRsi] {
        let output = compute(&closes, &IndicatorSpec::default_for(kind)).unwrap();
        assert!(output.is_empty(), "{} should still be warming up", kind);
        assert_eq!(output.lines.len(), kind.series_count());
    }
}

fn spec_from(kind: u8, a: u8, b: u8, c: u8) -> IndicatorSpec {
    let p = |v: u8| u32::from(v % 20) + 1;
    match kind % 5 {
        0 => IndicatorSpec::new(IndicatorKind::Sma, &[p(a)]),
        1 => IndicatorSpec::new(IndicatorKind::Ema, &[p(a)]),
        2 => IndicatorSpec::new(IndicatorKind::Rsi, &[p(a)]),
        3 => IndicatorSpec::new(IndicatorKind::Macd, &[p(a), p(a) + p(b), p(c)]),
        _ => IndicatorSpec::new(IndicatorKind::StochRsi, &[p(a), p(b)]),
    }
    .unwrap()
}

#[quickcheck]
fn output_length_is_input_minus_warm_up(raw: Vec<u16>, kind: u8, a: u8, b: u8, c: u8) -> bool {
    let closes: Vec<f64> = raw.iter().map(|&v| f64::from(v) + 1.0).collect();
    let spec = spec_from(kind, a, b, c);
    let output = compute(&closes, &spec).unwrap();
    let expected = closes.len().saturating_sub(spec.warm_up());
    output.lines.iter().all(|l| l.values.len() == expected)
}

#[quickcheck]
fn recomputing_gives_identical_output(raw: Vec<u16>, kind: u8, a: u8, b: u8, c: u8) -> bool {
    let closes: Vec<f64> = raw.iter().map(|&v| f64::from(v)).collect();
    let spec = spec_from(kind, a, b, c);
    compute(&closes, &spec) == compute(&closes, &spec)
}

#[quickcheck]
fn oscillators_stay_in_range(raw: Vec<u16>, a: u8, b: u8) -> bool {
    let closes: Vec<f64> = raw.iter().map(|&v| f64::from(v)).collect();
    let p = |v: u8| u32::from(v % 20) + 1;
    let in_range = |v: &f64| (0.0..=100.0).contains(v);
    let rsi = compute(&closes, &IndicatorSpec::new(IndicatorKind::Rsi, &[p(a)]).unwrap()).unwrap();
    let stoch =
        compute(&closes, &IndicatorSpec::new(IndicatorKind::StochRsi, &[p(a), p(b)]).unwrap())
            .unwrap();
    rsi.lines[0].values.iter().all(in_range)
        && stoch.lines.iter().all(|l| l.values.iter().all(in_range))
}
