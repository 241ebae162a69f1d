//! Pure indicator strategies.
//!
//! Every function maps a close series to output lines whose values pair with the most recent
//! candles. Inputs shorter than the warm-up produce empty lines.

use super::spec::{IndicatorKind, STOCH_SMOOTHING};

/// Output lines of one strategy run, before naming.
pub type Lines = Vec<Vec<f64>>;

pub type StrategyFn = fn(&[f64], &[u32]) -> Lines;

/// Dispatch table from kind to computation.
pub static STRATEGIES: [(IndicatorKind, StrategyFn); 5] = [
    (IndicatorKind::Sma, run_sma),
    (IndicatorKind::Ema, run_ema),
    (IndicatorKind::Rsi, run_rsi),
    (IndicatorKind::Macd, run_macd),
    (IndicatorKind::StochRsi, run_stoch_rsi),
];

pub fn strategy_for(kind: IndicatorKind) -> Option<StrategyFn> {
    STRATEGIES.iter().find(|(k, _)| *k == kind).map(|(_, f)| *f)
}

fn run_sma(closes: &[f64], p: &[u32]) -> Lines {
    vec![sma(closes, p[0] as usize)]
}

fn run_ema(closes: &[f64], p: &[u32]) -> Lines {
    vec![ema(closes, p[0] as usize)]
}

fn run_rsi(closes: &[f64], p: &[u32]) -> Lines {
    vec![rsi(closes, p[0] as usize)]
}

fn run_macd(closes: &[f64], p: &[u32]) -> Lines {
    macd(closes, p[0] as usize, p[1] as usize, p[2] as usize)
}

fn run_stoch_rsi(closes: &[f64], p: &[u32]) -> Lines {
    stoch_rsi(closes, p[0] as usize, p[1] as usize)
}

/// Trailing arithmetic mean. Warm-up `period - 1`.
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }
    values
        .windows(period)
        .map(|w| w.iter().sum::<f64>() / period as f64)
        .collect()
}

/// Exponential average with `alpha = 2 / (period + 1)`, seeded by the SMA of the first
/// `period` values. Warm-up `period - 1`.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }
    let alpha = 2.0 / (period as f64 + 1.0);
    let seed = values[..period].iter().sum::<f64>() / period as f64;

    let mut out = Vec::with_capacity(values.len() - period + 1);
    out.push(seed);
    let mut prev = seed;
    for &v in &values[period..] {
        prev = alpha * v + (1.0 - alpha) * prev;
        out.push(prev);
    }
    out
}

/// Wilder RSI. The first value sits on candle `period`, so warm-up is `period`.
pub fn rsi(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() <= period {
        return Vec::new();
    }
    let changes: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    let n = period as f64;

    let mut avg_gain = changes[..period].iter().map(|c| c.max(0.0)).sum::<f64>() / n;
    let mut avg_loss = changes[..period].iter().map(|c| (-c).max(0.0)).sum::<f64>() / n;

    let mut out = Vec::with_capacity(changes.len() - period + 1);
    out.push(rsi_value(avg_gain, avg_loss));
    for &change in &changes[period..] {
        avg_gain = (avg_gain * (n - 1.0) + change.max(0.0)) / n;
        avg_loss = (avg_loss * (n - 1.0) + (-change).max(0.0)) / n;
        out.push(rsi_value(avg_gain, avg_loss));
    }
    out
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return if avg_gain == 0.0 { 50.0 } else { 100.0 };
    }
    100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
}

/// MACD, signal and histogram, trimmed to the signal line's length.
pub fn macd(values: &[f64], fast: usize, slow: usize, signal: usize) -> Lines {
    let empty = || vec![Vec::new(), Vec::new(), Vec::new()];
    let slow_line = ema(values, slow);
    if slow_line.is_empty() {
        return empty();
    }
    let fast_line = ema(values, fast);
    let offset = fast_line.len() - slow_line.len();
    let macd_line: Vec<f64> = slow_line
        .iter()
        .zip(&fast_line[offset..])
        .map(|(s, f)| f - s)
        .collect();

    let signal_line = ema(&macd_line, signal);
    if signal_line.is_empty() {
        return empty();
    }
    let macd_line = take_last(&macd_line, signal_line.len());
    let histogram = macd_line
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| m - s)
        .collect();
    vec![macd_line, signal_line, histogram]
}

/// %K and %D of the stochastic oscillator applied to RSI.
pub fn stoch_rsi(values: &[f64], rsi_period: usize, stoch_period: usize) -> Lines {
    let rsi_line = rsi(values, rsi_period);
    let stoch: Vec<f64> = if stoch_period == 0 || rsi_line.len() < stoch_period {
        Vec::new()
    } else {
        rsi_line.windows(stoch_period).map(stochastic).collect()
    };

    let k = sma(&stoch, STOCH_SMOOTHING);
    let d = sma(&k, STOCH_SMOOTHING);
    if d.is_empty() {
        return vec![Vec::new(), Vec::new()];
    }
    vec![take_last(&k, d.len()), d]
}

/// Position of the last value inside the window range, 0..=100. Flat windows read 50.
fn stochastic(window: &[f64]) -> f64 {
    let (min, max) = window
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let last = window[window.len() - 1];
    if max == min {
        50.0
    } else {
        100.0 * (last - min) / (max - min)
    }
}

fn take_last(values: &[f64], len: usize) -> Vec<f64> {
    values[values.len() - len..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn sma_trailing_window() {
        let out = sma(&[1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(out, vec![1.5, 2.5, 3.5]);
    }

    #[test]
    fn ema_seeds_with_sma() {
        let out = ema(&[2.0, 4.0, 6.0, 8.0], 3);
        assert_eq!(out.len(), 2);
        assert!(approx(out[0], 4.0));
        // alpha = 0.5
        assert!(approx(out[1], 6.0));
    }

    #[test]
    fn rsi_monotonic_rise_saturates() {
        let values: Vec<f64> = (0..20).map(f64::from).collect();
        let out = rsi(&values, 14);
        assert_eq!(out.len(), 6);
        assert!(out.iter().all(|&v| approx(v, 100.0)));
    }

    #[test]
    fn rsi_flat_series_is_neutral() {
        let out = rsi(&[5.0; 10], 3);
        assert!(out.iter().all(|&v| approx(v, 50.0)));
    }

    #[test]
    fn rsi_stays_in_range() {
        let values = [44.0, 44.3, 44.1, 43.6, 44.3, 44.8, 45.1, 45.4, 45.8, 46.0, 45.9, 46.2];
        let out = rsi(&values, 5);
        assert_eq!(out.len(), values.len() - 5);
        assert!(out.iter().all(|v| (0.0..=100.0).contains(v)));
    }

    #[test]
    fn macd_lines_share_length() {
        let values: Vec<f64> = (0..40).map(|i| (i as f64 * 0.3).sin() * 10.0 + 50.0).collect();
        let lines = macd(&values, 3, 6, 4);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].len(), 40 - (6 + 4 - 2));
        assert!(lines.iter().all(|l| l.len() == lines[0].len()));
        for i in 0..lines[0].len() {
            assert!(approx(lines[2][i], lines[0][i] - lines[1][i]));
        }
    }

    #[test]
    fn stoch_rsi_flat_window_reads_fifty() {
        let lines = stoch_rsi(&[1.0; 20], 3, 3);
        assert_eq!(lines[1].len(), 20 - (3 + 3 + 3));
        assert!(lines.iter().flatten().all(|&v| approx(v, 50.0)));
    }

    #[test]
    fn every_kind_has_a_strategy() {
        let closes: Vec<f64> = (1..=10).map(f64::from).collect();
        for (kind, _) in STRATEGIES.iter() {
            let params: Vec<u32> = match kind {
                IndicatorKind::Macd => vec![2, 3, 2],
                _ => vec![2; kind.param_count()],
            };
            let f = strategy_for(*kind).unwrap();
            assert_eq!(f(&closes, &params).len(), kind.series_count());
        }
    }
}
