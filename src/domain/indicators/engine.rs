use super::spec::IndicatorSpec;
use super::strategies::strategy_for;
use crate::domain::errors::ComputeError;
use crate::domain::market_data::{Candle, Timestamp};
use serde::Serialize;
use std::collections::HashMap;

/// One named output line, aligned to the most recent candles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorLine {
    pub name: &'static str,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct IndicatorOutput {
    pub lines: Vec<IndicatorLine>,
}

impl IndicatorOutput {
    /// Shared length of every line. Zero during warm-up.
    pub fn len(&self) -> usize {
        self.lines.first().map_or(0, |l| l.values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn line(&self, name: &str) -> Option<&IndicatorLine> {
        self.lines.iter().find(|l| l.name == name)
    }
}

/// A value placed on the chart's time axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimePoint {
    pub time: Timestamp,
    pub value: f64,
}

/// Runs a strategy and checks that every value is plottable.
pub fn compute(closes: &[f64], spec: &IndicatorSpec) -> Result<IndicatorOutput, ComputeError> {
    let kind = spec.kind();
    let raw = strategy_for(kind).map_or_else(Vec::new, |f| f(closes, spec.params()));

    let mut lines = Vec::with_capacity(kind.series_count());
    for (i, &name) in kind.line_names().iter().enumerate() {
        let values = raw.get(i).cloned().unwrap_or_default();
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(ComputeError { kind, line: name, index });
        }
        lines.push(IndicatorLine { name, values });
    }
    Ok(IndicatorOutput { lines })
}

/// Pairs values with candles right to left: the last value sits on the last candle.
pub fn align(candles: &[Candle], values: &[f64]) -> Vec<TimePoint> {
    let values = &values[values.len().saturating_sub(candles.len())..];
    let offset = candles.len() - values.len();
    candles[offset..]
        .iter()
        .zip(values)
        .map(|(candle, &value)| TimePoint {
            time: candle.timestamp,
            value,
        })
        .collect()
}

/// Indicator computation with a per-snapshot memo.
///
/// Results are keyed by spec and valid for a single store version, so repeated
/// computations on an unchanged snapshot (duplicate instances, surface rebuilds) are free.
#[derive(Debug, Default)]
pub struct IndicatorEngine {
    version: Option<u64>,
    memo: HashMap<IndicatorSpec, Result<IndicatorOutput, ComputeError>>,
}

impl IndicatorEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compute(
        &mut self,
        version: u64,
        closes: &[f64],
        spec: &IndicatorSpec,
    ) -> Result<IndicatorOutput, ComputeError> {
        if self.version != Some(version) {
            self.memo.clear();
            self.version = Some(version);
        }
        self.memo
            .entry(spec.clone())
            .or_insert_with(|| compute(closes, spec))
            .clone()
    }
}
