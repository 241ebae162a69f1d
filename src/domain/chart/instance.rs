use super::pane::Placement;
use super::value_objects::{IndicatorId, SeriesId};
use crate::domain::errors::ComputeError;
use crate::domain::indicators::{IndicatorKind, IndicatorOutput, IndicatorSpec};
use serde::Serialize;

/// An indicator the user added to the chart.
///
/// Holds copies of its series ids only; the render surface owns the series themselves.
#[derive(Debug, Clone)]
pub struct IndicatorInstance {
    pub id: IndicatorId,
    pub spec: IndicatorSpec,
    pub placement: Placement,
    pub series: Vec<SeriesId>,
    pub output: IndicatorOutput,
    pub failure: Option<ComputeError>,
}

impl IndicatorInstance {
    pub fn new(id: IndicatorId, spec: IndicatorSpec, placement: Placement) -> Self {
        Self {
            id,
            spec,
            placement,
            series: Vec::new(),
            output: IndicatorOutput::default(),
            failure: None,
        }
    }

    pub fn kind(&self) -> IndicatorKind {
        self.spec.kind()
    }

    pub fn summary(&self) -> IndicatorSummary {
        IndicatorSummary {
            id: self.id.value(),
            label: self.spec.label(),
            kind: self.kind(),
            params: self.spec.params().to_vec(),
            pane: self.placement.pane().map(|p| p.value()),
            points: self.output.len(),
            failure: self.failure.as_ref().map(ToString::to_string),
        }
    }
}

/// Host-facing description of an active indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSummary {
    pub id: u64,
    pub label: String,
    pub kind: IndicatorKind,
    pub params: Vec<u32>,
    pub pane: Option<u64>,
    pub points: usize,
    pub failure: Option<String>,
}

/// Most recent value of one indicator line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorReading {
    pub id: u64,
    pub label: String,
    pub line: &'static str,
    pub time: u64,
    pub value: f64,
}
