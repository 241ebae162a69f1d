//! Technical indicators: validated specs, pure strategies and the memoizing engine.

pub mod engine;
pub mod spec;
pub mod strategies;

pub use engine::{IndicatorEngine, IndicatorLine, IndicatorOutput, TimePoint, align, compute};
pub use spec::{IndicatorKind, IndicatorSpec};
