//! Chart aggregate: panes, indicator instances and the drawing port.

pub mod instance;
pub mod pane;
pub mod series;
pub mod value_objects;

pub use instance::{IndicatorInstance, IndicatorReading, IndicatorSummary};
pub use pane::{PaneAllocator, Placement};
pub use series::{HistogramBar, RenderBackend, SeriesData, SeriesKind, SeriesStyle};
pub use value_objects::*;
