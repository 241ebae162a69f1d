use crate::domain::chart::{IndicatorId, SurfaceSize};
use crate::domain::market_data::{Symbol, Timeframe};
use crate::domain::logging::LogComponent;
use crate::domain::state::ChartState;
use crate::log_debug;
use std::fmt::Debug;

pub trait DomainEvent: Debug + Clone {
    fn event_type(&self) -> &'static str;
}

#[derive(Debug, Clone, PartialEq)]
pub enum MarketDataEvent {
    SnapshotLoaded {
        symbol: Symbol,
        timeframe: Timeframe,
        candle_count: usize,
    },
    SnapshotRejected {
        symbol: Symbol,
        reason: String,
    },
    StaleResponseDiscarded {
        symbol: Symbol,
        timeframe: Timeframe,
    },
    ConnectionLost {
        symbol: Symbol,
        reason: String,
    },
}

impl DomainEvent for MarketDataEvent {
    fn event_type(&self) -> &'static str {
        match self {
            Self::SnapshotLoaded { .. } => "SnapshotLoaded",
            Self::SnapshotRejected { .. } => "SnapshotRejected",
            Self::StaleResponseDiscarded { .. } => "StaleResponseDiscarded",
            Self::ConnectionLost { .. } => "ConnectionLost",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartEvent {
    StateChanged {
        from: ChartState,
        to: ChartState,
        live: bool,
    },
    IndicatorAdded {
        id: IndicatorId,
        label: String,
    },
    IndicatorRemoved {
        id: IndicatorId,
    },
    IndicatorFailed {
        id: IndicatorId,
        reason: String,
    },
    SurfaceRebuilt {
        symbol: Symbol,
    },
    Resized {
        size: SurfaceSize,
    },
}

impl DomainEvent for ChartEvent {
    fn event_type(&self) -> &'static str {
        match self {
            Self::StateChanged { .. } => "StateChanged",
            Self::IndicatorAdded { .. } => "IndicatorAdded",
            Self::IndicatorRemoved { .. } => "IndicatorRemoved",
            Self::IndicatorFailed { .. } => "IndicatorFailed",
            Self::SurfaceRebuilt { .. } => "SurfaceRebuilt",
            Self::Resized { .. } => "Resized",
        }
    }
}

pub trait EventDispatcher {
    fn publish_market_data_event(&self, event: MarketDataEvent);
    fn publish_chart_event(&self, event: ChartEvent);
}

/// Synchronous fan-out to registered handlers, in subscription order.
#[derive(Default)]
pub struct InMemoryEventDispatcher {
    market_data_handlers: Vec<Box<dyn Fn(&MarketDataEvent)>>,
    chart_handlers: Vec<Box<dyn Fn(&ChartEvent)>>,
}

impl InMemoryEventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe_to_market_data_events<F>(&mut self, handler: F)
    where
        F: Fn(&MarketDataEvent) + 'static,
    {
        self.market_data_handlers.push(Box::new(handler));
    }

    pub fn subscribe_to_chart_events<F>(&mut self, handler: F)
    where
        F: Fn(&ChartEvent) + 'static,
    {
        self.chart_handlers.push(Box::new(handler));
    }
}

impl EventDispatcher for InMemoryEventDispatcher {
    fn publish_market_data_event(&self, event: MarketDataEvent) {
        log_debug!(LogComponent::Domain("Events"), "{}", event.event_type());
        for handler in &self.market_data_handlers {
            handler(&event);
        }
    }

    fn publish_chart_event(&self, event: ChartEvent) {
        log_debug!(LogComponent::Domain("Events"), "{}", event.event_type());
        for handler in &self.chart_handlers {
            handler(&event);
        }
    }
}
