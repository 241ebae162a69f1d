use serde::Serialize;
use strum::{AsRefStr, Display};

/// Lifecycle of a chart session.
///
/// `Idle` until the first session starts, `Loading` while the first snapshot for the current
/// parameters is outstanding, `Live` while the feed is healthy and `Reconnecting` after a
/// failed fetch, with last-known data still on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ChartState {
    Idle,
    Loading,
    Live,
    Reconnecting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateTrigger {
    SessionStarted,
    ParametersChanged,
    FetchSucceeded,
    FetchFailed,
    Disposed,
}

impl ChartState {
    pub fn next(self, trigger: StateTrigger) -> ChartState {
        use ChartState::*;
        use StateTrigger::*;
        match (self, trigger) {
            (_, Disposed) => Idle,
            (_, SessionStarted) => Loading,
            (Idle, _) => Idle,
            (_, ParametersChanged) => Loading,
            (_, FetchSucceeded) => Live,
            (_, FetchFailed) => Reconnecting,
        }
    }
}
