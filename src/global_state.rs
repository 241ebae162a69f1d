use crate::domain::state::ChartState;
use leptos::*;
use once_cell::sync::OnceCell;

/// Reactive mirror of the most recently active chart, read by the status widgets.
pub struct Globals {
    pub chart_state: RwSignal<ChartState>,
    pub is_live: RwSignal<bool>,
    pub symbol: RwSignal<String>,
    pub timeframe: RwSignal<String>,
    pub candle_count: RwSignal<usize>,
    pub indicator_labels: RwSignal<Vec<String>>,
    pub last_error: RwSignal<Option<String>>,
}

static GLOBALS: OnceCell<Globals> = OnceCell::new();

pub fn globals() -> &'static Globals {
    GLOBALS.get_or_init(|| Globals {
        chart_state: create_rw_signal(ChartState::Idle),
        is_live: create_rw_signal(false),
        symbol: create_rw_signal(String::new()),
        timeframe: create_rw_signal(String::new()),
        candle_count: create_rw_signal(0),
        indicator_labels: create_rw_signal(Vec::new()),
        last_error: create_rw_signal(None),
    })
}

crate::global_signals! {
    pub chart_state => chart_state: ChartState,
    pub is_live => is_live: bool,
    pub current_symbol => symbol: String,
    pub current_timeframe => timeframe: String,
    pub candle_count => candle_count: usize,
    pub indicator_labels => indicator_labels: Vec<String>,
    pub last_error => last_error: Option<String>,
}
