use crate::domain::state::ChartState;
use crate::global_state::{
    candle_count, chart_state, current_symbol, current_timeframe, indicator_labels, is_live,
    last_error,
};
use leptos::*;

/// Text of the connection badge.
pub fn badge_text(state: ChartState, live: bool) -> &'static str {
    match (state, live) {
        (ChartState::Live, true) => "LIVE",
        (ChartState::Loading, _) => "LOADING",
        (ChartState::Reconnecting, _) => "RECONNECTING",
        (ChartState::Idle, _) => "IDLE",
        (ChartState::Live, false) => "STALE",
    }
}

#[component]
pub fn ChartStatusBar() -> impl IntoView {
    view! {
        <style>
            {r#"
            .chart-status {
                display: flex;
                gap: 16px;
                align-items: center;
                font-family: -apple-system, BlinkMacSystemFont, sans-serif;
                font-size: 12px;
                color: #d1d4dc;
                background: #131722;
                padding: 6px 12px;
            }
            .live-badge { padding: 2px 8px; border-radius: 4px; background: #2a2e39; }
            .live-badge.on { background: #26a69a; color: #131722; }
            .indicator-legend span { margin-right: 10px; }
            .chart-error { color: #ef5350; }
            "#}
        </style>
        <div class="chart-status">
            <LiveBadge/>
            <span>{move || format!("{} · {}", current_symbol().get(), current_timeframe().get())}</span>
            <span>{move || format!("{} candles", candle_count().get())}</span>
            <IndicatorLegend/>
            <span class="chart-error">{move || last_error().get().unwrap_or_default()}</span>
        </div>
    }
}

#[component]
fn LiveBadge() -> impl IntoView {
    view! {
        <span class="live-badge" class:on=move || is_live().get()>
            {move || badge_text(chart_state().get(), is_live().get())}
        </span>
    }
}

#[component]
fn IndicatorLegend() -> impl IntoView {
    view! {
        <div class="indicator-legend">
            <For
                each=move || indicator_labels().get().into_iter().enumerate()
                key=|(index, label)| (*index, label.clone())
                children=|(_, label)| view! { <span>{label}</span> }
            />
        </div>
    }
}

/// Mounts the status bar at the end of `<body>`.
pub fn mount_status_bar() {
    mount_to_body(|| view! { <ChartStatusBar/> });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn badge_follows_state() {
        assert_eq!(badge_text(ChartState::Live, true), "LIVE");
        assert_eq!(badge_text(ChartState::Reconnecting, false), "RECONNECTING");
        assert_eq!(badge_text(ChartState::Loading, false), "LOADING");
        assert_eq!(badge_text(ChartState::Idle, false), "IDLE");
    }
}
