use crate::application::config::ChartConfig;
use crate::domain::{
    errors::FeedError,
    logging::LogComponent,
    market_data::{Candle, MarketDataRepository, Symbol, Timeframe},
};
use crate::infrastructure::dto::parse_series;
use crate::{log_debug, log_warn};
use futures::future::{Either, FutureExt, select};
use gloo::net::http::Request;
use gloo_timers::future::TimeoutFuture;

const COMPONENT: LogComponent = LogComponent::Infrastructure("SeriesHttpClient");

/// `GET {base}/series?symbol=..&timeframe=..` with a transport timeout.
#[derive(Debug, Clone)]
pub struct SeriesHttpClient {
    url: String,
    timeout_ms: u32,
}

impl SeriesHttpClient {
    pub fn new(config: &ChartConfig) -> Self {
        Self {
            url: config.series_url(),
            timeout_ms: config.fetch_timeout_ms,
        }
    }

    async fn request(&self, symbol: &Symbol, timeframe: Timeframe) -> Result<Vec<Candle>, FeedError> {
        let response = Request::get(&self.url)
            .query([("symbol", symbol.value()), ("timeframe", timeframe.as_query())])
            .send()
            .await
            .map_err(|e| FeedError::Transport(e.to_string()))?;

        if !response.ok() {
            return Err(FeedError::Http {
                status: response.status(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FeedError::Malformed(e.to_string()))?;
        parse_series(&body)
    }
}

impl MarketDataRepository for SeriesHttpClient {
    async fn fetch_series(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
    ) -> Result<Vec<Candle>, FeedError> {
        log_debug!(COMPONENT, "Fetching {} {}", symbol, timeframe);
        let fetch = self.request(symbol, timeframe).boxed_local();
        match select(fetch, TimeoutFuture::new(self.timeout_ms)).await {
            Either::Left((result, _)) => result,
            Either::Right(_) => {
                log_warn!(COMPONENT, "{} {} timed out after {} ms", symbol, timeframe, self.timeout_ms);
                Err(FeedError::Timeout {
                    after_ms: self.timeout_ms,
                })
            }
        }
    }
}
