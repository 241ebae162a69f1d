use crate::domain::errors::FeedError;
use crate::domain::market_data::{Candle, Symbol, Timeframe};

/// Parameters a fetch was issued under.
///
/// A response is applied only while its ticket is still current; every parameter change bumps
/// the generation and turns outstanding tickets stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub symbol: Symbol,
    pub timeframe: Timeframe,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Fresh(Vec<Candle>),
    Stale,
    Failed(FeedError),
}

/// Polling bookkeeping for the active (symbol, timeframe).
#[derive(Debug)]
pub struct LiveFeed {
    symbol: Symbol,
    timeframe: Timeframe,
    generation: u64,
    interval_ms: u32,
    live: bool,
}

impl LiveFeed {
    pub fn new(symbol: Symbol, timeframe: Timeframe, interval_ms: u32) -> Self {
        Self {
            symbol,
            timeframe,
            generation: 0,
            interval_ms,
            live: false,
        }
    }

    /// Switches parameters. Liveness drops immediately; the returned ticket is for the
    /// immediate fetch.
    pub fn retarget(&mut self, symbol: Symbol, timeframe: Timeframe) -> FetchTicket {
        self.symbol = symbol;
        self.timeframe = timeframe;
        self.generation += 1;
        self.live = false;
        self.ticket()
    }

    /// Ticket for a periodic tick under the current parameters.
    pub fn ticket(&self) -> FetchTicket {
        FetchTicket {
            generation: self.generation,
            symbol: self.symbol.clone(),
            timeframe: self.timeframe,
        }
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.generation
            && ticket.symbol == self.symbol
            && ticket.timeframe == self.timeframe
    }

    /// Classifies a completed fetch. Stale responses are dropped whether they succeeded or not.
    pub fn accept(
        &self,
        ticket: &FetchTicket,
        result: Result<Vec<Candle>, FeedError>,
    ) -> FetchOutcome {
        if !self.is_current(ticket) {
            return FetchOutcome::Stale;
        }
        match result {
            Ok(candles) => FetchOutcome::Fresh(candles),
            Err(e) => FetchOutcome::Failed(e),
        }
    }

    pub fn mark_live(&mut self) {
        self.live = true;
    }

    pub fn mark_lost(&mut self) {
        self.live = false;
    }

    /// Invalidates every outstanding ticket without changing parameters.
    pub fn close(&mut self) {
        self.generation += 1;
        self.live = false;
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed() -> LiveFeed {
        LiveFeed::new(Symbol::new("AAPL").unwrap(), Timeframe::OneDay, 10_000)
    }

    #[test]
    fn retarget_turns_old_tickets_stale() {
        let mut feed = feed();
        let old = feed.ticket();
        let new = feed.retarget(Symbol::new("AAPL").unwrap(), Timeframe::OneHour);

        assert_eq!(feed.accept(&old, Ok(Vec::new())), FetchOutcome::Stale);
        assert_eq!(
            feed.accept(&old, Err(FeedError::Http { status: 500 })),
            FetchOutcome::Stale
        );
        assert_eq!(feed.accept(&new, Ok(Vec::new())), FetchOutcome::Fresh(Vec::new()));
    }

    #[test]
    fn retarget_resets_liveness() {
        let mut feed = feed();
        feed.mark_live();
        feed.retarget(Symbol::new("MSFT").unwrap(), Timeframe::OneDay);
        assert!(!feed.is_live());
    }

    #[test]
    fn periodic_tickets_stay_current() {
        let feed = feed();
        assert!(feed.is_current(&feed.ticket()));
        assert_eq!(feed.ticket(), feed.ticket());
    }

    #[test]
    fn close_invalidates_everything() {
        let mut feed = feed();
        let ticket = feed.ticket();
        feed.close();
        assert_eq!(feed.accept(&ticket, Ok(Vec::new())), FetchOutcome::Stale);
    }
}
