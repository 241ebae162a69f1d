use crate::application::chart_controller::{ApplyOutcome, ChartController};
use crate::application::live_feed::FetchTicket;
use crate::domain::{
    chart::RenderBackend,
    logging::LogComponent,
    market_data::{MarketDataRepository, Symbol, Timeframe},
};
use crate::{log_debug, log_info, log_warn};
use futures::future::{AbortHandle, Abortable, FutureExt, LocalBoxFuture};
use futures::task::LocalSpawnExt;
use std::cell::RefCell;
use std::rc::Rc;

/// Timer source for the polling loop.
pub trait Scheduler {
    /// A future resolving `ms` after this call. The timer must start at creation, not at
    /// first poll, so the loop keeps a fixed rate regardless of fetch duration.
    fn sleep(&self, ms: u32) -> LocalBoxFuture<'static, ()>;
}

/// Runs detached tasks on the current event loop.
pub trait TaskSpawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}

impl TaskSpawner for futures::executor::LocalSpawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        if let Err(e) = self.spawn_local(task) {
            log_warn!(LogComponent::Application("LiveSession"), "spawn failed: {}", e);
        }
    }
}

const COMPONENT: LogComponent = LogComponent::Application("LiveSession");

/// Drives a chart with periodic fetches.
///
/// Exactly one polling task runs at a time. Every parameter change aborts it (dropping the
/// pending timer and any in-flight fetch) and starts a new one with an immediate fetch.
pub struct LiveSession<B, R, S, T>
where
    B: RenderBackend + 'static,
    R: MarketDataRepository + 'static,
    S: Scheduler + 'static,
    T: TaskSpawner,
{
    controller: Rc<RefCell<ChartController<B>>>,
    repository: Rc<R>,
    scheduler: Rc<S>,
    spawner: T,
    abort: Option<AbortHandle>,
}

impl<B, R, S, T> LiveSession<B, R, S, T>
where
    B: RenderBackend + 'static,
    R: MarketDataRepository + 'static,
    S: Scheduler + 'static,
    T: TaskSpawner,
{
    pub fn new(
        controller: Rc<RefCell<ChartController<B>>>,
        repository: Rc<R>,
        scheduler: Rc<S>,
        spawner: T,
    ) -> Self {
        Self {
            controller,
            repository,
            scheduler,
            spawner,
            abort: None,
        }
    }

    pub fn start(&mut self) {
        let ticket = self.controller.borrow_mut().begin_session();
        self.restart(ticket);
    }

    /// Switches the symbol. Polling restarts only if it was already running; before
    /// `start` this just changes what the first fetch asks for.
    pub fn set_symbol(&mut self, symbol: Symbol) {
        let running = self.is_running();
        self.stop();
        let ticket = self.controller.borrow_mut().set_symbol(symbol);
        if running {
            self.restart(ticket);
        }
    }

    pub fn set_timeframe(&mut self, timeframe: Timeframe) {
        let running = self.is_running();
        self.stop();
        let ticket = self.controller.borrow_mut().set_timeframe(timeframe);
        if running {
            self.restart(ticket);
        }
    }

    /// Stops polling and tears the chart down. No fetch or timer fires afterwards.
    pub fn dispose(&mut self) {
        self.stop();
        self.controller.borrow_mut().dispose();
    }

    pub fn is_running(&self) -> bool {
        self.abort.is_some()
    }

    pub fn controller(&self) -> Rc<RefCell<ChartController<B>>> {
        Rc::clone(&self.controller)
    }

    fn stop(&mut self) {
        if let Some(handle) = self.abort.take() {
            handle.abort();
            log_debug!(COMPONENT, "Polling loop aborted");
        }
    }

    fn restart(&mut self, first: FetchTicket) {
        self.stop();
        let (handle, registration) = AbortHandle::new_pair();
        let task = poll_loop(
            Rc::clone(&self.controller),
            Rc::clone(&self.repository),
            Rc::clone(&self.scheduler),
            first,
        );
        self.spawner
            .spawn(Abortable::new(task, registration).map(|_| ()).boxed_local());
        self.abort = Some(handle);
    }
}

impl<B, R, S, T> Drop for LiveSession<B, R, S, T>
where
    B: RenderBackend + 'static,
    R: MarketDataRepository + 'static,
    S: Scheduler + 'static,
    T: TaskSpawner,
{
    fn drop(&mut self) {
        self.stop();
    }
}

/// Fetch, apply, wait out the rest of the interval, repeat.
///
/// The controller is borrowed only between awaits.
async fn poll_loop<B, R, S>(
    controller: Rc<RefCell<ChartController<B>>>,
    repository: Rc<R>,
    scheduler: Rc<S>,
    first: FetchTicket,
) where
    B: RenderBackend,
    R: MarketDataRepository,
    S: Scheduler,
{
    let interval = controller.borrow().config().poll_interval_ms;
    log_info!(
        COMPONENT,
        "Polling {} {} every {} ms",
        first.symbol,
        first.timeframe,
        interval
    );

    let mut ticket = first;
    loop {
        let tick = scheduler.sleep(interval);
        let result = repository
            .fetch_series(&ticket.symbol, ticket.timeframe)
            .await;
        let outcome = controller.borrow_mut().apply_fetch(&ticket, result);
        if outcome == ApplyOutcome::Stale {
            break;
        }
        tick.await;

        let Some(next) = controller.borrow().next_tick() else {
            break;
        };
        ticket = next;
    }
    log_debug!(COMPONENT, "Polling loop finished");
}
