// Poll scheduler - Timer-driven refresh lifecycle with stale-result discard
use crate::application::cycle::{self, CycleOutcome};
use crate::application::display_sink::DisplaySink;
use crate::application::fetcher::FetchError;
use crate::application::http_client::{HttpClient, HttpConnector};
use crate::domain::display::DisplayState;
use crate::infrastructure::config::PanelConfig;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info};

/// Drives poll cycles for one device.
///
/// Every cycle takes an id from a monotonically increasing counter when it
/// starts. A result is applied only if no newer cycle has started since, and
/// `stop` bumps the counter too, so nothing in flight can land after it.
#[derive(Clone)]
pub struct PollScheduler {
    inner: Arc<Inner>,
}

struct Inner {
    connector: Arc<dyn HttpConnector>,
    sink: Arc<dyn DisplaySink>,
    published: Mutex<Published>,
    run: Mutex<Option<ActiveRun>>,
    next_run_id: AtomicU64,
}

struct Published {
    latest_cycle: u64,
    state: DisplayState,
}

struct ActiveRun {
    id: u64,
    context: Arc<RunContext>,
    shutdown: watch::Sender<bool>,
    timer: JoinHandle<()>,
}

/// Configuration snapshot and client owned by a single run.
struct RunContext {
    config: PanelConfig,
    client: Result<Arc<dyn HttpClient>, FetchError>,
}

impl RunContext {
    fn client(&self) -> Result<&dyn HttpClient, FetchError> {
        self.client.as_deref().map_err(|e| e.clone())
    }
}

/// Stops the run it was returned for. Has no effect once that run has been
/// replaced or stopped.
#[derive(Clone)]
pub struct PollHandle {
    inner: Weak<Inner>,
    run: u64,
}

impl PollHandle {
    pub fn stop(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.stop_run(Some(self.run));
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl PollScheduler {
    pub fn new(connector: Arc<dyn HttpConnector>, sink: Arc<dyn DisplaySink>) -> Self {
        Self {
            inner: Arc::new(Inner {
                connector,
                sink,
                published: Mutex::new(Published {
                    latest_cycle: 0,
                    state: DisplayState::loading(),
                }),
                run: Mutex::new(None),
                next_run_id: AtomicU64::new(0),
            }),
        }
    }

    /// Run a cycle now, then every `refresh_interval_secs`. A run that is
    /// already active is stopped first. Must be called inside a tokio runtime.
    pub fn start(&self, config: PanelConfig) -> PollHandle {
        let mut run = lock(&self.inner.run);
        if let Some(previous) = run.take() {
            self.inner.cancel(previous);
        }

        let client = self.inner.connector.connect();
        if let Err(e) = &client {
            error!(reason = e.reason_code(), detail = %e, "Failed to build HTTP client");
        }

        let id = self.inner.next_run_id.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            run = id,
            endpoint = config.endpoint.as_deref().unwrap_or("<unset>"),
            interval_secs = config.refresh_interval().as_secs(),
            "Poller started"
        );

        let context = Arc::new(RunContext { config, client });
        let (shutdown, shutdown_rx) = watch::channel(false);
        let timer = tokio::spawn(timer_loop(
            Arc::downgrade(&self.inner),
            Arc::clone(&context),
            shutdown_rx,
        ));

        *run = Some(ActiveRun {
            id,
            context,
            shutdown,
            timer,
        });

        PollHandle {
            inner: Arc::downgrade(&self.inner),
            run: id,
        }
    }

    /// Full restart with a new configuration snapshot.
    pub fn reconfigure(&self, config: PanelConfig) -> PollHandle {
        debug!("Reconfiguring poller");
        self.start(config)
    }

    /// Run one extra cycle without touching the timer. Returns false when
    /// the scheduler is idle.
    pub fn trigger_now(&self) -> bool {
        let run = lock(&self.inner.run);
        match run.as_ref() {
            Some(active) => {
                spawn_cycle(
                    &self.inner,
                    Arc::clone(&active.context),
                    active.shutdown.subscribe(),
                );
                true
            }
            None => {
                debug!("Manual refresh ignored, poller is idle");
                false
            }
        }
    }

    pub fn stop(&self) {
        self.inner.stop_run(None);
    }

    pub fn current(&self) -> DisplayState {
        lock(&self.inner.published).state.clone()
    }

    pub fn is_running(&self) -> bool {
        lock(&self.inner.run).is_some()
    }
}

impl Inner {
    fn stop_run(&self, only: Option<u64>) {
        let mut run = lock(&self.run);
        let stopped = run.take_if(|active| only.is_none_or(|id| id == active.id));
        if let Some(active) = stopped {
            self.cancel(active);
        }
    }

    /// Dropping the run drops its shutdown sender and its client handle.
    fn cancel(&self, run: ActiveRun) {
        let _ = run.shutdown.send(true);
        run.timer.abort();
        lock(&self.published).latest_cycle += 1;
        info!(run = run.id, "Poller stopped");
    }

    fn begin_cycle(&self) -> u64 {
        let mut published = lock(&self.published);
        published.latest_cycle += 1;
        published.latest_cycle
    }

    fn publish(&self, cycle: u64, outcome: CycleOutcome) {
        if let Err(e) = &outcome {
            cycle::log_failure(cycle, e);
        }

        let mut published = lock(&self.published);
        if cycle < published.latest_cycle {
            debug!(
                cycle,
                latest = published.latest_cycle,
                "Discarding stale cycle result"
            );
            return;
        }

        published.state = cycle::next_state(&outcome, &published.state);
        self.sink.on_display_update(&published.state);
    }
}

fn spawn_cycle(inner: &Arc<Inner>, context: Arc<RunContext>, mut shutdown: watch::Receiver<bool>) {
    let cycle = inner.begin_cycle();
    let inner = Arc::clone(inner);

    tokio::spawn(async move {
        debug!(cycle, "Poll cycle started");
        tokio::select! {
            biased;
            _ = shutdown.changed() => debug!(cycle, "Poll cycle cancelled"),
            outcome = cycle::run_cycle(&context.config, context.client()) => {
                inner.publish(cycle, outcome);
            }
        }
    });
}

async fn timer_loop(
    inner: Weak<Inner>,
    context: Arc<RunContext>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = interval(context.config.refresh_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {
                let Some(inner) = inner.upgrade() else { break };
                spawn_cycle(&inner, Arc::clone(&context), shutdown.clone());
            }
        }
    }
    debug!("Poll timer exited");
}
