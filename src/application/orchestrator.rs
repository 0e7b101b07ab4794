// Polling orchestrator - History, live and advisory loops on one control task
use crate::application::advisory_provider::{AdvisoryError, AdvisoryProvider, AdvisoryResponse};
use crate::application::feed_provider::{FeedError, FeedProvider};
use crate::application::monitor_state::{DashboardSnapshot, MonitorState};
use crate::domain::feed::FeedPayload;
use crate::domain::normalizer::FeedNormalizer;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, MissedTickBehavior};

/// Result of one spawned request, applied back on the control task
enum PollEvent {
    History(Result<FeedPayload, FeedError>),
    Live(Result<FeedPayload, FeedError>),
    Advisory(Result<AdvisoryResponse, AdvisoryError>),
}

#[derive(Debug, Clone)]
pub struct PollingOptions {
    pub live_interval: Duration,
    pub fetch_timeout: Duration,
    pub advisory_timeout: Duration,
}

pub struct PollingOrchestrator {
    feed: Arc<dyn FeedProvider>,
    advisor: Option<Arc<dyn AdvisoryProvider>>,
    normalizer: FeedNormalizer,
    options: PollingOptions,
    state: MonitorState,
    publisher: watch::Sender<DashboardSnapshot>,
}

/// Running orchestrator. Dropping the handle also ends polling, but without
/// waiting for the task to finish.
pub struct PollerHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Cancels the timers, aborts in-flight requests and waits for the task.
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            tracing::warn!("Polling task ended abnormally: {}", e);
        }
    }
}

impl PollingOrchestrator {
    pub fn new(
        feed: Arc<dyn FeedProvider>,
        advisor: Option<Arc<dyn AdvisoryProvider>>,
        normalizer: FeedNormalizer,
        options: PollingOptions,
        state: MonitorState,
    ) -> (Self, watch::Receiver<DashboardSnapshot>) {
        let (publisher, receiver) = watch::channel(state.snapshot());
        let orchestrator = Self {
            feed,
            advisor,
            normalizer,
            options,
            state,
            publisher,
        };
        (orchestrator, receiver)
    }

    pub fn start(self) -> PollerHandle {
        let (shutdown, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(self.run(shutdown_rx));
        PollerHandle { shutdown, task }
    }

    async fn run(mut self, mut shutdown: oneshot::Receiver<()>) {
        let mut in_flight: JoinSet<PollEvent> = JoinSet::new();
        let period = self.options.live_interval;
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            "Polling started (live every {:?}, feed enabled: {}, advisory enabled: {})",
            period,
            self.feed.is_enabled(),
            self.advisor.is_some()
        );
        self.spawn_history(&mut in_flight);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    self.spawn_live(&mut in_flight);
                    self.maybe_spawn_advisory(&mut in_flight);
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    match joined {
                        Ok(event) => self.apply(event),
                        Err(e) => tracing::warn!("Polling request task failed: {}", e),
                    }
                    self.maybe_spawn_advisory(&mut in_flight);
                    self.publish();
                }
            }
        }

        in_flight.abort_all();
        tracing::info!("Polling stopped");
    }

    fn spawn_history(&self, in_flight: &mut JoinSet<PollEvent>) {
        let feed = self.feed.clone();
        let timeout = self.options.fetch_timeout;
        in_flight.spawn(async move {
            let result = tokio::time::timeout(timeout, feed.fetch_history())
                .await
                .unwrap_or(Err(FeedError::Timeout(timeout)));
            PollEvent::History(result)
        });
    }

    fn spawn_live(&self, in_flight: &mut JoinSet<PollEvent>) {
        let feed = self.feed.clone();
        let timeout = self.options.fetch_timeout;
        in_flight.spawn(async move {
            let result = tokio::time::timeout(timeout, feed.fetch_latest())
                .await
                .unwrap_or(Err(FeedError::Timeout(timeout)));
            PollEvent::Live(result)
        });
    }

    fn maybe_spawn_advisory(&mut self, in_flight: &mut JoinSet<PollEvent>) {
        let Some(advisor) = self.advisor.clone() else {
            return;
        };
        let Some(request) = self.state.next_advisory_request(Instant::now()) else {
            return;
        };

        tracing::debug!("Requesting advisory");
        let timeout = self.options.advisory_timeout;
        in_flight.spawn(async move {
            let result = tokio::time::timeout(timeout, advisor.advise(&request))
                .await
                .unwrap_or(Err(AdvisoryError::Timeout(timeout)));
            PollEvent::Advisory(result)
        });
        self.publish();
    }

    fn apply(&mut self, event: PollEvent) {
        match event {
            PollEvent::History(Ok(payload)) => {
                let readings = self.normalizer.normalize_history(&payload);
                tracing::info!("Loaded {} historical readings", readings.len());
                self.state.apply_history(readings);
            }
            PollEvent::History(Err(e)) => {
                tracing::warn!("History fetch failed: {}", e);
                self.state.history_failed();
            }
            PollEvent::Live(Ok(payload)) => match self.normalizer.normalize_latest(&payload) {
                Some(reading) => {
                    let time = reading.time.clone();
                    if self.state.apply_live(reading) {
                        tracing::debug!("Stored live reading at {}", time);
                    }
                }
                None => tracing::debug!("Live fetch returned no readings"),
            },
            PollEvent::Live(Err(e)) => {
                tracing::warn!("Live fetch failed, retrying next tick: {}", e);
            }
            PollEvent::Advisory(result) => self.state.apply_advisory(result),
        }
    }

    fn publish(&self) {
        self.publisher.send_replace(self.state.snapshot());
    }
}
