use crate::rate_limiter::ExponentialBackoff;
use crate::work_queue::WorkQueue;
use ferrous_zones_application::ports::{ResourceWatcher, WatchEvent};
use ferrous_zones_application::services::ZoneRegistry;
use ferrous_zones_application::use_cases::{ReconcileZoneUseCase, StopAllZonesUseCase};
use ferrous_zones_domain::config::ControllerConfig;
use ferrous_zones_domain::{DomainError, ReconcileKey};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const QUEUE_NAME: &str = "DnsZone";
const SYNC_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Watch-driven controller keeping the zone registry in line with the
/// observed `DnsZone` resources.
///
/// Events only enqueue keys; workers reconcile each key against the
/// watcher's cache, so a burst of updates collapses into one pass over the
/// latest state.
pub struct ZoneController {
    watcher: Arc<dyn ResourceWatcher>,
    reconciler: Arc<ReconcileZoneUseCase>,
    stop_all: StopAllZonesUseCase,
    queue: WorkQueue<ReconcileKey>,
    shutdown: CancellationToken,
    stopping: Mutex<bool>,
}

impl ZoneController {
    pub fn new(
        watcher: Arc<dyn ResourceWatcher>,
        reconciler: Arc<ReconcileZoneUseCase>,
        config: &ControllerConfig,
    ) -> Self {
        let limiter = ExponentialBackoff::new(config.base_backoff(), config.max_backoff());
        let stop_all = StopAllZonesUseCase::new(Arc::clone(reconciler.registry()));

        Self {
            watcher,
            reconciler,
            stop_all,
            queue: WorkQueue::new(QUEUE_NAME, limiter),
            shutdown: CancellationToken::new(),
            stopping: Mutex::new(false),
        }
    }

    pub fn registry(&self) -> &Arc<ZoneRegistry> {
        self.reconciler.registry()
    }

    pub fn queue(&self) -> &WorkQueue<ReconcileKey> {
        &self.queue
    }

    /// True once the watcher completed its initial listing.
    pub fn has_synced(&self) -> bool {
        self.watcher.has_synced()
    }

    /// Polls [`ZoneController::has_synced`] until it holds or `timeout`
    /// elapses. Returns whether the cache synced.
    pub async fn wait_for_sync(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        let mut ticker = tokio::time::interval(SYNC_POLL_INTERVAL);

        loop {
            if self.has_synced() {
                return true;
            }
            if tokio::time::Instant::now() >= deadline || self.shutdown.is_cancelled() {
                return false;
            }
            ticker.tick().await;
        }
    }

    /// Requests shutdown. Only the first call has an effect; later calls
    /// return [`DomainError::ShutdownInProgress`].
    pub fn stop(&self) -> Result<(), DomainError> {
        let mut stopping = self.stopping.lock().unwrap_or_else(PoisonError::into_inner);
        if *stopping {
            return Err(DomainError::ShutdownInProgress);
        }
        *stopping = true;
        self.shutdown.cancel();
        info!("DnsZone controller stop requested");
        Ok(())
    }

    /// Spawns [`ZoneController::run`] on the runtime.
    pub fn spawn(self: &Arc<Self>, workers: usize) -> tokio::task::JoinHandle<()> {
        let controller = Arc::clone(self);
        tokio::spawn(async move { controller.run(workers).await })
    }

    /// Runs until [`ZoneController::stop`] is called, then stops every
    /// handler still bound in the registry.
    pub async fn run(self: Arc<Self>, workers: usize) {
        let workers = workers.max(1);
        info!(workers, "Starting DnsZone controller");

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let watch_task = self.spawn_watcher(events_tx);
        let pump_task = self.spawn_event_pump(events_rx);

        let mut worker_tasks = JoinSet::new();
        if self.wait_until_synced().await {
            for id in 0..workers {
                let controller = Arc::clone(&self);
                worker_tasks.spawn(async move { controller.run_worker(id).await });
            }
            info!("DnsZone controller synced, workers started");
        }

        self.shutdown.cancelled().await;
        info!("DnsZone controller shutting down");

        self.queue.shut_down();
        while let Some(result) = worker_tasks.join_next().await {
            if let Err(e) = result {
                error!(error = %e, "DnsZone worker terminated abnormally");
            }
        }
        if let Err(e) = pump_task.await {
            error!(error = %e, "Event pump terminated abnormally");
        }
        if let Err(e) = watch_task.await {
            error!(error = %e, "Watcher terminated abnormally");
        }

        let stopped = self.stop_all.execute().await;
        info!(stopped, "DnsZone controller stopped");
    }

    /// Waits for the initial listing, or for shutdown. Keys are still
    /// enqueued meanwhile.
    async fn wait_until_synced(&self) -> bool {
        loop {
            if self.has_synced() {
                return true;
            }
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    warn!("Shutdown before the DnsZone cache synced");
                    return false;
                }
                _ = tokio::time::sleep(SYNC_POLL_INTERVAL) => {}
            }
        }
    }

    fn spawn_watcher(
        &self,
        events: mpsc::UnboundedSender<WatchEvent>,
    ) -> tokio::task::JoinHandle<()> {
        let watcher = Arc::clone(&self.watcher);
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = watcher.run(events, shutdown).await {
                error!(error = %e, "DnsZone watcher failed");
            }
        })
    }

    fn spawn_event_pump(
        &self,
        mut events: mpsc::UnboundedReceiver<WatchEvent>,
    ) -> tokio::task::JoinHandle<()> {
        let queue = self.queue.clone();
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    event = events.recv() => match event {
                        Some(event) => {
                            debug!(key = %event.key(), event = event.kind(), "DnsZone event");
                            queue.add(event.key().clone());
                        }
                        None => break,
                    },
                }
            }
        })
    }

    async fn run_worker(&self, id: usize) {
        debug!(worker = id, "DnsZone worker started");
        while let Some(key) = self.queue.get().await {
            self.process(&key).await;
            self.queue.done(&key);
        }
        debug!(worker = id, "DnsZone worker exiting");
    }

    async fn process(&self, key: &ReconcileKey) {
        match self.reconciler.execute(key).await {
            Ok(outcome) => {
                self.queue.forget(key);
                debug!(key = %key, outcome = ?outcome, "DnsZone synced");
            }
            Err(e) => {
                error!(
                    key = %key,
                    error = %e,
                    retries = self.queue.num_requeues(key),
                    "Error syncing DnsZone"
                );
                self.queue.add_rate_limited(key.clone());
            }
        }
    }
}
