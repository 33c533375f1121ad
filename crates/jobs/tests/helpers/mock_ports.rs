#![allow(dead_code)]

use async_trait::async_trait;
use ferrous_zones_application::ports::{
    HandlerFactory, QueryHandler, ResourceStore, ResourceWatcher, WatchEvent, ZoneHandler,
};
use ferrous_zones_domain::{
    DesiredConfig, DnsRequest, DnsResponse, DnsZone, DomainError, ReconcileKey, ZoneName,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

// ============================================================================
// Mock ZoneHandler
// ============================================================================

pub struct MockZoneHandler {
    pub name: String,
    pub received_config: DesiredConfig,
    start_calls: AtomicUsize,
    stop_calls: AtomicUsize,
    serve_calls: AtomicUsize,
    fail_start: bool,
}

impl MockZoneHandler {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self::with_config(
            name,
            DesiredConfig::new(ZoneName::normalize(name), vec![]),
            false,
        ))
    }

    pub fn with_config(name: &str, config: DesiredConfig, fail_start: bool) -> Self {
        Self {
            name: name.to_string(),
            received_config: config,
            start_calls: AtomicUsize::new(0),
            stop_calls: AtomicUsize::new(0),
            serve_calls: AtomicUsize::new(0),
            fail_start,
        }
    }

    pub fn start_call_count(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn stop_call_count(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    pub fn serve_call_count(&self) -> usize {
        self.serve_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueryHandler for MockZoneHandler {
    fn name(&self) -> &str {
        &self.name
    }

    async fn serve(&self, _request: &DnsRequest) -> Result<DnsResponse, DomainError> {
        self.serve_calls.fetch_add(1, Ordering::SeqCst);
        Ok(DnsResponse::new(self.name.as_bytes().to_vec()))
    }
}

#[async_trait]
impl ZoneHandler for MockZoneHandler {
    async fn start(&self) -> Result<(), DomainError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_start {
            return Err(DomainError::HandlerStart {
                handler: self.name.clone(),
                reason: "mock start failure".to_string(),
            });
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), DomainError> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn as_zone_handler(handler: &Arc<MockZoneHandler>) -> Arc<dyn ZoneHandler> {
    Arc::clone(handler) as Arc<dyn ZoneHandler>
}

// ============================================================================
// Mock HandlerFactory
// ============================================================================

/// Records every handler it creates, in call order.
#[derive(Default)]
pub struct MockHandlerFactory {
    handlers: Mutex<Vec<Arc<MockZoneHandler>>>,
    should_fail: AtomicBool,
    fail_start: AtomicBool,
    create_delay: Mutex<Option<Duration>>,
    create_entered: AtomicUsize,
}

impl MockHandlerFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    /// Handlers created from now on fail in `start`.
    pub fn set_fail_start(&self, fail: bool) {
        self.fail_start.store(fail, Ordering::SeqCst);
    }

    /// Every `create` sleeps this long before building its handler.
    pub fn set_create_delay(&self, delay: Duration) {
        *self.create_delay.lock().unwrap() = Some(delay);
    }

    /// Calls that reached `create`, including ones still sleeping.
    pub fn entered_count(&self) -> usize {
        self.create_entered.load(Ordering::SeqCst)
    }

    pub fn call_count(&self) -> usize {
        self.handlers.lock().unwrap().len()
    }

    pub fn handler(&self, index: usize) -> Arc<MockZoneHandler> {
        Arc::clone(&self.handlers.lock().unwrap()[index])
    }
}

#[async_trait]
impl HandlerFactory for MockHandlerFactory {
    async fn create(&self, config: &DesiredConfig) -> Result<Arc<dyn ZoneHandler>, DomainError> {
        self.create_entered.fetch_add(1, Ordering::SeqCst);
        let delay = *self.create_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.should_fail.load(Ordering::SeqCst) {
            return Err(DomainError::HandlerFactory {
                zone: config.from.to_string(),
                reason: "mock factory failure".to_string(),
            });
        }

        let mut handlers = self.handlers.lock().unwrap();
        let handler = Arc::new(MockZoneHandler::with_config(
            &format!("mock-{}", handlers.len()),
            config.clone(),
            self.fail_start.load(Ordering::SeqCst),
        ));
        handlers.push(Arc::clone(&handler));
        Ok(handler)
    }
}

// ============================================================================
// Fake ResourceWatcher
// ============================================================================

/// In-memory stand-in for a list-watch client: mutations update the cache
/// and emit the matching event to the running controller.
#[derive(Default)]
pub struct FakeWatcher {
    objects: Mutex<HashMap<ReconcileKey, DnsZone>>,
    events: Mutex<Option<mpsc::UnboundedSender<WatchEvent>>>,
    synced: AtomicBool,
    hold_sync: AtomicBool,
}

impl FakeWatcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Keeps `has_synced` false until [`FakeWatcher::release_sync`].
    pub fn hold_sync(&self) {
        self.hold_sync.store(true, Ordering::SeqCst);
    }

    pub fn release_sync(&self) {
        self.hold_sync.store(false, Ordering::SeqCst);
        self.synced.store(true, Ordering::SeqCst);
    }

    pub fn create(&self, zone: DnsZone) {
        let key = zone.key();
        self.objects.lock().unwrap().insert(key.clone(), zone);
        self.emit(WatchEvent::Added(key));
    }

    pub fn update(&self, zone: DnsZone) {
        let key = zone.key();
        self.objects.lock().unwrap().insert(key.clone(), zone);
        self.emit(WatchEvent::Updated(key));
    }

    pub fn delete(&self, key: &ReconcileKey) {
        self.objects.lock().unwrap().remove(key);
        self.emit(WatchEvent::Deleted(key.clone()));
    }

    fn emit(&self, event: WatchEvent) {
        if let Some(tx) = self.events.lock().unwrap().as_ref() {
            let _ = tx.send(event);
        }
    }
}

#[async_trait]
impl ResourceStore for FakeWatcher {
    async fn get_by_key(&self, key: &ReconcileKey) -> Result<Option<DnsZone>, DomainError> {
        Ok(self.objects.lock().unwrap().get(key).cloned())
    }

    fn has_synced(&self) -> bool {
        self.synced.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResourceWatcher for FakeWatcher {
    async fn run(
        &self,
        events: mpsc::UnboundedSender<WatchEvent>,
        shutdown: CancellationToken,
    ) -> Result<(), DomainError> {
        {
            let mut sink = self.events.lock().unwrap();
            let existing: Vec<ReconcileKey> =
                self.objects.lock().unwrap().keys().cloned().collect();
            for key in existing {
                let _ = events.send(WatchEvent::Added(key));
            }
            *sink = Some(events);
        }
        if !self.hold_sync.load(Ordering::SeqCst) {
            self.synced.store(true, Ordering::SeqCst);
        }

        shutdown.cancelled().await;
        self.events.lock().unwrap().take();
        Ok(())
    }
}

// ============================================================================
// Polling
// ============================================================================

/// Polls `condition` every 10ms until it holds or `timeout` elapses.
pub async fn wait_until<F: Fn() -> bool>(timeout: Duration, condition: F) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
