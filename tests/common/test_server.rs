use ferrous_zones_application::ports::QueryHandler;
use ferrous_zones_application::services::{ZoneRegistry, ZoneRouter};
use ferrous_zones_application::use_cases::ReconcileZoneUseCase;
use ferrous_zones_domain::config::ControllerConfig;
use ferrous_zones_infrastructure::dns::{DnsServerHandler, ForwardHandlerFactory};
use ferrous_zones_infrastructure::watch::ManifestWatcher;
use ferrous_zones_jobs::ZoneController;
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use hickory_server::ServerFuture;
use tempfile::NamedTempFile;
use tokio::net::{TcpListener, UdpSocket};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const POLL_INTERVAL: Duration = Duration::from_millis(50);
pub const QUERY_TIMEOUT: Duration = Duration::from_millis(300);

/// Full stack on loopback: manifest file → watcher → controller →
/// registry → router → UDP and TCP front end.
pub struct TestServer {
    addr: SocketAddr,
    manifest: NamedTempFile,
    registry: Arc<ZoneRegistry>,
    controller: Arc<ZoneController>,
    controller_task: Option<JoinHandle<()>>,
    shutdown: CancellationToken,
}

impl TestServer {
    pub async fn start(manifest: &str) -> Self {
        Self::start_in(manifest, None).await
    }

    pub async fn start_in(manifest: &str, namespace: Option<&str>) -> Self {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(manifest.as_bytes()).unwrap();
        file.flush().unwrap();

        let watcher = Arc::new(ManifestWatcher::new(
            file.path(),
            POLL_INTERVAL,
            namespace.map(str::to_string),
        ));
        let registry = Arc::new(ZoneRegistry::new());
        let reconciler = Arc::new(ReconcileZoneUseCase::new(
            watcher.clone(),
            Arc::new(ForwardHandlerFactory::with_timeout(QUERY_TIMEOUT)),
            Arc::clone(&registry),
        ));
        let controller = Arc::new(ZoneController::new(
            watcher,
            reconciler,
            &ControllerConfig::default(),
        ));
        let controller_task = controller.spawn(2);
        assert!(controller.wait_for_sync(Duration::from_secs(5)).await);

        let router: Arc<dyn QueryHandler> = Arc::new(ZoneRouter::new(Arc::clone(&registry)));
        let handler = DnsServerHandler::new(router);
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        let listener = TcpListener::bind(addr).await.unwrap();
        let shutdown = CancellationToken::new();
        tokio::spawn(serve(socket, listener, handler, shutdown.clone()));

        Self {
            addr,
            manifest: file,
            registry,
            controller,
            controller_task: Some(controller_task),
            shutdown,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn registry(&self) -> &Arc<ZoneRegistry> {
        &self.registry
    }

    pub fn controller(&self) -> &Arc<ZoneController> {
        &self.controller
    }

    pub fn write_manifest(&self, content: &str) {
        std::fs::write(self.manifest.path(), content).unwrap();
    }

    /// Stops the controller and waits for it to finish.
    pub async fn stop(&mut self) {
        self.shutdown.cancel();
        self.controller.stop().unwrap();
        if let Some(task) = self.controller_task.take() {
            task.await.unwrap();
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
        let _ = self.controller.stop();
    }
}

async fn serve(
    socket: UdpSocket,
    listener: TcpListener,
    handler: DnsServerHandler,
    shutdown: CancellationToken,
) {
    let mut server = ServerFuture::new(handler);
    server.register_socket(socket);
    server.register_listener(listener, Duration::from_secs(5));

    let finished = tokio::select! {
        result = server.block_until_done() => Some(result),
        _ = shutdown.cancelled() => None,
    };
    if finished.is_none() {
        let _ = server.shutdown_gracefully().await;
    }
}

/// One `[[zones]]` entry in the default namespace.
pub fn zone_entry(name: &str, zone_name: &str, forward_to: &str) -> String {
    format!(
        "[[zones]]\nname = \"{}\"\nzoneName = \"{}\"\nforwardTo = \"{}\"\n\n",
        name, zone_name, forward_to
    )
}

pub fn zone_entry_in(namespace: &str, name: &str, zone_name: &str, forward_to: &str) -> String {
    format!(
        "[[zones]]\nname = \"{}\"\nnamespace = \"{}\"\nzoneName = \"{}\"\nforwardTo = \"{}\"\n\n",
        name, namespace, zone_name, forward_to
    )
}
