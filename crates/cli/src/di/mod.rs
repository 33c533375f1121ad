use ferrous_zones_application::ports::{
    HandlerFactory, QueryHandler, ResourceStore, ResourceWatcher,
};
use ferrous_zones_application::services::{ZoneRegistry, ZoneRouter};
use ferrous_zones_application::use_cases::ReconcileZoneUseCase;
use ferrous_zones_domain::Config;
use ferrous_zones_infrastructure::dns::{DnsServerHandler, ForwardHandlerFactory};
use ferrous_zones_infrastructure::watch::{InMemoryResourceWatcher, ManifestWatcher};
use ferrous_zones_jobs::ZoneController;
use std::sync::Arc;
use tracing::warn;

/// Everything the binary runs, wired from one [`Config`].
pub struct ZoneServices {
    pub registry: Arc<ZoneRegistry>,
    pub controller: Arc<ZoneController>,
    pub dns_handler: DnsServerHandler,
}

impl ZoneServices {
    pub fn build(config: &Config) -> anyhow::Result<Self> {
        let namespace = config.controller.namespace.clone();

        let (store, watcher): (Arc<dyn ResourceStore>, Arc<dyn ResourceWatcher>) =
            match &config.watch.manifest_path {
                Some(_) => {
                    let manifest = Arc::new(ManifestWatcher::from_config(&config.watch, namespace)?);
                    (manifest.clone(), manifest)
                }
                None => {
                    warn!("No manifest configured, serving without zones");
                    let empty = Arc::new(InMemoryResourceWatcher::new(namespace));
                    empty.mark_synced();
                    (empty.clone(), empty)
                }
            };

        let registry = Arc::new(ZoneRegistry::new());
        let factory: Arc<dyn HandlerFactory> = Arc::new(ForwardHandlerFactory::new(&config.forward));
        let reconciler = Arc::new(ReconcileZoneUseCase::new(
            store,
            factory,
            Arc::clone(&registry),
        ));
        let controller = Arc::new(ZoneController::new(watcher, reconciler, &config.controller));

        let router: Arc<dyn QueryHandler> = Arc::new(
            ZoneRouter::new(Arc::clone(&registry)).with_zones(config.server.zone_names()),
        );
        let dns_handler = DnsServerHandler::new(router);

        Ok(Self {
            registry,
            controller,
            dns_handler,
        })
    }
}
