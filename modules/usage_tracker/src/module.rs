use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::api::rest::routes;
use crate::config::UsageTrackerConfig;
use crate::domain::service::{Service, ServiceConfig};
use crate::infra::storage::JsonFileStore;

/// Module name, also the key of its section under `modules:` in the config.
pub const MODULE_NAME: &str = "usage_tracker";

/// Wires the JSON store (infra) into the domain service and exposes its REST routes.
#[derive(Clone)]
pub struct UsageTracker {
    service: Arc<Service>,
}

impl UsageTracker {
    /// Build the store under `home_dir`, seed its files and construct the service.
    pub async fn init(cfg: &UsageTrackerConfig, home_dir: &Path) -> anyhow::Result<Self> {
        info!("Initializing usage_tracker module");
        debug!(
            "Loaded usage_tracker config: data_dir={}, activity_retention={}",
            cfg.data_dir, cfg.activity_retention
        );

        let data_dir = runtime::paths::home_dir::resolve_under(home_dir, &cfg.data_dir);
        let store = JsonFileStore::new(data_dir);
        store.init().await?;
        info!(data_dir = %store.dir().display(), "Record store ready");

        let service = Service::new(
            Arc::new(store),
            ServiceConfig {
                activity_retention: cfg.activity_retention,
                default_version: cfg.default_version.clone(),
            },
        );

        Ok(Self {
            service: Arc::new(service),
        })
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    pub fn register_rest(&self, router: axum::Router) -> axum::Router {
        info!("Registering usage_tracker REST routes");
        routes::register_routes(router, self.service.clone())
    }
}
