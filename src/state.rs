use crate::application::ports::{
    CredentialStore, DeliveryApi, KeyValueStore, OfflinePersistence, PreferenceRemote, UrlOpener,
};
use crate::application::services::{
    AuthService, ErpService, FleetService, LocationQueue, NavigationService, PodQueue, PodService,
    PreferenceStore, RouteStore, TrackingService,
};
use crate::infrastructure::database::{ConnectionPool, SqliteKeyValueStore, SqliteOfflineStore};
use crate::infrastructure::http::ApiClient;
use crate::infrastructure::platform::SystemUrlOpener;
use crate::infrastructure::storage::{
    FileSecureStorage, KeyringSecureStorage, SecureStorage, TokenStore,
};
use crate::shared::config::{AppConfig, SecureBackend};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Every long-lived component, wired once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db_pool: ConnectionPool,
    pub credentials: Arc<TokenStore>,
    pub api: Arc<ApiClient>,
    pub routes: Arc<RouteStore>,
    pub fleet: Arc<FleetService>,
    pub preferences: Arc<PreferenceStore>,
    pub auth: Arc<AuthService>,
    pub pod: Arc<PodService>,
    pub tracking: Arc<TrackingService>,
    pub erp: Arc<ErpService>,
    pub navigation: Arc<NavigationService>,
    pub location_queue: Arc<LocationQueue>,
    pub pod_queue: Arc<PodQueue>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        config.validate().map_err(anyhow::Error::msg)?;
        std::fs::create_dir_all(&config.storage.data_dir)?;

        let db_pool = ConnectionPool::new(&config.storage.database_url).await?;
        let secure: Arc<dyn SecureStorage> = match config.storage.secure_backend {
            SecureBackend::Keyring => {
                Arc::new(KeyringSecureStorage::new(config.storage.service_name.clone()))
            }
            SecureBackend::File => Arc::new(FileSecureStorage::new(
                Path::new(&config.storage.data_dir).join("secure_storage"),
            )),
        };
        Self::with_components(config, db_pool, secure, Arc::new(SystemUrlOpener::new())).await
    }

    /// Wires the services over an existing pool and secure storage backend.
    pub async fn with_components(
        config: AppConfig,
        db_pool: ConnectionPool,
        secure: Arc<dyn SecureStorage>,
        opener: Arc<dyn UrlOpener>,
    ) -> anyhow::Result<Self> {
        db_pool.migrate().await?;

        let credentials = Arc::new(TokenStore::new(secure));
        let api = Arc::new(ApiClient::new(
            &config.api.base_url,
            Duration::from_secs(config.api.timeout_secs),
            credentials.clone() as Arc<dyn CredentialStore>,
        )?);
        let delivery_api: Arc<dyn DeliveryApi> = api.clone();
        let preference_remote: Arc<dyn PreferenceRemote> = api.clone();

        let local: Arc<dyn KeyValueStore> = Arc::new(SqliteKeyValueStore::new(db_pool.clone()));
        let offline: Arc<dyn OfflinePersistence> =
            Arc::new(SqliteOfflineStore::new(db_pool.clone()));

        let routes = Arc::new(RouteStore::new(delivery_api.clone(), local.clone()));
        let fleet = Arc::new(FleetService::new(delivery_api.clone()));
        let preferences = Arc::new(PreferenceStore::new(
            preference_remote,
            local,
            Duration::from_millis(config.preferences.debounce_ms),
        ));
        let auth = Arc::new(AuthService::new(
            delivery_api.clone(),
            credentials.clone(),
            routes.clone(),
            fleet.clone(),
            preferences.clone(),
        ));

        let location_queue = Arc::new(LocationQueue::location(
            offline.clone(),
            config.offline.location_queue_cap,
        ));
        let pod_queue = Arc::new(PodQueue::proof_of_delivery(offline));
        let pod = Arc::new(PodService::new(delivery_api.clone(), pod_queue.clone()));
        let tracking = Arc::new(TrackingService::new(
            delivery_api.clone(),
            auth.clone(),
            location_queue.clone(),
        ));
        let erp = Arc::new(ErpService::new(delivery_api));
        let navigation = Arc::new(NavigationService::new(config.platform, opener));

        info!("Client core ready against {}", api.base_url());

        Ok(Self {
            config,
            db_pool,
            credentials,
            api,
            routes,
            fleet,
            preferences,
            auth,
            pod,
            tracking,
            erp,
            navigation,
            location_queue,
            pod_queue,
        })
    }

    /// Flushes pending preference writes and closes the database.
    pub async fn shutdown(&self) {
        let flushed = self.preferences.close().await;
        if flushed > 0 {
            info!("Flushed {flushed} pending preferences");
        }
        self.db_pool.close().await;
    }
}
