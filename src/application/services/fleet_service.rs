use crate::application::ports::DeliveryApi;
use crate::domain::entities::{Driver, Order, Partner, Settings, Vehicle};
use crate::shared::error::AppError;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone, Default)]
struct FleetCache {
    settings: Option<Settings>,
    vehicles: Vec<Vehicle>,
    drivers: Vec<Driver>,
    partners: Vec<Partner>,
    orders: Vec<Order>,
}

/// Admin-side reference lists, cached in memory and replaced on each fetch.
pub struct FleetService {
    api: Arc<dyn DeliveryApi>,
    cache: RwLock<FleetCache>,
}

impl FleetService {
    pub fn new(api: Arc<dyn DeliveryApi>) -> Self {
        Self {
            api,
            cache: RwLock::new(FleetCache::default()),
        }
    }

    pub async fn fetch_settings(&self) -> Result<Settings, AppError> {
        let settings = self.api.get_settings().await?;
        self.cache.write().await.settings = Some(settings.clone());
        Ok(settings)
    }

    pub async fn fetch_vehicles(&self) -> Result<Vec<Vehicle>, AppError> {
        let vehicles = self.api.list_vehicles().await?;
        debug!("Fetched {} vehicles", vehicles.len());
        self.cache.write().await.vehicles = vehicles.clone();
        Ok(vehicles)
    }

    pub async fn fetch_drivers(&self) -> Result<Vec<Driver>, AppError> {
        let drivers = self.api.list_drivers().await?;
        self.cache.write().await.drivers = drivers.clone();
        Ok(drivers)
    }

    pub async fn fetch_partners(&self) -> Result<Vec<Partner>, AppError> {
        let partners = self.api.list_partners().await?;
        self.cache.write().await.partners = partners.clone();
        Ok(partners)
    }

    pub async fn fetch_orders(&self) -> Result<Vec<Order>, AppError> {
        let orders = self.api.list_orders().await?;
        debug!("Fetched {} orders", orders.len());
        self.cache.write().await.orders = orders.clone();
        Ok(orders)
    }

    pub async fn settings(&self) -> Option<Settings> {
        self.cache.read().await.settings.clone()
    }

    pub async fn vehicles(&self) -> Vec<Vehicle> {
        self.cache.read().await.vehicles.clone()
    }

    pub async fn drivers(&self) -> Vec<Driver> {
        self.cache.read().await.drivers.clone()
    }

    pub async fn partners(&self) -> Vec<Partner> {
        self.cache.read().await.partners.clone()
    }

    pub async fn orders(&self) -> Vec<Order> {
        self.cache.read().await.orders.clone()
    }

    pub async fn clear(&self) {
        *self.cache.write().await = FleetCache::default();
    }
}
