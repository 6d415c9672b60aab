use crate::domain::entities::{
    Driver, ErpDocument, LocationPing, Order, Partner, ProofOfDelivery, Route, Settings,
    UserProfile, Vehicle,
};
use crate::domain::value_objects::{AccessToken, DocumentType, StopStatus};
use crate::shared::error::AppError;
use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct LoginSession {
    pub access_token: AccessToken,
    pub user: UserProfile,
}

/// Backend REST API as seen by the application services.
#[async_trait]
pub trait DeliveryApi: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<LoginSession, AppError>;
    async fn logout(&self) -> Result<(), AppError>;
    async fn current_user(&self) -> Result<UserProfile, AppError>;
    async fn set_duty_status(&self, on_duty: bool) -> Result<UserProfile, AppError>;
    async fn change_password(&self, current: &str, new: &str) -> Result<(), AppError>;

    async fn list_routes(&self) -> Result<Vec<Route>, AppError>;
    async fn get_route(&self, route_id: &str) -> Result<Route, AppError>;
    async fn update_stop_status(&self, stop_id: &str, status: StopStatus) -> Result<(), AppError>;
    async fn reorder_stops(&self, route_id: &str, stop_ids: &[String]) -> Result<(), AppError>;

    async fn submit_pod(&self, pod: &ProofOfDelivery) -> Result<(), AppError>;
    async fn send_location(&self, ping: &LocationPing) -> Result<(), AppError>;

    async fn fetch_erp_document(
        &self,
        document_type: DocumentType,
        barcode: &str,
    ) -> Result<ErpDocument, AppError>;
    async fn push_erp_status(
        &self,
        document_type: DocumentType,
        barcode: &str,
        status: &str,
    ) -> Result<(), AppError>;

    async fn get_settings(&self) -> Result<Settings, AppError>;
    async fn list_vehicles(&self) -> Result<Vec<Vehicle>, AppError>;
    async fn list_drivers(&self) -> Result<Vec<Driver>, AppError>;
    async fn list_partners(&self) -> Result<Vec<Partner>, AppError>;
    async fn list_orders(&self) -> Result<Vec<Order>, AppError>;
}

/// Generic per-user key/value preference endpoint.
#[async_trait]
pub trait PreferenceRemote: Send + Sync {
    async fn get_preference(&self, key: &str) -> Result<Option<Value>, AppError>;
    async fn set_preference(&self, key: &str, value: &Value) -> Result<(), AppError>;
}
