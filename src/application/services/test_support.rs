//! In-memory doubles for the application ports.

use crate::application::ports::{
    CredentialStore, DeliveryApi, KeyValueStore, LoginSession, PreferenceRemote, UrlOpener,
};
use crate::domain::entities::{
    Driver, ErpDocument, LocationPing, Order, Partner, ProofOfDelivery, Route, Settings,
    UserProfile, UserRole, Vehicle,
};
use crate::domain::value_objects::{AccessToken, DocumentType, StopStatus};
use crate::shared::error::AppError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

pub fn user(on_duty: bool) -> UserProfile {
    UserProfile {
        id: "driver-1".to_string(),
        email: "driver@example.com".to_string(),
        name: Some("Ivo".to_string()),
        role: UserRole::Driver,
        on_duty,
        vehicle_id: None,
    }
}

#[derive(Default)]
pub struct MockDeliveryApi {
    pub routes: Mutex<Vec<Route>>,
    pub calls: Mutex<Vec<String>>,
    pub fail_next: Mutex<Option<AppError>>,
    pub on_duty: Mutex<bool>,
    pub erp_documents: Mutex<HashMap<String, ErpDocument>>,
    pub pods: Mutex<Vec<ProofOfDelivery>>,
    pub pings: Mutex<Vec<LocationPing>>,
    /// When set, `update_stop_status` parks until notified.
    pub gate: Option<Arc<Notify>>,
}

impl MockDeliveryApi {
    pub fn with_routes(routes: Vec<Route>) -> Self {
        Self {
            routes: Mutex::new(routes),
            ..Default::default()
        }
    }

    pub fn fail_next_with(&self, err: AppError) {
        *self.fail_next.lock().unwrap() = Some(err);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), AppError> {
        self.calls.lock().unwrap().push(call);
        match self.fail_next.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DeliveryApi for MockDeliveryApi {
    async fn login(&self, email: &str, _password: &str) -> Result<LoginSession, AppError> {
        self.record(format!("login {email}"))?;
        Ok(LoginSession {
            access_token: AccessToken::new("token-1".to_string()).unwrap(),
            user: user(*self.on_duty.lock().unwrap()),
        })
    }

    async fn logout(&self) -> Result<(), AppError> {
        self.record("logout".to_string())
    }

    async fn current_user(&self) -> Result<UserProfile, AppError> {
        self.record("me".to_string())?;
        Ok(user(*self.on_duty.lock().unwrap()))
    }

    async fn set_duty_status(&self, on_duty: bool) -> Result<UserProfile, AppError> {
        self.record(format!("duty {on_duty}"))?;
        *self.on_duty.lock().unwrap() = on_duty;
        Ok(user(on_duty))
    }

    async fn change_password(&self, _current: &str, _new: &str) -> Result<(), AppError> {
        self.record("change_password".to_string())
    }

    async fn list_routes(&self) -> Result<Vec<Route>, AppError> {
        self.record("list_routes".to_string())?;
        Ok(self.routes.lock().unwrap().clone())
    }

    async fn get_route(&self, route_id: &str) -> Result<Route, AppError> {
        self.record(format!("get_route {route_id}"))?;
        self.routes
            .lock()
            .unwrap()
            .iter()
            .find(|route| route.id == route_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Route {route_id}")))
    }

    async fn update_stop_status(&self, stop_id: &str, status: StopStatus) -> Result<(), AppError> {
        self.record(format!("stop_status {stop_id} {status}"))?;
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        Ok(())
    }

    async fn reorder_stops(&self, route_id: &str, stop_ids: &[String]) -> Result<(), AppError> {
        self.record(format!("reorder {route_id} {}", stop_ids.join(",")))
    }

    async fn submit_pod(&self, pod: &ProofOfDelivery) -> Result<(), AppError> {
        self.record(format!("pod {}", pod.stop_id))?;
        self.pods.lock().unwrap().push(pod.clone());
        Ok(())
    }

    async fn send_location(&self, ping: &LocationPing) -> Result<(), AppError> {
        self.record("location".to_string())?;
        self.pings.lock().unwrap().push(ping.clone());
        Ok(())
    }

    async fn fetch_erp_document(
        &self,
        document_type: DocumentType,
        barcode: &str,
    ) -> Result<ErpDocument, AppError> {
        self.record(format!("erp_fetch {document_type} {barcode}"))?;
        self.erp_documents
            .lock()
            .unwrap()
            .get(barcode)
            .cloned()
            .ok_or_else(|| AppError::NotFound(barcode.to_string()))
    }

    async fn push_erp_status(
        &self,
        document_type: DocumentType,
        barcode: &str,
        status: &str,
    ) -> Result<(), AppError> {
        self.record(format!("erp_status {document_type} {barcode} {status}"))
    }

    async fn get_settings(&self) -> Result<Settings, AppError> {
        self.record("settings".to_string())?;
        let mut settings = Settings::new();
        settings.insert("depot_name".to_string(), Value::String("Main".to_string()));
        Ok(settings)
    }

    async fn list_vehicles(&self) -> Result<Vec<Vehicle>, AppError> {
        self.record("vehicles".to_string())?;
        Ok(vec![Vehicle {
            id: "v1".to_string(),
            registration: "ZG-1234-AB".to_string(),
            name: None,
            capacity_kg: Some(1200.0),
            active: true,
        }])
    }

    async fn list_drivers(&self) -> Result<Vec<Driver>, AppError> {
        self.record("drivers".to_string())?;
        Ok(vec![])
    }

    async fn list_partners(&self) -> Result<Vec<Partner>, AppError> {
        self.record("partners".to_string())?;
        Ok(vec![])
    }

    async fn list_orders(&self) -> Result<Vec<Order>, AppError> {
        self.record("orders".to_string())?;
        Ok(vec![])
    }
}

#[derive(Default)]
pub struct MemoryKeyValueStore {
    pub values: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<u64, AppError> {
        let mut values = self.values.lock().unwrap();
        let before = values.len();
        values.retain(|key, _| !key.starts_with(prefix));
        Ok((before - values.len()) as u64)
    }
}

#[derive(Default)]
pub struct MemoryCredentialStore {
    pub token: Mutex<Option<AccessToken>>,
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Result<Option<AccessToken>, AppError> {
        Ok(self.token.lock().unwrap().clone())
    }

    async fn save(&self, token: AccessToken) -> Result<(), AppError> {
        *self.token.lock().unwrap() = Some(token);
        Ok(())
    }

    async fn clear(&self) -> Result<(), AppError> {
        *self.token.lock().unwrap() = None;
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingPreferenceRemote {
    pub values: Mutex<HashMap<String, Value>>,
    pub writes: Mutex<Vec<(String, Value)>>,
    /// Simulated round-trip before every call is answered.
    pub delay: Option<Duration>,
}

impl RecordingPreferenceRemote {
    pub fn writes(&self) -> Vec<(String, Value)> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl PreferenceRemote for RecordingPreferenceRemote {
    async fn get_preference(&self, key: &str) -> Result<Option<Value>, AppError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn set_preference(&self, key: &str, value: &Value) -> Result<(), AppError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.writes
            .lock()
            .unwrap()
            .push((key.to_string(), value.clone()));
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.clone());
        Ok(())
    }
}

/// Opens nothing; fails for URLs starting with any of `failing_prefixes`.
#[derive(Default)]
pub struct RecordingOpener {
    pub opened: Mutex<Vec<String>>,
    pub failing_prefixes: Vec<String>,
}

#[async_trait]
impl UrlOpener for RecordingOpener {
    async fn open(&self, url: &str) -> Result<(), AppError> {
        self.opened.lock().unwrap().push(url.to_string());
        if self
            .failing_prefixes
            .iter()
            .any(|prefix| url.starts_with(prefix.as_str()))
        {
            return Err(AppError::Internal(format!("cannot open {url}")));
        }
        Ok(())
    }
}
