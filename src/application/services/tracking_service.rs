use super::offline_queue::LocationQueue;
use super::AuthService;
use crate::application::ports::DeliveryApi;
use crate::domain::entities::LocationPing;
use crate::domain::value_objects::Coordinates;
use crate::shared::error::AppError;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PingOutcome {
    Sent,
    Queued(i64),
    /// Driver is off duty; nothing reported.
    Skipped,
}

/// Foreground location reporting for the signed-in driver.
pub struct TrackingService {
    api: Arc<dyn DeliveryApi>,
    auth: Arc<AuthService>,
    queue: Arc<LocationQueue>,
}

impl TrackingService {
    pub fn new(api: Arc<dyn DeliveryApi>, auth: Arc<AuthService>, queue: Arc<LocationQueue>) -> Self {
        Self { api, auth, queue }
    }

    pub fn queue(&self) -> &LocationQueue {
        &self.queue
    }

    pub async fn record(&self, ping: LocationPing) -> Result<PingOutcome, AppError> {
        Coordinates::new(ping.latitude, ping.longitude)?;
        if !self.auth.is_on_duty().await {
            debug!("Off duty, location ping skipped");
            return Ok(PingOutcome::Skipped);
        }

        match self.api.send_location(&ping).await {
            Ok(()) => Ok(PingOutcome::Sent),
            Err(e) if e.is_transport() => {
                warn!("Location ping not delivered, queueing: {e}");
                Ok(PingOutcome::Queued(self.queue.queue(&ping).await?))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::test_support::{
        MemoryCredentialStore, MemoryKeyValueStore, MockDeliveryApi, RecordingPreferenceRemote,
    };
    use crate::application::services::{FleetService, PreferenceStore, RouteStore};
    use crate::infrastructure::database::{ConnectionPool, SqliteOfflineStore};
    use std::time::Duration;

    async fn setup(cap: usize) -> (TrackingService, Arc<AuthService>, Arc<MockDeliveryApi>) {
        let api = Arc::new(MockDeliveryApi::default());
        let local = Arc::new(MemoryKeyValueStore::default());
        let auth = Arc::new(AuthService::new(
            api.clone(),
            Arc::new(MemoryCredentialStore::default()),
            Arc::new(RouteStore::new(api.clone(), local.clone())),
            Arc::new(FleetService::new(api.clone())),
            Arc::new(PreferenceStore::new(
                Arc::new(RecordingPreferenceRemote::default()),
                local,
                Duration::from_millis(1000),
            )),
        ));
        let pool = ConnectionPool::from_memory().await.unwrap();
        pool.migrate().await.unwrap();
        let queue = Arc::new(LocationQueue::location(
            Arc::new(SqliteOfflineStore::new(pool)),
            cap,
        ));
        (
            TrackingService::new(api.clone(), auth.clone(), queue),
            auth,
            api,
        )
    }

    fn ping() -> LocationPing {
        LocationPing::new(Coordinates::new(45.81, 15.98).unwrap(), Some(5.0))
    }

    #[tokio::test]
    async fn off_duty_pings_are_skipped() {
        let (tracking, auth, api) = setup(500).await;
        auth.login("driver@example.com", "secret-pass").await.unwrap();
        assert_eq!(tracking.record(ping()).await.unwrap(), PingOutcome::Skipped);
        assert!(!api.calls().contains(&"location".to_string()));
    }

    #[tokio::test]
    async fn on_duty_ping_is_sent() {
        let (tracking, auth, api) = setup(500).await;
        auth.login("driver@example.com", "secret-pass").await.unwrap();
        auth.set_duty_status(true).await.unwrap();
        assert_eq!(tracking.record(ping()).await.unwrap(), PingOutcome::Sent);
        assert_eq!(api.pings.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unreachable_backend_queues_within_cap() {
        let (tracking, auth, api) = setup(2).await;
        auth.login("driver@example.com", "secret-pass").await.unwrap();
        auth.set_duty_status(true).await.unwrap();

        for _ in 0..3 {
            api.fail_next_with(AppError::Network("no signal".to_string()));
            assert!(matches!(
                tracking.record(ping()).await.unwrap(),
                PingOutcome::Queued(_)
            ));
        }
        assert_eq!(tracking.queue().pending_count().await.unwrap(), 2);
    }
}
