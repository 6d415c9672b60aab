use crate::application::ports::OfflinePersistence;
use crate::domain::entities::{LocationPing, ProofOfDelivery, QueueName, QueuedEntry};
use crate::shared::error::AppError;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// Append-only persisted buffer for writes that could not reach the backend.
///
/// Nothing here drains the queue; callers read it with `get_pending` and
/// empty it with `clear_pending`.
pub struct OfflineQueue<T> {
    persistence: Arc<dyn OfflinePersistence>,
    name: QueueName,
    cap: Option<usize>,
    _payload: PhantomData<fn() -> T>,
}

pub type LocationQueue = OfflineQueue<LocationPing>;
pub type PodQueue = OfflineQueue<ProofOfDelivery>;

impl<T> OfflineQueue<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    pub fn new(persistence: Arc<dyn OfflinePersistence>, name: QueueName, cap: Option<usize>) -> Self {
        Self {
            persistence,
            name,
            cap,
            _payload: PhantomData,
        }
    }

    pub fn name(&self) -> QueueName {
        self.name
    }

    pub fn cap(&self) -> Option<usize> {
        self.cap
    }

    pub async fn queue(&self, entry: &T) -> Result<i64, AppError> {
        let payload =
            serde_json::to_string(entry).map_err(|e| AppError::SerializationError(e.to_string()))?;
        let id = self
            .persistence
            .append(self.name, payload, Utc::now(), self.cap)
            .await?;
        debug!("Queued offline {} entry id={id}", self.name);
        Ok(id)
    }

    pub async fn get_pending(&self) -> Result<Vec<QueuedEntry<T>>, AppError> {
        self.persistence
            .list(self.name)
            .await?
            .into_iter()
            .map(|record| {
                let payload = serde_json::from_str(&record.payload).map_err(|e| {
                    AppError::DeserializationError(format!(
                        "{} entry {}: {e}",
                        self.name, record.id
                    ))
                })?;
                Ok(QueuedEntry {
                    id: record.id,
                    payload,
                    captured_at: record.captured_at,
                })
            })
            .collect()
    }

    pub async fn pending_count(&self) -> Result<u64, AppError> {
        self.persistence.count(self.name).await
    }

    pub async fn clear_pending(&self) -> Result<u64, AppError> {
        self.persistence.clear(self.name).await
    }
}

impl LocationQueue {
    pub fn location(persistence: Arc<dyn OfflinePersistence>, cap: usize) -> Self {
        Self::new(persistence, QueueName::Location, Some(cap))
    }
}

impl PodQueue {
    pub fn proof_of_delivery(persistence: Arc<dyn OfflinePersistence>) -> Self {
        Self::new(persistence, QueueName::ProofOfDelivery, None)
    }
}
