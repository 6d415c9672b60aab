use crate::domain::entities::{QueueName, QueuedRecord};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait OfflinePersistence: Send + Sync {
    /// Appends a record. When `cap` is set, the oldest records beyond it are
    /// dropped in the same operation.
    async fn append(
        &self,
        queue: QueueName,
        payload: String,
        captured_at: DateTime<Utc>,
        cap: Option<usize>,
    ) -> Result<i64, AppError>;
    /// Records oldest first.
    async fn list(&self, queue: QueueName) -> Result<Vec<QueuedRecord>, AppError>;
    async fn count(&self, queue: QueueName) -> Result<u64, AppError>;
    async fn clear(&self, queue: QueueName) -> Result<u64, AppError>;
}
