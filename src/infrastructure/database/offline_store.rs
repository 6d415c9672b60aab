use crate::application::ports::OfflinePersistence;
use crate::domain::entities::{QueueName, QueuedRecord};
use crate::infrastructure::database::ConnectionPool;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::Row;

pub struct SqliteOfflineStore {
    pool: ConnectionPool,
}

impl SqliteOfflineStore {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OfflinePersistence for SqliteOfflineStore {
    async fn append(
        &self,
        queue: QueueName,
        payload: String,
        captured_at: DateTime<Utc>,
        cap: Option<usize>,
    ) -> Result<i64, AppError> {
        let mut tx = self.pool.get_pool().begin().await?;

        let result =
            sqlx::query("INSERT INTO offline_queue (queue, payload, captured_at) VALUES (?, ?, ?)")
                .bind(queue.as_str())
                .bind(&payload)
                .bind(captured_at.timestamp_millis())
                .execute(&mut *tx)
                .await?;
        let id = result.last_insert_rowid();

        if let Some(cap) = cap {
            sqlx::query(
                r#"
                DELETE FROM offline_queue
                WHERE queue = ?
                  AND id NOT IN (
                    SELECT id FROM offline_queue WHERE queue = ? ORDER BY id DESC LIMIT ?
                  )
                "#,
            )
            .bind(queue.as_str())
            .bind(queue.as_str())
            .bind(cap as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(id)
    }

    async fn list(&self, queue: QueueName) -> Result<Vec<QueuedRecord>, AppError> {
        let rows = sqlx::query(
            "SELECT id, payload, captured_at FROM offline_queue WHERE queue = ? ORDER BY id ASC",
        )
        .bind(queue.as_str())
        .fetch_all(self.pool.get_pool())
        .await?;

        rows.into_iter()
            .map(|row| {
                let millis: i64 = row.get("captured_at");
                let captured_at = Utc.timestamp_millis_opt(millis).single().ok_or_else(|| {
                    AppError::DeserializationError(format!("Invalid captured_at {millis}"))
                })?;
                Ok(QueuedRecord {
                    id: row.get("id"),
                    payload: row.get("payload"),
                    captured_at,
                })
            })
            .collect()
    }

    async fn count(&self, queue: QueueName) -> Result<u64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM offline_queue WHERE queue = ?")
            .bind(queue.as_str())
            .fetch_one(self.pool.get_pool())
            .await?;
        Ok(row.get::<i64, _>("total") as u64)
    }

    async fn clear(&self, queue: QueueName) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM offline_queue WHERE queue = ?")
            .bind(queue.as_str())
            .execute(self.pool.get_pool())
            .await?;
        Ok(result.rows_affected())
    }
}
