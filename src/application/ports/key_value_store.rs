use crate::shared::error::AppError;
use async_trait::async_trait;

/// Local device storage: string values addressed by key.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
    async fn delete(&self, key: &str) -> Result<(), AppError>;
    async fn delete_prefix(&self, prefix: &str) -> Result<u64, AppError>;
}
