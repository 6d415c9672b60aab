use crate::shared::error::AppError;
use async_trait::async_trait;

/// Hands a URL to the platform (map apps, browser).
#[async_trait]
pub trait UrlOpener: Send + Sync {
    async fn open(&self, url: &str) -> Result<(), AppError>;
}
