use crate::domain::value_objects::AccessToken;
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Single-slot holder for the bearer token.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn load(&self) -> Result<Option<AccessToken>, AppError>;
    async fn save(&self, token: AccessToken) -> Result<(), AppError>;
    async fn clear(&self) -> Result<(), AppError>;
}
