use crate::application::ports::CredentialStore;
use crate::domain::value_objects::AccessToken;
use crate::infrastructure::storage::SecureStorage;
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

const ACCESS_TOKEN_KEY: &str = "access_token";

/// Bearer token slot backed by secure storage.
///
/// The first read loads from storage; later reads are served from memory.
/// `clear` drops the cached value before touching storage, so a caller never
/// sees the old token once `clear` has started.
pub struct TokenStore {
    storage: Arc<dyn SecureStorage>,
    // None = not loaded yet, Some(None) = known empty
    cache: RwLock<Option<Option<AccessToken>>>,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn SecureStorage>) -> Self {
        Self {
            storage,
            cache: RwLock::new(None),
        }
    }
}

#[async_trait]
impl CredentialStore for TokenStore {
    async fn load(&self) -> Result<Option<AccessToken>, AppError> {
        if let Some(cached) = self.cache.read().await.as_ref() {
            return Ok(cached.clone());
        }

        let mut cache = self.cache.write().await;
        if let Some(cached) = cache.as_ref() {
            return Ok(cached.clone());
        }
        let token = self
            .storage
            .retrieve(ACCESS_TOKEN_KEY)
            .await?
            .and_then(|raw| AccessToken::new(raw).ok());
        debug!("TokenStore: loaded token from storage (present={})", token.is_some());
        *cache = Some(token.clone());
        Ok(token)
    }

    async fn save(&self, token: AccessToken) -> Result<(), AppError> {
        let mut cache = self.cache.write().await;
        self.storage.store(ACCESS_TOKEN_KEY, token.as_str()).await?;
        *cache = Some(Some(token));
        Ok(())
    }

    async fn clear(&self) -> Result<(), AppError> {
        let mut cache = self.cache.write().await;
        *cache = Some(None);
        self.storage.delete(ACCESS_TOKEN_KEY).await
    }
}
