use crate::shared::error::AppError;
use async_trait::async_trait;
use keyring::Entry;
use std::path::PathBuf;
use tracing::{debug, error};

/// Secret key/value persistence (device keychain or its file fallback).
#[async_trait]
pub trait SecureStorage: Send + Sync {
    async fn store(&self, key: &str, value: &str) -> Result<(), AppError>;
    async fn retrieve(&self, key: &str) -> Result<Option<String>, AppError>;
    async fn delete(&self, key: &str) -> Result<(), AppError>;
}

/// OS keychain through `keyring`.
pub struct KeyringSecureStorage {
    service_name: String,
}

impl KeyringSecureStorage {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry, AppError> {
        Entry::new(&self.service_name, key)
            .map_err(|e| AppError::Storage(format!("Failed to create keyring entry: {e}")))
    }
}

#[async_trait]
impl SecureStorage for KeyringSecureStorage {
    async fn store(&self, key: &str, value: &str) -> Result<(), AppError> {
        debug!("SecureStorage: saving key={key}");
        self.entry(key)?.set_password(value).map_err(|e| {
            error!("SecureStorage: failed to save key={key}: {e:?}");
            AppError::Storage(format!("Failed to save secret to keyring: {e}"))
        })
    }

    async fn retrieve(&self, key: &str) -> Result<Option<String>, AppError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(AppError::Storage(format!("Failed to read secret: {e}"))),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(AppError::Storage(format!("Failed to delete secret: {e}"))),
        }
    }
}

/// Plain-file fallback for environments without a usable keychain
/// (WSL, CI containers). Not encrypted.
pub struct FileSecureStorage {
    root: PathBuf,
}

impl FileSecureStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.root.join(format!("{safe}.json"))
    }
}

#[async_trait]
impl SecureStorage for FileSecureStorage {
    async fn store(&self, key: &str, value: &str) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.path_for(key);
        debug!("FallbackStorage: saving to {path:?}");
        tokio::fs::write(&path, value).await?;
        Ok(())
    }

    async fn retrieve(&self, key: &str) -> Result<Option<String>, AppError> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
