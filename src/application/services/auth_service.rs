use super::{FleetService, PreferenceStore, RouteStore};
use crate::application::ports::{CredentialStore, DeliveryApi};
use crate::domain::entities::UserProfile;
use crate::shared::error::AppError;
use crate::shared::validation::{validate_credentials, validate_new_password};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Session lifecycle: login, logout, restore, duty status and password.
pub struct AuthService {
    api: Arc<dyn DeliveryApi>,
    credentials: Arc<dyn CredentialStore>,
    routes: Arc<RouteStore>,
    fleet: Arc<FleetService>,
    preferences: Arc<PreferenceStore>,
    profile: RwLock<Option<UserProfile>>,
}

impl AuthService {
    pub fn new(
        api: Arc<dyn DeliveryApi>,
        credentials: Arc<dyn CredentialStore>,
        routes: Arc<RouteStore>,
        fleet: Arc<FleetService>,
        preferences: Arc<PreferenceStore>,
    ) -> Self {
        Self {
            api,
            credentials,
            routes,
            fleet,
            preferences,
            profile: RwLock::new(None),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, AppError> {
        let email = email.trim();
        validate_credentials(email, password)?;

        let session = self.api.login(email, password).await?;
        self.credentials.save(session.access_token).await?;
        *self.profile.write().await = Some(session.user.clone());
        info!("Signed in as {}", session.user.email);
        Ok(session.user)
    }

    /// Ends the session. The server call is best effort; local state is
    /// always cleared.
    pub async fn logout(&self) -> Result<(), AppError> {
        let flushed = self.preferences.close().await;
        if flushed > 0 {
            info!("Flushed {flushed} preferences before logout");
        }

        if self.credentials.load().await?.is_some() {
            if let Err(e) = self.api.logout().await {
                warn!("Server logout failed: {e}");
            }
        }

        self.credentials.clear().await?;
        *self.profile.write().await = None;
        self.routes.clear().await?;
        self.fleet.clear().await;
        self.preferences.clear_local().await?;
        info!("Signed out");
        Ok(())
    }

    /// Re-validates a persisted token. A rejected token leaves the user
    /// signed out.
    pub async fn restore_session(&self) -> Result<Option<UserProfile>, AppError> {
        if self.credentials.load().await?.is_none() {
            return Ok(None);
        }
        match self.api.current_user().await {
            Ok(user) => {
                *self.profile.write().await = Some(user.clone());
                Ok(Some(user))
            }
            Err(AppError::Unauthorized(_)) => {
                self.credentials.clear().await?;
                *self.profile.write().await = None;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn current_user(&self) -> Option<UserProfile> {
        self.profile.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> Result<bool, AppError> {
        Ok(self.credentials.load().await?.is_some())
    }

    pub async fn is_on_duty(&self) -> bool {
        self.profile
            .read()
            .await
            .as_ref()
            .map(|user| user.on_duty)
            .unwrap_or(false)
    }

    pub async fn set_duty_status(&self, on_duty: bool) -> Result<UserProfile, AppError> {
        let user = self.api.set_duty_status(on_duty).await?;
        *self.profile.write().await = Some(user.clone());
        info!("Duty status set to {}", if user.on_duty { "on" } else { "off" });
        Ok(user)
    }

    pub async fn change_password(
        &self,
        current: &str,
        new: &str,
        confirm: &str,
    ) -> Result<(), AppError> {
        validate_new_password(current, new, confirm)?;
        self.api.change_password(current, new).await
    }
}
