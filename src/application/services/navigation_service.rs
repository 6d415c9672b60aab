use crate::application::ports::UrlOpener;
use crate::domain::entities::Stop;
use crate::domain::value_objects::Coordinates;
use crate::shared::config::Platform;
use crate::shared::error::AppError;
use reqwest::Url;
use std::sync::Arc;
use tracing::{debug, warn};

const WEB_DIRECTIONS_URL: &str = "https://www.google.com/maps/dir/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationLinks {
    /// Platform map-app link; absent on web or when the stop has no fix.
    pub native: Option<String>,
    pub web: String,
}

pub fn native_link(platform: Platform, coordinates: &Coordinates) -> Option<String> {
    let query = coordinates.to_query();
    match platform {
        Platform::Android => Some(format!("google.navigation:q={query}")),
        Platform::Ios => Some(format!("maps:?daddr={query}")),
        Platform::Web => None,
    }
}

pub fn web_link(coordinates: &Coordinates) -> String {
    format!(
        "{WEB_DIRECTIONS_URL}?api=1&destination={}",
        coordinates.to_query()
    )
}

fn web_link_for_address(address: &str) -> Result<String, AppError> {
    Url::parse_with_params(WEB_DIRECTIONS_URL, &[("api", "1"), ("destination", address)])
        .map(String::from)
        .map_err(|e| AppError::Internal(format!("directions url: {e}")))
}

/// Turns a stop into map deep links and hands them to the platform.
pub struct NavigationService {
    platform: Platform,
    opener: Arc<dyn UrlOpener>,
}

impl NavigationService {
    pub fn new(platform: Platform, opener: Arc<dyn UrlOpener>) -> Self {
        Self { platform, opener }
    }

    pub fn links_for(&self, stop: &Stop) -> Result<NavigationLinks, AppError> {
        if let Some(coordinates) = stop.coordinates() {
            return Ok(NavigationLinks {
                native: native_link(self.platform, &coordinates),
                web: web_link(&coordinates),
            });
        }
        if stop.address.trim().is_empty() {
            return Err(AppError::validation(format!(
                "Stop {} has no location to navigate to",
                stop.id
            )));
        }
        Ok(NavigationLinks {
            native: None,
            web: web_link_for_address(stop.address.trim())?,
        })
    }

    /// Opens the native map app, falling back to the web directions page.
    /// Returns the URL that was opened.
    pub async fn open(&self, stop: &Stop) -> Result<String, AppError> {
        let links = self.links_for(stop)?;
        if let Some(native) = links.native {
            match self.opener.open(&native).await {
                Ok(()) => {
                    debug!("Opened {native}");
                    return Ok(native);
                }
                Err(e) => warn!("Map app unavailable ({e}), using web directions"),
            }
        }
        self.opener.open(&links.web).await?;
        Ok(links.web)
    }
}
