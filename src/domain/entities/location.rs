use crate::domain::value_objects::Coordinates;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A foreground GPS fix reported while the driver is on duty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationPing {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub accuracy: Option<f64>,
    #[serde(default)]
    pub heading: Option<f64>,
    #[serde(default)]
    pub speed: Option<f64>,
    pub captured_at: DateTime<Utc>,
}

impl LocationPing {
    pub fn new(coordinates: Coordinates, accuracy: Option<f64>) -> Self {
        Self {
            latitude: coordinates.latitude,
            longitude: coordinates.longitude,
            accuracy,
            heading: None,
            speed: None,
            captured_at: Utc::now(),
        }
    }
}
