use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SecureBackend {
    #[default]
    Keyring,
    File,
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    #[default]
    Android,
    Ios,
    Web,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub offline: OfflineConfig,
    pub preferences: PreferenceConfig,
    #[serde(default)]
    pub platform: Platform,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    pub database_url: String,
    pub service_name: String,
    #[serde(default)]
    pub secure_backend: SecureBackend,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfflineConfig {
    pub location_queue_cap: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceConfig {
    pub debounce_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:8000".to_string(),
                timeout_secs: 30,
            },
            storage: StorageConfig {
                data_dir: "./data".to_string(),
                database_url: "sqlite:data/delivery.db?mode=rwc".to_string(),
                service_name: "delivery-client".to_string(),
                secure_backend: SecureBackend::Keyring,
            },
            offline: OfflineConfig {
                location_queue_cap: 500,
            },
            preferences: PreferenceConfig { debounce_ms: 1000 },
            platform: Platform::Android,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("DELIVERY_API_BASE_URL") {
            let trimmed = v.trim().trim_end_matches('/');
            if !trimmed.is_empty() {
                cfg.api.base_url = trimmed.to_string();
            }
        }
        if let Ok(v) = std::env::var("DELIVERY_API_TIMEOUT_SECS") {
            if let Some(value) = parse_u64(&v) {
                cfg.api.timeout_secs = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("DELIVERY_DATA_DIR") {
            if !v.trim().is_empty() {
                cfg.storage.data_dir = v.trim().to_string();
            }
        }
        if let Ok(v) = std::env::var("DELIVERY_DATABASE_URL") {
            if !v.trim().is_empty() {
                cfg.storage.database_url = v.trim().to_string();
            }
        }
        if let Ok(v) = std::env::var("DELIVERY_SECURE_BACKEND") {
            cfg.storage.secure_backend = match v.trim().to_ascii_lowercase().as_str() {
                "file" => SecureBackend::File,
                "keyring" => SecureBackend::Keyring,
                _ => cfg.storage.secure_backend,
            };
        }
        if let Ok(v) = std::env::var("DELIVERY_LOCATION_QUEUE_CAP") {
            if let Some(value) = parse_u64(&v) {
                cfg.offline.location_queue_cap = value as usize;
            }
        }
        if let Ok(v) = std::env::var("DELIVERY_PREFERENCE_DEBOUNCE_MS") {
            if let Some(value) = parse_u64(&v) {
                cfg.preferences.debounce_ms = value;
            }
        }
        if let Ok(v) = std::env::var("DELIVERY_PLATFORM") {
            cfg.platform = parse_platform(&v, cfg.platform);
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.api.base_url.trim().is_empty() {
            return Err("API base_url must not be empty".to_string());
        }
        if !(self.api.base_url.starts_with("http://") || self.api.base_url.starts_with("https://"))
        {
            return Err("API base_url scheme must be http or https".to_string());
        }
        if self.api.timeout_secs == 0 {
            return Err("API timeout_secs must be greater than 0".to_string());
        }
        if self.offline.location_queue_cap == 0 {
            return Err("Offline location_queue_cap must be greater than 0".to_string());
        }
        if self.preferences.debounce_ms == 0 {
            return Err("Preference debounce_ms must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

fn parse_platform(value: &str, default: Platform) -> Platform {
    match value.trim().to_ascii_lowercase().as_str() {
        "android" => Platform::Android,
        "ios" => Platform::Ios,
        "web" => Platform::Web,
        _ => default,
    }
}
