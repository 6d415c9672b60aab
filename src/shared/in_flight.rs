use crate::shared::AppError;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Tracks mutations that are currently outstanding per resource key.
///
/// A second `begin` for a key that is still in flight is rejected instead of
/// issuing a duplicate request. The slot is released when the guard drops.
#[derive(Clone, Default)]
pub struct InFlightTracker {
    keys: Arc<Mutex<HashSet<String>>>,
}

pub struct InFlightGuard {
    keys: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl InFlightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, key: &str, message: &str) -> Result<InFlightGuard, AppError> {
        let mut keys = self
            .keys
            .lock()
            .map_err(|_| AppError::Internal("in-flight tracker poisoned".to_string()))?;
        if !keys.insert(key.to_string()) {
            return Err(AppError::Conflict(message.to_string()));
        }
        Ok(InFlightGuard {
            keys: Arc::clone(&self.keys),
            key: key.to_string(),
        })
    }

    pub fn is_in_flight(&self, key: &str) -> bool {
        self.keys
            .lock()
            .map(|keys| keys.contains(key))
            .unwrap_or(false)
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Ok(mut keys) = self.keys.lock() {
            keys.remove(&self.key);
        }
    }
}
