use crate::application::ports::{KeyValueStore, PreferenceRemote};
use crate::shared::error::AppError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const LOCAL_PREFIX: &str = "pref:";

struct PendingWrite {
    value: Value,
    generation: u64,
    timer: JoinHandle<()>,
}

struct Inner {
    remote: Arc<dyn PreferenceRemote>,
    local: Arc<dyn KeyValueStore>,
    debounce: Duration,
    pending: Mutex<HashMap<String, PendingWrite>>,
    /// Debounced pushes whose timer already fired.
    pushing: Mutex<Vec<JoinHandle<()>>>,
    next_generation: Mutex<u64>,
    /// Generation of the latest `set` per key.
    last_set: Mutex<HashMap<String, u64>>,
    /// Held across shadow writes from `set` and `reconcile`.
    shadow_lock: tokio::sync::Mutex<()>,
}

impl Inner {
    /// Claims the pending write for `key` if no newer `set` replaced it. The
    /// caller's timer handle moves to `pushing` so `close` can await it.
    fn take_if_current(&self, key: &str, generation: u64) -> Option<Value> {
        let write = {
            let mut pending = self.pending.lock().ok()?;
            let current = pending.get(key).map(|write| write.generation) == Some(generation);
            if !current {
                return None;
            }
            pending.remove(key)?
        };
        if let Ok(mut pushing) = self.pushing.lock() {
            pushing.retain(|push| !push.is_finished());
            pushing.push(write.timer);
        }
        Some(write.value)
    }

    fn drain(&self) -> Vec<(String, Value)> {
        let Ok(mut pending) = self.pending.lock() else {
            return Vec::new();
        };
        pending
            .drain()
            .map(|(key, write)| {
                write.timer.abort();
                (key, write.value)
            })
            .collect()
    }

    fn has_pending(&self, key: &str) -> bool {
        self.pending
            .lock()
            .map(|pending| pending.contains_key(key))
            .unwrap_or(false)
    }

    fn last_set(&self, key: &str) -> Option<u64> {
        self.last_set
            .lock()
            .ok()
            .and_then(|last_set| last_set.get(key).copied())
    }

    async fn push(&self, key: &str, value: &Value) -> bool {
        match self.remote.set_preference(key, value).await {
            Ok(()) => {
                debug!("Preference '{key}' synced");
                true
            }
            Err(e) => {
                warn!("Failed to sync preference '{key}': {e}");
                false
            }
        }
    }

    async fn flush_all(&self) -> usize {
        let mut written = 0;
        for (key, value) in self.drain() {
            if self.push(&key, &value).await {
                written += 1;
            }
        }
        written
    }

    async fn await_pushing(&self) {
        let running = match self.pushing.lock() {
            Ok(mut pushing) => std::mem::take(&mut *pushing),
            Err(_) => return,
        };
        for push in running {
            if let Err(e) = push.await {
                warn!("Debounced preference push did not finish: {e}");
            }
        }
    }

    async fn read_shadow(&self, key: &str) -> Result<Option<Value>, AppError> {
        let Some(raw) = self.local.get(&local_key(key)).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| AppError::DeserializationError(format!("preference '{key}': {e}")))
    }

    async fn write_shadow(&self, key: &str, value: &Value) -> Result<(), AppError> {
        let raw =
            serde_json::to_string(value).map_err(|e| AppError::SerializationError(e.to_string()))?;
        self.local.set(&local_key(key), &raw).await
    }

    async fn reconcile(&self, key: &str) -> Result<Option<Value>, AppError> {
        let started = self.last_set(key);
        if self.has_pending(key) {
            return self.read_shadow(key).await;
        }
        let Some(value) = self.remote.get_preference(key).await? else {
            return self.read_shadow(key).await;
        };

        let _shadow = self.shadow_lock.lock().await;
        if self.has_pending(key) || self.last_set(key) != started {
            debug!("Preference '{key}' changed locally while fetching, keeping local value");
            return self.read_shadow(key).await;
        }
        self.write_shadow(key, &value).await?;
        Ok(Some(value))
    }
}

/// Preference map shadowed locally and synced to the server after a quiet
/// period per key.
///
/// Writes coalesce: only the newest value set within the debounce window is
/// sent. `close` sends whatever is still pending; dropping the store without
/// closing it spawns the same flush on the current runtime.
pub struct PreferenceStore {
    inner: Arc<Inner>,
}

impl PreferenceStore {
    pub fn new(
        remote: Arc<dyn PreferenceRemote>,
        local: Arc<dyn KeyValueStore>,
        debounce: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                remote,
                local,
                debounce,
                pending: Mutex::new(HashMap::new()),
                pushing: Mutex::new(Vec::new()),
                next_generation: Mutex::new(0),
                last_set: Mutex::new(HashMap::new()),
                shadow_lock: tokio::sync::Mutex::new(()),
            }),
        }
    }

    /// Returns the local shadow right away. Unless a local write is pending,
    /// the server value is pulled into the shadow in the background so a
    /// later read sees it.
    pub async fn get(&self, key: &str) -> Result<Option<Value>, AppError> {
        let value = self.inner.read_shadow(key).await?;
        if !self.has_pending(key) {
            self.refresh_in_background(key);
        }
        Ok(value)
    }

    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        match self.get(key).await? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| AppError::DeserializationError(format!("preference '{key}': {e}"))),
            None => Ok(None),
        }
    }

    /// Pulls the server value into the shadow. A local write that is pending,
    /// or that lands while the server is being asked, wins.
    pub async fn reconcile(&self, key: &str) -> Result<Option<Value>, AppError> {
        self.inner.reconcile(key).await
    }

    /// Updates the shadow now and (re)starts the quiet-period timer for `key`.
    pub async fn set(&self, key: &str, value: Value) -> Result<(), AppError> {
        let _shadow = self.inner.shadow_lock.lock().await;
        self.inner.write_shadow(key, &value).await?;
        self.schedule(key.to_string(), value)
    }

    pub async fn set_as<T: Serialize>(&self, key: &str, value: &T) -> Result<(), AppError> {
        let value =
            serde_json::to_value(value).map_err(|e| AppError::SerializationError(e.to_string()))?;
        self.set(key, value).await
    }

    pub fn has_pending(&self, key: &str) -> bool {
        self.inner.has_pending(key)
    }

    pub fn pending_count(&self) -> usize {
        self.inner
            .pending
            .lock()
            .map(|pending| pending.len())
            .unwrap_or(0)
    }

    /// Cancels every timer and writes the pending values immediately, then
    /// waits for debounced pushes that were already on the wire.
    /// Returns how many of the pending writes succeeded.
    pub async fn close(&self) -> usize {
        let written = self.inner.flush_all().await;
        self.inner.await_pushing().await;
        written
    }

    /// Drops pending writes and the local shadow (logout).
    pub async fn clear_local(&self) -> Result<u64, AppError> {
        let dropped = self.inner.drain().len();
        if dropped > 0 {
            debug!("Discarded {dropped} pending preference writes");
        }
        self.inner.local.delete_prefix(LOCAL_PREFIX).await
    }

    fn refresh_in_background(&self, key: &str) {
        let inner = Arc::clone(&self.inner);
        let key = key.to_string();
        tokio::spawn(async move {
            if let Err(e) = inner.reconcile(&key).await {
                debug!("Background refresh of preference '{key}' failed: {e}");
            }
        });
    }

    fn schedule(&self, key: String, value: Value) -> Result<(), AppError> {
        let generation = {
            let mut next = self
                .inner
                .next_generation
                .lock()
                .map_err(|_| AppError::Internal("preference generation poisoned".to_string()))?;
            *next += 1;
            *next
        };
        self.inner
            .last_set
            .lock()
            .map_err(|_| AppError::Internal("preference generation poisoned".to_string()))?
            .insert(key.clone(), generation);

        let mut pending = self
            .inner
            .pending
            .lock()
            .map_err(|_| AppError::Internal("preference queue poisoned".to_string()))?;

        let inner = Arc::clone(&self.inner);
        let timer_key = key.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(inner.debounce).await;
            if let Some(value) = inner.take_if_current(&timer_key, generation) {
                inner.push(&timer_key, &value).await;
            }
        });

        if let Some(previous) = pending.insert(
            key,
            PendingWrite {
                value,
                generation,
                timer,
            },
        ) {
            previous.timer.abort();
        }
        Ok(())
    }
}

impl Drop for PreferenceStore {
    fn drop(&mut self) {
        let pending = self.inner.drain();
        if pending.is_empty() {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(
                "Dropping {} unsynced preferences: no runtime to flush on",
                pending.len()
            );
            return;
        };
        let inner = Arc::clone(&self.inner);
        handle.spawn(async move {
            for (key, value) in pending {
                inner.push(&key, &value).await;
            }
        });
    }
}

fn local_key(key: &str) -> String {
    format!("{LOCAL_PREFIX}{key}")
}
