use crate::backend::{Backend, MemoryBackend};
use crate::config::{Expiry, StoreSettings};
use crate::StoreError;
use serde_json::{Map, Value};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

const DATA_KEY: &str = "havoc:store";
const EXPIRES_KEY: &str = "havoc:expires";

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Key-value store of JSON values over a [`Backend`]
///
/// The expiry deadline is fixed when the store is created and stamped onto
/// every entry it writes.
#[derive(Debug)]
pub struct Store<B: Backend> {
    backend: B,
    expires_at: Option<u64>,
}

impl Store<MemoryBackend> {
    /// In-memory store whose entries last for the process
    pub fn session() -> Self {
        Store {
            backend: MemoryBackend::new(),
            expires_at: None,
        }
    }
}

impl<B: Backend> Store<B> {
    /// Open a store over `backend`
    ///
    /// `Expiry::Session` is rejected for persistent backends.
    pub fn new(backend: B, settings: &StoreSettings) -> Result<Self, StoreError> {
        let expires_at = match settings.expires {
            Expiry::Never => None,
            Expiry::Session if backend.is_persistent() => {
                return Err(StoreError::InvalidSettings(
                    "session expiry needs a non-persistent backend".to_string(),
                ));
            }
            Expiry::Session => None,
            Expiry::After(ms) => Some(now_millis().saturating_add(ms)),
        };
        Ok(Store {
            backend,
            expires_at,
        })
    }

    /// Epoch milliseconds at which entries written by this store expire
    pub fn expires_at(&self) -> Option<u64> {
        self.expires_at
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Save a value under `key`
    pub fn set(&mut self, key: &str, data: impl Into<Value>) -> Result<&mut Self, StoreError> {
        let mut wrapped = Map::new();
        wrapped.insert(DATA_KEY.to_string(), data.into());
        if let Some(expires) = self.expires_at {
            wrapped.insert(EXPIRES_KEY.to_string(), Value::from(expires));
        }
        let raw = serde_json::to_string(&wrapped).map_err(|e| StoreError::Json {
            error: e,
            key: key.to_string(),
        })?;
        self.backend.set_item(key, &raw)?;
        Ok(self)
    }

    /// Read the value under `key`; expired entries are removed and read as `None`
    pub fn get(&mut self, key: &str) -> Result<Option<Value>, StoreError> {
        self.read(key, now_millis())
    }

    /// Read several keys at once
    ///
    /// Keys with a stored entry appear in the map, as `null` when expired.
    /// Returns `None` when none of the keys has an entry.
    pub fn get_many(&mut self, keys: &[&str]) -> Result<Option<Map<String, Value>>, StoreError> {
        let now = now_millis();
        let mut found = Map::new();
        for key in keys {
            if self.backend.get_item(key)?.is_none() {
                continue;
            }
            let value = self.read(key, now)?.unwrap_or(Value::Null);
            found.insert(key.to_string(), value);
        }
        Ok((!found.is_empty()).then_some(found))
    }

    /// Save every entry of a JSON object
    pub fn import(&mut self, entries: &Map<String, Value>) -> Result<&mut Self, StoreError> {
        for (key, value) in entries {
            self.set(key, value.clone())?;
        }
        Ok(self)
    }

    pub fn remove(&mut self, key: &str) -> Result<&mut Self, StoreError> {
        self.backend.remove_item(key)?;
        Ok(self)
    }

    pub fn remove_many(&mut self, keys: &[&str]) -> Result<&mut Self, StoreError> {
        for key in keys {
            self.backend.remove_item(key)?;
        }
        Ok(self)
    }

    /// Wipe every entry in the backend
    pub fn empty(&mut self) -> Result<&mut Self, StoreError> {
        self.backend.clear()?;
        Ok(self)
    }

    fn read(&mut self, key: &str, now: u64) -> Result<Option<Value>, StoreError> {
        let Some(raw) = self.backend.get_item(key)? else {
            return Ok(None);
        };
        let mut entry: Value = serde_json::from_str(&raw).map_err(|e| StoreError::Json {
            error: e,
            key: key.to_string(),
        })?;

        let Some(wrapper) = entry.as_object_mut() else {
            return Ok(None);
        };
        if let Some(expires) = wrapper.get(EXPIRES_KEY).and_then(Value::as_u64) {
            if now >= expires {
                debug!("Store entry '{}' expired", key);
                self.backend.remove_item(key)?;
                return Ok(None);
            }
        }
        Ok(wrapper.remove(DATA_KEY))
    }
}
