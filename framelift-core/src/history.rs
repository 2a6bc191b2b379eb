//! Recently opened games, persisted as one JSON array under a single key.

use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::Infallible;

use serde::{Deserialize, Serialize};

use crate::codec::EncodedToken;
use crate::config::{DEFAULT_HISTORY_CAP, DEFAULT_HISTORY_KEY};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredGameEntry {
    pub encoded: EncodedToken,
    pub title: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("Storage error: {0}")]
    Backend(String),
    #[error("Stored history is not a valid game list: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Durable string storage keyed by name (browser `localStorage`, a file, memory).
pub trait HistoryBackend {
    type Error: std::error::Error + 'static;

    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Replace the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be written.
    fn store(&self, key: &str, value: &str) -> Result<(), Self::Error>;
}

/// Source of wall-clock timestamps for history entries.
pub trait Clock {
    fn now_ms(&self) -> i64;
}

impl<F: Fn() -> i64> Clock for F {
    fn now_ms(&self) -> i64 {
        self()
    }
}

/// In-process backend for hosts without durable storage.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `key` with a raw value, bypassing the store's validation.
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }
}

impl HistoryBackend for MemoryBackend {
    type Error = Infallible;

    fn load(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.raw(key))
    }

    fn store(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.insert_raw(key, value);
        Ok(())
    }
}

/// Ordered, title-unique, capped list of opened games.
#[derive(Debug)]
pub struct HistoryStore<B, C> {
    backend: B,
    clock: C,
    key: String,
    cap: usize,
}

impl<B: HistoryBackend, C: Clock> HistoryStore<B, C> {
    pub fn new(backend: B, clock: C) -> Self {
        Self::with_limits(backend, clock, DEFAULT_HISTORY_KEY, DEFAULT_HISTORY_CAP)
    }

    pub fn with_limits(backend: B, clock: C, key: impl Into<String>, cap: usize) -> Self {
        Self {
            backend,
            clock,
            key: key.into(),
            cap: cap.max(1),
        }
    }

    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Read the persisted list.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read or does not hold a game list.
    pub fn try_list(&self) -> Result<Vec<StoredGameEntry>, HistoryError> {
        let raw = self
            .backend
            .load(&self.key)
            .map_err(|e| HistoryError::Backend(e.to_string()))?;
        match raw {
            Some(raw) => serde_json::from_str(&raw).map_err(HistoryError::Parse),
            None => Ok(Vec::new()),
        }
    }

    /// Persisted list, or empty when storage is missing or unreadable.
    pub fn list(&self) -> Vec<StoredGameEntry> {
        self.try_list().unwrap_or_else(|e| {
            log::warn!("Failed to retrieve stored games: {e}");
            Vec::new()
        })
    }

    /// Upsert `title`, trim to the cap, persist.
    ///
    /// A corrupt stored list is left untouched rather than overwritten.
    ///
    /// # Errors
    ///
    /// Returns an error if the existing list cannot be read or the new one cannot be
    /// written.
    pub fn try_record(&self, token: &EncodedToken, title: &str) -> Result<(), HistoryError> {
        let mut entries = self.try_list()?;
        let entry = StoredGameEntry {
            encoded: token.clone(),
            title: title.to_string(),
            timestamp: self.clock.now_ms(),
        };
        if let Some(existing) = entries.iter_mut().find(|e| e.title == title) {
            *existing = entry;
        } else {
            entries.push(entry);
        }
        if entries.len() > self.cap {
            let overflow = entries.len() - self.cap;
            entries.drain(..overflow);
        }
        let raw = serde_json::to_string(&entries).map_err(HistoryError::Serialize)?;
        self.backend
            .store(&self.key, &raw)
            .map_err(|e| HistoryError::Backend(e.to_string()))
    }

    /// Like [`Self::try_record`], reporting success as a flag.
    pub fn record(&self, token: &EncodedToken, title: &str) -> bool {
        match self.try_record(token, title) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to store encoded game: {e}");
                false
            }
        }
    }
}
