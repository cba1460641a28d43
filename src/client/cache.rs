//! Stale-while-revalidate cache keyed by request path.
//!
//! Entries keep their last good data across failed revalidations; the error
//! is recorded next to it. Local mutations go through [`SwrCache::mutate`],
//! which hands back a [`Snapshot`] so a failed request can be rolled back.

use std::future::Future;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde_json::Value;

use super::http::ClientError;

#[derive(Debug, Clone)]
pub struct SwrOptions {
    /// Refetch when cached data is older than `dedupe_interval`.
    pub revalidate_if_stale: bool,
    /// Loads of the same key inside this window reuse the cached entry.
    pub dedupe_interval: Duration,
}

impl Default for SwrOptions {
    fn default() -> Self {
        Self {
            revalidate_if_stale: true,
            dedupe_interval: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct CacheEntry {
    data: Option<Value>,
    error: Option<String>,
    is_validating: bool,
    fetched_at: Option<Instant>,
}

/// View of one key, shaped the way list screens consume it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState {
    pub data: Option<Value>,
    pub error: Option<String>,
    pub is_loading: bool,
    pub is_validating: bool,
    pub is_empty: bool,
}

impl ResourceState {
    fn from_entry(entry: Option<&CacheEntry>) -> Self {
        let data = entry.and_then(|e| e.data.clone());
        let error = entry.and_then(|e| e.error.clone());
        let is_validating = entry.is_some_and(|e| e.is_validating);
        let is_loading = is_validating && data.is_none();
        let is_empty = !is_loading && data.as_ref().map_or(true, is_empty_value);

        Self {
            data,
            error,
            is_loading,
            is_validating,
            is_empty,
        }
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => super::hooks::list_field(map).map_or(map.is_empty(), |items| items.is_empty()),
        _ => false,
    }
}

/// Pre-mutation state of one key.
#[derive(Debug, Clone)]
pub struct Snapshot {
    key: String,
    entry: Option<CacheEntry>,
}

impl Snapshot {
    pub fn key(&self) -> &str {
        &self.key
    }
}

#[derive(Debug, Default)]
pub struct SwrCache {
    entries: DashMap<String, CacheEntry>,
    options: SwrOptions,
}

/// Clears `is_validating` for a key if its load is dropped before the fetch
/// settles.
struct ValidatingGuard<'a> {
    entries: &'a DashMap<String, CacheEntry>,
    key: &'a str,
    armed: bool,
}

impl Drop for ValidatingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        tracing::debug!("load of {} dropped before the fetch settled", self.key);
        if let Some(mut entry) = self.entries.get_mut(self.key) {
            entry.is_validating = false;
        }
    }
}

impl SwrCache {
    pub fn new(options: SwrOptions) -> Self {
        Self {
            entries: DashMap::new(),
            options,
        }
    }

    /// Current state of `key` without fetching.
    pub fn state(&self, key: &str) -> ResourceState {
        ResourceState::from_entry(self.entries.get(key).as_deref())
    }

    fn needs_fetch(&self, entry: &CacheEntry) -> bool {
        if entry.is_validating {
            return false;
        }
        match (entry.data.is_some(), entry.fetched_at) {
            (false, _) | (_, None) => true,
            (true, Some(at)) => {
                let stale = at.elapsed() >= self.options.dedupe_interval;
                stale && self.options.revalidate_if_stale
            }
        }
    }

    /// Return `key`, calling `fetch` first when the entry is missing or stale.
    pub async fn load<F, Fut>(&self, key: &str, fetch: F) -> ResourceState
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, ClientError>>,
    {
        let should_fetch = {
            let mut entry = self.entries.entry(key.to_string()).or_default();
            let stale = self.needs_fetch(&entry);
            if stale {
                entry.is_validating = true;
            }
            stale
        };

        if !should_fetch {
            tracing::debug!("cache hit for {}", key);
            return self.state(key);
        }

        tracing::debug!("revalidating {}", key);
        let mut guard = ValidatingGuard {
            entries: &self.entries,
            key,
            armed: true,
        };
        let result = fetch().await;
        guard.armed = false;

        let mut entry = self.entries.entry(key.to_string()).or_default();
        entry.is_validating = false;
        match result {
            Ok(data) => {
                entry.data = Some(data);
                entry.error = None;
                entry.fetched_at = Some(Instant::now());
            }
            Err(e) => {
                tracing::warn!("revalidation of {} failed: {}", key, e);
                entry.error = Some(e.to_string());
            }
        }
        ResourceState::from_entry(Some(&*entry))
    }

    /// Apply `update` to the cached data of `key` without fetching and
    /// return the state it replaced.
    pub fn mutate(&self, key: &str, update: impl FnOnce(Option<Value>) -> Value) -> Snapshot {
        let previous = self.entries.get(key).map(|entry| entry.value().clone());
        let mut entry = self.entries.entry(key.to_string()).or_default();
        entry.data = Some(update(entry.data.take()));
        entry.error = None;
        Snapshot {
            key: key.to_string(),
            entry: previous,
        }
    }

    /// Undo a [`mutate`](Self::mutate).
    pub fn restore(&self, snapshot: Snapshot) {
        tracing::debug!("rolling back {}", snapshot.key);
        match snapshot.entry {
            Some(entry) => {
                self.entries.insert(snapshot.key, entry);
            }
            None => {
                self.entries.remove(&snapshot.key);
            }
        }
    }

    /// Mark `key` stale so the next load refetches it.
    pub fn invalidate(&self, key: &str) {
        if let Some(mut entry) = self.entries.get_mut(key) {
            entry.fetched_at = None;
        }
    }
}
