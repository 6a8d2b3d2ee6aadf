//! # Query cache
//!
//! Holds the client's transient copies of server state, keyed by
//! [`QueryKey`]. Values are stored as `serde_json::Value` so one cache can
//! hold every resource type; callers read them back through serde.
//!
//! ## Staleness
//!
//! An entry is fresh while it is younger than the configured stale time and
//! has not been invalidated. [`QueryCache::fetch`] serves fresh entries and
//! refetches everything else.
//!
//! ## Versioning
//!
//! Every write to a key bumps its version, and [`QueryCache::clear`] bumps a
//! cache-wide epoch. A fetch remembers the `(epoch, version)` it started
//! under and drops its result if either moved in the meantime, so optimistic
//! writes, invalidations and logouts always win over late responses.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::utils::error::ApiResult;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

#[derive(Debug, Clone)]
struct Entry {
    value: Option<Value>,
    updated_at: Option<Instant>,
    invalidated: bool,
    version: u64,
}

impl Entry {
    fn empty() -> Self {
        Self {
            value: None,
            updated_at: None,
            invalidated: false,
            version: 0,
        }
    }

    fn is_fresh(&self, stale_time: Duration) -> bool {
        self.value.is_some()
            && !self.invalidated
            && self
                .updated_at
                .is_some_and(|at| at.elapsed() < stale_time)
    }
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<QueryKey, Entry>,
    epoch: u64,
}

/// `(epoch, version)` observed when a fetch started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version(u64, u64);

/// Value a key held before an optimistic write, for rolling it back.
#[derive(Debug, Clone)]
pub struct Snapshot {
    key: QueryKey,
    previous: Option<Value>,
    /// Version the optimistic write left the key at.
    written: Version,
}

#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<RwLock<Inner>>,
    stale_time: Duration,
}

impl QueryCache {
    pub fn new(stale_time: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            stale_time,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Cached value regardless of staleness.
    pub fn get<T>(&self, key: &QueryKey) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let value = self.read().entries.get(key)?.value.clone()?;
        decode(key, value)
    }

    /// Cached value only while it is fresh.
    pub fn get_fresh<T>(&self, key: &QueryKey) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let value = {
            let inner = self.read();
            let entry = inner.entries.get(key)?;
            if !entry.is_fresh(self.stale_time) {
                return None;
            }
            entry.value.clone()?
        };
        decode(key, value)
    }

    pub fn is_fresh(&self, key: &QueryKey) -> bool {
        self.read()
            .entries
            .get(key)
            .is_some_and(|entry| entry.is_fresh(self.stale_time))
    }

    pub fn version(&self, key: &QueryKey) -> Version {
        current_version(&self.read(), key)
    }

    pub fn set<T>(&self, key: &QueryKey, value: &T)
    where
        T: Serialize,
    {
        if let Some(value) = encode(key, value) {
            store(&mut self.write(), key, Some(value));
        }
    }

    /// Writes `value` only if the key is still at `seen`. Returns whether
    /// the write happened.
    pub fn set_if_version<T>(&self, key: &QueryKey, seen: Version, value: &T) -> bool
    where
        T: Serialize,
    {
        let Some(value) = encode(key, value) else {
            return false;
        };
        let mut inner = self.write();
        if current_version(&inner, key) != seen {
            return false;
        }
        store(&mut inner, key, Some(value));
        true
    }

    /// Optimistically replaces a key's value, returning what it held before.
    pub fn set_optimistic<T>(&self, key: &QueryKey, value: &T) -> Snapshot
    where
        T: Serialize,
    {
        let mut inner = self.write();
        let previous = inner.entries.get(key).and_then(|entry| entry.value.clone());
        if let Some(value) = encode(key, value) {
            store(&mut inner, key, Some(value));
        }
        let written = current_version(&inner, key);
        Snapshot {
            key: key.clone(),
            previous,
            written,
        }
    }

    /// Restores the value captured by [`Self::set_optimistic`], unless the
    /// key has been written, invalidated or cleared since. Returns whether
    /// the value was restored.
    pub fn rollback(&self, snapshot: Snapshot) -> bool {
        let mut inner = self.write();
        if current_version(&inner, &snapshot.key) != snapshot.written {
            debug!(key = %snapshot.key, "Skipping rollback of superseded optimistic update");
            return false;
        }
        debug!(key = %snapshot.key, "Rolling back optimistic update");
        store(&mut inner, &snapshot.key, snapshot.previous);
        true
    }

    /// Marks every key under `prefix` stale and supersedes in-flight fetches
    /// for them. Cached values stay readable through [`Self::get`].
    pub fn invalidate(&self, prefix: &QueryKey) {
        let mut inner = self.write();
        let mut count = 0usize;
        for (key, entry) in inner.entries.iter_mut() {
            if key.starts_with(prefix) {
                entry.invalidated = true;
                entry.version += 1;
                count += 1;
            }
        }
        debug!(prefix = %prefix, count, "Invalidated queries");
    }

    /// Drops everything, e.g. on logout.
    pub fn clear(&self) {
        let mut inner = self.write();
        inner.entries.clear();
        inner.epoch += 1;
    }

    /// Serves a fresh cached value or runs `fetcher` and caches its result.
    /// A result superseded while in flight is returned to the caller but not
    /// cached.
    pub async fn fetch<T, F, Fut>(&self, key: &QueryKey, fetcher: F) -> ApiResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        if let Some(value) = self.get_fresh(key) {
            debug!(key = %key, "Query cache hit");
            return Ok(value);
        }

        let seen = self.version(key);
        let value = fetcher().await?;
        if !self.set_if_version(key, seen, &value) {
            debug!(key = %key, "Discarding superseded query result");
        }
        Ok(value)
    }
}

fn current_version(inner: &Inner, key: &QueryKey) -> Version {
    Version(
        inner.epoch,
        inner.entries.get(key).map_or(0, |entry| entry.version),
    )
}

fn store(inner: &mut Inner, key: &QueryKey, value: Option<Value>) {
    let entry = inner.entries.entry(key.clone()).or_insert_with(Entry::empty);
    entry.updated_at = value.as_ref().map(|_| Instant::now());
    entry.value = value;
    entry.invalidated = false;
    entry.version += 1;
}

fn encode<T: Serialize>(key: &QueryKey, value: &T) -> Option<Value> {
    match serde_json::to_value(value) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key = %key, error = %e, "Could not cache query value");
            None
        }
    }
}

fn decode<T: DeserializeOwned>(key: &QueryKey, value: Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key = %key, error = %e, "Cached value has unexpected shape");
            None
        }
    }
}
