//! Ephemeral response cache.
//!
//! Holds full response bodies that were too long to inline so they can be
//! downloaded once. Entries are removed by the download that consumes them
//! (delete-on-read) or by the TTL sweep, whichever comes first. Nothing here
//! is durable: the store lives in memory for the lifetime of the process.
//!
//! All mutation happens under one lock: `take` removes the entry and `sweep`
//! retains only live ones, so a sweep can never resurrect or double-remove an
//! entry that a download already consumed.

mod entry;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, info};
use rand::Rng;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;

use crate::config::{CACHE_MAX_ENTRIES, CACHE_MAX_TOTAL_BYTES, CACHE_TTL};
use crate::error_handling::CacheError;
use crate::models::HeaderMap;

pub use entry::CachedResponse;

/// Length of a cache id in hex characters (128 random bits).
const ID_LEN: usize = 32;

/// Keyed, TTL-bounded store of full response bodies.
///
/// Shared between probes behind an `Arc`; every method takes `&self`.
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CachedResponse>>,
    ttl: Duration,
    max_entries: usize,
    max_total_bytes: usize,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(CACHE_TTL)
    }
}

impl ResponseCache {
    /// Creates a cache with the default capacity limits.
    pub fn new(ttl: Duration) -> Self {
        Self::with_limits(ttl, CACHE_MAX_ENTRIES, CACHE_MAX_TOTAL_BYTES)
    }

    /// Creates a cache with explicit capacity limits.
    pub fn with_limits(ttl: Duration, max_entries: usize, max_total_bytes: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            max_entries,
            max_total_bytes,
        }
    }

    /// Entry lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Stores a body and returns the id to download it with.
    ///
    /// Expired entries are purged first so they never count against the limits.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Full` when the entry limit is reached and
    /// `CacheError::OverBudget` when the body does not fit the byte budget.
    pub fn put(&self, body: Vec<u8>, headers: HeaderMap) -> Result<String, CacheError> {
        let mut entries = self.lock();
        let ttl = self.ttl;
        entries.retain(|_, entry| !entry.is_expired(ttl));

        if entries.len() >= self.max_entries {
            return Err(CacheError::Full(entries.len()));
        }
        let used: usize = entries.values().map(|entry| entry.body.len()).sum();
        let available = self.max_total_bytes.saturating_sub(used);
        if body.len() > available {
            return Err(CacheError::OverBudget {
                requested: body.len(),
                available,
            });
        }

        let mut rng = rand::rng();
        let id = loop {
            let candidate = format!("{:0width$x}", rng.random::<u128>(), width = ID_LEN);
            if !entries.contains_key(&candidate) {
                break candidate;
            }
        };

        debug!("Cached {} byte body as {}", body.len(), id);
        entries.insert(id.clone(), CachedResponse::new(body, headers));
        Ok(id)
    }

    /// Removes and returns the entry for `id`.
    ///
    /// Returns `None` for unknown, malformed, already-consumed or expired ids.
    pub fn take(&self, id: &str) -> Option<CachedResponse> {
        if !is_valid_id(id) {
            return None;
        }
        let entry = self.lock().remove(id)?;
        if entry.is_expired(self.ttl) {
            debug!("Cache entry {} expired before download", id);
            return None;
        }
        Some(entry)
    }

    /// Purges expired entries and returns how many were removed.
    pub fn sweep(&self) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        let ttl = self.ttl;
        entries.retain(|_, entry| !entry.is_expired(ttl));
        before - entries.len()
    }

    /// Number of entries currently held (expired ones included until swept).
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Starts the periodic sweep as a background task.
    ///
    /// Returns a token that stops the task when cancelled.
    pub fn start_sweeper(self: &Arc<Self>, sweep_interval: Duration) -> CancellationToken {
        let cache = Arc::clone(self);
        let shutdown = CancellationToken::new();
        let token = shutdown.clone();
        let mut ticker = interval(sweep_interval);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = cache.sweep();
                        if removed > 0 {
                            info!("Response cache sweep removed {} expired entries", removed);
                        }
                    }
                    _ = shutdown.cancelled() => {
                        debug!("Response cache sweeper shutting down");
                        break;
                    }
                }
            }
        });

        token
    }

    // A panic while holding the lock cannot leave the map half-updated, so a
    // poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, CachedResponse>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn is_valid_id(id: &str) -> bool {
    id.len() == ID_LEN && id.bytes().all(|b| b.is_ascii_hexdigit())
}
