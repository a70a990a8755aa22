//! Per-session memoization of sandbox workspace lookups.
//!
//! Resolving a session's workspace goes through a [`WorkspaceResolver`],
//! which may be slow. [`SessionContextCache`] keeps the outcome, including
//! "this session has no sandbox", for a fixed time after insertion.
//!
//! Every entry is stamped with a generation number when it is inserted.
//! Background eviction only removes the entry carrying the generation it was
//! scheduled for, so a timer left over from before `clear_cache()` cannot
//! evict a newer entry stored under the same session key.

pub mod clock;

use crate::config::CacheConfig;
use crate::resolver::WorkspaceResolver;
use crate::workspace::WorkspaceInfo;
use clock::{Clock, TokioClock};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex as AsyncMutex;
use tokio::time::Instant;

/// Outcome of resolving a session: its workspace, or `None` when the session
/// runs without a sandbox.
pub type CachedWorkspace = Option<Arc<WorkspaceInfo>>;

#[derive(Debug, Error)]
pub enum ContextError {
    /// The resolver failed. Nothing was cached; the next lookup retries.
    #[error("failed to resolve sandbox workspace for session '{session_key}'")]
    Resolve {
        session_key: String,
        #[source]
        source: anyhow::Error,
    },
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: CachedWorkspace,
    inserted_at: Instant,
    generation: u64,
}

type Store = Mutex<HashMap<String, CacheEntry>>;

/// Cache of session workspace lookups with a per-entry time-to-live.
///
/// The store lock is never held across an `.await`. Lookups of different
/// sessions never wait on each other; with single-flight enabled, concurrent
/// misses for the same session share one resolver call.
pub struct SessionContextCache<R: WorkspaceResolver> {
    resolver: R,
    config: R::Config,
    store: Arc<Store>,
    /// Per-session gates used for single-flight resolution
    inflight: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    single_flight: bool,
    background_eviction: bool,
    next_generation: AtomicU64,
}

impl<R: WorkspaceResolver> SessionContextCache<R> {
    /// Create a cache with the default TTL of 300 seconds.
    ///
    /// `config` is handed to the resolver on every call.
    pub fn new(resolver: R, config: R::Config) -> Self {
        Self::with_options(resolver, config, &CacheConfig::default())
    }

    pub fn with_options(resolver: R, config: R::Config, options: &CacheConfig) -> Self {
        Self {
            resolver,
            config,
            store: Arc::new(Mutex::new(HashMap::new())),
            inflight: Mutex::new(HashMap::new()),
            clock: Arc::new(TokioClock),
            ttl: options.ttl(),
            single_flight: options.single_flight,
            background_eviction: options.background_eviction,
            next_generation: AtomicU64::new(0),
        }
    }

    /// Replace the clock used for lazy expiry checks.
    ///
    /// Background eviction timers always run on tokio time.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Get the workspace behind `session_key`.
    ///
    /// A missing or empty key means there is no session to look up and
    /// yields `Ok(None)` without touching the cache. A cached outcome,
    /// including a cached "no sandbox", is returned without calling the
    /// resolver. On a miss the resolver is called and its answer cached for
    /// the configured TTL. Resolver errors are returned and never cached.
    pub async fn get_context(
        &self,
        session_key: Option<&str>,
    ) -> Result<CachedWorkspace, ContextError> {
        let Some(session_key) = session_key.filter(|key| !key.is_empty()) else {
            return Ok(None);
        };

        if let Some(cached) = self.lookup(session_key) {
            return Ok(cached);
        }

        if !self.single_flight {
            return self.resolve_and_store(session_key).await;
        }

        // Declared before the lock guard so the gate is released after unlocking,
        // including when this future is dropped mid-resolution
        let gate = GateRelease {
            cache: self,
            session_key,
            gate: self.inflight_gate(session_key),
        };
        let _guard = gate.gate.lock().await;
        // Whoever held the gate before us may have filled the entry
        match self.lookup(session_key) {
            Some(cached) => Ok(cached),
            None => self.resolve_and_store(session_key).await,
        }
    }

    /// Drop every cached entry.
    pub fn clear_cache(&self) {
        let mut store = self.store.lock();
        tracing::debug!(entries = store.len(), "clearing session context cache");
        store.clear();
    }

    /// Drop the entry for one session. Returns whether one was present.
    pub fn invalidate(&self, session_key: &str) -> bool {
        let removed = self.store.lock().remove(session_key).is_some();
        if removed {
            tracing::debug!(session_key, "invalidated session context");
        }
        removed
    }

    /// Remove all entries older than the TTL and return how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut store = self.store.lock();
        let before = store.len();
        store.retain(|_, entry| !self.is_expired(entry, now));
        before - store.len()
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    fn is_expired(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.inserted_at) >= self.ttl
    }

    /// Fresh cached value for `session_key`, evicting it if it has expired.
    fn lookup(&self, session_key: &str) -> Option<CachedWorkspace> {
        let now = self.clock.now();
        let mut store = self.store.lock();
        let (value, generation, expired) = match store.get(session_key) {
            Some(entry) => (
                entry.value.clone(),
                entry.generation,
                self.is_expired(entry, now),
            ),
            None => return None,
        };

        if expired {
            store.remove(session_key);
            tracing::debug!(session_key, generation, "session context expired");
            return None;
        }

        tracing::trace!(session_key, generation, "session context cache hit");
        Some(value)
    }

    async fn resolve_and_store(&self, session_key: &str) -> Result<CachedWorkspace, ContextError> {
        tracing::debug!(session_key, "resolving sandbox workspace");
        let resolved = self
            .resolver
            .resolve_workspace(&self.config, session_key)
            .await
            .map_err(|source| {
                tracing::warn!(session_key, error = %source, "sandbox workspace resolution failed");
                ContextError::Resolve {
                    session_key: session_key.to_string(),
                    source,
                }
            })?;

        let value = resolved.map(Arc::new);
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        self.store.lock().insert(
            session_key.to_string(),
            CacheEntry {
                value: value.clone(),
                inserted_at: self.clock.now(),
                generation,
            },
        );
        tracing::debug!(
            session_key,
            generation,
            sandboxed = value.is_some(),
            "cached session context"
        );

        if self.background_eviction {
            self.schedule_expiry(session_key, generation);
        }
        Ok(value)
    }

    fn schedule_expiry(&self, session_key: &str, generation: u64) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::trace!(session_key, "no tokio runtime, relying on lazy expiry");
            return;
        };

        let deadline = Instant::now() + self.ttl;
        let store = Arc::clone(&self.store);
        let session_key = session_key.to_string();
        runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if evict_generation(&store, &session_key, generation) {
                tracing::debug!(session_key = %session_key, generation, "evicted expired session context");
            }
        });
    }

    fn inflight_gate(&self, session_key: &str) -> Arc<AsyncMutex<()>> {
        let mut inflight = self.inflight.lock();
        Arc::clone(inflight.entry(session_key.to_string()).or_default())
    }

    fn release_gate(&self, session_key: &str, gate: &Arc<AsyncMutex<()>>) {
        let mut inflight = self.inflight.lock();
        // One reference in the map, one held by the caller
        let idle = inflight
            .get(session_key)
            .is_some_and(|current| Arc::ptr_eq(current, gate) && Arc::strong_count(gate) <= 2);
        if idle {
            inflight.remove(session_key);
        }
    }
}

/// Drops a session's single-flight gate from the in-flight map once its last
/// user is gone.
struct GateRelease<'a, R: WorkspaceResolver> {
    cache: &'a SessionContextCache<R>,
    session_key: &'a str,
    gate: Arc<AsyncMutex<()>>,
}

impl<R: WorkspaceResolver> Drop for GateRelease<'_, R> {
    fn drop(&mut self) {
        self.cache.release_gate(self.session_key, &self.gate);
    }
}

impl<R: WorkspaceResolver> std::fmt::Debug for SessionContextCache<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContextCache")
            .field("entry_count", &self.store.lock().len())
            .field("inflight_count", &self.inflight.lock().len())
            .field("ttl", &self.ttl)
            .field("single_flight", &self.single_flight)
            .field("background_eviction", &self.background_eviction)
            .finish()
    }
}

/// Remove `session_key` only if it still holds the entry from `generation`.
fn evict_generation(store: &Store, session_key: &str, generation: u64) -> bool {
    let mut store = store.lock();
    let current = store
        .get(session_key)
        .is_some_and(|entry| entry.generation == generation);
    if current {
        store.remove(session_key);
    }
    current
}
