//! Caching structures for use in an asynchronous context.
//!
//! The main point of this module is the `Cache` type, which offers a small
//! implementation of a cache with time based expiration support. The underlying
//! structure is nothing more than a map wrapped inside some asynchronous locking
//! mechanisms to avoid blocking the entire async runtime when waiting for a handle.
//!
//! Expired entries are evicted in two ways. Reading or popping an expired key
//! removes it on the spot, and every cache owns a sweeper which walks the whole
//! store on a fixed interval and evicts anything which has expired since. See
//! `Cache::purge` for the logic of a single pass.
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_lock::{RwLock, RwLockUpgradableReadGuard};
use log::{debug, log_enabled, trace, Level};

use crate::entry::CacheEntry;
use crate::expiration::CacheExpiration;
use crate::sweeper::Sweeper;

/// Interval between sweeps when constructing via `Cache::new`.
pub const DEFAULT_FREQUENCY: Duration = Duration::from_secs(5);

/// Lower bound applied to custom sweep frequencies.
pub const MIN_FREQUENCY: Duration = Duration::from_millis(1);

/// Locked store shared between a cache and its sweeper.
pub(crate) type Store<K, V> = RwLock<BTreeMap<K, CacheEntry<V>>>;

/// Basic caching structure with asynchronous locking support.
///
/// This structure provides asynchronous access wrapped around a standard
/// `BTreeMap` to avoid blocking event loops when a writer cannot gain a
/// handle - which is what would happen with standard locking implementations.
///
/// Each instance owns a background sweeper which is stopped when the cache is
/// dropped, or earlier via `Cache::shutdown`. Share a cache between tasks by
/// wrapping it in an `Arc`.
pub struct Cache<K, V> {
    store: Arc<Store<K, V>>,
    sweeper: Sweeper,
}

impl<K, V> Cache<K, V>
where
    K: Ord + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// Construct a new `Cache`, sweeping every `DEFAULT_FREQUENCY`.
    pub fn new() -> Self {
        Self::with_frequency(DEFAULT_FREQUENCY)
    }

    /// Construct a new `Cache` with a custom sweep frequency.
    ///
    /// Frequencies below `MIN_FREQUENCY` are raised to it.
    pub fn with_frequency(frequency: Duration) -> Self {
        let store = Arc::new(RwLock::new(BTreeMap::new()));
        let sweeper = Sweeper::spawn(Arc::downgrade(&store), frequency.max(MIN_FREQUENCY));

        Self { store, sweeper }
    }
}

impl<K, V> Cache<K, V>
where
    K: Ord,
{
    /// Remove all entries from the cache.
    pub async fn clear(&self) {
        self.store.write().await.clear()
    }

    /// Check whether a key is present and unexpired.
    ///
    /// Unlike `get`, this never evicts and never clones the value.
    pub async fn contains_key(&self, k: &K) -> bool {
        self.store
            .read()
            .await
            .get(k)
            .is_some_and(|entry| !entry.is_expired())
    }

    /// Remove an entry from the cache, discarding any stored value.
    ///
    /// Removing a key which is not present is a no-op.
    pub async fn delete(&self, k: &K) {
        self.store.write().await.remove(k);
    }

    /// Retrieve the number of expired entries inside the cache.
    ///
    /// Note that this is calculated by walking the set of entries and
    /// should therefore not be used in performance sensitive situations.
    pub async fn expired(&self) -> usize {
        let now = Instant::now();
        self.store
            .read()
            .await
            .values()
            .filter(|entry| entry.is_expired_at(now))
            .count()
    }

    /// Retrieve the expiration instant of an unexpired key.
    pub async fn expiration(&self, k: &K) -> Option<Instant> {
        let store = self.store.read().await;
        let entry = store.get(k)?;

        if entry.is_expired() {
            return None;
        }

        entry.expiration().instant().copied()
    }

    /// Retrieve a copy of a value inside the cache.
    ///
    /// Finding an expired entry evicts it, so this may briefly upgrade to a
    /// write lock. Unexpired lookups only ever hold an upgradable read.
    pub async fn get(&self, k: &K) -> Option<V>
    where
        V: Clone,
    {
        let store = self.store.upgradable_read().await;

        match store.get(k) {
            Some(entry) if !entry.is_expired() => return Some(entry.value().clone()),
            Some(_) => (),
            None => return None,
        }

        let mut store = RwLockUpgradableReadGuard::upgrade(store).await;
        store.remove(k);
        None
    }

    /// Insert a key/value pair into the cache with an associated expiration.
    ///
    /// The third argument controls expiration, which can be provided using any type which
    /// implements `Into<CacheExpiration>`. This allows for various different syntax based
    /// on your use case; note that a zero `Duration` means the entry never expires. If you
    /// do not want expiration, see `insert_untracked`.
    ///
    /// Any previous unexpired value stored against the key is returned.
    pub async fn insert<E>(&self, k: K, v: V, e: E) -> Option<V>
    where
        E: Into<CacheExpiration>,
    {
        self.do_insert(k, v, e.into()).await
    }

    /// Insert a key/value pair into the cache with no associated expiration.
    pub async fn insert_untracked(&self, k: K, v: V) -> Option<V> {
        self.do_insert(k, v, CacheExpiration::none()).await
    }

    /// Check whether the cache is empty.
    ///
    /// As with `len`, expired entries which are yet to be evicted are counted.
    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    /// Check whether the background sweeper is still running.
    pub fn is_sweeping(&self) -> bool {
        self.sweeper.is_running()
    }

    /// Retrieve the number of entries inside the cache.
    ///
    /// This *does* include entries which may be expired but are not yet evicted.
    /// Use `unexpired` for the number of visible entries.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    /// Cleanses the cache of expired entries.
    ///
    /// This is the same pass the sweeper runs on every tick: the store is locked
    /// for writing, every expired entry is removed, and the lock is released. It
    /// is exposed for callers who want to reclaim memory on their own schedule,
    /// or after calling `shutdown`.
    ///
    /// Returns the number of entries evicted.
    pub async fn purge(&self) -> usize {
        purge(&self.store).await
    }

    /// Remove an entry from the cache and return any stored value.
    ///
    /// The key is removed whether or not it has expired, but a value is only
    /// returned when the entry was still live.
    pub async fn remove(&self, k: &K) -> Option<V> {
        self.store
            .write()
            .await
            .remove(k)
            .and_then(CacheEntry::into_live)
    }

    /// Stop the background sweeper.
    ///
    /// The cache stays fully usable; expired entries are then only evicted when
    /// accessed or via `purge`. Calling this more than once has no effect.
    pub fn shutdown(&self) {
        if self.sweeper.stop() {
            debug!("sweeper shutdown requested");
        }
    }

    /// Retrieve the number of unexpired entries inside the cache.
    ///
    /// Note that this is calculated by walking the set of entries and
    /// should therefore not be used in performance sensitive situations.
    pub async fn unexpired(&self) -> usize {
        let now = Instant::now();
        self.store
            .read()
            .await
            .values()
            .filter(|entry| !entry.is_expired_at(now))
            .count()
    }

    /// Internal logic for insertion to avoid multiple definitions.
    async fn do_insert(&self, k: K, v: V, e: CacheExpiration) -> Option<V> {
        self.store
            .write()
            .await
            .insert(k, CacheEntry::new(v, e))
            .and_then(CacheEntry::into_live)
    }
}

/// Default implementation.
impl<K, V> Default for Cache<K, V>
where
    K: Ord + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    fn default() -> Self {
        Cache::new()
    }
}

/// Evict every expired entry from `store` under a single write lock.
pub(crate) async fn purge<K, V>(store: &Store<K, V>) -> usize
where
    K: Ord,
{
    let start = Instant::now();

    let (removed, remaining) = {
        let mut store = store.write().await;

        // one snapshot so the whole pass agrees on what expired means
        let now = Instant::now();
        let total = store.len();

        store.retain(|_, entry| !entry.is_expired_at(now));

        (total - store.len(), store.len())
    };

    if removed == 0 {
        trace!("purge found no expired entries in {:.0?}", start.elapsed());
    } else if log_enabled!(Level::Debug) {
        debug!(
            "purge removed {} entries in {:.0?} ({} remaining)",
            removed,
            start.elapsed(),
            remaining
        );
    }

    removed
}
