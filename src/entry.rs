use std::time::Instant;

use crate::expiration::CacheExpiration;

/// A value stored in the cache alongside its expiration.
pub(crate) struct CacheEntry<V> {
    value: V,
    expiration: CacheExpiration,
}

impl<V> CacheEntry<V> {
    pub(crate) fn new(value: V, expiration: CacheExpiration) -> Self {
        Self { value, expiration }
    }

    pub(crate) fn expiration(&self) -> &CacheExpiration {
        &self.expiration
    }

    pub(crate) fn is_expired(&self) -> bool {
        self.expiration.is_expired()
    }

    pub(crate) fn is_expired_at(&self, now: Instant) -> bool {
        self.expiration.is_expired_at(now)
    }

    pub(crate) fn value(&self) -> &V {
        &self.value
    }

    /// Consume the entry, yielding the value only if it has not expired.
    pub(crate) fn into_live(self) -> Option<V> {
        if self.is_expired() {
            None
        } else {
            Some(self.value)
        }
    }
}
