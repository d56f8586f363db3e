//! Expiration values used when inserting into a cache.
//!
//! A `CacheExpiration` is nothing more than an optional `Instant` on the
//! monotonic clock. The various `From` implementations exist so that callers
//! can pass whatever is most natural at the call site.
use std::ops::Range;
use std::time::{Duration, Instant};

use rand::prelude::*;

/// Point in time at which a cache entry stops being visible.
///
/// An expiration with no instant attached never expires.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheExpiration {
    instant: Option<Instant>,
}

impl CacheExpiration {
    /// Construct an expiration which never fires.
    pub fn none() -> Self {
        Self { instant: None }
    }

    /// Retrieve the instant this expiration fires at, if any.
    pub fn instant(&self) -> Option<&Instant> {
        self.instant.as_ref()
    }

    /// Check whether this expiration has fired as of `now`.
    ///
    /// An instant equal to `now` counts as expired.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        matches!(self.instant, Some(instant) if instant <= now)
    }

    /// Check whether this expiration has fired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Time left until this expiration fires.
    ///
    /// Returns `None` when there is no expiration, and a zero duration once fired.
    pub fn remaining(&self) -> Option<Duration> {
        self.instant
            .map(|instant| instant.saturating_duration_since(Instant::now()))
    }
}

impl From<Instant> for CacheExpiration {
    fn from(instant: Instant) -> Self {
        Self {
            instant: Some(instant),
        }
    }
}

/// A zero duration means no expiration at all.
///
/// Durations too large to be represented from now also never expire.
impl From<Duration> for CacheExpiration {
    fn from(duration: Duration) -> Self {
        if duration.is_zero() {
            return Self::none();
        }
        Self {
            instant: Instant::now().checked_add(duration),
        }
    }
}

impl From<Option<Duration>> for CacheExpiration {
    fn from(duration: Option<Duration>) -> Self {
        duration.map(Self::from).unwrap_or_default()
    }
}

impl From<u64> for CacheExpiration {
    fn from(millis: u64) -> Self {
        Duration::from_millis(millis).into()
    }
}

/// Random picks always expire, even when the pick is zero.
impl From<Range<u64>> for CacheExpiration {
    fn from(range: Range<u64>) -> Self {
        let millis = if range.is_empty() {
            range.start
        } else {
            rand::rng().random_range(range)
        };

        Self {
            instant: Instant::now().checked_add(Duration::from_millis(millis)),
        }
    }
}
